use crate::{
    money::Chips,
    resolver::{
        AnyResolver,
        HouseResolver,
        HttpResolver,
    },
};
use clap::{
    ArgGroup,
    Parser,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use std::{
    path::PathBuf,
    time::Duration,
};

pub const DEFAULT_RESOLVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Terminal roulette table backed by a remote spin resolver",
    long_about = None,
    group(ArgGroup::new("resolver").args(["resolver_url", "house"]))
)]
pub struct Cli {
    /// Base URL of the spin service; bets are posted to `{url}/spin`.
    #[arg(long, default_value = DEFAULT_RESOLVER_URL)]
    pub resolver_url: String,

    /// Settle spins in-process instead of calling a remote service.
    #[arg(long)]
    pub house: bool,

    #[arg(long, default_value = "1000.00")]
    pub bankroll: String,

    /// Stake placed by each bet key.
    #[arg(long, default_value = "10")]
    pub chip: String,

    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Seed for the in-process wheel.
    #[arg(long, requires = "house")]
    pub seed: Option<u64>,

    /// Sent as the `Cookie` header with every spin request.
    #[arg(long, conflicts_with = "house")]
    pub session_cookie: Option<String>,

    #[arg(long, default_value = ".logs")]
    pub log_dir: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolverConfig {
    Http { url: String, cookie: Option<String> },
    House { seed: Option<u64> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub bankroll: Chips,
    pub chip: Chips,
    pub timeout: Duration,
    pub log_dir: PathBuf,
}

impl TryFrom<Cli> for AppConfig {
    type Error = color_eyre::Report;

    fn try_from(cli: Cli) -> Result<Self> {
        let bankroll: Chips = cli
            .bankroll
            .parse()
            .wrap_err_with(|| format!("parsing --bankroll {:?}", cli.bankroll))?;
        let chip: Chips = cli
            .chip
            .parse()
            .wrap_err_with(|| format!("parsing --chip {:?}", cli.chip))?;
        if chip.is_zero() {
            return Err(eyre!("--chip must be greater than zero"));
        }
        if cli.timeout_secs == 0 {
            return Err(eyre!("--timeout-secs must be greater than zero"));
        }
        let resolver = if cli.house {
            ResolverConfig::House { seed: cli.seed }
        } else {
            ResolverConfig::Http {
                url: cli.resolver_url,
                cookie: cli.session_cookie,
            }
        };
        let log_dir = PathBuf::from(shellexpand::tilde(&cli.log_dir).into_owned());
        Ok(Self {
            resolver,
            bankroll,
            chip,
            timeout: Duration::from_secs(cli.timeout_secs),
            log_dir,
        })
    }
}

impl AppConfig {
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        Self::try_from(cli)
    }

    /// Builds the configured resolver. The house starts with the same balance
    /// as the player so both sides agree from the first spin.
    pub fn build_resolver(&self) -> Result<AnyResolver> {
        match &self.resolver {
            ResolverConfig::Http { url, cookie } => {
                let http = HttpResolver::new(url, cookie.as_deref(), self.timeout)
                    .wrap_err("failed to set up resolver client")?;
                Ok(AnyResolver::Http(http))
            }
            ResolverConfig::House { seed } => {
                Ok(AnyResolver::House(HouseResolver::new(self.bankroll, *seed)))
            }
        }
    }
}
