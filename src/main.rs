use clap::Parser;
use color_eyre::eyre::Result;
use roulette_session::{
    config::{
        AppConfig,
        Cli,
    },
    logging::init_tracing,
};

mod client;
mod ui;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = AppConfig::try_from(Cli::parse())?;
    let _guard = init_tracing(&config.log_dir)?;
    let resolver = config.build_resolver()?;
    let label = resolver.label();
    client::run_app(&config, resolver, label).await
}
