//! Resolver reached over HTTP: `POST {base}/spin`.

use super::{
    Outcome,
    Resolution,
    Resolver,
    SpinFailure,
};
use crate::{
    bet::StagedBet,
    money::{
        Chips,
        ChipsError,
    },
    wheel::{
        Color,
        Pocket,
    },
};
use reqwest::{
    StatusCode,
    Url,
    header,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{
    debug,
    warn,
};

#[derive(Debug, Error)]
pub enum HttpResolverError {
    #[error("invalid resolver URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
    #[error("session cookie is not a valid header value")]
    InvalidCookie,
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct HttpResolver {
    spin_url: Url,
    http: reqwest::Client,
}

impl HttpResolver {
    pub fn new(
        base_url: &str,
        session_cookie: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Self, HttpResolverError> {
        let base = base_url.trim_end_matches('/');
        let spin_url = Url::parse(&format!("{base}/spin")).map_err(|err| {
            HttpResolverError::InvalidUrl {
                url: base_url.to_string(),
                reason: err.to_string(),
            }
        })?;
        if !matches!(spin_url.scheme(), "http" | "https") {
            return Err(HttpResolverError::InvalidScheme(
                spin_url.scheme().to_string(),
            ));
        }

        let mut headers = header::HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = header::HeaderValue::from_str(cookie)
                .map_err(|_| HttpResolverError::InvalidCookie)?;
            headers.insert(header::COOKIE, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { spin_url, http })
    }

    pub fn spin_url(&self) -> &Url {
        &self.spin_url
    }

    async fn post_spin(&self, request: &SpinRequest) -> Result<SpinReply, String> {
        let res = self
            .http
            .post(self.spin_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| format!("resolver request failed: {err}"))?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|err| format!("failed to read resolver response body: {err}"))?;
        debug!(%status, body = %String::from_utf8_lossy(&bytes), "resolver replied");

        if !status.is_success() {
            return Err(unexpected_status(status));
        }
        serde_json::from_slice::<SpinReply>(&bytes)
            .map_err(|err| format!("malformed resolver response: {err}"))
    }
}

fn unexpected_status(status: StatusCode) -> String {
    format!("resolver returned status {status}")
}

impl Resolver for HttpResolver {
    async fn resolve(&self, bets: &[StagedBet]) -> Resolution {
        let request = SpinRequest::from(bets);
        match self.post_spin(&request).await {
            Ok(SpinReply::Rejected { error }) => {
                Resolution::Failed(SpinFailure::Resolver(error))
            }
            Ok(SpinReply::Settled(dto)) => match Outcome::try_from(dto) {
                Ok(outcome) => Resolution::Settled(outcome),
                Err(err) => Resolution::Failed(SpinFailure::Transport(format!(
                    "malformed resolver response: {err}"
                ))),
            },
            Err(message) => Resolution::Failed(SpinFailure::Transport(message)),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SpinRequest {
    pub bets: Vec<WireBet>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireBet {
    #[serde(rename = "type")]
    pub bet_type: &'static str,
    pub value: Option<Pocket>,
    pub amount: f64,
}

impl From<&[StagedBet]> for SpinRequest {
    fn from(bets: &[StagedBet]) -> Self {
        let bets = bets
            .iter()
            .map(|staged| WireBet {
                bet_type: staged.bet().wire_type(),
                value: staged.bet().wire_value(),
                amount: staged.stake().as_f64(),
            })
            .collect();
        Self { bets }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpinReply {
    Rejected { error: String },
    Settled(SpinOutcomeDto),
}

#[derive(Debug, Deserialize)]
struct SpinOutcomeDto {
    result: Pocket,
    color: Color,
    new_bankroll: f64,
    #[serde(default)]
    total_win: Option<f64>,
}

impl TryFrom<SpinOutcomeDto> for Outcome {
    type Error = ChipsError;

    fn try_from(dto: SpinOutcomeDto) -> Result<Self, Self::Error> {
        if dto.color != dto.result.color() {
            warn!(
                pocket = %dto.result,
                reported = %dto.color,
                expected = %dto.result.color(),
                "resolver color disagrees with the wheel"
            );
        }
        Ok(Outcome {
            pocket: dto.result,
            color: dto.color,
            bankroll: Chips::from_f64(dto.new_bankroll)?,
            winnings: dto.total_win.map(Chips::from_f64).transpose()?,
        })
    }
}
