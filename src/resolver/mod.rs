//! The remote authority that draws a pocket and settles a submission.

use crate::{
    bet::StagedBet,
    money::Chips,
    wheel::{
        Color,
        Pocket,
    },
};
use std::{
    future::Future,
    time::Duration,
};
use thiserror::Error;

pub mod house;
pub mod http;

pub use house::HouseResolver;
pub use http::{
    HttpResolver,
    HttpResolverError,
};

/// A settled spin as reported by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub pocket: Pocket,
    pub color: Color,
    /// Authoritative balance after the spin. Replaces the local bankroll.
    pub bankroll: Chips,
    /// Gross amount returned by winning bets, for display only.
    pub winnings: Option<Chips>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SpinFailure {
    #[error("resolver rejected the spin: {0}")]
    Resolver(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Either way the spin ends, the session goes back to idle: a settled spin
/// applies the outcome, a failed one refunds every stake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Settled(Outcome),
    Failed(SpinFailure),
}

pub trait Resolver {
    fn resolve(&self, bets: &[StagedBet]) -> impl Future<Output = Resolution> + Send;
}

/// Awaits `resolver` for at most `limit`. Expiry is reported as a transport
/// failure so a spin always resolves.
pub async fn resolve_with_timeout<R: Resolver>(
    resolver: &R,
    bets: &[StagedBet],
    limit: Duration,
) -> Resolution {
    match tokio::time::timeout(limit, resolver.resolve(bets)).await {
        Ok(resolution) => resolution,
        Err(_) => Resolution::Failed(SpinFailure::Transport(format!(
            "timed out after {}s",
            limit.as_secs_f64()
        ))),
    }
}

#[derive(Clone, Debug)]
pub enum AnyResolver {
    Http(HttpResolver),
    House(HouseResolver),
}

impl AnyResolver {
    pub fn label(&self) -> &'static str {
        match self {
            AnyResolver::Http(_) => "http",
            AnyResolver::House(_) => "house",
        }
    }
}

impl Resolver for AnyResolver {
    async fn resolve(&self, bets: &[StagedBet]) -> Resolution {
        match self {
            AnyResolver::Http(resolver) => resolver.resolve(bets).await,
            AnyResolver::House(resolver) => resolver.resolve(bets).await,
        }
    }
}
