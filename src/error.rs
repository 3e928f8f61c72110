use crate::{
    bet::BetError,
    money::Chips,
};
use thiserror::Error;

/// Rejections from the ledger, the bet slip and the session. None of them
/// change any state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Chips, available: Chips },
    #[error("stake must be greater than zero")]
    InvalidStake,
    #[error(transparent)]
    InvalidBet(#[from] BetError),
    #[error("no staged bet at index {index} (slip holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no bets staged")]
    NoBetsStaged,
    #[error("a spin is already awaiting resolution")]
    SessionBusy,
    #[error("no spin is awaiting resolution")]
    NoRoundInFlight,
    #[error("resolution for round {got} does not match round {expected} in flight")]
    RoundMismatch { expected: u64, got: u64 },
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
