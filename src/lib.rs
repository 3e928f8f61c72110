pub mod bet;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod resolver;
pub mod session;
pub mod staging;
pub mod wheel;

pub mod test_helpers;

pub use bet::{
    Bet,
    BetError,
    BetKind,
    StagedBet,
};
pub use error::SessionError;
pub use ledger::Bankroll;
pub use money::Chips;
pub use resolver::{
    AnyResolver,
    Outcome,
    Resolution,
    Resolver,
    SpinFailure,
};
pub use session::{
    RoundReport,
    Session,
    SessionState,
    Settlement,
    Submission,
};
pub use staging::BetSlip;
pub use wheel::{
    Color,
    Pocket,
};
