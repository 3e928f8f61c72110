//! The betting session: stage wagers, submit them for one spin, then either
//! apply the resolver's bankroll or refund every stake.

use crate::{
    bet::{
        Bet,
        StagedBet,
    },
    error::{
        Result,
        SessionError,
    },
    ledger::Bankroll,
    money::Chips,
    resolver::{
        Outcome,
        Resolution,
        Resolver,
        SpinFailure,
        resolve_with_timeout,
    },
    staging::BetSlip,
};
use chrono::{
    DateTime,
    Utc,
};
use std::time::Duration;
use tracing::{
    info,
    warn,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResolution,
}

/// What a spin hands to the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub round: u64,
    pub bets: Vec<StagedBet>,
}

impl Submission {
    pub fn total(&self) -> Chips {
        self.bets.iter().map(StagedBet::stake).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement {
    Settled(Outcome),
    Refunded { failure: SpinFailure, refunded: Chips },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundReport {
    pub round: u64,
    pub bets: Vec<StagedBet>,
    /// Bankroll before any of this round's stakes were taken.
    pub balance_before: Chips,
    pub balance_after: Chips,
    pub at: DateTime<Utc>,
    pub settlement: Settlement,
}

impl RoundReport {
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.settlement {
            Settlement::Settled(outcome) => Some(outcome),
            Settlement::Refunded { .. } => None,
        }
    }
}

#[derive(Clone, Debug)]
struct InFlight {
    round: u64,
    bets: Vec<StagedBet>,
}

#[derive(Clone, Debug)]
pub struct Session {
    ledger: Bankroll,
    slip: BetSlip,
    in_flight: Option<InFlight>,
    next_round: u64,
}

impl Session {
    pub fn new(initial: Chips) -> Self {
        Self {
            ledger: Bankroll::new(initial),
            slip: BetSlip::new(),
            in_flight: None,
            next_round: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.in_flight {
            Some(_) => SessionState::AwaitingResolution,
            None => SessionState::Idle,
        }
    }

    pub fn bankroll(&self) -> Chips {
        self.ledger.balance()
    }

    pub fn staged(&self) -> &BetSlip {
        &self.slip
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.state() {
            SessionState::Idle => Ok(()),
            SessionState::AwaitingResolution => Err(SessionError::SessionBusy),
        }
    }

    pub fn stage(&mut self, bet: Bet, stake: Chips) -> Result<()> {
        self.ensure_idle()?;
        self.slip.stage(bet, stake, &mut self.ledger)
    }

    /// Stages a bet given as kind and selector text, e.g. `("column", Some("2"))`.
    pub fn stage_parsed(&mut self, kind: &str, selector: Option<&str>, stake: Chips) -> Result<()> {
        self.ensure_idle()?;
        let bet = Bet::parse(kind, selector)?;
        self.slip.stage(bet, stake, &mut self.ledger)
    }

    pub fn unstage(&mut self, index: usize) -> Result<StagedBet> {
        self.ensure_idle()?;
        self.slip.unstage(index, &mut self.ledger)
    }

    pub fn clear(&mut self) -> Result<Chips> {
        self.ensure_idle()?;
        Ok(self.slip.clear(&mut self.ledger))
    }

    /// Freezes the slip and returns the bets to submit. The session stays
    /// busy until [`Session::complete_spin`] is called for the same round.
    pub fn begin_spin(&mut self) -> Result<Submission> {
        self.ensure_idle()?;
        if self.slip.is_empty() {
            return Err(SessionError::NoBetsStaged);
        }
        let round = self.next_round;
        self.next_round += 1;
        let bets = self.slip.snapshot();
        self.in_flight = Some(InFlight {
            round,
            bets: bets.clone(),
        });
        let submission = Submission { round, bets };
        info!(
            round,
            bets = submission.bets.len(),
            staked = %submission.total(),
            "spin submitted"
        );
        Ok(submission)
    }

    pub fn complete_spin(&mut self, round: u64, resolution: Resolution) -> Result<RoundReport> {
        let InFlight { round, bets } = match self.in_flight.take() {
            Some(in_flight) if in_flight.round == round => in_flight,
            Some(in_flight) => {
                let expected = in_flight.round;
                self.in_flight = Some(in_flight);
                return Err(SessionError::RoundMismatch {
                    expected,
                    got: round,
                });
            }
            None => return Err(SessionError::NoRoundInFlight),
        };

        let total: Chips = bets.iter().map(StagedBet::stake).sum();
        let balance_before = self.ledger.balance().saturating_add(total);
        let settlement = match resolution {
            Resolution::Settled(outcome) => {
                self.ledger.set_authoritative(outcome.bankroll);
                self.slip.discard();
                info!(
                    round,
                    pocket = %outcome.pocket,
                    color = %outcome.color,
                    bankroll = %outcome.bankroll,
                    "spin settled"
                );
                Settlement::Settled(outcome)
            }
            Resolution::Failed(failure) => {
                for staged in &bets {
                    self.ledger.credit(staged.stake());
                }
                self.slip.discard();
                warn!(round, refunded = %total, %failure, "spin failed, stakes refunded");
                Settlement::Refunded {
                    failure,
                    refunded: total,
                }
            }
        };

        let report = RoundReport {
            round,
            bets,
            balance_before,
            balance_after: self.ledger.balance(),
            at: Utc::now(),
            settlement,
        };
        Ok(report)
    }

    /// Runs one full round against `resolver`. A resolver that does not answer
    /// within `timeout` is treated as a transport failure.
    pub async fn spin<R: Resolver>(
        &mut self,
        resolver: &R,
        timeout: Duration,
    ) -> Result<RoundReport> {
        let submission = self.begin_spin()?;
        let resolution = resolve_with_timeout(resolver, &submission.bets, timeout).await;
        self.complete_spin(submission.round, resolution)
    }
}
