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
};
use tracing::debug;

/// Pending wagers for the next spin, in the order they were placed.
///
/// Every stake in the slip has already been debited from the [`Bankroll`], so
/// `ledger.balance() + slip.total_staked()` stays constant while staging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BetSlip {
    bets: Vec<StagedBet>,
}

impl BetSlip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, bet: Bet, stake: Chips, ledger: &mut Bankroll) -> Result<()> {
        if stake.is_zero() {
            return Err(SessionError::InvalidStake);
        }
        ledger.debit(stake)?;
        self.bets.push(StagedBet::new(bet, stake));
        debug!(%bet, %stake, balance = %ledger.balance(), "staged bet");
        Ok(())
    }

    pub fn unstage(&mut self, index: usize, ledger: &mut Bankroll) -> Result<StagedBet> {
        if index >= self.bets.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.bets.len(),
            });
        }
        let removed = self.bets.remove(index);
        ledger.credit(removed.stake());
        debug!(bet = %removed.bet(), stake = %removed.stake(), "unstaged bet");
        Ok(removed)
    }

    /// Returns every stake to the ledger. Clearing an empty slip refunds
    /// nothing.
    pub fn clear(&mut self, ledger: &mut Bankroll) -> Chips {
        let refunded = self.total_staked();
        if !self.bets.is_empty() {
            ledger.credit(refunded);
            self.bets.clear();
            debug!(%refunded, "cleared bet slip");
        }
        refunded
    }

    /// Empties the slip without crediting. Only a settled spin does this: the
    /// resolver's bankroll already accounts for the stakes.
    pub(crate) fn discard(&mut self) {
        self.bets.clear();
    }

    pub fn snapshot(&self) -> Vec<StagedBet> {
        self.bets.clone()
    }

    pub fn total_staked(&self) -> Chips {
        self.bets.iter().map(StagedBet::stake).sum()
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StagedBet> {
        self.bets.iter()
    }
}
