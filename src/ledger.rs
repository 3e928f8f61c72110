use crate::{
    error::{
        Result,
        SessionError,
    },
    money::Chips,
};

/// The player's available balance. Staging debits it, unstaging and refunds
/// credit it, and a settled spin overwrites it with the resolver's figure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bankroll {
    balance: Chips,
}

impl Bankroll {
    pub fn new(initial: Chips) -> Self {
        Self { balance: initial }
    }

    pub fn balance(&self) -> Chips {
        self.balance
    }

    pub fn debit(&mut self, amount: Chips) -> Result<()> {
        if amount.is_zero() {
            return Err(SessionError::InvalidStake);
        }
        self.balance = self.balance.checked_sub(amount).ok_or(
            SessionError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            },
        )?;
        Ok(())
    }

    pub fn credit(&mut self, amount: Chips) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn set_authoritative(&mut self, value: Chips) {
        self.balance = value;
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn debit__reduces_balance_within_limit() {
        // given
        let mut ledger = Bankroll::new(Chips::from_units(100));

        // when
        ledger.debit(Chips::from_units(100)).unwrap();

        // then
        assert_eq!(ledger.balance(), Chips::ZERO);
    }

    #[test]
    fn debit__rejects_overdraw_without_change() {
        let mut ledger = Bankroll::new(Chips::from_units(50));

        let err = ledger.debit(Chips::from_cents(5_001)).unwrap_err();

        assert_eq!(
            err,
            SessionError::InsufficientFunds {
                requested: Chips::from_cents(5_001),
                available: Chips::from_units(50),
            }
        );
        assert_eq!(ledger.balance(), Chips::from_units(50));
    }

    #[test]
    fn debit__rejects_zero() {
        let mut ledger = Bankroll::new(Chips::from_units(50));
        assert_eq!(ledger.debit(Chips::ZERO), Err(SessionError::InvalidStake));
        assert_eq!(ledger.balance(), Chips::from_units(50));
    }

    #[test]
    fn set_authoritative__overwrites_balance() {
        let mut ledger = Bankroll::new(Chips::from_units(1_000));
        ledger.credit(Chips::from_units(5));
        ledger.set_authoritative(Chips::from_units(900));
        assert_eq!(ledger.balance(), Chips::from_units(900));
    }
}
