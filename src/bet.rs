use crate::{
    money::Chips,
    wheel::{
        Color,
        Pocket,
    },
};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BetError {
    #[error("unknown bet kind: {0}")]
    UnknownKind(String),
    #[error("{0} bets need a selector")]
    MissingSelector(BetKind),
    #[error("invalid selector {selector:?} for a {kind} bet")]
    InvalidSelector { kind: BetKind, selector: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BetKind {
    Straight,
    Color,
    Parity,
    Dozen,
    Column,
    Half,
}

impl BetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BetKind::Straight => "straight",
            BetKind::Color => "color",
            BetKind::Parity => "parity",
            BetKind::Dozen => "dozen",
            BetKind::Column => "column",
            BetKind::Half => "half",
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorPick {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dozen {
    First,
    Second,
    Third,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    First,
    Second,
    Third,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Half {
    Low,
    High,
}

/// A wager target. Each kind carries exactly the selector it needs, so a bet
/// that exists is a bet the wheel can settle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bet {
    Straight(Pocket),
    Color(ColorPick),
    Parity(Parity),
    Dozen(Dozen),
    Column(Column),
    Half(Half),
}

impl Bet {
    pub fn kind(&self) -> BetKind {
        match self {
            Bet::Straight(_) => BetKind::Straight,
            Bet::Color(_) => BetKind::Color,
            Bet::Parity(_) => BetKind::Parity,
            Bet::Dozen(_) => BetKind::Dozen,
            Bet::Column(_) => BetKind::Column,
            Bet::Half(_) => BetKind::Half,
        }
    }

    /// Builds a bet from a kind name and its selector, e.g.
    /// `("straight", Some("00"))` or `("dozen", Some("2"))`.
    pub fn parse(kind: &str, selector: Option<&str>) -> Result<Bet, BetError> {
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "straight" => BetKind::Straight,
            "color" => BetKind::Color,
            "parity" => BetKind::Parity,
            "dozen" => BetKind::Dozen,
            "column" => BetKind::Column,
            "half" => BetKind::Half,
            other => return Err(BetError::UnknownKind(other.to_string())),
        };
        let selector = selector
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(BetError::MissingSelector(kind))?;
        let invalid = || BetError::InvalidSelector {
            kind,
            selector: selector.to_string(),
        };
        let bet = match (kind, selector.to_ascii_lowercase().as_str()) {
            (BetKind::Straight, s) => {
                Bet::Straight(s.parse().map_err(|_| invalid())?)
            }
            (BetKind::Color, "red") => Bet::Color(ColorPick::Red),
            (BetKind::Color, "black") => Bet::Color(ColorPick::Black),
            (BetKind::Parity, "even") => Bet::Parity(Parity::Even),
            (BetKind::Parity, "odd") => Bet::Parity(Parity::Odd),
            (BetKind::Dozen, "1" | "1st12") => Bet::Dozen(Dozen::First),
            (BetKind::Dozen, "2" | "2nd12") => Bet::Dozen(Dozen::Second),
            (BetKind::Dozen, "3" | "3rd12") => Bet::Dozen(Dozen::Third),
            (BetKind::Column, "1" | "col1") => Bet::Column(Column::First),
            (BetKind::Column, "2" | "col2") => Bet::Column(Column::Second),
            (BetKind::Column, "3" | "col3") => Bet::Column(Column::Third),
            (BetKind::Half, "low" | "1to18") => Bet::Half(Half::Low),
            (BetKind::Half, "high" | "19to36") => Bet::Half(Half::High),
            _ => return Err(invalid()),
        };
        Ok(bet)
    }

    /// Resolver `type` field. Outside bets fold their selector into the
    /// type name; only straight bets send a separate `value`.
    pub fn wire_type(&self) -> &'static str {
        match self {
            Bet::Straight(_) => "straight",
            Bet::Color(ColorPick::Red) => "red",
            Bet::Color(ColorPick::Black) => "black",
            Bet::Parity(Parity::Even) => "even",
            Bet::Parity(Parity::Odd) => "odd",
            Bet::Dozen(Dozen::First) => "1st12",
            Bet::Dozen(Dozen::Second) => "2nd12",
            Bet::Dozen(Dozen::Third) => "3rd12",
            Bet::Column(Column::First) => "col1",
            Bet::Column(Column::Second) => "col2",
            Bet::Column(Column::Third) => "col3",
            Bet::Half(Half::Low) => "1to18",
            Bet::Half(Half::High) => "19to36",
        }
    }

    pub fn wire_value(&self) -> Option<Pocket> {
        match self {
            Bet::Straight(pocket) => Some(*pocket),
            _ => None,
        }
    }

    pub fn selector(&self) -> String {
        match self {
            Bet::Straight(pocket) => pocket.to_string(),
            Bet::Color(ColorPick::Red) => "red".to_string(),
            Bet::Color(ColorPick::Black) => "black".to_string(),
            Bet::Parity(Parity::Even) => "even".to_string(),
            Bet::Parity(Parity::Odd) => "odd".to_string(),
            Bet::Dozen(_) | Bet::Column(_) | Bet::Half(_) => self.wire_type().to_string(),
        }
    }

    pub fn wins(&self, pocket: Pocket) -> bool {
        // 0 and 00 only pay straight bets.
        let n = match (self, pocket.number()) {
            (Bet::Straight(target), _) => return *target == pocket,
            (_, Some(n)) if !pocket.is_green() => n,
            _ => return false,
        };
        match self {
            Bet::Straight(_) => false,
            Bet::Color(ColorPick::Red) => pocket.color() == Color::Red,
            Bet::Color(ColorPick::Black) => pocket.color() == Color::Black,
            Bet::Parity(Parity::Even) => n % 2 == 0,
            Bet::Parity(Parity::Odd) => n % 2 == 1,
            Bet::Dozen(Dozen::First) => (1..=12).contains(&n),
            Bet::Dozen(Dozen::Second) => (13..=24).contains(&n),
            Bet::Dozen(Dozen::Third) => (25..=36).contains(&n),
            Bet::Column(column) => {
                let index = (n - 1) % 3;
                matches!(
                    (column, index),
                    (Column::First, 0) | (Column::Second, 1) | (Column::Third, 2)
                )
            }
            Bet::Half(Half::Low) => (1..=18).contains(&n),
            Bet::Half(Half::High) => (19..=36).contains(&n),
        }
    }

    /// Winnings per chip staged, excluding the returned stake.
    pub fn payout_multiplier(&self) -> u64 {
        match self {
            Bet::Straight(_) => 35,
            Bet::Dozen(_) | Bet::Column(_) => 2,
            Bet::Color(_) | Bet::Parity(_) | Bet::Half(_) => 1,
        }
    }

    /// Amount returned to the player when this bet wins: stake plus winnings.
    pub fn gross_return(&self, stake: Chips) -> Chips {
        stake.saturating_mul(self.payout_multiplier() + 1)
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.selector())
    }
}

/// One wager in the bet slip. Immutable once staged; changing a wager means
/// removing it and staging a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagedBet {
    bet: Bet,
    stake: Chips,
}

impl StagedBet {
    pub fn new(bet: Bet, stake: Chips) -> Self {
        Self { bet, stake }
    }

    pub fn bet(&self) -> Bet {
        self.bet
    }

    pub fn stake(&self) -> Chips {
        self.stake
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn pocket(n: u8) -> Pocket {
        Pocket::from_number(n).unwrap()
    }

    #[test]
    fn parse__builds_each_kind_from_its_selector() {
        assert_eq!(
            Bet::parse("straight", Some("17")),
            Ok(Bet::Straight(pocket(17)))
        );
        assert_eq!(
            Bet::parse("straight", Some("00")),
            Ok(Bet::Straight(Pocket::DOUBLE_ZERO))
        );
        assert_eq!(Bet::parse("color", Some("Red")), Ok(Bet::Color(ColorPick::Red)));
        assert_eq!(Bet::parse("parity", Some("odd")), Ok(Bet::Parity(Parity::Odd)));
        assert_eq!(Bet::parse("dozen", Some("2nd12")), Ok(Bet::Dozen(Dozen::Second)));
        assert_eq!(Bet::parse("column", Some("3")), Ok(Bet::Column(Column::Third)));
        assert_eq!(Bet::parse("half", Some("19to36")), Ok(Bet::Half(Half::High)));
    }

    #[test]
    fn parse__rejects_missing_or_invalid_selectors() {
        assert_eq!(
            Bet::parse("straight", None),
            Err(BetError::MissingSelector(BetKind::Straight))
        );
        assert_eq!(
            Bet::parse("color", Some("  ")),
            Err(BetError::MissingSelector(BetKind::Color))
        );
        assert!(matches!(
            Bet::parse("straight", Some("37")),
            Err(BetError::InvalidSelector { kind: BetKind::Straight, .. })
        ));
        assert!(matches!(
            Bet::parse("color", Some("green")),
            Err(BetError::InvalidSelector { kind: BetKind::Color, .. })
        ));
        assert!(matches!(
            Bet::parse("column", Some("4")),
            Err(BetError::InvalidSelector { kind: BetKind::Column, .. })
        ));
        assert!(matches!(
            Bet::parse("corner", Some("1")),
            Err(BetError::UnknownKind(_))
        ));
    }

    #[test]
    fn wins__green_pockets_lose_every_outside_bet() {
        let outside = [
            Bet::Color(ColorPick::Red),
            Bet::Color(ColorPick::Black),
            Bet::Parity(Parity::Even),
            Bet::Parity(Parity::Odd),
            Bet::Dozen(Dozen::First),
            Bet::Column(Column::First),
            Bet::Column(Column::Second),
            Bet::Column(Column::Third),
            Bet::Half(Half::Low),
            Bet::Half(Half::High),
        ];
        for bet in outside {
            assert!(!bet.wins(Pocket::ZERO), "{bet} won on 0");
            assert!(!bet.wins(Pocket::DOUBLE_ZERO), "{bet} won on 00");
        }
        assert!(Bet::Straight(Pocket::ZERO).wins(Pocket::ZERO));
        assert!(!Bet::Straight(Pocket::ZERO).wins(Pocket::DOUBLE_ZERO));
        assert!(Bet::Straight(Pocket::DOUBLE_ZERO).wins(Pocket::DOUBLE_ZERO));
    }

    #[test]
    fn wins__outside_bets_follow_the_table_layout() {
        assert!(Bet::Color(ColorPick::Black).wins(pocket(17)));
        assert!(!Bet::Color(ColorPick::Red).wins(pocket(17)));
        assert!(Bet::Parity(Parity::Odd).wins(pocket(17)));
        assert!(Bet::Dozen(Dozen::Second).wins(pocket(17)));
        assert!(Bet::Column(Column::Second).wins(pocket(17)));
        assert!(Bet::Column(Column::First).wins(pocket(34)));
        assert!(Bet::Column(Column::Third).wins(pocket(36)));
        assert!(Bet::Half(Half::Low).wins(pocket(18)));
        assert!(Bet::Half(Half::High).wins(pocket(19)));
    }

    #[test]
    fn gross_return__includes_the_stake() {
        let stake = Chips::from_units(10);
        assert_eq!(
            Bet::Straight(pocket(1)).gross_return(stake),
            Chips::from_units(360)
        );
        assert_eq!(
            Bet::Dozen(Dozen::First).gross_return(stake),
            Chips::from_units(30)
        );
        assert_eq!(
            Bet::Color(ColorPick::Red).gross_return(stake),
            Chips::from_units(20)
        );
    }
}
