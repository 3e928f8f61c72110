//! Fixed-point chip amounts.
//!
//! Every balance and stake is an integer number of cents. Floats only appear at
//! the resolver wire boundary and are converted with [`Chips::from_f64`] /
//! [`Chips::as_f64`].

use std::{
    fmt,
    iter::Sum,
    str::FromStr,
};
use thiserror::Error;

const CENTS_PER_UNIT: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chips(u64);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChipsError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must not be negative: {0}")]
    Negative(String),
    #[error("amount is not a number: {0}")]
    Malformed(String),
    #[error("amount has more than two decimals: {0}")]
    TooPrecise(String),
    #[error("amount is out of range: {0}")]
    OutOfRange(String),
}

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub const fn from_cents(cents: u64) -> Self {
        Chips(cents)
    }

    pub const fn from_units(units: u64) -> Self {
        Chips(units * CENTS_PER_UNIT)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, rhs: Chips) -> Option<Chips> {
        self.0.checked_sub(rhs.0).map(Chips)
    }

    pub fn saturating_add(self, rhs: Chips) -> Chips {
        Chips(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_mul(self, factor: u64) -> Chips {
        Chips(self.0.saturating_mul(factor))
    }

    /// Converts a wire amount, rounding to the nearest cent.
    pub fn from_f64(value: f64) -> Result<Chips, ChipsError> {
        if !value.is_finite() {
            return Err(ChipsError::Malformed(value.to_string()));
        }
        if value < 0.0 {
            return Err(ChipsError::Negative(value.to_string()));
        }
        let cents = (value * CENTS_PER_UNIT as f64).round();
        if cents > u64::MAX as f64 {
            return Err(ChipsError::OutOfRange(value.to_string()));
        }
        Ok(Chips(cents as u64))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

// Accepts "10", "10.5", "10,50" and ".5".
impl FromStr for Chips {
    type Err = ChipsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChipsError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(ChipsError::Negative(trimmed.to_string()));
        }
        let normalized = trimmed.replace(',', ".");
        let (whole, fraction) = match normalized.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (normalized.as_str(), ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(ChipsError::Malformed(trimmed.to_string()));
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(ChipsError::Malformed(trimmed.to_string()));
        }
        if fraction.len() > 2 {
            return Err(ChipsError::TooPrecise(trimmed.to_string()));
        }

        let units: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ChipsError::OutOfRange(trimmed.to_string()))?
        };
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().unwrap_or_default() * 10,
            _ => fraction.parse::<u64>().unwrap_or_default(),
        };
        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .map(Chips)
            .ok_or_else(|| ChipsError::OutOfRange(trimmed.to_string()))
    }
}

impl Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, Chips::saturating_add)
    }
}

impl<'a> Sum<&'a Chips> for Chips {
    fn sum<I: Iterator<Item = &'a Chips>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
