//! American wheel: 38 pockets (`0`, `00`, `1..=36`) and their colors.

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de,
};
use std::{
    fmt,
    str::FromStr,
};
use thiserror::Error;

pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

pub const POCKET_COUNT: u8 = 38;

const DOUBLE_ZERO_INDEX: u8 = 37;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("not a pocket on the wheel: {0}")]
pub struct InvalidPocket(pub String);

/// A pocket on the wheel. Index 37 stands for `00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pocket(u8);

impl Pocket {
    pub const ZERO: Pocket = Pocket(0);
    pub const DOUBLE_ZERO: Pocket = Pocket(DOUBLE_ZERO_INDEX);

    pub fn from_number(n: u8) -> Option<Pocket> {
        (n <= 36).then_some(Pocket(n))
    }

    pub(crate) fn from_index(index: u8) -> Option<Pocket> {
        (index < POCKET_COUNT).then_some(Pocket(index))
    }

    pub fn all() -> impl Iterator<Item = Pocket> {
        (0..POCKET_COUNT).map(Pocket)
    }

    /// The pocket's number, `None` for `00`.
    pub fn number(self) -> Option<u8> {
        (self.0 != DOUBLE_ZERO_INDEX).then_some(self.0)
    }

    /// `0` and `00`.
    pub fn is_green(self) -> bool {
        self.0 == 0 || self.0 == DOUBLE_ZERO_INDEX
    }

    pub fn color(self) -> Color {
        match self.number() {
            Some(n) if RED_NUMBERS.contains(&n) => Color::Red,
            Some(n) if n != 0 => Color::Black,
            _ => Color::Green,
        }
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("00"),
        }
    }
}

impl FromStr for Pocket {
    type Err = InvalidPocket;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed == "00" {
            return Ok(Pocket::DOUBLE_ZERO);
        }
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Pocket::from_number)
            .ok_or_else(|| InvalidPocket(trimmed.to_string()))
    }
}

impl Serialize for Pocket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.number() {
            Some(n) => serializer.serialize_u8(n),
            None => serializer.serialize_str("00"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PocketRepr {
    Number(u64),
    Label(String),
}

impl<'de> Deserialize<'de> for Pocket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PocketRepr::deserialize(deserializer)? {
            PocketRepr::Number(n) => u8::try_from(n)
                .ok()
                .and_then(Pocket::from_number)
                .ok_or_else(|| de::Error::custom(InvalidPocket(n.to_string()))),
            PocketRepr::Label(label) => label.parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Red => "red",
            Color::Black => "black",
            Color::Green => "green",
        })
    }
}
