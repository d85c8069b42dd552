//! Closed classifications carried by every ledger entry.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// What a transaction paid for (or, for `Topup`, where the money came from).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    /// Canteen orders
    Canteen,
    /// Library fine payments
    Library,
    /// Cloud print jobs
    Print,
    /// Event registration fees
    Event,
    /// Wallet top-ups
    Topup,
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::iter()
            .find(|category| category.as_ref() == s)
            .ok_or_else(|| Error::UnknownCategory {
                category: s.to_string(),
            })
    }
}

/// Whether a transaction increases (credit) or decreases (debit) a balance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Adds to the balance
    Credit,
    /// Subtracts from the balance
    Debit,
}

impl Direction {
    /// Applies the direction's sign to a magnitude.
    #[must_use]
    pub const fn signed(self, minor_units: i64) -> i64 {
        match self {
            Self::Credit => minor_units,
            Self::Debit => -minor_units,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::iter()
            .find(|direction| direction.as_ref() == s)
            .ok_or_else(|| Error::UnknownDirection {
                direction: s.to_string(),
            })
    }
}

/// Kinds of catalog item that can be settled once per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClaimKind {
    /// A paid library fine
    Fine,
    /// An event registration, free or paid
    Event,
}
