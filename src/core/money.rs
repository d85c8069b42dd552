//! Money - strictly positive transaction amounts.
//!
//! The sign of a ledger movement is carried by [`Direction`](super::category::Direction),
//! never by the amount. Amounts are held as minor currency units (two decimal places)
//! so the database can update balances with integer arithmetic.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional digits kept for every amount and balance.
pub const CURRENCY_SCALE: u32 = 2;

/// A strictly positive amount with at most two fractional digits.
///
/// # Invariant
/// The inner minor-unit value is always > 0. This is enforced by the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(i64);

impl Amount {
    /// Validates a decimal amount.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] if the value is zero, negative, has more than
    /// two fractional digits, or does not fit in minor units.
    pub fn new(value: Decimal) -> Result<Self> {
        let invalid = || Error::InvalidAmount { amount: value };

        if value <= Decimal::ZERO {
            return Err(invalid());
        }

        to_minor_units(value).map(Self)
    }

    /// Rebuilds an amount from stored minor units.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] for non-positive values.
    pub fn from_minor_units(minor: i64) -> Result<Self> {
        if minor <= 0 {
            return Err(Error::InvalidAmount {
                amount: from_minor_units(minor),
            });
        }
        Ok(Self(minor))
    }

    /// Amount in minor units (paise).
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Amount as a decimal with two fractional digits.
    #[must_use]
    pub fn value(self) -> Decimal {
        from_minor_units(self.0)
    }
}

/// Converts a signed currency value (such as a starting balance) into minor units.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if the value has more than two fractional
/// digits or does not fit in an `i64`.
pub fn to_minor_units(value: Decimal) -> Result<i64> {
    let invalid = || Error::InvalidAmount { amount: value };

    let minor = value
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(invalid)?;
    if !minor.fract().is_zero() {
        return Err(invalid());
    }

    minor.to_i64().ok_or_else(invalid)
}

/// Converts stored minor units into a decimal currency value.
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, CURRENCY_SCALE)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
