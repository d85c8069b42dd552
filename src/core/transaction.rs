//! Ledger entries as handed to callers.
//!
//! A [`Transaction`] is immutable once created. Corrections are modelled as new
//! offsetting entries, never as edits.

use crate::{
    core::{
        category::{Category, Direction},
        money::Amount,
    },
    entities::transaction,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique id (UUID v4)
    pub id: String,
    /// Identity whose balance this entry moved
    pub identity_id: String,
    /// Magnitude, always positive
    pub amount: Amount,
    /// Sign of the movement
    pub direction: Direction,
    /// What the movement was for
    pub category: Category,
    /// Human-readable description
    pub description: String,
    /// Creation time; non-decreasing across appends
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the direction's sign applied (credits positive, debits negative).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Credit => self.amount.value(),
            Direction::Debit => -self.amount.value(),
        }
    }

    /// Returns true for debits.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }
}

impl TryFrom<transaction::Model> for Transaction {
    type Error = Error;

    fn try_from(model: transaction::Model) -> Result<Self> {
        Ok(Self {
            amount: Amount::from_minor_units(model.amount_minor)?,
            direction: model.direction.parse()?,
            category: model.category.parse()?,
            id: model.id,
            identity_id: model.identity_id,
            description: model.description,
            timestamp: model.timestamp,
        })
    }
}
