//! Transaction factory - builds well-formed ledger entries.
//!
//! The factory assigns ids and timestamps and owns the per-category description
//! templates. It does not touch the database; the ledger store persists what it builds.

use crate::core::{
    category::{Category, Direction},
    clock::Clock,
    money::Amount,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// A transaction that has been built but not yet written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub id: String,
    pub identity_id: String,
    pub amount: Amount,
    pub direction: Direction,
    pub category: Category,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl PendingTransaction {
    /// Balance delta in minor units.
    #[must_use]
    pub const fn signed_minor_units(&self) -> i64 {
        self.direction.signed(self.amount.minor_units())
    }
}

/// Issues ids and monotonic timestamps for new transactions.
pub struct TransactionFactory {
    clock: Arc<dyn Clock>,
    last_issued: Mutex<Option<DateTime<Utc>>>,
}

impl TransactionFactory {
    /// Creates a factory reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_issued: Mutex::new(None),
        }
    }

    /// Current time according to the factory's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Builds a transaction stamped with the next timestamp.
    #[must_use]
    pub fn create(
        &self,
        identity_id: &str,
        amount: Amount,
        direction: Direction,
        category: Category,
        description: String,
    ) -> PendingTransaction {
        let timestamp = self.next_timestamp();
        build(identity_id, amount, direction, category, description, timestamp)
    }

    /// Builds a transaction dated `age` before now. Used only to import history.
    /// Backdated entries do not move the monotonic watermark.
    #[must_use]
    pub fn backdated(
        &self,
        identity_id: &str,
        amount: Amount,
        direction: Direction,
        category: Category,
        description: String,
        age: TimeDelta,
    ) -> PendingTransaction {
        let timestamp = self.clock.now() - age;
        build(identity_id, amount, direction, category, description, timestamp)
    }

    // A clock that steps backwards must not reorder the log
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self
            .last_issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        let timestamp = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(timestamp);
        timestamp
    }
}

fn build(
    identity_id: &str,
    amount: Amount,
    direction: Direction,
    category: Category,
    description: String,
    timestamp: DateTime<Utc>,
) -> PendingTransaction {
    PendingTransaction {
        id: Uuid::new_v4().to_string(),
        identity_id: identity_id.to_string(),
        amount,
        direction,
        category,
        description,
        timestamp,
    }
}

/// Description for a wallet top-up.
#[must_use]
pub fn top_up_description() -> String {
    "Wallet Top-up".to_string()
}

/// Description for a canteen order, listing lines in cart order:
/// `Canteen: 2x Veg Sandwich, 1x Cold Coffee`.
#[must_use]
pub fn canteen_description<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = (u32, &'a str)>,
{
    let items = lines
        .into_iter()
        .map(|(quantity, name)| format!("{quantity}x {name}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Canteen: {items}")
}

/// Description for paying library fines.
#[must_use]
pub fn library_fine_description() -> String {
    "Library Fine Payment".to_string()
}

/// Description for a cloud print job.
#[must_use]
pub fn print_description(pages: u32) -> String {
    format!("Cloud Print: {pages} pages")
}

/// Description for an event registration fee.
#[must_use]
pub fn event_description(title: &str) -> String {
    format!("Event: {title}")
}
