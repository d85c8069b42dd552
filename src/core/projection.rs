//! Balance projection computed from scratch.
//!
//! The ledger keeps a cached balance per identity that is updated with every append.
//! This module recomputes the same number as a fold over the log so the two can be
//! compared; they must agree after every mutation.

use crate::core::transaction::Transaction;
use rust_decimal::Decimal;

/// Net effect of `entries` on `identity_id`: credits minus debits.
/// Entries belonging to other identities are ignored.
#[must_use]
pub fn net_flow(entries: &[Transaction], identity_id: &str) -> Decimal {
    entries
        .iter()
        .filter(|entry| entry.identity_id == identity_id)
        .map(Transaction::signed_amount)
        .sum()
}

/// Balance of `identity_id` starting from `opening` after applying `entries`.
#[must_use]
pub fn fold_balance(opening: Decimal, entries: &[Transaction], identity_id: &str) -> Decimal {
    opening + net_flow(entries, identity_id)
}
