//! Aggregate views - read-only figures derived from the transaction log.
//!
//! Nothing here is stored. Every figure is recomputed from a history slice on each
//! read, so the student dashboard, the admin overview and any vendor check all see
//! the same snapshot of the ledger. Sums are order-independent; only
//! [`recent_activity`] relies on the log's most-recent-first order.

use crate::{
    core::{
        category::{Category, Direction},
        identity::Identity,
        ledger::LedgerStore,
        transaction::Transaction,
    },
    errors::Result,
};
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Number of entries shown in "recent activity" lists.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Length of the trailing spending window, in days.
pub const MONTHLY_WINDOW_DAYS: i64 = 30;

/// The first `n` entries of a most-recent-first history.
#[must_use]
pub fn recent_activity(history: &[Transaction], n: usize) -> &[Transaction] {
    &history[..n.min(history.len())]
}

/// Debit totals per category for one identity. Every category is present,
/// with zero where nothing was spent.
#[must_use]
pub fn spend_by_category(history: &[Transaction], identity_id: &str) -> BTreeMap<Category, Decimal> {
    let mut totals: BTreeMap<Category, Decimal> =
        Category::iter().map(|category| (category, Decimal::ZERO)).collect();

    for entry in debits_of(history, identity_id) {
        *totals.entry(entry.category).or_default() += entry.amount.value();
    }
    totals
}

/// Sum of one identity's debits made within the 30 days ending at `now`.
/// Entries at or before `now - 30 days` are excluded.
#[must_use]
pub fn monthly_spend(history: &[Transaction], identity_id: &str, now: DateTime<Utc>) -> Decimal {
    let window_start = now - TimeDelta::days(MONTHLY_WINDOW_DAYS);
    debits_of(history, identity_id)
        .filter(|entry| entry.timestamp > window_start && entry.timestamp <= now)
        .map(|entry| entry.amount.value())
        .sum()
}

/// Sum of every amount in the log regardless of direction (admin volume figure).
#[must_use]
pub fn total_volume(history: &[Transaction]) -> Decimal {
    history.iter().map(|entry| entry.amount.value()).sum()
}

fn debits_of<'a>(
    history: &'a [Transaction],
    identity_id: &'a str,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    history
        .iter()
        .filter(move |entry| entry.identity_id == identity_id && entry.is_debit())
}

/// Everything the student wallet view renders.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    /// The student, with the balance read in the same pass as the history
    pub identity: Identity,
    /// Latest entries, most recent first
    pub recent_transactions: Vec<Transaction>,
    /// Debit totals per category
    pub spend_by_category: BTreeMap<Category, Decimal>,
    /// Debits within the trailing 30 days
    pub monthly_spend: Decimal,
}

/// Builds the dashboard for one student at the store's current time.
pub async fn student_dashboard(store: &LedgerStore, identity_id: &str) -> Result<StudentDashboard> {
    let identity = store.identity(identity_id).await?;
    let history = store.history_for(identity_id).await?;
    let now = store.now();

    Ok(StudentDashboard {
        recent_transactions: recent_activity(&history, DEFAULT_RECENT_LIMIT).to_vec(),
        spend_by_category: spend_by_category(&history, identity_id),
        monthly_spend: monthly_spend(&history, identity_id, now),
        identity,
    })
}

/// Figures for the administrator's system overview.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    /// Sum of all amounts in the log
    pub total_volume: Decimal,
    /// Number of entries in the log
    pub transaction_count: usize,
    /// Latest entries across all identities
    pub recent_transactions: Vec<Transaction>,
}

/// Builds the admin overview over the whole log.
pub async fn admin_overview(store: &LedgerStore) -> Result<AdminOverview> {
    let history = store.history().await?;

    Ok(AdminOverview {
        total_volume: total_volume(&history),
        transaction_count: history.len(),
        recent_transactions: recent_activity(&history, DEFAULT_RECENT_LIMIT).to_vec(),
    })
}

/// Formats an entry's amount with its sign and currency: `+₹500.00` or `-₹80.00`.
#[must_use]
pub fn format_transaction_amount(transaction: &Transaction) -> String {
    let sign = match transaction.direction {
        Direction::Credit => '+',
        Direction::Debit => '-',
    };
    format!("{sign}₹{:.2}", transaction.amount.value())
}

/// One-line summary of an entry for activity lists.
#[must_use]
pub fn format_transaction_summary(transaction: &Transaction) -> String {
    format!(
        "{} | {} | {}",
        format_transaction_amount(transaction),
        transaction.category,
        transaction.description
    )
}
