//! Shared test utilities for `unicard`.
//!
//! Helpers for building in-memory ledger stores on a pinned clock and checking
//! the cached balances against the transaction log.

#![allow(clippy::unwrap_used)]

use crate::{
    config::app::AppConfig,
    core::{
        clock::{Clock, ManualClock},
        identity::{IdentityProfile, Role},
        ledger::LedgerStore,
    },
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

pub use crate::config::logging::init_test_tracing;

/// Id of the student added by [`setup_with_student`].
pub const TEST_STUDENT_ID: &str = "s-test";

/// The instant every test clock starts at.
#[must_use]
pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
}

/// Creates a store holding the demo roster (no history) on a manual clock.
/// This is the standard setup for ledger tests.
pub async fn setup_test_store() -> Result<(LedgerStore, Arc<ManualClock>)> {
    let clock = Arc::new(ManualClock::new(fixed_start()));
    let store = LedgerStore::open(&AppConfig::default(), Arc::clone(&clock) as Arc<dyn Clock>).await?;
    Ok((store, clock))
}

/// Sets up the demo store plus one extra student with the given balance.
/// Returns (store, clock, `student_id`).
pub async fn setup_with_student(
    balance: Decimal,
) -> Result<(LedgerStore, Arc<ManualClock>, String)> {
    let (store, clock) = setup_test_store().await?;
    store
        .register_identity(&IdentityProfile {
            id: TEST_STUDENT_ID.to_string(),
            name: "Test Student".to_string(),
            role: Role::Student,
            balance,
            student_id: Some("TS0001".to_string()),
            department: None,
        })
        .await?;
    Ok((store, clock, TEST_STUDENT_ID.to_string()))
}

/// Asserts that the cached balance equals the opening balance folded over the log.
pub async fn assert_projection_agrees(store: &LedgerStore, identity_id: &str) -> Result<()> {
    let cached = store.balance(identity_id).await?;
    let projected = store.projected_balance(identity_id).await?;
    assert_eq!(
        cached, projected,
        "cached balance of {identity_id} drifted from its transaction log"
    );
    Ok(())
}
