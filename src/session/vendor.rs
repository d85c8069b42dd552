//! Vendor session - a point-of-sale terminal.
//!
//! Payment processing is an authorization check only. Nothing is written to the
//! ledger, so a vendor can never change a student's balance.

use crate::{
    core::identity::Identity,
    session::view::VendorView,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// Result of a terminal payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentOutcome {
    Approved,
    Declined,
}

/// A logged-in vendor terminal.
pub struct VendorSession {
    identity: Identity,
    view: VendorView,
}

impl VendorSession {
    pub(crate) fn new(identity: Identity) -> Self {
        Self {
            identity,
            view: VendorView::default(),
        }
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub const fn view(&self) -> VendorView {
        self.view
    }

    /// Approves a payment when the amount is positive and a student id was entered.
    #[must_use]
    pub fn process_payment(&self, amount: Decimal, student_id: &str) -> PaymentOutcome {
        let outcome = if amount > Decimal::ZERO && !student_id.trim().is_empty() {
            PaymentOutcome::Approved
        } else {
            PaymentOutcome::Declined
        };

        info!(
            "Terminal {} payment of {} for '{}': {:?}",
            self.identity.id, amount, student_id, outcome
        );
        outcome
    }
}
