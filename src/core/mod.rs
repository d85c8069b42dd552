//! Core business logic - framework-agnostic ledger, views and campus services
//!
//! Everything here works against a [`ledger::LedgerStore`] and plain data; the
//! session layer decides which identity may call what.

/// Canteen menu, library fines, events and print pricing
pub mod catalog;
/// Ledger categories and entry directions
pub mod category;
/// Injectable time source
pub mod clock;
/// Transaction construction and description templates
pub mod factory;
/// Roles, roster profiles and identity snapshots
pub mod identity;
/// The ledger store: identities, balances and the transaction log
pub mod ledger;
/// Fixed-point amounts in minor currency units
pub mod money;
/// Balance folds over the transaction log
pub mod projection;
/// Top-up, canteen, library, print and event flows
pub mod services;
/// The domain transaction record
pub mod transaction;
/// Dashboard and overview figures derived from the log
pub mod views;
