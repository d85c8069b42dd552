//! Per-role navigation targets.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};

/// Screens available to a student.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StudentView {
    #[default]
    Dashboard,
    Wallet,
    Canteen,
    Library,
    Print,
    Events,
}

/// Screens available to an administrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminView {
    #[default]
    Dashboard,
}

/// Screens available to a vendor terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VendorView {
    #[default]
    Terminal,
}
