//! Identities - the participants of a wallet session.

use crate::{
    core::money::from_minor_units,
    entities::identity,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// The one role an identity holds for its whole lifetime.
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
pub enum Role {
    /// Wallet owner using campus services
    Student,
    /// Read-only overview of the whole ledger
    Admin,
    /// Point-of-sale terminal
    Vendor,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::iter()
            .find(|role| role.as_ref() == s)
            .ok_or_else(|| Error::UnknownRole {
                role: s.to_string(),
            })
    }
}

/// A roster entry: everything needed to create an identity at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Unique id (e.g. `"u1"`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Role held for the session
    pub role: Role,
    /// Starting balance
    #[serde(default)]
    pub balance: Decimal,
    /// Enrolment number, students only
    #[serde(default)]
    pub student_id: Option<String>,
    /// Department, students only
    #[serde(default)]
    pub department: Option<String>,
}

/// Snapshot of an identity as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Cached balance projection at the time the snapshot was read
    pub balance: Decimal,
    pub student_id: Option<String>,
    pub department: Option<String>,
}

impl TryFrom<identity::Model> for Identity {
    type Error = Error;

    fn try_from(model: identity::Model) -> Result<Self> {
        Ok(Self {
            role: model.role.parse()?,
            balance: from_minor_units(model.balance_minor),
            id: model.id,
            name: model.name,
            student_id: model.student_id,
            department: model.department,
        })
    }
}

/// The demo roster: one identity per role.
#[must_use]
pub fn demo_roster() -> Vec<IdentityProfile> {
    vec![
        IdentityProfile {
            id: "u1".to_string(),
            name: "Rahul Sharma".to_string(),
            role: Role::Student,
            balance: Decimal::new(125_000, 2),
            student_id: Some("CS2024001".to_string()),
            department: Some("Computer Science".to_string()),
        },
        IdentityProfile {
            id: "a1".to_string(),
            name: "Campus Admin".to_string(),
            role: Role::Admin,
            balance: Decimal::ZERO,
            student_id: None,
            department: None,
        },
        IdentityProfile {
            id: "v1".to_string(),
            name: "Main Canteen POS".to_string(),
            role: Role::Vendor,
            balance: Decimal::ZERO,
            student_id: None,
            department: None,
        },
    ]
}
