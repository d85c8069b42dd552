//! Identity entity - One participant of the campus wallet (student, admin or vendor).
//!
//! The `balance_minor` column is the cached projection of the ledger, kept in sync
//! with the `transactions` table inside the same database transaction as every append.
//! `opening_balance_minor` is the roster value the projection starts from.
//! Amounts are stored as minor currency units (paise).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Identity database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "identities")]
pub struct Model {
    /// Roster identifier (e.g. `"u1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// `"student"`, `"admin"` or `"vendor"`; never changes after insert
    pub role: String,
    /// Cached balance in minor units
    pub balance_minor: i64,
    /// Balance the identity started the session with, in minor units
    pub opening_balance_minor: i64,
    /// Enrolment number, students only
    pub student_id: Option<String>,
    /// Department, students only
    pub department: Option<String>,
}

/// Defines relationships between Identity and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One identity owns many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
