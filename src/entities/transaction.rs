//! Transaction entity - Append-only ledger rows.
//!
//! Rows are never updated or deleted. `seq` is the insertion sequence and breaks
//! ties between equal timestamps; `id` is the public UUID handed to callers.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Insertion sequence
    #[sea_orm(primary_key)]
    pub seq: i64,
    /// Public transaction id (UUID v4)
    #[sea_orm(unique)]
    pub id: String,
    /// Owning identity
    pub identity_id: String,
    /// Strictly positive amount in minor units; the sign lives in `direction`
    pub amount_minor: i64,
    /// `"credit"` or `"debit"`
    pub direction: String,
    /// `"canteen"`, `"library"`, `"print"`, `"event"` or `"topup"`
    pub category: String,
    /// Human-readable description
    pub description: String,
    /// When the transaction was created
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one identity
    #[sea_orm(
        belongs_to = "super::identity::Entity",
        from = "Column::IdentityId",
        to = "super::identity::Column::Id"
    )]
    Identity,
}

impl Related<super::identity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Identity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
