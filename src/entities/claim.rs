//! Claim entity - Catalog items an identity has already settled.
//!
//! One row per paid library fine or event registration. Rows are written in the
//! same database transaction as the charge that paid for them (or on their own for
//! free events) and are never removed, so they outlive any one login.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Claim database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seq: i64,
    /// Identity holding the claim
    pub identity_id: String,
    /// `"fine"` or `"event"`
    pub kind: String,
    /// Catalog id of the fine or event
    pub item_id: String,
}

/// Defines relationships between Claim and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each claim belongs to one identity
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
