//! Entity module - SeaORM entity definitions for the in-memory ledger database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod claim;
pub mod identity;
pub mod transaction;

// Re-export with explicit names so they never clash with the domain types in `core`
pub use claim::{Column as ClaimColumn, Entity as ClaimEntity, Model as ClaimModel};
pub use identity::{Column as IdentityColumn, Entity as IdentityEntity, Model as IdentityModel};
pub use transaction::{
    Column as TransactionColumn, Entity as TransactionEntity, Model as TransactionModel,
};
