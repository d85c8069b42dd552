//! Database configuration module for the wallet ledger.
//!
//! The ledger lives in an in-memory `SQLite` database for the lifetime of one store.
//! Nothing is written to disk. Tables are generated from the `SeaORM` entity
//! definitions with `Schema::create_table_from_entity`, so the schema always matches
//! the Rust structs.

use crate::entities::{ClaimEntity, IdentityEntity, TransactionEntity};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Connection string for the session-scoped ledger database.
pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Opens a fresh, empty in-memory database.
///
/// Every call yields an independent database, which is what gives each
/// [`LedgerStore`](crate::core::ledger::LedgerStore) its own isolated state.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(IN_MEMORY_DATABASE_URL)
        .await
        .map_err(Into::into)
}

/// Creates the `identities`, `transactions` and `claims` tables.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let identity_table = schema.create_table_from_entity(IdentityEntity);
    let transaction_table = schema.create_table_from_entity(TransactionEntity);
    let claim_table = schema.create_table_from_entity(ClaimEntity);

    db.execute(builder.build(&identity_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&claim_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClaimModel, IdentityModel, TransactionModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection().await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<IdentityModel> = IdentityEntity::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = TransactionEntity::find().limit(1).all(&db).await?;
        let _: Vec<ClaimModel> = ClaimEntity::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_connections_are_isolated() -> Result<()> {
        let first = create_connection().await?;
        create_tables(&first).await?;

        // A second connection starts empty, so creating tables again must succeed
        let second = create_connection().await?;
        create_tables(&second).await?;
        Ok(())
    }
}
