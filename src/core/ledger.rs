//! Ledger store - the single authority for balances and transaction history.
//!
//! A [`LedgerStore`] owns one in-memory database holding the identities of a session
//! and the system-wide, append-only transaction log. Every write inserts the new
//! transaction and updates the owner's cached balance inside the same database
//! transaction, so the cached projection can never drift from the log.
//!
//! Writes for one identity are serialized through a per-identity async mutex; reads
//! never take those locks. [`LedgerStore::append`] is the raw ledger primitive and
//! applies no floor check. [`LedgerStore::charge`] is the guarded debit: it reads the
//! balance, checks it covers the charge and writes the debit as one atomic unit.
//! The store also keeps the claims (paid fines, event registrations) those debits
//! settle, so they hold for the whole run rather than for one login.

use crate::{
    config::{
        app::AppConfig,
        database::{create_connection, create_tables},
    },
    core::{
        category::{Category, ClaimKind, Direction},
        clock::Clock,
        factory::{PendingTransaction, TransactionFactory, top_up_description},
        identity::{Identity, IdentityProfile, Role},
        money::{Amount, from_minor_units, to_minor_units},
        projection,
        transaction::Transaction,
    },
    entities::{
        ClaimColumn, ClaimEntity, IdentityColumn, IdentityEntity, TransactionColumn,
        TransactionEntity, claim, identity, transaction,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// One historical entry to import when a session starts with existing activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    /// How long before "now" the entry happened
    pub age: TimeDelta,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
    pub description: String,
}

/// Recent activity shown on the demo student dashboard.
#[must_use]
pub fn demo_history() -> Vec<SeedEntry> {
    vec![
        SeedEntry {
            age: TimeDelta::hours(1),
            amount: Decimal::new(80, 0),
            direction: Direction::Debit,
            category: Category::Canteen,
            description: "Canteen: 1x Veg Sandwich".to_string(),
        },
        SeedEntry {
            age: TimeDelta::days(1),
            amount: Decimal::new(500, 0),
            direction: Direction::Credit,
            category: Category::Topup,
            description: top_up_description(),
        },
    ]
}

#[derive(Default)]
struct IdentityLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    fn for_identity(&self, identity_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(identity_id.to_string()).or_default())
    }
}

/// Session-scoped ledger: identities, cached balances and the transaction log.
///
/// Built once per application run (see [`LedgerStore::open`]) and shared by every
/// session through [`crate::session::AppData`]; nothing outlives the process.
pub struct LedgerStore {
    db: DatabaseConnection,
    factory: TransactionFactory,
    locks: IdentityLocks,
}

impl LedgerStore {
    /// Creates an empty store (no identities) on a fresh in-memory database.
    pub async fn new(clock: Arc<dyn Clock>) -> Result<Self> {
        let db = create_connection().await?;
        create_tables(&db).await?;

        Ok(Self {
            db,
            factory: TransactionFactory::new(clock),
            locks: IdentityLocks::default(),
        })
    }

    /// Creates a store populated with the configured roster, importing the demo
    /// history for every student when the configuration asks for it.
    pub async fn open(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = Self::new(clock).await?;

        for profile in &config.roster {
            store.register_identity(profile).await?;
        }

        if config.seed_demo_history {
            let students = config
                .roster
                .iter()
                .filter(|profile| profile.role == Role::Student);
            for profile in students {
                store.seed_history(&profile.id, &demo_history()).await?;
            }
        }

        info!(
            "Ledger opened with {} identities (demo history: {})",
            config.roster.len(),
            config.seed_demo_history
        );
        Ok(store)
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.factory.now()
    }

    /// Adds an identity with its starting balance.
    ///
    /// # Errors
    /// Fails if the balance is not representable in minor units or the id is taken.
    pub async fn register_identity(&self, profile: &IdentityProfile) -> Result<Identity> {
        let balance_minor = to_minor_units(profile.balance)?;

        let model = identity::ActiveModel {
            id: Set(profile.id.clone()),
            name: Set(profile.name.clone()),
            role: Set(profile.role.to_string()),
            balance_minor: Set(balance_minor),
            opening_balance_minor: Set(balance_minor),
            student_id: Set(profile.student_id.clone()),
            department: Set(profile.department.clone()),
        }
        .insert(&self.db)
        .await?;

        debug!("Registered identity {} as {}", profile.id, profile.role);
        Identity::try_from(model)
    }

    /// Looks up an identity snapshot (including its current cached balance).
    pub async fn identity(&self, identity_id: &str) -> Result<Identity> {
        find_identity(&self.db, identity_id)
            .await
            .and_then(Identity::try_from)
    }

    /// Returns the first roster identity (by id) holding `role`.
    pub async fn identity_for_role(&self, role: Role) -> Result<Identity> {
        IdentityEntity::find()
            .filter(IdentityColumn::Role.eq(role.as_ref()))
            .order_by_asc(IdentityColumn::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::NoIdentityForRole {
                role: role.to_string(),
            })
            .and_then(Identity::try_from)
    }

    /// Appends a transaction and applies it to the owner's cached balance.
    ///
    /// No floor check is made: a debit may take the balance negative. Use
    /// [`LedgerStore::charge`] when the debit must be covered by the balance.
    ///
    /// # Errors
    /// - [`Error::InvalidAmount`] for a non-positive or over-precise amount, or one
    ///   that would take the balance out of the representable range
    /// - [`Error::IdentityNotFound`] if the identity does not exist
    ///
    /// Nothing is written when an error is returned.
    pub async fn append(
        &self,
        identity_id: &str,
        amount: Decimal,
        direction: Direction,
        category: Category,
        description: impl Into<String>,
    ) -> Result<Transaction> {
        let amount = Amount::new(amount)?;

        let lock = self.locks.for_identity(identity_id);
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;
        let owner = find_identity(&txn, identity_id).await?;

        let pending = self
            .factory
            .create(identity_id, amount, direction, category, description.into());
        let row = write_entry(&txn, &owner, &pending).await?;
        txn.commit().await?;

        info!(
            "Appended {} {} of {} for {} ({})",
            pending.category, pending.direction, pending.amount, identity_id, pending.id
        );
        Transaction::try_from(row)
    }

    /// Debits `amount` only if the identity's balance covers it.
    ///
    /// The balance read, the sufficiency check and the write happen inside one
    /// database transaction while holding the identity's lock, so no other write
    /// for the identity can slip in between the check and the debit.
    ///
    /// # Errors
    /// - [`Error::InvalidAmount`] for a non-positive or over-precise amount
    /// - [`Error::IdentityNotFound`] if the identity does not exist
    /// - [`Error::InsufficientFunds`] if the balance is lower than `amount`
    pub async fn charge(
        &self,
        identity_id: &str,
        amount: Decimal,
        category: Category,
        description: impl Into<String>,
    ) -> Result<Transaction> {
        self.guarded_debit(identity_id, amount, category, description.into(), None)
            .await
    }

    /// Same as [`LedgerStore::charge`], and records `items` as settled by the
    /// identity in the same database transaction.
    ///
    /// # Errors
    /// As [`LedgerStore::charge`], plus [`Error::AlreadyClaimed`] if any of the
    /// items was settled before. Nothing is written on error.
    pub async fn charge_and_claim(
        &self,
        identity_id: &str,
        amount: Decimal,
        category: Category,
        description: impl Into<String>,
        kind: ClaimKind,
        items: &[String],
    ) -> Result<Transaction> {
        self.guarded_debit(
            identity_id,
            amount,
            category,
            description.into(),
            Some((kind, items)),
        )
        .await
    }

    /// Records `items` as settled without a ledger entry (free events).
    ///
    /// # Errors
    /// [`Error::IdentityNotFound`] or [`Error::AlreadyClaimed`]; nothing is written.
    pub async fn claim(&self, identity_id: &str, kind: ClaimKind, items: &[String]) -> Result<()> {
        let lock = self.locks.for_identity(identity_id);
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;
        find_identity(&txn, identity_id).await?;
        ensure_unclaimed(&txn, identity_id, kind, items).await?;
        insert_claims(&txn, identity_id, kind, items).await?;
        txn.commit().await?;

        debug!("{} settled {} {:?} without a charge", identity_id, kind, items);
        Ok(())
    }

    /// Ids of the items of `kind` the identity has settled.
    pub async fn claimed(&self, identity_id: &str, kind: ClaimKind) -> Result<HashSet<String>> {
        Ok(ClaimEntity::find()
            .filter(ClaimColumn::IdentityId.eq(identity_id))
            .filter(ClaimColumn::Kind.eq(kind.as_ref()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|claim| claim.item_id)
            .collect())
    }

    async fn guarded_debit(
        &self,
        identity_id: &str,
        amount: Decimal,
        category: Category,
        description: String,
        claims: Option<(ClaimKind, &[String])>,
    ) -> Result<Transaction> {
        let amount = Amount::new(amount)?;

        let lock = self.locks.for_identity(identity_id);
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;
        let owner = find_identity(&txn, identity_id).await?;

        if let Some((kind, items)) = claims {
            ensure_unclaimed(&txn, identity_id, kind, items).await?;
        }

        if owner.balance_minor < amount.minor_units() {
            let current = from_minor_units(owner.balance_minor);
            warn!(
                "Refused {} charge of {} for {}: balance {}",
                category, amount, identity_id, current
            );
            return Err(Error::InsufficientFunds {
                current,
                required: amount.value(),
            });
        }

        let pending = self
            .factory
            .create(identity_id, amount, Direction::Debit, category, description);
        let row = write_entry(&txn, &owner, &pending).await?;
        if let Some((kind, items)) = claims {
            insert_claims(&txn, identity_id, kind, items).await?;
        }
        txn.commit().await?;

        info!(
            "Charged {} {} for {} ({})",
            pending.amount, pending.category, identity_id, pending.id
        );
        Transaction::try_from(row)
    }

    /// Imports backdated history for an identity without changing its current balance.
    ///
    /// The entries are written with timestamps `age` before now and the identity's
    /// opening balance is shifted by their net flow, so the fold over the log still
    /// lands on the cached balance.
    pub async fn seed_history(
        &self,
        identity_id: &str,
        entries: &[SeedEntry],
    ) -> Result<Vec<Transaction>> {
        let lock = self.locks.for_identity(identity_id);
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;
        let owner = find_identity(&txn, identity_id).await?;

        let mut net_minor = 0_i64;
        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let pending = self.factory.backdated(
                identity_id,
                Amount::new(entry.amount)?,
                entry.direction,
                entry.category,
                entry.description.clone(),
                entry.age,
            );
            net_minor = net_minor
                .checked_add(pending.signed_minor_units())
                .ok_or(Error::InvalidAmount {
                    amount: entry.amount,
                })?;
            rows.push(insert_entry(&txn, &pending).await?);
        }

        let opening_minor = owner
            .opening_balance_minor
            .checked_sub(net_minor)
            .ok_or(Error::InvalidAmount {
                amount: from_minor_units(net_minor),
            })?;
        IdentityEntity::update_many()
            .col_expr(
                identity::Column::OpeningBalanceMinor,
                Expr::value(opening_minor),
            )
            .filter(identity::Column::Id.eq(identity_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!("Imported {} historical entries for {}", rows.len(), identity_id);
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// The whole log, most recent first; entries with equal timestamps are returned
    /// last-inserted first.
    pub async fn history(&self) -> Result<Vec<Transaction>> {
        self.load_history(None).await
    }

    /// One identity's transactions, in the same order as [`LedgerStore::history`].
    pub async fn history_for(&self, identity_id: &str) -> Result<Vec<Transaction>> {
        self.load_history(Some(identity_id)).await
    }

    /// The cached balance projection.
    pub async fn balance(&self, identity_id: &str) -> Result<Decimal> {
        let identity = find_identity(&self.db, identity_id).await?;
        Ok(from_minor_units(identity.balance_minor))
    }

    /// The balance recomputed from scratch: opening balance plus the fold over the
    /// identity's transactions. Always equal to [`LedgerStore::balance`].
    pub async fn projected_balance(&self, identity_id: &str) -> Result<Decimal> {
        let identity = find_identity(&self.db, identity_id).await?;
        let history = self.history_for(identity_id).await?;
        Ok(projection::fold_balance(
            from_minor_units(identity.opening_balance_minor),
            &history,
            identity_id,
        ))
    }

    async fn load_history(&self, identity_id: Option<&str>) -> Result<Vec<Transaction>> {
        let mut query = TransactionEntity::find().order_by_desc(TransactionColumn::Seq);
        if let Some(identity_id) = identity_id {
            query = query.filter(TransactionColumn::IdentityId.eq(identity_id));
        }

        let mut history = query
            .all(&self.db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>>>()?;

        // Stable sort: equal timestamps keep the newest-insert-first order from `seq`
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(history)
    }
}

async fn find_identity<C>(db: &C, identity_id: &str) -> Result<identity::Model>
where
    C: ConnectionTrait,
{
    IdentityEntity::find_by_id(identity_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::IdentityNotFound {
            id: identity_id.to_string(),
        })
}

async fn insert_entry<C>(db: &C, pending: &PendingTransaction) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    transaction::ActiveModel {
        id: Set(pending.id.clone()),
        identity_id: Set(pending.identity_id.clone()),
        amount_minor: Set(pending.amount.minor_units()),
        direction: Set(pending.direction.to_string()),
        category: Set(pending.category.to_string()),
        description: Set(pending.description.clone()),
        timestamp: Set(pending.timestamp),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Atomic `balance = balance + delta` for one identity.
async fn apply_balance_delta<C>(db: &C, identity_id: &str, delta_minor: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = IdentityEntity::update_many()
        .col_expr(
            identity::Column::BalanceMinor,
            Expr::col(identity::Column::BalanceMinor).add(delta_minor),
        )
        .filter(identity::Column::Id.eq(identity_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::IdentityNotFound {
            id: identity_id.to_string(),
        });
    }
    Ok(())
}

/// Inserts the entry and applies it to `owner`'s balance, which must have been
/// read in the same database transaction while holding the identity's lock.
async fn write_entry<C>(
    db: &C,
    owner: &identity::Model,
    pending: &PendingTransaction,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    // SQLite silently widens an overflowing integer column to REAL
    let delta_minor = pending.signed_minor_units();
    if owner.balance_minor.checked_add(delta_minor).is_none() {
        warn!(
            "Refused {} of {} for {}: balance out of range",
            pending.direction, pending.amount, owner.id
        );
        return Err(Error::InvalidAmount {
            amount: pending.amount.value(),
        });
    }

    let row = insert_entry(db, pending).await?;
    apply_balance_delta(db, &pending.identity_id, delta_minor).await?;
    Ok(row)
}

async fn ensure_unclaimed<C>(
    db: &C,
    identity_id: &str,
    kind: ClaimKind,
    items: &[String],
) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = ClaimEntity::find()
        .filter(ClaimColumn::IdentityId.eq(identity_id))
        .filter(ClaimColumn::Kind.eq(kind.as_ref()))
        .filter(ClaimColumn::ItemId.is_in(items.iter().map(String::as_str)))
        .one(db)
        .await?;

    match existing {
        Some(claim) => Err(Error::AlreadyClaimed {
            kind: kind.to_string(),
            item_id: claim.item_id,
        }),
        None => Ok(()),
    }
}

async fn insert_claims<C>(db: &C, identity_id: &str, kind: ClaimKind, items: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    for item_id in items {
        claim::ActiveModel {
            identity_id: Set(identity_id.to_string()),
            kind: Set(kind.to_string()),
            item_id: Set(item_id.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::clock::SystemClock;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_top_up_then_purchase_scenario() -> Result<()> {
        let (store, _clock) = setup_test_store().await?;

        let top_up = store
            .append("u1", dec!(500), Direction::Credit, Category::Topup, "Wallet Top-up")
            .await?;
        assert_projection_agrees(&store, "u1").await?;

        let purchase = store
            .append(
                "u1",
                dec!(80),
                Direction::Debit,
                Category::Canteen,
                "Canteen: 1x Veg Sandwich",
            )
            .await?;
        assert_projection_agrees(&store, "u1").await?;

        assert_eq!(store.balance("u1").await?, dec!(1670.00));

        let history = store.history().await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], purchase);
        assert_eq!(history[1], top_up);
        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first() -> Result<()> {
        let (store, clock) = setup_test_store().await?;

        let mut appended = Vec::new();
        for minutes in 1..=5 {
            clock.advance(TimeDelta::minutes(minutes));
            appended.push(
                store
                    .append("u1", dec!(10), Direction::Credit, Category::Topup, "Wallet Top-up")
                    .await?,
            );
        }

        let history = store.history().await?;
        appended.reverse();
        assert_eq!(history, appended);
        Ok(())
    }

    #[tokio::test]
    async fn test_equal_timestamps_are_returned_last_in_first_out() -> Result<()> {
        // The manual clock never moves, so every entry shares one timestamp
        let (store, _clock) = setup_test_store().await?;

        let first = store
            .append("u1", dec!(1), Direction::Credit, Category::Topup, "first")
            .await?;
        let second = store
            .append("u1", dec!(2), Direction::Credit, Category::Topup, "second")
            .await?;
        let third = store
            .append("u1", dec!(3), Direction::Debit, Category::Print, "third")
            .await?;

        assert_eq!(first.timestamp, third.timestamp);
        let history = store.history().await?;
        assert_eq!(history, vec![third, second, first]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amounts_never_reach_the_log() -> Result<()> {
        let (store, _clock) = setup_test_store().await?;

        for amount in [Decimal::ZERO, dec!(-5), dec!(0.001)] {
            let result = store
                .append("u1", amount, Direction::Debit, Category::Canteen, "bad")
                .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));

            let result = store.charge("u1", amount, Category::Canteen, "bad").await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        assert!(store.history().await?.is_empty());
        assert_eq!(store.balance("u1").await?, dec!(1250));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected_before_append() -> Result<()> {
        let (store, _clock) = setup_test_store().await?;

        let result = async {
            let category: Category = "laundry".parse()?;
            store
                .append("u1", dec!(10), Direction::Debit, category, "Laundry")
                .await
        }
        .await;

        assert!(matches!(result, Err(Error::UnknownCategory { .. })));
        assert!(store.history().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_append_to_unknown_identity_fails() -> Result<()> {
        let (store, _clock) = setup_test_store().await?;

        let result = store
            .append("ghost", dec!(10), Direction::Credit, Category::Topup, "Wallet Top-up")
            .await;
        assert!(matches!(result, Err(Error::IdentityNotFound { id }) if id == "ghost"));
        assert!(store.history().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_append_permits_overdraft() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(50)).await?;

        store
            .append(&student, dec!(80), Direction::Debit, Category::Canteen, "Canteen")
            .await?;
        assert_eq!(store.balance(&student).await?, dec!(-30));
        assert_projection_agrees(&store, &student).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_charge_refuses_when_balance_is_short() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(50)).await?;

        let result = store
            .charge(&student, dec!(80), Category::Canteen, "Canteen: 1x Veg Sandwich")
            .await;
        assert!(matches!(
            result,
            Err(Error::InsufficientFunds { current, required })
                if current == dec!(50) && required == dec!(80)
        ));

        assert_eq!(store.balance(&student).await?, dec!(50));
        assert!(store.history_for(&student).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_charge_allows_spending_the_exact_balance() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(80)).await?;

        let debit = store
            .charge(&student, dec!(80), Category::Canteen, "Canteen: 1x Veg Sandwich")
            .await?;
        assert_eq!(debit.direction, Direction::Debit);
        assert_eq!(store.balance(&student).await?, Decimal::ZERO);
        assert_projection_agrees(&store, &student).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_history_for_filters_by_identity() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(100)).await?;

        store
            .append("u1", dec!(5), Direction::Debit, Category::Print, "Cloud Print: 1 pages")
            .await?;
        let own = store
            .append(&student, dec!(20), Direction::Credit, Category::Topup, "Wallet Top-up")
            .await?;

        assert_eq!(store.history().await?.len(), 2);
        assert_eq!(store.history_for(&student).await?, vec![own]);
        assert_projection_agrees(&store, "u1").await?;
        assert_projection_agrees(&store, &student).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_matches_fold_over_mixed_sequence() -> Result<()> {
        let (store, clock, student) = setup_with_student(dec!(0)).await?;

        let steps = [
            (dec!(250.50), Direction::Credit),
            (dec!(19.99), Direction::Debit),
            (dec!(0.01), Direction::Debit),
            (dec!(1000), Direction::Credit),
            (dec!(1500), Direction::Debit),
        ];
        let mut expected = Decimal::ZERO;
        for (amount, direction) in steps {
            clock.advance(TimeDelta::seconds(30));
            store
                .append(&student, amount, direction, Category::Event, "mixed")
                .await?;
            expected += match direction {
                Direction::Credit => amount,
                Direction::Debit => -amount,
            };
            assert_projection_agrees(&store, &student).await?;
        }

        assert_eq!(store.balance(&student).await?, expected);
        assert_eq!(expected, dec!(-269.48));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_charges_cannot_overdraw() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(100)).await?;
        let store = Arc::new(store);

        let mut attempts = tokio::task::JoinSet::new();
        for _ in 0..5 {
            let store = Arc::clone(&store);
            let student = student.clone();
            attempts.spawn(async move {
                store
                    .charge(&student, dec!(30), Category::Canteen, "Canteen: 1x Cold Coffee")
                    .await
            });
        }

        let mut approved = 0;
        let mut refused = 0;
        while let Some(joined) = attempts.join_next().await {
            match joined.unwrap() {
                Ok(_) => approved += 1,
                Err(Error::InsufficientFunds { .. }) => refused += 1,
                Err(other) => return Err(other),
            }
        }
        assert_eq!(approved, 3);
        assert_eq!(refused, 2);
        assert_eq!(store.balance(&student).await?, dec!(10));
        assert_projection_agrees(&store, &student).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_history_keeps_balance_and_projection() -> Result<()> {
        let (store, clock) = setup_test_store().await?;

        let seeded = store.seed_history("u1", &demo_history()).await?;
        assert_eq!(seeded.len(), 2);
        assert_eq!(store.balance("u1").await?, dec!(1250));
        assert_projection_agrees(&store, "u1").await?;

        let history = store.history().await?;
        assert_eq!(history[0].description, "Canteen: 1x Veg Sandwich");
        assert_eq!(history[0].timestamp, clock.now() - TimeDelta::hours(1));
        assert_eq!(history[1].category, Category::Topup);

        // New activity lands ahead of the imported entries
        let fresh = store
            .append("u1", dec!(60), Direction::Debit, Category::Canteen, "Canteen: 1x Cold Coffee")
            .await?;
        assert_eq!(store.history().await?[0], fresh);
        assert_projection_agrees(&store, "u1").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_identity_for_role_uses_roster() -> Result<()> {
        let (store, _clock) = setup_test_store().await?;

        let student = store.identity_for_role(Role::Student).await?;
        assert_eq!(student.id, "u1");
        assert_eq!(student.name, "Rahul Sharma");
        assert_eq!(student.student_id.as_deref(), Some("CS2024001"));
        assert_eq!(student.balance, dec!(1250));

        assert_eq!(store.identity_for_role(Role::Vendor).await?.id, "v1");
        assert_eq!(store.identity_for_role(Role::Admin).await?.id, "a1");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_role_is_reported() -> Result<()> {
        init_test_tracing();
        let store = LedgerStore::new(Arc::new(SystemClock)).await?;

        let result = store.identity_for_role(Role::Admin).await;
        assert!(matches!(result, Err(Error::NoIdentityForRole { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_overflow_is_refused_before_writing() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(0)).await?;
        let huge = dec!(50_000_000_000_000_000);

        store
            .append(&student, huge, Direction::Credit, Category::Topup, "Wallet Top-up")
            .await?;
        let result = store
            .append(&student, huge, Direction::Credit, Category::Topup, "Wallet Top-up")
            .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount }) if amount == huge));

        // The store stays readable and consistent
        assert_eq!(store.balance(&student).await?, huge);
        assert_eq!(store.history_for(&student).await?.len(), 1);
        assert_projection_agrees(&store, &student).await?;

        // Same boundary on the way down
        for _ in 0..2 {
            store
                .append(&student, huge, Direction::Debit, Category::Event, "Event: Gala")
                .await?;
        }
        let result = store
            .append(&student, huge, Direction::Debit, Category::Event, "Event: Gala")
            .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        assert_eq!(store.balance(&student).await?, -huge);
        assert_projection_agrees(&store, &student).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_clock_stepping_back_keeps_history_order() -> Result<()> {
        let (store, clock) = setup_test_store().await?;

        clock.set(fixed_start() + TimeDelta::hours(1));
        let later = store
            .append("u1", dec!(10), Direction::Credit, Category::Topup, "Wallet Top-up")
            .await?;
        clock.set(fixed_start());
        let after = store
            .append("u1", dec!(5), Direction::Debit, Category::Print, "Cloud Print: 1 pages")
            .await?;

        assert!(after.timestamp >= later.timestamp);
        assert_eq!(store.history().await?, vec![after, later]);
        Ok(())
    }

    #[tokio::test]
    async fn test_charge_and_claim_settles_items_once() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(500)).await?;
        let fines = vec!["1".to_string(), "2".to_string()];

        let debit = store
            .charge_and_claim(
                &student,
                dec!(150),
                Category::Library,
                "Library Fine Payment",
                ClaimKind::Fine,
                &fines,
            )
            .await?;
        assert_eq!(debit.amount.value(), dec!(150));
        assert_eq!(
            store.claimed(&student, ClaimKind::Fine).await?,
            fines.iter().cloned().collect::<HashSet<_>>()
        );
        assert!(store.claimed(&student, ClaimKind::Event).await?.is_empty());

        let again = store
            .charge_and_claim(
                &student,
                dec!(30),
                Category::Library,
                "Library Fine Payment",
                ClaimKind::Fine,
                &fines[1..],
            )
            .await;
        assert!(matches!(again, Err(Error::AlreadyClaimed { item_id, .. }) if item_id == "2"));
        assert_eq!(store.history_for(&student).await?.len(), 1);
        assert_eq!(store.balance(&student).await?, dec!(350));

        // Claims belong to one identity
        assert!(store.claimed("u1", ClaimKind::Fine).await?.is_empty());
        assert_projection_agrees(&store, &student).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_refused_charge_records_no_claim() -> Result<()> {
        let (store, _clock, student) = setup_with_student(dec!(10)).await?;
        let event = vec!["2".to_string()];

        let result = store
            .charge_and_claim(
                &student,
                dec!(500),
                Category::Event,
                "Event: Campus Music Fest",
                ClaimKind::Event,
                &event,
            )
            .await;
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
        assert!(store.claimed(&student, ClaimKind::Event).await?.is_empty());

        // A free claim goes through on its own, once
        store.claim(&student, ClaimKind::Event, &event).await?;
        assert!(matches!(
            store.claim(&student, ClaimKind::Event, &event).await,
            Err(Error::AlreadyClaimed { .. })
        ));
        assert!(store.history().await?.is_empty());
        Ok(())
    }
}
