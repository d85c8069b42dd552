//! Student services - the campus flows that end in a ledger write.
//!
//! Every flow prices its request from the catalog, then either credits the wallet
//! (top-up) or goes through [`LedgerStore::charge`], which refuses the debit before
//! anything is written if the balance cannot cover it. Paid fines and event
//! registrations are recorded as claims in the store, in the same database
//! transaction as their charge, so they hold across logins. The cart is local and
//! only cleared after the ledger write succeeded.

use crate::{
    core::{
        catalog::{CatalogProvider, EventListing, LibraryFine},
        category::{Category, ClaimKind, Direction},
        factory::{
            canteen_description, event_description, library_fine_description,
            print_description, top_up_description,
        },
        ledger::LedgerStore,
        transaction::Transaction,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// `unit_price × quantity`, refused as [`Error::InvalidAmount`] on overflow.
pub fn line_price(unit_price: Decimal, quantity: u32) -> Result<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(Error::InvalidAmount { amount: unit_price })
}

fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or(Error::InvalidAmount { amount })
    })
}

/// Credits the wallet.
pub async fn top_up(store: &LedgerStore, identity_id: &str, amount: Decimal) -> Result<Transaction> {
    store
        .append(
            identity_id,
            amount,
            Direction::Credit,
            Category::Topup,
            top_up_description(),
        )
        .await
}

/// One menu item and how many of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
}

/// A canteen order being assembled. Lines keep the order items were first added.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Adds one of the given menu item, bumping the quantity if already present.
    ///
    /// # Errors
    /// [`Error::CatalogItemNotFound`] if the item is not on the menu.
    pub fn add(&mut self, catalog: &dyn CatalogProvider, item_id: &str) -> Result<()> {
        let item = catalog
            .menu_item(item_id)
            .ok_or_else(|| Error::CatalogItemNotFound {
                kind: "Menu item",
                id: item_id.to_string(),
            })?;

        match self.lines.iter_mut().find(|line| line.item_id == item.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                item_id: item.id,
                name: item.name,
                quantity: 1,
            }),
        }
        Ok(())
    }

    /// Drops an item from the cart entirely, whatever its quantity.
    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|line| line.item_id != item_id);
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total at current catalog prices.
    ///
    /// # Errors
    /// - [`Error::CatalogItemNotFound`] if an item has left the menu since it was added
    /// - [`Error::InvalidAmount`] if the total is out of range
    pub fn total(&self, catalog: &dyn CatalogProvider) -> Result<Decimal> {
        let prices = self
            .lines
            .iter()
            .map(|line| {
                let item = catalog
                    .menu_item(&line.item_id)
                    .ok_or_else(|| Error::CatalogItemNotFound {
                        kind: "Menu item",
                        id: line.item_id.clone(),
                    })?;
                line_price(item.price, line.quantity)
            })
            .collect::<Result<Vec<_>>>()?;
        checked_total(prices)
    }

    /// Ledger description for this order.
    #[must_use]
    pub fn description(&self) -> String {
        canteen_description(
            self.lines
                .iter()
                .map(|line| (line.quantity, line.name.as_str())),
        )
    }
}

/// Pays for the cart in one debit and empties it.
///
/// # Errors
/// - [`Error::EmptyCart`] when there is nothing to pay for
/// - [`Error::InsufficientFunds`] when the balance is short; the cart is kept
pub async fn checkout(
    store: &LedgerStore,
    catalog: &dyn CatalogProvider,
    identity_id: &str,
    cart: &mut Cart,
) -> Result<Transaction> {
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let total = cart.total(catalog)?;
    let transaction = store
        .charge(identity_id, total, Category::Canteen, cart.description())
        .await?;

    cart.clear();
    info!("Canteen order placed for {}: {}", identity_id, transaction.description);
    Ok(transaction)
}

/// A student's outstanding library fines.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibraryAccount {
    fines: Vec<LibraryFine>,
}

impl LibraryAccount {
    /// Loads the fines the catalog reports for a student, minus those already paid.
    pub async fn load(
        store: &LedgerStore,
        catalog: &dyn CatalogProvider,
        identity_id: &str,
    ) -> Result<Self> {
        let paid = store.claimed(identity_id, ClaimKind::Fine).await?;

        Ok(Self {
            fines: catalog
                .fines_for(identity_id)
                .into_iter()
                .filter(|fine| !paid.contains(&fine.id))
                .collect(),
        })
    }

    #[must_use]
    pub fn fines(&self) -> &[LibraryFine] {
        &self.fines
    }

    pub fn total(&self) -> Result<Decimal> {
        checked_total(self.fines.iter().map(|fine| fine.amount))
    }

    /// Pays every outstanding fine with a single debit and clears the list.
    ///
    /// # Errors
    /// - [`Error::NoOutstandingFines`] when nothing is owed
    /// - [`Error::InsufficientFunds`] when the balance is short; fines are kept
    /// - [`Error::AlreadyClaimed`] when another login paid them first
    pub async fn pay_all(&mut self, store: &LedgerStore, identity_id: &str) -> Result<Transaction> {
        if self.fines.is_empty() {
            return Err(Error::NoOutstandingFines);
        }

        let fine_ids: Vec<String> = self.fines.iter().map(|fine| fine.id.clone()).collect();
        let transaction = store
            .charge_and_claim(
                identity_id,
                self.total()?,
                Category::Library,
                library_fine_description(),
                ClaimKind::Fine,
                &fine_ids,
            )
            .await?;

        info!("Cleared {} library fines for {}", self.fines.len(), identity_id);
        self.fines.clear();
        Ok(transaction)
    }
}

/// Sends a document to the cloud printer, charging per page.
///
/// # Errors
/// - [`Error::InvalidPageCount`] for zero pages
/// - [`Error::InvalidAmount`] when the cost is out of range
/// - [`Error::InsufficientFunds`] when the balance is short
pub async fn print_job(
    store: &LedgerStore,
    catalog: &dyn CatalogProvider,
    identity_id: &str,
    pages: u32,
) -> Result<Transaction> {
    if pages == 0 {
        return Err(Error::InvalidPageCount);
    }

    let cost = line_price(catalog.print_cost_per_page(), pages)?;
    store
        .charge(identity_id, cost, Category::Print, print_description(pages))
        .await
}

/// Event listings plus the set one student has registered for.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventBook {
    listings: Vec<EventListing>,
    registered: HashSet<String>,
}

impl EventBook {
    /// Loads the listings from the catalog and the student's earlier registrations.
    pub async fn load(
        store: &LedgerStore,
        catalog: &dyn CatalogProvider,
        identity_id: &str,
    ) -> Result<Self> {
        Ok(Self {
            listings: catalog.events(),
            registered: store.claimed(identity_id, ClaimKind::Event).await?,
        })
    }

    #[must_use]
    pub fn listings(&self) -> &[EventListing] {
        &self.listings
    }

    #[must_use]
    pub fn is_registered(&self, event_id: &str) -> bool {
        self.registered.contains(event_id)
    }

    /// Registers for an event. Paid events charge the fee; free events register
    /// without touching the ledger and return `None`.
    ///
    /// # Errors
    /// - [`Error::CatalogItemNotFound`] for an unknown event
    /// - [`Error::AlreadyRegistered`] when registering twice, from any login
    /// - [`Error::InsufficientFunds`] when the balance cannot cover the fee
    pub async fn register(
        &mut self,
        store: &LedgerStore,
        identity_id: &str,
        event_id: &str,
    ) -> Result<Option<Transaction>> {
        let event = self
            .listings
            .iter()
            .find(|event| event.id == event_id)
            .ok_or_else(|| Error::CatalogItemNotFound {
                kind: "Event",
                id: event_id.to_string(),
            })?;

        let already_registered = || Error::AlreadyRegistered {
            event: event.title.clone(),
        };
        if self.registered.contains(event_id) {
            return Err(already_registered());
        }

        let claim = [event.id.clone()];
        let outcome = if event.fee > Decimal::ZERO {
            store
                .charge_and_claim(
                    identity_id,
                    event.fee,
                    Category::Event,
                    event_description(&event.title),
                    ClaimKind::Event,
                    &claim,
                )
                .await
                .map(Some)
        } else {
            store
                .claim(identity_id, ClaimKind::Event, &claim)
                .await
                .map(|()| None)
        };

        let transaction = match outcome {
            Err(Error::AlreadyClaimed { .. }) => {
                self.registered.insert(event_id.to_string());
                return Err(already_registered());
            }
            other => other?,
        };

        info!("{} registered for {}", identity_id, event.title);
        self.registered.insert(event_id.to_string());
        Ok(transaction)
    }
}
