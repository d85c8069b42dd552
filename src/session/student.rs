//! Student session - the only holder of write access to a student's wallet.
//!
//! Every operation acts on the identity chosen at login; there is no way to pass a
//! different identity id through this handle. Paid fines and registrations are read
//! from the store at login, so they carry over from earlier sessions.

use crate::{
    core::{
        catalog::{EventListing, LibraryFine, MenuItem},
        identity::Identity,
        services::{self, Cart, EventBook, LibraryAccount},
        transaction::Transaction,
        views::{self, StudentDashboard},
    },
    errors::Result,
    insight::SearchResult,
    session::{AppData, view::StudentView},
};
use rust_decimal::Decimal;
use std::future::Future;
use tracing::debug;

/// Query sent to the insight provider from the events screen.
pub const EXTERNAL_EVENTS_QUERY: &str = "What are the major upcoming educational and technology \
     events for university students in India? List 3-4 key events with dates.";

/// A logged-in student.
pub struct StudentSession {
    app: AppData,
    identity: Identity,
    view: StudentView,
    cart: Cart,
    library: LibraryAccount,
    events: EventBook,
}

impl StudentSession {
    pub(crate) async fn open(app: AppData, identity: Identity) -> Result<Self> {
        let library = LibraryAccount::load(&app.store, app.catalog.as_ref(), &identity.id).await?;
        let events = EventBook::load(&app.store, app.catalog.as_ref(), &identity.id).await?;

        Ok(Self {
            app,
            identity,
            view: StudentView::default(),
            cart: Cart::default(),
            library,
            events,
        })
    }

    /// The identity as it was at login; use [`Self::balance`] for the live figure.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub const fn view(&self) -> StudentView {
        self.view
    }

    pub fn navigate(&mut self, view: StudentView) {
        debug!("{} -> {}", self.identity.id, view);
        self.view = view;
    }

    /// Current cached balance.
    pub async fn balance(&self) -> Result<Decimal> {
        self.app.store.balance(&self.identity.id).await
    }

    pub async fn dashboard(&self) -> Result<StudentDashboard> {
        views::student_dashboard(&self.app.store, &self.identity.id).await
    }

    /// Own transactions, most recent first.
    pub async fn history(&self) -> Result<Vec<Transaction>> {
        self.app.store.history_for(&self.identity.id).await
    }

    pub async fn top_up(&self, amount: Decimal) -> Result<Transaction> {
        services::top_up(&self.app.store, &self.identity.id, amount).await
    }

    #[must_use]
    pub fn menu(&self) -> Vec<MenuItem> {
        self.app.catalog.menu()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add_to_cart(&mut self, item_id: &str) -> Result<()> {
        self.cart.add(self.app.catalog.as_ref(), item_id)
    }

    pub fn remove_from_cart(&mut self, item_id: &str) {
        self.cart.remove(item_id);
    }

    pub fn cart_total(&self) -> Result<Decimal> {
        self.cart.total(self.app.catalog.as_ref())
    }

    /// Pays for the cart. The cart is kept when the payment is refused.
    pub async fn checkout(&mut self) -> Result<Transaction> {
        services::checkout(
            &self.app.store,
            self.app.catalog.as_ref(),
            &self.identity.id,
            &mut self.cart,
        )
        .await
    }

    #[must_use]
    pub fn fines(&self) -> &[LibraryFine] {
        self.library.fines()
    }

    pub async fn pay_fines(&mut self) -> Result<Transaction> {
        self.library.pay_all(&self.app.store, &self.identity.id).await
    }

    /// Price of a print job before submitting it.
    pub fn print_quote(&self, pages: u32) -> Result<Decimal> {
        services::line_price(self.app.catalog.print_cost_per_page(), pages)
    }

    pub async fn print(&self, pages: u32) -> Result<Transaction> {
        services::print_job(
            &self.app.store,
            self.app.catalog.as_ref(),
            &self.identity.id,
            pages,
        )
        .await
    }

    #[must_use]
    pub fn events(&self) -> &[EventListing] {
        self.events.listings()
    }

    #[must_use]
    pub fn is_registered(&self, event_id: &str) -> bool {
        self.events.is_registered(event_id)
    }

    /// Registers for a campus event; `None` for free events.
    pub async fn register_event(&mut self, event_id: &str) -> Result<Option<Transaction>> {
        self.events
            .register(&self.app.store, &self.identity.id, event_id)
            .await
    }

    /// Asks the insight provider about events outside the campus.
    ///
    /// Resolves to `None` if a newer insight query started before this one answered.
    pub fn discover_events(&self) -> impl Future<Output = Option<SearchResult>> + '_ {
        self.app.insights.query(EXTERNAL_EVENTS_QUERY)
    }
}
