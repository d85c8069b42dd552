//! Role sessions - who is logged in and what they may do
//!
//! A [`Session`] is opened for one role against the shared [`AppData`] and holds the
//! role's handle. Only the student handle can write to the ledger, and only for its
//! own identity.

/// Administrator handle
pub mod admin;
/// Student handle and its service flows
pub mod student;
/// Vendor terminal handle
pub mod vendor;
/// Per-role navigation targets
pub mod view;

use crate::{
    config::app::AppConfig,
    core::{
        catalog::{CatalogProvider, StaticCatalog},
        clock::Clock,
        identity::{Identity, Role},
        ledger::LedgerStore,
    },
    errors::Result,
    insight::{InsightClient, InsightProvider},
};
use std::sync::Arc;
use tracing::info;

pub use admin::AdminSession;
pub use student::StudentSession;
pub use vendor::{PaymentOutcome, VendorSession};
pub use view::{AdminView, StudentView, VendorView};

/// Shared state handed to every session.
/// Holds the ledger, the catalog and the insight client.
#[derive(Clone)]
pub struct AppData {
    /// The ledger every session reads from
    pub store: Arc<LedgerStore>,
    /// Prices and listings for student services
    pub catalog: Arc<dyn CatalogProvider>,
    /// External insight queries
    pub insights: Arc<InsightClient>,
}

impl AppData {
    #[must_use]
    pub const fn new(
        store: Arc<LedgerStore>,
        catalog: Arc<dyn CatalogProvider>,
        insights: Arc<InsightClient>,
    ) -> Self {
        Self {
            store,
            catalog,
            insights,
        }
    }

    /// Opens a ledger for the configured roster and wraps the configured catalog.
    pub async fn bootstrap(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        provider: Arc<dyn InsightProvider>,
    ) -> Result<Self> {
        let store = LedgerStore::open(config, clock).await?;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(StaticCatalog::new(config.catalog.clone())),
            Arc::new(InsightClient::new(provider)),
        ))
    }
}

/// The logged-in role and its handle.
pub enum Session {
    Student(StudentSession),
    Admin(AdminSession),
    Vendor(VendorSession),
}

impl Session {
    /// Logs in as the roster identity holding `role`.
    ///
    /// # Errors
    /// [`crate::errors::Error::NoIdentityForRole`] when the roster has nobody with that role.
    pub async fn login(app: &AppData, role: Role) -> Result<Self> {
        let identity = app.store.identity_for_role(role).await?;
        info!("{} logged in as {}", identity.id, role);

        Ok(match role {
            Role::Student => Self::Student(StudentSession::open(app.clone(), identity).await?),
            Role::Admin => Self::Admin(AdminSession::new(app.clone(), identity)),
            Role::Vendor => Self::Vendor(VendorSession::new(identity)),
        })
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        match self {
            Self::Student(session) => session.identity(),
            Self::Admin(session) => session.identity(),
            Self::Vendor(session) => session.identity(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Admin(_) => Role::Admin,
            Self::Vendor(_) => Role::Vendor,
        }
    }

    /// Ends the session. Unsaved local state (cart, registrations) is discarded.
    pub fn logout(self) {
        info!("{} logged out", self.identity().id);
    }
}
