//! Admin session - read-only access to the whole log.

use crate::{
    core::{
        identity::Identity,
        transaction::Transaction,
        views::{self, AdminOverview},
    },
    errors::Result,
    session::{AppData, view::AdminView},
};

/// A logged-in administrator.
pub struct AdminSession {
    app: AppData,
    identity: Identity,
    view: AdminView,
}

impl AdminSession {
    pub(crate) fn new(app: AppData, identity: Identity) -> Self {
        Self {
            app,
            identity,
            view: AdminView::default(),
        }
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub const fn view(&self) -> AdminView {
        self.view
    }

    /// Volume, entry count and the latest entries across all identities.
    pub async fn overview(&self) -> Result<AdminOverview> {
        views::admin_overview(&self.app.store).await
    }

    /// The full system log, most recent first.
    pub async fn history(&self) -> Result<Vec<Transaction>> {
        self.app.store.history().await
    }
}
