//! Insight queries - the one asynchronous boundary of the wallet.
//!
//! An [`InsightProvider`] answers free-text questions (the events view uses it to
//! discover external events). The provider itself is an opaque collaborator; this
//! module only wraps it:
//!
//! - sources are de-duplicated by URI, first occurrence wins
//! - any provider failure becomes a neutral fallback result, never an error
//! - only the latest request may deliver a result; a response that arrives after a
//!   newer query started is dropped

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::{debug, warn};

/// Text shown when the provider answered without any text.
pub const NO_INFORMATION_TEXT: &str = "No information found.";

/// Text shown when the provider could not be reached.
pub const FALLBACK_TEXT: &str =
    "Unable to fetch external insights at this moment. Please try again later.";

/// A web page cited by an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// What the UI renders for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub sources: Vec<Source>,
}

impl SearchResult {
    /// The result shown when the provider failed.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Raw provider answer before clean-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: Option<String>,
    pub sources: Vec<Source>,
}

/// The external search service.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Answers one query.
    async fn search(&self, query: &str) -> Result<ProviderResponse>;
}

/// A provider that is never reachable. Every query resolves to the fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProvider;

#[async_trait]
impl InsightProvider for UnavailableProvider {
    async fn search(&self, _query: &str) -> Result<ProviderResponse> {
        Err(crate::errors::Error::Insight {
            message: "no insight provider configured".to_string(),
        })
    }
}

/// Removes sources whose URI was already seen, keeping the first occurrence.
#[must_use]
pub fn dedup_sources(sources: Vec<Source>) -> Vec<Source> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

/// Single-slot client around a provider: the newest query supersedes older ones.
pub struct InsightClient {
    provider: Arc<dyn InsightProvider>,
    latest: AtomicU64,
}

impl InsightClient {
    #[must_use]
    pub fn new(provider: Arc<dyn InsightProvider>) -> Self {
        Self {
            provider,
            latest: AtomicU64::new(0),
        }
    }

    /// Starts a query.
    ///
    /// The request is registered as the latest one as soon as this is called, before
    /// the returned future is polled. The future resolves to `None` if another query
    /// was started in the meantime; otherwise it resolves to the cleaned-up answer or
    /// to [`SearchResult::fallback`] if the provider failed.
    pub fn query(&self, text: impl Into<String>) -> impl Future<Output = Option<SearchResult>> + '_ {
        let text = text.into();
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        async move {
            let result = match self.provider.search(&text).await {
                Ok(response) => SearchResult {
                    text: response
                        .text
                        .filter(|text| !text.is_empty())
                        .unwrap_or_else(|| NO_INFORMATION_TEXT.to_string()),
                    sources: dedup_sources(response.sources),
                },
                Err(e) => {
                    warn!("Insight query failed, using fallback: {}", e);
                    SearchResult::fallback()
                }
            };

            if self.latest.load(Ordering::SeqCst) == ticket {
                Some(result)
            } else {
                debug!("Dropping stale insight response for query #{}", ticket);
                None
            }
        }
    }
}
