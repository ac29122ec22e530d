//! Async driver pairing a [`SearchSession`] with a suggestion source.

use std::sync::Arc;
use std::time::Instant;

use finchart_core::{CompanyCache, Result, Suggestion, SuggestionProvider, cache::normalize_query};
use tracing::{debug, instrument, warn};

use crate::session::{Commit, Key, SearchConfig, SearchRequest, SearchSession, SearchState};

/// Runs due suggestion requests against a [`SuggestionProvider`].
///
/// The host forwards input events, sleeps until [`next_deadline`](Self::next_deadline)
/// and then calls [`run_due`](Self::run_due).
pub struct SearchController {
    session: SearchSession,
    provider: Arc<dyn SuggestionProvider>,
    cache: Option<Arc<dyn CompanyCache>>,
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("session", &self.session)
            .field("provider", &self.provider.name())
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl SearchController {
    /// Creates a controller with the default configuration.
    pub fn new(provider: Arc<dyn SuggestionProvider>) -> Self {
        Self::with_config(provider, SearchConfig::default())
    }

    /// Creates a controller with an explicit configuration.
    pub fn with_config(provider: Arc<dyn SuggestionProvider>, config: SearchConfig) -> Self {
        Self {
            session: SearchSession::new(config),
            provider,
            cache: None,
        }
    }

    /// Serves repeated queries from a cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CompanyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Forwards an input change.
    pub fn input(&mut self, query: &str, now: Instant) -> SearchState {
        self.session.input(query, now)
    }

    /// Forwards a key press.
    pub fn key(&mut self, key: Key) -> Option<Commit> {
        self.session.key(key)
    }

    /// Forwards a click on a result.
    pub fn click(&mut self, index: usize) -> Option<Commit> {
        self.session.click(index)
    }

    /// Forwards a click outside the search box.
    pub fn click_outside(&mut self) {
        self.session.click_outside();
    }

    /// When the next request becomes due, if any.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.session.next_deadline()
    }

    /// Performs the request that is due at `now`, if any, and applies its result.
    ///
    /// Returns true if a request was dispatched.
    pub async fn run_due(&mut self, now: Instant) -> bool {
        let Some(request) = self.session.poll(now) else {
            return false;
        };
        let result = self.fetch(&request).await;
        self.session.resolve(request.seq, result);
        true
    }

    #[instrument(skip(self), fields(provider = self.provider.name()))]
    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<Suggestion>> {
        let key = normalize_query(&request.query);
        if let Some(cache) = &self.cache {
            match cache.get_suggestions(&key).await {
                Ok(Some(cached)) => {
                    debug!(query = %key, "Cache hit for suggestions");
                    return Ok(cached);
                }
                Ok(None) => debug!(query = %key, "Cache miss for suggestions"),
                Err(e) => warn!(error = %e, "Failed to read suggestion cache"),
            }
        }

        let suggestions = self.provider.suggest(&request.query).await?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_suggestions(&key, &suggestions).await {
                warn!(error = %e, "Failed to cache suggestions");
            }
        }
        Ok(suggestions)
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    /// The underlying session, mutably.
    pub fn session_mut(&mut self) -> &mut SearchSession {
        &mut self.session
    }
}
