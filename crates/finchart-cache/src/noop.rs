//! No-op cache implementation.

use async_trait::async_trait;
use finchart_core::{CompanyCache, CompanyData, ResearchReport, Result, Suggestion, Ticker};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return `Ok(())`.
/// Plugging it into a dashboard makes every load hit the data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CompanyCache for NoopCache {
    async fn get_company(&self, _ticker: &Ticker) -> Result<Option<CompanyData>> {
        trace!("NoopCache: get_company called, returning None");
        Ok(None)
    }

    async fn put_company(&self, _data: &CompanyData) -> Result<()> {
        trace!("NoopCache: put_company called, doing nothing");
        Ok(())
    }

    async fn get_suggestions(&self, _query: &str) -> Result<Option<Vec<Suggestion>>> {
        trace!("NoopCache: get_suggestions called, returning None");
        Ok(None)
    }

    async fn put_suggestions(&self, _query: &str, _suggestions: &[Suggestion]) -> Result<()> {
        trace!("NoopCache: put_suggestions called, doing nothing");
        Ok(())
    }

    async fn get_research(&self, _ticker: &Ticker) -> Result<Option<ResearchReport>> {
        trace!("NoopCache: get_research called, returning None");
        Ok(None)
    }

    async fn put_research(&self, _report: &ResearchReport) -> Result<()> {
        trace!("NoopCache: put_research called, doing nothing");
        Ok(())
    }

    async fn invalidate(&self, _ticker: &Ticker) -> Result<bool> {
        Ok(false)
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
