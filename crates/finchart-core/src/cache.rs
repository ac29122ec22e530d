//! Cache trait for storing fetched dashboard data.
//!
//! This module defines the [`CompanyCache`] trait that provides a unified
//! interface for caching company payloads, search results and research text.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{CompanyData, ResearchReport, Suggestion, Ticker},
};

/// Trait for caching fetched dashboard data.
///
/// Implementations keep data for the lifetime of a session only; nothing is
/// persisted across process restarts.
#[async_trait]
pub trait CompanyCache: Send + Sync {
    /// Retrieves a cached company payload.
    ///
    /// Returns `Ok(Some(data))` if cached and fresh, `Ok(None)` otherwise.
    async fn get_company(&self, ticker: &Ticker) -> Result<Option<CompanyData>>;

    /// Stores a company payload.
    async fn put_company(&self, data: &CompanyData) -> Result<()>;

    /// Retrieves cached suggestions for a normalized (trimmed, uppercased) query.
    async fn get_suggestions(&self, query: &str) -> Result<Option<Vec<Suggestion>>>;

    /// Stores suggestions for a query. Empty result sets are not cached.
    async fn put_suggestions(&self, query: &str, suggestions: &[Suggestion]) -> Result<()>;

    /// Retrieves a cached research report.
    async fn get_research(&self, ticker: &Ticker) -> Result<Option<ResearchReport>>;

    /// Stores a research report.
    async fn put_research(&self, report: &ResearchReport) -> Result<()>;

    /// Removes every entry for a ticker.
    ///
    /// Returns true if anything was removed.
    async fn invalidate(&self, ticker: &Ticker) -> Result<bool>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}

/// Normalizes a search query into its cache key form.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_uppercase()
}
