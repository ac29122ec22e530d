//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use finchart_core::{
    CompanyCache, CompanyData, ResearchReport, Result, Suggestion, Ticker,
    cache::normalize_query,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age >= chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// How long each kind of entry stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    /// Company payloads.
    pub company: Duration,
    /// Search results.
    pub search: Duration,
    /// Research reports.
    pub research: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            company: Duration::from_secs(24 * 60 * 60),
            search: Duration::from_secs(60 * 60),
            research: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Session cache backed by `RwLock`-protected `HashMap`s.
///
/// Data is lost when the cache is dropped. Entries older than their
/// [`CacheTtl`] are treated as misses.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    ttl: CacheTtl,
    companies: RwLock<HashMap<Ticker, CacheEntry<CompanyData>>>,
    searches: RwLock<HashMap<String, CacheEntry<Vec<Suggestion>>>>,
    research: RwLock<HashMap<Ticker, CacheEntry<ResearchReport>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache with the default lifetimes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty in-memory cache with explicit lifetimes.
    #[must_use]
    pub fn with_ttl(ttl: CacheTtl) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// The configured lifetimes.
    #[must_use]
    pub const fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    /// Number of entries across all kinds.
    pub async fn len(&self) -> usize {
        self.companies.read().await.len()
            + self.searches.read().await.len()
            + self.research.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CompanyCache for InMemoryCache {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_company(&self, ticker: &Ticker) -> Result<Option<CompanyData>> {
        let cache = self.companies.read().await;
        match cache.get(ticker) {
            Some(entry) if !entry.is_stale(self.ttl.company) => {
                debug!("Cache hit for company data");
                Ok(Some(entry.data.clone()))
            }
            Some(_) => {
                debug!("Cached company data expired");
                Ok(None)
            }
            None => {
                debug!("Cache miss for company data");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, data), fields(ticker = %data.ticker()))]
    async fn put_company(&self, data: &CompanyData) -> Result<()> {
        let mut cache = self.companies.write().await;
        cache.insert(data.ticker().clone(), CacheEntry::new(data.clone()));
        debug!(
            quarters = data.quarterly_data.len(),
            years = data.annual_data.len(),
            "Cached company data"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_suggestions(&self, query: &str) -> Result<Option<Vec<Suggestion>>> {
        let key = normalize_query(query);
        let cache = self.searches.read().await;
        match cache.get(&key) {
            Some(entry) if !entry.is_stale(self.ttl.search) => {
                debug!("Cache hit for suggestions");
                Ok(Some(entry.data.clone()))
            }
            _ => {
                debug!("Cache miss for suggestions");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, suggestions), fields(count = suggestions.len()))]
    async fn put_suggestions(&self, query: &str, suggestions: &[Suggestion]) -> Result<()> {
        if suggestions.is_empty() {
            return Ok(());
        }
        let mut cache = self.searches.write().await;
        cache.insert(normalize_query(query), CacheEntry::new(suggestions.to_vec()));
        debug!("Cached suggestions");
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn get_research(&self, ticker: &Ticker) -> Result<Option<ResearchReport>> {
        let cache = self.research.read().await;
        match cache.get(ticker) {
            Some(entry) if !entry.is_stale(self.ttl.research) => {
                debug!("Cache hit for research");
                Ok(Some(entry.data.clone()))
            }
            _ => {
                debug!("Cache miss for research");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, report), fields(ticker = %report.ticker))]
    async fn put_research(&self, report: &ResearchReport) -> Result<()> {
        let mut cache = self.research.write().await;
        cache.insert(report.ticker.clone(), CacheEntry::new(report.clone()));
        debug!("Cached research");
        Ok(())
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn invalidate(&self, ticker: &Ticker) -> Result<bool> {
        let company = self.companies.write().await.remove(ticker).is_some();
        let research = self.research.write().await.remove(ticker).is_some();
        debug!(company, research, "Invalidated ticker");
        Ok(company || research)
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.companies.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.searches.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.research.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale cache entries", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.companies.write().await.clear();
        self.searches.write().await.clear();
        self.research.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finchart_core::{CompanyInfo, LineItem, PeriodSeries};

    fn company(ticker: &str) -> CompanyData {
        let mut data = CompanyData::new(CompanyInfo::new(format!("{ticker} Ltd"), ticker));
        data.quarterly_data = PeriodSeries::with_periods(["Jun 2024", "Sep 2024"])
            .with(LineItem::Sales, vec![Some(100.0), Some(110.0)]);
        data
    }

    fn report(ticker: &str) -> ResearchReport {
        ResearchReport {
            ticker: Ticker::new(ticker),
            company_name: format!("{ticker} Ltd"),
            analysis: "## Outlook\nSteady.".to_string(),
            generated_at: None,
            cache_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_memory_cache_company() {
        let cache = InMemoryCache::new();
        let ticker = Ticker::new("tcs");

        assert!(cache.get_company(&ticker).await.unwrap().is_none());

        cache.put_company(&company("TCS")).await.unwrap();

        let cached = cache.get_company(&ticker).await.unwrap().unwrap();
        assert_eq!(cached.ticker().as_str(), "TCS");
        assert_eq!(cached.quarterly_data.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_cache_suggestions_normalized() {
        let cache = InMemoryCache::new();
        let results = vec![Suggestion::new("Infosys Ltd", "INFY")];

        cache.put_suggestions("  inf ", &results).await.unwrap();
        let cached = cache.get_suggestions("INF").await.unwrap().unwrap();
        assert_eq!(cached, results);

        cache.put_suggestions("zzz", &[]).await.unwrap();
        assert!(cache.get_suggestions("zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_expired_entries_miss() {
        let cache = InMemoryCache::with_ttl(CacheTtl {
            company: Duration::ZERO,
            ..CacheTtl::default()
        });
        cache.put_company(&company("INFY")).await.unwrap();
        cache.put_research(&report("INFY")).await.unwrap();

        assert!(cache.get_company(&Ticker::new("INFY")).await.unwrap().is_none());
        assert!(cache.get_research(&Ticker::new("INFY")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_ticker() {
        let cache = InMemoryCache::new();
        cache.put_company(&company("INFY")).await.unwrap();
        cache.put_research(&report("INFY")).await.unwrap();
        cache.put_company(&company("TCS")).await.unwrap();

        assert!(cache.invalidate(&Ticker::new("INFY")).await.unwrap());
        assert!(!cache.invalidate(&Ticker::new("INFY")).await.unwrap());
        assert!(cache.get_research(&Ticker::new("INFY")).await.unwrap().is_none());
        assert!(cache.get_company(&Ticker::new("TCS")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_stale_and_clear() {
        let cache = InMemoryCache::new();
        cache.put_company(&company("INFY")).await.unwrap();
        cache
            .put_suggestions("in", &[Suggestion::new("Infosys Ltd", "INFY")])
            .await
            .unwrap();

        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(cache.len().await, 2);

        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 2);
        assert!(cache.is_empty().await);

        cache.put_research(&report("TCS")).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.is_empty().await);
    }
}
