//! Collaborator traits for fetching dashboard data.
//!
//! This module defines the data-source traits:
//!
//! - [`DataSource`] - Base trait for all data sources
//! - [`CompanyDataProvider`] - Full company payloads by ticker
//! - [`SuggestionProvider`] - Autocomplete suggestions for a query
//! - [`ResearchProvider`] - Generated research text for a company

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{CompanyData, ResearchReport, Suggestion, Ticker},
};

/// Base trait for all data sources.
pub trait DataSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "Dashboard API").
    fn name(&self) -> &str;
}

/// Source of complete company payloads.
#[async_trait]
pub trait CompanyDataProvider: DataSource {
    /// Fetches the company payload for a ticker.
    ///
    /// `refresh` asks the source to bypass its own cache.
    async fn fetch_company(&self, ticker: &Ticker, refresh: bool) -> Result<CompanyData>;
}

/// Source of autocomplete suggestions.
#[async_trait]
pub trait SuggestionProvider: DataSource {
    /// Returns suggestions for a query, in the source's ranking order.
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>>;
}

/// Source of generated research analysis.
#[async_trait]
pub trait ResearchProvider: DataSource {
    /// Fetches research for a company.
    ///
    /// `refresh` asks the source to regenerate instead of serving a cached copy.
    async fn fetch_research(
        &self,
        ticker: &Ticker,
        company_name: &str,
        refresh: bool,
    ) -> Result<ResearchReport>;
}
