#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finchart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core data model and collaborator traits for financial chart dashboards.
//!
//! This crate provides the foundational abstractions shared by the chart
//! pipeline, the search autocomplete and the data sources:
//!
//! - [`PeriodSeries`](series::PeriodSeries) - Financial line items aligned to reporting periods
//! - [`ShareholdingSeries`](series::ShareholdingSeries) - Shareholding pattern per period
//! - [`CompanyData`](types::CompanyData) - Complete company payload
//! - [`CompanyDataProvider`](provider::CompanyDataProvider) - Company payload source
//! - [`SuggestionProvider`](provider::SuggestionProvider) - Autocomplete source
//! - [`ResearchProvider`](provider::ResearchProvider) - Research text source
//! - [`CompanyCache`](cache::CompanyCache) - Caching abstraction
//! - [`Debouncer`](debounce::Debouncer) - Deterministic debounce timer

/// Cache trait for storing fetched data.
pub mod cache;
/// Debounce timer primitive.
pub mod debounce;
/// Error types for dashboard operations.
pub mod error;
/// Polars conversions for tabular export.
pub mod frame;
/// Quarterly/annual granularity.
pub mod granularity;
/// Collaborator traits for fetching data.
pub mod provider;
/// Period-indexed financial series.
pub mod series;
/// Company-level data types (Ticker, CompanyInfo, Suggestion, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::CompanyCache;
pub use debounce::Debouncer;
pub use error::{ChartError, Result};
pub use granularity::Granularity;
pub use provider::{CompanyDataProvider, DataSource, ResearchProvider, SuggestionProvider};
pub use series::{LineItem, PeriodSeries, ShareholdingCategory, ShareholdingSeries};
pub use types::{CompanyData, CompanyInfo, ResearchReport, Suggestion, Ticker};
