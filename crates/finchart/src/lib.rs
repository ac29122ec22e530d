#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finchart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial chart dashboards.
//!
//! This crate re-exports the core types, the chart pipeline, the search
//! autocomplete and the cache implementations, and provides a [`Dashboard`]
//! that ties them together around one explicitly owned company payload.
//!
//! # Features
//!
//! - `http` - [`ApiClient`] for the dashboard backend
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finchart::{ApiClient, ChartManager, ChartTheme, Dashboard, SearchController, Ticker, UrlLocation};
//!
//! #[tokio::main]
//! async fn main() -> finchart::Result<()> {
//!     let api = Arc::new(ApiClient::new("http://localhost:8000")?);
//!     let charts = ChartManager::new(MyRenderer::default(), ChartTheme::light());
//!     let search = SearchController::new(api.clone());
//!     let location = UrlLocation::parse("https://dashboard.local/?ticker=TCS")?;
//!
//!     let mut dashboard = Dashboard::new(charts, search, api.clone(), location)
//!         .with_research(api)
//!         .with_cache(Arc::new(finchart::InMemoryCache::new()));
//!
//!     if let Some(result) = dashboard.restore_from_location().await {
//!         let report = result?;
//!         println!("{} charts rendered", report.rendered.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use finchart_core::*;

// Chart pipeline
pub use finchart_charts::{
    ChartData, ChartKind, ChartManager, ChartManagerConfig, ChartSpec, ChartState, ChartTheme,
    DerivedSeries, DigitGrouping, ExportOptions, ImageFormat, PlotRenderer, RenderReport,
    ScrollAnchor, SeriesRole, SizingPolicy, ToolbarOptions, Trace,
};

// Search
pub use finchart_search::{Commit, Key, SearchConfig, SearchController, SearchSession, SearchState};

// Cache implementations
pub use finchart_cache::{CacheTtl, InMemoryCache, NoopCache};

// HTTP client
#[cfg(feature = "http")]
pub use finchart_http::ApiClient;

mod dashboard;
pub use dashboard::{Dashboard, LoadTicket};

/// Page location state.
pub mod location;
pub use location::{Location, UrlLocation};
