#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finchart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for dashboard data.
//!
//! This crate provides implementations of the [`CompanyCache`] trait from `finchart-core`:
//!
//! - [`InMemoryCache`] - Session cache with per-kind time-to-live
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

pub use finchart_core::CompanyCache;

pub use memory::{CacheTtl, InMemoryCache};
pub use noop::NoopCache;
