#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finchart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Async driver over a suggestion source.
pub mod controller;
/// Autocomplete state machine.
pub mod session;

pub use controller::SearchController;
pub use session::{Commit, Key, SearchConfig, SearchRequest, SearchSession, SearchState};
