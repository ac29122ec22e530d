#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finchart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Chart pipeline for financial dashboards.
//!
//! Data flows one way through this crate:
//!
//! - [`derive`](derived::derive) - Margins, tax and breakdown amounts per period
//! - [`assemble`](traces::assemble) - Which series each chart shows, with hover text
//! - [`SizingPolicy`](layout::SizingPolicy) - Surface width and scroll offset from period count
//! - [`ChartManager`](lifecycle::ChartManager) - Render, resize and export through a [`PlotRenderer`]

/// Derived metric calculator.
pub mod derived;
/// Hover-text number formatting.
pub mod format;
/// Surface sizing and scroll policy.
pub mod layout;
/// Chart lifecycle manager and renderer trait.
pub mod lifecycle;
/// Chart specification types.
pub mod spec;
/// Themes and toolbar options.
pub mod theme;
/// Trace assembly.
pub mod traces;

pub use derived::{DerivedSeries, derive, percent_of};
pub use format::{DigitGrouping, format_number};
pub use layout::{ScrollAnchor, SizingPolicy, Surface};
pub use lifecycle::{
    ChartData, ChartManager, ChartManagerConfig, ChartState, ExportOptions, ImageFormat,
    PlotRenderer, RenderReport, build_spec,
};
pub use spec::{ChartKind, ChartLayout, ChartSpec, SeriesRole, Trace};
pub use theme::{ChartTheme, PlotConfig, ToolbarOptions};
pub use traces::{TraceInputs, assemble};
