//! Chart themes.
//!
//! A [`ChartTheme`] carries everything that varies between dashboard
//! variants: colours, toolbar options, margins, sizing and scroll policy,
//! and how amounts are written in hover text. Trace assembly and layout are
//! shared; only the theme value differs.

use serde::{Deserialize, Serialize};

use crate::format::DigitGrouping;
use crate::layout::{ScrollAnchor, SizingPolicy};

const LIGHT_PALETTE: [&str; 12] = [
    "#2563eb", "#f97316", "#16a34a", "#dc2626", "#9333ea", "#0d9488", "#ca8a04", "#db2777",
    "#4f46e5", "#65a30d", "#0891b2", "#78716c",
];

const DARK_PALETTE: [&str; 12] = [
    "#5cb0ff", "#ffa94d", "#3fb68b", "#f0635c", "#b197fc", "#38d9a9", "#f7c843", "#f783ac",
    "#748ffc", "#a9e34b", "#66d9e8", "#adb5bd",
];

/// Plot margins, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Left.
    pub l: f64,
    /// Right.
    pub r: f64,
    /// Top.
    pub t: f64,
    /// Bottom.
    pub b: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            l: 60.0,
            r: 20.0,
            t: 50.0,
            b: 60.0,
        }
    }
}

/// Toolbar (mode bar) options passed to the plotting collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarOptions {
    /// Show the toolbar at all.
    pub display: bool,
    /// Keep the image-export button.
    pub export_button: bool,
    /// Keep zoom and pan buttons.
    pub zoom: bool,
    /// Show the plotting library's logo.
    pub logo: bool,
    /// Let the plot follow its container on resize.
    pub responsive: bool,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self::full()
    }
}

impl ToolbarOptions {
    /// Every tool except the logo.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            display: true,
            export_button: true,
            zoom: true,
            logo: false,
            responsive: true,
        }
    }

    /// Export button only.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            display: true,
            export_button: true,
            zoom: false,
            logo: false,
            responsive: true,
        }
    }

    /// Plotly-shaped `config` object for these options.
    #[must_use]
    pub fn plot_config(&self) -> PlotConfig {
        let mut remove = vec!["lasso2d", "select2d"];
        if !self.zoom {
            remove.extend(["zoom2d", "pan2d", "zoomIn2d", "zoomOut2d", "autoScale2d"]);
        }
        if !self.export_button {
            remove.push("toImage");
        }
        PlotConfig {
            display_mode_bar: self.display,
            displaylogo: self.logo,
            responsive: self.responsive,
            mode_bar_buttons_to_remove: remove.into_iter().map(String::from).collect(),
        }
    }
}

/// Plot configuration handed to the plotting collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    /// Show the toolbar.
    pub display_mode_bar: bool,
    /// Show the library logo.
    pub displaylogo: bool,
    /// Follow container resizes.
    pub responsive: bool,
    /// Toolbar buttons to hide.
    pub mode_bar_buttons_to_remove: Vec<String>,
}

/// Visual and sizing configuration shared by every chart in a dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    /// Theme name.
    pub name: String,
    /// Series colours, assigned by series role.
    pub palette: Vec<String>,
    /// Page background behind the plot.
    pub paper_background: String,
    /// Plot area background.
    pub plot_background: String,
    /// Text colour.
    pub font_color: String,
    /// Font family.
    pub font_family: String,
    /// Base font size.
    pub font_size: f64,
    /// Grid line colour.
    pub grid_color: String,
    /// Toolbar options.
    pub toolbar: ToolbarOptions,
    /// Plot margins.
    pub margins: Margins,
    /// Surface width policy.
    pub sizing: SizingPolicy,
    /// Post-render scroll position.
    pub scroll: ScrollAnchor,
    /// Chart height, in pixels.
    pub height: f64,
    /// Prefix for monetary amounts (e.g. "₹").
    pub currency_prefix: String,
    /// Suffix for aggregate amounts (e.g. " Cr").
    pub amount_suffix: String,
    /// Digit grouping for hover values.
    pub grouping: DigitGrouping,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl ChartTheme {
    /// Light theme with the full toolbar.
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            palette: LIGHT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            paper_background: "#ffffff".to_string(),
            plot_background: "#ffffff".to_string(),
            font_color: "#0c1625".to_string(),
            font_family: "Inter, system-ui, sans-serif".to_string(),
            font_size: 12.0,
            grid_color: "rgba(0, 0, 0, 0.08)".to_string(),
            toolbar: ToolbarOptions::full(),
            margins: Margins::default(),
            sizing: SizingPolicy::default(),
            scroll: ScrollAnchor::Latest,
            height: 400.0,
            currency_prefix: "₹".to_string(),
            amount_suffix: " Cr".to_string(),
            grouping: DigitGrouping::Indian,
        }
    }

    /// Dark theme with the full toolbar.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            palette: DARK_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            paper_background: "#0b111a".to_string(),
            plot_background: "#0b111a".to_string(),
            font_color: "#e6edf7".to_string(),
            grid_color: "rgba(255, 255, 255, 0.08)".to_string(),
            ..Self::light()
        }
    }

    /// Light theme with only the export button, for embedded charts.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            name: "compact".to_string(),
            ..Self::light().with_toolbar(ToolbarOptions::minimal())
        }
    }

    /// Replaces the toolbar options.
    #[must_use]
    pub fn with_toolbar(mut self, toolbar: ToolbarOptions) -> Self {
        self.toolbar = toolbar;
        self
    }

    /// Replaces the sizing policy.
    #[must_use]
    pub const fn with_sizing(mut self, sizing: SizingPolicy) -> Self {
        self.sizing = sizing;
        self
    }

    /// Replaces the scroll anchor.
    #[must_use]
    pub const fn with_scroll(mut self, scroll: ScrollAnchor) -> Self {
        self.scroll = scroll;
        self
    }

    /// Replaces the currency prefix and amount suffix.
    #[must_use]
    pub fn with_units(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.currency_prefix = prefix.into();
        self.amount_suffix = suffix.into();
        self
    }

    /// Colour for the `slot`-th series role, cycling through the palette.
    #[must_use]
    pub fn color(&self, slot: usize) -> &str {
        if self.palette.is_empty() {
            return "#808080";
        }
        &self.palette[slot % self.palette.len()]
    }
}
