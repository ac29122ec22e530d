//! Chart specification types.
//!
//! A [`ChartSpec`] is the finished description of one chart: its traces, its
//! layout and its toolbar configuration. It serializes to the `data` /
//! `layout` / `config` triple a Plotly-style renderer expects.

use finchart_core::Granularity;
use serde::{Deserialize, Serialize};

use crate::layout::{Surface, x_range};
use crate::theme::{ChartTheme, Margins, PlotConfig};

/// The charts of a dashboard, in render order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Sales with expenses and operating profit.
    Revenue,
    /// Net profit against operating profit and profit before tax.
    ProfitComparison,
    /// Gross, operating and net margin.
    Margins,
    /// Earnings per share.
    Eps,
    /// Where each unit of sales went, stacked.
    ExpenseBreakdown,
    /// Annual cash flows.
    CashFlow,
    /// Shareholding pattern.
    Shareholding,
}

impl ChartKind {
    /// Every chart, in render order.
    pub const ALL: [Self; 7] = [
        Self::Revenue,
        Self::ProfitComparison,
        Self::Margins,
        Self::Eps,
        Self::ExpenseBreakdown,
        Self::CashFlow,
        Self::Shareholding,
    ];

    /// Identifier of the host container for this chart.
    #[must_use]
    pub const fn container_id(self) -> &'static str {
        match self {
            Self::Revenue => "revenue-chart",
            Self::ProfitComparison => "profit-chart",
            Self::Margins => "margins-chart",
            Self::Eps => "eps-chart",
            Self::ExpenseBreakdown => "expense-breakdown-chart",
            Self::CashFlow => "cashflow-chart",
            Self::Shareholding => "shareholding-chart",
        }
    }

    /// Chart title without the granularity qualifier.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::ProfitComparison => "Profit Comparison",
            Self::Margins => "Margins",
            Self::Eps => "Earnings per Share",
            Self::ExpenseBreakdown => "Expense Breakdown",
            Self::CashFlow => "Cash Flow",
            Self::Shareholding => "Shareholding Pattern",
        }
    }

    /// Returns true if this chart reads annual data regardless of the
    /// dashboard granularity.
    #[must_use]
    pub const fn always_annual(self) -> bool {
        matches!(self, Self::CashFlow)
    }

    /// The granularity this chart is drawn at.
    #[must_use]
    pub const fn granularity(self, dashboard: Granularity) -> Granularity {
        if self.always_annual() {
            Granularity::Annual
        } else {
            dashboard
        }
    }
}

/// The meaning of a plotted series. Fixes its legend label and colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SeriesRole {
    Sales,
    Expenses,
    OperatingProfit,
    ProfitBeforeTax,
    NetProfit,
    GrossMargin,
    OperatingMargin,
    NetMargin,
    Eps,
    MaterialCost,
    OtherOperatingExpenses,
    Depreciation,
    Interest,
    Tax,
    CashFromOperations,
    CashFromInvesting,
    CashFromFinancing,
    NetCashFlow,
    Promoters,
    Fiis,
    Diis,
    Government,
    Public,
}

impl SeriesRole {
    /// Legend label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Expenses => "Expenses",
            Self::OperatingProfit => "Operating Profit",
            Self::ProfitBeforeTax => "Profit Before Tax",
            Self::NetProfit => "Net Profit",
            Self::GrossMargin => "Gross Margin %",
            Self::OperatingMargin => "Operating Margin %",
            Self::NetMargin => "Net Margin %",
            Self::Eps => "EPS",
            Self::MaterialCost => "Material Cost",
            Self::OtherOperatingExpenses => "Other Operating Expenses",
            Self::Depreciation => "Depreciation",
            Self::Interest => "Interest",
            Self::Tax => "Tax",
            Self::CashFromOperations => "Cash from Operations",
            Self::CashFromInvesting => "Cash from Investing",
            Self::CashFromFinancing => "Cash from Financing",
            Self::NetCashFlow => "Net Cash Flow",
            Self::Promoters => "Promoters",
            Self::Fiis => "FIIs",
            Self::Diis => "DIIs",
            Self::Government => "Government",
            Self::Public => "Public",
        }
    }

    /// Stable palette slot.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// Plotly trace type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    /// Bars.
    Bar,
    /// Lines and/or markers.
    Scatter,
}

/// Scatter drawing mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    /// Lines only.
    #[serde(rename = "lines")]
    Lines,
    /// Lines with a marker per point.
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

/// Marker styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Fill colour.
    pub color: String,
}

/// Line styling for scatter traces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Stroke colour.
    pub color: String,
    /// Stroke width, in pixels.
    pub width: f64,
}

/// One plotted series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trace {
    /// What the series represents.
    #[serde(skip)]
    pub role: SeriesRole,
    /// Legend label.
    pub name: String,
    /// Trace type.
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    /// Scatter mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    /// Period labels.
    pub x: Vec<String>,
    /// Values; `None` renders as a gap.
    pub y: Vec<Option<f64>>,
    /// Per-period hover text.
    pub text: Vec<String>,
    /// Hover template that shows `text` only.
    pub hovertemplate: String,
    /// Marker styling.
    pub marker: Marker,
    /// Line styling for scatter traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    /// Whether scatter lines bridge absent values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectgaps: Option<bool>,
}

const HOVER_TEMPLATE: &str = "%{text}<extra></extra>";

impl Trace {
    /// A bar trace.
    #[must_use]
    pub fn bar(
        role: SeriesRole,
        color: &str,
        x: Vec<String>,
        y: Vec<Option<f64>>,
        text: Vec<String>,
    ) -> Self {
        Self {
            role,
            name: role.label().to_string(),
            trace_type: TraceType::Bar,
            mode: None,
            x,
            y,
            text,
            hovertemplate: HOVER_TEMPLATE.to_string(),
            marker: Marker {
                color: color.to_string(),
            },
            line: None,
            connectgaps: None,
        }
    }

    /// A line-with-markers trace.
    #[must_use]
    pub fn line(
        role: SeriesRole,
        color: &str,
        x: Vec<String>,
        y: Vec<Option<f64>>,
        text: Vec<String>,
    ) -> Self {
        Self {
            trace_type: TraceType::Scatter,
            mode: Some(TraceMode::LinesMarkers),
            line: Some(LineStyle {
                color: color.to_string(),
                width: 2.0,
            }),
            connectgaps: Some(false),
            ..Self::bar(role, color, x, y, text)
        }
    }
}

/// Bar arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    /// Side by side.
    Group,
    /// Stacked.
    Stack,
}

/// Title text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Title {
    /// The text.
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Axis description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis title.
    pub title: Title,
    /// Axis type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    /// Fixed domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    /// Suffix appended to tick labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticksuffix: Option<String>,
    /// Prefix prepended to tick labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickprefix: Option<String>,
    /// Grid line colour.
    pub gridcolor: String,
    /// Disable zoom on this axis.
    pub fixedrange: bool,
}

/// Font description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Family.
    pub family: String,
    /// Size.
    pub size: f64,
    /// Colour.
    pub color: String,
}

/// Legend placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    /// "h" or "v".
    pub orientation: String,
    /// Vertical anchor position.
    pub y: f64,
    /// "normal" or "reversed".
    pub traceorder: String,
}

/// Layout descriptor for one chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    /// Chart title.
    pub title: Title,
    /// X axis.
    pub xaxis: Axis,
    /// Y axis.
    pub yaxis: Axis,
    /// Bar arrangement, for bar charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
    /// Pinned width; absent when the plot fills its container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height, in pixels.
    pub height: f64,
    /// Fill the container when no width is pinned.
    pub autosize: bool,
    /// Plot margins.
    pub margin: Margins,
    /// Page background.
    pub paper_bgcolor: String,
    /// Plot area background.
    pub plot_bgcolor: String,
    /// Base font.
    pub font: Font,
    /// Legend placement.
    pub legend: Legend,
    /// Always show the legend, even for one series.
    pub showlegend: bool,
    /// Hover behaviour.
    pub hovermode: String,
}

impl ChartLayout {
    /// Builds the layout of `kind` for `periods` periods on `surface`.
    #[must_use]
    pub fn new(
        kind: ChartKind,
        theme: &ChartTheme,
        surface: &Surface,
        periods: usize,
        granularity: Granularity,
    ) -> Self {
        let amount_title = format!(
            "Amount ({}{})",
            theme.currency_prefix,
            theme.amount_suffix.trim_end()
        );
        let (y_title, ticksuffix, tickprefix, barmode) = match kind {
            ChartKind::Revenue | ChartKind::ProfitComparison | ChartKind::CashFlow => {
                (amount_title, None, None, Some(BarMode::Group))
            }
            ChartKind::ExpenseBreakdown => (amount_title, None, None, Some(BarMode::Stack)),
            ChartKind::Margins => ("Margin".to_string(), Some("%".to_string()), None, None),
            ChartKind::Eps => (
                format!("EPS ({})", theme.currency_prefix),
                None,
                Some(theme.currency_prefix.clone()),
                Some(BarMode::Group),
            ),
            ChartKind::Shareholding => ("Holding".to_string(), Some("%".to_string()), None, None),
        };

        Self {
            title: Title::new(format!(
                "{} ({})",
                kind.title(),
                kind.granularity(granularity).label()
            )),
            xaxis: Axis {
                title: Title::new("Period"),
                axis_type: Some("category".to_string()),
                range: Some(x_range(periods)),
                ticksuffix: None,
                tickprefix: None,
                gridcolor: theme.grid_color.clone(),
                fixedrange: true,
            },
            yaxis: Axis {
                title: Title::new(y_title),
                axis_type: None,
                range: None,
                ticksuffix,
                tickprefix,
                gridcolor: theme.grid_color.clone(),
                fixedrange: true,
            },
            barmode,
            width: surface.fixed_width(),
            height: theme.height,
            autosize: !surface.scrollable,
            margin: theme.margins,
            paper_bgcolor: theme.paper_background.clone(),
            plot_bgcolor: theme.plot_background.clone(),
            font: Font {
                family: theme.font_family.clone(),
                size: theme.font_size,
                color: theme.font_color.clone(),
            },
            legend: Legend {
                orientation: "h".to_string(),
                y: -0.2,
                traceorder: if kind == ChartKind::ExpenseBreakdown {
                    "reversed".to_string()
                } else {
                    "normal".to_string()
                },
            },
            showlegend: true,
            hovermode: "closest".to_string(),
        }
    }
}

/// A ready-to-render chart.
///
/// Serializes to the plotting library's figure shape. It is output only and
/// cannot be read back.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Which chart this is.
    #[serde(skip)]
    pub kind: ChartKind,
    /// Surface sizing used for the layout.
    #[serde(skip)]
    pub surface: Surface,
    /// Traces, in legend order (bottom of the stack first for stacked bars).
    pub data: Vec<Trace>,
    /// Layout descriptor.
    pub layout: ChartLayout,
    /// Toolbar configuration.
    pub config: PlotConfig,
}

impl ChartSpec {
    /// Trace names, in order.
    #[must_use]
    pub fn trace_names(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }

    /// Finds the trace for a role.
    #[must_use]
    pub fn trace(&self, role: SeriesRole) -> Option<&Trace> {
        self.data.iter().find(|t| t.role == role)
    }

    /// Serializes to a JSON value.
    pub fn to_json(&self) -> finchart_core::Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| finchart_core::ChartError::Render(e.to_string()))
    }
}
