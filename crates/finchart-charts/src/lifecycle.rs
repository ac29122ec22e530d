//! Chart lifecycle management.
//!
//! [`ChartManager`] drives an external [`PlotRenderer`] through render,
//! resize, scroll and export for the full chart set. Every chart is either
//! [`ChartState::Empty`] or [`ChartState::Rendered`]; failures degrade a
//! chart to empty and are logged, never returned.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use finchart_core::{
    CompanyData, Debouncer, Granularity, PeriodSeries, Result, ShareholdingSeries,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::derived::derive;
use crate::spec::{ChartKind, ChartLayout, ChartSpec};
use crate::theme::ChartTheme;
use crate::traces::{TraceInputs, assemble};

/// Text shown in a container whose chart has no data.
pub const EMPTY_PLACEHOLDER: &str = "No data available";

/// The external plotting collaborator.
///
/// Containers are addressed by [`ChartKind::container_id`].
pub trait PlotRenderer: Send {
    /// Width available inside a container, in pixels.
    ///
    /// Fails with [`ChartError::ContainerMissing`](finchart_core::ChartError::ContainerMissing)
    /// if the container does not exist.
    fn container_width(&self, container: &str) -> Result<f64>;

    /// Draws a finished chart into a container, replacing its contents.
    fn plot(&mut self, container: &str, spec: &ChartSpec) -> Result<()>;

    /// Replaces a container's contents with a fixed message.
    fn placeholder(&mut self, container: &str, message: &str) -> Result<()>;

    /// Re-fits an existing plot to its container.
    fn resize(&mut self, container: &str) -> Result<()>;

    /// Scrolls a container horizontally to `offset` pixels.
    fn scroll_to(&mut self, container: &str, offset: f64) -> Result<()>;

    /// Exports the plot in a container as an image.
    fn export_image(
        &mut self,
        container: &str,
        spec: &ChartSpec,
        options: &ExportOptions,
    ) -> Result<()>;
}

/// Image export format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG.
    #[default]
    Png,
    /// JPEG.
    Jpeg,
    /// SVG.
    Svg,
    /// WebP.
    Webp,
}

/// Image export parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output format.
    pub format: ImageFormat,
    /// Output width; the chart's own width when unset.
    pub width: Option<u32>,
    /// Output height; the chart's own height when unset.
    pub height: Option<u32>,
    /// Pixel ratio.
    pub scale: f64,
    /// File name without extension; the container id when unset.
    pub filename: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            width: None,
            height: None,
            scale: 2.0,
            filename: None,
        }
    }
}

impl ExportOptions {
    /// Sets the format.
    #[must_use]
    pub const fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets explicit output dimensions.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the file name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Lifecycle manager settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartManagerConfig {
    /// Quiet period before a resize is applied, in milliseconds.
    pub resize_debounce_ms: u64,
    /// Default export parameters.
    pub export: ExportOptions,
}

impl Default for ChartManagerConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 150,
            export: ExportOptions::default(),
        }
    }
}

impl ChartManagerConfig {
    /// The resize quiet period.
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// State of one chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ChartState {
    /// Showing the placeholder, or nothing if the container is missing.
    #[default]
    Empty,
    /// Plotted from this spec.
    Rendered(Box<ChartSpec>),
}

impl ChartState {
    /// Returns true if the chart is plotted.
    #[must_use]
    pub const fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    /// The plotted spec, if any.
    #[must_use]
    pub fn spec(&self) -> Option<&ChartSpec> {
        match self {
            Self::Rendered(spec) => Some(spec),
            Self::Empty => None,
        }
    }
}

/// The data one render pass draws from.
#[derive(Clone, Copy, Debug)]
pub struct ChartData<'a> {
    /// Series at the dashboard granularity.
    pub series: &'a PeriodSeries,
    /// Annual series for the cash flow chart.
    pub annual: &'a PeriodSeries,
    /// Shareholding pattern at the dashboard granularity.
    pub shareholding: Option<&'a ShareholdingSeries>,
    /// Dashboard granularity, used in titles.
    pub granularity: Granularity,
}

impl<'a> ChartData<'a> {
    /// Quarterly data with no shareholding pattern.
    #[must_use]
    pub const fn new(series: &'a PeriodSeries, annual: &'a PeriodSeries) -> Self {
        Self {
            series,
            annual,
            shareholding: None,
            granularity: Granularity::Quarterly,
        }
    }

    /// Selects everything a company payload holds at `granularity`.
    #[must_use]
    pub fn from_company(company: &'a CompanyData, granularity: Granularity) -> Self {
        Self {
            series: company.series(granularity),
            annual: &company.annual_data,
            shareholding: company.shareholding(granularity),
            granularity,
        }
    }

    /// Sets the shareholding pattern.
    #[must_use]
    pub const fn with_shareholding(mut self, shareholding: &'a ShareholdingSeries) -> Self {
        self.shareholding = Some(shareholding);
        self
    }

    /// Sets the granularity label.
    #[must_use]
    pub const fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }
}

/// Outcome of a render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Charts that were plotted, in render order.
    pub rendered: Vec<ChartKind>,
    /// Charts left empty, in render order.
    pub empty: Vec<ChartKind>,
}

impl RenderReport {
    /// Returns true if `kind` was plotted.
    #[must_use]
    pub fn is_rendered(&self, kind: ChartKind) -> bool {
        self.rendered.contains(&kind)
    }
}

/// Builds the spec of one chart for a container `available` pixels wide.
///
/// Returns `None` when the chart has no usable data.
#[must_use]
pub fn build_spec(
    kind: ChartKind,
    inputs: &TraceInputs<'_>,
    theme: &ChartTheme,
    available: f64,
    granularity: Granularity,
) -> Option<ChartSpec> {
    let data = assemble(kind, inputs, theme)?;
    let periods = inputs.period_count(kind);
    let surface = theme.sizing.surface(periods, available);
    Some(ChartSpec {
        kind,
        surface,
        data,
        layout: ChartLayout::new(kind, theme, &surface, periods, granularity),
        config: theme.toolbar.plot_config(),
    })
}

/// Owns the chart states and drives the renderer.
#[derive(Debug)]
pub struct ChartManager<R> {
    renderer: R,
    theme: ChartTheme,
    config: ChartManagerConfig,
    states: BTreeMap<ChartKind, ChartState>,
    resize: Debouncer,
}

impl<R: PlotRenderer> ChartManager<R> {
    /// Creates a manager with the default configuration.
    pub fn new(renderer: R, theme: ChartTheme) -> Self {
        Self::with_config(renderer, theme, ChartManagerConfig::default())
    }

    /// Creates a manager with an explicit configuration.
    pub fn with_config(renderer: R, theme: ChartTheme, config: ChartManagerConfig) -> Self {
        let resize = Debouncer::new(config.resize_debounce());
        Self {
            renderer,
            theme,
            config,
            states: BTreeMap::new(),
            resize,
        }
    }

    /// Renders every chart, then scrolls every plotted chart into place.
    #[instrument(skip(self, data), fields(periods = data.series.len(), granularity = %data.granularity))]
    pub fn render_all(&mut self, data: &ChartData<'_>) -> RenderReport {
        let derived = derive(data.series);
        let inputs = TraceInputs {
            series: data.series,
            derived: &derived,
            annual: data.annual,
            shareholding: data.shareholding,
        };

        let mut report = RenderReport::default();
        for kind in ChartKind::ALL {
            let state = self.draw(kind, &inputs, data.granularity);
            if state.is_rendered() {
                report.rendered.push(kind);
            } else {
                report.empty.push(kind);
            }
            self.states.insert(kind, state);
        }

        // Scrolling needs every container laid out first.
        for kind in &report.rendered {
            self.scroll(*kind);
        }

        debug!(
            rendered = report.rendered.len(),
            empty = report.empty.len(),
            "Render pass complete"
        );
        report
    }

    /// Renders one chart and scrolls it into place.
    pub fn render(&mut self, kind: ChartKind, data: &ChartData<'_>) -> &ChartState {
        let derived = derive(data.series);
        let inputs = TraceInputs {
            series: data.series,
            derived: &derived,
            annual: data.annual,
            shareholding: data.shareholding,
        };
        let state = self.draw(kind, &inputs, data.granularity);
        let rendered = state.is_rendered();
        self.states.insert(kind, state);
        if rendered {
            self.scroll(kind);
        }
        self.state(kind)
    }

    fn draw(
        &mut self,
        kind: ChartKind,
        inputs: &TraceInputs<'_>,
        granularity: Granularity,
    ) -> ChartState {
        let container = kind.container_id();
        let available = match self.renderer.container_width(container) {
            Ok(width) => width,
            Err(e) => {
                warn!(container, error = %e, "Chart container unavailable");
                return ChartState::Empty;
            }
        };

        let Some(spec) = build_spec(kind, inputs, &self.theme, available, granularity) else {
            debug!(container, "No usable data, showing placeholder");
            self.show_placeholder(container);
            return ChartState::Empty;
        };

        match self.renderer.plot(container, &spec) {
            Ok(()) => {
                debug!(
                    container,
                    traces = spec.data.len(),
                    width = spec.surface.width,
                    scrollable = spec.surface.scrollable,
                    "Rendered chart"
                );
                ChartState::Rendered(Box::new(spec))
            }
            Err(e) => {
                warn!(container, error = %e, "Plot failed, showing placeholder");
                self.show_placeholder(container);
                ChartState::Empty
            }
        }
    }

    fn show_placeholder(&mut self, container: &str) {
        if let Err(e) = self.renderer.placeholder(container, EMPTY_PLACEHOLDER) {
            warn!(container, error = %e, "Placeholder failed");
        }
    }

    fn scroll(&mut self, kind: ChartKind) {
        let Some(offset) = self
            .state(kind)
            .spec()
            .map(|spec| spec.surface.scroll_offset(self.theme.scroll))
        else {
            return;
        };
        let container = kind.container_id();
        if let Err(e) = self.renderer.scroll_to(container, offset) {
            warn!(container, error = %e, "Scroll failed");
        }
    }

    /// Records a window resize. Only the last of a burst takes effect.
    pub fn on_resize(&mut self, now: Instant) {
        self.resize.trigger(now);
    }

    /// When a pending resize will be applied.
    #[must_use]
    pub const fn next_resize_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    /// Applies a pending resize whose quiet period has elapsed.
    ///
    /// Returns the number of charts resized. Empty charts are untouched.
    pub fn poll_resize(&mut self, now: Instant) -> usize {
        if !self.resize.poll(now) {
            return 0;
        }
        let rendered: Vec<ChartKind> = self
            .states
            .iter()
            .filter(|(_, state)| state.is_rendered())
            .map(|(kind, _)| *kind)
            .collect();

        let mut resized = 0;
        for kind in rendered {
            let container = kind.container_id();
            match self.renderer.resize(container) {
                Ok(()) => resized += 1,
                Err(e) => warn!(container, error = %e, "Resize failed"),
            }
        }
        debug!(resized, "Applied resize");
        resized
    }

    /// Exports a plotted chart with the configured options.
    ///
    /// Returns false if the chart is empty or the export failed.
    pub fn export(&mut self, kind: ChartKind) -> bool {
        let options = self.config.export.clone();
        self.export_with(kind, &options)
    }

    /// Exports a plotted chart with explicit options.
    pub fn export_with(&mut self, kind: ChartKind, options: &ExportOptions) -> bool {
        let container = kind.container_id();
        let Some(ChartState::Rendered(spec)) = self.states.get(&kind) else {
            debug!(container, "Export ignored for empty chart");
            return false;
        };

        let mut options = options.clone();
        if options.filename.is_none() {
            options.filename = Some(container.to_string());
        }
        match self.renderer.export_image(container, spec, &options) {
            Ok(()) => true,
            Err(e) => {
                warn!(container, error = %e, "Export failed");
                false
            }
        }
    }

    /// Current state of a chart.
    #[must_use]
    pub fn state(&self, kind: ChartKind) -> &ChartState {
        const EMPTY: &ChartState = &ChartState::Empty;
        self.states.get(&kind).unwrap_or(EMPTY)
    }

    /// Spec of a plotted chart.
    #[must_use]
    pub fn spec(&self, kind: ChartKind) -> Option<&ChartSpec> {
        self.state(kind).spec()
    }

    /// The active theme.
    #[must_use]
    pub const fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    /// Switches theme. Takes effect on the next render.
    pub fn set_theme(&mut self, theme: ChartTheme) {
        self.theme = theme;
    }

    /// The manager configuration.
    #[must_use]
    pub const fn config(&self) -> &ChartManagerConfig {
        &self.config
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
