//! Dashboard orchestration.
//!
//! [`Dashboard`] is the single writer of the current company payload. It
//! fetches payloads (through a cache when one is configured), hands them to
//! the chart manager, records the ticker in the page location and routes
//! search commits back into loads. Every subsystem receives the data it
//! needs as an argument.

use std::sync::Arc;
use std::time::Instant;

use finchart_charts::{ChartData, ChartKind, ChartManager, PlotRenderer, RenderReport};
use finchart_core::{
    ChartError, CompanyCache, CompanyData, CompanyDataProvider, Granularity, ResearchProvider,
    ResearchReport, Result, Ticker,
};
use finchart_search::{Commit, Key, SearchController, SearchState};
use polars::prelude::DataFrame;
use tracing::{debug, instrument, warn};

use crate::location::Location;

/// A company load that has been started but not applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    /// Load sequence number.
    pub seq: u64,
    /// Ticker being loaded.
    pub ticker: Ticker,
}

/// Orchestrates data loading, chart rendering, search and research.
pub struct Dashboard<R, L> {
    charts: ChartManager<R>,
    search: SearchController,
    location: L,
    source: Arc<dyn CompanyDataProvider>,
    research_source: Option<Arc<dyn ResearchProvider>>,
    cache: Option<Arc<dyn CompanyCache>>,
    company: Option<CompanyData>,
    research: Option<ResearchReport>,
    granularity: Granularity,
    load_seq: u64,
}

impl<R, L> std::fmt::Debug for Dashboard<R, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("source", &self.source.name())
            .field(
                "research_source",
                &self.research_source.as_ref().map(|s| s.name().to_string()),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("company", &self.company.as_ref().map(CompanyData::ticker))
            .field("granularity", &self.granularity)
            .field("load_seq", &self.load_seq)
            .finish_non_exhaustive()
    }
}

impl<R: PlotRenderer, L: Location> Dashboard<R, L> {
    /// Create a dashboard with no company loaded.
    pub fn new(
        charts: ChartManager<R>,
        search: SearchController,
        source: Arc<dyn CompanyDataProvider>,
        location: L,
    ) -> Self {
        Self {
            charts,
            search,
            location,
            source,
            research_source: None,
            cache: None,
            company: None,
            research: None,
            granularity: Granularity::default(),
            load_seq: 0,
        }
    }

    /// Serve company payloads and search results from a cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CompanyCache>) -> Self {
        self.search = self.search.with_cache(cache.clone());
        self.cache = Some(cache);
        self
    }

    /// Enable the research view.
    #[must_use]
    pub fn with_research(mut self, source: Arc<dyn ResearchProvider>) -> Self {
        self.research_source = Some(source);
        self
    }

    /// Start at a granularity other than quarterly.
    #[must_use]
    pub const fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Starts a load. Any load started earlier becomes superseded.
    pub fn begin_load(&mut self, ticker: Ticker) -> LoadTicket {
        self.load_seq += 1;
        debug!(seq = self.load_seq, ticker = %ticker, "Starting company load");
        LoadTicket {
            seq: self.load_seq,
            ticker,
        }
    }

    /// Applies the outcome of a load.
    ///
    /// A failed or superseded load leaves the current payload and charts as
    /// they were.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<CompanyData>,
    ) -> Result<RenderReport> {
        if ticket.seq != self.load_seq {
            debug!(seq = ticket.seq, latest = self.load_seq, "Discarding superseded load");
            return Err(ChartError::Superseded {
                seq: ticket.seq,
                latest: self.load_seq,
            });
        }

        let mut data = match result {
            Ok(data) => data,
            Err(e) => {
                warn!(ticker = %ticket.ticker, error = %e, "Company load failed");
                return Err(e);
            }
        };

        let repaired = data.normalize();
        if repaired > 0 {
            warn!(ticker = %ticket.ticker, repaired, "Repaired misaligned series");
        }
        if self.company.as_ref().map(CompanyData::ticker) != Some(data.ticker()) {
            self.research = None;
        }
        self.location.set_ticker(data.ticker());
        self.company = Some(data);

        Ok(self.render().unwrap_or_default())
    }

    /// Fetches a company payload and renders it.
    ///
    /// `refresh` skips the local cache and asks the source to bypass its own.
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn load_company(&mut self, ticker: Ticker, refresh: bool) -> Result<RenderReport> {
        if ticker.is_empty() {
            return Err(ChartError::InvalidParameter("empty ticker".to_string()));
        }
        let ticket = self.begin_load(ticker);
        let result = self.fetch_company(&ticket.ticker, refresh).await;
        self.finish_load(&ticket, result)
    }

    /// Reloads the current company, bypassing every cache.
    pub async fn refresh(&mut self) -> Result<RenderReport> {
        let ticker = self.current_ticker()?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate(&ticker).await {
                warn!(error = %e, "Failed to invalidate cache");
            }
        }
        self.load_company(ticker, true).await
    }

    async fn fetch_company(&self, ticker: &Ticker, refresh: bool) -> Result<CompanyData> {
        if !refresh {
            if let Some(cache) = &self.cache {
                match cache.get_company(ticker).await {
                    Ok(Some(cached)) => {
                        debug!(ticker = %ticker, "Cache hit for company data");
                        return Ok(cached);
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Failed to read company cache"),
                }
            }
        }

        debug!(source = self.source.name(), ticker = %ticker, "Fetching company data");
        let data = self.source.fetch_company(ticker, refresh).await?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_company(&data).await {
                warn!(error = %e, "Failed to cache company data");
            }
        }
        Ok(data)
    }

    /// Loads the ticker recorded in the location, if there is one.
    pub async fn restore_from_location(&mut self) -> Option<Result<RenderReport>> {
        let ticker = self.location.ticker()?;
        debug!(ticker = %ticker, "Restoring company from location");
        Some(self.load_company(ticker, false).await)
    }

    /// Loads the company a search committed to.
    pub async fn commit_search(&mut self, commit: Commit) -> Result<RenderReport> {
        self.load_company(commit.ticker, false).await
    }

    /// Forwards a search input change.
    pub fn search_input(&mut self, query: &str, now: Instant) -> SearchState {
        self.search.input(query, now)
    }

    /// Forwards a key press to the search box, loading the company on commit.
    pub async fn search_key(&mut self, key: Key) -> Option<Result<RenderReport>> {
        let commit = self.search.key(key)?;
        Some(self.commit_search(commit).await)
    }

    /// Forwards a click on a search result, loading the company on commit.
    pub async fn search_click(&mut self, index: usize) -> Option<Result<RenderReport>> {
        let commit = self.search.click(index)?;
        Some(self.commit_search(commit).await)
    }

    /// Switches granularity and re-renders the current payload.
    pub fn set_granularity(&mut self, granularity: Granularity) -> Option<RenderReport> {
        self.granularity = granularity;
        self.render()
    }

    /// Flips between quarterly and annual.
    pub fn toggle_granularity(&mut self) -> Option<RenderReport> {
        self.set_granularity(self.granularity.toggled())
    }

    /// Re-renders every chart from the current payload.
    ///
    /// Returns `None` if no company is loaded.
    pub fn render(&mut self) -> Option<RenderReport> {
        let company = self.company.as_ref()?;
        Some(
            self.charts
                .render_all(&ChartData::from_company(company, self.granularity)),
        )
    }

    /// Fetches research for the current company.
    ///
    /// The analysis text is passed through untouched.
    pub async fn load_research(&mut self, refresh: bool) -> Result<&ResearchReport> {
        let source = self
            .research_source
            .clone()
            .ok_or_else(|| ChartError::InvalidParameter("no research source".to_string()))?;
        let company = self
            .company
            .as_ref()
            .ok_or_else(|| ChartError::InvalidParameter("no company loaded".to_string()))?;
        let ticker = company.ticker().clone();
        let company_name = company.company_info.name.clone();

        let mut report = None;
        if !refresh {
            if let Some(cache) = &self.cache {
                match cache.get_research(&ticker).await {
                    Ok(cached) => report = cached,
                    Err(e) => warn!(error = %e, "Failed to read research cache"),
                }
            }
        }
        let report = match report {
            Some(report) => {
                debug!(ticker = %ticker, "Cache hit for research");
                report
            }
            None => {
                let report = source.fetch_research(&ticker, &company_name, refresh).await?;
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put_research(&report).await {
                        warn!(error = %e, "Failed to cache research");
                    }
                }
                report
            }
        };

        Ok(self.research.insert(report))
    }

    /// The current series at `granularity` as a DataFrame.
    pub fn export_frame(&self, granularity: Granularity) -> Result<DataFrame> {
        let company = self
            .company
            .as_ref()
            .ok_or_else(|| ChartError::InvalidParameter("no company loaded".to_string()))?;
        company.series(granularity).to_frame()
    }

    /// Exports a chart image. Returns false if the chart is empty.
    pub fn export_chart(&mut self, kind: ChartKind) -> bool {
        self.charts.export(kind)
    }

    /// Records a window resize.
    pub fn on_resize(&mut self, now: Instant) {
        self.charts.on_resize(now);
    }

    /// Earliest pending timer across search and resize.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search.next_deadline(), self.charts.next_resize_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs every timer due at `now`: a pending search fetch and a pending resize.
    pub async fn run_due(&mut self, now: Instant) {
        self.search.run_due(now).await;
        self.charts.poll_resize(now);
    }

    fn current_ticker(&self) -> Result<Ticker> {
        self.company
            .as_ref()
            .map(|c| c.ticker().clone())
            .ok_or_else(|| ChartError::InvalidParameter("no company loaded".to_string()))
    }

    /// The loaded payload.
    #[must_use]
    pub const fn company(&self) -> Option<&CompanyData> {
        self.company.as_ref()
    }

    /// The last research report for the loaded company.
    #[must_use]
    pub const fn research(&self) -> Option<&ResearchReport> {
        self.research.as_ref()
    }

    /// The active granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The chart manager.
    #[must_use]
    pub const fn charts(&self) -> &ChartManager<R> {
        &self.charts
    }

    /// The chart manager, mutably.
    pub fn charts_mut(&mut self) -> &mut ChartManager<R> {
        &mut self.charts
    }

    /// The search controller.
    #[must_use]
    pub const fn search(&self) -> &SearchController {
        &self.search
    }

    /// The search controller, mutably.
    pub fn search_mut(&mut self) -> &mut SearchController {
        &mut self.search
    }

    /// The page location.
    #[must_use]
    pub const fn location(&self) -> &L {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use finchart_cache::InMemoryCache;
    use finchart_charts::{ChartSpec, ChartTheme, ExportOptions};
    use finchart_core::{
        CompanyInfo, DataSource, LineItem, PeriodSeries, Suggestion, SuggestionProvider,
    };

    use super::*;
    use crate::location::UrlLocation;

    #[derive(Debug, Default)]
    struct CountingRenderer {
        plots: Vec<String>,
        placeholders: usize,
    }

    impl PlotRenderer for CountingRenderer {
        fn container_width(&self, _container: &str) -> Result<f64> {
            Ok(800.0)
        }

        fn plot(&mut self, container: &str, _spec: &ChartSpec) -> Result<()> {
            self.plots.push(container.to_string());
            Ok(())
        }

        fn placeholder(&mut self, _container: &str, _message: &str) -> Result<()> {
            self.placeholders += 1;
            Ok(())
        }

        fn resize(&mut self, _container: &str) -> Result<()> {
            Ok(())
        }

        fn scroll_to(&mut self, _container: &str, _offset: f64) -> Result<()> {
            Ok(())
        }

        fn export_image(
            &mut self,
            _container: &str,
            _spec: &ChartSpec,
            _options: &ExportOptions,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedSource {
        companies: HashMap<String, CompanyData>,
        fetches: Mutex<Vec<(String, bool)>>,
    }

    impl ScriptedSource {
        fn with_company(mut self, data: CompanyData) -> Self {
            self.companies.insert(data.ticker().to_string(), data);
            self
        }

        fn fetch_count(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }
    }

    impl DataSource for ScriptedSource {
        fn name(&self) -> &str {
            "Scripted"
        }
    }

    #[async_trait]
    impl CompanyDataProvider for ScriptedSource {
        async fn fetch_company(&self, ticker: &Ticker, refresh: bool) -> Result<CompanyData> {
            self.fetches
                .lock()
                .unwrap()
                .push((ticker.to_string(), refresh));
            self.companies
                .get(ticker.as_str())
                .cloned()
                .ok_or_else(|| ChartError::CompanyNotFound(ticker.to_string()))
        }
    }

    #[async_trait]
    impl SuggestionProvider for ScriptedSource {
        async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>> {
            let query = query.to_uppercase();
            Ok(self
                .companies
                .values()
                .filter(|c| c.ticker().as_str().starts_with(&query))
                .map(|c| Suggestion::new(c.company_info.name.clone(), c.ticker().clone()))
                .collect())
        }
    }

    #[async_trait]
    impl ResearchProvider for ScriptedSource {
        async fn fetch_research(
            &self,
            ticker: &Ticker,
            company_name: &str,
            _refresh: bool,
        ) -> Result<ResearchReport> {
            Ok(ResearchReport {
                ticker: ticker.clone(),
                company_name: company_name.to_string(),
                analysis: "## Verdict\n**Hold** <b>as-is</b>".to_string(),
                generated_at: None,
                cache_expires_at: None,
            })
        }
    }

    fn company(ticker: &str) -> CompanyData {
        let mut data = CompanyData::new(CompanyInfo::new(format!("{ticker} Ltd"), ticker));
        data.quarterly_data = PeriodSeries::with_periods(["Jun 2024", "Sep 2024", "Dec 2024"])
            .with(LineItem::Sales, vec![Some(1000.0), Some(1100.0), Some(1200.0)])
            .with(LineItem::NetProfit, vec![Some(100.0), Some(120.0), Some(130.0)])
            .with(LineItem::Eps, vec![Some(2.0), Some(2.4), Some(2.6)]);
        data.annual_data = PeriodSeries::with_periods(["Mar 2023", "Mar 2024"])
            .with(LineItem::Sales, vec![Some(3900.0), Some(4300.0)])
            .with(LineItem::NetProfit, vec![Some(400.0), Some(450.0)])
            .with(LineItem::CashFromOperations, vec![Some(500.0), Some(600.0)]);
        data
    }

    fn source() -> Arc<ScriptedSource> {
        Arc::new(
            ScriptedSource::default()
                .with_company(company("TCS"))
                .with_company(company("INFY")),
        )
    }

    fn dashboard(source: Arc<ScriptedSource>) -> Dashboard<CountingRenderer, UrlLocation> {
        let charts = ChartManager::new(CountingRenderer::default(), ChartTheme::light());
        let search = SearchController::new(source.clone());
        let location = UrlLocation::parse("https://example.com/").unwrap();
        Dashboard::new(charts, search, source, location)
    }

    #[tokio::test]
    async fn test_load_company_renders_and_records_location() {
        let mut dashboard = dashboard(source());
        let report = dashboard.load_company(Ticker::new("tcs"), false).await.unwrap();

        assert!(report.is_rendered(ChartKind::Revenue));
        assert!(report.is_rendered(ChartKind::CashFlow));
        assert!(!report.is_rendered(ChartKind::Shareholding));
        assert_eq!(dashboard.company().unwrap().ticker().as_str(), "TCS");
        assert_eq!(
            dashboard.location().url().as_str(),
            "https://example.com/?ticker=TCS"
        );
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_company() {
        let mut dashboard = dashboard(source());
        dashboard.load_company(Ticker::new("TCS"), false).await.unwrap();
        let plots = dashboard.charts().renderer().plots.len();

        let err = dashboard
            .load_company(Ticker::new("NOPE"), false)
            .await
            .unwrap_err();
        assert!(err.is_fetch_failure());
        assert_eq!(
            err.user_message(),
            "Company 'NOPE' not found. Please check the ticker symbol."
        );
        assert_eq!(dashboard.company().unwrap().ticker().as_str(), "TCS");
        assert_eq!(dashboard.charts().renderer().plots.len(), plots);
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let mut dashboard = dashboard(source());
        let first = dashboard.begin_load(Ticker::new("TCS"));
        let second = dashboard.begin_load(Ticker::new("INFY"));

        let err = dashboard
            .finish_load(&first, Ok(company("TCS")))
            .unwrap_err();
        assert!(matches!(err, ChartError::Superseded { seq: 1, latest: 2 }));
        assert!(dashboard.company().is_none());

        dashboard.finish_load(&second, Ok(company("INFY"))).unwrap();
        assert_eq!(dashboard.company().unwrap().ticker().as_str(), "INFY");
    }

    #[tokio::test]
    async fn test_granularity_switch_rerenders() {
        let mut dashboard = dashboard(source());
        assert!(dashboard.set_granularity(Granularity::Annual).is_none());
        dashboard.set_granularity(Granularity::Quarterly);

        dashboard.load_company(Ticker::new("TCS"), false).await.unwrap();
        dashboard.toggle_granularity().unwrap();
        assert_eq!(dashboard.granularity(), Granularity::Annual);

        let revenue = dashboard.charts().spec(ChartKind::Revenue).unwrap();
        assert_eq!(revenue.layout.title.text, "Revenue (Annual)");
        assert_eq!(revenue.data[0].x.len(), 2);
    }

    #[tokio::test]
    async fn test_restore_from_location() {
        let source = source();
        let charts = ChartManager::new(CountingRenderer::default(), ChartTheme::dark());
        let search = SearchController::new(source.clone());
        let location = UrlLocation::parse("https://example.com/?ticker=infy").unwrap();
        let mut dashboard = Dashboard::new(charts, search, source, location);

        let report = dashboard.restore_from_location().await.unwrap().unwrap();
        assert!(report.is_rendered(ChartKind::Eps));
        assert_eq!(dashboard.company().unwrap().ticker().as_str(), "INFY");

        let mut empty = self::dashboard(self::source());
        assert!(empty.restore_from_location().await.is_none());
    }

    #[tokio::test]
    async fn test_search_commit_loads_company() {
        let mut dashboard = dashboard(source());
        let start = Instant::now();
        dashboard.search_input("in", start);
        let deadline = dashboard.next_deadline().unwrap();
        dashboard.run_due(deadline).await;
        assert_eq!(dashboard.search().session().results().len(), 1);

        assert!(dashboard.search_key(Key::ArrowDown).await.is_none());
        let report = dashboard.search_key(Key::Enter).await.unwrap().unwrap();
        assert!(report.is_rendered(ChartKind::Revenue));
        assert_eq!(dashboard.company().unwrap().ticker().as_str(), "INFY");
        assert!(dashboard.next_deadline().is_none());
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_loads() {
        let source = source();
        let mut dashboard = dashboard(source.clone()).with_cache(Arc::new(InMemoryCache::new()));

        dashboard.load_company(Ticker::new("TCS"), false).await.unwrap();
        dashboard.load_company(Ticker::new("TCS"), false).await.unwrap();
        assert_eq!(source.fetch_count(), 1);

        dashboard.refresh().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(
            source.fetches.lock().unwrap().last().cloned(),
            Some(("TCS".to_string(), true))
        );
    }

    #[tokio::test]
    async fn test_research_passes_text_through() {
        let source = source();
        let mut dashboard = dashboard(source.clone()).with_research(source);
        assert!(dashboard.load_research(false).await.is_err());

        dashboard.load_company(Ticker::new("TCS"), false).await.unwrap();
        let report = dashboard.load_research(false).await.unwrap();
        assert_eq!(report.company_name, "TCS Ltd");
        assert_eq!(report.analysis, "## Verdict\n**Hold** <b>as-is</b>");

        dashboard.load_company(Ticker::new("INFY"), false).await.unwrap();
        assert!(dashboard.research().is_none());
    }

    #[tokio::test]
    async fn test_empty_payload_leaves_charts_empty() {
        let source = Arc::new(ScriptedSource::default().with_company(CompanyData::new(
            CompanyInfo::new("Shell Co", "SHELL"),
        )));
        let mut dashboard = dashboard(source);
        let report = dashboard.load_company(Ticker::new("SHELL"), false).await.unwrap();

        assert!(report.rendered.is_empty());
        assert!(dashboard.charts().renderer().plots.is_empty());
        assert_eq!(dashboard.charts().renderer().placeholders, 7);
        assert!(!dashboard.export_chart(ChartKind::Revenue));
    }

    #[tokio::test]
    async fn test_export_frame() {
        let mut dashboard = dashboard(source());
        assert!(dashboard.export_frame(Granularity::Quarterly).is_err());

        dashboard.load_company(Ticker::new("TCS"), false).await.unwrap();
        let df = dashboard.export_frame(Granularity::Quarterly).unwrap();
        assert_eq!(df.height(), 3);
        let annual = dashboard.export_frame(Granularity::Annual).unwrap();
        assert_eq!(annual.height(), 2);
    }

    #[tokio::test]
    async fn test_empty_ticker_rejected() {
        let mut dashboard = dashboard(source());
        assert!(matches!(
            dashboard.load_company(Ticker::new("  "), false).await,
            Err(ChartError::InvalidParameter(_))
        ));
    }
}
