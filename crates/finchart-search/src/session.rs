//! Search autocomplete state machine.
//!
//! [`SearchSession`] is driven entirely by explicit events. The caller
//! passes the current [`Instant`] with every keystroke and poll, performs
//! the fetch for each [`SearchRequest`] it receives, and hands the outcome
//! back with [`SearchSession::resolve`].

use std::time::{Duration, Instant};

use finchart_core::{Debouncer, Result, Suggestion, Ticker};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Autocomplete settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shortest trimmed query that triggers a search, in characters.
    pub min_query_len: usize,
    /// Quiet period after the last keystroke, in milliseconds.
    pub debounce_ms: u64,
    /// Drop responses to requests that are no longer the latest.
    ///
    /// When false, a late response to an older query still replaces the
    /// visible results.
    pub discard_stale_responses: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            debounce_ms: 300,
            discard_stale_responses: true,
        }
    }
}

impl SearchConfig {
    /// The debounce quiet period.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Observable state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchState {
    /// Dropdown closed, nothing scheduled.
    Idle,
    /// Debounce timer armed or a request in flight.
    Pending,
    /// Dropdown visible, nothing highlighted.
    Open,
    /// Dropdown visible with a highlighted result.
    Navigating,
}

/// Keys the dropdown reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Move the highlight down.
    ArrowDown,
    /// Move the highlight up.
    ArrowUp,
    /// Commit the highlight or the raw query.
    Enter,
    /// Close the dropdown and release focus.
    Escape,
}

/// A suggestion fetch to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    /// Monotonically increasing request number.
    pub seq: u64,
    /// Trimmed query text.
    pub query: String,
}

/// A committed selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Ticker to load.
    pub ticker: Ticker,
    /// The suggestion picked, if the commit came from the result list.
    pub suggestion: Option<Suggestion>,
}

/// One autocomplete session.
#[derive(Clone, Debug)]
pub struct SearchSession {
    config: SearchConfig,
    query: String,
    debounce: Debouncer,
    results: Vec<Suggestion>,
    open: bool,
    highlighted: Option<usize>,
    focused: bool,
    last_seq: u64,
    accepting: Option<u64>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl SearchSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        let debounce = Debouncer::new(config.debounce());
        Self {
            config,
            query: String::new(),
            debounce,
            results: Vec::new(),
            open: false,
            highlighted: None,
            focused: false,
            last_seq: 0,
            accepting: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SearchState {
        if self.debounce.is_armed() || (self.accepting.is_some() && !self.open) {
            SearchState::Pending
        } else if self.open && self.highlighted.is_some() {
            SearchState::Navigating
        } else if self.open {
            SearchState::Open
        } else {
            SearchState::Idle
        }
    }

    /// Handles a change of the input text.
    pub fn input(&mut self, query: &str, now: Instant) -> SearchState {
        if self.query != query {
            // The visible results no longer answer this query.
            self.highlighted = None;
        }
        self.query = query.to_string();
        self.focused = true;

        if self.query.trim().chars().count() < self.config.min_query_len {
            self.debounce.cancel();
            self.accepting = None;
            self.close();
        } else {
            self.debounce.trigger(now);
        }
        self.state()
    }

    /// When the debounce timer fires, if armed.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Fires the debounce timer if its quiet period has elapsed.
    ///
    /// Returns the fetch to perform, at most once per quiet period.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        if !self.debounce.poll(now) {
            return None;
        }
        self.last_seq += 1;
        self.accepting = Some(self.last_seq);
        let request = SearchRequest {
            seq: self.last_seq,
            query: self.query.trim().to_string(),
        };
        debug!(seq = request.seq, query = %request.query, "Dispatching suggestion request");
        Some(request)
    }

    /// Applies the outcome of a fetch.
    ///
    /// Returns false if the response was discarded as stale.
    pub fn resolve(&mut self, seq: u64, result: Result<Vec<Suggestion>>) -> bool {
        if self.config.discard_stale_responses && self.accepting != Some(seq) {
            debug!(seq, latest = self.last_seq, "Discarding stale suggestions");
            return false;
        }
        if self.accepting == Some(seq) {
            self.accepting = None;
        }

        match result {
            Ok(results) => {
                debug!(seq, count = results.len(), "Suggestions received");
                self.results = results;
                self.open = true;
                self.highlighted = None;
            }
            Err(e) => {
                warn!(seq, error = %e, "Suggestion request failed");
                self.close();
            }
        }
        true
    }

    /// Handles a key press. Returns a commit for Enter.
    pub fn key(&mut self, key: Key) -> Option<Commit> {
        match key {
            Key::ArrowDown => {
                if let Some(last) = self.last_index() {
                    self.highlighted = Some(self.highlighted.map_or(0, |i| (i + 1).min(last)));
                }
                None
            }
            Key::ArrowUp => {
                if let Some(last) = self.last_index() {
                    self.highlighted =
                        Some(self.highlighted.map_or(0, |i| i.saturating_sub(1).min(last)));
                }
                None
            }
            Key::Enter => self.enter(),
            Key::Escape => {
                self.debounce.cancel();
                self.accepting = None;
                self.close();
                self.focused = false;
                None
            }
        }
    }

    fn enter(&mut self) -> Option<Commit> {
        let highlighted = self
            .highlighted
            .filter(|_| self.open)
            .and_then(|i| self.results.get(i))
            .cloned();
        if let Some(suggestion) = highlighted {
            return Some(self.commit(suggestion.ticker.clone(), Some(suggestion)));
        }
        let raw = self.query.trim();
        if raw.is_empty() {
            return None;
        }
        let ticker = Ticker::new(raw);
        Some(self.commit(ticker, None))
    }

    /// Handles a click on the result at `index`.
    pub fn click(&mut self, index: usize) -> Option<Commit> {
        if !self.open {
            return None;
        }
        let suggestion = self.results.get(index).cloned()?;
        Some(self.commit(suggestion.ticker.clone(), Some(suggestion)))
    }

    /// Handles a click outside the input and dropdown.
    pub fn click_outside(&mut self) {
        self.debounce.cancel();
        self.accepting = None;
        self.close();
    }

    fn commit(&mut self, ticker: Ticker, suggestion: Option<Suggestion>) -> Commit {
        debug!(ticker = %ticker, "Search committed");
        self.debounce.cancel();
        self.accepting = None;
        self.close();
        self.query.clear();
        Commit { ticker, suggestion }
    }

    fn close(&mut self) {
        self.open = false;
        self.results.clear();
        self.highlighted = None;
    }

    fn last_index(&self) -> Option<usize> {
        if self.open {
            self.results.len().checked_sub(1)
        } else {
            None
        }
    }

    /// The input text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The visible results.
    #[must_use]
    pub fn results(&self) -> &[Suggestion] {
        &self.results
    }

    /// Index of the highlighted result.
    #[must_use]
    pub const fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Returns true if the dropdown is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true if the dropdown is showing its "no results" state.
    #[must_use]
    pub fn shows_empty_state(&self) -> bool {
        self.open && self.results.is_empty()
    }

    /// Returns true if the input holds focus.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// The session settings.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finchart_core::ChartError;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn suggestions(tickers: &[&str]) -> Vec<Suggestion> {
        tickers
            .iter()
            .map(|t| Suggestion::new(format!("{t} Ltd"), *t))
            .collect()
    }

    fn open_with(tickers: &[&str]) -> SearchSession {
        let start = Instant::now();
        let mut session = SearchSession::default();
        session.input("inf", start);
        let request = session.poll(start + ms(300)).unwrap();
        assert!(session.resolve(request.seq, Ok(suggestions(tickers))));
        session
    }

    #[test]
    fn test_short_query_stays_idle() {
        let start = Instant::now();
        let mut session = SearchSession::default();
        assert_eq!(session.input("a", start), SearchState::Idle);
        assert_eq!(session.input(" b  ", start), SearchState::Idle);
        assert!(session.poll(start + ms(1000)).is_none());
    }

    #[test]
    fn test_burst_dispatches_once_with_final_query() {
        let start = Instant::now();
        let mut session = SearchSession::default();
        assert_eq!(session.input("in", start), SearchState::Pending);
        session.input("inf", start + ms(100));
        session.input("info", start + ms(200));

        assert!(session.poll(start + ms(400)).is_none());
        let request = session.poll(start + ms(500)).unwrap();
        assert_eq!(request.query, "info");
        assert_eq!(request.seq, 1);
        assert!(session.poll(start + ms(900)).is_none());
    }

    #[test]
    fn test_backspace_below_minimum_cancels_dispatch() {
        let start = Instant::now();
        let mut session = SearchSession::default();
        session.input("AB", start);
        assert_eq!(session.input("A", start + ms(100)), SearchState::Idle);
        assert!(session.poll(start + ms(1000)).is_none());
        assert!(!session.is_open());
    }

    #[test]
    fn test_results_open_and_empty_state() {
        let session = open_with(&["INFY", "INFIBEAM"]);
        assert_eq!(session.state(), SearchState::Open);
        assert_eq!(session.results().len(), 2);
        assert!(!session.shows_empty_state());

        let empty = open_with(&[]);
        assert_eq!(empty.state(), SearchState::Open);
        assert!(empty.shows_empty_state());
    }

    #[test]
    fn test_retyping_clears_highlight_and_enter_commits_query() {
        let start = Instant::now();
        let mut session = open_with(&["INFY", "INFIBEAM"]);
        session.key(Key::ArrowDown);
        session.key(Key::ArrowDown);
        assert_eq!(session.highlighted(), Some(1));

        assert_eq!(session.input("tcs", start + ms(1000)), SearchState::Pending);
        assert_eq!(session.highlighted(), None);

        let commit = session.key(Key::Enter).unwrap();
        assert_eq!(commit.ticker, Ticker::new("TCS"));
        assert!(commit.suggestion.is_none());
    }

    #[test]
    fn test_new_result_set_resets_highlight() {
        let start = Instant::now();
        let mut session = open_with(&["INFY", "INFIBEAM"]);
        session.key(Key::ArrowDown);
        assert_eq!(session.state(), SearchState::Navigating);

        session.input("infy", start + ms(1000));
        // The previous results stay visible while the new request is pending.
        session.key(Key::ArrowDown);
        assert_eq!(session.highlighted(), Some(0));
        let request = session.poll(start + ms(1300)).unwrap();
        assert!(session.resolve(request.seq, Ok(suggestions(&["INFY"]))));

        assert_eq!(session.highlighted(), None);
        assert_eq!(session.state(), SearchState::Open);
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn test_failure_closes() {
        let start = Instant::now();
        let mut session = SearchSession::default();
        session.input("tcs", start);
        let request = session.poll(start + ms(300)).unwrap();
        session.resolve(request.seq, Err(ChartError::Network("down".into())));
        assert_eq!(session.state(), SearchState::Idle);
        assert!(!session.is_open());
    }

    #[test]
    fn test_arrow_navigation_clamps() {
        let mut session = open_with(&["A1", "A2", "A3"]);
        session.key(Key::ArrowUp);
        assert_eq!(session.highlighted(), Some(0));
        for _ in 0..5 {
            session.key(Key::ArrowDown);
        }
        assert_eq!(session.highlighted(), Some(2));
        assert_eq!(session.state(), SearchState::Navigating);
        for _ in 0..5 {
            session.key(Key::ArrowUp);
        }
        assert_eq!(session.highlighted(), Some(0));
    }

    #[test]
    fn test_arrows_ignored_without_results() {
        let mut session = open_with(&[]);
        session.key(Key::ArrowDown);
        assert_eq!(session.highlighted(), None);

        let mut idle = SearchSession::default();
        idle.key(Key::ArrowDown);
        assert_eq!(idle.highlighted(), None);
    }

    #[test]
    fn test_enter_commits_highlight() {
        let mut session = open_with(&["INFY", "INFIBEAM"]);
        session.key(Key::ArrowDown);
        session.key(Key::ArrowDown);
        let commit = session.key(Key::Enter).unwrap();
        assert_eq!(commit.ticker.as_str(), "INFIBEAM");
        assert_eq!(commit.suggestion.unwrap().name, "INFIBEAM Ltd");
        assert_eq!(session.state(), SearchState::Idle);
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_enter_without_highlight_commits_raw_query() {
        let mut session = open_with(&["INFY"]);
        session.input(" tcs ", Instant::now());
        let commit = session.key(Key::Enter).unwrap();
        assert_eq!(commit.ticker.as_str(), "TCS");
        assert!(commit.suggestion.is_none());
        assert_eq!(session.state(), SearchState::Idle);
        assert!(session.next_deadline().is_none());
    }

    #[test]
    fn test_enter_with_empty_query_does_nothing() {
        let mut session = SearchSession::default();
        session.input("  ", Instant::now());
        assert!(session.key(Key::Enter).is_none());
    }

    #[test]
    fn test_escape_and_click_outside_close() {
        let mut session = open_with(&["INFY"]);
        session.key(Key::ArrowDown);
        assert!(session.key(Key::Escape).is_none());
        assert_eq!(session.state(), SearchState::Idle);
        assert!(!session.is_focused());

        let mut session = open_with(&["INFY"]);
        session.click_outside();
        assert_eq!(session.state(), SearchState::Idle);
    }

    #[test]
    fn test_click_commits_result() {
        let mut session = open_with(&["INFY", "TCS"]);
        assert!(session.click(5).is_none());
        let commit = session.click(1).unwrap();
        assert_eq!(commit.ticker.as_str(), "TCS");
    }

    #[test]
    fn test_stale_response_discarded() {
        let start = Instant::now();
        let mut session = SearchSession::default();
        session.input("in", start);
        let first = session.poll(start + ms(300)).unwrap();
        session.input("tat", start + ms(400));
        let second = session.poll(start + ms(700)).unwrap();
        assert!(second.seq > first.seq);

        assert!(session.resolve(second.seq, Ok(suggestions(&["TATAMOTORS"]))));
        assert!(!session.resolve(first.seq, Ok(suggestions(&["INFY"]))));
        assert_eq!(session.results()[0].ticker.as_str(), "TATAMOTORS");
    }

    #[test]
    fn test_stale_response_applied_when_guard_disabled() {
        let start = Instant::now();
        let config = SearchConfig {
            discard_stale_responses: false,
            ..SearchConfig::default()
        };
        let mut session = SearchSession::new(config);
        session.input("in", start);
        let first = session.poll(start + ms(300)).unwrap();
        session.input("tat", start + ms(400));
        let second = session.poll(start + ms(700)).unwrap();

        session.resolve(second.seq, Ok(suggestions(&["TATAMOTORS"])));
        assert!(session.resolve(first.seq, Ok(suggestions(&["INFY"]))));
        assert_eq!(session.results()[0].ticker.as_str(), "INFY");
    }

    #[test]
    fn test_response_after_short_query_discarded() {
        let start = Instant::now();
        let mut session = SearchSession::default();
        session.input("AB", start);
        let request = session.poll(start + ms(300)).unwrap();
        session.input("A", start + ms(350));
        assert!(!session.resolve(request.seq, Ok(suggestions(&["ABB"]))));
        assert_eq!(session.state(), SearchState::Idle);
    }

    #[test]
    fn test_config_from_json() {
        let config: SearchConfig = serde_json::from_str(r#"{"debounce_ms": 150}"#).unwrap();
        assert_eq!(config.debounce(), ms(150));
        assert_eq!(config.min_query_len, 2);
        assert!(config.discard_stale_responses);
    }
}
