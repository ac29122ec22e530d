//! Page location state.
//!
//! The dashboard records the loaded ticker in its location so a reload or a
//! shared link restores the same company.

use finchart_core::{ChartError, Result, Ticker};
use url::Url;

/// Query parameter holding the ticker.
pub const TICKER_PARAM: &str = "ticker";

/// Where the dashboard reads and writes its shareable state.
pub trait Location: Send {
    /// The ticker recorded in the location, if any.
    fn ticker(&self) -> Option<Ticker>;

    /// Records a ticker, replacing any previous one.
    fn set_ticker(&mut self, ticker: &Ticker);
}

/// A location backed by a URL query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlLocation {
    url: Url,
}

impl UrlLocation {
    /// Wraps a URL.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parses a URL string.
    pub fn parse(input: &str) -> Result<Self> {
        Url::parse(input)
            .map(Self::new)
            .map_err(|e| ChartError::InvalidParameter(format!("location {input}: {e}")))
    }

    /// The current URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl Location for UrlLocation {
    fn ticker(&self) -> Option<Ticker> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == TICKER_PARAM)
            .map(|(_, value)| Ticker::new(value.into_owned()))
            .filter(|ticker| !ticker.is_empty())
    }

    fn set_ticker(&mut self, ticker: &Ticker) {
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != TICKER_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        self.url
            .query_pairs_mut()
            .clear()
            .extend_pairs(others)
            .append_pair(TICKER_PARAM, ticker.as_str());
    }
}
