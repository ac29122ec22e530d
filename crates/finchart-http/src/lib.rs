#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finchart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! HTTP client for the dashboard backend.
//!
//! # Usage
//!
//! ```rust,ignore
//! use finchart_http::ApiClient;
//! use finchart_core::{CompanyDataProvider, Ticker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://localhost:8000")?;
//!     let data = client.fetch_company(&Ticker::new("TCS"), false).await?;
//!     println!("{} quarters", data.quarterly_data.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use finchart_core::{
    ChartError, CompanyData, CompanyDataProvider, DataSource, ResearchProvider, ResearchReport,
    Result, Suggestion, SuggestionProvider, Ticker,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, instrument, warn};
use url::Url;

/// Name reported by [`DataSource::name`].
const SOURCE_NAME: &str = "Dashboard API";

/// Shortest query the search endpoint accepts.
const MIN_QUERY_LEN: usize = 2;

/// Error body sent by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Body of a cache-clear response.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Client for the dashboard backend.
///
/// Endpoints:
/// - `GET /api/company/{ticker}` - Company payload
/// - `GET /api/search?q=` - Autocomplete suggestions
/// - `GET /api/research/{ticker}` - Generated research text
/// - `DELETE /api/company/{ticker}/cache` - Drop the server's cached payload
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client with a custom HTTP client.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ChartError::InvalidParameter(format!("base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ChartError::InvalidParameter(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }
        Ok(Self { client, base_url })
    }

    /// The backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/api/{segments...}`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ChartError::InvalidParameter(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn company_url(&self, ticker: &Ticker, refresh: bool) -> Result<Url> {
        let mut url = self.endpoint(&["company", ticker.as_str()])?;
        url.query_pairs_mut()
            .append_pair("refresh", bool_param(refresh));
        Ok(url)
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn research_url(&self, ticker: &Ticker, company_name: &str, refresh: bool) -> Result<Url> {
        let mut url = self.endpoint(&["research", ticker.as_str()])?;
        url.query_pairs_mut()
            .append_pair("company_name", company_name)
            .append_pair("refresh", bool_param(refresh));
        Ok(url)
    }

    fn cache_url(&self, ticker: &Ticker) -> Result<Url> {
        self.endpoint(&["company", ticker.as_str(), "cache"])
    }

    /// Send a request and decode the JSON response.
    ///
    /// `subject` names the resource in a not-found error.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, subject: &str) -> Result<T> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let detail = extract_detail(&text);
            warn!(%status, detail = detail.as_deref().unwrap_or(""), "Backend returned an error");
            return Err(status_error(status, detail, subject));
        }

        serde_json::from_str(&text).map_err(|e| ChartError::Parse(e.to_string()))
    }

    /// Ask the backend to drop its cached payload for a ticker.
    ///
    /// Returns the backend's confirmation message.
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn clear_company_cache(&self, ticker: &Ticker) -> Result<String> {
        let url = self.cache_url(ticker)?;
        debug!(%url, "Clearing backend cache");
        let body: MessageBody = self
            .send(self.client.delete(url), ticker.as_str())
            .await?;
        Ok(body.message)
    }
}

impl DataSource for ApiClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

#[async_trait]
impl CompanyDataProvider for ApiClient {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn fetch_company(&self, ticker: &Ticker, refresh: bool) -> Result<CompanyData> {
        let url = self.company_url(ticker, refresh)?;
        debug!(%url, "Fetching company data");
        self.send(self.client.get(url), ticker.as_str()).await
    }
}

#[async_trait]
impl SuggestionProvider for ApiClient {
    #[instrument(skip(self))]
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            debug!("Query too short, skipping request");
            return Ok(Vec::new());
        }
        let url = self.search_url(query)?;
        debug!(%url, "Fetching suggestions");
        self.send(self.client.get(url), query).await
    }
}

#[async_trait]
impl ResearchProvider for ApiClient {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn fetch_research(
        &self,
        ticker: &Ticker,
        company_name: &str,
        refresh: bool,
    ) -> Result<ResearchReport> {
        let url = self.research_url(ticker, company_name, refresh)?;
        debug!(%url, "Fetching research");
        self.send(self.client.get(url), ticker.as_str()).await
    }
}

const fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn transport_error(e: reqwest::Error) -> ChartError {
    if e.is_timeout() {
        ChartError::Timeout(e.to_string())
    } else if e.is_decode() {
        ChartError::Parse(e.to_string())
    } else {
        ChartError::Network(e.to_string())
    }
}

/// Pull the `detail` message out of an error body, if there is one.
fn extract_detail(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    match body.detail? {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Map a non-success status to an error.
fn status_error(status: StatusCode, detail: Option<String>, subject: &str) -> ChartError {
    match status {
        StatusCode::NOT_FOUND => ChartError::CompanyNotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ChartError::RateLimited {
            source_name: SOURCE_NAME.to_string(),
            detail,
        },
        StatusCode::GATEWAY_TIMEOUT => {
            ChartError::Timeout(detail.unwrap_or_else(|| format!("HTTP {status}")))
        }
        _ => ChartError::Network(match detail {
            Some(detail) => format!("HTTP {status}: {detail}"),
            None => format!("HTTP {status}"),
        }),
    }
}
