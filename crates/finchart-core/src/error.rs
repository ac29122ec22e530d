//! Error types for dashboard operations.
//!
//! This module defines [`ChartError`] which covers every failure that can occur
//! while fetching company data, talking to the plotting collaborator, or
//! converting series into frames. Absent values and empty charts are not
//! errors; they are modelled as `Option` and `ChartState::Empty` respectively.

use thiserror::Error;

/// Errors that can occur during dashboard operations.
#[derive(Error, Debug)]
pub enum ChartError {
    /// Network-related errors (connection failures, unexpected statuses, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Rate limit exceeded by the data source.
    #[error("Rate limited by {source_name}")]
    RateLimited {
        /// The data source that rate limited the request.
        source_name: String,
        /// Server supplied detail, if any.
        detail: Option<String>,
    },

    /// The requested company was not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// Error decoding a payload from the data source.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The chart container does not exist on the host surface.
    #[error("Chart container missing: {0}")]
    ContainerMissing(String),

    /// The plotting collaborator rejected a request.
    #[error("Render error: {0}")]
    Render(String),

    /// Error building or reading a DataFrame.
    #[error("Frame error: {0}")]
    Frame(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A newer request was dispatched before this one resolved.
    #[error("Request {seq} superseded by {latest}")]
    Superseded {
        /// Sequence number of the discarded request.
        seq: u64,
        /// Sequence number of the latest dispatched request.
        latest: u64,
    },

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl ChartError {
    /// Returns true if this error came from an external fetch and should be
    /// surfaced to the user.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Timeout(_)
                | Self::RateLimited { .. }
                | Self::CompanyNotFound(_)
                | Self::Parse(_)
        )
    }

    /// Message suitable for a user-visible error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CompanyNotFound(ticker) => {
                format!("Company '{ticker}' not found. Please check the ticker symbol.")
            }
            Self::RateLimited {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::RateLimited { detail: None, .. } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::Timeout(_) => "Request timed out. Please try again.".to_string(),
            Self::Network(_) => "Network error. Please check your connection.".to_string(),
            Self::Parse(_) => {
                "Failed to parse financial data. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias using [`ChartError`].
pub type Result<T> = std::result::Result<T, ChartError>;
