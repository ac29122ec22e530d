//! Company-level data types.
//!
//! - [`Ticker`] - Exchange ticker
//! - [`CompanyInfo`] - Company header: name, price, key ratios
//! - [`CompanyData`] - Full company payload consumed by the dashboard
//! - [`Suggestion`] - One autocomplete result
//! - [`ResearchReport`] - Generated research text for a company

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::granularity::Granularity;
use crate::series::{PeriodSeries, ShareholdingSeries};

/// An exchange ticker.
///
/// Tickers are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker, trimming whitespace and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ticker is empty after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticker {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Company header information and key ratios.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Company name.
    pub name: String,
    /// Exchange ticker.
    pub ticker: Ticker,
    /// Last traded price.
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Price change since previous close, in percent.
    #[serde(default)]
    pub price_change_percent: Option<f64>,
    /// Market capitalisation as displayed by the source.
    #[serde(default)]
    pub market_cap: Option<String>,
    /// Price-to-earnings ratio.
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// Book value per share.
    #[serde(default)]
    pub book_value: Option<f64>,
    /// Dividend yield in percent.
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    /// Return on capital employed in percent.
    #[serde(default)]
    pub roce: Option<f64>,
    /// Return on equity in percent.
    #[serde(default)]
    pub roe: Option<f64>,
    /// BSE scrip code.
    #[serde(default)]
    pub bse_code: Option<String>,
    /// NSE symbol.
    #[serde(default)]
    pub nse_code: Option<String>,
    /// Business sector.
    #[serde(default)]
    pub sector: Option<String>,
    /// Industry within the sector.
    #[serde(default)]
    pub industry: Option<String>,
}

impl CompanyInfo {
    /// Creates company info with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, ticker: impl Into<Ticker>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            ..Default::default()
        }
    }
}

/// Complete company payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyData {
    /// Header information.
    pub company_info: CompanyInfo,
    /// Quarterly results.
    #[serde(default)]
    pub quarterly_data: PeriodSeries,
    /// Annual profit & loss, including cash flow.
    #[serde(default)]
    pub annual_data: PeriodSeries,
    /// Quarterly shareholding pattern.
    #[serde(default)]
    pub shareholding_quarterly: Option<ShareholdingSeries>,
    /// Yearly shareholding pattern.
    #[serde(default)]
    pub shareholding_yearly: Option<ShareholdingSeries>,
    /// When the payload was cached by the source.
    #[serde(default)]
    pub cached_at: Option<NaiveDateTime>,
    /// When the source's cached copy expires.
    #[serde(default)]
    pub cache_expires_at: Option<NaiveDateTime>,
}

impl CompanyData {
    /// Creates a payload with header information and empty series.
    #[must_use]
    pub fn new(company_info: CompanyInfo) -> Self {
        Self {
            company_info,
            ..Default::default()
        }
    }

    /// The company's ticker.
    #[must_use]
    pub fn ticker(&self) -> &Ticker {
        &self.company_info.ticker
    }

    /// The financial series for a granularity.
    #[must_use]
    pub fn series(&self, granularity: Granularity) -> &PeriodSeries {
        match granularity {
            Granularity::Quarterly => &self.quarterly_data,
            Granularity::Annual => &self.annual_data,
        }
    }

    /// The shareholding series for a granularity, if the source supplied one.
    #[must_use]
    pub fn shareholding(&self, granularity: Granularity) -> Option<&ShareholdingSeries> {
        match granularity {
            Granularity::Quarterly => self.shareholding_quarterly.as_ref(),
            Granularity::Annual => self.shareholding_yearly.as_ref(),
        }
    }

    /// Brings every series in line with its period labels.
    ///
    /// Returns the number of repaired sequences.
    pub fn normalize(&mut self) -> usize {
        let mut repaired = self.quarterly_data.normalize() + self.annual_data.normalize();
        if let Some(holding) = self.shareholding_quarterly.as_mut() {
            repaired += holding.normalize();
        }
        if let Some(holding) = self.shareholding_yearly.as_mut() {
            repaired += holding.normalize();
        }
        repaired
    }
}

/// One autocomplete result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Source identifier.
    #[serde(default)]
    pub id: Option<u64>,
    /// Company name.
    pub name: String,
    /// Exchange ticker.
    pub ticker: Ticker,
    /// Source page path.
    #[serde(default)]
    pub url: Option<String>,
}

impl Suggestion {
    /// Creates a suggestion from a name and ticker.
    #[must_use]
    pub fn new(name: impl Into<String>, ticker: impl Into<Ticker>) -> Self {
        Self {
            id: None,
            name: name.into(),
            ticker: ticker.into(),
            url: None,
        }
    }
}

/// Generated research analysis for a company.
///
/// `analysis` is markdown and is passed through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Exchange ticker.
    pub ticker: Ticker,
    /// Company name the analysis was generated for.
    pub company_name: String,
    /// Markdown analysis text.
    pub analysis: String,
    /// When the analysis was generated.
    #[serde(default)]
    pub generated_at: Option<NaiveDateTime>,
    /// When the source's cached copy expires.
    #[serde(default)]
    pub cache_expires_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalization() {
        assert_eq!(Ticker::new("  reliance ").as_str(), "RELIANCE");
        assert!(Ticker::new("   ").is_empty());
        let parsed: Ticker = "tcs".parse().unwrap();
        assert_eq!(parsed.to_string(), "TCS");
    }

    #[test]
    fn test_ticker_deserialize_uppercases() {
        let ticker: Ticker = serde_json::from_str("\"infy\"").unwrap();
        assert_eq!(ticker, Ticker::new("INFY"));
        assert_eq!(serde_json::to_string(&ticker).unwrap(), "\"INFY\"");
    }

    #[test]
    fn test_company_payload_deserialize() {
        let json = r#"{
            "company_info": {"name": "Tata Consultancy Services", "ticker": "TCS", "current_price": 3900.5},
            "quarterly_data": {"periods": ["Jun 2024"], "sales": [62613.0]},
            "annual_data": {"periods": ["Mar 2024"], "sales": [240893.0], "cash_from_operations": [44338.0]},
            "shareholding_quarterly": {"periods": ["Jun 2024"], "promoters": [71.77]},
            "cached_at": "2024-07-12T10:15:30.123456"
        }"#;
        let mut data: CompanyData = serde_json::from_str(json).unwrap();
        data.normalize();

        assert_eq!(data.ticker().as_str(), "TCS");
        assert_eq!(data.series(Granularity::Annual).cash_from_operations, vec![Some(44338.0)]);
        assert_eq!(data.series(Granularity::Quarterly).eps, vec![None]);
        assert!(data.shareholding(Granularity::Quarterly).is_some());
        assert!(data.shareholding(Granularity::Annual).is_none());
        assert!(data.cached_at.is_some());
    }

    #[test]
    fn test_suggestion_deserialize() {
        let json = r#"{"id": 7, "name": "Infosys Ltd", "ticker": "INFY", "url": "/company/INFY/"}"#;
        let suggestion: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(suggestion.id, Some(7));
        assert_eq!(suggestion.ticker.as_str(), "INFY");
    }
}
