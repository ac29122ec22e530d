//! Reporting granularity definitions.
//!
//! This module defines [`Granularity`], the dashboard-wide toggle between
//! quarterly and annual series.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of the period series feeding the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Quarterly results.
    #[default]
    Quarterly,
    /// Annual profit & loss.
    Annual,
}

impl Granularity {
    /// Returns the other granularity.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Quarterly => Self::Annual,
            Self::Annual => Self::Quarterly,
        }
    }

    /// Short label used in chart titles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(Granularity::Quarterly.toggled(), Granularity::Annual);
        assert_eq!(Granularity::Annual.toggled(), Granularity::Quarterly);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Granularity::Annual).unwrap();
        assert_eq!(json, "\"annual\"");
    }
}
