//! Polars bridge for tabular export.
//!
//! Series convert to a [`DataFrame`] with one row per period: a `period`
//! string column followed by one nullable `f64` column per line item.
//! Reading tolerates missing columns (they become absent values) and integer
//! columns (they are cast to `f64`).

use polars::prelude::*;

use crate::{
    error::{ChartError, Result},
    series::{LineItem, PeriodSeries, ShareholdingCategory, ShareholdingSeries},
};

/// Name of the period label column.
pub const PERIOD_COLUMN: &str = "period";

fn frame_err(e: PolarsError) -> ChartError {
    ChartError::Frame(e.to_string())
}

/// Builds a nullable `f64` column.
#[must_use]
pub fn option_column(name: &str, values: &[Option<f64>]) -> Column {
    Column::new(PlSmallStr::from(name), values.to_vec())
}

/// Builds the period label column.
#[must_use]
pub fn period_column(periods: &[String]) -> Column {
    Column::new(
        PlSmallStr::from(PERIOD_COLUMN),
        periods.iter().map(String::as_str).collect::<Vec<_>>(),
    )
}

fn read_periods(df: &DataFrame) -> Result<Vec<String>> {
    let column = df.column(PERIOD_COLUMN).map_err(frame_err)?;
    let labels = column.str().map_err(frame_err)?;
    Ok(labels
        .into_iter()
        .map(|label| label.unwrap_or_default().to_string())
        .collect())
}

fn read_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };
    let column = column.cast(&DataType::Float64).map_err(frame_err)?;
    let values = column.f64().map_err(frame_err)?;
    Ok(Some(values.into_iter().collect()))
}

impl PeriodSeries {
    /// Converts the series into a DataFrame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(LineItem::ALL.len() + 1);
        columns.push(period_column(&self.periods));
        for item in LineItem::ALL {
            columns.push(option_column(item.key(), self.values(item)));
        }
        DataFrame::new(columns).map_err(frame_err)
    }

    /// Reads a series from a DataFrame produced by [`PeriodSeries::to_frame`]
    /// or any frame with a `period` column and line-item columns.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut series = Self {
            periods: read_periods(df)?,
            ..Default::default()
        };
        for item in LineItem::ALL {
            if let Some(values) = read_values(df, item.key())? {
                *series.values_mut(item) = values;
            }
        }
        series.normalize();
        Ok(series)
    }
}

impl ShareholdingSeries {
    /// Converts the series into a DataFrame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(ShareholdingCategory::ALL.len() + 1);
        columns.push(period_column(&self.periods));
        for category in ShareholdingCategory::ALL {
            columns.push(option_column(category.key(), self.values(category)));
        }
        DataFrame::new(columns).map_err(frame_err)
    }

    /// Reads a series from a DataFrame with a `period` column.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut series = Self {
            periods: read_periods(df)?,
            ..Default::default()
        };
        for category in ShareholdingCategory::ALL {
            if let Some(values) = read_values(df, category.key())? {
                *series.values_mut(category) = values;
            }
        }
        series.normalize();
        Ok(series)
    }
}
