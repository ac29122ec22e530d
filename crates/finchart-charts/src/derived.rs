//! Derived metric calculator.
//!
//! Turns raw line items into ratios and breakdown amounts, period by period.
//! Ratio metrics (`Option<f64>`) are absent whenever an input is absent or
//! sales are zero, so they plot as gaps. Breakdown amounts (`f64`) fall back
//! to zero and are clamped non-negative so a stacked bar stays contiguous.

use finchart_core::{ChartError, LineItem, PeriodSeries, Result, frame};
use polars::prelude::DataFrame;

/// Ratios and breakdown amounts computed from one [`PeriodSeries`].
///
/// Built fresh for every render pass and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedSeries {
    /// (sales - material cost) / sales, in percent.
    pub gross_margin: Vec<Option<f64>>,
    /// Operating profit / sales, in percent.
    pub operating_margin: Vec<Option<f64>>,
    /// Net profit / sales, in percent.
    pub net_margin: Vec<Option<f64>>,
    /// max(0, profit before tax - net profit); 0 when unknown.
    pub tax: Vec<f64>,
    /// max(0, expenses - material cost); 0 when expenses are unknown.
    pub other_operating_expenses: Vec<f64>,
}

impl DerivedSeries {
    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tax.len()
    }

    /// Returns true if there are no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tax.is_empty()
    }

    /// Converts the derived metrics into a DataFrame keyed by `periods`.
    pub fn to_frame(&self, periods: &[String]) -> Result<DataFrame> {
        let tax: Vec<Option<f64>> = self.tax.iter().copied().map(Some).collect();
        let other: Vec<Option<f64>> = self
            .other_operating_expenses
            .iter()
            .copied()
            .map(Some)
            .collect();
        DataFrame::new(vec![
            frame::period_column(periods),
            frame::option_column("gross_margin", &self.gross_margin),
            frame::option_column("operating_margin", &self.operating_margin),
            frame::option_column("net_margin", &self.net_margin),
            frame::option_column("tax", &tax),
            frame::option_column("other_operating_expenses", &other),
        ])
        .map_err(|e| ChartError::Frame(e.to_string()))
    }
}

/// `value / sales * 100`, absent unless both are present and sales are non-zero.
#[must_use]
pub fn percent_of(value: Option<f64>, sales: Option<f64>) -> Option<f64> {
    let sales = sales?;
    if sales == 0.0 {
        return None;
    }
    let percent = value? / sales * 100.0;
    percent.is_finite().then_some(percent)
}

/// Gross margin for one period.
#[must_use]
pub fn gross_margin(sales: Option<f64>, material_cost: Option<f64>) -> Option<f64> {
    let sales_value = sales?;
    let material_cost = material_cost?;
    percent_of(Some(sales_value - material_cost), sales)
}

/// Tax amount for one period.
#[must_use]
pub fn tax_amount(profit_before_tax: Option<f64>, net_profit: Option<f64>) -> f64 {
    match (profit_before_tax, net_profit) {
        (Some(pbt), Some(net)) => (pbt - net).max(0.0),
        _ => 0.0,
    }
}

/// Operating expenses other than material cost for one period.
///
/// A missing material cost counts as zero.
#[must_use]
pub fn other_operating_expenses(expenses: Option<f64>, material_cost: Option<f64>) -> f64 {
    expenses.map_or(0.0, |expenses| {
        (expenses - material_cost.unwrap_or(0.0)).max(0.0)
    })
}

/// Computes every derived metric for every period of `series`.
#[must_use]
pub fn derive(series: &PeriodSeries) -> DerivedSeries {
    let n = series.len();
    let mut derived = DerivedSeries {
        gross_margin: Vec::with_capacity(n),
        operating_margin: Vec::with_capacity(n),
        net_margin: Vec::with_capacity(n),
        tax: Vec::with_capacity(n),
        other_operating_expenses: Vec::with_capacity(n),
    };

    for i in 0..n {
        let sales = series.value(LineItem::Sales, i);
        let material = series.value(LineItem::MaterialCost, i);
        let net = series.value(LineItem::NetProfit, i);

        derived.gross_margin.push(gross_margin(sales, material));
        derived
            .operating_margin
            .push(percent_of(series.value(LineItem::OperatingProfit, i), sales));
        derived.net_margin.push(percent_of(net, sales));
        derived
            .tax
            .push(tax_amount(series.value(LineItem::ProfitBeforeTax, i), net));
        derived.other_operating_expenses.push(other_operating_expenses(
            series.value(LineItem::Expenses, i),
            material,
        ));
    }

    derived
}
