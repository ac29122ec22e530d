//! Period-indexed financial series.
//!
//! - [`PeriodSeries`] - financial line items aligned to reporting periods
//! - [`LineItem`] - addresses one numeric sequence of a [`PeriodSeries`]
//! - [`ShareholdingSeries`] - shareholding percentages aligned to periods
//! - [`ShareholdingCategory`] - addresses one shareholder category
//!
//! Every numeric sequence has the same length as `periods`; index `i` always
//! refers to the same reporting period. `None` means "no value" and is kept
//! distinct from zero. Payloads from external sources are brought in line
//! with [`PeriodSeries::normalize`] before they reach the chart pipeline.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A financial line item carried by [`PeriodSeries`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    /// Revenue from operations.
    Sales,
    /// Total operating expenses.
    Expenses,
    /// Raw material / cost of materials consumed.
    MaterialCost,
    /// Operating profit.
    OperatingProfit,
    /// Operating profit margin as reported.
    OpmPercent,
    /// Other income.
    OtherIncome,
    /// Interest / finance cost.
    Interest,
    /// Depreciation and amortisation.
    Depreciation,
    /// Profit before tax.
    ProfitBeforeTax,
    /// Effective tax rate as reported.
    TaxPercent,
    /// Net profit.
    NetProfit,
    /// Earnings per share.
    Eps,
    /// Cash from operating activities.
    CashFromOperations,
    /// Cash from investing activities.
    CashFromInvesting,
    /// Cash from financing activities.
    CashFromFinancing,
    /// Net cash flow.
    NetCashFlow,
}

impl LineItem {
    /// Every line item, in payload order.
    pub const ALL: [Self; 16] = [
        Self::Sales,
        Self::Expenses,
        Self::MaterialCost,
        Self::OperatingProfit,
        Self::OpmPercent,
        Self::OtherIncome,
        Self::Interest,
        Self::Depreciation,
        Self::ProfitBeforeTax,
        Self::TaxPercent,
        Self::NetProfit,
        Self::Eps,
        Self::CashFromOperations,
        Self::CashFromInvesting,
        Self::CashFromFinancing,
        Self::NetCashFlow,
    ];

    /// Field name used in payloads and frame columns.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Expenses => "expenses",
            Self::MaterialCost => "material_cost",
            Self::OperatingProfit => "operating_profit",
            Self::OpmPercent => "opm_percent",
            Self::OtherIncome => "other_income",
            Self::Interest => "interest",
            Self::Depreciation => "depreciation",
            Self::ProfitBeforeTax => "profit_before_tax",
            Self::TaxPercent => "tax_percent",
            Self::NetProfit => "net_profit",
            Self::Eps => "eps",
            Self::CashFromOperations => "cash_from_operations",
            Self::CashFromInvesting => "cash_from_investing",
            Self::CashFromFinancing => "cash_from_financing",
            Self::NetCashFlow => "net_cash_flow",
        }
    }

    /// Human readable label used in legends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Expenses => "Expenses",
            Self::MaterialCost => "Material Cost",
            Self::OperatingProfit => "Operating Profit",
            Self::OpmPercent => "OPM %",
            Self::OtherIncome => "Other Income",
            Self::Interest => "Interest",
            Self::Depreciation => "Depreciation",
            Self::ProfitBeforeTax => "Profit Before Tax",
            Self::TaxPercent => "Tax %",
            Self::NetProfit => "Net Profit",
            Self::Eps => "EPS",
            Self::CashFromOperations => "Cash from Operations",
            Self::CashFromInvesting => "Cash from Investing",
            Self::CashFromFinancing => "Cash from Financing",
            Self::NetCashFlow => "Net Cash Flow",
        }
    }
}

/// Financial line items aligned to an ordered sequence of reporting periods.
///
/// Periods are chronological, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSeries {
    /// Period labels (e.g. "Mar 2024").
    pub periods: Vec<String>,
    /// Sales.
    pub sales: Vec<Option<f64>>,
    /// Total expenses.
    pub expenses: Vec<Option<f64>>,
    /// Material cost.
    pub material_cost: Vec<Option<f64>>,
    /// Operating profit.
    pub operating_profit: Vec<Option<f64>>,
    /// Reported operating margin.
    pub opm_percent: Vec<Option<f64>>,
    /// Other income.
    pub other_income: Vec<Option<f64>>,
    /// Interest.
    pub interest: Vec<Option<f64>>,
    /// Depreciation.
    pub depreciation: Vec<Option<f64>>,
    /// Profit before tax.
    pub profit_before_tax: Vec<Option<f64>>,
    /// Reported tax rate.
    pub tax_percent: Vec<Option<f64>>,
    /// Net profit.
    pub net_profit: Vec<Option<f64>>,
    /// Earnings per share.
    pub eps: Vec<Option<f64>>,
    /// Cash from operating activities.
    pub cash_from_operations: Vec<Option<f64>>,
    /// Cash from investing activities.
    pub cash_from_investing: Vec<Option<f64>>,
    /// Cash from financing activities.
    pub cash_from_financing: Vec<Option<f64>>,
    /// Net cash flow.
    pub net_cash_flow: Vec<Option<f64>>,
}

impl PeriodSeries {
    /// Creates a series with the given periods and every line item absent.
    #[must_use]
    pub fn with_periods<I, S>(periods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut series = Self {
            periods: periods.into_iter().map(Into::into).collect(),
            ..Default::default()
        };
        series.normalize();
        series
    }

    /// Replaces one line item, builder style.
    ///
    /// The sequence is padded or truncated to the period count.
    #[must_use]
    pub fn with(mut self, item: LineItem, values: Vec<Option<f64>>) -> Self {
        *self.values_mut(item) = values;
        self.normalize();
        self
    }

    /// Number of reporting periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if there are no reporting periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns the values of a line item.
    #[must_use]
    pub fn values(&self, item: LineItem) -> &[Option<f64>] {
        match item {
            LineItem::Sales => &self.sales,
            LineItem::Expenses => &self.expenses,
            LineItem::MaterialCost => &self.material_cost,
            LineItem::OperatingProfit => &self.operating_profit,
            LineItem::OpmPercent => &self.opm_percent,
            LineItem::OtherIncome => &self.other_income,
            LineItem::Interest => &self.interest,
            LineItem::Depreciation => &self.depreciation,
            LineItem::ProfitBeforeTax => &self.profit_before_tax,
            LineItem::TaxPercent => &self.tax_percent,
            LineItem::NetProfit => &self.net_profit,
            LineItem::Eps => &self.eps,
            LineItem::CashFromOperations => &self.cash_from_operations,
            LineItem::CashFromInvesting => &self.cash_from_investing,
            LineItem::CashFromFinancing => &self.cash_from_financing,
            LineItem::NetCashFlow => &self.net_cash_flow,
        }
    }

    pub(crate) fn values_mut(&mut self, item: LineItem) -> &mut Vec<Option<f64>> {
        match item {
            LineItem::Sales => &mut self.sales,
            LineItem::Expenses => &mut self.expenses,
            LineItem::MaterialCost => &mut self.material_cost,
            LineItem::OperatingProfit => &mut self.operating_profit,
            LineItem::OpmPercent => &mut self.opm_percent,
            LineItem::OtherIncome => &mut self.other_income,
            LineItem::Interest => &mut self.interest,
            LineItem::Depreciation => &mut self.depreciation,
            LineItem::ProfitBeforeTax => &mut self.profit_before_tax,
            LineItem::TaxPercent => &mut self.tax_percent,
            LineItem::NetProfit => &mut self.net_profit,
            LineItem::Eps => &mut self.eps,
            LineItem::CashFromOperations => &mut self.cash_from_operations,
            LineItem::CashFromInvesting => &mut self.cash_from_investing,
            LineItem::CashFromFinancing => &mut self.cash_from_financing,
            LineItem::NetCashFlow => &mut self.net_cash_flow,
        }
    }

    /// Value of a line item at a period index, if present.
    #[must_use]
    pub fn value(&self, item: LineItem, index: usize) -> Option<f64> {
        self.values(item).get(index).copied().flatten()
    }

    /// Returns true if every line item has exactly one entry per period.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        let n = self.periods.len();
        LineItem::ALL.iter().all(|item| self.values(*item).len() == n)
    }

    /// Pads or truncates every line item to the period count.
    ///
    /// Returns the number of sequences that had to be repaired. Empty
    /// sequences (a row missing from the source table) are padded silently.
    pub fn normalize(&mut self) -> usize {
        let n = self.periods.len();
        let mut repaired = 0;
        for item in LineItem::ALL {
            let values = self.values_mut(item);
            if values.len() == n {
                continue;
            }
            if !values.is_empty() {
                warn!(
                    item = item.key(),
                    expected = n,
                    actual = values.len(),
                    "Line item misaligned with periods"
                );
                repaired += 1;
            }
            values.resize(n, None);
        }
        repaired
    }
}

/// A shareholder category carried by [`ShareholdingSeries`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareholdingCategory {
    /// Promoters and promoter group.
    Promoters,
    /// Foreign institutional investors.
    Fiis,
    /// Domestic institutional investors.
    Diis,
    /// Government.
    Government,
    /// Public.
    Public,
}

impl ShareholdingCategory {
    /// Every category, in legend order.
    pub const ALL: [Self; 5] = [
        Self::Promoters,
        Self::Fiis,
        Self::Diis,
        Self::Government,
        Self::Public,
    ];

    /// Field name used in payloads and frame columns.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Promoters => "promoters",
            Self::Fiis => "fiis",
            Self::Diis => "diis",
            Self::Government => "government",
            Self::Public => "public",
        }
    }

    /// Human readable label used in legends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Promoters => "Promoters",
            Self::Fiis => "FIIs",
            Self::Diis => "DIIs",
            Self::Government => "Government",
            Self::Public => "Public",
        }
    }
}

/// Shareholding percentages aligned to reporting periods.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareholdingSeries {
    /// Period labels, oldest first.
    pub periods: Vec<String>,
    /// Promoter holding %.
    pub promoters: Vec<Option<f64>>,
    /// FII holding %.
    pub fiis: Vec<Option<f64>>,
    /// DII holding %.
    pub diis: Vec<Option<f64>>,
    /// Government holding %.
    pub government: Vec<Option<f64>>,
    /// Public holding %.
    pub public: Vec<Option<f64>>,
}

impl ShareholdingSeries {
    /// Creates a series with the given periods and every category absent.
    #[must_use]
    pub fn with_periods<I, S>(periods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut series = Self {
            periods: periods.into_iter().map(Into::into).collect(),
            ..Default::default()
        };
        series.normalize();
        series
    }

    /// Replaces one category, builder style.
    #[must_use]
    pub fn with(mut self, category: ShareholdingCategory, values: Vec<Option<f64>>) -> Self {
        *self.values_mut(category) = values;
        self.normalize();
        self
    }

    /// Number of reporting periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if there are no reporting periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns the values of a category.
    #[must_use]
    pub fn values(&self, category: ShareholdingCategory) -> &[Option<f64>] {
        match category {
            ShareholdingCategory::Promoters => &self.promoters,
            ShareholdingCategory::Fiis => &self.fiis,
            ShareholdingCategory::Diis => &self.diis,
            ShareholdingCategory::Government => &self.government,
            ShareholdingCategory::Public => &self.public,
        }
    }

    pub(crate) fn values_mut(&mut self, category: ShareholdingCategory) -> &mut Vec<Option<f64>> {
        match category {
            ShareholdingCategory::Promoters => &mut self.promoters,
            ShareholdingCategory::Fiis => &mut self.fiis,
            ShareholdingCategory::Diis => &mut self.diis,
            ShareholdingCategory::Government => &mut self.government,
            ShareholdingCategory::Public => &mut self.public,
        }
    }

    /// Pads or truncates every category to the period count.
    pub fn normalize(&mut self) -> usize {
        let n = self.periods.len();
        let mut repaired = 0;
        for category in ShareholdingCategory::ALL {
            let values = self.values_mut(category);
            if values.len() == n {
                continue;
            }
            if !values.is_empty() {
                warn!(
                    category = category.key(),
                    expected = n,
                    actual = values.len(),
                    "Shareholding category misaligned with periods"
                );
                repaired += 1;
            }
            values.resize(n, None);
        }
        repaired
    }
}
