//! Trace assembly.
//!
//! Decides which series each chart shows and builds their traces. A chart's
//! primary series is always drawn; if it has no present value the whole
//! chart is empty. Optional series are drawn only if at least one period
//! has a value (strictly positive for stacked breakdown amounts), so the
//! legend never lists a flat or blank series. Series order within a chart is
//! fixed and does not depend on which optional series survive.

use finchart_core::{LineItem, PeriodSeries, ShareholdingCategory, ShareholdingSeries};

use crate::derived::{DerivedSeries, percent_of};
use crate::format::format_number;
use crate::spec::{ChartKind, SeriesRole, Trace};
use crate::theme::ChartTheme;

/// Expense breakdown components, top of the stack to bottom.
pub const BREAKDOWN_STACK: [SeriesRole; 6] = [
    SeriesRole::MaterialCost,
    SeriesRole::OtherOperatingExpenses,
    SeriesRole::Depreciation,
    SeriesRole::Interest,
    SeriesRole::Tax,
    SeriesRole::NetProfit,
];

/// Inputs to trace assembly for one render pass.
#[derive(Clone, Copy, Debug)]
pub struct TraceInputs<'a> {
    /// Series at the dashboard granularity.
    pub series: &'a PeriodSeries,
    /// Metrics derived from `series`.
    pub derived: &'a DerivedSeries,
    /// Annual series, used by the cash flow chart.
    pub annual: &'a PeriodSeries,
    /// Shareholding pattern at the dashboard granularity.
    pub shareholding: Option<&'a ShareholdingSeries>,
}

impl TraceInputs<'_> {
    /// Number of periods plotted by `kind`.
    #[must_use]
    pub fn period_count(&self, kind: ChartKind) -> usize {
        match kind {
            ChartKind::CashFlow => self.annual.len(),
            ChartKind::Shareholding => self.shareholding.map_or(0, ShareholdingSeries::len),
            _ => self.series.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Inclusion {
    Primary,
    AnyPresent,
    AnyPositive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hover {
    Amount { share_of_sales: bool },
    Percent,
    PerShare,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Bars,
    Lines,
}

struct Candidate {
    role: SeriesRole,
    /// Plotted values.
    values: Vec<Option<f64>>,
    /// Values shown on hover. Differs from `values` only for stacked amounts.
    raw: Vec<Option<f64>>,
    inclusion: Inclusion,
    hover: Hover,
}

impl Candidate {
    fn new(role: SeriesRole, values: &[Option<f64>], inclusion: Inclusion, hover: Hover) -> Self {
        Self {
            role,
            values: values.to_vec(),
            raw: values.to_vec(),
            inclusion,
            hover,
        }
    }

    /// A stacked amount: plotted as `max(0, v)` with absent as 0, hovered as-is.
    fn breakdown(role: SeriesRole, raw: Vec<Option<f64>>) -> Self {
        Self {
            role,
            values: raw
                .iter()
                .map(|v| Some(v.unwrap_or(0.0).max(0.0)))
                .collect(),
            raw,
            inclusion: Inclusion::AnyPositive,
            hover: Hover::Amount {
                share_of_sales: true,
            },
        }
    }

    fn has_present(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    fn has_positive(&self) -> bool {
        self.values.iter().flatten().any(|v| *v > 0.0)
    }

    fn included(&self) -> bool {
        match self.inclusion {
            Inclusion::Primary | Inclusion::AnyPresent => self.has_present(),
            Inclusion::AnyPositive => self.has_positive(),
        }
    }
}

/// Builds the traces of `kind`, or `None` if the chart has no usable data.
#[must_use]
pub fn assemble(kind: ChartKind, inputs: &TraceInputs<'_>, theme: &ChartTheme) -> Option<Vec<Trace>> {
    match kind {
        ChartKind::Revenue => revenue(inputs.series, theme),
        ChartKind::ProfitComparison => profit_comparison(inputs.series, theme),
        ChartKind::Margins => margins(inputs.series, inputs.derived, theme),
        ChartKind::Eps => eps(inputs.series, theme),
        ChartKind::ExpenseBreakdown => expense_breakdown(inputs.series, inputs.derived, theme),
        ChartKind::CashFlow => cash_flow(inputs.annual, theme),
        ChartKind::Shareholding => shareholding(inputs.shareholding?, theme),
    }
}

fn revenue(series: &PeriodSeries, theme: &ChartTheme) -> Option<Vec<Trace>> {
    let amount = Hover::Amount {
        share_of_sales: true,
    };
    let candidates = vec![
        Candidate::new(
            SeriesRole::Sales,
            series.values(LineItem::Sales),
            Inclusion::Primary,
            Hover::Amount {
                share_of_sales: false,
            },
        ),
        Candidate::new(
            SeriesRole::Expenses,
            series.values(LineItem::Expenses),
            Inclusion::AnyPresent,
            amount,
        ),
        Candidate::new(
            SeriesRole::OperatingProfit,
            series.values(LineItem::OperatingProfit),
            Inclusion::AnyPresent,
            amount,
        ),
    ];
    build(&series.periods, &series.sales, candidates, Style::Bars, theme)
}

fn profit_comparison(series: &PeriodSeries, theme: &ChartTheme) -> Option<Vec<Trace>> {
    let amount = Hover::Amount {
        share_of_sales: true,
    };
    let candidates = vec![
        Candidate::new(
            SeriesRole::OperatingProfit,
            series.values(LineItem::OperatingProfit),
            Inclusion::AnyPresent,
            amount,
        ),
        Candidate::new(
            SeriesRole::ProfitBeforeTax,
            series.values(LineItem::ProfitBeforeTax),
            Inclusion::AnyPresent,
            amount,
        ),
        Candidate::new(
            SeriesRole::NetProfit,
            series.values(LineItem::NetProfit),
            Inclusion::Primary,
            amount,
        ),
    ];
    build(&series.periods, &series.sales, candidates, Style::Bars, theme)
}

fn margins(series: &PeriodSeries, derived: &DerivedSeries, theme: &ChartTheme) -> Option<Vec<Trace>> {
    let candidates = vec![
        Candidate::new(
            SeriesRole::GrossMargin,
            &derived.gross_margin,
            Inclusion::AnyPresent,
            Hover::Percent,
        ),
        Candidate::new(
            SeriesRole::OperatingMargin,
            &derived.operating_margin,
            Inclusion::AnyPresent,
            Hover::Percent,
        ),
        Candidate::new(
            SeriesRole::NetMargin,
            &derived.net_margin,
            Inclusion::Primary,
            Hover::Percent,
        ),
    ];
    build(&series.periods, &series.sales, candidates, Style::Lines, theme)
}

fn eps(series: &PeriodSeries, theme: &ChartTheme) -> Option<Vec<Trace>> {
    let candidates = vec![Candidate::new(
        SeriesRole::Eps,
        series.values(LineItem::Eps),
        Inclusion::Primary,
        Hover::PerShare,
    )];
    build(&series.periods, &series.sales, candidates, Style::Bars, theme)
}

fn expense_breakdown(
    series: &PeriodSeries,
    derived: &DerivedSeries,
    theme: &ChartTheme,
) -> Option<Vec<Trace>> {
    // The stack partitions sales, so a chart without any sales has nothing to show.
    if !series.sales.iter().any(Option::is_some) {
        return None;
    }
    let amounts = |item: LineItem| series.values(item).to_vec();
    let derived_amounts =
        |values: &[f64]| -> Vec<Option<f64>> { values.iter().copied().map(Some).collect() };

    let mut candidates: Vec<Candidate> = BREAKDOWN_STACK
        .iter()
        .map(|role| match role {
            SeriesRole::MaterialCost => Candidate::breakdown(*role, amounts(LineItem::MaterialCost)),
            SeriesRole::OtherOperatingExpenses => {
                Candidate::breakdown(*role, derived_amounts(&derived.other_operating_expenses))
            }
            SeriesRole::Depreciation => Candidate::breakdown(*role, amounts(LineItem::Depreciation)),
            SeriesRole::Interest => Candidate::breakdown(*role, amounts(LineItem::Interest)),
            SeriesRole::Tax => Candidate::breakdown(*role, derived_amounts(&derived.tax)),
            _ => Candidate::breakdown(*role, amounts(LineItem::NetProfit)),
        })
        .collect();
    // Stacked bars draw the first trace at the bottom.
    candidates.reverse();

    let traces = build(&series.periods, &series.sales, candidates, Style::Bars, theme)?;
    if traces.is_empty() { None } else { Some(traces) }
}

fn cash_flow(annual: &PeriodSeries, theme: &ChartTheme) -> Option<Vec<Trace>> {
    let amount = Hover::Amount {
        share_of_sales: false,
    };
    let candidates = vec![
        Candidate::new(
            SeriesRole::CashFromOperations,
            annual.values(LineItem::CashFromOperations),
            Inclusion::Primary,
            amount,
        ),
        Candidate::new(
            SeriesRole::CashFromInvesting,
            annual.values(LineItem::CashFromInvesting),
            Inclusion::AnyPresent,
            amount,
        ),
        Candidate::new(
            SeriesRole::CashFromFinancing,
            annual.values(LineItem::CashFromFinancing),
            Inclusion::AnyPresent,
            amount,
        ),
        Candidate::new(
            SeriesRole::NetCashFlow,
            annual.values(LineItem::NetCashFlow),
            Inclusion::AnyPresent,
            amount,
        ),
    ];
    build(&annual.periods, &annual.sales, candidates, Style::Bars, theme)
}

fn shareholding(holding: &ShareholdingSeries, theme: &ChartTheme) -> Option<Vec<Trace>> {
    let candidates = ShareholdingCategory::ALL
        .iter()
        .map(|category| {
            let (role, inclusion) = match category {
                ShareholdingCategory::Promoters => (SeriesRole::Promoters, Inclusion::Primary),
                ShareholdingCategory::Fiis => (SeriesRole::Fiis, Inclusion::AnyPresent),
                ShareholdingCategory::Diis => (SeriesRole::Diis, Inclusion::AnyPresent),
                ShareholdingCategory::Government => (SeriesRole::Government, Inclusion::AnyPresent),
                ShareholdingCategory::Public => (SeriesRole::Public, Inclusion::AnyPresent),
            };
            Candidate::new(role, holding.values(*category), inclusion, Hover::Percent)
        })
        .collect();
    build(&holding.periods, &[], candidates, Style::Lines, theme)
}

fn build(
    periods: &[String],
    sales: &[Option<f64>],
    candidates: Vec<Candidate>,
    style: Style,
    theme: &ChartTheme,
) -> Option<Vec<Trace>> {
    if periods.is_empty() {
        return None;
    }
    if candidates
        .iter()
        .any(|c| c.inclusion == Inclusion::Primary && !c.has_present())
    {
        return None;
    }

    let traces = candidates
        .into_iter()
        .filter(Candidate::included)
        .map(|candidate| {
            let text = hover_text(periods, sales, &candidate, theme);
            let color = theme.color(candidate.role.slot());
            let x = periods.to_vec();
            match style {
                Style::Bars => Trace::bar(candidate.role, color, x, candidate.values, text),
                Style::Lines => Trace::line(candidate.role, color, x, candidate.values, text),
            }
        })
        .collect();
    Some(traces)
}

fn hover_text(
    periods: &[String],
    sales: &[Option<f64>],
    candidate: &Candidate,
    theme: &ChartTheme,
) -> Vec<String> {
    let label = candidate.role.label();
    periods
        .iter()
        .enumerate()
        .map(|(i, period)| {
            let value = candidate.raw.get(i).copied().flatten();
            let Some(value) = value else {
                return format!("{period}<br>{label}: n/a");
            };
            match candidate.hover {
                Hover::Amount { share_of_sales } => {
                    let decimals = if value.abs() >= 100.0 { 0 } else { 2 };
                    let mut text = format!(
                        "{period}<br>{label}: {}{}{}",
                        theme.currency_prefix,
                        format_number(value, decimals, theme.grouping),
                        theme.amount_suffix
                    );
                    let share = share_of_sales
                        .then(|| percent_of(Some(value), sales.get(i).copied().flatten()))
                        .flatten();
                    if let Some(share) = share {
                        text.push_str(&format!(" ({share:.1}% of sales)"));
                    }
                    text
                }
                Hover::Percent => format!("{period}<br>{label}: {value:.1}%"),
                Hover::PerShare => format!(
                    "{period}<br>{label}: {}{}",
                    theme.currency_prefix,
                    format_number(value, 2, theme.grouping)
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::derive;

    fn sample() -> PeriodSeries {
        PeriodSeries::with_periods(["Jun 2024", "Sep 2024", "Dec 2024"])
            .with(LineItem::Sales, vec![Some(1000.0), Some(0.0), Some(1200.0)])
            .with(LineItem::Expenses, vec![Some(800.0), Some(90.0), Some(950.0)])
            .with(LineItem::MaterialCost, vec![Some(500.0), Some(60.0), None])
            .with(LineItem::OperatingProfit, vec![Some(200.0), Some(-90.0), Some(250.0)])
            .with(LineItem::Depreciation, vec![Some(0.0), None, Some(0.0)])
            .with(LineItem::Interest, vec![None, Some(0.0), Some(15.0)])
            .with(LineItem::ProfitBeforeTax, vec![Some(180.0), Some(-100.0), Some(230.0)])
            .with(LineItem::NetProfit, vec![Some(135.0), Some(-100.0), Some(172.5)])
            .with(LineItem::Eps, vec![Some(4.5), Some(-3.3), Some(5.75)])
    }

    fn traces(kind: ChartKind, series: &PeriodSeries) -> Option<Vec<Trace>> {
        let derived = derive(series);
        let inputs = TraceInputs {
            series,
            derived: &derived,
            annual: series,
            shareholding: None,
        };
        assemble(kind, &inputs, &ChartTheme::light())
    }

    fn names(traces: &[Trace]) -> Vec<&str> {
        traces.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_revenue_includes_present_optionals() {
        let traces = traces(ChartKind::Revenue, &sample()).unwrap();
        assert_eq!(names(&traces), vec!["Sales", "Expenses", "Operating Profit"]);
        assert_eq!(traces[0].x.len(), 3);
        assert_eq!(traces[0].y[1], Some(0.0));
    }

    #[test]
    fn test_revenue_without_expenses_drops_series() {
        let series = PeriodSeries::with_periods(["Q1", "Q2"])
            .with(LineItem::Sales, vec![Some(10.0), None]);
        let traces = traces(ChartKind::Revenue, &series).unwrap();
        assert_eq!(names(&traces), vec!["Sales"]);
    }

    #[test]
    fn test_primary_without_values_empties_chart() {
        let series = PeriodSeries::with_periods(["Q1", "Q2"])
            .with(LineItem::Expenses, vec![Some(10.0), Some(12.0)]);
        assert!(traces(ChartKind::Revenue, &series).is_none());
        assert!(traces(ChartKind::Eps, &series).is_none());
        assert!(traces(ChartKind::ProfitComparison, &series).is_none());
    }

    #[test]
    fn test_breakdown_order_and_exclusion() {
        let traces = traces(ChartKind::ExpenseBreakdown, &sample()).unwrap();
        // Depreciation is zero or absent in every period.
        assert_eq!(
            names(&traces),
            vec![
                "Net Profit",
                "Tax",
                "Interest",
                "Other Operating Expenses",
                "Material Cost"
            ]
        );
        let net = traces.iter().find(|t| t.role == SeriesRole::NetProfit).unwrap();
        assert_eq!(net.y, vec![Some(135.0), Some(0.0), Some(172.5)]);
        let tax = traces.iter().find(|t| t.role == SeriesRole::Tax).unwrap();
        assert_eq!(tax.y, vec![Some(45.0), Some(0.0), Some(57.5)]);
    }

    #[test]
    fn test_breakdown_hover_shows_unclamped_values() {
        let series = PeriodSeries::with_periods(["Q1", "Q2"])
            .with(LineItem::Sales, vec![Some(1000.0), Some(1000.0)])
            .with(LineItem::MaterialCost, vec![Some(600.0), None])
            .with(LineItem::NetProfit, vec![Some(-50.0), Some(100.0)]);
        let traces = traces(ChartKind::ExpenseBreakdown, &series).unwrap();

        let net = traces.iter().find(|t| t.role == SeriesRole::NetProfit).unwrap();
        assert_eq!(net.y, vec![Some(0.0), Some(100.0)]);
        assert_eq!(net.text[0], "Q1<br>Net Profit: ₹-50.00 Cr (-5.0% of sales)");
        assert_eq!(net.text[1], "Q2<br>Net Profit: ₹100 Cr (10.0% of sales)");

        let material = traces
            .iter()
            .find(|t| t.role == SeriesRole::MaterialCost)
            .unwrap();
        assert_eq!(material.y, vec![Some(600.0), Some(0.0)]);
        assert_eq!(material.text[1], "Q2<br>Material Cost: n/a");
    }

    #[test]
    fn test_breakdown_never_includes_flat_series() {
        let series = sample();
        let traces = traces(ChartKind::ExpenseBreakdown, &series).unwrap();
        for trace in &traces {
            assert!(
                trace.y.iter().flatten().any(|v| *v > 0.0),
                "{} is flat",
                trace.name
            );
        }
    }

    #[test]
    fn test_breakdown_requires_sales() {
        let series = sample().with(LineItem::Sales, vec![None, None, None]);
        assert!(traces(ChartKind::ExpenseBreakdown, &series).is_none());
    }

    #[test]
    fn test_margins_gaps() {
        let traces = traces(ChartKind::Margins, &sample()).unwrap();
        assert_eq!(
            names(&traces),
            vec!["Gross Margin %", "Operating Margin %", "Net Margin %"]
        );
        let gross = &traces[0];
        assert_eq!(gross.y, vec![Some(50.0), None, None]);
        assert_eq!(gross.text[1], "Sep 2024<br>Gross Margin %: n/a");
    }

    #[test]
    fn test_hover_text_share_of_sales() {
        let traces = traces(ChartKind::ProfitComparison, &sample()).unwrap();
        let net = traces.iter().find(|t| t.role == SeriesRole::NetProfit).unwrap();
        assert_eq!(net.text[0], "Jun 2024<br>Net Profit: ₹135 Cr (13.5% of sales)");
        // Zero sales: no share shown.
        assert_eq!(net.text[1], "Sep 2024<br>Net Profit: ₹-100 Cr");
    }

    #[test]
    fn test_eps_hover() {
        let traces = traces(ChartKind::Eps, &sample()).unwrap();
        assert_eq!(traces[0].text[2], "Dec 2024<br>EPS: ₹5.75");
    }

    #[test]
    fn test_cash_flow_uses_annual_series() {
        let quarterly = sample();
        let annual = PeriodSeries::with_periods(["Mar 2023", "Mar 2024"])
            .with(LineItem::CashFromOperations, vec![Some(500.0), Some(640.0)])
            .with(LineItem::NetCashFlow, vec![None, Some(-20.0)]);
        let derived = derive(&quarterly);
        let inputs = TraceInputs {
            series: &quarterly,
            derived: &derived,
            annual: &annual,
            shareholding: None,
        };
        let traces = assemble(ChartKind::CashFlow, &inputs, &ChartTheme::light()).unwrap();
        assert_eq!(names(&traces), vec!["Cash from Operations", "Net Cash Flow"]);
        assert_eq!(traces[0].x, annual.periods);
        assert_eq!(inputs.period_count(ChartKind::CashFlow), 2);
    }

    #[test]
    fn test_shareholding() {
        let series = sample();
        let derived = derive(&series);
        let holding = ShareholdingSeries::with_periods(["Sep 2024", "Dec 2024"])
            .with(ShareholdingCategory::Promoters, vec![Some(50.3), Some(50.1)])
            .with(ShareholdingCategory::Public, vec![None, Some(22.0)]);
        let mut inputs = TraceInputs {
            series: &series,
            derived: &derived,
            annual: &series,
            shareholding: None,
        };
        let theme = ChartTheme::light();
        assert!(assemble(ChartKind::Shareholding, &inputs, &theme).is_none());

        inputs.shareholding = Some(&holding);
        let traces = assemble(ChartKind::Shareholding, &inputs, &theme).unwrap();
        assert_eq!(names(&traces), vec!["Promoters", "Public"]);
        assert_eq!(traces[0].text[0], "Sep 2024<br>Promoters: 50.3%");
    }

    #[test]
    fn test_empty_series_empties_every_chart() {
        let series = PeriodSeries::default();
        for kind in ChartKind::ALL {
            assert!(traces(kind, &series).is_none(), "{kind:?} should be empty");
        }
    }

    #[test]
    fn test_colors_stable_across_partial_data() {
        let full = traces(ChartKind::Revenue, &sample()).unwrap();
        let partial = traces(
            ChartKind::Revenue,
            &sample().with(LineItem::Expenses, vec![None, None, None]),
        )
        .unwrap();
        let full_op = full.iter().find(|t| t.role == SeriesRole::OperatingProfit).unwrap();
        let partial_op = partial
            .iter()
            .find(|t| t.role == SeriesRole::OperatingProfit)
            .unwrap();
        assert_eq!(full_op.marker, partial_op.marker);
    }
}
