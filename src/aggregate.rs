//! Calendar-year and fiscal-year aggregation of monthly output
//!
//! FY runs Oct-Sep and is labeled by the ending calendar year. The same
//! grouping feeds both the calibration objective and the reporting tables,
//! so the calibrator scores against exactly what reporting shows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::macro_input::{MacroSeries, Month, ObservedSeries};
use crate::projection::MonthlyResult;

/// Year-label granularity for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearKind {
    Calendar,
    Fiscal,
}

impl YearKind {
    pub fn label(&self, month: Month) -> i32 {
        match self {
            YearKind::Calendar => month.calendar_year(),
            YearKind::Fiscal => month.fiscal_year(),
        }
    }
}

/// Sum monthly values into year buckets.
pub fn sum_by_year<I>(values: I, kind: YearKind) -> BTreeMap<i32, f64>
where
    I: IntoIterator<Item = (Month, f64)>,
{
    let mut out = BTreeMap::new();
    for (month, value) in values {
        *out.entry(kind.label(month)).or_insert(0.0) += value;
    }
    out
}

/// Annual net interest from engine output.
pub fn net_interest_by_year(results: &[MonthlyResult], kind: YearKind) -> BTreeMap<i32, f64> {
    sum_by_year(results.iter().map(|r| (r.month, r.net_interest)), kind)
}

/// Annual totals of observed historical interest.
pub fn observed_by_year(observed: &ObservedSeries, kind: YearKind) -> BTreeMap<i32, f64> {
    sum_by_year(
        observed
            .totals()
            .iter()
            .enumerate()
            .map(|(i, &v)| (observed.month_at(i), v)),
        kind,
    )
}

/// One year of the reporting table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualRow {
    pub interest_total: f64,
    /// Mean end-of-month debt across the year's months.
    pub debt_avg: f64,
    /// GDP flow for the year: the annual-level monthly series summed / 12.
    pub gdp_total: f64,
    /// `interest_total / debt_avg`, NaN when debt_avg is not positive.
    pub effective_rate: f64,
    /// `interest_total / gdp_total`, NaN when gdp_total is not positive.
    pub interest_pct_gdp: f64,
}

/// Build the annual reporting table from engine output and the macro series
/// it was run against. Partial years at the edges of the window aggregate
/// over the months present.
pub fn annual_table(
    results: &[MonthlyResult],
    series: &MacroSeries,
    kind: YearKind,
) -> BTreeMap<i32, AnnualRow> {
    let mut interest: BTreeMap<i32, f64> = BTreeMap::new();
    let mut debt_sum: BTreeMap<i32, f64> = BTreeMap::new();
    let mut gdp_sum: BTreeMap<i32, f64> = BTreeMap::new();
    let mut months: BTreeMap<i32, usize> = BTreeMap::new();

    for row in results {
        let year = kind.label(row.month);
        *interest.entry(year).or_insert(0.0) += row.net_interest;
        *debt_sum.entry(year).or_insert(0.0) += row.debt_end;
        *months.entry(year).or_insert(0) += 1;
        if let Some(index) = series.index_of(row.month) {
            *gdp_sum.entry(year).or_insert(0.0) += series.points()[index].nominal_gdp;
        }
    }

    let mut out = BTreeMap::new();
    for (year, count) in months {
        let interest_total = interest[&year];
        let debt_avg = debt_sum[&year] / count as f64;
        let gdp_total = gdp_sum.get(&year).copied().unwrap_or(0.0) / 12.0;
        out.insert(
            year,
            AnnualRow {
                interest_total,
                debt_avg,
                gdp_total,
                effective_rate: if debt_avg > 0.0 {
                    interest_total / debt_avg
                } else {
                    f64::NAN
                },
                interest_pct_gdp: if gdp_total > 0.0 {
                    interest_total / gdp_total
                } else {
                    f64::NAN
                },
            },
        );
    }
    out
}
