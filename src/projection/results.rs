//! Monthly output rows produced by the forecast engine

use serde::{Deserialize, Serialize};

use crate::buckets::BucketId;
use crate::macro_input::Month;

/// One month of engine output. Immutable after creation; appended to the
/// run's output sequence in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyResult {
    pub month: Month,
    pub interest_short: f64,
    pub interest_notes_bonds: f64,
    pub interest_tips: f64,
    pub interest_other: f64,
    pub net_interest: f64,
    /// Debt outstanding at the start of the month.
    pub debt_start: f64,
    /// Debt at the end of the month (start of the next).
    pub debt_end: f64,
    /// Annualized realized portfolio rate, `12 * net / debt_start`.
    /// NaN when `debt_start` is zero.
    pub effective_rate: f64,
}

impl MonthlyResult {
    /// Bucket-indexed access to the interest columns, so consumers can
    /// iterate `BucketId::ALL` instead of naming fields.
    pub fn interest(&self, bucket: BucketId) -> f64 {
        match bucket {
            BucketId::Short => self.interest_short,
            BucketId::NotesBonds => self.interest_notes_bonds,
            BucketId::Tips => self.interest_tips,
            BucketId::Other => self.interest_other,
        }
    }
}

/// Complete output of one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Monthly rows in run order.
    pub months: Vec<MonthlyResult>,

    /// Months where the effective rate was undefined (zero start-of-month
    /// debt). Non-fatal; the rows carry NaN effective rates.
    pub degenerate_months: usize,
}

impl ForecastResult {
    pub fn new() -> Self {
        Self {
            months: Vec::new(),
            degenerate_months: 0,
        }
    }

    pub fn push(&mut self, row: MonthlyResult) {
        self.months.push(row);
    }

    pub fn summary(&self) -> ForecastSummary {
        let total_net_interest = self.months.iter().map(|r| r.net_interest).sum();
        let final_debt = self.months.last().map(|r| r.debt_end).unwrap_or(0.0);
        ForecastSummary {
            total_months: self.months.len(),
            total_net_interest,
            final_debt,
            degenerate_months: self.degenerate_months,
        }
    }
}

impl Default for ForecastResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Headline numbers for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_months: usize,
    pub total_net_interest: f64,
    pub final_debt: f64,
    pub degenerate_months: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macro_input::Month;

    fn row(month: Month, net: f64, debt_end: f64) -> MonthlyResult {
        MonthlyResult {
            month,
            interest_short: net / 2.0,
            interest_notes_bonds: net / 2.0,
            interest_tips: 0.0,
            interest_other: 0.0,
            net_interest: net,
            debt_start: debt_end - net,
            debt_end,
            effective_rate: 0.03,
        }
    }

    #[test]
    fn test_summary_totals() {
        let start = Month::new(2020, 1).unwrap();
        let mut result = ForecastResult::new();
        result.push(row(start, 100.0, 1100.0));
        result.push(row(start.next(), 110.0, 1210.0));

        let summary = result.summary();
        assert_eq!(summary.total_months, 2);
        assert_eq!(summary.total_net_interest, 210.0);
        assert_eq!(summary.final_debt, 1210.0);
        assert_eq!(summary.degenerate_months, 0);
    }

    #[test]
    fn test_bucket_indexed_interest_covers_all_buckets() {
        let r = row(Month::new(2020, 1).unwrap(), 100.0, 1100.0);
        let total: f64 = BucketId::ALL.iter().map(|&b| r.interest(b)).sum();
        assert_eq!(total, r.net_interest);
    }
}
