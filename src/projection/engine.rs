//! Core forecast engine: the monthly debt/interest recursion
//!
//! This is the system's one feedback loop: debt at month t depends on net
//! interest at t, which depends on debt at t-1. The recursion is strictly
//! sequential in time and carries its state explicitly (no module-level
//! filter memory), so independent runs never observe each other.

use log::warn;

use crate::buckets::{
    blended_curve_rate, monthly_interest, BucketId, LagFilter, ModelParams, OtherRule,
};
use crate::error::ModelError;
use crate::macro_input::MacroSeries;

use super::results::{ForecastResult, MonthlyResult};
use super::state::EngineState;

/// Monthly recursion engine for one parameterization and one initial debt
/// anchor. Reusable across runs; each `run` owns its own state.
pub struct ForecastEngine {
    params: ModelParams,
    initial_debt: f64,
}

impl ForecastEngine {
    /// Build an engine, rejecting invalid parameters up front. A run must
    /// not start with a bad configuration.
    pub fn new(params: ModelParams, initial_debt: f64) -> Result<Self, ModelError> {
        params.validate()?;
        if !initial_debt.is_finite() || initial_debt < 0.0 {
            return Err(ModelError::config(format!(
                "initial debt must be finite and non-negative, got {initial_debt}"
            )));
        }
        Ok(Self {
            params,
            initial_debt,
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Run the recursion over the whole series.
    ///
    /// Per month, in order: advance each bucket's lag filter, accrue each
    /// bucket's interest on start-of-month debt, apply the budget identity
    /// `debt[t] = debt[t-1] + primary_deficit[t] + net_interest[t]`, and
    /// record the realized effective rate (NaN when start-of-month debt is
    /// zero; such months are counted, not fatal).
    pub fn run(&self, series: &MacroSeries) -> Result<ForecastResult, ModelError> {
        if series.is_empty() {
            return Err(ModelError::config("macro series is empty"));
        }
        series.validate()?;

        let short_filter = LagFilter::from_half_life(self.params.hl_short)?;
        let nb_filter = LagFilter::from_half_life(self.params.hl_notes_bonds)?;
        let tips_filter = LagFilter::from_half_life(self.params.hl_tips)?;
        let other_filter = match self.params.other {
            OtherRule::ShareOfDebt { half_life, .. } => {
                Some(LagFilter::from_half_life(half_life)?)
            }
            OtherRule::BpsOfGdp { .. } => None,
        };

        let mut state = EngineState::new(self.initial_debt);
        let mut result = ForecastResult::new();

        for (i, point) in series.points().iter().enumerate() {
            let month = series.month_at(i);

            // Advance filters first; they consume this month's raw inputs
            // and the carried memory (backcast on the first month).
            let eff_short = short_filter.step(state.eff_short, point.r_3m);
            let eff_nb = nb_filter.step(
                state.eff_notes_bonds,
                blended_curve_rate(point, &self.params.curve_weights),
            );
            let eff_infl = tips_filter.step(state.eff_inflation, point.inflation_m);
            let eff_other = match &other_filter {
                // Share-based OTHER mirrors SHORT and filters the short rate.
                Some(filter) => filter.step(state.eff_other, point.r_3m),
                None => 0.0,
            };
            state.eff_short = Some(eff_short);
            state.eff_notes_bonds = Some(eff_nb);
            state.eff_inflation = Some(eff_infl);
            if other_filter.is_some() {
                state.eff_other = Some(eff_other);
            }

            let debt_start = state.debt;
            let filtered_rate_for = |bucket: BucketId| match bucket {
                BucketId::Short => eff_short,
                BucketId::NotesBonds => eff_nb,
                BucketId::Tips => eff_infl,
                BucketId::Other => eff_other,
            };

            let mut interest = [0.0; BucketId::ALL.len()];
            for (slot, &bucket) in interest.iter_mut().zip(BucketId::ALL.iter()) {
                *slot = monthly_interest(
                    bucket,
                    &self.params,
                    point,
                    filtered_rate_for(bucket),
                    debt_start,
                );
            }
            let net_interest: f64 = interest.iter().sum();

            let debt_end = debt_start + point.primary_deficit + net_interest;

            let effective_rate = if debt_start == 0.0 {
                result.degenerate_months += 1;
                f64::NAN
            } else {
                12.0 * net_interest / debt_start
            };

            result.push(MonthlyResult {
                month,
                interest_short: interest[0],
                interest_notes_bonds: interest[1],
                interest_tips: interest[2],
                interest_other: interest[3],
                net_interest,
                debt_start,
                debt_end,
                effective_rate,
            });

            state.debt = debt_end;
        }

        if result.degenerate_months > 0 {
            warn!(
                "effective rate undefined for {} month(s): zero start-of-month debt",
                result.degenerate_months
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macro_input::{MacroPoint, Month};
    use approx::assert_relative_eq;

    fn constant_series(months: usize, rate: f64, inflation_m: f64, deficit: f64) -> MacroSeries {
        let point = MacroPoint {
            r_3m: rate,
            r_2y: rate,
            r_5y: rate,
            r_10y: rate,
            inflation_m,
            nominal_gdp: 1.0e12,
            primary_deficit: deficit,
        };
        MacroSeries::new(Month::new(2020, 1).unwrap(), vec![point; months])
    }

    fn single_bucket_params() -> ModelParams {
        ModelParams {
            hl_short: 0.0,
            share_short: 1.0,
            share_notes_bonds: 0.0,
            share_tips: 0.0,
            other: OtherRule::BpsOfGdp { bps: 0.0 },
            ..ModelParams::default()
        }
    }

    #[test]
    fn test_concrete_first_month_scenario() {
        // 1,000,000 at a constant 3.6% short rate, single bucket, no lag,
        // zero deficit: month 1 interest is exactly 3,000.
        let engine = ForecastEngine::new(single_bucket_params(), 1_000_000.0).unwrap();
        let result = engine.run(&constant_series(2, 0.036, 0.0, 0.0)).unwrap();

        let first = &result.months[0];
        assert_relative_eq!(first.interest_short, 3_000.0, epsilon = 1e-9);
        assert_relative_eq!(first.net_interest, 3_000.0, epsilon = 1e-9);
        assert_relative_eq!(first.debt_end, 1_003_000.0, epsilon = 1e-9);
        assert_relative_eq!(first.effective_rate, 0.036, epsilon = 1e-12);
        assert_relative_eq!(result.months[1].debt_start, 1_003_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_geometric_debt_growth_closed_form() {
        // Shares over SHORT/NOTES_BONDS sum to 1 on a constant rate path
        // with zero deficit: Debt[t] = Debt[0] * (1 + r/12)^t.
        let params = ModelParams {
            share_short: 0.3,
            share_notes_bonds: 0.7,
            share_tips: 0.0,
            other: OtherRule::BpsOfGdp { bps: 0.0 },
            ..ModelParams::default()
        };
        let r = 0.06;
        let debt0 = 1.0e12;
        let months = 36;
        let engine = ForecastEngine::new(params, debt0).unwrap();
        let result = engine.run(&constant_series(months, r, 0.0, 0.0)).unwrap();

        let expected = debt0 * (1.0 + r / 12.0).powi(months as i32);
        assert_relative_eq!(
            result.months.last().unwrap().debt_end,
            expected,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_tips_only_interest_equals_inflation_times_debt() {
        let params = ModelParams {
            share_short: 0.0,
            share_notes_bonds: 0.0,
            share_tips: 1.0,
            tips_coupon: 0.0,
            hl_tips: 0.0,
            other: OtherRule::BpsOfGdp { bps: 0.0 },
            ..ModelParams::default()
        };
        let infl = 0.003;
        let debt0 = 5.0e11;
        let engine = ForecastEngine::new(params, debt0).unwrap();
        let result = engine.run(&constant_series(6, 0.0, infl, 0.0)).unwrap();

        let mut debt_prev = debt0;
        for row in &result.months {
            assert_relative_eq!(row.net_interest, infl * debt_prev, max_relative = 1e-12);
            debt_prev = row.debt_end;
        }
    }

    #[test]
    fn test_primary_deficit_enters_budget_identity() {
        let engine = ForecastEngine::new(single_bucket_params(), 1_000_000.0).unwrap();
        let result = engine.run(&constant_series(1, 0.036, 0.0, 10_000.0)).unwrap();
        assert_relative_eq!(
            result.months[0].debt_end,
            1_000_000.0 + 10_000.0 + 3_000.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_debt_effective_rate_is_nan_not_a_crash() {
        let engine = ForecastEngine::new(single_bucket_params(), 0.0).unwrap();
        let result = engine.run(&constant_series(3, 0.02, 0.0, 0.0)).unwrap();
        assert!(result.months[0].effective_rate.is_nan());
        assert_eq!(result.degenerate_months, 3);
        // Zero rates on zero debt: interest stays zero, recursion continues
        assert_eq!(result.months[2].debt_end, 0.0);
    }

    #[test]
    fn test_negative_rates_propagate_as_negative_interest() {
        let engine = ForecastEngine::new(single_bucket_params(), 1.0e6).unwrap();
        let result = engine.run(&constant_series(1, -0.01, 0.0, 0.0)).unwrap();
        assert!(result.months[0].net_interest < 0.0);
        assert!(result.months[0].debt_end < 1.0e6);
    }

    #[test]
    fn test_data_gap_aborts_run() {
        let mut series = constant_series(6, 0.02, 0.001, 0.0);
        let start = series.start();
        let mut points = series.points().to_vec();
        points[4].r_10y = f64::NAN;
        series = MacroSeries::new(start, points);

        let engine = ForecastEngine::new(ModelParams::default(), 1.0e12).unwrap();
        match engine.run(&series) {
            Err(ModelError::DataGap { field, month }) => {
                assert_eq!(field, "r_10y");
                assert_eq!(month, Month::new(2020, 5).unwrap());
            }
            other => panic!("expected DataGap, got {other:?}"),
        }
    }

    #[test]
    fn test_lag_filter_state_carried_across_months() {
        // Rate steps from 2% to 4% at month 2 with a 6-month half-life; the
        // effective rate (and interest) respond gradually, not at once.
        let mut points = vec![
            MacroPoint {
                r_3m: 0.02,
                r_2y: 0.02,
                r_5y: 0.02,
                r_10y: 0.02,
                inflation_m: 0.0,
                nominal_gdp: 1.0e12,
                primary_deficit: 0.0,
            };
            12
        ];
        for p in points.iter_mut().skip(1) {
            p.r_3m = 0.04;
        }
        let series = MacroSeries::new(Month::new(2020, 1).unwrap(), points);

        let params = ModelParams {
            hl_short: 6.0,
            share_short: 1.0,
            share_notes_bonds: 0.0,
            share_tips: 0.0,
            other: OtherRule::BpsOfGdp { bps: 0.0 },
            ..ModelParams::default()
        };
        let engine = ForecastEngine::new(params, 1.0e6).unwrap();
        let result = engine.run(&series).unwrap();

        // Backcast pins month 1 at 2%; six steps later half the gap is closed.
        assert_relative_eq!(result.months[0].effective_rate, 0.02, epsilon = 1e-12);
        assert_relative_eq!(result.months[6].effective_rate, 0.03, epsilon = 1e-6);
        assert!(result.months[11].effective_rate < 0.04);
    }

    #[test]
    fn test_share_of_debt_other_rule() {
        let params = ModelParams {
            hl_short: 0.0,
            share_short: 0.5,
            share_notes_bonds: 0.0,
            share_tips: 0.0,
            other: OtherRule::ShareOfDebt {
                share: 0.5,
                half_life: 0.0,
            },
            ..ModelParams::default()
        };
        let engine = ForecastEngine::new(params, 1.0e6).unwrap();
        let result = engine.run(&constant_series(1, 0.036, 0.0, 0.0)).unwrap();

        // Both buckets accrue the same: 0.036 * 1e6 * 0.5 / 12 = 1,500 each
        assert_relative_eq!(result.months[0].interest_short, 1_500.0, epsilon = 1e-9);
        assert_relative_eq!(result.months[0].interest_other, 1_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_determinism_across_runs() {
        let series = constant_series(48, 0.03, 0.002, 1.0e9);
        let engine = ForecastEngine::new(ModelParams::default(), 2.0e13).unwrap();
        let a = engine.run(&series).unwrap();
        let b = engine.run(&series).unwrap();

        assert_eq!(a.months.len(), b.months.len());
        for (x, y) in a.months.iter().zip(b.months.iter()) {
            assert_eq!(x.net_interest.to_bits(), y.net_interest.to_bits());
            assert_eq!(x.debt_end.to_bits(), y.debt_end.to_bits());
            assert_eq!(x.effective_rate.to_bits(), y.effective_rate.to_bits());
        }
    }

    #[test]
    fn test_invalid_initial_debt_rejected() {
        assert!(ForecastEngine::new(ModelParams::default(), -1.0).is_err());
        assert!(ForecastEngine::new(ModelParams::default(), f64::NAN).is_err());
    }
}
