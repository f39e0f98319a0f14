//! Calibration of lag half-lives, bucket shares, and the OTHER scalar
//!
//! The search is a deterministic grid over (SHORT, NOTES_BONDS) half-life
//! pairs. For each pair, a least-squares fit against the observed monthly
//! totals proposes the linear parameters (shares and, under the GDP rule,
//! the OTHER bps); the proposal is projected into the feasible region and
//! then scored by the objective evaluator, which runs the full engine over
//! the historical window. The reported parameters are exactly the scored
//! candidate. Candidates are independent, so the grid is scored in parallel.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::aggregate::{observed_by_year, YearKind};
use crate::buckets::{blended_curve_rate, CalibratedParams, LagFilter, ModelParams, OtherRule};
use crate::config::CalibrationConfig;
use crate::error::ModelError;
use crate::macro_input::{MacroSeries, ObservedSeries};

use super::objective::{self, LossBreakdown, ObjectiveWeights};
use super::ols::solve_least_squares;

/// Fit the free parameters against historical observed totals.
///
/// `base` supplies everything that is not calibrated: curve mixing weights,
/// the TIPS coupon and inflation half-life, and the OTHER rule kind (with
/// its share held fixed under the share-of-debt rule). Never fails to
/// populate a bucket: every `BucketId` has an entry in the returned
/// parameters.
pub fn calibrate(
    historical_macro: &MacroSeries,
    observed: &ObservedSeries,
    base: &ModelParams,
    config: &CalibrationConfig,
    initial_debt: f64,
) -> Result<CalibratedParams, ModelError> {
    base.validate()?;
    config.validate()?;
    historical_macro.validate()?;
    observed.validate()?;
    objective::check_alignment(historical_macro, observed)?;

    let weights = ObjectiveWeights {
        fy: config.fy_weight,
        cy: config.cy_weight,
    };
    let inputs = DesignInputs::build(historical_macro, observed, base, initial_debt)?;

    let grid: Vec<(f64, f64)> = config
        .hl_short_grid
        .iter()
        .flat_map(|&hl_s| config.hl_notes_bonds_grid.iter().map(move |&hl_nb| (hl_s, hl_nb)))
        .collect();

    // Score the whole grid; each candidate owns its engine run.
    let scored: Vec<Option<(ModelParams, LossBreakdown)>> = grid
        .par_iter()
        .map(|&(hl_short, hl_notes_bonds)| {
            let candidate = match inputs.propose(hl_short, hl_notes_bonds, base) {
                Some(params) => params,
                None => return Ok(None),
            };
            let loss = objective::evaluate_detailed(
                &candidate,
                historical_macro,
                observed,
                initial_debt,
                weights,
            )?;
            Ok(Some((candidate, loss)))
        })
        .collect::<Result<_, ModelError>>()?;

    // Deterministic selection: strictly-lower loss wins, first in grid order
    // on ties.
    let mut best: Option<(ModelParams, LossBreakdown)> = None;
    let mut evaluated = 0;
    for entry in scored.into_iter().flatten() {
        evaluated += 1;
        let better = match &best {
            None => true,
            Some((_, incumbent)) => entry.1.total < incumbent.total,
        };
        if better {
            best = Some(entry);
        }
    }
    let (params, loss) = best.ok_or_else(|| {
        ModelError::config("calibration failed: no half-life candidate produced a solvable fit")
    })?;

    debug!(
        "calibration best: hl_short={} hl_notes_bonds={} loss={:.6e}",
        params.hl_short, params.hl_notes_bonds, loss.total
    );

    let rel_rmse = relative_rmse(&loss, observed, weights);
    let converged = rel_rmse <= config.tolerance;
    if !converged {
        warn!(
            "calibration did not converge: relative RMS error {:.4} exceeds tolerance {:.4}; \
             returning best-found parameters",
            rel_rmse, config.tolerance
        );
    }

    Ok(CalibratedParams {
        params,
        loss: loss.total,
        rel_rmse,
        converged,
        evaluated,
    })
}

/// Relative RMS error of the best candidate on the weighted objective.
///
/// Both the error and the observed scale carry the same FY/CY weights the
/// search optimized, so a CY-only configuration is judged against the CY
/// term and never against an unoptimized one.
fn relative_rmse(
    loss: &LossBreakdown,
    observed: &ObservedSeries,
    weights: ObjectiveWeights,
) -> f64 {
    let error_years = weights.fy * loss.fy_years as f64 + weights.cy * loss.cy_years as f64;
    if error_years == 0.0 {
        return 0.0;
    }
    let error_rms = (loss.total / error_years).sqrt();

    let observed_fy = observed_by_year(observed, YearKind::Fiscal);
    let observed_cy = observed_by_year(observed, YearKind::Calendar);
    let observed_ss = weights.fy * observed_fy.values().map(|v| v * v).sum::<f64>()
        + weights.cy * observed_cy.values().map(|v| v * v).sum::<f64>();
    let observed_years =
        weights.fy * observed_fy.len() as f64 + weights.cy * observed_cy.len() as f64;
    let observed_rms = (observed_ss / observed_years).sqrt();

    if observed_rms > 0.0 {
        error_rms / observed_rms
    } else if error_rms == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Precomputed per-window series shared across all grid candidates.
struct DesignInputs {
    r_short_raw: Vec<f64>,
    nb_raw: Vec<f64>,
    inflation_filtered: Vec<f64>,
    gdp_scaled: Vec<f64>,
    gdp_scale: f64,
    /// Observed totals, net of the fixed OTHER contribution under the
    /// share-of-debt rule.
    y: Vec<f64>,
    /// Denominator mapping regression coefficients to shares.
    debt_denominator: f64,
}

impl DesignInputs {
    fn build(
        historical_macro: &MacroSeries,
        observed: &ObservedSeries,
        base: &ModelParams,
        initial_debt: f64,
    ) -> Result<Self, ModelError> {
        let points = historical_macro.points();
        let r_short_raw: Vec<f64> = points.iter().map(|p| p.r_3m).collect();
        let nb_raw: Vec<f64> = points
            .iter()
            .map(|p| blended_curve_rate(p, &base.curve_weights))
            .collect();
        let inflation_raw: Vec<f64> = points.iter().map(|p| p.inflation_m).collect();
        let inflation_filtered =
            LagFilter::from_half_life(base.hl_tips)?.apply(&inflation_raw);

        let gdp: Vec<f64> = points.iter().map(|p| p.nominal_gdp).collect();
        let gdp_scale = if gdp[0].abs() > 0.0 { gdp[0].abs() } else { 1.0 };
        let gdp_scaled: Vec<f64> = gdp.iter().map(|g| g / gdp_scale).collect();

        let debt_denominator = initial_debt.max(1.0);

        // Under the share-of-debt rule the OTHER share is fixed
        // configuration; subtract its (constant-debt proxy) contribution so
        // the regression only sees the free buckets.
        let mut y = observed.totals().to_vec();
        if let OtherRule::ShareOfDebt { share, half_life } = base.other {
            let eff_other = LagFilter::from_half_life(half_life)?.apply(&r_short_raw);
            for (value, eff) in y.iter_mut().zip(eff_other.iter()) {
                *value -= eff * debt_denominator * share / 12.0;
            }
        }

        Ok(Self {
            r_short_raw,
            nb_raw,
            inflation_filtered,
            gdp_scaled,
            gdp_scale,
            y,
            debt_denominator,
        })
    }

    /// Propose a feasible candidate for one half-life pair, or `None` when
    /// the least-squares system cannot be solved.
    fn propose(
        &self,
        hl_short: f64,
        hl_notes_bonds: f64,
        base: &ModelParams,
    ) -> Option<ModelParams> {
        let short_filter = LagFilter::from_half_life(hl_short).ok()?;
        let nb_filter = LagFilter::from_half_life(hl_notes_bonds).ok()?;
        let eff_short = short_filter.apply(&self.r_short_raw);
        let eff_nb = nb_filter.apply(&self.nb_raw);

        // Orthogonalize the notes/bonds column against the short column to
        // improve identifiability; mapped back after the solve.
        let short_norm: f64 = eff_short.iter().map(|v| v * v).sum();
        let projection = if short_norm > 0.0 {
            eff_short
                .iter()
                .zip(eff_nb.iter())
                .map(|(s, nb)| s * nb)
                .sum::<f64>()
                / short_norm
        } else {
            0.0
        };
        let nb_resid: Vec<f64> = eff_nb
            .iter()
            .zip(eff_short.iter())
            .map(|(nb, s)| nb - projection * s)
            .collect();

        let fit_gdp_column = matches!(base.other, OtherRule::BpsOfGdp { .. });
        let n = self.y.len();
        let ncols = if fit_gdp_column { 4 } else { 3 };
        let x = DMatrix::from_fn(n, ncols, |row, col| match col {
            0 => eff_short[row],
            1 => nb_resid[row],
            2 => self.inflation_filtered[row],
            _ => self.gdp_scaled[row],
        });
        let y = DVector::from_row_slice(&self.y);
        let beta = solve_least_squares(&x, &y)?;

        let beta_nb = beta[1];
        let beta_short = beta[0] - projection * beta_nb;
        let beta_tips = beta[2];

        // Coefficient-to-share map uses the initial debt stock; the rate
        // buckets carry a /12 (annual rates), TIPS does not (monthly
        // inflation accrual).
        let mut share_short = (12.0 * beta_short / self.debt_denominator).clamp(0.0, 1.0);
        let mut share_notes_bonds = (12.0 * beta_nb / self.debt_denominator).clamp(0.0, 1.0);
        let mut share_tips = (beta_tips / self.debt_denominator).clamp(0.0, 1.0);

        let other = match base.other {
            OtherRule::BpsOfGdp { .. } => {
                let gamma = beta[3] / self.gdp_scale;
                OtherRule::BpsOfGdp {
                    bps: (gamma * 12.0 * 10_000.0).max(0.0),
                }
            }
            fixed @ OtherRule::ShareOfDebt { .. } => fixed,
        };

        // Feasibility projection before scoring: the free shares plus any
        // fixed OTHER share must not exceed 1.
        let fixed_other_share = match other {
            OtherRule::ShareOfDebt { share, .. } => share,
            OtherRule::BpsOfGdp { .. } => 0.0,
        };
        let cap = (1.0 - fixed_other_share).max(0.0);
        let free_sum = share_short + share_notes_bonds + share_tips;
        if free_sum > cap && free_sum > 0.0 {
            let scale = cap / free_sum;
            share_short *= scale;
            share_notes_bonds *= scale;
            share_tips *= scale;
        }

        Some(ModelParams {
            hl_short,
            hl_notes_bonds,
            share_short,
            share_notes_bonds,
            share_tips,
            other,
            ..base.clone()
        })
    }
}
