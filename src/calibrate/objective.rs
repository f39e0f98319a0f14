//! Calibration objective: weighted FY/CY squared error of reproduced totals
//!
//! A pure function of its inputs: it constructs a fresh engine run for the
//! candidate over the historical window, aggregates to fiscal and calendar
//! years with the same rule reporting uses, and scores against the observed
//! totals. No state survives between evaluations, so candidates can be
//! scored in parallel.

use std::collections::BTreeMap;

use crate::aggregate::{net_interest_by_year, observed_by_year, YearKind};
use crate::buckets::ModelParams;
use crate::error::ModelError;
use crate::macro_input::{MacroSeries, ObservedSeries};
use crate::projection::ForecastEngine;

/// Relative weights of the FY (primary) and CY (secondary) error terms.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveWeights {
    pub fy: f64,
    pub cy: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self { fy: 1.0, cy: 0.25 }
    }
}

/// Loss with its components, for convergence reporting.
#[derive(Debug, Clone, Copy)]
pub struct LossBreakdown {
    pub total: f64,
    pub fy_sse: f64,
    pub cy_sse: f64,
    pub fy_years: usize,
    pub cy_years: usize,
}

/// Score one candidate parameter vector. Inputs must cover the historical
/// window only (never the projection window) and be month-aligned.
pub fn evaluate_detailed(
    params: &ModelParams,
    historical_macro: &MacroSeries,
    observed: &ObservedSeries,
    initial_debt: f64,
    weights: ObjectiveWeights,
) -> Result<LossBreakdown, ModelError> {
    check_alignment(historical_macro, observed)?;

    let engine = ForecastEngine::new(params.clone(), initial_debt)?;
    let run = engine.run(historical_macro)?;

    let (fy_sse, fy_years) = sse(
        &net_interest_by_year(&run.months, YearKind::Fiscal),
        &observed_by_year(observed, YearKind::Fiscal),
    );
    let (cy_sse, cy_years) = sse(
        &net_interest_by_year(&run.months, YearKind::Calendar),
        &observed_by_year(observed, YearKind::Calendar),
    );

    Ok(LossBreakdown {
        total: weights.fy * fy_sse + weights.cy * cy_sse,
        fy_sse,
        cy_sse,
        fy_years,
        cy_years,
    })
}

/// Scalar loss, the plain objective surface.
pub fn evaluate(
    params: &ModelParams,
    historical_macro: &MacroSeries,
    observed: &ObservedSeries,
    initial_debt: f64,
    weights: ObjectiveWeights,
) -> Result<f64, ModelError> {
    Ok(evaluate_detailed(params, historical_macro, observed, initial_debt, weights)?.total)
}

pub(crate) fn check_alignment(
    series: &MacroSeries,
    observed: &ObservedSeries,
) -> Result<(), ModelError> {
    if series.is_empty() {
        return Err(ModelError::config("historical window is empty"));
    }
    if series.start() != observed.start() || series.len() != observed.len() {
        return Err(ModelError::config(format!(
            "historical macro ({} months from {}) and observed totals ({} months from {}) \
             must cover the same window",
            series.len(),
            series.start(),
            observed.len(),
            observed.start()
        )));
    }
    Ok(())
}

fn sse(model: &BTreeMap<i32, f64>, observed: &BTreeMap<i32, f64>) -> (f64, usize) {
    let mut total = 0.0;
    let mut years = 0;
    for (year, model_value) in model {
        if let Some(observed_value) = observed.get(year) {
            let diff = model_value - observed_value;
            total += diff * diff;
            years += 1;
        }
    }
    (total, years)
}
