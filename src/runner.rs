//! Pipeline runner: calibrate over history, then project the full horizon
//!
//! Holds the validated configuration once and runs any number of
//! calibrations or projections against it without re-validating, including
//! scenario variants with alternative parameter sets.

use log::info;

use crate::buckets::{CalibratedParams, ModelParams};
use crate::calibrate;
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::macro_input::{MacroSeries, ObservedSeries};
use crate::projection::{ForecastEngine, ForecastResult};

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Parameters the projection was run with.
    pub params: ModelParams,
    /// Present when calibration ran (carries the convergence flag).
    pub calibration: Option<CalibratedParams>,
    /// Monthly results over history plus projection.
    pub monthly: ForecastResult,
}

/// Pre-validated runner for calibration and projection.
pub struct ModelRunner {
    config: ModelConfig,
}

impl ModelRunner {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Calibrate against the historical window of `series`.
    pub fn calibrate(
        &self,
        series: &MacroSeries,
        observed: &ObservedSeries,
    ) -> Result<CalibratedParams, ModelError> {
        let history = series.window(self.config.start, self.config.history_months)?;
        calibrate::calibrate(
            &history,
            observed,
            &self.config.params,
            &self.config.calibration,
            self.config.initial_debt,
        )
    }

    /// Run the engine with explicit parameters over the configured window.
    pub fn project(
        &self,
        params: &ModelParams,
        series: &MacroSeries,
    ) -> Result<ForecastResult, ModelError> {
        let window = series.window(self.config.start, self.config.total_months())?;
        let engine = ForecastEngine::new(params.clone(), self.config.initial_debt)?;
        engine.run(&window)
    }

    /// Full pipeline: calibrate when observed totals are supplied, fall back
    /// to the configured defaults otherwise, then project the full horizon.
    pub fn run(
        &self,
        series: &MacroSeries,
        observed: Option<&ObservedSeries>,
    ) -> Result<RunOutput, ModelError> {
        let (params, calibration) = match observed {
            Some(observed) => {
                info!(
                    "calibrating over {} historical months from {}",
                    self.config.history_months, self.config.start
                );
                let fit = self.calibrate(series, observed)?;
                (fit.params.clone(), Some(fit))
            }
            None => {
                info!("calibration skipped, using configured parameters");
                (self.config.params.clone(), None)
            }
        };

        info!(
            "projecting {} months from {}",
            self.config.total_months(),
            self.config.start
        );
        let monthly = self.project(&params, series)?;

        Ok(RunOutput {
            params,
            calibration,
            monthly,
        })
    }

    /// Run one projection per parameter variant (e.g. rate-sensitivity
    /// scenarios around the calibrated set).
    pub fn run_scenarios(
        &self,
        variants: &[ModelParams],
        series: &MacroSeries,
    ) -> Result<Vec<ForecastResult>, ModelError> {
        variants
            .iter()
            .map(|params| self.project(params, series))
            .collect()
    }
}
