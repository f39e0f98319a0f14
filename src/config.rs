//! Run configuration: window anchors, initial debt, parameter defaults, and
//! calibration settings. Loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buckets::ModelParams;
use crate::error::ModelError;
use crate::macro_input::Month;

/// Settings for the calibration search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Candidate SHORT half-lives (months).
    pub hl_short_grid: Vec<f64>,
    /// Candidate NOTES_BONDS half-lives (months).
    pub hl_notes_bonds_grid: Vec<f64>,
    /// Primary objective weight: FY-aggregated squared error.
    pub fy_weight: f64,
    /// Secondary objective weight: CY-aggregated squared error.
    pub cy_weight: f64,
    /// Convergence bound on the relative RMS error of the best candidate,
    /// measured on the same FY/CY-weighted objective the search minimizes.
    pub tolerance: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            hl_short_grid: vec![3.0, 6.0, 12.0],
            hl_notes_bonds_grid: vec![12.0, 18.0, 24.0, 30.0],
            fy_weight: 1.0,
            cy_weight: 0.25,
            tolerance: 0.05,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.hl_short_grid.is_empty() || self.hl_notes_bonds_grid.is_empty() {
            return Err(ModelError::config("calibration half-life grids must be non-empty"));
        }
        for &hl in self.hl_short_grid.iter().chain(&self.hl_notes_bonds_grid) {
            if !hl.is_finite() || hl < 0.0 {
                return Err(ModelError::config(format!(
                    "calibration grid half-life must be finite and non-negative, got {hl}"
                )));
            }
        }
        if !self.fy_weight.is_finite()
            || !self.cy_weight.is_finite()
            || self.fy_weight < 0.0
            || self.cy_weight < 0.0
            || self.fy_weight + self.cy_weight == 0.0
        {
            return Err(ModelError::config(
                "objective weights must be non-negative with a positive sum",
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ModelError::config("calibration tolerance must be positive"));
        }
        Ok(())
    }
}

/// Top-level model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// First month of the historical window (and of every run).
    pub start: Month,
    /// Length of the historical window in months.
    pub history_months: usize,
    /// Months projected beyond the historical window.
    pub projection_months: usize,
    /// Debt outstanding at `start`.
    pub initial_debt: f64,
    /// Parameter defaults: the calibration base, and the run parameters when
    /// calibration is skipped.
    #[serde(default)]
    pub params: ModelParams,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl ModelConfig {
    pub fn total_months(&self) -> usize {
        self.history_months + self.projection_months
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.history_months == 0 {
            return Err(ModelError::config("history window must cover at least one month"));
        }
        if !self.initial_debt.is_finite() || self.initial_debt < 0.0 {
            return Err(ModelError::config(format!(
                "initial debt must be finite and non-negative, got {}",
                self.initial_debt
            )));
        }
        self.params.validate()?;
        self.calibration.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        let config: ModelConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            start: Month::new(2019, 10).unwrap(),
            history_months: 60,
            projection_months: 360,
            initial_debt: 2.2e13,
            params: ModelParams::default(),
            calibration: CalibrationConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let c = config();
        assert!(c.validate().is_ok());
        assert_eq!(c.total_months(), 420);
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let json = r#"{
            "start": "2019-10",
            "history_months": 60,
            "projection_months": 360,
            "initial_debt": 2.2e13
        }"#;
        let c: ModelConfig = serde_json::from_str(json).unwrap();
        assert!(c.validate().is_ok());
        assert_eq!(c.start, Month::new(2019, 10).unwrap());
        assert_eq!(c.params, ModelParams::default());
        assert_eq!(c.calibration.hl_short_grid, vec![3.0, 6.0, 12.0]);

        let back = serde_json::to_string(&c).unwrap();
        let again: ModelConfig = serde_json::from_str(&back).unwrap();
        assert_eq!(again.params, c.params);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let mut c = config();
        c.calibration.hl_short_grid.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_zero_history_rejected() {
        let mut c = config();
        c.history_months = 0;
        assert!(c.validate().is_err());
    }
}
