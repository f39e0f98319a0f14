//! Error taxonomy for the forecast engine and calibrator
//!
//! Configuration and data-gap problems are fatal and abort a run before any
//! output is produced. Degenerate-state and convergence conditions are not
//! errors; they travel alongside successful output (see
//! `ForecastResult::degenerate_months` and `CalibratedParams::converged`).

use thiserror::Error;

use crate::macro_input::Month;

/// All fatal error conditions surfaced by this crate.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Invalid parameters or run configuration. A run must not start with one.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required macro field is missing or undefined inside the run window.
    /// The engine refuses to proceed rather than substitute zero.
    #[error("data gap: {field} is missing or undefined for {month}")]
    DataGap { field: &'static str, month: Month },

    /// An annual rate field outside [-1, 1]. Rates must be decimals
    /// (0.044, not 4.4) by the time the engine sees them.
    #[error("suspect units: {field} = {value} at {month} looks like a raw percentage")]
    SuspectUnits {
        field: &'static str,
        month: Month,
        value: f64,
    },

    /// The monthly grid is not consecutive.
    #[error("monthly grid gap: expected {expected}, found {found}")]
    MonthGap { expected: Month, found: Month },

    /// A cell in an input file failed to parse.
    #[error("parse error in {context}, row {row}: {message}")]
    Parse {
        context: String,
        row: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Shorthand for a configuration error with a formatted message.
    pub fn config(message: impl Into<String>) -> Self {
        ModelError::Configuration(message.into())
    }
}
