//! Interest Model - Monthly net-interest forecast engine for public debt
//!
//! This library provides:
//! - The monthly debt/interest recursion with lagged rate pass-through
//!   across portfolio buckets (SHORT, NOTES_BONDS, TIPS, OTHER)
//! - Least-squares calibration of lag half-lives, bucket shares, and the
//!   OTHER-rule scalar against historical observed interest outlays
//! - CY/FY aggregation of monthly output and annual reporting tables
//! - CSV/JSON ingestion of macro inputs and configuration

pub mod aggregate;
pub mod buckets;
pub mod calibrate;
pub mod config;
pub mod error;
pub mod macro_input;
pub mod projection;
pub mod runner;

// Re-export commonly used types
pub use buckets::{BucketId, CalibratedParams, LagFilter, ModelParams, OtherRule};
pub use config::{CalibrationConfig, ModelConfig};
pub use error::ModelError;
pub use macro_input::{MacroPoint, MacroSeries, Month, ObservedSeries};
pub use projection::{ForecastEngine, ForecastResult, MonthlyResult};
pub use runner::{ModelRunner, RunOutput};
