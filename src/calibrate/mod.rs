//! Parameter calibration against historical observed interest totals

mod calibrator;
pub mod objective;
mod ols;

pub use calibrator::calibrate;
pub use objective::{evaluate, evaluate_detailed, LossBreakdown, ObjectiveWeights};
