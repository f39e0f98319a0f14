//! Forecast engine: monthly debt/interest recursion and its output

mod engine;
mod results;
mod state;

pub use engine::ForecastEngine;
pub use results::{ForecastResult, ForecastSummary, MonthlyResult};
pub use state::EngineState;
