//! Bucket parameterization, lag filtering, and accrual rules

mod filter;
pub mod model;
mod params;

pub use filter::LagFilter;
pub use model::{blended_curve_rate, monthly_interest};
pub use params::{BucketId, CalibratedParams, ModelParams, OtherRule};
