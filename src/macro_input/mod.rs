//! Macro input data model, validation, and CSV ingestion

mod data;
pub mod loader;

pub use data::{MacroPoint, MacroSeries, Month, ObservedSeries};
pub use loader::{load_macro_csv, load_observed_csv};
