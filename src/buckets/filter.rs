//! Exponential lag filter converting a raw market rate into an effective rate
//!
//! A bucket's outstanding instruments were issued over many months, so the
//! blended rate actually paid trails the market rate. The filter is a
//! first-order exponential smoother parameterized by a half-life: the number
//! of months to close half the gap to a new constant input.

use crate::error::ModelError;

/// Stateless smoothing operator. Filter memory is carried explicitly by the
/// caller (see `EngineState`), so re-running a filter over the same input is
/// always reproducible.
#[derive(Debug, Clone, Copy)]
pub struct LagFilter {
    alpha: f64,
}

impl LagFilter {
    /// Build a filter from a half-life in months.
    ///
    /// `alpha = 1 - 0.5^(1/H)` for `H > 0`; `H = 0` means no smoothing
    /// (`alpha = 1`). A negative or non-finite half-life is a configuration
    /// error.
    pub fn from_half_life(half_life_months: f64) -> Result<Self, ModelError> {
        if !half_life_months.is_finite() || half_life_months < 0.0 {
            return Err(ModelError::config(format!(
                "lag half-life must be finite and non-negative, got {half_life_months}"
            )));
        }
        let alpha = if half_life_months == 0.0 {
            1.0
        } else {
            1.0 - 0.5f64.powf(1.0 / half_life_months)
        };
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Advance one month. `prev` is the carried effective rate from the
    /// previous month; `None` backcasts to the raw input (first month of a
    /// run, no prior history assumed).
    pub fn step(&self, prev: Option<f64>, raw: f64) -> f64 {
        match prev {
            None => raw,
            Some(effective) => self.alpha * raw + (1.0 - self.alpha) * effective,
        }
    }

    /// Filter a whole series, backcasting at the first element.
    pub fn apply(&self, raw: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(raw.len());
        let mut prev = None;
        for &value in raw {
            let effective = self.step(prev, value);
            out.push(effective);
            prev = Some(effective);
        }
        out
    }
}
