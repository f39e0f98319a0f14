//! Engine state carried through the monthly recursion

/// State at the boundary between two months of a run: the debt level at the
/// start of the coming month and each bucket's filter memory from the month
/// just computed.
///
/// Owned exclusively by one `ForecastEngine::run` invocation, created at
/// t0 and discarded when the run ends. `None` filter fields mean "no prior
/// history"; the lag filters backcast from the first raw input.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Debt outstanding at the start of the coming month.
    pub debt: f64,

    /// Effective (filtered) short rate carried from the previous month.
    pub eff_short: Option<f64>,

    /// Effective blended notes/bonds rate carried from the previous month.
    pub eff_notes_bonds: Option<f64>,

    /// Effective monthly inflation carried from the previous month.
    pub eff_inflation: Option<f64>,

    /// Effective rate for a share-of-debt OTHER bucket. Stays `None` under
    /// the GDP rule.
    pub eff_other: Option<f64>,
}

impl EngineState {
    /// Initial state: the externally supplied debt level at the run's
    /// starting month, no filter history.
    pub fn new(initial_debt: f64) -> Self {
        Self {
            debt: initial_debt,
            eff_short: None,
            eff_notes_bonds: None,
            eff_inflation: None,
            eff_other: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_has_no_filter_history() {
        let state = EngineState::new(2.0e13);
        assert_eq!(state.debt, 2.0e13);
        assert!(state.eff_short.is_none());
        assert!(state.eff_notes_bonds.is_none());
        assert!(state.eff_inflation.is_none());
        assert!(state.eff_other.is_none());
    }
}
