//! Bucket parameterization: shares, lag half-lives, and the OTHER rule
//!
//! `BucketId::ALL` is the single enumerated source of truth for the
//! portfolio. Anything that maps bucket-level computations to an output
//! structure iterates over it rather than copying fields one by one, so a
//! bucket can never be silently dropped.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The four debt-instrument categories of the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketId {
    Short,
    NotesBonds,
    Tips,
    Other,
}

impl BucketId {
    pub const ALL: [BucketId; 4] = [
        BucketId::Short,
        BucketId::NotesBonds,
        BucketId::Tips,
        BucketId::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BucketId::Short => "SHORT",
            BucketId::NotesBonds => "NOTES_BONDS",
            BucketId::Tips => "TIPS",
            BucketId::Other => "OTHER",
        }
    }
}

/// Accrual rule for the OTHER bucket, fixed by configuration for the whole
/// run (never switched mid-run or inferred by calibration).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OtherRule {
    /// Basis points of annual GDP per year, independent of debt.
    BpsOfGdp { bps: f64 },
    /// Share-of-debt rule mirroring SHORT, with its own lag half-life.
    ShareOfDebt { share: f64, half_life: f64 },
}

/// The full parameter set consumed by the forecast engine.
///
/// Half-lives are in months (`0` = no smoothing). Shares are fractions of
/// total outstanding debt. `curve_weights` blend the 2y/5y/10y components
/// into the NOTES_BONDS raw rate and must sum to 1. `tips_coupon` is an
/// annual decimal rate on the inflation-adjusted principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub hl_short: f64,
    pub hl_notes_bonds: f64,
    pub hl_tips: f64,
    pub share_short: f64,
    pub share_notes_bonds: f64,
    pub share_tips: f64,
    pub tips_coupon: f64,
    pub curve_weights: [f64; 3],
    pub other: OtherRule,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            hl_short: 3.0,
            hl_notes_bonds: 24.0,
            hl_tips: 1.0,
            share_short: 0.25,
            share_notes_bonds: 0.60,
            share_tips: 0.10,
            tips_coupon: 0.0,
            curve_weights: [0.2, 0.4, 0.4],
            other: OtherRule::BpsOfGdp { bps: 5.0 },
        }
    }
}

const SHARE_SUM_EPS: f64 = 1e-9;

impl ModelParams {
    /// A bucket's share of outstanding debt. For OTHER under the GDP rule
    /// this is 0 (the rule does not consume a share).
    pub fn share(&self, bucket: BucketId) -> f64 {
        match bucket {
            BucketId::Short => self.share_short,
            BucketId::NotesBonds => self.share_notes_bonds,
            BucketId::Tips => self.share_tips,
            BucketId::Other => match self.other {
                OtherRule::BpsOfGdp { .. } => 0.0,
                OtherRule::ShareOfDebt { share, .. } => share,
            },
        }
    }

    /// A bucket's lag half-life in months.
    pub fn half_life(&self, bucket: BucketId) -> f64 {
        match bucket {
            BucketId::Short => self.hl_short,
            BucketId::NotesBonds => self.hl_notes_bonds,
            BucketId::Tips => self.hl_tips,
            BucketId::Other => match self.other {
                OtherRule::BpsOfGdp { .. } => 0.0,
                OtherRule::ShareOfDebt { half_life, .. } => half_life,
            },
        }
    }

    /// Sum of all debt-share-driven bucket shares. A rule-based OTHER is
    /// excluded; a share-based OTHER counts.
    pub fn share_sum(&self) -> f64 {
        BucketId::ALL.iter().map(|&b| self.share(b)).sum()
    }

    /// Check every invariant a run depends on. Called by the engine before
    /// the first month; a violation is fatal, never silently corrected.
    pub fn validate(&self) -> Result<(), ModelError> {
        for &bucket in &BucketId::ALL {
            let hl = self.half_life(bucket);
            if !hl.is_finite() || hl < 0.0 {
                return Err(ModelError::config(format!(
                    "{} half-life must be finite and non-negative, got {hl}",
                    bucket.name()
                )));
            }
            let share = self.share(bucket);
            if !share.is_finite() || !(0.0..=1.0).contains(&share) {
                return Err(ModelError::config(format!(
                    "{} share must be in [0, 1], got {share}",
                    bucket.name()
                )));
            }
        }

        let sum = self.share_sum();
        if sum > 1.0 + SHARE_SUM_EPS {
            return Err(ModelError::config(format!(
                "bucket shares sum to {sum}, must be <= 1"
            )));
        }

        let weight_sum: f64 = self.curve_weights.iter().sum();
        if self.curve_weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || (weight_sum - 1.0).abs() > 1e-6
        {
            return Err(ModelError::config(format!(
                "curve mixing weights {:?} must be non-negative and sum to 1",
                self.curve_weights
            )));
        }

        if !self.tips_coupon.is_finite() {
            return Err(ModelError::config("TIPS coupon must be finite"));
        }
        if let OtherRule::BpsOfGdp { bps } = self.other {
            if !bps.is_finite() {
                return Err(ModelError::config("OTHER bps-of-GDP scalar must be finite"));
            }
        }

        Ok(())
    }
}

/// Output of a calibration run: the fitted parameters plus how well the
/// search did. Immutable configuration from here on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibratedParams {
    pub params: ModelParams,
    /// Weighted FY+CY squared-error loss of the best candidate.
    pub loss: f64,
    /// Relative RMS error on the FY objective, the convergence measure.
    pub rel_rmse: f64,
    /// False when the best candidate missed the configured tolerance; the
    /// best-found parameters are still returned.
    pub converged: bool,
    /// Number of candidate parameter vectors scored.
    pub evaluated: usize,
}
