//! Per-bucket monthly interest accrual rules
//!
//! Rates are annual decimals except TIPS inflation, which is already a
//! monthly rate (hence no /12 on the inflation term; the coupon is annual
//! and is divided). Negative effective rates propagate as negative interest;
//! nothing here clamps.

use crate::macro_input::MacroPoint;

use super::params::{BucketId, ModelParams, OtherRule};

/// Annual-rate share bucket (SHORT, NOTES_BONDS, share-based OTHER).
pub fn share_bucket_interest(effective_rate: f64, debt_start: f64, share: f64) -> f64 {
    effective_rate * debt_start * share / 12.0
}

/// TIPS accrual: monthly inflation on the adjusted principal plus an
/// optional annual coupon.
pub fn tips_interest(
    effective_inflation_m: f64,
    coupon_annual: f64,
    debt_start: f64,
    share: f64,
) -> f64 {
    (effective_inflation_m + coupon_annual / 12.0) * debt_start * share
}

/// OTHER under the GDP rule: basis points of annual GDP per year.
pub fn gdp_rule_interest(bps: f64, nominal_gdp: f64) -> f64 {
    bps / 10_000.0 / 12.0 * nominal_gdp
}

/// NOTES_BONDS raw market rate: a fixed weighted blend of the 2y/5y/10y
/// curve components.
pub fn blended_curve_rate(point: &MacroPoint, weights: &[f64; 3]) -> f64 {
    weights[0] * point.r_2y + weights[1] * point.r_5y + weights[2] * point.r_10y
}

/// Uniform accrual dispatch: one bucket's interest for one month.
///
/// `filtered_rate` is the bucket's lag-filtered input for this month: the
/// smoothed short rate for SHORT (and share-based OTHER), the smoothed curve
/// blend for NOTES_BONDS, the smoothed monthly inflation for TIPS. It is
/// ignored by the GDP-rule OTHER bucket.
pub fn monthly_interest(
    bucket: BucketId,
    params: &ModelParams,
    point: &MacroPoint,
    filtered_rate: f64,
    debt_start: f64,
) -> f64 {
    match bucket {
        BucketId::Short => share_bucket_interest(filtered_rate, debt_start, params.share_short),
        BucketId::NotesBonds => {
            share_bucket_interest(filtered_rate, debt_start, params.share_notes_bonds)
        }
        BucketId::Tips => tips_interest(
            filtered_rate,
            params.tips_coupon,
            debt_start,
            params.share_tips,
        ),
        BucketId::Other => match params.other {
            OtherRule::BpsOfGdp { bps } => gdp_rule_interest(bps, point.nominal_gdp),
            OtherRule::ShareOfDebt { share, .. } => {
                share_bucket_interest(filtered_rate, debt_start, share)
            }
        },
    }
}
