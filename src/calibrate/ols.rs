//! Least-squares solver for the calibration design matrix
//!
//! The parameter dimension is tiny (3-4 columns), so we solve via SVD, which
//! stays robust when columns are nearly collinear (smoothed short and long
//! rates track each other closely over calm rate regimes).

use nalgebra::{DMatrix, DVector};

/// Solve `min ||y - X beta||^2`, no intercept.
///
/// Returns `None` when the system is too ill-conditioned to solve even at a
/// loose tolerance; the caller skips that candidate.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser tolerances before giving up on the candidate.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_linear_combination() {
        // y = 2*x0 + 3*x1 over 4 observations
        let x = DMatrix::from_row_slice(
            4,
            2,
            &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0],
        );
        let y = DVector::from_row_slice(&[2.0, 3.0, 5.0, 7.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_column_yields_zero_coefficient() {
        // Minimum-norm solution puts nothing on a dead regressor
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-8);
        assert!(beta[1].abs() < 1e-8);
    }
}
