//! Linear least squares solver.
//!
//! Used to seed the exponential fit: taking logs of `y = a·exp(±b·x)` gives the
//! straight line `ln y = ln a ± b·x`, which we solve as an ordinary least squares
//! problem:
//!
//! ```text
//! minimize Σ (ln y_i - [1, x_i] · β)^2
//! ```
//!
//! Implementation choices:
//! - SVD handles tall design matrices (many rows, two columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Near-singular designs (all x nearly equal) are retried with looser
//!   tolerances before giving up.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `ln y = c0 + c1·x` and return `(c0, c1)`.
///
/// Callers must ensure every `y` is strictly positive.
pub fn log_linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { x[i] });
    let rhs = DVector::from_iterator(n, y.iter().take(n).map(|v| v.ln()));
    let beta = solve_least_squares(&design, &rhs)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn log_linear_fit_recovers_exponential_rate() {
        let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * (-0.4 * v).exp()).collect();
        let (c0, c1) = log_linear_fit(&x, &y).unwrap();
        assert!((c0 - 2.0f64.ln()).abs() < 1e-9);
        assert!((c1 + 0.4).abs() < 1e-9);
    }
}
