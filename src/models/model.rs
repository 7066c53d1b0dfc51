//! Model evaluation for the exponential variants.
//!
//! The fitter relies on two primitive operations:
//! - predict y(x) given `(a, b)` (for residuals/plots)
//! - fill a Jacobian row `[∂f/∂a, ∂f/∂b]` at x (for the Levenberg–Marquardt step)

use crate::domain::ExpModel;

/// Predict `y(x)` for the given model variant.
pub fn predict(model: ExpModel, x: f64, a: f64, b: f64) -> f64 {
    a * (model.rate_sign() * b * x).exp()
}

/// Fill the Jacobian row of the model with respect to `(a, b)`.
pub fn fill_jacobian_row(model: ExpModel, x: f64, a: f64, b: f64, out: &mut [f64; 2]) {
    let s = model.rate_sign();
    let e = (s * b * x).exp();
    out[0] = e;
    out[1] = a * s * x * e;
}

/// Least-squares optimal amplitude for a fixed rate.
///
/// With `b` fixed the model is linear in `a`, so `a = Σ y·e / Σ e²` where
/// `e = exp(±b·x)`. Returns `None` when every basis value underflows.
pub fn optimal_amplitude(model: ExpModel, b: f64, x: &[f64], y: &[f64]) -> Option<f64> {
    let s = model.rate_sign();
    let mut num = 0.0;
    let mut den = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let e = (s * b * xi).exp();
        num += yi * e;
        den += e * e;
    }
    if den > 0.0 && den.is_finite() && num.is_finite() {
        Some(num / den)
    } else {
        None
    }
}
