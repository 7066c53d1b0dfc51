//! Pearson product-moment correlation.

use crate::domain::Correlation;
use crate::error::AnalysisError;
use crate::math::summary::mean;

/// Pearson correlation of two equal-length series.
///
/// Computed as `Σ dx·dy / sqrt(Σ dx² · Σ dy²)` with deviations from the means,
/// which is symmetric in its arguments bit-for-bit. The result is clamped to
/// `[-1, 1]` to absorb rounding.
pub fn correlate(x: &[f64], y: &[f64]) -> Result<Correlation, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "correlation needs at least 2 valid pairs, got {n}"
        )));
    }

    let (Some(mx), Some(my)) = (mean(x), mean(y)) else {
        return Err(AnalysisError::InsufficientData("no values to correlate".to_string()));
    };

    // Deviations are divided by their largest magnitude so the sums of squares
    // cannot overflow; r is scale invariant.
    let (sx, sy) = (max_abs_deviation(x, mx), max_abs_deviation(y, my));
    if sx == 0.0 || sy == 0.0 {
        let which = match (sx == 0.0, sy == 0.0) {
            (true, true) => "both series are",
            (true, false) => "first series is",
            _ => "second series is",
        };
        return Err(AnalysisError::DegenerateInput(format!(
            "{which} constant; correlation is undefined"
        )));
    }

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = (xi - mx) / sx;
        let dy = (yi - my) / sy;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if !(sxy.is_finite() && sxx.is_finite() && syy.is_finite()) {
        return Err(AnalysisError::DegenerateInput(
            "non-finite sums of squares (check for infinite inputs)".to_string(),
        ));
    }

    let r = sxy / (sxx * syy).sqrt();
    if !r.is_finite() {
        return Err(AnalysisError::DegenerateInput(
            "non-finite correlation (check for infinite inputs)".to_string(),
        ));
    }

    Ok(Correlation {
        coefficient: r.clamp(-1.0, 1.0),
        n,
    })
}

fn max_abs_deviation(values: &[f64], m: f64) -> f64 {
    values.iter().fold(0.0, |acc: f64, &v| acc.max((v - m).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_one() {
        let x = [0.3, 1.7, 2.2, 9.1, 4.4];
        let r = correlate(&x, &x).unwrap();
        assert!((r.coefficient - 1.0).abs() < 1e-12);
        assert_eq!(r.n, 5);
    }

    #[test]
    fn symmetric_in_arguments() {
        let x = [1.0, 2.0, 4.0, 8.0, 3.0];
        let y = [2.5, 1.0, 7.0, 6.0, 0.5];
        let rxy = correlate(&x, &y).unwrap().coefficient;
        let ryx = correlate(&y, &x).unwrap().coefficient;
        assert_eq!(rxy, ryx);
        assert!((-1.0..=1.0).contains(&rxy));
    }

    #[test]
    fn perfect_negative_relationship() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert!((correlate(&x, &y).unwrap().coefficient + 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_value() {
        // x = [1,2,3], y = [1,3,2]: Sxy = 1, Sxx = 2, Syy = 2 -> r = 0.5
        let r = correlate(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();
        assert!((r.coefficient - 0.5).abs() < 1e-12);
    }

    #[test]
    fn huge_values_do_not_overflow_to_zero() {
        // Unscaled, Σdx² overflows to inf and r collapses to -0.0.
        let r = correlate(&[1e200, -1e200, 0.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((r.coefficient + 0.5).abs() < 1e-12, "r = {}", r.coefficient);

        let r = correlate(&[1e300, 2e300, 3e300], &[3e-300, 1e-300, 2e-300]).unwrap();
        assert!((r.coefficient + 0.5).abs() < 1e-12, "r = {}", r.coefficient);
    }

    #[test]
    fn infinite_input_is_degenerate() {
        let err = correlate(&[1.0, f64::INFINITY, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }

    #[test]
    fn constant_series_is_degenerate() {
        let err = correlate(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }

    #[test]
    fn too_few_pairs_is_insufficient() {
        assert!(matches!(
            correlate(&[], &[]),
            Err(AnalysisError::InsufficientData(_))
        ));
        assert!(matches!(
            correlate(&[1.0], &[2.0]),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn unequal_lengths_are_rejected() {
        assert!(matches!(
            correlate(&[1.0, 2.0], &[1.0]),
            Err(AnalysisError::LengthMismatch { .. })
        ));
    }
}
