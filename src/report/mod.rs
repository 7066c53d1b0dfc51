//! Reporting utilities: fit residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{AggregatePoint, FitResult};
use crate::error::AppError;

/// One aggregate point next to the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointResidual {
    pub point: AggregatePoint,
    pub y_fit: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for each aggregate point.
pub fn compute_residuals(points: &[AggregatePoint], fit: &FitResult) -> Result<Vec<PointResidual>, AppError> {
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let y_fit = fit.predict(p.x);
        if !y_fit.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(PointResidual {
            point: *p,
            y_fit,
            residual: p.y - y_fit,
        });
    }
    Ok(out)
}

/// The `top_n` points furthest from the curve, largest absolute residual first.
pub fn largest_residuals(residuals: &[PointResidual], top_n: usize) -> Vec<PointResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.residual
            .abs()
            .partial_cmp(&a.residual.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}
