//! Levenberg–Marquardt fit of the exponential model.
//!
//! Given the (bin-center, aggregate) points we minimise
//!
//! ```text
//! Σ (y_i - f(x_i; a, b))^2
//! ```
//!
//! with `f` one of the `ExpModel` variants. Each iteration solves the damped
//! normal equations `(JᵀJ + λ·diag(JᵀJ)) δ = Jᵀr` for the 2-parameter step.
//! Accepted steps shrink λ, rejected steps grow it.
//!
//! Stopping rules:
//! - converged: relative SSE reduction `<= ftol`, relative step `<= xtol`, or an
//!   exact fit (SSE = 0)
//! - converged: no step can reduce SSE and the residual is orthogonal to the
//!   Jacobian columns (a stationary point)
//! - `FitDivergence`: iteration budget exhausted, no descent possible away from a
//!   stationary point, or non-finite values

use nalgebra::{Matrix2, Vector2};
use tracing::{debug, warn};

use crate::domain::{AggregatePoint, ExpModel, FitOptions, FitQuality, FitResult, InitialGuess};
use crate::error::AnalysisError;
use crate::fit::seed::{seed_rate, sse};
use crate::math::summary;
use crate::models::fill_jacobian_row;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;
/// Cosine between residual and Jacobian columns below which a stalled solve
/// counts as a stationary point.
const GTOL: f64 = 1e-6;

/// Fit the model to aggregate points.
pub fn fit(
    points: &[AggregatePoint],
    model: ExpModel,
    guess: InitialGuess,
    opts: &FitOptions,
) -> Result<FitResult, AnalysisError> {
    let x: Vec<f64> = points.iter().map(|p| p.x).collect();
    let y: Vec<f64> = points.iter().map(|p| p.y).collect();
    fit_xy(&x, &y, model, guess, opts)
}

/// Fit the model to raw `(x, y)` series.
pub fn fit_xy(
    x: &[f64],
    y: &[f64],
    model: ExpModel,
    guess: InitialGuess,
    opts: &FitOptions,
) -> Result<FitResult, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if opts.max_iterations == 0 {
        return Err(AnalysisError::invalid_parameter("max_iterations", 0, "must be > 0"));
    }
    for (name, v) in [("a0", guess.a), ("b0", guess.b)] {
        if let Some(v) = v {
            if !v.is_finite() {
                return Err(AnalysisError::invalid_parameter(name, v, "initial guess must be finite"));
            }
        }
    }
    if let Some((i, &v)) = x.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(AnalysisError::InvalidDomain(format!("x[{i}] = {v} is not finite")));
    }
    if let Some((i, &v)) = y.iter().enumerate().find(|(_, v)| !(v.is_finite() && **v > 0.0)) {
        return Err(AnalysisError::InvalidDomain(format!(
            "exponential fit needs finite y > 0, y[{i}] = {v}"
        )));
    }

    let (Some(x_min), Some(x_max)) = (summary::min(x), summary::max(x)) else {
        return Err(AnalysisError::InsufficientData("no points to fit".to_string()));
    };
    if x_max <= x_min {
        return Err(AnalysisError::InsufficientData(format!(
            "exponential fit needs at least 2 distinct x values, got {} point(s) at x = {x_min}",
            x.len()
        )));
    }

    let a0 = match guess.a {
        Some(a) => a,
        None => summary::max(y).unwrap_or(1.0),
    };
    let b0 = match guess.b {
        Some(b) => b,
        None => match seed_rate(model, x, y, x_max - x_min)? {
            Some(seed) => seed.b,
            None => {
                warn!("rate seed search found no finite candidate; starting from b = 0");
                0.0
            }
        },
    };
    debug!(a0, b0, model = model.display_name(), n = x.len(), "starting Levenberg-Marquardt");

    let solution = levenberg_marquardt(model, x, y, Vector2::new(a0, b0), opts)?;

    let n = x.len();
    let covariance = covariance(&solution.jtj, solution.sse, n);
    let rmse = (solution.sse / n as f64).sqrt();
    let r_squared = r_squared(y, solution.sse);

    debug!(
        a = solution.params[0],
        b = solution.params[1],
        sse = solution.sse,
        iterations = solution.iterations,
        "fit converged"
    );

    Ok(FitResult {
        model,
        a: solution.params[0],
        b: solution.params[1],
        covariance,
        quality: FitQuality {
            sse: solution.sse,
            rmse,
            r_squared,
            n,
            iterations: solution.iterations,
        },
    })
}

#[derive(Debug, Clone)]
struct Solution {
    params: Vector2<f64>,
    sse: f64,
    /// `JᵀJ` at the solution (for the covariance).
    jtj: Matrix2<f64>,
    iterations: usize,
}

fn levenberg_marquardt(
    model: ExpModel,
    x: &[f64],
    y: &[f64],
    p0: Vector2<f64>,
    opts: &FitOptions,
) -> Result<Solution, AnalysisError> {
    let mut p = p0;
    let mut cost = sse(model, x, y, p[0], p[1]);
    if !cost.is_finite() {
        return Err(AnalysisError::FitDivergence {
            iterations: 0,
            last_estimate: None,
        });
    }

    let y_scale: f64 = y.iter().map(|v| v * v).sum();
    let mut lambda = LAMBDA_INIT;

    for iteration in 1..=opts.max_iterations {
        let (jtj, jtr) = normal_equations(model, x, y, &p);
        if cost == 0.0 {
            return Ok(Solution {
                params: p,
                sse: cost,
                jtj,
                iterations: iteration - 1,
            });
        }

        // Inner loop: grow λ until a step reduces the SSE.
        loop {
            let mut damped = jtj;
            for i in 0..2 {
                damped[(i, i)] += lambda * jtj[(i, i)].max(f64::MIN_POSITIVE);
            }

            let step = damped.lu().solve(&jtr);
            let trial = step.map(|delta| (delta, p + delta));
            let accepted = trial.and_then(|(delta, candidate)| {
                let trial_cost = sse(model, x, y, candidate[0], candidate[1]);
                (trial_cost.is_finite() && trial_cost < cost).then_some((delta, candidate, trial_cost))
            });

            if let Some((delta, candidate, trial_cost)) = accepted {
                let reduction = cost - trial_cost;
                let small_cost_change = reduction <= opts.ftol * cost;
                let small_step = delta.norm() <= opts.xtol * (p.norm() + opts.xtol);

                p = candidate;
                cost = trial_cost;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if small_cost_change || small_step || cost == 0.0 {
                    let (jtj, _) = normal_equations(model, x, y, &p);
                    return Ok(Solution {
                        params: p,
                        sse: cost,
                        jtj,
                        iterations: iteration,
                    });
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No step reduces the SSE. That is a minimum only if the gradient
                // vanishes or the residual is at rounding level.
                if cost <= f64::EPSILON * y_scale || is_stationary(&jtj, &jtr, cost) {
                    return Ok(Solution {
                        params: p,
                        sse: cost,
                        jtj,
                        iterations: iteration,
                    });
                }
                return Err(AnalysisError::FitDivergence {
                    iterations: iteration,
                    last_estimate: finite_estimate(&p),
                });
            }
        }
    }

    Err(AnalysisError::FitDivergence {
        iterations: opts.max_iterations,
        last_estimate: finite_estimate(&p),
    })
}

/// `JᵀJ` and `Jᵀr` with `r = y - f(x)`.
fn normal_equations(model: ExpModel, x: &[f64], y: &[f64], p: &Vector2<f64>) -> (Matrix2<f64>, Vector2<f64>) {
    let mut jtj = Matrix2::zeros();
    let mut jtr = Vector2::zeros();
    let mut row = [0.0; 2];
    for (&xi, &yi) in x.iter().zip(y) {
        fill_jacobian_row(model, xi, p[0], p[1], &mut row);
        let r = yi - crate::models::predict(model, xi, p[0], p[1]);
        for i in 0..2 {
            jtr[i] += row[i] * r;
            for j in 0..2 {
                jtj[(i, j)] += row[i] * row[j];
            }
        }
    }
    (jtj, jtr)
}

fn is_stationary(jtj: &Matrix2<f64>, jtr: &Vector2<f64>, cost: f64) -> bool {
    let r_norm = cost.sqrt();
    (0..2).all(|j| {
        let col_norm = jtj[(j, j)].sqrt();
        if col_norm == 0.0 || r_norm == 0.0 {
            return true;
        }
        (jtr[j].abs() / (col_norm * r_norm)) <= GTOL
    })
}

/// `(JᵀJ)⁻¹ · SSE / (n - 2)`; infinite when it cannot be estimated.
fn covariance(jtj: &Matrix2<f64>, sse: f64, n: usize) -> Matrix2<f64> {
    let unknown = Matrix2::repeat(f64::INFINITY);
    if n <= 2 {
        return unknown;
    }
    let s2 = sse / (n - 2) as f64;
    match jtj.try_inverse() {
        Some(inv) if inv.iter().all(|v| v.is_finite()) => inv * s2,
        _ => unknown,
    }
}

fn r_squared(y: &[f64], sse: f64) -> Option<f64> {
    let m = summary::mean(y)?;
    let sst: f64 = y.iter().map(|v| (v - m) * (v - m)).sum();
    (sst > 0.0).then(|| 1.0 - sse / sst)
}

fn finite_estimate(p: &Vector2<f64>) -> Option<[f64; 2]> {
    (p[0].is_finite() && p[1].is_finite()).then(|| [p[0], p[1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::predict;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn decay_points(a: f64, b: f64, noise: f64, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, noise).unwrap();
        let x: Vec<f64> = (0..=100).map(|i| i as f64 * 0.1).collect();
        let y = x
            .iter()
            .map(|&xi| predict(ExpModel::Decay, xi, a, b) + normal.sample(&mut rng))
            .collect();
        (x, y)
    }

    #[test]
    fn recovers_noisy_decay_within_five_percent() {
        let (x, y) = decay_points(5.0, 0.3, 0.01, 7);
        let fit = fit_xy(&x, &y, ExpModel::Decay, InitialGuess::default(), &FitOptions::default()).unwrap();
        assert!((fit.a - 5.0).abs() / 5.0 < 0.05, "a = {}", fit.a);
        assert!((fit.b - 0.3).abs() / 0.3 < 0.05, "b = {}", fit.b);
        assert!(fit.quality.r_squared.unwrap() > 0.99);
        let [se_a, se_b] = fit.std_errors();
        assert!(se_a.is_finite() && se_a > 0.0);
        assert!(se_b.is_finite() && se_b > 0.0);
    }

    #[test]
    fn growth_convention_reports_negative_rate() {
        let (x, y) = decay_points(5.0, 0.3, 0.01, 11);
        let fit = fit_xy(&x, &y, ExpModel::Growth, InitialGuess::default(), &FitOptions::default()).unwrap();
        assert!((fit.b + 0.3).abs() / 0.3 < 0.05, "b = {}", fit.b);
        assert!((fit.predict(2.0) - predict(ExpModel::Decay, 2.0, 5.0, 0.3)).abs() < 0.05);
    }

    #[test]
    fn exact_data_is_fit_exactly_from_a_caller_seed() {
        let (x, y) = decay_points(2.0, 1.2, 0.0, 0);
        let guess = InitialGuess {
            a: Some(1.0),
            b: Some(1.0),
        };
        let fit = fit_xy(&x, &y, ExpModel::Decay, guess, &FitOptions::default()).unwrap();
        assert!((fit.a - 2.0).abs() < 1e-6);
        assert!((fit.b - 1.2).abs() < 1e-6);
        assert!(fit.quality.sse < 1e-12);
    }

    #[test]
    fn fit_from_aggregate_points() {
        let points: Vec<AggregatePoint> = (0..20)
            .map(|k| {
                let x = (k as f64 + 0.5) * 0.5;
                AggregatePoint {
                    bucket: k,
                    x,
                    y: predict(ExpModel::Decay, x, 3.0, 0.2),
                    count: 1,
                }
            })
            .collect();
        let fit = fit(&points, ExpModel::Decay, InitialGuess::default(), &FitOptions::default()).unwrap();
        assert!((fit.a - 3.0).abs() < 1e-6);
        assert!((fit.b - 0.2).abs() < 1e-6);
        assert_eq!(fit.quality.n, 20);
    }

    #[test]
    fn non_positive_y_is_invalid_domain() {
        let err = fit_xy(
            &[0.0, 1.0, 2.0],
            &[1.0, 0.0, 0.5],
            ExpModel::Decay,
            InitialGuess::default(),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDomain(_)));

        let err = fit_xy(
            &[0.0, 1.0],
            &[1.0, -2.0],
            ExpModel::Decay,
            InitialGuess::default(),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDomain(_)));
    }

    #[test]
    fn single_distinct_x_is_insufficient() {
        let err = fit_xy(
            &[1.0, 1.0, 1.0],
            &[1.0, 2.0, 3.0],
            ExpModel::Decay,
            InitialGuess::default(),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));

        let err = fit(&[], ExpModel::Decay, InitialGuess::default(), &FitOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn exhausted_budget_reports_divergence_with_estimate() {
        let (x, y) = decay_points(5.0, 0.3, 0.01, 3);
        let guess = InitialGuess {
            a: Some(0.01),
            b: Some(-2.0),
        };
        let opts = FitOptions {
            max_iterations: 1,
            ..FitOptions::default()
        };
        match fit_xy(&x, &y, ExpModel::Decay, guess, &opts) {
            Err(AnalysisError::FitDivergence {
                iterations,
                last_estimate,
            }) => {
                assert_eq!(iterations, 1);
                assert!(last_estimate.is_some());
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn two_points_have_unknown_covariance() {
        let fit = fit_xy(
            &[0.0, 1.0],
            &[2.0, 1.0],
            ExpModel::Decay,
            InitialGuess::default(),
            &FitOptions::default(),
        )
        .unwrap();
        assert!((fit.a - 2.0).abs() < 1e-6);
        assert!((fit.b - 2f64.ln()).abs() < 1e-6);
        assert!(fit.covariance.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn zero_iteration_budget_is_rejected() {
        let opts = FitOptions {
            max_iterations: 0,
            ..FitOptions::default()
        };
        assert!(matches!(
            fit_xy(&[0.0, 1.0], &[1.0, 2.0], ExpModel::Decay, InitialGuess::default(), &opts),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }
}
