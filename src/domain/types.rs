//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a pipeline run
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// Exponential model variant fitted to the binned aggregates.
///
/// Both sign conventions describe the same family of curves; they differ in how
/// the rate parameter `b` is reported. A decaying relationship fitted with
/// `Decay` yields `b > 0`, fitted with `Growth` it yields `b < 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExpModel {
    /// `y = a · exp(-b · x)`
    Decay,
    /// `y = a · exp(b · x)`
    Growth,
}

impl ExpModel {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ExpModel::Decay => "a*exp(-b*x)",
            ExpModel::Growth => "a*exp(b*x)",
        }
    }

    /// Sign applied to `b` inside the exponent.
    pub fn rate_sign(self) -> f64 {
        match self {
            ExpModel::Decay => -1.0,
            ExpModel::Growth => 1.0,
        }
    }
}

/// Reduction applied to the paired values that fall in one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    Max,
    Min,
    Mean,
    Median,
}

/// One half-open interval `[lower, upper)` of the independent variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
}

impl Bucket {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// One reduced value per non-empty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatePoint {
    /// 0-based bucket index.
    pub bucket: usize,
    /// Bucket center, `(k + 0.5) · bin_width`.
    pub x: f64,
    /// Reduced paired value (maximum by default).
    pub y: f64,
    /// Number of paired values that fell into the bucket.
    pub count: usize,
}

/// Pearson correlation of the validated pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub n: usize,
}

/// Starting point for the nonlinear solver.
///
/// Unset fields fall back to defaults: `a0 = max(y)` and a `b0` picked by a
/// deterministic seed search. A poor explicit seed is the most common reason for
/// a `FitDivergence`; choosing it well is the caller's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub a: Option<f64>,
    pub b: Option<f64>,
}

/// Solver limits for the curve fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// Relative SSE reduction below which the solver stops.
    pub ftol: f64,
    /// Relative step size below which the solver stops.
    pub xtol: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// `None` when the observed y has no variance.
    pub r_squared: Option<f64>,
    pub n: usize,
    pub iterations: usize,
}

/// Outcome of the nonlinear regression.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: ExpModel,
    pub a: f64,
    pub b: f64,
    /// Parameter covariance, ordered `(a, b)`.
    pub covariance: Matrix2<f64>,
    pub quality: FitQuality,
}

impl FitResult {
    pub fn params(&self) -> [f64; 2] {
        [self.a, self.b]
    }

    /// One-sigma standard errors from the covariance diagonal.
    pub fn std_errors(&self) -> [f64; 2] {
        [self.covariance[(0, 0)].sqrt(), self.covariance[(1, 1)].sqrt()]
    }

    pub fn predict(&self, x: f64) -> f64 {
        crate::models::predict(self.model, x, self.a, self.b)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `GRIDCORR_*` environment).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Raster providing the independent (binned) variable.
    pub raster_a: PathBuf,
    /// Raster providing the paired (reduced) variable.
    pub raster_b: PathBuf,
    pub target_width: usize,
    pub target_height: usize,

    pub bin_width: f64,
    pub reduction: Reduction,
    /// Outlier threshold multiplier (`mean + sigma · std`).
    pub outlier_sigma: f64,

    pub model: ExpModel,
    pub initial_guess: InitialGuess,
    pub fit_options: FitOptions,
}

impl AnalysisConfig {
    pub const DEFAULT_WIDTH: usize = 275;
    pub const DEFAULT_HEIGHT: usize = 254;
    pub const DEFAULT_BIN_WIDTH: f64 = 0.001;
    pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

    pub fn new(raster_a: impl Into<PathBuf>, raster_b: impl Into<PathBuf>) -> Self {
        Self {
            raster_a: raster_a.into(),
            raster_b: raster_b.into(),
            target_width: Self::DEFAULT_WIDTH,
            target_height: Self::DEFAULT_HEIGHT,
            bin_width: Self::DEFAULT_BIN_WIDTH,
            reduction: Reduction::Max,
            outlier_sigma: Self::DEFAULT_OUTLIER_SIGMA,
            model: ExpModel::Decay,
            initial_guess: InitialGuess::default(),
            fit_options: FitOptions::default(),
        }
    }
}

/// Summary stats about the paired samples a run actually used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub cols: usize,
    pub cells: usize,
    pub valid_a: usize,
    pub valid_b: usize,
    pub valid_pairs: usize,
}

/// A saved result file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub raster_a: String,
    pub raster_b: String,
    pub stats: DatasetStats,
    pub correlation: Correlation,
    pub binning: Option<BinningSummary>,
    pub points: Vec<AggregatePoint>,
    pub fit: Option<FitSummary>,
    pub grid: Option<CurveGrid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningSummary {
    pub bin_width: f64,
    pub reduction: Reduction,
    pub outlier_sigma: f64,
    pub outlier_threshold: Option<f64>,
    pub buckets: usize,
    pub outliers_removed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub model: ExpModel,
    pub display_name: String,
    pub a: f64,
    pub b: f64,
    /// `None` when the covariance could not be estimated (n <= 2 or singular).
    pub covariance: Option<[[f64; 2]; 2]>,
    pub quality: FitQuality,
}

impl From<&FitResult> for FitSummary {
    fn from(fit: &FitResult) -> Self {
        let c = &fit.covariance;
        let covariance = c
            .iter()
            .all(|v| v.is_finite())
            .then(|| [[c[(0, 0)], c[(0, 1)]], [c[(1, 0)], c[(1, 1)]]]);
        Self {
            model: fit.model,
            display_name: fit.model.display_name().to_string(),
            a: fit.a,
            b: fit.b,
            covariance,
            quality: fit.quality,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
