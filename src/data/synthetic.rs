//! Synthetic raster pairs with a known exponential relationship.
//!
//! Cell values of band A are drawn uniformly from `[0, x_max]`; band B follows
//! `a · exp(-b · x)` scaled by a log-normal noise factor, so the binned maxima sit
//! close to the true curve. A fraction of cells in each band is set to the
//! nodata sentinel.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::{MemorySource, RawBand};
use crate::error::AnalysisError;

/// Sentinel written into synthetic nodata cells.
pub const SYNTHETIC_NODATA: f64 = -9999.0;

/// Generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticParams {
    pub rows: usize,
    pub cols: usize,
    pub seed: u64,
    /// True amplitude `a`.
    pub amplitude: f64,
    /// True decay rate `b`.
    pub rate: f64,
    /// Upper bound of band A values.
    pub x_max: f64,
    /// Standard deviation of the log-noise applied to band B.
    pub noise: f64,
    /// Probability that a cell is nodata (drawn independently per band).
    pub nodata_prob: f64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            rows: 120,
            cols: 140,
            seed: 42,
            amplitude: 5.0,
            rate: 0.3,
            x_max: 10.0,
            noise: 0.05,
            nodata_prob: 0.05,
        }
    }
}

/// A generated pair of bands.
#[derive(Debug, Clone)]
pub struct SyntheticPair {
    pub a: RawBand,
    pub b: RawBand,
}

impl SyntheticPair {
    pub fn generate(params: &SyntheticParams) -> Result<Self, AnalysisError> {
        if params.rows == 0 || params.cols == 0 {
            return Err(AnalysisError::invalid_parameter(
                "rows/cols",
                format!("{}x{}", params.rows, params.cols),
                "must be > 0",
            ));
        }
        if !(params.x_max.is_finite() && params.x_max > 0.0) {
            return Err(AnalysisError::invalid_parameter("x_max", params.x_max, "must be finite and > 0"));
        }
        if !(0.0..1.0).contains(&params.nodata_prob) {
            return Err(AnalysisError::invalid_parameter(
                "nodata_prob",
                params.nodata_prob,
                "must be in [0, 1)",
            ));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let normal = Normal::new(0.0, params.noise.max(0.0))
            .map_err(|e| AnalysisError::invalid_parameter("noise", params.noise, e.to_string()))?;

        let cells = params.rows * params.cols;
        let mut a = Vec::with_capacity(cells);
        let mut b = Vec::with_capacity(cells);

        for _ in 0..cells {
            let x = rng.gen_range(0.0..=params.x_max);
            let z: f64 = normal.sample(&mut rng);
            let y = params.amplitude * (-params.rate * x).exp() * z.exp();

            a.push(if rng.gen_bool(params.nodata_prob) { SYNTHETIC_NODATA } else { x });
            b.push(if rng.gen_bool(params.nodata_prob) { SYNTHETIC_NODATA } else { y });
        }

        Ok(Self {
            a: RawBand::new(params.rows, params.cols, a, Some(SYNTHETIC_NODATA))?,
            b: RawBand::new(params.rows, params.cols, b, Some(SYNTHETIC_NODATA))?,
        })
    }

    /// Serve the pair from memory under the given paths.
    pub fn into_source(self, path_a: &str, path_b: &str) -> MemorySource {
        MemorySource::new().with_band(path_a, self.a).with_band(path_b, self.b)
    }
}
