//! Shared analysis pipeline used by every CLI command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> align -> flatten -> validate -> correlate -> bin -> aggregate -> trim -> fit
//!
//! The stages run strictly in order; the commands only differ in where they stop
//! and how they present the result.

use tracing::{info, warn};

use crate::binning::{Binning, OutlierTrim, aggregate, bin, filter_outliers};
use crate::data::RasterSource;
use crate::domain::{AggregatePoint, AnalysisConfig, BinningSummary, Correlation, DatasetStats, FitResult};
use crate::error::AnalysisError;
use crate::fit::fit;
use crate::grid::{flatten, load};
use crate::stats::{ValidPairs, correlate, validate};

/// Outputs of the correlation-only path.
#[derive(Debug, Clone)]
pub struct CorrelationRun {
    pub stats: DatasetStats,
    pub pairs: ValidPairs,
    pub correlation: Correlation,
}

/// Outputs of the full binned-aggregate path.
#[derive(Debug, Clone)]
pub struct GroupedRun {
    pub stats: DatasetStats,
    pub pairs: ValidPairs,
    pub correlation: Correlation,
    pub binning: BinningSummary,
    /// Every non-empty bucket, before the outlier trim.
    pub aggregates: Vec<AggregatePoint>,
    pub trim: OutlierTrim,
    pub fit: FitResult,
}

/// Load both rasters, pair their valid cells and correlate them.
pub fn run_correlation<S: RasterSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<CorrelationRun, AnalysisError> {
    // 1) Load and align both grids to the common window.
    let grid_a = load(source, &config.raster_a, config.target_width, config.target_height)?;
    let grid_b = load(source, &config.raster_b, config.target_width, config.target_height)?;

    let (rows, cols) = grid_a.shape();
    let valid_a = grid_a.valid_count();
    let valid_b = grid_b.valid_count();

    // 2) Flatten and keep cells valid in both.
    let seq_a = flatten(grid_a);
    let seq_b = flatten(grid_b);
    let pairs = validate(&seq_a, &seq_b)?;

    let stats = DatasetStats {
        rows,
        cols,
        cells: rows * cols,
        valid_a,
        valid_b,
        valid_pairs: pairs.len(),
    };
    let dropped = stats.cells - stats.valid_pairs;
    if dropped > 0 {
        warn!(dropped, cells = stats.cells, "dropped cells that are nodata in either raster");
    }
    if pairs.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no cell is valid in both rasters".to_string(),
        ));
    }

    // 3) Pearson correlation over the paired samples.
    let correlation = correlate(&pairs.a, &pairs.b)?;
    info!(
        rows,
        cols,
        pairs = pairs.len(),
        r = correlation.coefficient,
        "correlation computed"
    );

    Ok(CorrelationRun {
        stats,
        pairs,
        correlation,
    })
}

/// Full pipeline: correlation, then bin A, reduce B per bucket, trim and fit.
pub fn run_grouped<S: RasterSource + ?Sized>(source: &S, config: &AnalysisConfig) -> Result<GroupedRun, AnalysisError> {
    if !(config.outlier_sigma.is_finite() && config.outlier_sigma > 0.0) {
        return Err(AnalysisError::invalid_parameter(
            "outlier_sigma",
            config.outlier_sigma,
            "must be finite and > 0",
        ));
    }

    let CorrelationRun {
        stats,
        pairs,
        correlation,
    } = run_correlation(source, config)?;

    // 4) Bucket the independent variable and reduce the paired values.
    let binning: Binning = bin(&pairs.a, config.bin_width)?;
    let aggregates = aggregate(&binning, &pairs.b, &config.reduction)?;
    info!(
        bin_width = config.bin_width,
        buckets = binning.bucket_count,
        non_empty = aggregates.len(),
        "binned aggregates"
    );

    // 5) Single-pass outlier trim.
    let trim = filter_outliers(&aggregates, config.outlier_sigma);
    if !trim.removed.is_empty() {
        warn!(
            removed = trim.removed.len(),
            threshold = ?trim.threshold,
            "removed outlier aggregates"
        );
    }

    // 6) Exponential fit on what is left.
    let fit = fit(&trim.retained, config.model, config.initial_guess, &config.fit_options)?;
    info!(
        model = config.model.display_name(),
        a = fit.a,
        b = fit.b,
        sse = fit.quality.sse,
        iterations = fit.quality.iterations,
        "exponential fit converged"
    );

    let binning = BinningSummary {
        bin_width: config.bin_width,
        reduction: config.reduction,
        outlier_sigma: config.outlier_sigma,
        outlier_threshold: trim.threshold,
        buckets: aggregates.len(),
        outliers_removed: trim.removed.len(),
    };

    Ok(GroupedRun {
        stats,
        pairs,
        correlation,
        binning,
        aggregates,
        trim,
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemorySource, RawBand, SyntheticPair, SyntheticParams};
    use crate::domain::Reduction;

    fn band(rows: usize, cols: usize, values: Vec<f64>) -> RawBand {
        RawBand::new(rows, cols, values, Some(-1.0)).unwrap()
    }

    #[test]
    fn correlation_run_counts_dropped_cells() {
        let a = band(2, 3, vec![1.0, 2.0, -1.0, 4.0, 5.0, 6.0]);
        let b = band(2, 3, vec![2.0, 4.0, 6.0, f64::NAN, 10.0, 12.0]);
        let source = MemorySource::new().with_band("a", a).with_band("b", b);
        let mut config = AnalysisConfig::new("a", "b");
        config.target_width = 3;
        config.target_height = 2;

        let run = run_correlation(&source, &config).unwrap();
        assert_eq!(run.stats.cells, 6);
        assert_eq!(run.stats.valid_a, 5);
        assert_eq!(run.stats.valid_b, 5);
        assert_eq!(run.stats.valid_pairs, 4);
        assert_eq!(run.pairs.indices, vec![0, 1, 4, 5]);
        assert!((run.correlation.coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_shared_valid_cell_is_insufficient_data() {
        let a = band(1, 2, vec![1.0, -1.0]);
        let b = band(1, 2, vec![-1.0, 2.0]);
        let source = MemorySource::new().with_band("a", a).with_band("b", b);
        let mut config = AnalysisConfig::new("a", "b");
        config.target_width = 2;
        config.target_height = 1;

        assert!(matches!(
            run_correlation(&source, &config),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn grouped_run_recovers_synthetic_relationship() {
        let params = SyntheticParams::default();
        let source = SyntheticPair::generate(&params).unwrap().into_source("a.tif", "b.tif");
        let mut config = AnalysisConfig::new("a.tif", "b.tif");
        config.target_width = params.cols;
        config.target_height = params.rows;
        config.bin_width = 0.25;
        config.reduction = Reduction::Median;

        let run = run_grouped(&source, &config).unwrap();
        assert!(run.correlation.coefficient < 0.0);
        assert_eq!(run.binning.buckets, run.aggregates.len());
        assert_eq!(
            run.trim.retained.len() + run.trim.removed.len(),
            run.aggregates.len()
        );
        assert!((run.fit.a - params.amplitude).abs() / params.amplitude < 0.1, "a = {}", run.fit.a);
        assert!((run.fit.b - params.rate).abs() / params.rate < 0.1, "b = {}", run.fit.b);
    }

    #[test]
    fn non_positive_sigma_is_rejected() {
        let source = MemorySource::new();
        let mut config = AnalysisConfig::new("a", "b");
        config.outlier_sigma = 0.0;
        assert!(matches!(
            run_grouped(&source, &config),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }
}
