//! Read/write result JSON files.
//!
//! A result file is the portable record of one run:
//! - input paths and dataset counts
//! - correlation, binning parameters and aggregate points
//! - fit parameters plus a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::ResultFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::app::pipeline::{CorrelationRun, GroupedRun};
use crate::domain::{AnalysisConfig, CurveGrid, FitResult, FitSummary, ResultFile};
use crate::error::AppError;

pub const TOOL_NAME: &str = "gridcorr";
const GRID_POINTS: usize = 101;

/// Result record for a correlation-only run.
pub fn correlation_result(run: &CorrelationRun, config: &AnalysisConfig) -> ResultFile {
    ResultFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        raster_a: config.raster_a.display().to_string(),
        raster_b: config.raster_b.display().to_string(),
        stats: run.stats,
        correlation: run.correlation,
        binning: None,
        points: Vec::new(),
        fit: None,
        grid: None,
    }
}

/// Result record for a grouped run. `points` holds the retained aggregates.
pub fn grouped_result(run: &GroupedRun, config: &AnalysisConfig) -> ResultFile {
    let (x_min, x_max) = x_range(&run.trim.retained);
    ResultFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        raster_a: config.raster_a.display().to_string(),
        raster_b: config.raster_b.display().to_string(),
        stats: run.stats,
        correlation: run.correlation,
        binning: Some(run.binning.clone()),
        points: run.trim.retained.clone(),
        fit: Some(FitSummary::from(&run.fit)),
        grid: Some(build_grid(&run.fit, x_min, x_max, GRID_POINTS)),
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, result: &ResultFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;

    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let result: ResultFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))?;
    Ok(result)
}

fn x_range(points: &[crate::domain::AggregatePoint]) -> (f64, f64) {
    points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)))
}

fn build_grid(fit: &FitResult, x_min: f64, x_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-12 {
        x0 = (x0 - 0.5).max(0.0);
        x1 += 0.5;
    }

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let xi = x0 + u * (x1 - x0);
        x.push(xi);
        y.push(fit.predict(xi));
    }

    CurveGrid { x, y }
}
