//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{CorrelationRun, GroupedRun};
use crate::domain::{AnalysisConfig, DatasetStats, FitResult};
use crate::report::PointResidual;

/// Summary for a correlation-only run.
pub fn format_correlation_summary(run: &CorrelationRun, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== gridcorr - raster correlation ===\n");
    out.push_str(&format_inputs(config, &run.stats));
    out.push_str(&format!(
        "Pearson r = {:.6} (n={})\n",
        run.correlation.coefficient, run.correlation.n
    ));

    out
}

/// Summary for a grouped run (correlation + binning + fit).
pub fn format_grouped_summary(run: &GroupedRun, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== gridcorr - binned exponential fit ===\n");
    out.push_str(&format_inputs(config, &run.stats));
    out.push_str(&format!(
        "Pearson r = {:.6} (n={})\n",
        run.correlation.coefficient, run.correlation.n
    ));

    out.push_str("\nBinning:\n");
    out.push_str(&format!(
        "- bin width {} | reduction {:?} | {} non-empty bucket(s)\n",
        run.binning.bin_width, run.binning.reduction, run.binning.buckets
    ));
    match run.binning.outlier_threshold {
        Some(t) => out.push_str(&format!(
            "- outliers: {} removed above {:.6} (mean + {}σ)\n",
            run.binning.outliers_removed, t, run.binning.outlier_sigma
        )),
        None => out.push_str("- outliers: none (empty series)\n"),
    }

    out.push('\n');
    out.push_str(&format_fit(&run.fit));

    out
}

/// Fitted parameters and diagnostics.
pub fn format_fit(fit: &FitResult) -> String {
    let mut out = String::new();
    let [se_a, se_b] = fit.std_errors();

    out.push_str(&format!("Model: y = {}\n", fit.model.display_name()));
    out.push_str(&format!("- params: {}\n", fmt_vec(&fit.params())));
    out.push_str(&format!("- stderr: {}\n", fmt_vec(&[se_a, se_b])));
    out.push_str(&format!(
        "- SSE={:.6} RMSE={:.6} R²={} n={} iterations={}\n",
        fit.quality.sse,
        fit.quality.rmse,
        fit.quality
            .r_squared
            .map(|r| format!("{r:.6}"))
            .unwrap_or_else(|| "n/a".to_string()),
        fit.quality.n,
        fit.quality.iterations
    ));

    out
}

/// Table of aggregate points against the fitted curve.
pub fn format_residual_table(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>8} {:>12} {:>12} {:>12} {:>12} {:>8}",
            "bucket", "x", "y", "y_fit", "residual", "count"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<8} {:-<12} {:-<12} {:-<12} {:-<12} {:-<8}",
        "", "", "", "", "", ""
    ));
    out.push('\n');

    for r in rows {
        out.push_str(&format!(
            "{:>8} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>8}",
            r.point.bucket, r.point.x, r.point.y, r.y_fit, r.residual, r.point.count
        ));
        out.push('\n');
    }

    out
}

fn format_inputs(config: &AnalysisConfig, stats: &DatasetStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("A: {}\n", config.raster_a.display()));
    out.push_str(&format!("B: {}\n", config.raster_b.display()));
    out.push_str(&format!(
        "Window: {}x{} (rows x cols) | cells={} | valid A={} B={} both={}\n",
        stats.rows, stats.cols, stats.cells, stats.valid_a, stats.valid_b, stats.valid_pairs
    ));
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
