//! Renderers for pipeline results.
//!
//! The pipeline hands out plain numbers; this module turns them into a `Chart`
//! (series + labels) that any renderer can draw:
//!
//! - `ascii`: fixed-size character grid for the terminal
//! - `svg`: Plotters SVG file

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_plot;
pub use svg::write_svg_plot;

use crate::app::pipeline::{CorrelationRun, GroupedRun};
use crate::domain::ResultFile;

/// Most scatter points a chart keeps; larger series are thinned by a fixed stride.
pub const MAX_SCATTER_POINTS: usize = 5000;

/// Render-only chart description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Observed points (pairs or retained aggregates).
    pub points: Vec<(f64, f64)>,
    /// Points excluded by the outlier trim.
    pub removed: Vec<(f64, f64)>,
    /// Fitted curve, sampled in x order.
    pub curve: Vec<(f64, f64)>,
}

impl Chart {
    /// Scatter of raster A against raster B.
    pub fn from_correlation(run: &CorrelationRun) -> Self {
        let points: Vec<(f64, f64)> = run.pairs.a.iter().copied().zip(run.pairs.b.iter().copied()).collect();
        Self {
            title: format!("A vs B (r = {:.4})", run.correlation.coefficient),
            x_label: "A".to_string(),
            y_label: "B".to_string(),
            points: thin(points),
            removed: Vec::new(),
            curve: Vec::new(),
        }
    }

    /// Aggregates, trimmed outliers and the fitted curve.
    pub fn from_grouped(run: &GroupedRun) -> Self {
        let xy = |p: &crate::domain::AggregatePoint| (p.x, p.y);
        let points: Vec<(f64, f64)> = run.trim.retained.iter().map(xy).collect();
        let removed = run.trim.removed.iter().map(xy).collect();
        let curve = sample_curve(&points, |x| run.fit.predict(x), 200);
        Self {
            title: format!(
                "{:?} of B per A bucket, y = {} (a={:.4}, b={:.4})",
                run.binning.reduction,
                run.fit.model.display_name(),
                run.fit.a,
                run.fit.b
            ),
            x_label: "A (bucket center)".to_string(),
            y_label: "B".to_string(),
            points,
            removed,
            curve,
        }
    }

    /// Re-plot a saved result file.
    pub fn from_result(result: &ResultFile) -> Self {
        let points: Vec<(f64, f64)> = result.points.iter().map(|p| (p.x, p.y)).collect();
        let curve = result
            .grid
            .as_ref()
            .map(|g| g.x.iter().copied().zip(g.y.iter().copied()).collect())
            .unwrap_or_default();
        let title = match &result.fit {
            Some(fit) => format!("y = {} (a={:.4}, b={:.4})", fit.display_name, fit.a, fit.b),
            None => format!("A vs B (r = {:.4})", result.correlation.coefficient),
        };
        Self {
            title,
            x_label: "A".to_string(),
            y_label: "B".to_string(),
            points,
            removed: Vec::new(),
            curve,
        }
    }

    /// Bounds over every series, `None` when there is nothing finite to draw.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for &(px, py) in self.points.iter().chain(&self.removed).chain(&self.curve) {
            if !(px.is_finite() && py.is_finite()) {
                continue;
            }
            x = [x[0].min(px), x[1].max(px)];
            y = [y[0].min(py), y[1].max(py)];
        }
        (x[0].is_finite() && y[0].is_finite()).then_some((x, y))
    }
}

fn thin(points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if points.len() <= MAX_SCATTER_POINTS {
        return points;
    }
    let stride = points.len().div_ceil(MAX_SCATTER_POINTS);
    points.into_iter().step_by(stride).collect()
}

fn sample_curve(points: &[(f64, f64)], f: impl Fn(f64) -> f64, n: usize) -> Vec<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    if !(lo.is_finite() && hi.is_finite()) {
        return Vec::new();
    }
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (n as f64 - 1.0);
            (x, f(x))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thinning_caps_scatter_size() {
        let pts: Vec<(f64, f64)> = (0..12_001).map(|i| (i as f64, 0.0)).collect();
        let out = thin(pts);
        assert!(out.len() <= MAX_SCATTER_POINTS);
        assert_eq!(out[0], (0.0, 0.0));
    }

    #[test]
    fn bounds_cover_all_series_and_skip_non_finite() {
        let chart = Chart {
            points: vec![(1.0, 2.0), (f64::NAN, 100.0)],
            removed: vec![(3.0, 9.0)],
            curve: vec![(0.5, 1.0)],
            ..Chart::default()
        };
        assert_eq!(chart.bounds(), Some(([0.5, 3.0], [1.0, 9.0])));
        assert_eq!(Chart::default().bounds(), None);
    }

    #[test]
    fn curve_samples_span_the_points() {
        let curve = sample_curve(&[(1.0, 0.0), (3.0, 0.0)], |x| 2.0 * x, 5);
        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0], (1.0, 2.0));
        assert_eq!(curve[4], (3.0, 6.0));
    }
}
