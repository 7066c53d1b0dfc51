//! Single-pass outlier trim on the aggregate series.
//!
//! The threshold `mean(y) + sigma · std(y)` is computed once over the full
//! pre-filter series (population std), then every point above it is dropped.
//! There is no re-estimation after removal: repeating the trim until nothing
//! changes is a different algorithm and gives different results.
//!
//! A lone high point among `n` points has a z-score of at most `(n - 1) / sqrt(n)`,
//! so with `sigma = 3` it can only be removed when `n >= 11`.

use tracing::debug;

use crate::domain::AggregatePoint;
use crate::math::summary::{mean, std_dev};

/// Result of the trim.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierTrim {
    pub retained: Vec<AggregatePoint>,
    pub removed: Vec<AggregatePoint>,
    /// `None` for an empty input.
    pub threshold: Option<f64>,
}

/// Drop points whose `y` exceeds `mean + sigma · std` of the whole series.
pub fn filter_outliers(points: &[AggregatePoint], sigma: f64) -> OutlierTrim {
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let (Some(m), Some(s)) = (mean(&ys), std_dev(&ys)) else {
        return OutlierTrim {
            retained: Vec::new(),
            removed: Vec::new(),
            threshold: None,
        };
    };
    let threshold = m + sigma * s;

    let (retained, removed): (Vec<AggregatePoint>, Vec<AggregatePoint>) =
        points.iter().copied().partition(|p| p.y <= threshold);

    debug!(mean = m, std = s, threshold, removed = removed.len(), "outlier trim");

    OutlierTrim {
        retained,
        removed,
        threshold: Some(threshold),
    }
}
