//! Per-bucket reduction of the paired series.
//!
//! The reduction is a strategy: anything implementing `Reducer` works, including
//! the built-in `Reduction` variants and plain closures over `&[f64]`.

use std::collections::BTreeMap;

use crate::binning::Binning;
use crate::domain::{AggregatePoint, Reduction};
use crate::error::AnalysisError;
use crate::math::summary;

/// Reduces the values of one non-empty bucket to a single number.
pub trait Reducer {
    fn reduce(&self, values: &[f64]) -> f64;
}

impl Reducer for Reduction {
    fn reduce(&self, values: &[f64]) -> f64 {
        let out = match self {
            Reduction::Max => summary::max(values),
            Reduction::Min => summary::min(values),
            Reduction::Mean => summary::mean(values),
            Reduction::Median => summary::median(values),
        };
        out.unwrap_or(f64::NAN)
    }
}

impl<F> Reducer for F
where
    F: Fn(&[f64]) -> f64,
{
    fn reduce(&self, values: &[f64]) -> f64 {
        self(values)
    }
}

/// One point per bucket that received at least one paired value, ordered by
/// bucket index. Empty buckets are omitted.
pub fn aggregate<R: Reducer + ?Sized>(
    binning: &Binning,
    paired_y: &[f64],
    reducer: &R,
) -> Result<Vec<AggregatePoint>, AnalysisError> {
    if binning.assignments.len() != paired_y.len() {
        return Err(AnalysisError::LengthMismatch {
            left: binning.assignments.len(),
            right: paired_y.len(),
        });
    }

    // Sparse: fine bins over a wide range would otherwise allocate mostly-empty buckets.
    let mut groups: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for (&k, &y) in binning.assignments.iter().zip(paired_y) {
        groups.entry(k).or_default().push(y);
    }

    Ok(groups
        .into_iter()
        .map(|(k, values)| AggregatePoint {
            bucket: k,
            x: binning.center(k),
            y: reducer.reduce(&values),
            count: values.len(),
        })
        .collect())
}
