//! Fixed-width bucket assignment.
//!
//! Buckets are half-open intervals `[k·w, (k+1)·w)` starting at 0. Every value
//! is assigned to `k = floor(x / w)`; nothing is dropped.

use crate::domain::Bucket;
use crate::error::AnalysisError;

/// Bucket assignment for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    pub bin_width: f64,
    /// Bucket index per input element.
    pub assignments: Vec<usize>,
    /// Number of buckets covering `[0, max(x)]`.
    pub bucket_count: usize,
}

impl Binning {
    pub fn bucket(&self, index: usize) -> Bucket {
        let lower = index as f64 * self.bin_width;
        Bucket {
            index,
            lower,
            upper: lower + self.bin_width,
        }
    }

    pub fn center(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.bin_width
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Assign each value of `x` to its bucket.
pub fn bin(x: &[f64], bin_width: f64) -> Result<Binning, AnalysisError> {
    if !(bin_width.is_finite() && bin_width > 0.0) {
        return Err(AnalysisError::invalid_parameter(
            "bin_width",
            bin_width,
            "must be finite and > 0",
        ));
    }

    let mut assignments = Vec::with_capacity(x.len());
    let mut max_index = None;
    for (i, &v) in x.iter().enumerate() {
        if !v.is_finite() || v < 0.0 {
            return Err(AnalysisError::InvalidDomain(format!(
                "binned values must be finite and >= 0 (element {i} is {v})"
            )));
        }
        let q = (v / bin_width).floor();
        if q > usize::MAX as f64 {
            return Err(AnalysisError::invalid_parameter(
                "bin_width",
                bin_width,
                format!("too small for value {v}"),
            ));
        }
        let k = q as usize;
        assignments.push(k);
        max_index = Some(max_index.map_or(k, |m: usize| m.max(k)));
    }

    Ok(Binning {
        bin_width,
        assignments,
        bucket_count: max_index.map_or(0, |m| m + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_floor_of_quotient() {
        let binning = bin(&[0.5, 1.5, 1.9, 2.5], 1.0).unwrap();
        assert_eq!(binning.assignments, vec![0, 1, 1, 2]);
        assert_eq!(binning.bucket_count, 3);
    }

    #[test]
    fn boundaries_belong_to_the_upper_bucket() {
        let binning = bin(&[0.0, 1.0, 2.0], 1.0).unwrap();
        assert_eq!(binning.assignments, vec![0, 1, 2]);
    }

    #[test]
    fn buckets_are_contiguous() {
        let binning = bin(&[0.25, 3.9], 0.5).unwrap();
        assert_eq!(binning.bucket_count, 8);
        for k in 1..binning.bucket_count {
            assert_eq!(binning.bucket(k - 1).upper, binning.bucket(k).lower);
        }
        assert_eq!(binning.center(7), 3.75);
        assert_eq!(binning.bucket(7).center(), 3.75);
    }

    #[test]
    fn invalid_width_is_rejected() {
        for w in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(bin(&[1.0], w), Err(AnalysisError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn negative_values_are_out_of_domain() {
        assert!(matches!(bin(&[1.0, -0.1], 1.0), Err(AnalysisError::InvalidDomain(_))));
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let binning = bin(&[], 0.1).unwrap();
        assert!(binning.is_empty());
        assert_eq!(binning.bucket_count, 0);
    }
}
