//! Pairwise validity filtering.
//!
//! Two flattened grids of identical shape line up index-for-index. Only the
//! positions where both cells hold a value survive; relative order is kept so
//! `a[i]` and `b[i]` still describe the same geographic cell.

use crate::error::AnalysisError;

/// Validated paired samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidPairs {
    /// Source positions that survived, ascending.
    pub indices: Vec<usize>,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl ValidPairs {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Keep the positions where both sequences hold a non-NaN value.
pub fn validate(seq_a: &[Option<f64>], seq_b: &[Option<f64>]) -> Result<ValidPairs, AnalysisError> {
    if seq_a.len() != seq_b.len() {
        return Err(AnalysisError::LengthMismatch {
            left: seq_a.len(),
            right: seq_b.len(),
        });
    }

    let mut out = ValidPairs::default();
    for (i, (va, vb)) in seq_a.iter().zip(seq_b).enumerate() {
        if let (Some(a), Some(b)) = (defined(*va), defined(*vb)) {
            out.indices.push(i);
            out.a.push(a);
            out.b.push(b);
        }
    }
    Ok(out)
}

fn defined(v: Option<f64>) -> Option<f64> {
    v.filter(|x| !x.is_nan())
}
