//! Binned-aggregate relationship between the two variables.
//!
//! - `bin`: fixed-width bucket per value of the independent variable
//! - `aggregate`: one reduced paired value per non-empty bucket
//! - `filter_outliers`: single-pass mean + k·σ trim of the aggregates

pub mod aggregate;
pub mod binner;
pub mod outlier;

pub use aggregate::{Reducer, aggregate};
pub use binner::{Binning, bin};
pub use outlier::{OutlierTrim, filter_outliers};
