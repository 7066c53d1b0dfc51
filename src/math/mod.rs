//! Mathematical utilities: linear least squares and descriptive statistics.

pub mod ols;
pub mod summary;

pub use ols::*;
