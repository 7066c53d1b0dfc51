//! Pair validation and correlation.

pub mod correlation;
pub mod pairs;

pub use correlation::correlate;
pub use pairs::{ValidPairs, validate};
