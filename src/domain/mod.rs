//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`ExpModel`, `Reduction`) and the run config (`AnalysisConfig`)
//! - intermediate values (`Bucket`, `AggregatePoint`, `Correlation`)
//! - fit outputs (`FitResult`, `FitQuality`) and the saved `ResultFile`

pub mod types;

pub use types::*;
