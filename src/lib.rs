//! `gridcorr` library crate.
//!
//! The binary (`gridcorr`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - raster sources and renderers can be swapped without touching the numerics
//!
//! Stages, in pipeline order: `grid` (load, align, flatten), `stats` (pair
//! validation, correlation), `binning` (buckets, aggregates, outlier trim) and
//! `fit` (exponential curve fit).

pub mod app;
pub mod binning;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod grid;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod stats;
