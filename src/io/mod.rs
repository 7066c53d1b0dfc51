//! Input/output helpers.
//!
//! - pair and aggregate CSV exports (`export`)
//! - result JSON read/write (`result`)
//!
//! Raster decoding lives behind `data::RasterSource`, not here.

pub mod export;
pub mod result;

pub use export::*;
pub use result::*;
