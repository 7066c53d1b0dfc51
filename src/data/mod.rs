//! Raster data sources.
//!
//! The analysis core never decodes raster containers itself. It asks a
//! `RasterSource` for the first band of a file and gets back a `RawBand`: the
//! native shape, the cell values in row-major order, and the declared nodata
//! sentinel (if any).
//!
//! Implementations:
//! - `GeoTiffSource`: GeoTIFF files via the `tiff` crate
//! - `MemorySource`: bands held in memory, keyed by path (tests, demos)
//! - `SyntheticPair`: seeded random pair with a known exponential relationship

use std::path::Path;

use crate::error::AnalysisError;

pub mod geotiff;
pub mod memory;
pub mod synthetic;

pub use geotiff::GeoTiffSource;
pub use memory::MemorySource;
pub use synthetic::{SyntheticPair, SyntheticParams};

/// One decoded raster band.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBand {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell values, `rows * cols` long.
    pub values: Vec<f64>,
    /// Missing-value sentinel declared by the raster.
    pub nodata: Option<f64>,
}

impl RawBand {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>, nodata: Option<f64>) -> Result<Self, AnalysisError> {
        if values.len() != rows * cols {
            return Err(AnalysisError::LengthMismatch {
                left: values.len(),
                right: rows * cols,
            });
        }
        Ok(Self {
            rows,
            cols,
            values,
            nodata,
        })
    }
}

/// Raster-reading collaborator.
pub trait RasterSource {
    /// Read the first band of the raster at `path`.
    fn read_first_band(&self, path: &Path) -> Result<RawBand, AnalysisError>;
}

impl<S: RasterSource + ?Sized> RasterSource for &S {
    fn read_first_band(&self, path: &Path) -> Result<RawBand, AnalysisError> {
        (**self).read_first_band(path)
    }
}
