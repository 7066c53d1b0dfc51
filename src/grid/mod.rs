//! Raster grids with explicit per-cell validity.
//!
//! A `Grid` stores `Option<f64>` per cell: `None` marks a nodata (or NaN) cell.
//! Missing data is never encoded as a floating-point NaN once a grid exists.
//!
//! Stages:
//! - `load`: ask a `RasterSource` for the first band, mask nodata, crop to target
//! - `align`: crop to the top-left target window
//! - `flatten`: row-major 1D sequence

use ndarray::Array2;

pub mod align;
pub mod flatten;
pub mod loader;

pub use align::align;
pub use flatten::flatten;
pub use loader::load;

/// One raster band, masked.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Array2<Option<f64>>,
    native_shape: (usize, usize),
}

impl Grid {
    /// Build a grid whose native shape is its current shape.
    pub fn from_cells(cells: Array2<Option<f64>>) -> Self {
        let native_shape = cells.dim();
        Self { cells, native_shape }
    }

    /// Build a grid from a row-major value buffer.
    ///
    /// Cells equal to `nodata` and NaN cells become `None`. Returns `None` when
    /// the buffer length is not `rows * cols`.
    pub fn from_values(rows: usize, cols: usize, values: &[f64], nodata: Option<f64>) -> Option<Self> {
        let masked: Vec<Option<f64>> = values.iter().map(|&v| mask_cell(v, nodata)).collect();
        let cells = Array2::from_shape_vec((rows, cols), masked).ok()?;
        Some(Self::from_cells(cells))
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Shape of the raster before any cropping.
    pub fn native_shape(&self) -> (usize, usize) {
        self.native_shape
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get((row, col)).copied().flatten()
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    pub(crate) fn into_parts(self) -> (Array2<Option<f64>>, (usize, usize)) {
        (self.cells, self.native_shape)
    }

    pub(crate) fn from_parts(cells: Array2<Option<f64>>, native_shape: (usize, usize)) -> Self {
        Self { cells, native_shape }
    }
}

fn mask_cell(value: f64, nodata: Option<f64>) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    match nodata {
        Some(sentinel) if value == sentinel => None,
        _ => Some(value),
    }
}
