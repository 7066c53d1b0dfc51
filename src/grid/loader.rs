//! Load one grid from a raster source.

use std::path::Path;

use tracing::debug;

use crate::data::RasterSource;
use crate::error::AnalysisError;
use crate::grid::{Grid, align};

/// Read the first band at `path`, mask nodata cells and crop to the target shape.
pub fn load<S: RasterSource + ?Sized>(
    source: &S,
    path: &Path,
    target_width: usize,
    target_height: usize,
) -> Result<Grid, AnalysisError> {
    let band = source.read_first_band(path)?;
    let label = path.display().to_string();

    let grid = Grid::from_values(band.rows, band.cols, &band.values, band.nodata).ok_or_else(|| {
        AnalysisError::Raster {
            path: label.clone(),
            message: format!(
                "band holds {} values for a {}x{} shape",
                band.values.len(),
                band.rows,
                band.cols
            ),
        }
    })?;

    debug!(
        path = %label,
        rows = band.rows,
        cols = band.cols,
        nodata = ?band.nodata,
        valid = grid.valid_count(),
        "loaded raster band"
    );

    align(grid, target_width, target_height, &label)
}
