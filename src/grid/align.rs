//! Crop a grid to a common target shape.
//!
//! Alignment is a top-left crop: no resampling, scaling or centering. Choosing
//! target dimensions that describe the real overlap of both inputs is up to the
//! caller.

use ndarray::s;

use crate::error::AnalysisError;
use crate::grid::Grid;

/// Crop `grid` to its top-left `target_height × target_width` window.
///
/// `label` names the grid in the `Shape` error (usually the source path).
pub fn align(grid: Grid, target_width: usize, target_height: usize, label: &str) -> Result<Grid, AnalysisError> {
    if target_width == 0 || target_height == 0 {
        return Err(AnalysisError::invalid_parameter(
            "target",
            format!("{target_width}x{target_height}"),
            "width and height must be > 0",
        ));
    }

    let (rows, cols) = grid.shape();
    if rows < target_height || cols < target_width {
        return Err(AnalysisError::Shape {
            path: label.to_string(),
            native_rows: rows,
            native_cols: cols,
            target_rows: target_height,
            target_cols: target_width,
        });
    }
    if (rows, cols) == (target_height, target_width) {
        return Ok(grid);
    }

    let (cells, native_shape) = grid.into_parts();
    let cropped = cells.slice(s![..target_height, ..target_width]).to_owned();
    Ok(Grid::from_parts(cropped, native_shape))
}
