//! Row-major flattening.

use crate::grid::Grid;

/// Flatten a grid into a row-major sequence of `rows * cols` cells.
///
/// Index `i` corresponds to the same cell in any grid of identical shape.
pub fn flatten(grid: Grid) -> Vec<Option<f64>> {
    // `iter()` walks logical (row-major) order regardless of memory layout.
    grid.cells().iter().copied().collect()
}
