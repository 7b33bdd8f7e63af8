//! Grid lookup and interpolation helpers.

use crate::error::EclipseError;

/// Find the grid index at or immediately below `value`.
///
/// For a sorted `grid`, this is the index `i` where `grid[i] <= value <
/// grid[i+1]`. Values at or above the last grid point map to the last index.
/// A value below the first grid point is an error.
pub(crate) fn bin_search_below(grid: &[f64], value: f64) -> Result<usize, EclipseError> {
    grid.partition_point(|&g| g <= value)
        .checked_sub(1)
        .ok_or(EclipseError::AltitudeOutOfRange)
}

/// Three-point parabolic (Lagrange) interpolation of `(x, y)` at `at`.
pub(crate) fn interp_parab(x: [f64; 3], y: [f64; 3], at: f64) -> f64 {
    let [x0, x1, x2] = x;
    let [y0, y1, y2] = y;

    y0 * (at - x1) * (at - x2) / ((x0 - x1) * (x0 - x2))
        + y1 * (at - x0) * (at - x2) / ((x1 - x0) * (x1 - x2))
        + y2 * (at - x0) * (at - x1) / ((x2 - x0) * (x2 - x1))
}
