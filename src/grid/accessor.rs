//! Cell text resolution.
//!
//! Every read of cell content goes through [`cell_text`], so the shared-string
//! indirection lives in exactly one place.

use crate::error::GridError;
use crate::grid::types::{CellValue, Grid};

/// Resolve the logical text of the cell at `(row, column)`.
///
/// Cells past the end of a row (or rows past the end of the grid) read as
/// blank text. A shared reference outside the lookup table is a
/// [`GridError::MalformedCell`].
pub fn cell_text(grid: &Grid, row: usize, column: usize) -> Result<&str, GridError> {
    match grid.cell(row, column) {
        None => Ok(""),
        Some(CellValue::Text(text)) => Ok(text.as_str()),
        Some(CellValue::SharedRef { shared }) => grid
            .shared_strings
            .get(*shared)
            .map(String::as_str)
            .ok_or(GridError::MalformedCell {
                row,
                column,
                index: *shared,
                table_len: grid.shared_strings.len(),
            }),
    }
}

/// Like [`cell_text`], with surrounding whitespace removed.
pub fn trimmed_text(grid: &Grid, row: usize, column: usize) -> Result<&str, GridError> {
    cell_text(grid, row, column).map(str::trim)
}
