//! Grid input for the extraction engine.
//!
//! This module provides the read-only cell grid, the single cell-text
//! resolution function, and readers that load a grid from disk.

pub mod accessor;
pub mod reader;
pub mod types;

// Re-export commonly used types
pub use accessor::{cell_text, trimmed_text};
pub use reader::{read_grid, reader_for_path, GridReader, JsonGridReader};
pub use types::{CellValue, Grid, Row};
