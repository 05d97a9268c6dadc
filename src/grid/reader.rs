//! Grid readers.
//!
//! Decoding a spreadsheet container is someone else's job; readers here only
//! turn an already-exported grid document into a [`Grid`]. The JSON document
//! shape is the serde form of [`Grid`]:
//!
//! ```json
//! { "shared_strings": ["ModuleCode"], "rows": [["label", "S-01", {"shared": 0}, "45000.5"]] }
//! ```

use crate::error::GridError;
use crate::grid::types::Grid;
use std::path::Path;

/// Something that can produce a grid from a file.
pub trait GridReader {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Read the file at `path` into a grid.
    fn read(&self, path: &Path) -> Result<Grid, GridError>;
}

/// Reads the JSON grid document format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGridReader;

impl JsonGridReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a grid document held in memory.
    pub fn parse(&self, content: &str) -> Result<Grid, GridError> {
        serde_json::from_str(content).map_err(|e| GridError::Decode(e.to_string()))
    }
}

impl GridReader for JsonGridReader {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, path: &Path) -> Result<Grid, GridError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| GridError::Io(format!("{path:?}: {e}")))?;
        self.parse(&content)
    }
}

/// Pick a reader from the file extension.
pub fn reader_for_path(path: &Path) -> Result<Box<dyn GridReader>, GridError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(Box::new(JsonGridReader::new())),
        "" => Err(GridError::UnsupportedFormat(format!(
            "{path:?} has no file extension"
        ))),
        other => Err(GridError::UnsupportedFormat(format!(
            ".{other} (export the sheet to a JSON grid document first)"
        ))),
    }
}

/// Read a grid, choosing the reader from the file extension.
pub fn read_grid(path: &Path) -> Result<Grid, GridError> {
    let reader = reader_for_path(path)?;
    tracing::debug!("reading {:?} with the {} reader", path, reader.name());
    reader.read(path)
}
