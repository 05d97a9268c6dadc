//! In-memory cell grid handed over by a grid reader.
//!
//! The grid is read-only once built. Cells either carry their text inline or
//! point into a shared-string table stored once per grid.

use serde::{Deserialize, Deserializer, Serialize};

/// The stored content of a single cell.
///
/// On the wire a text cell is a bare JSON string and a shared reference is
/// `{"shared": <index>}`. Numbers and booleans are read as their text form
/// and `null` as a blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Inline literal text (numbers are stored as their text form)
    Text(String),
    /// Index into the grid's shared-string table
    SharedRef { shared: usize },
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn shared(index: usize) -> Self {
        CellValue::SharedRef { shared: index }
    }

    /// A blank inline cell.
    pub fn blank() -> Self {
        CellValue::Text(String::new())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Every cell shape a grid document may contain.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellWire {
    Blank,
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    SharedRef { shared: usize },
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match CellWire::deserialize(deserializer)? {
            CellWire::Blank => CellValue::blank(),
            CellWire::Text(text) => CellValue::Text(text),
            CellWire::Number(number) => CellValue::Text(number.to_string()),
            CellWire::Bool(flag) => CellValue::Text(flag.to_string()),
            CellWire::SharedRef { shared } => CellValue::SharedRef { shared },
        })
    }
}

/// One grid row. Rows may have different widths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, column: usize) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

impl<T: Into<CellValue>> FromIterator<T> for Row {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A fully loaded sheet: rows of cells plus the shared-string table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Strings referenced by `CellValue::SharedRef`
    #[serde(default)]
    pub shared_strings: Vec<String>,
    /// Rows in sheet order
    pub rows: Vec<Row>,
}

impl Grid {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            shared_strings: Vec::new(),
            rows,
        }
    }

    pub fn with_shared_strings(mut self, shared_strings: Vec<String>) -> Self {
        self.shared_strings = shared_strings;
        self
    }

    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells in a row, zero for rows past the end.
    pub fn cell_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Row::len)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.cell(column))
    }
}
