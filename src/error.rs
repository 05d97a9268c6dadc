//! Error types shared across the extraction pipeline.
//!
//! None of these abort dataset assembly on their own. Cell and parse errors
//! are scoped to a single element or record; the assembler only reports a
//! hard failure when nothing survives.

use thiserror::Error;

/// Errors raised while reading or resolving grid content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A shared-string reference points outside the lookup table.
    #[error("malformed cell at row {row}, column {column}: shared string index {index} out of range (table has {table_len})")]
    MalformedCell {
        row: usize,
        column: usize,
        index: usize,
        table_len: usize,
    },

    #[error("IO error: {0}")]
    Io(String),

    #[error("could not decode grid document: {0}")]
    Decode(String),

    #[error("unsupported grid format: {0}")]
    UnsupportedFormat(String),
}

/// A date or numeric cell that does not hold a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("row {row}, column {column}: {text:?} is not a number")]
    NotNumeric {
        row: usize,
        column: usize,
        text: String,
    },

    #[error("row {row}, column {column}: serial date {serial} is out of range")]
    DateOutOfRange { row: usize, column: usize, serial: f64 },
}

/// A feature that needs a non-empty sequence was computed over an empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("temperature sequence is empty")]
    EmptySequence,

    #[error("timestamp sequence is empty")]
    EmptyTimestamps,
}

/// Why a candidate record was dropped instead of emitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscardReason {
    #[error("incomplete block (light missing: {light_missing}, temperature missing: {temperature_missing})")]
    Incomplete {
        light_missing: bool,
        temperature_missing: bool,
    },

    #[error("marker row has no room for two follower rows")]
    OutOfBoundsFollowerRow,

    #[error(transparent)]
    MalformedCell(#[from] GridError),

    #[error("feature computation failed: {0}")]
    Feature(#[from] FeatureError),
}

/// Failures of the assembly step as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// Nothing survived extraction; a classifier cannot be trained on zero records.
    #[error("no records extracted from {rows} rows ({markers} marker rows found)")]
    Empty { rows: usize, markers: usize },
}
