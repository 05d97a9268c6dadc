//! Record block detection.
//!
//! A record block is a marker row followed by a light row and a temperature
//! row:
//!
//! ```text
//! row i     | target | sensor_id | ModuleCode        | date | date | ... |
//! row i + 1 | ISL29035_Light     | lux  | lux  | ...                     |
//! row i + 2 | SHT3X_Temperature  | degC | degC | ...                     |
//! ```
//!
//! Detection is a pure function of the grid and a start row. After a marker
//! the scan resumes on the very next row, so follower rows are still checked
//! as potential markers themselves.

use crate::config::LayoutConfig;
use crate::core::record::Record;
use crate::core::sequence::{date_sequence, titled_sequence, DATE_FIRST_COLUMN};
use crate::error::DiscardReason;
use crate::grid::accessor::cell_text;
use crate::grid::types::Grid;
use chrono::{DateTime, Utc};

/// Column holding the classification label in a marker row.
pub const TARGET_COLUMN: usize = 0;

/// Column holding the sensor identifier in a marker row.
pub const SENSOR_ID_COLUMN: usize = 1;

/// Column whose text marks a row as a record's first row.
pub const MARKER_COLUMN: usize = 2;

/// Result of building the block that starts at `marker_row`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBlock {
    pub marker_row: usize,
    pub outcome: Result<Record, DiscardReason>,
    /// Cells omitted from the block's sequences because they were not numeric
    pub parse_errors: usize,
}

impl DetectedBlock {
    pub fn is_accepted(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A block whose sequences have been read but not yet judged.
struct Candidate {
    marker_row: usize,
    sensor_id: String,
    target: String,
    timestamps: Vec<DateTime<Utc>>,
    light: Vec<f64>,
    temperature: Vec<f64>,
}

enum ScanState {
    Scanning(usize),
    Building(usize),
    EmitOrDiscard {
        marker_row: usize,
        candidate: Result<Candidate, DiscardReason>,
        parse_errors: usize,
    },
}

/// Check whether `row` is a marker row.
///
/// Rows too short to have a marker column never are. An unresolvable marker
/// cell is logged and the row is treated as an ordinary row.
pub fn is_marker_row(grid: &Grid, row: usize, layout: &LayoutConfig) -> bool {
    if grid.cell_count(row) <= MARKER_COLUMN {
        return false;
    }
    match cell_text(grid, row, MARKER_COLUMN) {
        Ok(text) => text == layout.marker_column_text,
        Err(e) => {
            tracing::warn!("not treating row {row} as a marker: {e}");
            false
        }
    }
}

/// Scan from `start_row` to the next marker row and build its block.
///
/// Returns the block (or `None` when the grid ends first) together with the
/// row the next scan should start from.
pub fn detect_next_block(
    grid: &Grid,
    start_row: usize,
    layout: &LayoutConfig,
) -> (Option<DetectedBlock>, usize) {
    let height = grid.row_count();
    let mut state = ScanState::Scanning(start_row);

    loop {
        state = match state {
            ScanState::Scanning(row) if row >= height => return (None, height),
            ScanState::Scanning(row) => {
                if is_marker_row(grid, row, layout) {
                    ScanState::Building(row)
                } else {
                    ScanState::Scanning(row + 1)
                }
            }
            ScanState::Building(marker_row) => {
                let mut parse_errors = 0;
                let candidate = build_candidate(grid, marker_row, layout, &mut parse_errors);
                ScanState::EmitOrDiscard {
                    marker_row,
                    candidate,
                    parse_errors,
                }
            }
            ScanState::EmitOrDiscard {
                marker_row,
                candidate,
                parse_errors,
            } => {
                let block = DetectedBlock {
                    marker_row,
                    outcome: candidate.and_then(emit_or_discard),
                    parse_errors,
                };
                return (Some(block), marker_row + 1);
            }
        };
    }
}

/// Build the block for a row already known to be a marker row.
pub fn build_block(grid: &Grid, marker_row: usize, layout: &LayoutConfig) -> DetectedBlock {
    let mut parse_errors = 0;
    let outcome = build_candidate(grid, marker_row, layout, &mut parse_errors)
        .and_then(emit_or_discard);
    DetectedBlock {
        marker_row,
        outcome,
        parse_errors,
    }
}

/// Iterate over every block in the grid, in row order.
pub fn blocks<'g>(grid: &'g Grid, layout: &'g LayoutConfig) -> Blocks<'g> {
    Blocks {
        grid,
        layout,
        next_row: 0,
    }
}

/// Iterator returned by [`blocks`].
pub struct Blocks<'g> {
    grid: &'g Grid,
    layout: &'g LayoutConfig,
    next_row: usize,
}

impl Blocks<'_> {
    /// Rows consumed so far.
    pub fn rows_scanned(&self) -> usize {
        self.next_row.min(self.grid.row_count())
    }
}

impl Iterator for Blocks<'_> {
    type Item = DetectedBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let (block, next_row) = detect_next_block(self.grid, self.next_row, self.layout);
        self.next_row = next_row;
        block
    }
}

fn build_candidate(
    grid: &Grid,
    marker_row: usize,
    layout: &LayoutConfig,
    parse_errors: &mut usize,
) -> Result<Candidate, DiscardReason> {
    let light_row = marker_row + 1;
    let temperature_row = marker_row + 2;
    if temperature_row >= grid.row_count() {
        return Err(DiscardReason::OutOfBoundsFollowerRow);
    }

    let target = cell_text(grid, marker_row, TARGET_COLUMN)?.to_string();
    let sensor_id = cell_text(grid, marker_row, SENSOR_ID_COLUMN)?.to_string();

    let dates = date_sequence(grid, marker_row, DATE_FIRST_COLUMN)?;
    *parse_errors += dates.skipped.len();

    let light = titled_sequence(grid, light_row, &layout.light_title)?;
    *parse_errors += light.skipped.len();

    let temperature = titled_sequence(grid, temperature_row, &layout.temperature_title)?;
    *parse_errors += temperature.skipped.len();

    Ok(Candidate {
        marker_row,
        sensor_id,
        target,
        timestamps: dates.values,
        light: light.values,
        temperature: temperature.values,
    })
}

fn emit_or_discard(candidate: Candidate) -> Result<Record, DiscardReason> {
    let light_missing = candidate.light.is_empty();
    let temperature_missing = candidate.temperature.is_empty();
    if light_missing || temperature_missing {
        return Err(DiscardReason::Incomplete {
            light_missing,
            temperature_missing,
        });
    }

    tracing::trace!(
        "building record for sensor {} from marker row {}",
        candidate.sensor_id,
        candidate.marker_row
    );
    Record::new(
        candidate.sensor_id,
        candidate.target,
        candidate.timestamps,
        candidate.temperature,
        candidate.light,
    )
    .map_err(DiscardReason::from)
}
