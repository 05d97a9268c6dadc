//! Sequence extraction from grid rows.
//!
//! Both specializations walk a row from a starting column, skip blank cells,
//! and parse the rest. Unparseable cells are omitted and reported; a cell
//! that cannot be resolved at all fails the whole scan.

use crate::error::{GridError, ParseError};
use crate::grid::accessor::{cell_text, trimmed_text};
use crate::grid::types::Grid;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// First column of the date run in a marker row.
pub const DATE_FIRST_COLUMN: usize = 3;

/// First value column of a follower row (column 0 holds the title).
pub const SERIES_FIRST_COLUMN: usize = 1;

/// Column holding a follower row's title.
pub const TITLE_COLUMN: usize = 0;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Serial date bounds (exclusive) of the OLE Automation date range.
const MIN_SERIAL: f64 = -657_435.0;
const MAX_SERIAL: f64 = 2_958_466.0;

/// Values parsed from one row, plus the cells that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceScan<T> {
    pub values: Vec<T>,
    pub skipped: Vec<ParseError>,
}

impl<T> SequenceScan<T> {
    fn empty() -> Self {
        Self {
            values: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Convert a day-count serial (days since 1899-12-30, fractional part is the
/// time of day) into a timestamp, rounded to the millisecond.
///
/// Negative serials keep a positive time of day: `-1.25` is 06:00 on
/// 1899-12-29.
pub fn serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || serial <= MIN_SERIAL || serial >= MAX_SERIAL {
        return None;
    }

    let rounding = if serial >= 0.0 { 0.5 } else { -0.5 };
    let mut millis = (serial * MILLIS_PER_DAY as f64 + rounding) as i64;
    if millis < 0 {
        millis -= (millis % MILLIS_PER_DAY) * 2;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&epoch) + Duration::milliseconds(millis))
}

/// Parse the date run of a marker row.
pub fn date_sequence(
    grid: &Grid,
    row: usize,
    first_column: usize,
) -> Result<SequenceScan<DateTime<Utc>>, GridError> {
    scan_row(grid, row, first_column, |text, column| {
        let serial = parse_number(text, row, column)?;
        serial_to_datetime(serial).ok_or(ParseError::DateOutOfRange {
            row,
            column,
            serial,
        })
    })
}

/// Parse a numeric run of a row.
pub fn numeric_sequence(
    grid: &Grid,
    row: usize,
    first_column: usize,
) -> Result<SequenceScan<f64>, GridError> {
    scan_row(grid, row, first_column, |text, column| {
        parse_number(text, row, column)
    })
}

/// Parse a follower row's series if its title matches.
///
/// A missing row or a different title means the series is absent, which is
/// an empty scan rather than an error.
pub fn titled_sequence(
    grid: &Grid,
    row: usize,
    title: &str,
) -> Result<SequenceScan<f64>, GridError> {
    if row >= grid.row_count() || cell_text(grid, row, TITLE_COLUMN)? != title {
        return Ok(SequenceScan::empty());
    }
    numeric_sequence(grid, row, SERIES_FIRST_COLUMN)
}

fn scan_row<T>(
    grid: &Grid,
    row: usize,
    first_column: usize,
    parse: impl Fn(&str, usize) -> Result<T, ParseError>,
) -> Result<SequenceScan<T>, GridError> {
    let mut scan = SequenceScan::empty();

    for column in first_column..grid.cell_count(row) {
        let text = trimmed_text(grid, row, column)?;
        if text.is_empty() {
            continue;
        }
        match parse(text, column) {
            Ok(value) => scan.values.push(value),
            Err(e) => {
                tracing::warn!("skipping cell: {e}");
                scan.skipped.push(e);
            }
        }
    }

    Ok(scan)
}

/// Only finite numbers count; "NaN" and "inf" are rejected like any other text.
fn parse_number(text: &str, row: usize, column: usize) -> Result<f64, ParseError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::NotNumeric {
            row,
            column,
            text: text.to_string(),
        })
}
