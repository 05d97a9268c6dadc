//! Fixed-length truncation of a dataset.
//!
//! An alternative shaping of the dataset for models that want equal-length
//! temperature sequences: short records are dropped, long ones are cut, and
//! the light and timestamp series are not carried over.

use crate::core::dataset::Dataset;
use crate::core::features::{temperature_stats, TemperatureStats};
use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// A record cut down to its first `L` temperature readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncatedRecord {
    pub sensor_id: String,
    pub target: String,
    pub temperature: Vec<f64>,
    /// Statistics over the truncated readings only
    pub stats: TemperatureStats,
}

/// Distribution of temperature sequence lengths in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthSummary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// Min, max and mean temperature sequence length, or `None` for no records.
pub fn length_summary(records: &[Record]) -> Option<LengthSummary> {
    let lengths = records.iter().map(|r| r.temperature().len());
    let min = lengths.clone().min()?;
    let max = lengths.clone().max()?;
    let mean = lengths.sum::<usize>() as f64 / records.len() as f64;
    Some(LengthSummary { min, max, mean })
}

/// Keep records with at least `length` temperature readings, truncated to
/// exactly `length`.
pub fn truncate(dataset: &Dataset, length: NonZeroUsize) -> Vec<TruncatedRecord> {
    let length = length.get();

    if let Some(summary) = length_summary(dataset.records()) {
        tracing::debug!(
            "sequence lengths: min={}, max={}, avg={:.1}",
            summary.min,
            summary.max,
            summary.mean
        );
    }

    let truncated: Vec<TruncatedRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.temperature().len() >= length)
        .filter_map(|r| truncate_record(r, length))
        .collect();

    tracing::info!(
        "kept {} of {} records at length {}",
        truncated.len(),
        dataset.len(),
        length
    );

    truncated
}

/// Cut one record to `length` readings. `length` is non-zero and the record
/// already has that many readings, so the stats cannot fail on an empty slice.
fn truncate_record(record: &Record, length: usize) -> Option<TruncatedRecord> {
    let temperature = record.temperature()[..length].to_vec();
    let stats = match temperature_stats(&temperature) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!("dropping sensor {} from truncation: {e}", record.sensor_id());
            return None;
        }
    };
    Some(TruncatedRecord {
        sensor_id: record.sensor_id().to_string(),
        target: record.target().to_string(),
        temperature,
        stats,
    })
}
