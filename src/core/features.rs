//! Feature computation from a record's sequences.
//!
//! Every record reduces to the same seven numbers, in a fixed order, which is
//! the feature column layout the downstream classifier is trained on.

use crate::error::FeatureError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Number of features per record.
pub const FEATURE_COUNT: usize = 7;

/// Feature column names, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "length",
    "mean",
    "dispersion",
    "min",
    "width",
    "positive_light_count",
    "timespan_minutes",
];

/// The fixed-size feature vector of one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Number of temperature readings
    pub length: f64,
    /// Mean temperature
    pub mean: f64,
    /// `sqrt(sum((x - mean)^2)) / length`, see [`dispersion`]
    pub dispersion: f64,
    /// Lowest temperature
    pub min: f64,
    /// Highest minus lowest temperature
    pub width: f64,
    /// Light readings strictly above zero
    pub positive_light_count: f64,
    /// Minutes between the earliest and latest timestamp
    pub timespan_minutes: f64,
}

impl FeatureVector {
    /// The features in column order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.length,
            self.mean,
            self.dispersion,
            self.min,
            self.width,
            self.positive_light_count,
            self.timespan_minutes,
        ]
    }
}

/// Summary statistics of a temperature sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub length: usize,
    pub mean: f64,
    pub dispersion: f64,
    pub min: f64,
    pub width: f64,
}

/// Compute the full feature vector of a record.
pub fn compute_feature_vector(
    temperature: &[f64],
    light: &[f64],
    timestamps: &[DateTime<Utc>],
) -> Result<FeatureVector, FeatureError> {
    let stats = temperature_stats(temperature)?;
    let timespan_minutes = timespan_minutes(timestamps)?;

    Ok(FeatureVector {
        length: stats.length as f64,
        mean: stats.mean,
        dispersion: stats.dispersion,
        min: stats.min,
        width: stats.width,
        positive_light_count: positive_count(light) as f64,
        timespan_minutes,
    })
}

/// Length, mean, dispersion, minimum and width of a temperature sequence.
pub fn temperature_stats(values: &[f64]) -> Result<TemperatureStats, FeatureError> {
    if values.is_empty() {
        return Err(FeatureError::EmptySequence);
    }

    let mean = values.mean();
    let min = Statistics::min(values);
    let max = Statistics::max(values);

    Ok(TemperatureStats {
        length: values.len(),
        mean,
        dispersion: dispersion(values, mean),
        min,
        width: max - min,
    })
}

/// Square root of the summed squared deviations, divided by the count.
///
/// This is neither the variance nor the standard deviation. Trained models
/// expect exactly this value.
pub fn dispersion(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|&v| (v - mean).powi(2)).sum();
    sum_sq.sqrt() / values.len() as f64
}

/// Count of readings strictly greater than zero.
pub fn positive_count(values: &[f64]) -> usize {
    values.iter().filter(|&&v| v > 0.0).count()
}

/// Minutes between the earliest and the latest timestamp.
pub fn timespan_minutes(timestamps: &[DateTime<Utc>]) -> Result<f64, FeatureError> {
    let (Some(first), Some(last)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return Err(FeatureError::EmptyTimestamps);
    };
    Ok((*last - *first).num_milliseconds() as f64 / 60_000.0)
}
