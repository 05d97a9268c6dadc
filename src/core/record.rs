//! Extracted records.

use crate::core::features::{compute_feature_vector, FeatureVector};
use crate::error::FeatureError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sensor observation pulled out of a record block.
///
/// Records are immutable once built. The feature vector is computed when the
/// record is built, so a record that exists always has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    sensor_id: String,
    target: String,
    timestamps: Vec<DateTime<Utc>>,
    temperature: Vec<f64>,
    light: Vec<f64>,
    feature_vector: FeatureVector,
}

impl Record {
    /// Build a record and derive its features.
    pub fn new(
        sensor_id: impl Into<String>,
        target: impl Into<String>,
        timestamps: Vec<DateTime<Utc>>,
        temperature: Vec<f64>,
        light: Vec<f64>,
    ) -> Result<Self, FeatureError> {
        let feature_vector = compute_feature_vector(&temperature, &light, &timestamps)?;
        Ok(Self {
            sensor_id: sensor_id.into(),
            target: target.into(),
            timestamps,
            temperature,
            light,
            feature_vector,
        })
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    /// Classification label.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    pub fn light(&self) -> &[f64] {
        &self.light
    }

    pub fn feature_vector(&self) -> &FeatureVector {
        &self.feature_vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_record_derives_features() {
        let start = Utc::now();
        let record = Record::new(
            "S-17",
            "indoor",
            vec![start, start + Duration::minutes(5)],
            vec![20.0, 21.0],
            vec![0.0, 12.0],
        )
        .unwrap();

        assert_eq!(record.sensor_id(), "S-17");
        assert_eq!(record.target(), "indoor");
        assert_eq!(record.feature_vector().length, 2.0);
        assert_eq!(record.feature_vector().positive_light_count, 1.0);
        assert!((record.feature_vector().timespan_minutes - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_without_timestamps_is_rejected() {
        let result = Record::new("S-1", "outdoor", vec![], vec![1.0], vec![1.0]);
        assert_eq!(result, Err(FeatureError::EmptyTimestamps));
    }
}
