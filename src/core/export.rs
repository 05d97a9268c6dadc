//! Dataset export for the training side.
//!
//! A run is written either as one JSON envelope (metadata plus all samples)
//! or as JSON Lines with one sample per line.

use crate::config::LayoutConfig;
use crate::core::dataset::{Dataset, LabeledSample};
use crate::core::features::FEATURE_NAMES;
use crate::core::preprocess::TruncatedRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// The current export format version.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "sensorgrid";

/// On-disk layout of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// One pretty-printed envelope
    #[default]
    Json,
    /// One sample per line, no envelope
    JsonLines,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::JsonLines => "jsonl",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "jsonl" | "jsonlines" | "ndjson" => Ok(ExportFormat::JsonLines),
            other => Err(format!("unknown export format {other:?} (expected json or jsonl)")),
        }
    }
}

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Samples carried by an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ExportSamples {
    /// Full records reduced to label and feature vector
    Labeled(Vec<LabeledSample>),
    /// Fixed-length temperature sequences
    Truncated(Vec<TruncatedRecord>),
}

impl ExportSamples {
    pub fn len(&self) -> usize {
        match self {
            ExportSamples::Labeled(items) => items.len(),
            ExportSamples::Truncated(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the feature-vector columns, for samples that carry one.
    ///
    /// Truncated samples hold raw readings and per-record stats instead, so
    /// they have none.
    pub fn feature_names(&self) -> Vec<String> {
        match self {
            ExportSamples::Labeled(_) => FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            ExportSamples::Truncated(_) => Vec::new(),
        }
    }
}

/// A complete export envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetExport {
    /// Export schema version
    pub format_version: String,
    /// When this export was produced (RFC3339)
    pub produced_at_utc: String,
    /// Producer metadata
    pub producer: ExportProducer,
    /// File the grid was read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Layout literals used for detection
    pub layout: LayoutConfig,
    /// Truncation length, when the samples are truncated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation_length: Option<usize>,
    /// Feature column names, in vector order (labeled samples only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    pub samples: ExportSamples,
}

/// Export write errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Builder for export envelopes.
pub struct ExportBuilder {
    instance_id: Uuid,
    source: Option<String>,
}

impl ExportBuilder {
    /// Create a new builder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            source: None,
        }
    }

    /// Record which file the grid came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the instance ID.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Envelope for a full dataset.
    pub fn build(&self, dataset: &Dataset, layout: &LayoutConfig) -> DatasetExport {
        self.envelope(
            layout,
            None,
            ExportSamples::Labeled(dataset.labeled_samples()),
        )
    }

    /// Envelope for a truncated dataset.
    pub fn build_truncated(
        &self,
        records: Vec<TruncatedRecord>,
        layout: &LayoutConfig,
        length: usize,
    ) -> DatasetExport {
        self.envelope(layout, Some(length), ExportSamples::Truncated(records))
    }

    fn envelope(
        &self,
        layout: &LayoutConfig,
        truncation_length: Option<usize>,
        samples: ExportSamples,
    ) -> DatasetExport {
        DatasetExport {
            format_version: EXPORT_FORMAT_VERSION.to_string(),
            produced_at_utc: Utc::now().to_rfc3339(),
            producer: ExportProducer {
                name: PRODUCER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instance_id: Some(self.instance_id.to_string()),
            },
            source: self.source.clone(),
            layout: layout.clone(),
            truncation_length,
            feature_names: samples.feature_names(),
            samples,
        }
    }
}

impl Default for ExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize an export in the given format.
pub fn render(export: &DatasetExport, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(export)?),
        ExportFormat::JsonLines => {
            let lines = match &export.samples {
                ExportSamples::Labeled(items) => items
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<Vec<_>, _>>()?,
                ExportSamples::Truncated(items) => items
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<Vec<_>, _>>()?,
            };
            Ok(lines.join("\n"))
        }
    }
}

/// Write an export to `path`, creating parent directories.
pub fn write_export(
    export: &DatasetExport,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = render(export, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    if format == ExportFormat::JsonLines && !content.is_empty() {
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::assemble;
    use crate::core::preprocess::truncate;
    use crate::grid::types::{Grid, Row};
    use crate::report::ExtractionLog;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    fn row_of(cells: &[&str]) -> Row {
        cells.iter().copied().collect()
    }

    fn dataset() -> Dataset {
        let grid = Grid::new(vec![
            row_of(&["indoor", "S-1", "ModuleCode", "45000", "45000.5"]),
            row_of(&["ISL29035_Light", "0", "3"]),
            row_of(&["SHT3X_Temperature", "20", "22", "24"]),
            row_of(&["outdoor", "S-2", "ModuleCode", "45000"]),
            row_of(&["ISL29035_Light", "9"]),
            row_of(&["SHT3X_Temperature", "5"]),
        ]);
        assemble(&grid, &LayoutConfig::default(), &ExtractionLog::new())
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("JSONL".parse::<ExportFormat>(), Ok(ExportFormat::JsonLines));
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_builder_instance_id() {
        assert_ne!(
            ExportBuilder::new().instance_id(),
            ExportBuilder::new().instance_id()
        );
    }

    #[test]
    fn test_envelope_contents() {
        let export = ExportBuilder::new()
            .with_source("dataset_all_vs.json")
            .build(&dataset(), &LayoutConfig::default());

        assert_eq!(export.format_version, EXPORT_FORMAT_VERSION);
        assert_eq!(export.producer.name, PRODUCER_NAME);
        assert_eq!(export.source.as_deref(), Some("dataset_all_vs.json"));
        assert_eq!(export.feature_names.len(), 7);
        assert_eq!(export.samples.len(), 2);
        assert!(export.truncation_length.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let export = ExportBuilder::new().build(&dataset(), &LayoutConfig::default());
        let json = render(&export, ExportFormat::Json).unwrap();

        assert!(json.contains("\"kind\": \"labeled\""));
        assert!(json.contains("positive_light_count"));

        let parsed: DatasetExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.producer, export.producer);
        assert_eq!(parsed.layout, export.layout);
        assert_eq!(parsed.samples.len(), 2);
    }

    #[test]
    fn test_json_lines_one_sample_per_line() {
        let dataset = dataset();
        let records = truncate(&dataset, NonZeroUsize::new(1).unwrap());
        let export = ExportBuilder::new().build_truncated(records, &LayoutConfig::default(), 1);

        let text = render(&export, ExportFormat::JsonLines).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: TruncatedRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.sensor_id, "S-1");
        assert_eq!(first.temperature, vec![20.0]);
    }

    #[test]
    fn test_truncated_export_has_no_feature_names() {
        let dataset = dataset();
        let records = truncate(&dataset, NonZeroUsize::new(1).unwrap());
        let export = ExportBuilder::new().build_truncated(records, &LayoutConfig::default(), 1);

        assert!(export.feature_names.is_empty());
        let json = render(&export, ExportFormat::Json).unwrap();
        assert!(!json.contains("feature_names"));

        let parsed: DatasetExport = serde_json::from_str(&json).unwrap();
        assert!(parsed.feature_names.is_empty());
        assert_eq!(parsed.truncation_length, Some(1));
    }

    #[test]
    fn test_write_export_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exports").join("run.jsonl");
        let export = ExportBuilder::new().build(&dataset(), &LayoutConfig::default());

        write_export(&export, ExportFormat::JsonLines, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }
}
