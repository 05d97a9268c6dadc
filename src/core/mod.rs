//! Core functionality for sensorgrid.
//!
//! This module contains:
//! - Sequence extraction from grid rows
//! - Record block detection
//! - Feature computation for extracted records
//! - Dataset assembly, truncation and export

pub mod dataset;
pub mod detector;
pub mod export;
pub mod features;
pub mod preprocess;
pub mod record;
pub mod sequence;

// Re-export commonly used types
#[cfg(feature = "parallel")]
pub use dataset::assemble_parallel;
pub use dataset::{assemble, AssemblySummary, Dataset, LabeledSample};
pub use detector::{blocks, build_block, detect_next_block, is_marker_row, DetectedBlock};
pub use export::{
    render, write_export, DatasetExport, ExportBuilder, ExportError, ExportFormat, ExportSamples,
    EXPORT_FORMAT_VERSION, PRODUCER_NAME,
};
pub use features::{
    compute_feature_vector, FeatureVector, TemperatureStats, FEATURE_COUNT, FEATURE_NAMES,
};
pub use preprocess::{length_summary, truncate, LengthSummary, TruncatedRecord};
pub use record::Record;
pub use sequence::{serial_to_datetime, SequenceScan};
