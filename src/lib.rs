//! sensorgrid - record extraction and feature derivation for sensor log grids.
//!
//! Sensor logs arrive as a loosely structured sheet: most rows are free-form,
//! but a record starts wherever column 2 holds a marker literal, and the two
//! rows after it carry that record's light and temperature series. This crate
//! finds those blocks, validates them, and reduces each to a labeled
//! seven-element feature vector for a downstream classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         sensorgrid                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │    Grid     │──▶│  Detector   │──▶│  Features   │        │
//! │  │  (reader)   │   │  (blocks)   │   │  (7 floats) │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                 │                 │               │
//! │         ▼                 ▼                 ▼               │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Sequence   │   │ Extraction  │   │  Dataset    │        │
//! │  │  Extractor  │   │    Log      │   │  + Export   │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sensorgrid::{assemble, read_grid, ExtractionLog, LayoutConfig};
//! use std::path::Path;
//!
//! let grid = read_grid(Path::new("dataset_all_vs.json")).expect("Failed to read grid");
//! let log = ExtractionLog::new();
//! let dataset = assemble(&grid, &LayoutConfig::default(), &log);
//!
//! for sample in dataset.labeled_samples() {
//!     println!("{} {:?}", sample.target, sample.features.to_array());
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod report;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, LayoutConfig};
#[cfg(feature = "parallel")]
pub use core::assemble_parallel;
pub use core::{
    assemble, compute_feature_vector, detect_next_block, truncate, Dataset, ExportBuilder,
    ExportFormat, FeatureVector, LabeledSample, Record, TruncatedRecord,
};
pub use error::{DatasetError, DiscardReason, FeatureError, GridError, ParseError};
pub use grid::{read_grid, CellValue, Grid, GridReader, JsonGridReader, Row};
pub use report::{ExtractionLog, ExtractionStats, SharedExtractionLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
