//! Reporting for extraction runs.
//!
//! This module tracks what the scan saw and what it threw away, so an empty
//! or short dataset can be explained after the fact.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log_with_persistence, ExtractionLog, ExtractionStats, SharedExtractionLog,
};
