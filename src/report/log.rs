//! Extraction statistics log.
//!
//! Counts what happened to every row and block during assembly, so that
//! records which silently vanish from a dataset can still be accounted for.

use crate::core::detector::DetectedBlock;
use crate::error::DiscardReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running extraction counters.
#[derive(Debug)]
pub struct ExtractionLog {
    /// Grid rows visited by the scan
    rows_scanned: AtomicU64,
    /// Rows recognised as marker rows
    marker_rows: AtomicU64,
    /// Records that made it into a dataset
    records_emitted: AtomicU64,
    /// Blocks missing their light or temperature series
    discarded_incomplete: AtomicU64,
    /// Markers too close to the end of the grid
    discarded_out_of_bounds: AtomicU64,
    /// Blocks with an unresolvable cell
    discarded_malformed: AtomicU64,
    /// Blocks whose features could not be computed
    discarded_feature: AtomicU64,
    /// Sequence cells omitted as non-numeric
    parse_errors: AtomicU64,
    /// When this log was created
    started_at: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl ExtractionLog {
    /// Create a new, empty log.
    pub fn new() -> Self {
        Self {
            rows_scanned: AtomicU64::new(0),
            marker_rows: AtomicU64::new(0),
            records_emitted: AtomicU64::new(0),
            discarded_incomplete: AtomicU64::new(0),
            discarded_out_of_bounds: AtomicU64::new(0),
            discarded_malformed: AtomicU64::new(0),
            discarded_feature: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            started_at: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a log that accumulates on top of previously saved totals.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("could not load previous extraction stats: {e}");
        }

        log
    }

    /// Record rows visited by the scan.
    pub fn record_rows_scanned(&self, count: u64) {
        self.rows_scanned.fetch_add(count, Ordering::Relaxed);
    }

    /// Record the outcome of one detected block.
    pub fn record_block(&self, block: &DetectedBlock) {
        self.marker_rows.fetch_add(1, Ordering::Relaxed);
        self.parse_errors
            .fetch_add(block.parse_errors as u64, Ordering::Relaxed);

        let counter = match &block.outcome {
            Ok(_) => &self.records_emitted,
            Err(DiscardReason::Incomplete { .. }) => &self.discarded_incomplete,
            Err(DiscardReason::OutOfBoundsFollowerRow) => &self.discarded_out_of_bounds,
            Err(DiscardReason::MalformedCell(_)) => &self.discarded_malformed,
            Err(DiscardReason::Feature(_)) => &self.discarded_feature,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            rows_scanned: self.rows_scanned.load(Ordering::Relaxed),
            marker_rows: self.marker_rows.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            discarded_incomplete: self.discarded_incomplete.load(Ordering::Relaxed),
            discarded_out_of_bounds: self.discarded_out_of_bounds.load(Ordering::Relaxed),
            discarded_malformed: self.discarded_malformed.load(Ordering::Relaxed),
            discarded_feature: self.discarded_feature.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            started_at: self.started_at,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Extraction Statistics:\n\
             - Rows scanned: {}\n\
             - Marker rows found: {}\n\
             - Records emitted: {}\n\
             - Discarded (incomplete block): {}\n\
             - Discarded (marker at end of grid): {}\n\
             - Discarded (malformed cell): {}\n\
             - Discarded (feature failure): {}\n\
             - Non-numeric cells skipped: {}",
            stats.rows_scanned,
            stats.marker_rows,
            stats.records_emitted,
            stats.discarded_incomplete,
            stats.discarded_out_of_bounds,
            stats.discarded_malformed,
            stats.discarded_feature,
            stats.parse_errors
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let persisted = PersistedStats {
                totals: self.stats(),
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;
                let totals = persisted.totals;

                self.rows_scanned
                    .store(totals.rows_scanned, Ordering::Relaxed);
                self.marker_rows.store(totals.marker_rows, Ordering::Relaxed);
                self.records_emitted
                    .store(totals.records_emitted, Ordering::Relaxed);
                self.discarded_incomplete
                    .store(totals.discarded_incomplete, Ordering::Relaxed);
                self.discarded_out_of_bounds
                    .store(totals.discarded_out_of_bounds, Ordering::Relaxed);
                self.discarded_malformed
                    .store(totals.discarded_malformed, Ordering::Relaxed);
                self.discarded_feature
                    .store(totals.discarded_feature, Ordering::Relaxed);
                self.parse_errors
                    .store(totals.parse_errors, Ordering::Relaxed);
                self.started_at = totals.started_at;
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.rows_scanned,
            &self.marker_rows,
            &self.records_emitted,
            &self.discarded_incomplete,
            &self.discarded_out_of_bounds,
            &self.discarded_malformed,
            &self.discarded_feature,
            &self.parse_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for ExtractionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of extraction statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub rows_scanned: u64,
    pub marker_rows: u64,
    pub records_emitted: u64,
    pub discarded_incomplete: u64,
    pub discarded_out_of_bounds: u64,
    pub discarded_malformed: u64,
    pub discarded_feature: u64,
    pub parse_errors: u64,
    pub started_at: DateTime<Utc>,
}

impl ExtractionStats {
    /// Blocks dropped for any reason.
    pub fn discarded(&self) -> u64 {
        self.discarded_incomplete
            + self.discarded_out_of_bounds
            + self.discarded_malformed
            + self.discarded_feature
    }
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    totals: ExtractionStats,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared extraction log.
pub type SharedExtractionLog = Arc<ExtractionLog>;

/// Create a new shared extraction log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedExtractionLog {
    Arc::new(ExtractionLog::with_persistence(path))
}
