//! Dataset assembly.
//!
//! Drives block detection across a whole grid and keeps the accepted records
//! in scan order. Discarded blocks are logged and counted, never fatal; only
//! an empty result is an error, and it is up to the caller to ask for that
//! check with [`Dataset::require_records`].

use crate::config::LayoutConfig;
use crate::core::detector::{blocks, DetectedBlock};
use crate::core::features::FeatureVector;
use crate::core::record::Record;
use crate::error::{DatasetError, DiscardReason};
use crate::grid::types::Grid;
use crate::report::ExtractionLog;
use serde::{Deserialize, Serialize};

/// Per-run counts reported by the assembler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblySummary {
    pub rows_scanned: usize,
    pub marker_rows: usize,
    pub records: usize,
    pub discarded: usize,
}

/// Accepted records, in grid row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    summary: AssemblySummary,
}

/// What the training side consumes: a label and its feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub sensor_id: String,
    pub target: String,
    pub features: FeatureVector,
}

impl Dataset {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> &AssemblySummary {
        &self.summary
    }

    /// Labels and feature vectors, in record order.
    pub fn labeled_samples(&self) -> Vec<LabeledSample> {
        self.records
            .iter()
            .map(|r| LabeledSample {
                sensor_id: r.sensor_id().to_string(),
                target: r.target().to_string(),
                features: *r.feature_vector(),
            })
            .collect()
    }

    /// Fail when nothing was extracted.
    pub fn require_records(self) -> Result<Self, DatasetError> {
        if self.records.is_empty() {
            return Err(DatasetError::Empty {
                rows: self.summary.rows_scanned,
                markers: self.summary.marker_rows,
            });
        }
        Ok(self)
    }
}

/// Assemble a dataset with a single sequential scan.
pub fn assemble(grid: &Grid, layout: &LayoutConfig, log: &ExtractionLog) -> Dataset {
    let mut collector = Collector::new(log);
    let mut scan = blocks(grid, layout);

    for block in scan.by_ref() {
        collector.accept(block);
    }

    collector.finish(scan.rows_scanned())
}

/// Assemble a dataset with blocks built on the rayon pool.
///
/// Marker rows are located first; each block is then built independently and
/// collected back in marker-row order, so the result equals [`assemble`].
#[cfg(feature = "parallel")]
pub fn assemble_parallel(grid: &Grid, layout: &LayoutConfig, log: &ExtractionLog) -> Dataset {
    use crate::core::detector::{build_block, is_marker_row};
    use rayon::prelude::*;

    let markers: Vec<usize> = (0..grid.row_count())
        .into_par_iter()
        .filter(|&row| is_marker_row(grid, row, layout))
        .collect();

    let built: Vec<DetectedBlock> = markers
        .par_iter()
        .map(|&row| build_block(grid, row, layout))
        .collect();

    let mut collector = Collector::new(log);
    for block in built {
        collector.accept(block);
    }

    collector.finish(grid.row_count())
}

/// Accumulates block outcomes into a dataset.
struct Collector<'l> {
    log: &'l ExtractionLog,
    records: Vec<Record>,
    summary: AssemblySummary,
}

impl<'l> Collector<'l> {
    fn new(log: &'l ExtractionLog) -> Self {
        Self {
            log,
            records: Vec::new(),
            summary: AssemblySummary::default(),
        }
    }

    fn accept(&mut self, block: DetectedBlock) {
        self.log.record_block(&block);
        self.summary.marker_rows += 1;

        match block.outcome {
            Ok(record) => {
                tracing::debug!(
                    "row {}: record for sensor {} ({} readings)",
                    block.marker_row,
                    record.sensor_id(),
                    record.temperature().len()
                );
                self.records.push(record);
            }
            Err(reason @ DiscardReason::Incomplete { .. }) => {
                self.summary.discarded += 1;
                tracing::debug!("row {}: discarded, {reason}", block.marker_row);
            }
            Err(reason) => {
                self.summary.discarded += 1;
                tracing::warn!("row {}: discarded, {reason}", block.marker_row);
            }
        }
    }

    fn finish(mut self, rows_scanned: usize) -> Dataset {
        self.log.record_rows_scanned(rows_scanned as u64);
        self.summary.rows_scanned = rows_scanned;
        self.summary.records = self.records.len();

        tracing::info!(
            "extracted {} records from {} marker rows ({} discarded, {} rows)",
            self.summary.records,
            self.summary.marker_rows,
            self.summary.discarded,
            self.summary.rows_scanned
        );

        Dataset {
            records: self.records,
            summary: self.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::types::Row;

    fn row_of(cells: &[&str]) -> Row {
        cells.iter().copied().collect()
    }

    fn block_rows(target: &str, sensor: &str, temps: &[&str]) -> Vec<Row> {
        let mut temperature = vec!["SHT3X_Temperature"];
        temperature.extend_from_slice(temps);
        vec![
            row_of(&[target, sensor, "ModuleCode", "45000", "45000.25"]),
            row_of(&["ISL29035_Light", "0", "7"]),
            row_of(&temperature),
        ]
    }

    fn sample_grid() -> Grid {
        let mut rows = vec![row_of(&["export", "2024"])];
        rows.extend(block_rows("indoor", "S-1", &["20", "21", "22"]));
        rows.push(row_of(&["notes"]));
        rows.extend(block_rows("outdoor", "S-2", &["5", "6"]));
        rows.push(row_of(&["late", "S-3", "ModuleCode", "45001"]));
        Grid::new(rows)
    }

    #[test]
    fn test_assemble_keeps_scan_order() {
        let log = ExtractionLog::new();
        let dataset = assemble(&sample_grid(), &LayoutConfig::default(), &log);

        let ids: Vec<&str> = dataset.records().iter().map(|r| r.sensor_id()).collect();
        assert_eq!(ids, vec!["S-1", "S-2"]);

        let summary = dataset.summary();
        assert_eq!(summary.marker_rows, 3);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.rows_scanned, 9);

        let stats = log.stats();
        assert_eq!(stats.records_emitted, 2);
        assert_eq!(stats.discarded_out_of_bounds, 1);
    }

    #[test]
    fn test_labeled_samples() {
        let dataset = assemble(
            &sample_grid(),
            &LayoutConfig::default(),
            &ExtractionLog::new(),
        );
        let samples = dataset.labeled_samples();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].target, "indoor");
        assert_eq!(samples[0].features.length, 3.0);
        assert_eq!(samples[0].features.positive_light_count, 1.0);
        assert!((samples[0].features.timespan_minutes - 360.0).abs() < 1e-6);
        assert_eq!(samples[1].target, "outdoor");
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let grid = Grid::new(vec![row_of(&["a", "b", "c"])]);
        let dataset = assemble(&grid, &LayoutConfig::default(), &ExtractionLog::new());

        assert!(dataset.is_empty());
        assert_eq!(
            dataset.require_records(),
            Err(DatasetError::Empty {
                rows: 1,
                markers: 0
            })
        );
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let grid = sample_grid();
        let layout = LayoutConfig::default();

        let first = assemble(&grid, &layout, &ExtractionLog::new());
        let second = assemble(&grid, &layout, &ExtractionLog::new());
        assert_eq!(first, second);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let grid = sample_grid();
        let layout = LayoutConfig::default();

        let sequential = assemble(&grid, &layout, &ExtractionLog::new());
        let parallel = assemble_parallel(&grid, &layout, &ExtractionLog::new());
        assert_eq!(sequential, parallel);
    }
}
