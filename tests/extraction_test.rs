//! End-to-end tests for grid extraction

use sensorgrid::core::{render, ExportSamples};
use sensorgrid::{
    assemble, detect_next_block, read_grid, truncate, CellValue, DatasetError, DiscardReason,
    ExportBuilder, ExportFormat, ExtractionLog, Grid, LayoutConfig, Row,
};
use std::io::Write;
use std::num::NonZeroUsize;

fn row_of(cells: &[&str]) -> Row {
    cells.iter().copied().collect()
}

/// A grid shaped like a real sensor export: a header, three record blocks
/// (one with swapped follower rows), free-form rows in between, and a marker
/// stranded on the last row.
fn export_like_grid() -> Grid {
    Grid::new(vec![
        row_of(&["Sensor export", "", "", "created 2023-03-15"]),
        row_of(&["Target", "Id", "Kind", "Dates"]),
        // block 1: accepted
        row_of(&["fridge", "S-001", "ModuleCode", "45000", "", "45000.25"]),
        row_of(&["ISL29035_Light", "0", "0", "3", "-1", "5"]),
        row_of(&["SHT3X_Temperature", "1", "2", "3", "4", "5"]),
        row_of(&[]),
        // block 2: follower titles swapped, discarded
        row_of(&["freezer", "S-002", "ModuleCode", "45001"]),
        row_of(&["SHT3X_Temperature", "-18", "-19"]),
        row_of(&["ISL29035_Light", "0", "0"]),
        // block 3: accepted, shared strings for label and marker
        Row::new(vec![
            CellValue::shared(0),
            CellValue::text("S-003"),
            CellValue::shared(1),
            CellValue::text("45002"),
            CellValue::text("45002.5"),
        ]),
        row_of(&["ISL29035_Light", "12", "14"]),
        row_of(&["SHT3X_Temperature", "21.5", "22.5", "23.0"]),
        // stranded marker
        row_of(&["room", "S-004", "ModuleCode", "45003"]),
    ])
    .with_shared_strings(vec!["room".to_string(), "ModuleCode".to_string()])
}

#[test]
fn test_full_pipeline() {
    let grid = export_like_grid();
    let log = ExtractionLog::new();

    let dataset = assemble(&grid, &LayoutConfig::default(), &log)
        .require_records()
        .expect("records expected");

    let samples = dataset.labeled_samples();
    assert_eq!(samples.len(), 2);

    let first = &samples[0];
    assert_eq!(first.target, "fridge");
    assert_eq!(first.sensor_id, "S-001");
    assert_eq!(first.features.length, 5.0);
    assert!((first.features.mean - 3.0).abs() < 1e-12);
    assert!((first.features.dispersion - 10f64.sqrt() / 5.0).abs() < 1e-12);
    assert_eq!(first.features.min, 1.0);
    assert_eq!(first.features.width, 4.0);
    assert_eq!(first.features.positive_light_count, 2.0);
    assert!((first.features.timespan_minutes - 360.0).abs() < 1e-6);

    assert_eq!(samples[1].target, "room");
    assert_eq!(samples[1].sensor_id, "S-003");

    let stats = log.stats();
    assert_eq!(stats.rows_scanned, 13);
    assert_eq!(stats.marker_rows, 4);
    assert_eq!(stats.records_emitted, 2);
    assert_eq!(stats.discarded_incomplete, 1);
    assert_eq!(stats.discarded_out_of_bounds, 1);
}

#[test]
fn test_detector_can_be_driven_by_hand() {
    let grid = export_like_grid();
    let layout = LayoutConfig::default();

    let mut markers = Vec::new();
    let mut row = 0;
    loop {
        let (block, next_row) = detect_next_block(&grid, row, &layout);
        let Some(block) = block else { break };
        assert_eq!(next_row, block.marker_row + 1);
        markers.push((block.marker_row, block.is_accepted()));
        row = next_row;
    }

    assert_eq!(markers, vec![(2, true), (6, false), (9, true), (12, false)]);
}

#[test]
fn test_grid_without_markers_is_empty() {
    let grid = Grid::new(vec![
        row_of(&["a", "b", "c", "d"]),
        row_of(&["SHT3X_Temperature", "1", "2"]),
    ]);

    let dataset = assemble(&grid, &LayoutConfig::default(), &ExtractionLog::new());
    assert!(dataset.is_empty());
    assert_eq!(
        dataset.require_records().unwrap_err(),
        DatasetError::Empty {
            rows: 2,
            markers: 0
        }
    );
}

#[test]
fn test_marker_on_last_row_only() {
    let grid = Grid::new(vec![row_of(&["room", "S-1", "ModuleCode", "45000"])]);
    let (block, next_row) = detect_next_block(&grid, 0, &LayoutConfig::default());

    assert_eq!(next_row, 1);
    assert_eq!(
        block.unwrap().outcome,
        Err(DiscardReason::OutOfBoundsFollowerRow)
    );
}

#[test]
fn test_extraction_is_repeatable() {
    let grid = export_like_grid();
    let layout = LayoutConfig::default();

    let first = assemble(&grid, &layout, &ExtractionLog::new());
    let second = assemble(&grid, &layout, &ExtractionLog::new());
    assert_eq!(first, second);
}

#[test]
fn test_truncated_export() {
    let grid = export_like_grid();
    let layout = LayoutConfig::default();
    let dataset = assemble(&grid, &layout, &ExtractionLog::new());

    let records = truncate(&dataset, NonZeroUsize::new(3).unwrap());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].temperature, vec![1.0, 2.0, 3.0]);
    assert!((records[0].stats.mean - 2.0).abs() < 1e-12);

    let export = ExportBuilder::new().build_truncated(records, &layout, 3);
    let json = render(&export, ExportFormat::Json).unwrap();
    assert!(json.contains("\"truncation_length\": 3"));

    match export.samples {
        ExportSamples::Truncated(items) => assert_eq!(items[1].sensor_id, "S-003"),
        ExportSamples::Labeled(_) => panic!("expected truncated samples"),
    }
}

#[test]
fn test_read_grid_document_from_disk() {
    let document = serde_json::json!({
        "shared_strings": ["ModuleCode"],
        "rows": [
            ["kitchen", "S-10", {"shared": 0}, "45000", "45000.5"],
            ["ISL29035_Light", "4"],
            ["SHT3X_Temperature", "19.5", "20.5"]
        ]
    });

    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(document.to_string().as_bytes()).unwrap();

    let grid = read_grid(file.path()).unwrap();
    let dataset = assemble(&grid, &LayoutConfig::default(), &ExtractionLog::new());

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0].target(), "kitchen");
    assert!((dataset.records()[0].feature_vector().timespan_minutes - 720.0).abs() < 1e-6);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_assembly_matches() {
    let grid = export_like_grid();
    let layout = LayoutConfig::default();

    let sequential = assemble(&grid, &layout, &ExtractionLog::new());
    let parallel = sensorgrid::assemble_parallel(&grid, &layout, &ExtractionLog::new());
    assert_eq!(sequential, parallel);
}
