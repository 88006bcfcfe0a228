//! End-to-end tests for LayoutEngine::reconstruct.

mod common;

use std::sync::Arc;
use std::thread;

use cardgrid_core::engine::{EngineConfig, LayoutEngine};
use cardgrid_core::error::LayoutError;
use cardgrid_core::ingest::{Detection, ImageSize};
use cardgrid_core::layout::{EngineParams, Geometry};
use cardgrid_core::normalize::RuleSet;
use cardgrid_core::source::parse_detections;

use common::{XorShift64, card_sheet, rect};

// ============================================================================
// Documented scenarios
// ============================================================================

#[test]
fn test_single_column_cards() {
    let detections = vec![
        rect(10.0, 0.0, 200.0, 30.0, "Solar", 0.9),
        rect(10.0, 40.0, 200.0, 70.0, "Panel", 0.8),
        rect(10.0, 110.0, 200.0, 140.0, "Inverter", 0.7),
    ];
    let result = LayoutEngine::default().reconstruct(&detections, None).unwrap();
    assert_eq!(result.rows, 2);
    assert_eq!(result.columns, 1);
    assert_eq!(result.cells[0][0].text, "Solar\nPanel");
    assert_eq!(result.cells[0][0].confidence, 0.85);
    assert_eq!(result.cells[1][0].text, "Inverter");
    assert_eq!(result.overall_confidence, 0.8);
    assert_eq!(result.block_count, 3);
}

#[test]
fn test_two_columns() {
    let detections: Vec<Detection> = [10.0, 12.0, 14.0, 500.0, 505.0, 508.0]
        .iter()
        .enumerate()
        .map(|(i, x)| rect(*x, i as f64 * 100.0, x + 80.0, i as f64 * 100.0 + 20.0, "x", 0.9))
        .collect();
    let result = LayoutEngine::default().reconstruct(&detections, None).unwrap();
    assert_eq!(result.columns, 2);
    assert!(result.cells.iter().all(|row| row.len() == 2));
}

#[test]
fn test_text_corrections_applied_to_cells() {
    let detections = vec![
        rect(0.0, 0.0, 100.0, 20.0, "928Panels", 0.9),
        rect(0.0, 200.0, 100.0, 220.0, "Enerqy", 0.9),
        rect(0.0, 400.0, 100.0, 420.0, "10Ok WSolar", 0.9),
    ];
    let result = LayoutEngine::default().reconstruct(&detections, None).unwrap();
    let texts: Vec<&str> = result.cells.iter().map(|row| row[0].text.as_str()).collect();
    assert_eq!(texts, vec!["928 Panels", "Energy", "100k W Solar"]);
    assert_eq!(result.text, "928 Panels\nEnergy\n100k W Solar");
}

#[test]
fn test_empty_detection_list() {
    let result = LayoutEngine::default().reconstruct(&[], None).unwrap();
    assert_eq!(result.rows, 0);
    assert_eq!(result.columns, 0);
    assert!(result.cells.is_empty());
    assert_eq!(result.overall_confidence, 0.0);
    assert_eq!(result.dropped_block_count, 0);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_shared_start_y_one_card_per_column() {
    let mut detections = Vec::new();
    for col in 0..3 {
        for i in 0..4 {
            let x = col as f64 * 600.0 + i as f64 * 2.0;
            detections.push(rect(x, 100.0, x + 50.0, 120.0, "w", 0.9));
        }
    }
    let result = LayoutEngine::default().reconstruct(&detections, None).unwrap();
    assert_eq!(result.columns, 3);
    assert_eq!(result.rows, 1);
    assert!(result.cells[0].iter().all(|c| c.present));
}

#[test]
fn test_ragged_columns_have_placeholders() {
    let detections = card_sheet(11, &[5, 3]);
    let result = LayoutEngine::default().reconstruct(&detections, None).unwrap();
    assert_eq!(result.rows, 5);
    assert_eq!(result.columns, 2);
    for row in 3..5 {
        let cell = result.cell(row, 1).unwrap();
        assert!(!cell.present);
        assert!(cell.text.is_empty());
    }
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.starts_with("column 1 has 3 card(s)"))
    );
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_random_sheets_hold_invariants() {
    let mut rng = XorShift64::new(99);
    let engine = LayoutEngine::default();
    for seed in 1..40 {
        let columns = rng.gen_usize(1, 4);
        let counts: Vec<usize> = (0..columns).map(|_| rng.gen_usize(0, 6)).collect();
        let detections = card_sheet(seed, &counts);
        let result = engine.reconstruct(&detections, None).unwrap();

        assert_eq!(result.rows, counts.iter().copied().max().unwrap_or(0));
        assert!((0.0..=1.0).contains(&result.overall_confidence));
        assert_eq!(result.block_count, detections.len());
        assert_eq!(result.cells.len(), result.rows);
        for row in &result.cells {
            assert_eq!(row.len(), result.columns);
            for cell in row {
                assert!((0.0..=1.0).contains(&cell.confidence));
                assert_eq!(cell.present, !cell.text.is_empty());
            }
        }
    }
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = Arc::new(LayoutEngine::default());
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let detections = card_sheet(seed, &[3, 3, 3]);
                engine.reconstruct(&detections, None).map(|r| (r.rows, r.columns))
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), (3, 3));
    }
}

// ============================================================================
// Errors and filtering
// ============================================================================

#[test]
fn test_invalid_confidence_is_fatal() {
    let detections = vec![
        rect(0.0, 0.0, 10.0, 10.0, "ok", 0.9),
        rect(0.0, 20.0, 10.0, 30.0, "bad", -0.1),
    ];
    let err = LayoutEngine::default()
        .reconstruct(&detections, None)
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidInput { index: 1, .. }));
}

#[test]
fn test_invalid_polygon_is_fatal() {
    let detections = vec![Detection::new(
        Geometry::Polygon(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [5.0, 5.0]]),
        "pentagon",
        0.9,
    )];
    assert!(matches!(
        LayoutEngine::default().reconstruct(&detections, None),
        Err(LayoutError::InvalidInput { index: 0, .. })
    ));
}

#[test]
fn test_min_confidence_filter_counts_drops() {
    let params = EngineParams::new(0.667, 1.2, 0.6, false).unwrap();
    let engine = LayoutEngine::new(params, RuleSet::builtin()).unwrap();
    let detections = vec![
        rect(0.0, 0.0, 100.0, 20.0, "keep", 0.9),
        rect(0.0, 24.0, 100.0, 44.0, "noise", 0.3),
        rect(0.0, 48.0, 100.0, 68.0, "noise", 0.1),
    ];
    let result = engine.reconstruct(&detections, None).unwrap();
    assert_eq!(result.dropped_block_count, 2);
    assert_eq!(result.block_count, 1);
    assert_eq!(result.cells[0][0].text, "keep");
}

#[test]
fn test_everything_dropped_gives_empty_grid() {
    let detections = vec![rect(900.0, 900.0, 950.0, 920.0, "far away", 0.9)];
    let size = ImageSize {
        width: 640.0,
        height: 480.0,
    };
    let result = LayoutEngine::default()
        .reconstruct(&detections, Some(size))
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.columns, 0);
    assert_eq!(result.dropped_block_count, 1);
    assert_eq!(result.warnings.len(), 2);
}

#[test]
fn test_out_of_range_params_never_reach_clustering() {
    let params = EngineParams {
        column_gap_ratio: -1.0,
        ..EngineParams::default()
    };
    assert!(matches!(
        LayoutEngine::new(params, RuleSet::builtin()),
        Err(LayoutError::InvalidConfig(_))
    ));

    // valid parameters give one column per distinct start
    let detections: Vec<Detection> = [10.0, 20.0, 10.0, 20.0]
        .iter()
        .enumerate()
        .map(|(i, x)| rect(*x, i as f64 * 24.0, x + 100.0, i as f64 * 24.0 + 20.0, "x", 0.9))
        .collect();
    let result = LayoutEngine::default().reconstruct(&detections, None).unwrap();
    assert_eq!(result.columns, 2);
    assert_eq!(result.block_count, 4);
}

#[test]
fn test_degenerate_image_size_is_input_error() {
    let detections = vec![rect(0.0, 0.0, 10.0, 10.0, "x", 0.9)];
    let size = ImageSize {
        width: 0.0,
        height: 480.0,
    };
    assert!(matches!(
        LayoutEngine::default().reconstruct(&detections, Some(size)),
        Err(LayoutError::InvalidImageSize { .. })
    ));
}

// ============================================================================
// Configuration and decoding
// ============================================================================

#[test]
fn test_config_file_round_trip_through_engine() {
    let config = EngineConfig::from_json(
        r#"{
            "rowGapMultiplier": 3.0,
            "correctionDictionary": {"Invertor": "Inverter"},
            "parallel": false
        }"#,
    )
    .unwrap();
    let engine = config.build().unwrap();
    let detections = vec![
        rect(0.0, 0.0, 100.0, 20.0, "Hybrid", 0.9),
        rect(0.0, 60.0, 100.0, 80.0, "Invertor", 0.9),
    ];
    let result = engine.reconstruct(&detections, None).unwrap();
    // gap 40 <= 20 * 3.0
    assert_eq!(result.rows, 1);
    assert_eq!(result.cells[0][0].text, "Hybrid\nInverter");
}

#[test]
fn test_recognizer_lines_end_to_end() {
    let doc = parse_detections(
        r#"[[
            [[[10, 10], [120, 10], [120, 34], [10, 34]], ["928Panels", 0.95]],
            [[[10, 40], [120, 40], [120, 64], [10, 64]], ["So1ar", 0.85]],
            [[[600, 10], [700, 10], [700, 34], [600, 34]], ["Enerqy", 0.9]]
        ]]"#,
    )
    .unwrap();
    let result = LayoutEngine::default()
        .reconstruct(&doc.detections, doc.image)
        .unwrap();
    assert_eq!((result.rows, result.columns), (1, 2));
    assert_eq!(result.cells[0][0].text, "928 Panels\nSolar");
    assert_eq!(result.cells[0][1].text, "Energy");
    assert_eq!(result.overall_confidence, 0.9);
}
