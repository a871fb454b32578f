// Fill-handle drags: series detection and writes into the target range

use cell_area_wasm::controller::FillPhase;
use cell_area_wasm::geometry::FixedLayout;
use cell_area_wasm::{CellAreaController, CellAreaError, CellAreaOptions, CellSelection, CellValue, VecProvider};

fn controller(fields: &[&str], rows: Vec<Vec<CellValue>>, options: CellAreaOptions) -> CellAreaController<VecProvider, FixedLayout> {
    let (row_count, col_count) = (rows.len(), fields.len());
    let provider = VecProvider::from_rows(fields, rows);
    let mut ctrl = CellAreaController::new(provider, FixedLayout::new(row_count, col_count, 20.0, 80.0), options);
    ctrl.init().unwrap();
    ctrl
}

fn fill_options() -> CellAreaOptions {
    CellAreaOptions {
        enable_fill_handle: true,
        ..CellAreaOptions::default()
    }
}

fn blank_rows(count: usize, width: usize) -> Vec<Vec<CellValue>> {
    (0..count).map(|_| vec![CellValue::Empty; width]).collect()
}

#[test]
fn test_vertical_number_fill() {
    let mut rows: Vec<Vec<CellValue>> = vec![vec!["1".into(), "a".into()], vec!["3".into(), "b".into()]];
    rows.extend(blank_rows(3, 2));
    let mut ctrl = controller(&["n", "s"], rows, fill_options());

    ctrl.select_range(0, 0, 1, 1);
    ctrl.start_fill_drag(1, 1).unwrap();
    assert_eq!(ctrl.fill_state().phase, FillPhase::Dragging);
    assert_eq!(ctrl.update_fill_range(4, 1), Some(CellSelection::new(0, 0, 4, 1)));

    let report = ctrl.end_fill_drag().unwrap();
    assert_eq!(report.written, 6);

    let p = ctrl.provider();
    assert_eq!(p.get(2, 0), CellValue::Number(5.0));
    assert_eq!(p.get(3, 0), CellValue::Number(7.0));
    assert_eq!(p.get(4, 0), CellValue::Number(9.0));
    // Text column repeats its source
    assert_eq!(p.get(2, 1), CellValue::text("a"));
    assert_eq!(p.get(3, 1), CellValue::text("b"));
    assert_eq!(p.get(4, 1), CellValue::text("a"));

    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(0, 0, 4, 1)));
    assert_eq!(ctrl.fill_state().phase, FillPhase::Idle);
}

#[test]
fn test_horizontal_date_fill() {
    let rows = vec![vec![
        "2024-01-01".into(),
        "2024-01-08".into(),
        CellValue::Empty,
        CellValue::Empty,
    ]];
    let mut ctrl = controller(&["d0", "d1", "d2", "d3"], rows, fill_options());

    ctrl.select_range(0, 0, 0, 1);
    ctrl.start_fill_drag(0, 1).unwrap();
    assert_eq!(ctrl.update_fill_range(0, 3), Some(CellSelection::new(0, 0, 0, 3)));
    let report = ctrl.end_fill_drag().unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(ctrl.provider().get(0, 2), CellValue::text("2024-01-15"));
    assert_eq!(ctrl.provider().get(0, 3), CellValue::text("2024-01-22"));
}

#[test]
fn test_single_value_fill_copies_down() {
    let mut rows: Vec<Vec<CellValue>> = vec![vec!["x".into()]];
    rows.extend(blank_rows(2, 1));
    let mut ctrl = controller(&["c"], rows, fill_options());

    ctrl.select_cell(0, 0);
    ctrl.start_fill_drag(0, 0).unwrap();
    ctrl.update_fill_range(2, 0);
    ctrl.end_fill_drag().unwrap();

    assert_eq!(ctrl.provider().get(1, 0), CellValue::text("x"));
    assert_eq!(ctrl.provider().get(2, 0), CellValue::text("x"));
}

#[test]
fn test_fill_back_onto_source_writes_nothing() {
    let mut ctrl = controller(&["c"], vec![vec!["1".into()], vec!["2".into()]], fill_options());

    ctrl.select_range(0, 0, 1, 0);
    ctrl.start_fill_drag(1, 0).unwrap();
    ctrl.update_fill_range(0, 0);
    let report = ctrl.end_fill_drag().unwrap();

    assert_eq!(report.written, 0);
    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(0, 0, 1, 0)));
    assert_eq!(ctrl.fill_state().phase, FillPhase::Idle);
}

#[test]
fn test_fill_skips_readonly_column_when_configured() {
    let mut rows: Vec<Vec<CellValue>> = vec![vec!["1".into(), "1".into()], vec!["2".into(), "2".into()]];
    rows.extend(blank_rows(1, 2));
    let options = CellAreaOptions {
        readonly_columns: vec!["locked".to_string()],
        skip_readonly_on_paste: true,
        ..fill_options()
    };
    let mut ctrl = controller(&["open", "locked"], rows, options);

    ctrl.select_range(0, 0, 1, 1);
    ctrl.start_fill_drag(1, 1).unwrap();
    ctrl.update_fill_range(2, 1);
    let report = ctrl.end_fill_drag().unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.skipped_readonly, 1);
    assert_eq!(ctrl.provider().get(2, 0), CellValue::Number(3.0));
    assert_eq!(ctrl.provider().get(2, 1), CellValue::Empty);
}

#[test]
fn test_fill_needs_selection() {
    let mut ctrl = controller(&["c"], vec![vec!["1".into()]], fill_options());
    assert_eq!(ctrl.start_fill_drag(0, 0), Err(CellAreaError::NoSelection));
}

#[test]
fn test_end_without_drag_is_noop() {
    let mut ctrl = controller(&["c"], vec![vec!["1".into()]], fill_options());
    ctrl.select_cell(0, 0);
    let report = ctrl.end_fill_drag().unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(ctrl.provider().get(0, 0), CellValue::text("1"));
}
