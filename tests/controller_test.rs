// Controller driven through a fixed-size layout, the way a canvas host would

use cell_area_wasm::controller::{BorderStyle, InteractionState, NavKey};
use cell_area_wasm::geometry::FixedLayout;
use cell_area_wasm::{
    CellAreaController, CellAreaError, CellAreaOptions, CellSelection, CellValue, ClipboardBackend, Direction,
    GeometryRect, MemoryClipboard, VecProvider,
};

type Controller = CellAreaController<VecProvider, FixedLayout>;

fn numbered(rows: usize, cols: usize) -> Controller {
    let fields: Vec<String> = (0..cols).map(|c| format!("f{}", c)).collect();
    let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
    let data = (0..rows)
        .map(|r| (0..cols).map(|c| CellValue::Number((r * 10 + c) as f64)).collect())
        .collect();
    let mut layout = FixedLayout::new(rows, cols, 25.0, 100.0);
    layout.origin = (10.0, 40.0);
    let mut ctrl = CellAreaController::new(VecProvider::from_rows(&field_refs, data), layout, CellAreaOptions::default());
    ctrl.init().unwrap();
    ctrl
}

#[test]
fn test_mouse_drag_then_copy() {
    let mut ctrl = numbered(4, 3);
    let clipboard = MemoryClipboard::new();

    let down = ctrl.surface().hit_test(10.0 + 150.0, 40.0 + 30.0);
    let over = ctrl.surface().hit_test(10.0 + 250.0, 40.0 + 80.0);
    assert!(ctrl.pointer_down(&down, false, false));
    assert!(ctrl.pointer_move(&over));
    ctrl.pointer_up();

    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(1, 1, 3, 2)));
    assert_eq!(ctrl.state(), InteractionState::Fixed);

    let payload = pollster::block_on(ctrl.copy_selection(&clipboard)).unwrap();
    assert_eq!(payload.text, "11\t12\n21\t22\n31\t32");
    assert_eq!(ctrl.overlay().border_style, BorderStyle::Dashed);
}

#[test]
fn test_copy_rejected_by_clipboard() {
    let mut ctrl = numbered(2, 2);
    ctrl.select_cell(0, 0);

    let result = pollster::block_on(ctrl.copy_selection(&MemoryClipboard::denied()));
    assert!(matches!(result, Err(CellAreaError::ClipboardAccessDenied(_))));
    // No "copied" feedback for a failed write
    assert_eq!(ctrl.overlay().border_style, BorderStyle::Solid);
}

#[test]
fn test_copy_and_paste_need_selection() {
    let mut ctrl = numbered(2, 2);
    let clipboard = MemoryClipboard::with_text("x");

    assert_eq!(pollster::block_on(ctrl.copy_selection(&clipboard)), Err(CellAreaError::NoSelection));
    assert_eq!(pollster::block_on(ctrl.paste_from_clipboard(&clipboard)), Err(CellAreaError::NoSelection));
    assert_eq!(ctrl.provider().get(0, 0), CellValue::Number(0.0));
}

#[test]
fn test_copy_after_destroy() {
    let mut ctrl = numbered(2, 2);
    ctrl.select_cell(0, 0);
    ctrl.destroy();
    assert_eq!(pollster::block_on(ctrl.copy_selection(&MemoryClipboard::new())), Err(CellAreaError::Destroyed));
}

#[test]
fn test_copy_reads_values_at_call_time() {
    let mut ctrl = numbered(2, 2);
    ctrl.select_cell(1, 1);
    ctrl.paste_text("changed").unwrap();
    assert_eq!(ctrl.copy_payload().unwrap().text, "changed");
}

#[test]
fn test_keyboard_walk_stays_in_bounds() {
    let mut ctrl = numbered(3, 3);
    ctrl.select_cell(0, 0);

    assert!(ctrl.key_down(NavKey::ArrowUp, false));
    assert!(ctrl.key_down(NavKey::ArrowLeft, false));
    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(0, 0, 0, 0)));

    for _ in 0..5 {
        ctrl.key_down(NavKey::Enter, false);
    }
    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(2, 0, 2, 0)));

    assert!(ctrl.key_down(NavKey::ArrowUp, true));
    assert!(ctrl.key_down(NavKey::ArrowRight, true));
    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(2, 0, 1, 1)));
}

#[test]
fn test_keyboard_disabled() {
    let options = CellAreaOptions {
        enable_keyboard: false,
        ..CellAreaOptions::default()
    };
    let provider = VecProvider::from_rows(&["a"], vec![vec![1i64.into()], vec![2i64.into()]]);
    let mut ctrl = CellAreaController::new(provider, FixedLayout::new(2, 1, 20.0, 50.0), options);
    ctrl.init().unwrap();
    ctrl.select_cell(0, 0);

    assert!(!ctrl.key_down(NavKey::ArrowDown, false));
    // Programmatic moves still work
    assert!(ctrl.move_selection(Direction::Down, false).is_some());
    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(1, 0, 1, 0)));
}

#[test]
fn test_overlay_tracks_scroll() {
    let mut ctrl = numbered(6, 3);
    ctrl.select_range(2, 1, 3, 2);
    let rect = ctrl.overlay().rect;
    assert_eq!(rect, Some(GeometryRect { top: 50.0, left: 100.0, width: 200.0, height: 50.0 }));

    ctrl.surface_mut().scroll_to(40.0, 60.0);
    ctrl.refresh_overlay();
    assert_eq!(ctrl.overlay().rect, rect);
}

#[test]
fn test_memory_clipboard_round_trip() {
    let clipboard = MemoryClipboard::new();
    pollster::block_on(clipboard.write_text("a\tb")).unwrap();
    assert_eq!(pollster::block_on(clipboard.read_text()).unwrap(), "a\tb");
}

#[test]
fn test_move_after_rows_removed_stays_in_grid() {
    let mut ctrl = numbered(6, 2);
    ctrl.select_cell(5, 1);
    ctrl.provider_mut().rows.truncate(2);

    let moved = ctrl.move_selection(Direction::Up, false).unwrap();
    assert_eq!(moved, CellSelection::new(1, 1, 1, 1));
    assert!(ctrl.key_down(NavKey::ArrowDown, false));
    assert_eq!(ctrl.get_selection(), Some(CellSelection::new(1, 1, 1, 1)));
}

#[test]
fn test_paste_uses_drag_start_as_anchor() {
    let mut ctrl = numbered(3, 2);
    ctrl.select_range(2, 1, 1, 0);
    ctrl.paste_text("X").unwrap();

    assert_eq!(ctrl.provider().get(2, 1), CellValue::text("X"));
    assert_eq!(ctrl.provider().get(1, 0), CellValue::Number(10.0));
}
