//! Rectangular cell selection
//!
//! A selection is an anchor (`start_*`) plus a current point (`end_*`).
//! Nothing here orders the two; use [`normalize_selection`] when the
//! top-left/bottom-right form is needed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A logical (row, column) coordinate in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Clamp into `[0, row_count-1] x [0, col_count-1]`
    pub fn clamp_to(self, row_count: usize, col_count: usize) -> Self {
        Self {
            row: self.row.min(row_count.saturating_sub(1)),
            col: self.col.min(col_count.saturating_sub(1)),
        }
    }
}

/// Anchor + current point of a rectangular selection (possibly unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSelection {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellSelection {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self { start_row, start_col, end_row, end_col }
    }

    /// Degenerate selection covering a single cell
    pub fn single(pos: CellPos) -> Self {
        Self::new(pos.row, pos.col, pos.row, pos.col)
    }

    pub fn spanning(anchor: CellPos, current: CellPos) -> Self {
        Self::new(anchor.row, anchor.col, current.row, current.col)
    }

    pub fn start(&self) -> CellPos {
        CellPos::new(self.start_row, self.start_col)
    }

    pub fn end(&self) -> CellPos {
        CellPos::new(self.end_row, self.end_col)
    }

    pub fn normalized(&self) -> Self {
        normalize_selection(self)
    }

    /// Number of rows covered (at least 1)
    pub fn height(&self) -> usize {
        self.start_row.abs_diff(self.end_row) + 1
    }

    /// Number of columns covered (at least 1)
    pub fn width(&self) -> usize {
        self.start_col.abs_diff(self.end_col) + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        let n = self.normalized();
        (n.start_row..=n.end_row).contains(&pos.row) && (n.start_col..=n.end_col).contains(&pos.col)
    }
}

/// Order a selection so that start <= end on both axes
pub fn normalize_selection(selection: &CellSelection) -> CellSelection {
    CellSelection {
        start_row: selection.start_row.min(selection.end_row),
        start_col: selection.start_col.min(selection.end_col),
        end_row: selection.start_row.max(selection.end_row),
        end_col: selection.start_col.max(selection.end_col),
    }
}

/// Field-by-field equality, without normalizing either side
///
/// `{0,0,2,2}` and `{2,2,0,0}` cover the same cells but are NOT the same
/// selection here. An absent selection never equals anything.
pub fn is_same_selection(a: Option<&CellSelection>, b: Option<&CellSelection>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.start_row == b.start_row
                && a.start_col == b.start_col
                && a.end_row == b.end_row
                && a.end_col == b.end_col
        }
        _ => false,
    }
}

/// Navigation direction for keyboard moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Step `pos` one cell, staying inside the grid bounds
    ///
    /// A point already outside the bounds (the grid shrank) is pulled back in.
    pub fn step(self, pos: CellPos, row_count: usize, col_count: usize) -> CellPos {
        let stepped = match self {
            Direction::Up => CellPos::new(pos.row.saturating_sub(1), pos.col),
            Direction::Down => CellPos::new(pos.row.saturating_add(1), pos.col),
            Direction::Left => CellPos::new(pos.row, pos.col.saturating_sub(1)),
            Direction::Right => CellPos::new(pos.row, pos.col.saturating_add(1)),
        };
        stepped.clamp_to(row_count, col_count)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("Unknown direction '{}'", other)),
        }
    }
}

/// Holds the current selection; knows nothing about grid bounds
///
/// Callers clamp coordinates before handing them in. Every change
/// replaces the stored selection rather than editing it.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selection: Option<CellSelection>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&CellSelection> {
        self.selection.as_ref()
    }

    pub fn select_cell(&mut self, row: usize, col: usize) {
        self.selection = Some(CellSelection::single(CellPos::new(row, col)));
    }

    pub fn select_range(&mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) {
        self.selection = Some(CellSelection::new(start_row, start_col, end_row, end_col));
    }

    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// Step the selection's end point; keep the anchor when `extend` is set
    ///
    /// Returns the new selection, or `None` if nothing was selected.
    pub fn move_selection(
        &mut self,
        direction: Direction,
        extend: bool,
        row_count: usize,
        col_count: usize,
    ) -> Option<CellSelection> {
        let current = self.selection?;
        let next = direction.step(current.end(), row_count, col_count);

        if extend {
            let anchor = current.start().clamp_to(row_count, col_count);
            self.select_range(anchor.row, anchor.col, next.row, next.col);
        } else {
            self.select_cell(next.row, next.col);
        }
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_orders_both_axes() {
        let sel = CellSelection::new(5, 3, 1, 0);
        assert_eq!(normalize_selection(&sel), CellSelection::new(1, 0, 5, 3));
    }

    #[test]
    fn test_normalize_idempotent_and_order_independent() {
        let samples = [
            CellSelection::new(5, 2, 1, 4),
            CellSelection::new(1, 4, 5, 2),
            CellSelection::new(0, 0, 0, 0),
            CellSelection::new(9, 9, 3, 3),
        ];
        for sel in samples {
            let once = normalize_selection(&sel);
            assert_eq!(normalize_selection(&once), once);

            let swapped = CellSelection::spanning(sel.end(), sel.start());
            assert_eq!(normalize_selection(&swapped), once);
        }
    }

    #[test]
    fn test_same_selection_is_structural() {
        let a = CellSelection::new(0, 0, 2, 2);
        let b = CellSelection::new(2, 2, 0, 0);

        assert!(is_same_selection(Some(&a), Some(&a)));
        assert!(!is_same_selection(Some(&a), Some(&b)));
        assert!(is_same_selection(Some(&a.normalized()), Some(&b.normalized())));
        assert!(!is_same_selection(None, Some(&a)));
        assert!(!is_same_selection(None, None));
    }

    #[test]
    fn test_move_up_at_top_stays_at_zero() {
        let mut model = SelectionModel::new();
        model.select_cell(0, 1);

        let sel = model.move_selection(Direction::Up, false, 3, 3).unwrap();
        assert_eq!(sel, CellSelection::new(0, 1, 0, 1));
    }

    #[test]
    fn test_move_clamps_to_last_row_and_col() {
        let mut model = SelectionModel::new();
        model.select_cell(2, 1);

        model.move_selection(Direction::Down, false, 3, 2);
        let sel = model.move_selection(Direction::Right, false, 3, 2).unwrap();
        assert_eq!(sel.end(), CellPos::new(2, 1));
    }

    #[test]
    fn test_move_extend_keeps_anchor() {
        let mut model = SelectionModel::new();
        model.select_cell(1, 1);

        model.move_selection(Direction::Down, true, 5, 5);
        let sel = model.move_selection(Direction::Right, true, 5, 5).unwrap();
        assert_eq!(sel, CellSelection::new(1, 1, 2, 2));

        // Shrinking back toward the anchor
        let sel = model.move_selection(Direction::Up, true, 5, 5).unwrap();
        assert_eq!(sel, CellSelection::new(1, 1, 1, 2));
    }

    #[test]
    fn test_move_without_extend_collapses() {
        let mut model = SelectionModel::new();
        model.select_range(0, 0, 2, 2);

        let sel = model.move_selection(Direction::Left, false, 5, 5).unwrap();
        assert_eq!(sel, CellSelection::single(CellPos::new(2, 1)));
    }

    #[test]
    fn test_move_after_grid_shrinks_stays_in_bounds() {
        let mut model = SelectionModel::new();
        model.select_cell(5, 1);
        // Grid is now 2x2
        let sel = model.move_selection(Direction::Up, false, 2, 2).unwrap();
        assert_eq!(sel, CellSelection::single(CellPos::new(1, 1)));

        model.select_range(5, 3, 5, 3);
        let sel = model.move_selection(Direction::Left, true, 2, 2).unwrap();
        assert_eq!(sel, CellSelection::new(1, 1, 1, 1));
    }

    #[test]
    fn test_move_without_selection_is_noop() {
        let mut model = SelectionModel::new();
        assert!(model.move_selection(Direction::Down, false, 5, 5).is_none());
        assert!(model.selection().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut model = SelectionModel::new();
        model.select_cell(1, 1);
        model.clear();
        model.clear();
        assert!(model.selection().is_none());
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("left".parse::<Direction>(), Ok(Direction::Left));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_selection_serializes_camel_case() {
        let json = serde_json::to_string(&CellSelection::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"startRow":1,"startCol":2,"endRow":3,"endCol":4}"#);
    }
}
