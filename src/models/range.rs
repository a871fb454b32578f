//! Materialized view of a selection against provider data
//!
//! A `CellRange` is a snapshot: rebuild it after the provider changes.

use serde::{Deserialize, Serialize};

use super::selection::{normalize_selection, CellSelection};
use super::value::CellValue;
use crate::provider::{ColumnInfo, DataProvider};

/// One cell inside a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
    pub column: ColumnInfo,
}

/// Rows, columns and cells touched by a selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellRange {
    /// Distinct row indices, top to bottom
    pub rows: Vec<usize>,
    /// Distinct column indices, left to right
    pub cols: Vec<usize>,
    /// Row-major cells that exist in the provider
    pub cells: Vec<CellData>,
}

impl CellRange {
    /// Values of one column inside the range, top to bottom
    pub fn column_values(&self, col: usize) -> Vec<CellValue> {
        self.cells.iter().filter(|c| c.col == col).map(|c| c.value.clone()).collect()
    }

    /// Values of one row inside the range, left to right
    pub fn row_values(&self, row: usize) -> Vec<CellValue> {
        self.cells.iter().filter(|c| c.row == row).map(|c| c.value.clone()).collect()
    }
}

/// Collect every cell a selection covers
///
/// Indices past the provider's bounds still appear in `rows`/`cols`,
/// but produce no entry in `cells`.
pub fn cells_in_range<P: DataProvider + ?Sized>(provider: &P, selection: &CellSelection) -> CellRange {
    let n = normalize_selection(selection);
    let rows: Vec<usize> = (n.start_row..=n.end_row).collect();
    let cols: Vec<usize> = (n.start_col..=n.end_col).collect();

    let row_count = provider.row_count();
    let columns: Vec<Option<ColumnInfo>> = cols.iter().map(|&c| provider.column_at(c)).collect();

    let mut cells = Vec::with_capacity(rows.len() * cols.len());
    for &row in rows.iter().filter(|&&r| r < row_count) {
        for (&col, column) in cols.iter().zip(&columns) {
            if let Some(column) = column {
                cells.push(CellData {
                    row,
                    col,
                    value: provider.value_at(row, &column.field),
                    column: column.clone(),
                });
            }
        }
    }

    CellRange { rows, cols, cells }
}
