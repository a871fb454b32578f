//! Data provider contract
//!
//! The cell area never owns grid data. It reads and writes through a
//! `DataProvider`, addressing rows by index and columns by field name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::CellValue;

/// Column metadata the cell area cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Key into a row record; empty for display-only columns (checkbox, index)
    pub field: String,
    #[serde(default = "default_editable")]
    pub is_editable: bool,
}

fn default_editable() -> bool {
    true
}

impl ColumnInfo {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into(), is_editable: true }
    }

    pub fn readonly(field: impl Into<String>) -> Self {
        Self { field: field.into(), is_editable: false }
    }

    pub fn has_field(&self) -> bool {
        !self.field.is_empty()
    }
}

/// Row/column addressable grid storage owned by the host
pub trait DataProvider {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Column metadata; `None` when `index` is past the last column
    fn column_at(&self, index: usize) -> Option<ColumnInfo>;

    /// Value stored in `field` of row `row`; `Empty` when absent
    fn value_at(&self, row: usize, field: &str) -> CellValue;

    fn write_at(&mut self, row: usize, field: &str, value: CellValue);
}

/// True when a column must not receive pasted or filled values
///
/// Columns without a field are never treated as read-only; they are
/// skipped for lack of a target instead.
pub fn is_column_readonly(column: &ColumnInfo, readonly_columns: &[String]) -> bool {
    if !column.has_field() {
        return false;
    }
    !column.is_editable || readonly_columns.iter().any(|f| f == &column.field)
}

/// In-memory provider: a column list plus one field map per row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VecProvider {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<HashMap<String, CellValue>>,
}

impl VecProvider {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build from positional rows; row `i` value `j` lands in column `j`'s field
    pub fn from_rows(fields: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        let columns: Vec<ColumnInfo> = fields.iter().map(|f| ColumnInfo::new(*f)).collect();
        let mut provider = Self::new(columns);
        for values in rows {
            provider.push_row(values);
        }
        provider
    }

    pub fn push_row(&mut self, values: Vec<CellValue>) {
        let record = self
            .columns
            .iter()
            .zip(values)
            .filter(|(column, _)| column.has_field())
            .map(|(column, value)| (column.field.clone(), value))
            .collect();
        self.rows.push(record);
    }

    /// Value at a positional (row, col), mostly for assertions
    pub fn get(&self, row: usize, col: usize) -> CellValue {
        match self.columns.get(col) {
            Some(column) => self.value_at(row, &column.field),
            None => CellValue::Empty,
        }
    }
}

impl DataProvider for VecProvider {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_at(&self, index: usize) -> Option<ColumnInfo> {
        self.columns.get(index).cloned()
    }

    fn value_at(&self, row: usize, field: &str) -> CellValue {
        self.rows
            .get(row)
            .and_then(|record| record.get(field))
            .cloned()
            .unwrap_or_default()
    }

    fn write_at(&mut self, row: usize, field: &str, value: CellValue) {
        match self.rows.get_mut(row) {
            Some(record) => {
                record.insert(field.to_string(), value);
            }
            None => log::warn!("write_at: row {} does not exist, value dropped", row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readonly_rules() {
        let readonly = vec!["id".to_string()];

        assert!(is_column_readonly(&ColumnInfo::readonly("name"), &[]));
        assert!(is_column_readonly(&ColumnInfo::new("id"), &readonly));
        assert!(!is_column_readonly(&ColumnInfo::new("name"), &readonly));
        // No field: not read-only, just not addressable
        assert!(!is_column_readonly(&ColumnInfo::readonly(""), &readonly));
    }

    #[test]
    fn test_vec_provider_reads_and_writes() {
        let mut provider = VecProvider::from_rows(
            &["a", "b"],
            vec![vec!["x".into(), 1.0.into()], vec![CellValue::Empty, true.into()]],
        );

        assert_eq!(provider.row_count(), 2);
        assert_eq!(provider.column_count(), 2);
        assert_eq!(provider.value_at(0, "a"), CellValue::text("x"));
        assert_eq!(provider.value_at(1, "b"), CellValue::Bool(true));
        assert_eq!(provider.value_at(5, "a"), CellValue::Empty);
        assert_eq!(provider.value_at(0, "missing"), CellValue::Empty);

        provider.write_at(1, "a", "y".into());
        assert_eq!(provider.get(1, 0), CellValue::text("y"));

        // Writes past the end are dropped, not appended
        provider.write_at(9, "a", "z".into());
        assert_eq!(provider.row_count(), 2);
    }

    #[test]
    fn test_column_info_defaults_editable() {
        let column: ColumnInfo = serde_json::from_str(r#"{"field": "qty"}"#).unwrap();
        assert!(column.is_editable);
    }
}
