//! Clipboard transfer: selection <-> TSV text
//!
//! Wire format is plain TSV: fields joined by `\t`, rows by `\n`, no
//! quoting. A field that itself contains a tab or newline will not
//! survive a round trip; this keeps the text pasteable into ordinary
//! spreadsheet applications.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

use crate::error::{CellAreaError, Result};
use crate::models::{normalize_selection, CellPos, CellSelection, CellValue};
use crate::provider::{ColumnInfo, DataProvider};

/// Text block plus the string matrix it was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub text: String,
    pub rows: Vec<Vec<String>>,
}

/// Outcome of writing a block of values into a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteReport {
    pub written: usize,
    pub skipped_out_of_bounds: usize,
    pub skipped_readonly: usize,
    /// Bounding box of the cells actually written
    pub written_range: Option<CellSelection>,
}

impl PasteReport {
    fn extend_range(&mut self, pos: CellPos) {
        self.written_range = Some(match self.written_range {
            None => CellSelection::single(pos),
            Some(r) => CellSelection::new(
                r.start_row.min(pos.row),
                r.start_col.min(pos.col),
                r.end_row.max(pos.row),
                r.end_col.max(pos.col),
            ),
        });
    }

    fn record_write(&mut self, pos: CellPos) {
        self.written += 1;
        self.extend_range(pos);
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: PasteReport) {
        self.written += other.written;
        self.skipped_out_of_bounds += other.skipped_out_of_bounds;
        self.skipped_readonly += other.skipped_readonly;
        if let Some(r) = other.written_range {
            self.extend_range(r.start());
            self.extend_range(r.end());
        }
    }
}

/// Join rows with `\n`, fields with `\t`
pub fn to_tsv<S: AsRef<str>>(rows: &[Vec<S>]) -> String {
    rows.iter()
        .map(|row| row.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join("\t"))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Split clipboard text into rows of fields
///
/// A `\r` left at the end of a line by CRLF sources is dropped. There is
/// no quote handling.
pub fn parse_clipboard_text(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// Serialize the selected cells as a dense TSV block
///
/// The matrix is always `height x width` of the normalized selection;
/// cells the provider cannot supply become empty strings.
pub fn create_clipboard_payload<P: DataProvider + ?Sized>(provider: &P, selection: &CellSelection) -> ClipboardPayload {
    let n = normalize_selection(selection);
    let row_count = provider.row_count();
    let columns: Vec<Option<ColumnInfo>> = (n.start_col..=n.end_col).map(|c| provider.column_at(c)).collect();

    let rows: Vec<Vec<String>> = (n.start_row..=n.end_row)
        .map(|row| {
            columns
                .iter()
                .map(|column| match column {
                    Some(column) if row < row_count && column.has_field() => {
                        provider.value_at(row, &column.field).to_string()
                    }
                    _ => String::new(),
                })
                .collect()
        })
        .collect();

    let text = to_tsv(&rows);
    log::debug!("clipboard payload: {}x{} cells, {} bytes", n.height(), n.width(), text.len());
    ClipboardPayload { text, rows }
}

/// Write `rows` into the provider with its top-left at `anchor`
///
/// Row-major, row 0 first. Targets outside the provider are skipped and
/// counted; nothing is rolled back.
pub fn apply_clipboard_rows<P: DataProvider + ?Sized>(provider: &mut P, anchor: CellPos, rows: &[Vec<String>]) -> PasteReport {
    apply_clipboard_rows_filtered(provider, anchor, rows, |_| true)
}

/// [`apply_clipboard_rows`] that also skips columns `writable` rejects
///
/// Generic over the cell type so fill can write typed values.
pub fn apply_clipboard_rows_filtered<P, V, F>(provider: &mut P, anchor: CellPos, rows: &[Vec<V>], writable: F) -> PasteReport
where
    P: DataProvider + ?Sized,
    V: Clone + Into<CellValue>,
    F: Fn(&ColumnInfo) -> bool,
{
    let row_count = provider.row_count();
    let col_count = provider.column_count();
    let mut report = PasteReport::default();

    for (i, values) in rows.iter().enumerate() {
        let target_row = anchor.row + i;
        for (j, value) in values.iter().enumerate() {
            let target_col = anchor.col + j;
            if target_row >= row_count || target_col >= col_count {
                report.skipped_out_of_bounds += 1;
                continue;
            }
            let Some(column) = provider.column_at(target_col) else {
                report.skipped_out_of_bounds += 1;
                continue;
            };
            if !column.has_field() {
                report.skipped_out_of_bounds += 1;
                continue;
            }
            if !writable(&column) {
                report.skipped_readonly += 1;
                continue;
            }
            provider.write_at(target_row, &column.field, value.clone().into());
            report.record_write(CellPos::new(target_row, target_col));
        }
    }

    if report.skipped_out_of_bounds > 0 {
        log::debug!("paste: {} cell(s) outside the grid were skipped", report.skipped_out_of_bounds);
    }
    report
}

/// Platform clipboard access; both calls may be rejected by the host
#[allow(async_fn_in_trait)]
pub trait ClipboardBackend {
    async fn read_text(&self) -> Result<String>;

    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Process-local clipboard, for native hosts and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: RefCell<Option<String>>,
    denied: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: RefCell::new(Some(text.into())), denied: false }
    }

    /// A clipboard that rejects every access
    pub fn denied() -> Self {
        Self { text: RefCell::new(None), denied: true }
    }

    pub fn contents(&self) -> Option<String> {
        self.text.borrow().clone()
    }
}

impl ClipboardBackend for MemoryClipboard {
    async fn read_text(&self) -> Result<String> {
        if self.denied {
            return Err(CellAreaError::ClipboardAccessDenied("read not permitted".to_string()));
        }
        Ok(self.text.borrow().clone().unwrap_or_default())
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        if self.denied {
            return Err(CellAreaError::ClipboardAccessDenied("write not permitted".to_string()));
        }
        *self.text.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::VecProvider;

    fn grid(rows: usize, cols: usize) -> VecProvider {
        let fields: Vec<String> = (0..cols).map(|c| format!("f{}", c)).collect();
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        let data = (0..rows)
            .map(|r| (0..cols).map(|c| CellValue::text(format!("v{}{}", r, c))).collect())
            .collect();
        VecProvider::from_rows(&field_refs, data)
    }

    fn matrix(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn test_tsv_round_trip() {
        let m = matrix(&[&["a", "b", ""], &["1", "2.5", "x y"], &["", "", ""]]);
        assert_eq!(parse_clipboard_text(&to_tsv(&m)), m);
    }

    #[test]
    fn test_parse_strips_carriage_returns() {
        assert_eq!(parse_clipboard_text("a\tb\r\nc\td"), matrix(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn test_parse_keeps_trailing_empty_row() {
        assert_eq!(parse_clipboard_text("a\n"), matrix(&[&["a"], &[""]]));
    }

    #[test]
    fn test_payload_uses_normalized_selection() {
        let payload = create_clipboard_payload(&grid(3, 2), &CellSelection::new(1, 1, 0, 0));
        assert_eq!(payload.text, "v00\tv01\nv10\tv11");
        assert_eq!(payload.rows, matrix(&[&["v00", "v01"], &["v10", "v11"]]));
    }

    #[test]
    fn test_payload_is_dense_past_bounds() {
        let payload = create_clipboard_payload(&grid(2, 2), &CellSelection::new(1, 1, 2, 2));
        assert_eq!(payload.rows, matrix(&[&["v11", ""], &["", ""]]));
        assert_eq!(payload.text, "v11\t\n\t");
    }

    #[test]
    fn test_payload_coerces_values() {
        let provider = VecProvider::from_rows(&["n", "b", "e"], vec![vec![3.0.into(), false.into(), CellValue::Empty]]);
        let payload = create_clipboard_payload(&provider, &CellSelection::new(0, 0, 0, 2));
        assert_eq!(payload.text, "3\tfalse\t");
    }

    #[test]
    fn test_apply_skips_out_of_bounds() {
        let mut provider = grid(3, 3);
        let block = matrix(&[&["a", "b", "c"], &["d", "e", "f"], &["g", "h", "i"]]);

        let report = apply_clipboard_rows(&mut provider, CellPos::new(1, 1), &block);

        assert_eq!(report.written, 4);
        assert_eq!(report.skipped_out_of_bounds, 5);
        assert_eq!(report.written_range, Some(CellSelection::new(1, 1, 2, 2)));
        assert_eq!(provider.get(1, 1), CellValue::text("a"));
        assert_eq!(provider.get(2, 2), CellValue::text("e"));
        // Untouched
        assert_eq!(provider.get(0, 0), CellValue::text("v00"));
        assert_eq!(provider.get(1, 0), CellValue::text("v10"));
        assert_eq!(provider.row_count(), 3);
    }

    #[test]
    fn test_apply_jagged_rows() {
        let mut provider = grid(2, 3);
        let report = apply_clipboard_rows(&mut provider, CellPos::new(0, 0), &matrix(&[&["a"], &["b", "c", "d"]]));

        assert_eq!(report.written, 4);
        assert_eq!(provider.get(0, 1), CellValue::text("v01"));
        assert_eq!(provider.get(1, 2), CellValue::text("d"));
    }

    #[test]
    fn test_apply_filtered_skips_readonly() {
        let mut provider = grid(1, 2);
        let report = apply_clipboard_rows_filtered(&mut provider, CellPos::new(0, 0), &matrix(&[&["x", "y"]]), |c| c.field != "f0");

        assert_eq!(report.written, 1);
        assert_eq!(report.skipped_readonly, 1);
        assert_eq!(provider.get(0, 0), CellValue::text("v00"));
        assert_eq!(provider.get(0, 1), CellValue::text("y"));
    }

    #[test]
    fn test_report_merge() {
        let mut a = PasteReport::default();
        a.record_write(CellPos::new(0, 0));
        let mut b = PasteReport::default();
        b.record_write(CellPos::new(3, 1));
        b.skipped_readonly = 2;

        a.merge(b);
        assert_eq!(a.written, 2);
        assert_eq!(a.skipped_readonly, 2);
        assert_eq!(a.written_range, Some(CellSelection::new(0, 0, 3, 1)));
    }

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        pollster::block_on(clipboard.write_text("hi")).unwrap();
        assert_eq!(pollster::block_on(clipboard.read_text()).unwrap(), "hi");

        let denied = MemoryClipboard::denied();
        assert!(matches!(
            pollster::block_on(denied.read_text()),
            Err(CellAreaError::ClipboardAccessDenied(_))
        ));
    }
}
