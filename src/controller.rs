//! Interaction controller
//!
//! Owns the selection, the drag and fill gesture state, and the overlay
//! description for one grid surface. Input arrives as already-decoded
//! pointer/key/clipboard calls; the host binds the real listeners and
//! paints [`Overlay`] however it likes.
//!
//! States: `Idle -> Selecting` on pointer down, `Selecting -> Fixed` on
//! pointer up, `Fixed` handles keys and clipboard, and `destroy` ends in
//! `Terminated`, after which nothing is accepted.

use serde::{Deserialize, Serialize};

use crate::clipboard::{
    apply_clipboard_rows_filtered, create_clipboard_payload, parse_clipboard_text, ClipboardBackend,
    ClipboardPayload, PasteReport,
};
use crate::error::{CellAreaError, Result};
use crate::geometry::{compute_selection_rect, locate_cell, GeometryRect, SurfaceLayout};
use crate::models::{cells_in_range, CellAreaOptions, CellPos, CellSelection, Direction, SelectionModel};
use crate::provider::{is_column_readonly, DataProvider};
use crate::sequence::generate_fill_values;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionState {
    Idle,
    /// Pointer is down and dragging out a range
    Selecting,
    /// Selection is stable
    Fixed,
    Terminated,
}

/// Pointer gesture in progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragState {
    pub is_dragging: bool,
    pub start_cell: Option<CellPos>,
    pub current_cell: Option<CellPos>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPhase {
    #[default]
    Idle,
    Dragging,
    Applying,
}

/// Fill-handle gesture: the range dragged from and the range it grows into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillState {
    pub phase: FillPhase,
    pub source_range: Option<CellSelection>,
    pub target_range: Option<CellSelection>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    /// Shown briefly after a successful copy
    Dashed,
}

/// Render instruction for the selection overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    /// Present in the surface (between `init` and `destroy`)
    pub attached: bool,
    pub visible: bool,
    pub rect: Option<GeometryRect>,
    pub border_style: BorderStyle,
}

/// Keys the controller navigates with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Tab,
}

impl NavKey {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(NavKey::ArrowUp),
            "ArrowDown" => Some(NavKey::ArrowDown),
            "ArrowLeft" => Some(NavKey::ArrowLeft),
            "ArrowRight" => Some(NavKey::ArrowRight),
            "Enter" => Some(NavKey::Enter),
            "Tab" => Some(NavKey::Tab),
            _ => None,
        }
    }

    /// Direction and whether the move extends the selection
    fn movement(self, shift: bool) -> (Direction, bool) {
        match self {
            NavKey::ArrowUp => (Direction::Up, shift),
            NavKey::ArrowDown => (Direction::Down, shift),
            NavKey::ArrowLeft => (Direction::Left, shift),
            NavKey::ArrowRight => (Direction::Right, shift),
            NavKey::Enter => (Direction::Down, false),
            NavKey::Tab if shift => (Direction::Left, false),
            NavKey::Tab => (Direction::Right, false),
        }
    }
}

pub struct CellAreaController<P, S> {
    provider: P,
    surface: S,
    options: CellAreaOptions,
    model: SelectionModel,
    state: InteractionState,
    drag: DragState,
    fill: FillState,
    overlay: Overlay,
}

impl<P: DataProvider, S: SurfaceLayout> CellAreaController<P, S> {
    pub fn new(provider: P, surface: S, options: CellAreaOptions) -> Self {
        Self {
            provider,
            surface,
            options,
            model: SelectionModel::new(),
            state: InteractionState::Idle,
            drag: DragState::default(),
            fill: FillState::default(),
            overlay: Overlay::default(),
        }
    }

    pub fn options(&self) -> &CellAreaOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access; call [`Self::refresh_overlay`] after layout changes
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn fill_state(&self) -> &FillState {
        &self.fill
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == InteractionState::Terminated
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_destroyed() {
            Err(CellAreaError::Destroyed)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Attach the overlay; input handlers may be bound after this
    pub fn init(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.overlay.attached = true;
        self.refresh_overlay();
        log::info!(
            "cell area initialized (selection={}, keyboard={}, clipboard={}, fill={})",
            self.options.enable_selection,
            self.options.enable_keyboard,
            self.options.enable_clipboard,
            self.options.enable_fill_handle
        );
        Ok(())
    }

    /// Drop selection and gestures and detach the overlay; safe to repeat
    pub fn destroy(&mut self) {
        self.model.clear();
        self.drag = DragState::default();
        self.fill = FillState::default();
        self.overlay = Overlay::default();
        if !self.is_destroyed() {
            log::info!("cell area destroyed");
        }
        self.state = InteractionState::Terminated;
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn get_selection(&self) -> Option<CellSelection> {
        self.model.selection().copied()
    }

    fn settle(&mut self) {
        if self.state == InteractionState::Idle {
            self.state = InteractionState::Fixed;
        }
        self.refresh_overlay();
    }

    pub fn select_cell(&mut self, row: usize, col: usize) {
        if self.is_destroyed() {
            return;
        }
        self.model.select_cell(row, col);
        self.settle();
    }

    pub fn select_range(&mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) {
        if self.is_destroyed() {
            return;
        }
        self.model.select_range(start_row, start_col, end_row, end_col);
        self.settle();
    }

    pub fn clear_selection(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.model.clear();
        self.drag = DragState::default();
        self.state = InteractionState::Idle;
        self.refresh_overlay();
    }

    /// Step the selection end within the provider's current bounds
    pub fn move_selection(&mut self, direction: Direction, extend: bool) -> Option<CellSelection> {
        if self.is_destroyed() {
            return None;
        }
        let moved = self.model.move_selection(
            direction,
            extend,
            self.provider.row_count(),
            self.provider.column_count(),
        )?;
        self.settle();
        Some(moved)
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    /// Pointer pressed on `target`; returns true when the event was consumed
    ///
    /// Presses inside text inputs are left alone so in-cell editors work.
    /// Shift with an existing selection extends it from its anchor.
    pub fn pointer_down(&mut self, target: &S::Node, shift: bool, on_text_input: bool) -> bool {
        if self.is_destroyed() || !self.options.enable_selection || on_text_input {
            return false;
        }
        let Some(pos) = locate_cell(&self.surface, target) else {
            return false;
        };

        if let (true, Some(current)) = (shift, self.get_selection()) {
            log::debug!("pointer down + shift: extending to ({}, {})", pos.row, pos.col);
            self.model.select_range(current.start_row, current.start_col, pos.row, pos.col);
            self.state = InteractionState::Fixed;
            self.refresh_overlay();
            return true;
        }

        log::debug!("pointer down on ({}, {})", pos.row, pos.col);
        self.drag = DragState {
            is_dragging: true,
            start_cell: Some(pos),
            current_cell: Some(pos),
        };
        self.model.select_cell(pos.row, pos.col);
        self.state = InteractionState::Selecting;
        self.refresh_overlay();
        true
    }

    /// Pointer moved over `target` while possibly dragging
    pub fn pointer_move(&mut self, target: &S::Node) -> bool {
        if self.state != InteractionState::Selecting || !self.drag.is_dragging {
            return false;
        }
        let (Some(anchor), Some(pos)) = (self.drag.start_cell, locate_cell(&self.surface, target)) else {
            return false;
        };
        if self.drag.current_cell == Some(pos) {
            return false;
        }

        self.drag.current_cell = Some(pos);
        self.model.select_range(anchor.row, anchor.col, pos.row, pos.col);
        self.refresh_overlay();
        true
    }

    /// Pointer released anywhere; ends a drag
    pub fn pointer_up(&mut self) {
        if self.state == InteractionState::Selecting {
            self.state = InteractionState::Fixed;
            log::debug!("selection complete: {:?}", self.get_selection());
        }
        self.drag = DragState::default();
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Arrow keys move (Shift extends); Enter moves down; Tab moves right
    /// and Shift+Tab left. Returns true when the key was consumed.
    pub fn key_down(&mut self, key: NavKey, shift: bool) -> bool {
        if self.is_destroyed() || !self.options.enable_keyboard || self.get_selection().is_none() {
            return false;
        }
        let (direction, extend) = key.movement(shift);
        log::debug!("key {:?} (shift={}): {:?} extend={}", key, shift, direction, extend);
        self.move_selection(direction, extend).is_some()
    }

    // ------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------

    /// TSV payload for the current selection, read at call time
    pub fn copy_payload(&self) -> Result<ClipboardPayload> {
        self.ensure_live()?;
        let selection = self.get_selection().ok_or(CellAreaError::NoSelection)?;
        Ok(create_clipboard_payload(&self.provider, &selection))
    }

    /// Switch the overlay to its "copied" look
    pub fn mark_copied(&mut self) {
        if self.overlay.attached {
            self.overlay.border_style = BorderStyle::Dashed;
        }
    }

    /// Restore the normal overlay border after copy feedback
    pub fn finish_copy_feedback(&mut self) {
        self.overlay.border_style = BorderStyle::Solid;
    }

    /// Copy the selection to `clipboard`
    ///
    /// A rejected clipboard write is logged and returned, never retried.
    pub async fn copy_selection<C: ClipboardBackend>(&mut self, clipboard: &C) -> Result<ClipboardPayload> {
        let payload = self.copy_payload()?;
        if let Err(e) = clipboard.write_text(&payload.text).await {
            log::error!("copy failed: {}", e);
            return Err(e);
        }
        self.mark_copied();
        log::info!("copied {} row(s) to clipboard", payload.rows.len());
        Ok(payload)
    }

    /// Paste TSV text with its top-left at the selection's start cell
    ///
    /// The start cell is where the selection was anchored, so a range
    /// dragged upward pastes from its lower corner.
    pub fn paste_text(&mut self, text: &str) -> Result<PasteReport> {
        self.ensure_live()?;
        let selection = self.get_selection().ok_or(CellAreaError::NoSelection)?;
        let anchor = selection.start();
        let rows = parse_clipboard_text(text);

        let skip_readonly = self.options.skip_readonly_on_paste;
        let readonly = &self.options.readonly_columns;
        let report = apply_clipboard_rows_filtered(&mut self.provider, anchor, &rows, |column| {
            !skip_readonly || !is_column_readonly(column, readonly)
        });

        log::info!(
            "paste complete: {} written, {} out of bounds, {} read-only",
            report.written,
            report.skipped_out_of_bounds,
            report.skipped_readonly
        );
        self.refresh_overlay();
        Ok(report)
    }

    /// Read `clipboard` and paste it at the current selection
    pub async fn paste_from_clipboard<C: ClipboardBackend>(&mut self, clipboard: &C) -> Result<PasteReport> {
        self.ensure_live()?;
        if self.get_selection().is_none() {
            return Err(CellAreaError::NoSelection);
        }
        let text = match clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                log::error!("paste failed: {}", e);
                return Err(e);
            }
        };
        self.paste_text(&text)
    }

    // ------------------------------------------------------------------
    // Fill handle
    // ------------------------------------------------------------------

    /// Begin dragging the fill handle of the current selection
    pub fn start_fill_drag(&mut self, row: usize, col: usize) -> Result<()> {
        self.ensure_live()?;
        if !self.options.enable_fill_handle {
            return Err(CellAreaError::FillDisabled);
        }
        let source = self.get_selection().ok_or(CellAreaError::NoSelection)?.normalized();
        log::debug!("fill drag from ({}, {}), source {:?}", row, col, source);
        self.fill = FillState {
            phase: FillPhase::Dragging,
            source_range: Some(source),
            target_range: Some(source),
        };
        Ok(())
    }

    /// Grow the fill target toward (row, col): downward if below the
    /// source, else rightward if right of it, else back to the source
    pub fn update_fill_range(&mut self, row: usize, col: usize) -> Option<CellSelection> {
        if self.fill.phase != FillPhase::Dragging {
            return None;
        }
        let source = self.fill.source_range?;
        let pos = CellPos::new(row, col).clamp_to(self.provider.row_count(), self.provider.column_count());

        let target = if pos.row > source.end_row {
            CellSelection::new(source.start_row, source.start_col, pos.row, source.end_col)
        } else if pos.col > source.end_col {
            CellSelection::new(source.start_row, source.start_col, source.end_row, pos.col)
        } else {
            source
        };
        self.fill.target_range = Some(target);
        Some(target)
    }

    /// Write extrapolated values into the target and select it
    ///
    /// The gesture state is cleared whether or not anything was written.
    pub fn end_fill_drag(&mut self) -> Result<PasteReport> {
        let fill = std::mem::take(&mut self.fill);
        self.ensure_live()?;
        let (FillPhase::Dragging, Some(source), Some(target)) = (fill.phase, fill.source_range, fill.target_range) else {
            return Ok(PasteReport::default());
        };
        if source == target {
            return Ok(PasteReport::default());
        }

        self.fill = FillState { phase: FillPhase::Applying, ..fill };
        let report = self.apply_fill(&source, &target);
        self.fill = FillState::default();

        self.model.select_range(target.start_row, target.start_col, target.end_row, target.end_col);
        self.settle();
        log::info!("fill complete: {} cell(s) written", report.written);
        Ok(report)
    }

    /// Abandon a fill gesture without writing
    pub fn cancel_fill_drag(&mut self) {
        self.fill = FillState::default();
    }

    fn apply_fill(&mut self, source: &CellSelection, target: &CellSelection) -> PasteReport {
        let range = cells_in_range(&self.provider, source);
        let skip_readonly = self.options.skip_readonly_on_paste;
        let readonly = &self.options.readonly_columns;
        let writable = |column: &crate::provider::ColumnInfo| !skip_readonly || !is_column_readonly(column, readonly);
        let mut report = PasteReport::default();

        if target.end_row > source.end_row {
            let extra = target.end_row - source.end_row;
            for &col in &range.cols {
                let values = generate_fill_values(&range.column_values(col), extra);
                let column_rows: Vec<Vec<_>> = values.into_iter().map(|v| vec![v]).collect();
                let anchor = CellPos::new(source.end_row + 1, col);
                report.merge(apply_clipboard_rows_filtered(&mut self.provider, anchor, &column_rows, &writable));
            }
        } else if target.end_col > source.end_col {
            let extra = target.end_col - source.end_col;
            for &row in &range.rows {
                let values = generate_fill_values(&range.row_values(row), extra);
                let anchor = CellPos::new(row, source.end_col + 1);
                report.merge(apply_clipboard_rows_filtered(&mut self.provider, anchor, &[values], &writable));
            }
        }
        report
    }

    // ------------------------------------------------------------------
    // Overlay
    // ------------------------------------------------------------------

    /// Recompute the overlay from the selection and current layout
    ///
    /// Call after the surface scrolls or resizes.
    pub fn refresh_overlay(&mut self) {
        if !self.overlay.attached {
            return;
        }
        let rect = self
            .model
            .selection()
            .and_then(|selection| compute_selection_rect(&self.surface, selection));
        self.overlay.visible = rect.is_some();
        self.overlay.rect = rect;
    }
}
