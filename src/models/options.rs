//! Cell area configuration
//!
//! Each controller owns its own `CellAreaOptions`; defaults are built
//! fresh per instance and never shared.

use serde::{Deserialize, Serialize};

/// Default time the overlay keeps its dashed "copied" border
pub const DEFAULT_COPY_FEEDBACK_MS: u32 = 2000;

/// Colors for the selection overlay and fill handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionStyle {
    pub background_color: String,
    pub border_color: String,
    pub fill_handle_color: String,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            background_color: "rgba(24, 144, 255, 0.1)".to_string(),
            border_color: "#1890ff".to_string(),
            fill_handle_color: "#1890ff".to_string(),
        }
    }
}

/// Feature switches and styling for one cell area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CellAreaOptions {
    /// Mouse range selection
    pub enable_selection: bool,
    /// Copy/paste through the system clipboard
    pub enable_clipboard: bool,
    /// Fill-drag series generation
    pub enable_fill_handle: bool,
    /// Arrow/Tab/Enter navigation
    pub enable_keyboard: bool,
    /// Fields that paste and fill must not overwrite (see `skip_readonly_on_paste`)
    pub readonly_columns: Vec<String>,
    pub selection_style: SelectionStyle,
    pub copy_feedback_ms: u32,
    /// Leave read-only columns untouched when pasting or filling
    pub skip_readonly_on_paste: bool,
}

impl Default for CellAreaOptions {
    fn default() -> Self {
        Self {
            enable_selection: true,
            enable_clipboard: true,
            enable_fill_handle: false,
            enable_keyboard: true,
            readonly_columns: Vec::new(),
            selection_style: SelectionStyle::default(),
            copy_feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
            skip_readonly_on_paste: false,
        }
    }
}
