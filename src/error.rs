//! Error types for cell area operations
//!
//! Geometry misses are not errors: they surface as `None` from the
//! geometry adapter. Out-of-bounds paste targets are counted in
//! [`PasteReport`](crate::clipboard::PasteReport) instead of failing.

use thiserror::Error;

/// Failures a caller can act on (for example by showing a notice)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellAreaError {
    /// The platform clipboard rejected a read or write
    #[error("Clipboard access denied: {0}")]
    ClipboardAccessDenied(String),

    /// Copy, paste or fill was requested with nothing selected
    #[error("No cell selection")]
    NoSelection,

    /// The controller was destroyed and no longer accepts operations
    #[error("Cell area has been destroyed")]
    Destroyed,

    /// A fill gesture was attempted while the fill handle is disabled
    #[error("Fill handle is disabled")]
    FillDisabled,

    /// The hosting page broke the provider or surface contract
    #[error("Host error: {0}")]
    Host(String),
}

impl CellAreaError {
    /// Stable kebab-case tag for hosts that branch on the failure kind
    pub fn code(&self) -> &'static str {
        match self {
            CellAreaError::ClipboardAccessDenied(_) => "clipboard-denied",
            CellAreaError::NoSelection => "no-selection",
            CellAreaError::Destroyed => "destroyed",
            CellAreaError::FillDisabled => "fill-disabled",
            CellAreaError::Host(_) => "host",
        }
    }
}

pub type Result<T> = std::result::Result<T, CellAreaError>;
