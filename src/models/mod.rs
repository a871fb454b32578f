//! Models module for the cell area
//!
//! This module contains the plain data structures shared by the
//! selection, clipboard and fill logic.

pub mod selection;
pub mod value;
pub mod range;
pub mod options;

// Re-export commonly used types
pub use selection::*;
pub use value::{CellValue, parse_number};
pub use range::{CellData, CellRange, cells_in_range};
pub use options::{CellAreaOptions, SelectionStyle, DEFAULT_COPY_FEEDBACK_MS};
