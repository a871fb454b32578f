//! Cell Area WASM Module
//!
//! Spreadsheet-style cell area for data grids: rectangular range
//! selection by mouse and keyboard, TSV copy/paste through the system
//! clipboard, and fill-drag series generation.
//!
//! The selection, clipboard and fill logic is plain Rust over the
//! [`provider::DataProvider`] and [`geometry::SurfaceLayout`] traits;
//! the `api` module binds it to a browser grid.

pub mod error;
pub mod models;
pub mod provider;
pub mod sequence;
pub mod clipboard;
pub mod geometry;
pub mod controller;
pub mod api;

// Re-export commonly used types
pub use error::CellAreaError;
pub use models::*;
pub use provider::{ColumnInfo, DataProvider, VecProvider};
pub use clipboard::{ClipboardBackend, ClipboardPayload, MemoryClipboard, PasteReport};
pub use geometry::{GeometryRect, SurfaceLayout};
pub use controller::{CellAreaController, InteractionState, NavKey};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    init_panic_hook();
    init_logging();

    log::info!("Cell area WASM module initialized");
}

#[cfg(feature = "console_error_panic_hook")]
fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn init_panic_hook() {}

#[cfg(feature = "console_log")]
fn init_logging() {
    // Err only means the host page already installed a logger
    let _ = console_log::init_with_level(log::Level::Debug);
}

#[cfg(not(feature = "console_log"))]
fn init_logging() {}
