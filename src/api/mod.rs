//! Cell Area WASM API
//!
//! Binds the controller to a rendered browser grid.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging macros, serde bridging and error conversion
//! - `provider`: `DataProvider` over a host JavaScript object
//! - `dom`: DOM surface layout, overlay painting and the system clipboard
//! - `manager`: The exported `CellAreaManager` class

pub mod helpers;
pub mod provider;
pub mod dom;
pub mod manager;

pub use manager::CellAreaManager;
