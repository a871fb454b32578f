//! Data provider backed by a JavaScript object
//!
//! The host passes any object with these methods:
//!
//! ```text
//! rowCount(): number
//! columnCount(): number
//! columnAt(index): { field: string, isEditable?: boolean } | null
//! valueAt(row, field): any
//! writeAt(row, field, value): void
//! ```
//!
//! Calls that throw are logged and degrade to "no rows", "no column",
//! an empty value or a dropped write.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::helpers::{describe_js_error, log_warn};
use crate::error::{CellAreaError, Result};
use crate::models::CellValue;
use crate::provider::{ColumnInfo, DataProvider};

const REQUIRED_METHODS: &[&str] = &["rowCount", "columnCount", "columnAt", "valueAt", "writeAt"];

pub struct JsDataProvider {
    target: JsValue,
}

impl JsDataProvider {
    /// Wrap `target`, checking up front that every method exists
    pub fn new(target: JsValue) -> Result<Self> {
        let provider = Self { target };
        if let Some(name) = REQUIRED_METHODS.iter().find(|name| provider.method(name).is_none()) {
            return Err(CellAreaError::Host(format!("data provider is missing method '{}'", name)));
        }
        Ok(provider)
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.target, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
        let function = self.method(name)?;
        let args: Array = args.iter().collect();
        match function.apply(&self.target, &args) {
            Ok(value) => Some(value),
            Err(e) => {
                log_warn(&format!("provider.{} threw: {}", name, describe_js_error(&e)));
                None
            }
        }
    }

    fn count(&self, name: &str) -> usize {
        self.call(name, &[])
            .and_then(|v| v.as_f64())
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as usize)
            .unwrap_or(0)
    }
}

/// Convert an arbitrary JS value into a cell value
///
/// Objects (a `Date`, a wrapper with its own `toString`) become text the
/// way `String(value)` would render them.
pub fn cell_value_from_js(value: JsValue) -> CellValue {
    if value.is_null() || value.is_undefined() {
        return CellValue::Empty;
    }
    if let Some(b) = value.as_bool() {
        return CellValue::Bool(b);
    }
    if let Some(n) = value.as_f64() {
        return CellValue::Number(n);
    }
    if let Some(s) = value.as_string() {
        return CellValue::Text(s);
    }
    if let Some(object) = value.dyn_ref::<js_sys::Object>() {
        return CellValue::Text(String::from(object.to_string()));
    }
    // BigInt and symbols
    CellValue::Text(format!("{:?}", value))
}

pub fn cell_value_to_js(value: &CellValue) -> JsValue {
    match value {
        CellValue::Empty => JsValue::NULL,
        CellValue::Bool(b) => JsValue::from_bool(*b),
        CellValue::Number(n) => JsValue::from_f64(*n),
        CellValue::Text(s) => JsValue::from_str(s),
    }
}

impl DataProvider for JsDataProvider {
    fn row_count(&self) -> usize {
        self.count("rowCount")
    }

    fn column_count(&self) -> usize {
        self.count("columnCount")
    }

    fn column_at(&self, index: usize) -> Option<ColumnInfo> {
        let column = self.call("columnAt", &[JsValue::from_f64(index as f64)])?;
        if column.is_null() || column.is_undefined() {
            return None;
        }
        serde_wasm_bindgen::from_value(column)
            .map_err(|e| log_warn(&format!("columnAt({}) returned an unusable column: {}", index, e)))
            .ok()
    }

    fn value_at(&self, row: usize, field: &str) -> CellValue {
        self.call("valueAt", &[JsValue::from_f64(row as f64), JsValue::from_str(field)])
            .map(cell_value_from_js)
            .unwrap_or_default()
    }

    fn write_at(&mut self, row: usize, field: &str, value: CellValue) {
        self.call(
            "writeAt",
            &[JsValue::from_f64(row as f64), JsValue::from_str(field), cell_value_to_js(&value)],
        );
    }
}
