//! Glue between the cell area core and JavaScript
//!
//! `[CellArea]`-prefixed console output, serde-wasm-bindgen bridging for
//! options, selections and reports, and `CellAreaError` to JS `Error`.

use wasm_bindgen::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CellAreaError;

// console.* bindings

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// `[CellArea]` logging macros, usable from any module in the crate

/// Log a debug message with [CellArea] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [CellArea] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [CellArea] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [CellArea] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_debug(msg: &str) {
    log(&format!("[CellArea] {}", msg));
}

pub fn log_info(msg: &str) {
    info(&format!("[CellArea] {}", msg));
}

pub fn log_warn(msg: &str) {
    warn(&format!("[CellArea] ⚠️ {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[CellArea] ❌ {}", msg));
}

// serde-wasm-bindgen bridging

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Deserialize an optional JS argument, using `T::default()` for null/undefined
pub fn deserialize_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    if value.is_null() || value.is_undefined() {
        Ok(T::default())
    } else {
        deserialize(value, error_context)
    }
}

/// Serialize a value to JavaScript with automatic error handling
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

// Errors crossing into JavaScript

/// Convert a cell area error into a JS `Error` carrying a `code` property
///
/// Hosts can branch on `e.code` (`"clipboard-denied"`, `"no-selection"`,
/// `"destroyed"`, `"fill-disabled"`, `"host"`) instead of matching messages.
pub fn to_js_error(err: CellAreaError) -> JsValue {
    let msg = err.to_string();
    log_error(&format!("{} [{}]", msg, err.code()));
    let js_err = js_sys::Error::new(&msg);
    js_err.set_name("CellAreaError");
    let _ = js_sys::Reflect::set(&js_err, &JsValue::from_str("code"), &JsValue::from_str(err.code()));
    js_err.into()
}

/// Convert a validation error to a JsValue
pub fn validation_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    log_error(&msg);
    JsValue::from_str(&msg)
}

/// Best-effort message out of a thrown JS value
///
/// Clipboard rejections are `DOMException`s, so the name
/// (`NotAllowedError`, `SecurityError`) is kept in front of the message.
pub fn describe_js_error(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    let field = |key: &str| {
        js_sys::Reflect::get(value, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_string())
            .filter(|v| !v.is_empty())
    };
    match (field("name"), field("message")) {
        (Some(name), Some(message)) => format!("{}: {}", name, message),
        (None, Some(message)) => message,
        (Some(name), None) => name,
        (None, None) => format!("{:?}", value),
    }
}
