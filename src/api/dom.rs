//! DOM side of the cell area
//!
//! A rendered grid is a scrolling body wrapper holding `tr` rows of `td`
//! cells. Logical indices are display order, so anything not rendered
//! (virtualized away) has no geometry.

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, NodeList};

use super::helpers::describe_js_error;
use crate::clipboard::ClipboardBackend;
use crate::controller::{BorderStyle, Overlay};
use crate::error::{CellAreaError, Result};
use crate::geometry::{BoxRect, SurfaceLayout};
use crate::models::SelectionStyle;

pub const BODY_WRAPPER_SELECTOR: &str = ".vxe-table--body-wrapper";
pub const ROW_SELECTOR: &str = "tr.vxe-body--row";
pub const CELL_SELECTOR: &str = "td.vxe-body--column";
pub const OVERLAY_CLASS: &str = "vxe-cell-area-selection-overlay";

const COPY_ANIMATION: &str = "vxe-cell-area-copy-pulse 0.6s ease-in-out";

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn box_of(element: &Element) -> BoxRect {
    let rect = element.get_bounding_client_rect();
    BoxRect::new(rect.top(), rect.left(), rect.right(), rect.bottom())
}

/// Rendered grid rooted at the host's grid element
pub struct DomSurface {
    root: Element,
}

impl DomSurface {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The scrolling body wrapper; looked up each time since hosts may re-render it
    pub fn body_wrapper(&self) -> Option<HtmlElement> {
        self.root
            .query_selector(BODY_WRAPPER_SELECTOR)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }
}

impl SurfaceLayout for DomSurface {
    type Node = Element;

    fn enclosing_cell(&self, target: &Element) -> Option<Element> {
        target.closest(CELL_SELECTOR).ok().flatten()
    }

    fn enclosing_row(&self, cell: &Element) -> Option<Element> {
        cell.closest(ROW_SELECTOR).ok().flatten()
    }

    fn rendered_rows(&self) -> Vec<Element> {
        self.body_wrapper()
            .and_then(|wrapper| wrapper.query_selector_all(ROW_SELECTOR).ok())
            .map(elements)
            .unwrap_or_default()
    }

    fn rendered_cells(&self, row: &Element) -> Vec<Element> {
        row.query_selector_all(CELL_SELECTOR).map(elements).unwrap_or_default()
    }

    fn bounds(&self, node: &Element) -> Option<BoxRect> {
        Some(box_of(node))
    }

    fn surface_bounds(&self) -> Option<BoxRect> {
        self.body_wrapper().map(|wrapper| box_of(&wrapper))
    }

    fn scroll_offset(&self) -> (f64, f64) {
        self.body_wrapper()
            .map(|wrapper| (wrapper.scroll_left() as f64, wrapper.scroll_top() as f64))
            .unwrap_or((0.0, 0.0))
    }
}

/// Presses in these go to the in-cell editor, not the selection
pub fn is_text_input(element: &Element) -> bool {
    matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA")
}

/// Create the overlay element and append it to the body wrapper
pub fn create_overlay(document: &Document, wrapper: &HtmlElement, style: &SelectionStyle) -> std::result::Result<HtmlElement, JsValue> {
    let overlay = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    overlay.set_class_name(OVERLAY_CLASS);
    overlay.style().set_css_text(&format!(
        "position: absolute; pointer-events: none; z-index: 10; \
         border: 2px solid {}; background-color: {}; display: none;",
        style.border_color, style.background_color
    ));
    wrapper.append_child(&overlay)?;
    Ok(overlay)
}

/// Apply an overlay render instruction to the overlay element
pub fn paint_overlay(element: &HtmlElement, overlay: &Overlay) -> std::result::Result<(), JsValue> {
    let style = element.style();
    let rect = match (overlay.visible, overlay.rect) {
        (true, Some(rect)) => rect,
        _ => return style.set_property("display", "none"),
    };

    style.set_property("display", "block")?;
    style.set_property("left", &format!("{}px", rect.left))?;
    style.set_property("top", &format!("{}px", rect.top))?;
    style.set_property("width", &format!("{}px", rect.width))?;
    style.set_property("height", &format!("{}px", rect.height))?;

    match overlay.border_style {
        BorderStyle::Dashed => {
            style.set_property("border-style", "dashed")?;
            style.set_property("animation", COPY_ANIMATION)
        }
        BorderStyle::Solid => {
            style.set_property("border-style", "solid")?;
            style.set_property("animation", "")
        }
    }
}

/// `navigator.clipboard`
///
/// Reached through reflection so no unstable web-sys bindings are needed.
/// Missing API, insecure context and permission rejections all surface
/// as [`CellAreaError::ClipboardAccessDenied`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClipboard;

impl BrowserClipboard {
    fn call(&self, method: &str, args: &[JsValue]) -> Result<JsFuture> {
        let denied = |e: JsValue| CellAreaError::ClipboardAccessDenied(describe_js_error(&e));

        let window = web_sys::window().ok_or_else(|| CellAreaError::ClipboardAccessDenied("no window".into()))?;
        let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard")).map_err(denied)?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return Err(CellAreaError::ClipboardAccessDenied("clipboard API unavailable".into()));
        }

        let function = Reflect::get(&clipboard, &JsValue::from_str(method))
            .map_err(denied)?
            .dyn_into::<Function>()
            .map_err(|_| CellAreaError::ClipboardAccessDenied(format!("clipboard.{} unavailable", method)))?;
        let promise = function
            .apply(&clipboard, &args.iter().collect::<Array>())
            .map_err(denied)?
            .dyn_into::<Promise>()
            .map_err(|_| CellAreaError::ClipboardAccessDenied(format!("clipboard.{} did not return a promise", method)))?;
        Ok(JsFuture::from(promise))
    }
}

impl ClipboardBackend for BrowserClipboard {
    async fn read_text(&self) -> Result<String> {
        let value = self
            .call("readText", &[])?
            .await
            .map_err(|e| CellAreaError::ClipboardAccessDenied(describe_js_error(&e)))?;
        Ok(value.as_string().unwrap_or_default())
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        self.call("writeText", &[JsValue::from_str(text)])?
            .await
            .map_err(|e| CellAreaError::ClipboardAccessDenied(describe_js_error(&e)))?;
        Ok(())
    }
}
