//! `CellAreaManager`: the JavaScript-facing cell area
//!
//! Owns a controller over the host grid, binds the DOM listeners, and
//! paints the overlay after every change. Listener closures hold only a
//! `Weak` back-reference, so dropping the manager frees everything even
//! if `destroy` is never called.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Element, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, Node};

use super::dom::{create_overlay, is_text_input, paint_overlay, BrowserClipboard, DomSurface};
use super::helpers::{deserialize_or_default, serialize, to_js_error, validation_error};
use super::provider::JsDataProvider;
use crate::clipboard::{ClipboardBackend, ClipboardPayload, PasteReport};
use crate::controller::{CellAreaController, NavKey};
use crate::error::CellAreaError;
use crate::models::{CellAreaOptions, CellPos, Direction};
use crate::provider::DataProvider;
use crate::{wasm_error, wasm_info, wasm_log, wasm_warn};

type Controller = CellAreaController<JsDataProvider, DomSurface>;

struct BoundListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl BoundListener {
    fn unbind(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

#[derive(Default)]
struct DomState {
    overlay: Option<HtmlElement>,
    listeners: Vec<BoundListener>,
    feedback_timer: Option<i32>,
}

struct Shared {
    grid: HtmlElement,
    controller: RefCell<Controller>,
    dom: RefCell<DomState>,
    /// `destroy` arrived while the controller was borrowed
    destroy_pending: Cell<bool>,
}

fn controller_busy() -> CellAreaError {
    CellAreaError::Host("controller busy".into())
}

impl Shared {
    /// Mutable access, or `Host("controller busy")` when a provider callback re-enters
    fn try_write<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Result<R, CellAreaError> {
        let result = {
            let mut controller = self.controller.try_borrow_mut().map_err(|_| controller_busy())?;
            f(&mut controller)
        };
        self.finish_pending_destroy();
        Ok(result)
    }

    fn try_read<R>(&self, f: impl FnOnce(&Controller) -> R) -> Result<R, CellAreaError> {
        let result = {
            let controller = self.controller.try_borrow().map_err(|_| controller_busy())?;
            f(&controller)
        };
        self.finish_pending_destroy();
        Ok(result)
    }

    /// Apply a `destroy` that arrived mid-operation, once no borrow is left
    fn finish_pending_destroy(&self) {
        if !self.destroy_pending.get() {
            return;
        }
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            self.destroy_pending.set(false);
            controller.destroy();
        }
    }

    /// Run `f` on the controller unless it is already borrowed higher up the stack
    fn with_controller<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        match self.try_write(f) {
            Ok(result) => Some(result),
            Err(_) => {
                wasm_warn!("controller busy, dropping re-entrant call");
                None
            }
        }
    }

    fn paint(&self) {
        let overlay = match self.controller.try_borrow() {
            Ok(controller) => controller.overlay().clone(),
            Err(_) => return,
        };
        if let Some(element) = self.dom.borrow().overlay.as_ref() {
            if let Err(e) = paint_overlay(element, &overlay) {
                wasm_warn!("overlay paint failed: {:?}", e);
            }
        }
    }

    /// Keyboard and clipboard only act while focus is inside the grid
    fn has_focus(&self) -> bool {
        let active: Option<Node> = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.active_element())
            .map(Node::from);
        self.grid.contains(active.as_ref())
    }

    fn clamp(&self, row: usize, col: usize) -> Option<CellPos> {
        let controller = self.controller.try_borrow().ok()?;
        let (rows, cols) = (controller.provider().row_count(), controller.provider().column_count());
        if rows == 0 || cols == 0 {
            return None;
        }
        Some(CellPos::new(row, col).clamp_to(rows, cols))
    }

    fn clear_feedback_timer(&self) {
        if let Some(handle) = self.dom.borrow_mut().feedback_timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
    }

    fn show_copy_feedback(self: &Rc<Self>) {
        self.clear_feedback_timer();
        let Some(ms) = self.with_controller(|c| {
            c.mark_copied();
            c.options().copy_feedback_ms
        }) else {
            return;
        };
        self.paint();

        let weak = Rc::downgrade(self);
        let reset = Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade() {
                shared.dom.borrow_mut().feedback_timer = None;
                shared.with_controller(|c| c.finish_copy_feedback());
                shared.paint();
            }
        });
        let handle = web_sys::window().and_then(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(reset.unchecked_ref(), ms as i32)
                .ok()
        });
        self.dom.borrow_mut().feedback_timer = handle;
    }

    fn unbind_all(&self) {
        self.clear_feedback_timer();
        let mut dom = self.dom.borrow_mut();
        for listener in dom.listeners.drain(..) {
            listener.unbind();
        }
        if let Some(overlay) = dom.overlay.take() {
            overlay.remove();
        }
    }
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<BoundListener, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok(BoundListener {
        target: target.clone(),
        event,
        closure,
    })
}

fn event_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

async fn copy_flow(weak: Weak<Shared>) -> Result<ClipboardPayload, CellAreaError> {
    let payload = {
        let shared = weak.upgrade().ok_or(CellAreaError::Destroyed)?;
        shared.try_read(|c| c.copy_payload())??
    };

    if let Err(e) = BrowserClipboard.write_text(&payload.text).await {
        wasm_error!("Failed to copy: {}", e);
        return Err(e);
    }

    if let Some(shared) = weak.upgrade() {
        shared.show_copy_feedback();
    }
    wasm_info!("Copied {} row(s) to clipboard", payload.rows.len());
    Ok(payload)
}

async fn paste_flow(weak: Weak<Shared>) -> Result<PasteReport, CellAreaError> {
    {
        let shared = weak.upgrade().ok_or(CellAreaError::Destroyed)?;
        shared.try_read(|c| {
            if c.is_destroyed() {
                Err(CellAreaError::Destroyed)
            } else if c.get_selection().is_none() {
                Err(CellAreaError::NoSelection)
            } else {
                Ok(())
            }
        })??;
    }

    let text = match BrowserClipboard.read_text().await {
        Ok(text) => text,
        Err(e) => {
            wasm_error!("Failed to paste: {}", e);
            return Err(e);
        }
    };

    // The selection may have moved while the clipboard read was pending
    let shared = weak.upgrade().ok_or(CellAreaError::Destroyed)?;
    let report = shared.try_write(|c| c.paste_text(&text))??;
    shared.paint();
    Ok(report)
}

/// Spreadsheet-style selection, clipboard and fill for one rendered grid
#[wasm_bindgen]
pub struct CellAreaManager {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl CellAreaManager {
    /// Create a manager for `grid`, reading and writing data through `provider`
    ///
    /// `options` may be null/undefined or any subset of the option fields.
    #[wasm_bindgen(constructor)]
    pub fn new(grid: HtmlElement, provider: JsValue, options: JsValue) -> Result<CellAreaManager, JsValue> {
        let options: CellAreaOptions = deserialize_or_default(options, "Invalid cell area options")?;
        let provider = JsDataProvider::new(provider).map_err(to_js_error)?;
        let surface = DomSurface::new(grid.clone().into());
        let controller = CellAreaController::new(provider, surface, options);

        Ok(CellAreaManager {
            shared: Rc::new(Shared {
                grid,
                controller: RefCell::new(controller),
                dom: RefCell::new(DomState::default()),
                destroy_pending: Cell::new(false),
            }),
        })
    }

    /// Attach the overlay and bind listeners; calling again rebinds from scratch
    pub fn init(&self) -> Result<(), JsValue> {
        let shared = &self.shared;
        shared.unbind_all();

        let wrapper = shared
            .try_read(|c| c.surface().body_wrapper())
            .map_err(to_js_error)?
            .ok_or_else(|| to_js_error(CellAreaError::Host("grid has no body wrapper".into())))?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| validation_error("No document available"))?;

        let options = shared
            .try_write(|c| c.init().map(|()| c.options().clone()))
            .and_then(|r| r)
            .map_err(to_js_error)?;

        let overlay = create_overlay(&document, &wrapper, &options.selection_style)?;
        shared.dom.borrow_mut().overlay = Some(overlay);

        let wrapper_target: &EventTarget = wrapper.as_ref();
        let document_target: &EventTarget = document.as_ref();
        let mut listeners = Vec::new();

        if options.enable_selection {
            let weak = Rc::downgrade(shared);
            let focus_target = wrapper.clone();
            listeners.push(listen(wrapper_target, "mousedown", move |event| {
                let (Some(shared), Some(target)) = (weak.upgrade(), event_element(&event)) else {
                    return;
                };
                let shift = event.dyn_ref::<MouseEvent>().map(|m| m.shift_key()).unwrap_or(false);
                let on_text_input = is_text_input(&target);
                if shared.with_controller(|c| c.pointer_down(&target, shift, on_text_input)) == Some(true) {
                    let _ = focus_target.focus();
                    event.prevent_default();
                    shared.paint();
                }
            })?);

            let weak = Rc::downgrade(shared);
            listeners.push(listen(wrapper_target, "mousemove", move |event| {
                let (Some(shared), Some(target)) = (weak.upgrade(), event_element(&event)) else {
                    return;
                };
                if shared.with_controller(|c| c.pointer_move(&target)) == Some(true) {
                    shared.paint();
                }
            })?);

            let weak = Rc::downgrade(shared);
            listeners.push(listen(document_target, "mouseup", move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.with_controller(|c| c.pointer_up());
                }
            })?);
        }

        if options.enable_keyboard {
            wrapper.set_attribute("tabindex", "0")?;
            wrapper.style().set_property("outline", "none")?;

            let weak = Rc::downgrade(shared);
            listeners.push(listen(document_target, "keydown", move |event| {
                let Some(shared) = weak.upgrade() else { return };
                let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
                let Some(nav) = NavKey::from_key(&key.key()) else { return };
                if !shared.has_focus() {
                    return;
                }
                let shift = key.shift_key();
                if shared.with_controller(|c| c.key_down(nav, shift)) == Some(true) {
                    event.prevent_default();
                    event.stop_propagation();
                    shared.paint();
                }
            })?);
        }

        if options.enable_clipboard {
            let weak = Rc::downgrade(shared);
            listeners.push(listen(document_target, "copy", move |event| {
                let Some(shared) = weak.upgrade() else { return };
                let has_selection = shared.controller.try_borrow().map(|c| c.get_selection().is_some()).unwrap_or(false);
                if !has_selection || !shared.has_focus() {
                    return;
                }
                event.prevent_default();
                let weak = Rc::downgrade(&shared);
                spawn_local(async move {
                    let _ = copy_flow(weak).await;
                });
            })?);

            let weak = Rc::downgrade(shared);
            listeners.push(listen(document_target, "paste", move |event| {
                let Some(shared) = weak.upgrade() else { return };
                let has_selection = shared.controller.try_borrow().map(|c| c.get_selection().is_some()).unwrap_or(false);
                if !has_selection || !shared.has_focus() {
                    return;
                }
                event.prevent_default();
                let weak = Rc::downgrade(&shared);
                spawn_local(async move {
                    let _ = paste_flow(weak).await;
                });
            })?);
        }

        wasm_log!("Bound {} listener(s)", listeners.len());
        shared.dom.borrow_mut().listeners = listeners;
        shared.paint();
        Ok(())
    }

    /// Unbind everything and remove the overlay; safe to call more than once
    ///
    /// Called from inside a provider callback, the controller is destroyed
    /// as soon as the running operation returns.
    pub fn destroy(&self) {
        self.shared.unbind_all();
        match self.shared.controller.try_borrow_mut() {
            Ok(mut controller) => controller.destroy(),
            Err(_) => {
                wasm_log!("destroy deferred until the running operation returns");
                self.shared.destroy_pending.set(true);
            }
        }
    }

    #[wasm_bindgen(js_name = selectCell)]
    pub fn select_cell(&self, row: usize, col: usize) {
        let Some(pos) = self.shared.clamp(row, col) else { return };
        self.shared.with_controller(|c| c.select_cell(pos.row, pos.col));
        self.shared.paint();
    }

    #[wasm_bindgen(js_name = selectRange)]
    pub fn select_range(&self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) {
        let (Some(start), Some(end)) = (self.shared.clamp(start_row, start_col), self.shared.clamp(end_row, end_col)) else {
            return;
        };
        self.shared.with_controller(|c| c.select_range(start.row, start.col, end.row, end.col));
        self.shared.paint();
    }

    /// Move (or with `extend`, grow) the selection one cell; returns the new selection or null
    #[wasm_bindgen(js_name = moveSelection)]
    pub fn move_selection(&self, direction: &str, extend: bool) -> Result<JsValue, JsValue> {
        let direction: Direction = direction.parse().map_err(validation_error)?;
        let moved = self.shared.with_controller(|c| c.move_selection(direction, extend)).flatten();
        self.shared.paint();
        match moved {
            Some(selection) => serialize(&selection, "Failed to serialize selection"),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) {
        self.shared.with_controller(|c| c.clear_selection());
        self.shared.paint();
    }

    /// Current selection as `{startRow, startCol, endRow, endCol}`, or null
    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsValue> {
        match self.shared.try_read(|c| c.get_selection()).map_err(to_js_error)? {
            Some(selection) => serialize(&selection, "Failed to serialize selection"),
            None => Ok(JsValue::NULL),
        }
    }

    /// Copy the selection as TSV; resolves to `{text, rows}`
    #[wasm_bindgen(js_name = copySelection)]
    pub fn copy_selection(&self) -> Promise {
        let weak = Rc::downgrade(&self.shared);
        future_to_promise(async move {
            let payload = copy_flow(weak).await.map_err(to_js_error)?;
            serialize(&payload, "Failed to serialize clipboard payload")
        })
    }

    /// Paste clipboard TSV at the selection; resolves to a paste report
    #[wasm_bindgen(js_name = pasteFromClipboard)]
    pub fn paste_from_clipboard(&self) -> Promise {
        let weak = Rc::downgrade(&self.shared);
        future_to_promise(async move {
            let report = paste_flow(weak).await.map_err(to_js_error)?;
            serialize(&report, "Failed to serialize paste report")
        })
    }

    /// Paste the given TSV text at the selection, bypassing the system clipboard
    #[wasm_bindgen(js_name = pasteText)]
    pub fn paste_text(&self, text: &str) -> Result<JsValue, JsValue> {
        let report = self.shared.try_write(|c| c.paste_text(text)).and_then(|r| r).map_err(to_js_error)?;
        self.shared.paint();
        serialize(&report, "Failed to serialize paste report")
    }

    #[wasm_bindgen(js_name = startFillDrag)]
    pub fn start_fill_drag(&self, row: usize, col: usize) -> Result<(), JsValue> {
        let pos = self.shared.clamp(row, col).unwrap_or(CellPos::new(row, col));
        self.shared
            .try_write(|c| c.start_fill_drag(pos.row, pos.col))
            .and_then(|r| r)
            .map_err(to_js_error)
    }

    /// Grow the fill target toward (row, col); returns the target range or null
    #[wasm_bindgen(js_name = updateFillRange)]
    pub fn update_fill_range(&self, row: usize, col: usize) -> Result<JsValue, JsValue> {
        match self.shared.try_write(|c| c.update_fill_range(row, col)).map_err(to_js_error)? {
            Some(target) => serialize(&target, "Failed to serialize fill range"),
            None => Ok(JsValue::NULL),
        }
    }

    /// Write the fill series and select the filled range; returns a paste report
    #[wasm_bindgen(js_name = endFillDrag)]
    pub fn end_fill_drag(&self) -> Result<JsValue, JsValue> {
        let report = self.shared.try_write(|c| c.end_fill_drag()).and_then(|r| r).map_err(to_js_error)?;
        self.shared.paint();
        serialize(&report, "Failed to serialize fill report")
    }

    #[wasm_bindgen(js_name = cancelFillDrag)]
    pub fn cancel_fill_drag(&self) {
        self.shared.with_controller(|c| c.cancel_fill_drag());
    }

    /// Recompute the overlay after the grid re-renders or resizes
    #[wasm_bindgen(js_name = refreshOverlay)]
    pub fn refresh_overlay(&self) {
        self.shared.with_controller(|c| c.refresh_overlay());
        self.shared.paint();
    }

    /// Interaction state name: "Idle", "Selecting", "Fixed" or "Terminated"
    ///
    /// "Busy" while a copy, paste or fill is calling into the provider.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.shared
            .try_read(|c| format!("{:?}", c.state()))
            .unwrap_or_else(|_| "Busy".to_string())
    }
}

impl Drop for CellAreaManager {
    fn drop(&mut self) {
        self.shared.unbind_all();
    }
}
