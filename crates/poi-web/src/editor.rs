//! Keyboard-driven editor controller: the document-level shortcut listener,
//! the help/edit-mode overlay, marker selection and the delete flow. The
//! keydown listener is stored (not leaked) so the whole editor can be torn
//! down again.

use crate::app::App;
use crate::{api, dom, modal};
use poi_core::EditorAction;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const UI_ROOT_ID: &str = "poi-editor-ui";

pub struct Controller {
    app: Rc<App>,
    keydown: Option<Closure<dyn FnMut(web::KeyboardEvent)>>,
    ui_root: Option<web::Element>,
}

impl Controller {
    /// Attach the shortcut listener and the on-screen help. One controller
    /// per page; building a second would double-handle every key.
    pub fn new(app: Rc<App>) -> anyhow::Result<Self> {
        let ui_root = build_ui(&app)?;
        wire_action_bar(&app);

        let keydown = {
            let weak = Rc::downgrade(&app);
            Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                let Some(app) = weak.upgrade() else { return };
                handle_key(&app, &ev);
            }) as Box<dyn FnMut(web::KeyboardEvent)>)
        };
        app.document
            .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;

        Ok(Self {
            app,
            keydown: Some(keydown),
            ui_root: Some(ui_root),
        })
    }

    /// Detach the shortcut listener and the overlay. Safe to call twice.
    pub fn teardown(&mut self) {
        if let Some(keydown) = self.keydown.take() {
            let _ = self.app.document.remove_event_listener_with_callback(
                "keydown",
                keydown.as_ref().unchecked_ref(),
            );
        }
        if let Some(root) = self.ui_root.take() {
            root.remove();
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn handle_key(app: &Rc<App>, ev: &web::KeyboardEvent) {
    // While the creation modal is up it owns the keyboard: Escape closes
    // it, everything else is form input.
    if modal::is_open(app) {
        if ev.key() == "Escape" {
            modal::close_modal(app);
        }
        return;
    }
    let Some(action) = EditorAction::from_key(&ev.key(), dom::event_in_text_input(ev)) else {
        return;
    };
    ev.prevent_default();
    match action {
        EditorAction::OpenCreateModal(kind) => modal::open_modal(app, kind),
        EditorAction::ToggleEditMode => toggle_edit_mode(app),
        EditorAction::DeleteSelected => request_delete(app),
        EditorAction::Deselect => deselect_poi(app),
    }
}

/// Flip edit mode and sync everything that hangs off it: the indicator, the
/// markers' selectable affordance, and (when leaving) the selection visuals.
pub fn toggle_edit_mode(app: &Rc<App>) {
    let previous = app.state.borrow().selected().map(str::to_owned);
    let on = app.state.borrow_mut().toggle_edit_mode();
    log::info!("[editor] edit mode {}", if on { "on" } else { "off" });

    if let Some(indicator) = indicator_element(app) {
        let _ = indicator
            .style()
            .set_property("display", if on { "block" } else { "none" });
    }
    for marker in app.markers.borrow().iter() {
        marker.set_selectable(on);
    }
    if !on {
        // The state machine already dropped the selection; mirror that in
        // the scene and the action bar.
        if let Some(id) = previous {
            set_marker_selected(app, &id, false);
        }
        show_action_bar(app, None);
    }
}

/// Select a marker (edit mode only), replacing any previous selection.
pub fn select_poi(app: &Rc<App>, poi_id: &str) {
    if !app.state.borrow().edit_mode() {
        return;
    }
    let previous = app.state.borrow_mut().select(poi_id);
    if previous.as_deref() == Some(poi_id) {
        return;
    }
    if let Some(prev) = previous {
        set_marker_selected(app, &prev, false);
    }
    set_marker_selected(app, poi_id, true);
    let title = app
        .markers
        .borrow()
        .iter()
        .find(|m| m.id() == poi_id)
        .map(|m| m.poi().title.clone());
    show_action_bar(app, title.as_deref());
}

/// Drop the selection (Escape or the Cancel button).
pub fn deselect_poi(app: &Rc<App>) {
    if let Some(prev) = app.state.borrow_mut().clear_selection() {
        set_marker_selected(app, &prev, false);
    }
    show_action_bar(app, None);
}

/// Delete the selected POI: confirm, fire the request, drop the marker on
/// success. The selection is cleared up front either way, so a failed
/// delete never leaves a ring on a POI the user thinks is gone.
pub fn request_delete(app: &Rc<App>) {
    let Some(id) = app.state.borrow().delete_target().map(str::to_owned) else {
        return;
    };
    let title = app
        .markers
        .borrow()
        .iter()
        .find(|m| m.id() == id)
        .map(|m| m.poi().title.clone())
        .unwrap_or_default();
    let confirmed = web::window()
        .and_then(|w| w.confirm_with_message(&format!("Delete POI \"{title}\"?")).ok())
        .unwrap_or(false);
    if !confirmed {
        return;
    }
    deselect_poi(app);

    let weak = Rc::downgrade(app);
    let scene_id = app.scene_id.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match api::delete_poi(&scene_id, &id).await {
            Ok(()) => {
                log::info!("[editor] deleted POI {id}");
                if let Some(app) = weak.upgrade() {
                    let mut markers = app.markers.borrow_mut();
                    if let Some(index) = markers.iter().position(|m| m.id() == id) {
                        let mut marker = markers.remove(index);
                        marker.remove(&app.document);
                    }
                }
            }
            Err(e) => {
                log::error!("[editor] delete failed: {e}");
                if let Some(window) = web::window() {
                    let _ = window.alert_with_message(&format!("Failed to delete POI: {e}"));
                }
            }
        }
    });
}

fn set_marker_selected(app: &Rc<App>, poi_id: &str, selected: bool) {
    let markers = app.markers.borrow();
    if let Some(marker) = markers.iter().find(|m| m.id() == poi_id) {
        marker.set_selected(&app.document, selected);
    }
}

fn indicator_element(app: &Rc<App>) -> Option<web::HtmlElement> {
    app.document
        .get_element_by_id("editModeIndicator")
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
}

/// Show the action bar labelled with the selected title, or hide it.
fn show_action_bar(app: &Rc<App>, title: Option<&str>) {
    let Some(bar) = app
        .document
        .get_element_by_id("poiActionBar")
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    else {
        return;
    };
    match title {
        Some(title) => {
            if let Some(label) = app.document.get_element_by_id("poiSelectionLabel") {
                label.set_text_content(Some(title));
            }
            let _ = bar.style().set_property("display", "flex");
        }
        None => {
            let _ = bar.style().set_property("display", "none");
        }
    }
}

fn build_ui(app: &Rc<App>) -> anyhow::Result<web::Element> {
    let body = app
        .document
        .body()
        .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
    body.insert_adjacent_html(
        "beforeend",
        &format!(
            r#"<div id="{UI_ROOT_ID}" style="position:fixed;bottom:12px;left:12px;z-index:900;font-family:sans-serif;font-size:13px;color:#e5e7eb">
              <div id="editModeIndicator" style="display:none;background:#f59e0b;color:#1f2937;padding:2px 8px;border-radius:4px;margin-bottom:6px;font-weight:bold">EDIT MODE</div>
              <div id="poiActionBar" style="display:none;gap:6px;align-items:center;background:rgba(17,24,39,0.85);padding:6px 10px;border-radius:6px;margin-bottom:6px">
                <span id="poiSelectionLabel" style="margin-right:6px"></span>
                <button id="poiEditBtn" type="button">Edit</button>
                <button id="poiDeleteBtn" type="button">Delete</button>
                <button id="poiCancelBtn" type="button">Cancel</button>
              </div>
              <div style="background:rgba(17,24,39,0.7);padding:6px 10px;border-radius:6px">
                <kbd>I</kbd> info &nbsp; <kbd>L</kbd> link &nbsp; <kbd>M</kbd> media &nbsp;
                <kbd>E</kbd> edit mode &nbsp; <kbd>Del</kbd> delete &nbsp; <kbd>Esc</kbd> deselect
              </div>
            </div>"#
        ),
    )
    .map_err(dom::js_err)?;
    app.document
        .get_element_by_id(UI_ROOT_ID)
        .ok_or_else(|| anyhow::anyhow!("editor overlay did not attach"))
}

/// Action-bar buttons live as long as the page, so the forget-style click
/// helper is fine here.
fn wire_action_bar(app: &Rc<App>) {
    {
        let weak = Rc::downgrade(app);
        dom::add_click_listener(&app.document, "poiEditBtn", move || {
            if weak.upgrade().is_some() {
                if let Some(window) = web::window() {
                    let _ = window.alert_with_message("Editing is not yet implemented");
                }
            }
        });
    }
    {
        let weak = Rc::downgrade(app);
        dom::add_click_listener(&app.document, "poiDeleteBtn", move || {
            if let Some(app) = weak.upgrade() {
                request_delete(&app);
            }
        });
    }
    {
        let weak = Rc::downgrade(app);
        dom::add_click_listener(&app.document, "poiCancelBtn", move || {
            if let Some(app) = weak.upgrade() {
                deselect_poi(&app);
            }
        });
    }
}
