//! Scene-link anchor persistence: scan the scene's `a-link` anchors, snapshot
//! their placement, and PUT the lot to the backend when the save control is
//! clicked.

use crate::app::App;
use crate::{api, dom};
use poi_core::links::LinkSnapshot;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

const SAVE_BUTTON_ID: &str = "saveLinksBtn";

/// Anchor placements as the scene currently has them. Anchors without an
/// `origin` id are skipped; missing position/rotation fall back to rest.
fn snapshot_anchors(document: &web::Document) -> LinkSnapshot {
    let mut snapshot = LinkSnapshot::new();
    let Ok(anchors) = document.query_selector_all("a-link") else {
        return snapshot;
    };
    for index in 0..anchors.length() {
        let Some(el) = anchors
            .item(index)
            .and_then(|node| node.dyn_into::<web::Element>().ok())
        else {
            continue;
        };
        let Some(origin) = el.get_attribute("origin").filter(|o| !o.is_empty()) else {
            log::warn!("[links] anchor without origin skipped");
            continue;
        };
        let position = el.get_attribute("position").unwrap_or_else(|| "0 0 0".into());
        let rotation = el.get_attribute("rotation").unwrap_or_else(|| "0 0 0".into());
        snapshot.insert(&origin, &position, &rotation);
    }
    snapshot
}

/// Flash the save control green so the user sees the save landed.
fn mark_saved(document: &web::Document) {
    if let Some(button) = document
        .get_element_by_id(SAVE_BUTTON_ID)
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    {
        let _ = button.style().set_property("background-color", "#10b981");
    }
}

/// Wire the optional save control. Pages without one simply get no listener.
pub fn wire_save_button(app: &Rc<App>) {
    let weak = Rc::downgrade(app);
    dom::add_click_listener(&app.document, SAVE_BUTTON_ID, move || {
        let Some(app) = weak.upgrade() else { return };
        let snapshot = snapshot_anchors(&app.document);
        if snapshot.is_empty() {
            log::info!("[links] nothing to save");
            return;
        }
        log::info!("[links] saving {} anchor(s)", snapshot.len());
        let space_id = app.space_id.clone();
        let document = app.document.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match api::put_link_snapshot(&space_id, &snapshot).await {
                Ok(()) => mark_saved(&document),
                Err(e) => {
                    log::error!("[links] save failed: {e}");
                    if let Some(window) = web::window() {
                        let _ =
                            window.alert_with_message(&format!("Failed to save links: {e}"));
                    }
                }
            }
        });
    });
}
