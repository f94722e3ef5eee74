use anyhow::anyhow;
use glam::Vec3;
use poi_core::attr;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow!(format!("{e:?}"))
}

/// Create an element or explain which tag failed; scene-graph tags like
/// `a-entity` are custom elements the host upgrades, plain elements to us.
pub fn create(document: &web::Document, tag: &str) -> anyhow::Result<web::Element> {
    document
        .create_element(tag)
        .map_err(|e| anyhow!("create_element({tag}): {e:?}"))
}

pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// The active camera entity, by the scene-graph convention of a `camera`
/// attribute on exactly one entity.
pub fn camera_element(document: &web::Document) -> Option<web::Element> {
    document.query_selector("[camera]").ok().flatten()
}

/// World position of the camera entity, from its `position` attribute.
pub fn camera_position(document: &web::Document) -> Option<Vec3> {
    let cam = camera_element(document)?;
    cam.get_attribute("position")
        .as_deref()
        .and_then(attr::parse_vec3)
}

/// Position and rotation (Euler degrees) of the camera entity. Missing
/// attributes fall back to the origin / rest pose.
pub fn camera_pose(document: &web::Document) -> Option<(Vec3, Vec3)> {
    let cam = camera_element(document)?;
    let pos = cam
        .get_attribute("position")
        .as_deref()
        .and_then(attr::parse_vec3)
        .unwrap_or(Vec3::ZERO);
    let rot = cam
        .get_attribute("rotation")
        .as_deref()
        .and_then(attr::parse_vec3)
        .unwrap_or(Vec3::ZERO);
    Some((pos, rot))
}

/// The scene root that markers and panels are appended to.
pub fn scene_root(document: &web::Document) -> Option<web::Element> {
    document.query_selector("a-scene").ok().flatten()
}

pub fn set_body_cursor(document: &web::Document, cursor: &str) {
    if let Some(body) = document.body() {
        let _ = body.style().set_property("cursor", cursor);
    }
}

/// Whether a keyboard event originated inside a text input or textarea, in
/// which case it is typing, not an editor shortcut.
pub fn event_in_text_input(ev: &web::KeyboardEvent) -> bool {
    let Some(target) = ev.target() else {
        return false;
    };
    let Some(el) = target.dyn_ref::<web::Element>() else {
        return false;
    };
    matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA")
}

pub fn input_value(document: &web::Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default()
}

pub fn select_value(document: &web::Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
        .map(|sel| sel.value())
        .unwrap_or_default()
}

pub fn textarea_value(document: &web::Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlTextAreaElement>().ok())
        .map(|area| area.value())
        .unwrap_or_default()
}

pub fn checkbox_checked(document: &web::Document, id: &str) -> bool {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
        .map(|input| input.checked())
        .unwrap_or(false)
}

pub fn set_input_value(document: &web::Document, id: &str, value: &str) {
    if let Some(input) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    {
        input.set_value(value);
    }
}

/// Write an inline error message next to a control, or clear it with "".
pub fn set_error_text(document: &web::Document, id: &str, message: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(message));
        let _ = if message.is_empty() {
            el.class_list().remove_1("active")
        } else {
            el.class_list().add_1("active")
        };
    }
}
