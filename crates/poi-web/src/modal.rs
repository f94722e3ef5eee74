//! POI creation modal: a 2D overlay form assembled per kind, validated with
//! the pure form rules, and submitted as multipart form data. At most one
//! modal exists at a time; the keyboard controller refuses to open a second
//! one while this is up.

use crate::app::{self, App};
use crate::{api, dom};
use poi_core::form::{validate_image, FormError, FormLayout, PoiDraft, PLACEMENT_AHEAD_METERS};
use poi_core::{MediaKind, PoiKind};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const OVERLAY_ID: &str = "poiModal";
const CLOSE_FADE_MS: i32 = 300;

pub struct Modal {
    kind: PoiKind,
    overlay: web::Element,
    /// Last image that passed validation; a rejected file never clobbers it.
    selected_image: Rc<RefCell<Option<web::File>>>,
    closing: Cell<bool>,
    _overlay_click: Closure<dyn FnMut(web::MouseEvent)>,
    _drag: Vec<Closure<dyn FnMut(web::DragEvent)>>,
    _clicks: Vec<Closure<dyn FnMut()>>,
}

/// Build and show the modal for `kind`. No-op if one is already open.
pub fn open_modal(app: &Rc<App>, kind: PoiKind) {
    if app.modal.borrow().is_some() {
        return;
    }
    match Modal::build(app, kind) {
        Ok(modal) => {
            *app.modal.borrow_mut() = Some(modal);
        }
        Err(e) => log::error!("[modal] build failed: {e:?}"),
    }
}

/// Fade the modal out and detach it once the fade has played. Idempotent.
pub fn close_modal(app: &Rc<App>) {
    let Some(modal) = app.modal.borrow_mut().take() else {
        return;
    };
    if modal.closing.replace(true) {
        return;
    }
    if let Some(overlay) = modal.overlay.dyn_ref::<web::HtmlElement>() {
        let _ = overlay.style().set_property("opacity", "0");
    }
    // The timeout closure owns the modal; listeners stay alive until the
    // overlay is actually gone. The rebind below forces the whole struct
    // into the capture; naming only `modal.overlay` would move that one
    // field and drop the stored listeners right here.
    let scheduled = web::window().and_then(|w| {
        let cb = Closure::once_into_js(move || {
            let modal = modal;
            modal.overlay.remove();
        });
        w.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.unchecked_ref(),
            CLOSE_FADE_MS,
        )
        .ok()
    });
    if scheduled.is_none() {
        log::error!("[modal] close timeout could not be scheduled");
        if let Some(overlay) = web::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(OVERLAY_ID))
        {
            overlay.remove();
        }
    }
}

pub fn is_open(app: &Rc<App>) -> bool {
    app.modal.borrow().is_some()
}

impl Modal {
    fn build(app: &Rc<App>, kind: PoiKind) -> anyhow::Result<Self> {
        let document = app.document.clone();
        let body = document
            .body()
            .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
        // A just-closed modal keeps its overlay in the DOM while the fade
        // plays; detach it first or the id lookup below would find the
        // doomed element instead of the new one.
        if let Some(stale) = document.get_element_by_id(OVERLAY_ID) {
            stale.remove();
        }
        body.insert_adjacent_html("beforeend", &form_html(app, kind))
            .map_err(dom::js_err)?;
        let overlay = document
            .get_element_by_id(OVERLAY_ID)
            .ok_or_else(|| anyhow::anyhow!("modal overlay did not attach"))?;

        let selected_image = Rc::new(RefCell::new(None::<web::File>));
        let mut clicks = Vec::new();
        let mut drags = Vec::new();

        // Cancel and the corner X both just close.
        for id in ["poiCancel", "poiCloseX"] {
            let weak = Rc::downgrade(app);
            attach_click(&document, id, &mut clicks, move || {
                if let Some(app) = weak.upgrade() {
                    close_modal(&app);
                }
            })?;
        }

        // A click on the dimmed backdrop itself (not the dialog) closes too.
        let overlay_click = {
            let weak = Rc::downgrade(app);
            let overlay = overlay.clone();
            Closure::wrap(Box::new(move |ev: web::MouseEvent| {
                let on_backdrop = ev
                    .target()
                    .as_ref()
                    .and_then(|t| t.dyn_ref::<web::Node>().cloned())
                    .is_some_and(|n| overlay.is_same_node(Some(&n)));
                if on_backdrop {
                    if let Some(app) = weak.upgrade() {
                        close_modal(&app);
                    }
                }
            }) as Box<dyn FnMut(web::MouseEvent)>)
        };
        overlay
            .add_event_listener_with_callback("click", overlay_click.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;

        {
            let weak = Rc::downgrade(app);
            let doc = document.clone();
            attach_click(&document, "poiUsePosition", &mut clicks, move || {
                let Some(app) = weak.upgrade() else { return };
                match app::camera_placement(&app, PLACEMENT_AHEAD_METERS) {
                    Some(p) => {
                        dom::set_input_value(&doc, "poiPosX", &format!("{:.2}", p.x));
                        dom::set_input_value(&doc, "poiPosY", &format!("{:.2}", p.y));
                        dom::set_input_value(&doc, "poiPosZ", &format!("{:.2}", p.z));
                    }
                    None => log::error!("[modal] no camera to take a position from"),
                }
            })?;
        }

        if FormLayout::for_kind(kind).image_upload {
            wire_image_upload(&document, &overlay, &selected_image, &mut clicks, &mut drags)?;
        }

        {
            let weak = Rc::downgrade(app);
            attach_click(&document, "poiSubmit", &mut clicks, move || {
                if let Some(app) = weak.upgrade() {
                    submit(&app, kind);
                }
            })?;
        }

        Ok(Self {
            kind,
            overlay,
            selected_image,
            closing: Cell::new(false),
            _overlay_click: overlay_click,
            _drag: drags,
            _clicks: clicks,
        })
    }
}

fn attach_click(
    document: &web::Document,
    id: &str,
    store: &mut Vec<Closure<dyn FnMut()>>,
    handler: impl FnMut() + 'static,
) -> anyhow::Result<()> {
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("modal control `{id}` missing"))?;
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(dom::js_err)?;
    store.push(closure);
    Ok(())
}

/// Drop zone, hidden file input, validation and preview for the info form's
/// image attachment.
fn wire_image_upload(
    document: &web::Document,
    overlay: &web::Element,
    selected: &Rc<RefCell<Option<web::File>>>,
    clicks: &mut Vec<Closure<dyn FnMut()>>,
    drags: &mut Vec<Closure<dyn FnMut(web::DragEvent)>>,
) -> anyhow::Result<()> {
    let zone = overlay
        .query_selector("#poiImageDrop")
        .map_err(dom::js_err)?
        .ok_or_else(|| anyhow::anyhow!("image drop zone missing"))?;
    let input = document
        .get_element_by_id("poiImageInput")
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
        .ok_or_else(|| anyhow::anyhow!("image file input missing"))?;

    // Clicking the zone opens the regular file picker.
    {
        let input = input.clone();
        attach_click(document, "poiImageDrop", clicks, move || input.click())?;
    }
    {
        let document = document.clone();
        let selected = selected.clone();
        let input_for_change = input.clone();
        let change = Closure::wrap(Box::new(move || {
            if let Some(file) = input_for_change.files().and_then(|fs| fs.get(0)) {
                accept_image(&document, file, &selected);
            }
        }) as Box<dyn FnMut()>);
        input
            .add_event_listener_with_callback("change", change.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        clicks.push(change);
    }

    let over = {
        let zone = zone.clone();
        Closure::wrap(Box::new(move |ev: web::DragEvent| {
            ev.prevent_default();
            let _ = zone.class_list().add_1("dragover");
        }) as Box<dyn FnMut(web::DragEvent)>)
    };
    let leave = {
        let zone = zone.clone();
        Closure::wrap(Box::new(move |ev: web::DragEvent| {
            ev.prevent_default();
            let _ = zone.class_list().remove_1("dragover");
        }) as Box<dyn FnMut(web::DragEvent)>)
    };
    let drop = {
        let zone = zone.clone();
        let document = document.clone();
        let selected = selected.clone();
        Closure::wrap(Box::new(move |ev: web::DragEvent| {
            ev.prevent_default();
            let _ = zone.class_list().remove_1("dragover");
            let file = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|fs| fs.get(0));
            if let Some(file) = file {
                accept_image(&document, file, &selected);
            }
        }) as Box<dyn FnMut(web::DragEvent)>)
    };
    zone.add_event_listener_with_callback("dragover", over.as_ref().unchecked_ref())
        .map_err(dom::js_err)?;
    zone.add_event_listener_with_callback("dragleave", leave.as_ref().unchecked_ref())
        .map_err(dom::js_err)?;
    zone.add_event_listener_with_callback("drop", drop.as_ref().unchecked_ref())
        .map_err(dom::js_err)?;
    drags.push(over);
    drags.push(leave);
    drags.push(drop);
    Ok(())
}

/// Validate a candidate file. On rejection the error line is shown and the
/// previous selection survives; on acceptance the file replaces it and a
/// data-URL preview is rendered.
fn accept_image(
    document: &web::Document,
    file: web::File,
    selected: &Rc<RefCell<Option<web::File>>>,
) {
    if let Err(e) = validate_image(&file.type_(), file.size() as u64) {
        dom::set_error_text(document, "poiImageError", &e.to_string());
        return;
    }
    dom::set_error_text(document, "poiImageError", "");
    let name = file.name();
    let kib = file.size() / 1024.0;
    if let Some(info) = document.get_element_by_id("poiImageInfo") {
        info.set_text_content(Some(&format!("{name} ({kib:.0} KB)")));
    }
    *selected.borrow_mut() = Some(file.clone());

    let Ok(reader) = web::FileReader::new() else {
        return;
    };
    let onload = {
        let reader = reader.clone();
        let document = document.clone();
        Closure::once_into_js(move || {
            let url = reader.result().ok().and_then(|v| v.as_string());
            let img = document
                .get_element_by_id("poiImagePreview")
                .and_then(|el| el.dyn_into::<web::HtmlImageElement>().ok());
            if let (Some(url), Some(img)) = (url, img) {
                img.set_src(&url);
                let _ = img.style().set_property("display", "block");
            }
        })
    };
    reader.set_onload(Some(onload.unchecked_ref()));
    if let Err(e) = reader.read_as_data_url(&file) {
        log::error!("[modal] preview read failed: {e:?}");
    }
}

/// Pull the draft out of the DOM. Unparseable coordinates become NaN so the
/// position rule rejects them instead of silently defaulting.
fn read_draft(document: &web::Document, kind: PoiKind) -> PoiDraft {
    let mut draft = PoiDraft::new(kind);
    draft.title = dom::input_value(document, "poiTitle");
    draft.description = dom::textarea_value(document, "poiDescription");
    let coord = |id: &str| {
        dom::input_value(document, id)
            .trim()
            .parse::<f32>()
            .unwrap_or(f32::NAN)
    };
    draft.position.x = coord("poiPosX");
    draft.position.y = coord("poiPosY");
    draft.position.z = coord("poiPosZ");
    draft.visible = dom::checkbox_checked(document, "poiVisible");
    match kind {
        PoiKind::Info => {}
        PoiKind::Link => draft.target_scene_id = dom::select_value(document, "poiTargetScene"),
        PoiKind::Media => {
            draft.media_url = dom::input_value(document, "poiMediaUrl");
            draft.media_kind = MediaKind::parse(&dom::select_value(document, "poiMediaType"));
        }
    }
    draft
}

fn show_errors(document: &web::Document, errors: &[FormError]) {
    for id in [
        "poiTitleError",
        "poiDescriptionError",
        "poiPositionError",
        "poiSceneError",
        "poiMediaError",
    ] {
        dom::set_error_text(document, id, "");
    }
    for error in errors {
        let id = match error {
            FormError::TitleMissing | FormError::TitleTooLong => "poiTitleError",
            FormError::DescriptionTooLong => "poiDescriptionError",
            FormError::PositionInvalid => "poiPositionError",
            FormError::TargetSceneMissing => "poiSceneError",
            FormError::MediaUrlMissing | FormError::MediaKindMissing => "poiMediaError",
        };
        dom::set_error_text(document, id, &error.to_string());
    }
}

fn submit_button(document: &web::Document) -> Option<web::HtmlButtonElement> {
    document
        .get_element_by_id("poiSubmit")
        .and_then(|el| el.dyn_into::<web::HtmlButtonElement>().ok())
}

/// Validate, assemble the multipart form and fire the create request. The
/// button goes inert while the request is in flight; a failure re-arms it
/// with the backend's message surfaced, a success refreshes the markers.
fn submit(app: &Rc<App>, kind: PoiKind) {
    let document = app.document.clone();
    let draft = read_draft(&document, kind);
    let errors = draft.validate();
    show_errors(&document, &errors);
    if !errors.is_empty() {
        return;
    }

    let form = match web::FormData::new() {
        Ok(form) => form,
        Err(e) => {
            log::error!("[modal] FormData unavailable: {e:?}");
            return;
        }
    };
    for (name, value) in draft.multipart_fields() {
        if let Err(e) = form.append_with_str(name, &value) {
            log::error!("[modal] form field `{name}` rejected: {e:?}");
            return;
        }
    }
    let image = app
        .modal
        .borrow()
        .as_ref()
        .and_then(|m| m.selected_image.borrow().clone());
    if let Some(file) = &image {
        if let Err(e) = form.append_with_blob_and_filename("image", file, &file.name()) {
            log::error!("[modal] image attach failed: {e:?}");
            return;
        }
    }

    if let Some(button) = submit_button(&document) {
        button.set_disabled(true);
        button.set_text_content(Some("Creating..."));
    }

    let weak = Rc::downgrade(app);
    let scene_id = app.scene_id.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match api::create_poi(&scene_id, &form).await {
            Ok(created) => {
                log::info!("[modal] created POI {}", created.id);
                if let Some(app) = weak.upgrade() {
                    close_modal(&app);
                    // Re-fetch instead of trusting our local draft; the new
                    // marker shows exactly what the backend stored.
                    app::refresh_pois(&app).await;
                }
            }
            Err(e) => {
                log::error!("[modal] create failed: {e}");
                if let Some(window) = web::window() {
                    let _ = window.alert_with_message(&format!("Failed to create POI: {e}"));
                }
                if let Some(app) = weak.upgrade() {
                    if let Some(button) = submit_button(&app.document) {
                        button.set_disabled(false);
                        button.set_text_content(Some("Create"));
                    }
                }
            }
        }
    });
}

fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn form_html(app: &Rc<App>, kind: PoiKind) -> String {
    let layout = FormLayout::for_kind(kind);
    let heading = match kind {
        PoiKind::Info => "Add Info Point",
        PoiKind::Link => "Add Link Point",
        PoiKind::Media => "Add Media Point",
    };

    let mut sections = String::new();
    if layout.image_upload {
        sections.push_str(
            r#"<div class="poi-field">
              <label>Image (JPG/PNG, max 10MB)</label>
              <div id="poiImageDrop" class="poi-dropzone">Drop an image here or click to browse</div>
              <input type="file" id="poiImageInput" accept="image/jpeg,image/png" style="display:none">
              <img id="poiImagePreview" style="display:none;max-width:100%;max-height:150px">
              <span id="poiImageInfo" class="poi-hint"></span>
              <span id="poiImageError" class="poi-error"></span>
            </div>"#,
        );
    }
    if layout.target_scene {
        let mut options = String::new();
        for scene in app.scenes.borrow().iter() {
            if scene.id == app.scene_id {
                continue;
            }
            options.push_str(&format!(
                r#"<option value="{}">{}</option>"#,
                html_escape(&scene.id),
                html_escape(&scene.name)
            ));
        }
        sections.push_str(&format!(
            r#"<div class="poi-field">
              <label for="poiTargetScene">Target scene</label>
              <select id="poiTargetScene"><option value="">Select a scene...</option>{options}</select>
              <span id="poiSceneError" class="poi-error"></span>
            </div>"#
        ));
    }
    if layout.media_fields {
        sections.push_str(
            r#"<div class="poi-field">
              <label for="poiMediaUrl">Media URL</label>
              <input type="text" id="poiMediaUrl" placeholder="https://...">
              <label for="poiMediaType">Media type</label>
              <select id="poiMediaType">
                <option value="">Select a type...</option>
                <option value="video">Video</option>
                <option value="audio">Audio</option>
              </select>
              <span id="poiMediaError" class="poi-error"></span>
            </div>"#,
        );
    }

    format!(
        r#"<div id="{OVERLAY_ID}" class="poi-modal" style="position:fixed;inset:0;background:rgba(0,0,0,0.6);display:flex;align-items:center;justify-content:center;z-index:1000;transition:opacity {CLOSE_FADE_MS}ms">
          <div class="poi-dialog" style="background:#fff;border-radius:8px;padding:20px;width:420px;max-height:85vh;overflow-y:auto">
            <div class="poi-dialog-head" style="display:flex;justify-content:space-between">
              <h3>{heading}</h3>
              <button id="poiCloseX" type="button" class="poi-close">&times;</button>
            </div>
            <div class="poi-field">
              <label for="poiTitle">Title</label>
              <input type="text" id="poiTitle" maxlength="200">
              <span id="poiTitleError" class="poi-error"></span>
            </div>
            <div class="poi-field">
              <label for="poiDescription">Description</label>
              <textarea id="poiDescription" rows="3" maxlength="2000"></textarea>
              <span id="poiDescriptionError" class="poi-error"></span>
            </div>
            <div class="poi-field">
              <label>Position</label>
              <input type="text" id="poiPosX" value="0" size="6">
              <input type="text" id="poiPosY" value="1.5" size="6">
              <input type="text" id="poiPosZ" value="-3" size="6">
              <button id="poiUsePosition" type="button">Use current position</button>
              <span id="poiPositionError" class="poi-error"></span>
            </div>
            {sections}
            <div class="poi-field">
              <label><input type="checkbox" id="poiVisible" checked> Visible</label>
            </div>
            <div class="poi-actions" style="display:flex;gap:8px;justify-content:flex-end">
              <button id="poiCancel" type="button">Cancel</button>
              <button id="poiSubmit" type="button">Create</button>
            </div>
          </div>
        </div>"#
    )
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal").field("kind", &self.kind).finish()
    }
}
