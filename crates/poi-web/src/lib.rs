#![cfg(target_arch = "wasm32")]
//! Browser frontend for the scene POI editor: markers, info panels, the
//! keyboard editor and the creation modal, all driven through the host
//! page's declarative scene graph.

pub mod api;
pub mod app;
pub mod dom;
pub mod editor;
pub mod frame;
pub mod links;
pub mod marker;
pub mod modal;
pub mod panel;

use app::App;
use poi_core::marker::{scene_id_from_path, space_id_from_path};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

thread_local! {
    // Keeps the controller reachable so `shutdown_editor` can drop it and
    // detach its listeners again.
    static CONTROLLER: RefCell<Option<editor::Controller>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("poi-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {e:?}");
        }
    });
    Ok(())
}

/// Tear the keyboard editor down again (listeners and overlay). The page
/// calls this when the viewer loses edit rights without a reload.
#[wasm_bindgen]
pub fn shutdown_editor() {
    CONTROLLER.with(|slot| {
        if slot.borrow_mut().take().is_some() {
            log::info!("editor torn down");
        }
    });
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let pathname = window
        .location()
        .pathname()
        .map_err(|e| anyhow::anyhow!("no pathname: {e:?}"))?;
    let space_id = space_id_from_path(&pathname)
        .ok_or_else(|| anyhow::anyhow!("no space id in `{pathname}`"))?
        .to_owned();
    let scene_id = scene_id_from_path(&pathname)
        .ok_or_else(|| anyhow::anyhow!("no scene id in `{pathname}`"))?
        .to_owned();
    log::info!("space {space_id}, scene {scene_id}");

    let scene =
        dom::scene_root(&document).ok_or_else(|| anyhow::anyhow!("no a-scene in the page"))?;
    let app = App::new(scene_id, space_id, document, scene);

    app::refresh_pois(&app).await;
    load_scenes(&app).await;

    // The editor only exists when the page grants it.
    if editor_enabled(&app) {
        match editor::Controller::new(app.clone()) {
            Ok(controller) => {
                CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
            }
            Err(e) => log::error!("editor setup failed: {e:?}"),
        }
    }
    links::wire_save_button(&app);
    frame::start_loop(app);
    Ok(())
}

/// The page opts into editing by marking its body, typically only for the
/// space owner.
fn editor_enabled(app: &Rc<App>) -> bool {
    app.document
        .body()
        .and_then(|body| body.get_attribute("data-poi-editor"))
        .map(|v| v == "enabled" || v == "true")
        .unwrap_or(false)
}

/// Fetch the sibling scenes once; the link form offers them as targets.
async fn load_scenes(app: &Rc<App>) {
    match api::fetch_scenes(&app.space_id).await {
        Ok(scenes) => *app.scenes.borrow_mut() = scenes,
        Err(e) => log::error!("scene list fetch failed: {e}"),
    }
}
