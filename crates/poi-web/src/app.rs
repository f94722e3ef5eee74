//! Process-wide state for the POI editor page: one instance owns the edit
//! mode flag, the selection, and the marker/panel registries. Everything
//! that used to be an ambient global in a script lives here and is reached
//! through an explicit `Rc<App>` handle.

use crate::panel::{Panel, PanelConfig};
use crate::{api, dom, marker::Marker, modal::Modal};
use glam::Vec3;
use poi_core::form::forward_from_rotation_deg;
use poi_core::marker::scene_link_href;
use poi_core::panel::PANEL_SPAWN_AHEAD_METERS;
use poi_core::{EditorState, MediaKind, Poi, PoiPayload, SceneSummary};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

pub struct App {
    pub scene_id: String,
    pub space_id: String,
    pub document: web::Document,
    pub scene: web::Element,
    pub state: RefCell<EditorState>,
    pub markers: RefCell<Vec<Marker>>,
    pub panels: RefCell<Vec<Panel>>,
    /// Link-target candidates, fetched once at startup.
    pub scenes: RefCell<Vec<SceneSummary>>,
    pub modal: RefCell<Option<Modal>>,
}

impl App {
    pub fn new(
        scene_id: String,
        space_id: String,
        document: web::Document,
        scene: web::Element,
    ) -> Rc<Self> {
        Rc::new(Self {
            scene_id,
            space_id,
            document,
            scene,
            state: RefCell::new(EditorState::new(false)),
            markers: RefCell::new(Vec::new()),
            panels: RefCell::new(Vec::new()),
            scenes: RefCell::new(Vec::new()),
            modal: RefCell::new(None),
        })
    }
}

/// Marker activation: selection while edit mode is on, the per-kind action
/// otherwise.
pub fn on_marker_click(app: &Rc<App>, poi_id: &str) {
    if app.state.borrow().edit_mode() {
        crate::editor::select_poi(app, poi_id);
        return;
    }
    let payload = {
        let markers = app.markers.borrow();
        let Some(marker) = markers.iter().find(|m| m.id() == poi_id) else {
            log::error!("[app] click on unknown POI `{poi_id}`");
            return;
        };
        marker.poi().clone()
    };
    match &payload.payload {
        PoiPayload::Info { image_url } => {
            open_info_panel(
                app,
                &PanelConfig::new(
                    &payload.title,
                    payload.description.as_deref(),
                    image_url.as_deref(),
                ),
            );
        }
        PoiPayload::Link { target_scene_id } => {
            navigate_to_scene(target_scene_id);
        }
        PoiPayload::Media { kind, .. } => {
            // Playback is a stub; say so instead of pretending.
            let message = match kind {
                MediaKind::Video => "Video player not yet implemented",
                MediaKind::Audio => "Audio player not yet implemented",
            };
            if let Some(window) = web::window() {
                let _ = window.alert_with_message(message);
            }
        }
    }
}

/// Spawn an info panel a couple of units in front of the camera.
fn open_info_panel(app: &Rc<App>, config: &PanelConfig) {
    let Some((cam_pos, cam_rot)) = dom::camera_pose(&app.document) else {
        log::error!("[app] no active camera, cannot open panel");
        return;
    };
    let forward = forward_from_rotation_deg(cam_rot);
    let position = cam_pos + forward * PANEL_SPAWN_AHEAD_METERS;
    match Panel::new(&app.document, &app.scene, config, position, cam_pos) {
        Ok(panel) => app.panels.borrow_mut().push(panel),
        Err(e) => log::error!("[app] panel build failed: {e:?}"),
    }
}

/// Link POI click: jump to the target scene inside the same space. Missing
/// target or an unexpected path shape aborts silently, logging only.
fn navigate_to_scene(target_scene_id: &str) {
    let Some(window) = web::window() else {
        return;
    };
    let location = window.location();
    let pathname = match location.pathname() {
        Ok(p) => p,
        Err(e) => {
            log::error!("[app] cannot read location: {e:?}");
            return;
        }
    };
    match scene_link_href(&pathname, target_scene_id) {
        Some(href) => {
            log::info!("[app] navigating to {href}");
            if let Err(e) = location.set_href(&href) {
                log::error!("[app] navigation failed: {e:?}");
            }
        }
        None => {
            log::error!(
                "[app] no navigation target (path `{pathname}`, target `{target_scene_id}`)"
            );
        }
    }
}

/// Point `distance` units ahead of the camera, for the modal's
/// "use current position" control.
pub fn camera_placement(app: &Rc<App>, distance: f32) -> Option<Vec3> {
    let (cam_pos, cam_rot) = dom::camera_pose(&app.document)?;
    Some(poi_core::form::placement_ahead(
        cam_pos,
        forward_from_rotation_deg(cam_rot),
        distance,
    ))
}

/// Fetch the scene's POI records and rebuild the marker set from scratch.
/// Runs at startup and again after a create lands, so the scene shows what
/// the backend actually stored. A record that does not form a coherent POI
/// is logged and skipped, never fatal for the rest.
pub async fn refresh_pois(app: &Rc<App>) {
    let records = match api::fetch_pois(&app.scene_id).await {
        Ok(records) => records,
        Err(e) => {
            log::error!("[app] POI fetch failed: {e}");
            return;
        }
    };
    // The selection, if any, names a marker that is about to go away.
    crate::editor::deselect_poi(app);
    {
        let mut markers = app.markers.borrow_mut();
        for marker in markers.iter_mut() {
            marker.remove(&app.document);
        }
        markers.clear();
    }
    let edit_mode = app.state.borrow().edit_mode();
    let total = records.len();
    for record in records {
        let poi = match Poi::try_from(record) {
            Ok(poi) => poi,
            Err(e) => {
                log::warn!("[app] skipping POI record: {e}");
                continue;
            }
        };
        let on_click = {
            let weak = Rc::downgrade(app);
            move |poi_id: String| {
                if let Some(app) = weak.upgrade() {
                    on_marker_click(&app, &poi_id);
                }
            }
        };
        match Marker::new(&app.document, &app.scene, poi, on_click) {
            Ok(marker) => {
                marker.set_selectable(edit_mode);
                app.markers.borrow_mut().push(marker);
            }
            Err(e) => log::error!("[app] marker build failed: {e:?}"),
        }
    }
    log::info!("[app] {} of {total} POI(s) placed", app.markers.borrow().len());
}
