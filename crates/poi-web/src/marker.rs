//! Scene-entity representation of one POI: color-coded body, glow ring,
//! pulse timer, tooltip, hover and click behavior.

use crate::dom;
use anyhow::Result;
use glam::Vec3;
use poi_core::attr;
use poi_core::marker::{
    arrow_oscillation_rad, billboard_rotation_deg, colors_for, MarkerColors, EMISSIVE_HOVER,
    EMISSIVE_IDLE, HOVER_SCALE, MARKER_RADIUS, PULSE_INTERVAL_MS, PulseState,
};
use poi_core::{Poi, PoiKind};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn material_attr(colors: MarkerColors, emissive_intensity: f32) -> String {
    format!(
        "color: {}; emissive: {}; emissiveIntensity: {}; metalness: 0.3; roughness: 0.7",
        colors.base, colors.emissive, emissive_intensity
    )
}

pub struct Marker {
    poi: Poi,
    entity: web::Element,
    body: web::Element,
    arrow: Option<web::Element>,
    /// Repeating pulse timer; owned exclusively here and cleared exactly
    /// once when the marker goes away.
    pulse_handle: Option<i32>,
    _pulse: Closure<dyn FnMut()>,
    _enter: Closure<dyn FnMut()>,
    _leave: Closure<dyn FnMut()>,
    _click: Closure<dyn FnMut()>,
}

impl Marker {
    /// Build the marker entity and attach it to the scene. `on_click` fires
    /// on activation with the POI id; the caller decides between selection
    /// (edit mode) and the per-kind action.
    pub fn new(
        document: &web::Document,
        scene: &web::Element,
        poi: Poi,
        on_click: impl Fn(String) + 'static,
    ) -> Result<Self> {
        let colors = colors_for(poi.kind());

        let entity = dom::create(document, "a-entity")?;
        entity.set_id(&format!("poi-{}", poi.id));
        let _ = entity.set_attribute("class", "clickable");
        let _ = entity.set_attribute("data-poi-id", &poi.id);
        let _ = entity.set_attribute("position", &attr::format_vec3(poi.position));
        let _ = entity.set_attribute("visible", if poi.visible { "true" } else { "false" });

        let body = dom::create(document, "a-sphere")?;
        let _ = body.set_attribute("radius", &MARKER_RADIUS.to_string());
        let _ = body.set_attribute("material", &material_attr(colors, EMISSIVE_IDLE));
        entity.append_child(&body).map_err(dom::js_err)?;

        // Flat glow ring under the body, spun by the scene host.
        let ring = dom::create(document, "a-ring")?;
        let _ = ring.set_attribute("radius-inner", "0.2");
        let _ = ring.set_attribute("radius-outer", "0.25");
        let _ = ring.set_attribute("color", colors.base);
        let _ = ring.set_attribute("material", "transparent: true; opacity: 0.3; side: double");
        let _ = ring.set_attribute("rotation", "-90 0 0");
        let _ = ring.set_attribute("position", "0 -0.15 0");
        let _ = ring.set_attribute(
            "animation",
            "property: rotation; to: -90 0 360; dur: 3000; easing: linear; loop: true",
        );
        entity.append_child(&ring).map_err(dom::js_err)?;

        let arrow = if poi.kind() == PoiKind::Link {
            let arrow = dom::create(document, "a-cone")?;
            let _ = arrow.set_attribute("radius-bottom", "0.08");
            let _ = arrow.set_attribute("height", "0.2");
            let _ = arrow.set_attribute(
                "material",
                &format!(
                    "color: {}; emissive: {}; emissiveIntensity: 0.7",
                    colors.base, colors.emissive
                ),
            );
            let _ = arrow.set_attribute("position", "0 0 -0.25");
            let _ = arrow.set_attribute("rotation", "90 0 0");
            entity.append_child(&arrow).map_err(dom::js_err)?;
            Some(arrow)
        } else {
            None
        };

        let tooltip = Self::build_tooltip(document, &poi.title)?;
        entity.append_child(&tooltip).map_err(dom::js_err)?;

        scene.append_child(&entity).map_err(dom::js_err)?;

        // The pulse and the hover scale-up both write the body's scale, so
        // they compose through a shared multiplier instead of racing.
        let hover_mult = Rc::new(Cell::new(1.0_f32));

        let pulse_closure = {
            let body = body.clone();
            let hover_mult = hover_mult.clone();
            let mut pulse = PulseState::default();
            Closure::wrap(Box::new(move || {
                let s = pulse.step() * hover_mult.get();
                let _ = body.set_attribute("scale", &format!("{s} {s} {s}"));
            }) as Box<dyn FnMut()>)
        };
        let pulse_handle = web::window().and_then(|w| {
            w.set_interval_with_callback_and_timeout_and_arguments_0(
                pulse_closure.as_ref().unchecked_ref(),
                PULSE_INTERVAL_MS,
            )
            .ok()
        });
        if pulse_handle.is_none() {
            log::error!("[marker {}] pulse timer could not be started", poi.id);
        }

        let enter = {
            let body = body.clone();
            let tooltip = tooltip.clone();
            let hover_mult = hover_mult.clone();
            let document = document.clone();
            Closure::wrap(Box::new(move || {
                hover_mult.set(HOVER_SCALE);
                let _ = body.set_attribute(
                    "scale",
                    &format!("{HOVER_SCALE} {HOVER_SCALE} {HOVER_SCALE}"),
                );
                let _ = body.set_attribute("material", &material_attr(colors, EMISSIVE_HOVER));
                let _ = tooltip.set_attribute("visible", "true");
                dom::set_body_cursor(&document, "pointer");
            }) as Box<dyn FnMut()>)
        };
        let leave = {
            let body = body.clone();
            let tooltip = tooltip.clone();
            let hover_mult = hover_mult.clone();
            let document = document.clone();
            Closure::wrap(Box::new(move || {
                // All four hover effects revert together.
                hover_mult.set(1.0);
                let _ = body.set_attribute("scale", "1 1 1");
                let _ = body.set_attribute("material", &material_attr(colors, EMISSIVE_IDLE));
                let _ = tooltip.set_attribute("visible", "false");
                dom::set_body_cursor(&document, "default");
            }) as Box<dyn FnMut()>)
        };
        let click = {
            let id = poi.id.clone();
            Closure::wrap(Box::new(move || on_click(id.clone())) as Box<dyn FnMut()>)
        };
        entity
            .add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        entity
            .add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        entity
            .add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;

        Ok(Self {
            poi,
            entity,
            body,
            arrow,
            pulse_handle,
            _pulse: pulse_closure,
            _enter: enter,
            _leave: leave,
            _click: click,
        })
    }

    fn build_tooltip(document: &web::Document, title: &str) -> Result<web::Element> {
        let tooltip = dom::create(document, "a-entity")?;
        let _ = tooltip.set_attribute(
            "text",
            &format!("value: {title}; align: center; width: 2; color: #ffffff"),
        );
        let _ = tooltip.set_attribute("position", "0 0.4 0");
        let _ = tooltip.set_attribute("visible", "false");
        let bg = dom::create(document, "a-plane")?;
        let _ = bg.set_attribute("width", "1.5");
        let _ = bg.set_attribute("height", "0.3");
        let _ = bg.set_attribute("color", "#000000");
        let _ = bg.set_attribute("opacity", "0.7");
        let _ = bg.set_attribute("position", "0 0 -0.01");
        tooltip.append_child(&bg).map_err(dom::js_err)?;
        Ok(tooltip)
    }

    pub fn poi(&self) -> &Poi {
        &self.poi
    }

    pub fn id(&self) -> &str {
        &self.poi.id
    }

    /// Per-frame update from the host render loop: billboard the body toward
    /// the camera, wobble the link arrow.
    pub fn tick(&self, camera_pos: Vec3, time_ms: f64) {
        if let Some(rot) = billboard_rotation_deg(self.poi.position, camera_pos) {
            let _ = self.body.set_attribute("rotation", &attr::format_vec3(rot));
        }
        if let Some(arrow) = &self.arrow {
            let wobble_deg = arrow_oscillation_rad(time_ms).to_degrees();
            let _ = arrow.set_attribute("rotation", &format!("90 0 {wobble_deg}"));
        }
    }

    pub fn set_selectable(&self, selectable: bool) {
        let _ = if selectable {
            self.entity.class_list().add_1("selectable")
        } else {
            self.entity.class_list().remove_1("selectable")
        };
    }

    /// Mark selected and attach the rotating amber ring the controller uses
    /// as its selection decoration.
    pub fn set_selected(&self, document: &web::Document, selected: bool) {
        if selected {
            let _ = self.entity.class_list().add_1("selected");
            if let Ok(ring) = dom::create(document, "a-ring") {
                let _ = ring.set_attribute("class", "selection-ring");
                let _ = ring.set_attribute("radius-inner", "0.3");
                let _ = ring.set_attribute("radius-outer", "0.4");
                let _ = ring.set_attribute("color", "#fbbf24");
                let _ = ring.set_attribute("position", "0 0 0");
                let _ = ring.set_attribute("rotation", "-90 0 0");
                let _ = ring.set_attribute(
                    "animation",
                    "property: rotation; to: -90 360 0; dur: 2000; easing: linear; loop: true",
                );
                let _ = self.entity.append_child(&ring);
            }
        } else {
            let _ = self.entity.class_list().remove_1("selected");
            if let Ok(Some(ring)) = self.entity.query_selector(".selection-ring") {
                ring.remove();
            }
        }
    }

    fn clear_pulse(&mut self) {
        if let Some(handle) = self.pulse_handle.take() {
            if let Some(window) = web::window() {
                window.clear_interval_with_handle(handle);
            }
        }
    }

    /// Tear the marker down: stop the pulse timer (exactly once) and detach
    /// the entity with all its children and listeners.
    pub fn remove(&mut self, document: &web::Document) {
        self.clear_pulse();
        // If the pointer was over the marker when it vanished, the leave
        // event never fires; reset the cursor ourselves.
        dom::set_body_cursor(document, "default");
        self.entity.remove();
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        self.clear_pulse();
    }
}
