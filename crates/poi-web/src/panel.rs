//! Camera-facing information panel spawned by an info marker. Purely
//! presentational: it billboards, scales and fades with camera distance
//! relative to the distance captured at creation, and removes itself once
//! its exit animation has played.

use crate::dom;
use anyhow::Result;
use glam::Vec3;
use poi_core::attr;
use poi_core::panel::{
    opacity, scale_factor, ENTRY_FADE_MS, ENTRY_SCALE_MS, EXIT_ANIM_MS, EXIT_REMOVE_MS,
    PANEL_DEFAULT_HEIGHT, PANEL_DEFAULT_WIDTH,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone, Debug)]
pub struct PanelConfig {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub width: f32,
    pub height: f32,
}

impl PanelConfig {
    pub fn new(title: &str, description: Option<&str>, image_url: Option<&str>) -> Self {
        Self {
            title: title.to_owned(),
            description: description.map(str::to_owned),
            image_url: image_url.map(str::to_owned),
            width: PANEL_DEFAULT_WIDTH,
            height: PANEL_DEFAULT_HEIGHT,
        }
    }
}

struct PanelInner {
    entity: web::Element,
    bg: web::Element,
    position: Vec3,
    baseline_distance: f32,
    closing: Cell<bool>,
    removed: Cell<bool>,
    // Kept alive until the exit timeout fires.
    exit_timer: RefCell<Option<Closure<dyn FnMut()>>>,
}

pub struct Panel {
    inner: Rc<PanelInner>,
    _close_click: Closure<dyn FnMut()>,
    _close_enter: Closure<dyn FnMut()>,
    _close_leave: Closure<dyn FnMut()>,
}

impl Panel {
    /// Build the layered panel at `position` and play the entry animation.
    /// The camera distance at this moment becomes the scale/fade baseline.
    pub fn new(
        document: &web::Document,
        scene: &web::Element,
        config: &PanelConfig,
        position: Vec3,
        camera_pos: Vec3,
    ) -> Result<Self> {
        let entity = dom::create(document, "a-entity")?;
        let _ = entity.set_attribute("position", &attr::format_vec3(position));

        let bg = dom::create(document, "a-plane")?;
        let _ = bg.set_attribute("width", &config.width.to_string());
        let _ = bg.set_attribute("height", &config.height.to_string());
        let _ = bg.set_attribute("color", "#ffffff");
        let _ = bg.set_attribute("opacity", "0.95");
        let _ = bg.set_attribute("shader", "flat");

        let border = dom::create(document, "a-plane")?;
        let _ = border.set_attribute("width", &(config.width + 0.05).to_string());
        let _ = border.set_attribute("height", &(config.height + 0.05).to_string());
        let _ = border.set_attribute("color", "#333333");
        let _ = border.set_attribute("opacity", "0.3");
        let _ = border.set_attribute("position", "0 0 -0.01");
        bg.append_child(&border).map_err(dom::js_err)?;
        entity.append_child(&bg).map_err(dom::js_err)?;

        let content_y = config.height / 2.0 - 0.2;
        if !config.title.is_empty() {
            let title = dom::create(document, "a-entity")?;
            let _ = title.set_attribute(
                "text",
                &format!(
                    "value: {}; align: center; width: {}; color: #1f2937; wrapCount: 40",
                    config.title,
                    config.width * 0.9
                ),
            );
            let _ = title.set_attribute("position", &format!("0 {content_y} 0.01"));
            entity.append_child(&title).map_err(dom::js_err)?;
        }
        if let Some(desc) = config.description.as_deref().filter(|d| !d.is_empty()) {
            let desc_y = if config.title.is_empty() {
                content_y
            } else {
                content_y - 0.3
            };
            let desc_el = dom::create(document, "a-entity")?;
            let _ = desc_el.set_attribute(
                "text",
                &format!(
                    "value: {}; align: center; width: {}; color: #4b5563; wrapCount: 50",
                    desc,
                    config.width * 0.85
                ),
            );
            let _ = desc_el.set_attribute("position", &format!("0 {desc_y} 0.01"));
            entity.append_child(&desc_el).map_err(dom::js_err)?;
        }
        if let Some(url) = config.image_url.as_deref().filter(|u| !u.is_empty()) {
            let image_y = if config.description.is_some() { -0.2 } else { 0.0 };
            let image_w = config.width * 0.7;
            let image = dom::create(document, "a-image")?;
            let _ = image.set_attribute("src", url);
            let _ = image.set_attribute("width", &image_w.to_string());
            let _ = image.set_attribute("height", &(image_w * 0.6).to_string());
            let _ = image.set_attribute("position", &format!("0 {image_y} 0.01"));
            entity.append_child(&image).map_err(dom::js_err)?;
        }

        // Close control in the top-right corner.
        let button_size = 0.2;
        let button_x = config.width / 2.0 - button_size;
        let button_y = config.height / 2.0 - button_size;
        let close = dom::create(document, "a-circle")?;
        let _ = close.set_attribute("radius", &button_size.to_string());
        let _ = close.set_attribute("color", "#ef4444");
        let _ = close.set_attribute("position", &format!("{button_x} {button_y} 0.02"));
        let _ = close.set_attribute("class", "clickable");
        let x_text = dom::create(document, "a-entity")?;
        let _ = x_text.set_attribute("text", "value: X; align: center; width: 1; color: #ffffff");
        let _ = x_text.set_attribute("position", "0 0 0.01");
        close.append_child(&x_text).map_err(dom::js_err)?;
        entity.append_child(&close).map_err(dom::js_err)?;

        scene.append_child(&entity).map_err(dom::js_err)?;

        // Entry animation, fire-and-forget.
        let _ = entity.set_attribute("scale", "0.1 0.1 0.1");
        let _ = entity.set_attribute(
            "animation",
            &format!("property: scale; to: 1 1 1; dur: {ENTRY_SCALE_MS}; easing: easeOutBack"),
        );
        let _ = entity.set_attribute(
            "animation__fade",
            &format!("property: opacity; from: 0; to: 1; dur: {ENTRY_FADE_MS}"),
        );

        let inner = Rc::new(PanelInner {
            entity,
            bg,
            position,
            baseline_distance: position.distance(camera_pos),
            closing: Cell::new(false),
            removed: Cell::new(false),
            exit_timer: RefCell::new(None),
        });

        let close_click = {
            let inner = inner.clone();
            Closure::wrap(Box::new(move || close_panel(&inner)) as Box<dyn FnMut()>)
        };
        let close_enter = {
            let close = close.clone();
            Closure::wrap(Box::new(move || {
                let _ = close.set_attribute("scale", "1.1 1.1 1.1");
                let _ = close.set_attribute("color", "#dc2626");
            }) as Box<dyn FnMut()>)
        };
        let close_leave = {
            let close = close.clone();
            Closure::wrap(Box::new(move || {
                let _ = close.set_attribute("scale", "1 1 1");
                let _ = close.set_attribute("color", "#ef4444");
            }) as Box<dyn FnMut()>)
        };
        close
            .add_event_listener_with_callback("click", close_click.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        close
            .add_event_listener_with_callback("mouseenter", close_enter.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        close
            .add_event_listener_with_callback("mouseleave", close_leave.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;

        Ok(Self {
            inner,
            _close_click: close_click,
            _close_enter: close_enter,
            _close_leave: close_leave,
        })
    }

    /// Per-frame update: billboard, then distance-driven scale and fade.
    /// Frozen while the exit animation plays.
    pub fn tick(&self, camera_pos: Vec3) {
        let inner = &self.inner;
        if inner.closing.get() {
            return;
        }
        if let Some(rot) =
            poi_core::marker::billboard_rotation_deg(inner.position, camera_pos)
        {
            let _ = inner.entity.set_attribute("rotation", &attr::format_vec3(rot));
        }
        let distance = inner.position.distance(camera_pos);
        let s = scale_factor(distance, inner.baseline_distance);
        let _ = inner.entity.set_attribute("scale", &format!("{s} {s} {s}"));
        let o = opacity(distance, inner.baseline_distance);
        let _ = inner.bg.set_attribute("opacity", &o.to_string());
    }

    pub fn close(&self) {
        close_panel(&self.inner);
    }

    /// True once the exit timeout has detached the entity; the frame loop
    /// prunes the panel from its registry then.
    pub fn is_removed(&self) -> bool {
        self.inner.removed.get()
    }
}

/// Idempotent close: the first call starts the exit animation and schedules
/// the single removal; later calls see the flag and do nothing.
fn close_panel(inner: &Rc<PanelInner>) {
    if inner.closing.replace(true) {
        return;
    }
    let _ = inner.entity.set_attribute(
        "animation__close",
        &format!("property: scale; to: 0.1 0.1 0.1; dur: {EXIT_ANIM_MS}; easing: easeInBack"),
    );
    let _ = inner.entity.set_attribute(
        "animation__fadeout",
        &format!("property: opacity; to: 0; dur: {EXIT_ANIM_MS}"),
    );
    // Weak capture: the closure is stored inside `inner`, so a strong ref
    // here would keep the pair alive forever.
    let timer = {
        let inner = Rc::downgrade(inner);
        Closure::wrap(Box::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.entity.remove();
                inner.removed.set(true);
            }
        }) as Box<dyn FnMut()>)
    };
    let scheduled = web::window().and_then(|w| {
        w.set_timeout_with_callback_and_timeout_and_arguments_0(
            timer.as_ref().unchecked_ref(),
            EXIT_REMOVE_MS,
        )
        .ok()
    });
    if scheduled.is_some() {
        *inner.exit_timer.borrow_mut() = Some(timer);
    } else {
        // No timer available; remove immediately rather than leaking.
        log::error!("[panel] exit timeout could not be scheduled, removing now");
        inner.entity.remove();
        inner.removed.set(true);
    }
}
