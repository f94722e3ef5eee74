//! requestAnimationFrame loop driving per-frame marker and panel updates.
//! The closure reschedules itself and lives for the page, the usual wasm
//! animation-loop shape.

use crate::app::App;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(closure: &FrameClosure) {
    let Some(window) = web::window() else {
        return;
    };
    if let Some(cb) = closure.borrow().as_ref() {
        if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            log::error!("[frame] requestAnimationFrame failed: {e:?}");
        }
    }
}

/// One frame: billboard and animate every marker, then every panel, and
/// prune panels whose exit animation has finished.
fn tick(app: &Rc<App>, start: Instant) {
    let Some(camera_pos) = crate::dom::camera_position(&app.document) else {
        return;
    };
    let time_ms = start.elapsed().as_secs_f64() * 1000.0;
    for marker in app.markers.borrow().iter() {
        marker.tick(camera_pos, time_ms);
    }
    let mut panels = app.panels.borrow_mut();
    for panel in panels.iter() {
        panel.tick(camera_pos);
    }
    panels.retain(|p| !p.is_removed());
}

/// Start the loop. The self-referential closure is intentionally kept alive
/// for the rest of the page's life.
pub fn start_loop(app: Rc<App>) {
    let holder: FrameClosure = Rc::new(RefCell::new(None));
    let start = Instant::now();
    let rescheduler = holder.clone();
    *holder.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        tick(&app, start);
        request_frame(&rescheduler);
    }) as Box<dyn FnMut()>));
    request_frame(&holder);
}
