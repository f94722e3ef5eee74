//! Pure marker behavior: per-kind styling, the pulse stepper backing the
//! 50 ms timer, hover effects and billboard math. The wasm side applies
//! these numbers to scene-entity attributes.

use crate::poi::PoiKind;
use glam::Vec3;

/// Base/emissive color pair for a marker body, as CSS hex strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerColors {
    pub base: &'static str,
    pub emissive: &'static str,
}

/// Fixed color coding: blue info, green link, purple media.
pub fn colors_for(kind: PoiKind) -> MarkerColors {
    match kind {
        PoiKind::Info => MarkerColors {
            base: "#3b82f6",
            emissive: "#1e40af",
        },
        PoiKind::Link => MarkerColors {
            base: "#10b981",
            emissive: "#059669",
        },
        PoiKind::Media => MarkerColors {
            base: "#a855f7",
            emissive: "#7c3aed",
        },
    }
}

pub const MARKER_RADIUS: f32 = 0.15;
pub const EMISSIVE_IDLE: f32 = 0.5;
pub const EMISSIVE_HOVER: f32 = 1.0;
pub const HOVER_SCALE: f32 = 1.3;

/// Pulse timer period; one step per tick.
pub const PULSE_INTERVAL_MS: i32 = 50;
pub const PULSE_SCALE_MIN: f32 = 1.0;
pub const PULSE_SCALE_MAX: f32 = 1.2;
pub const PULSE_SCALE_STEP: f32 = 0.01;

/// Triangle-wave scale between [`PULSE_SCALE_MIN`] and [`PULSE_SCALE_MAX`],
/// advanced by one step each timer tick. Each marker owns its own state, so
/// pulses drift independently.
#[derive(Clone, Copy, Debug)]
pub struct PulseState {
    scale: f32,
    growing: bool,
}

impl Default for PulseState {
    fn default() -> Self {
        Self {
            scale: PULSE_SCALE_MIN,
            growing: true,
        }
    }
}

impl PulseState {
    /// Advance one tick. The step is clamped at both ends: accumulated f32
    /// steps of 0.01 land just short of the bound, and an unclamped
    /// turnaround check would overshoot the band by a full step.
    pub fn step(&mut self) -> f32 {
        if self.growing {
            self.scale = (self.scale + PULSE_SCALE_STEP).min(PULSE_SCALE_MAX);
            if self.scale >= PULSE_SCALE_MAX {
                self.growing = false;
            }
        } else {
            self.scale = (self.scale - PULSE_SCALE_STEP).max(PULSE_SCALE_MIN);
            if self.scale <= PULSE_SCALE_MIN {
                self.growing = true;
            }
        }
        self.scale
    }
}

/// Link-marker arrow wobble, radians as a function of scene time.
pub fn arrow_oscillation_rad(time_ms: f64) -> f32 {
    ((time_ms / 500.0).sin() * 0.2) as f32
}

/// Euler rotation in degrees (pitch, yaw, 0) that turns an entity at
/// `object_pos` toward `camera_pos`. Returns `None` when the two coincide;
/// the caller then leaves the current rotation alone.
pub fn billboard_rotation_deg(object_pos: Vec3, camera_pos: Vec3) -> Option<Vec3> {
    let to_cam = camera_pos - object_pos;
    if to_cam.length_squared() < 1e-10 {
        return None;
    }
    let yaw = to_cam.x.atan2(to_cam.z).to_degrees();
    let horiz = (to_cam.x * to_cam.x + to_cam.z * to_cam.z).sqrt();
    let pitch = to_cam.y.atan2(horiz).to_degrees();
    Some(Vec3::new(pitch, yaw, 0.0))
}

/// Space id extracted from a scene-view path such as
/// `/space/scene/{space_id}/{scene_id}`: the segment right after `scene`.
pub fn space_id_from_path(pathname: &str) -> Option<&str> {
    let mut parts = pathname.split('/').filter(|s| !s.is_empty());
    while let Some(seg) = parts.next() {
        if seg == "scene" {
            return parts.next().filter(|s| !s.is_empty());
        }
    }
    None
}

/// Scene id of the current view: the last path segment.
pub fn scene_id_from_path(pathname: &str) -> Option<&str> {
    pathname.rsplit('/').find(|s| !s.is_empty())
}

/// Browser target for a link POI click, or `None` when the current path does
/// not look like a scene view.
pub fn scene_link_href(pathname: &str, target_scene_id: &str) -> Option<String> {
    if target_scene_id.is_empty() {
        return None;
    }
    let space = space_id_from_path(pathname)?;
    Some(format!("/space/scene/{space}/{target_scene_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_kind_coded() {
        assert_eq!(colors_for(PoiKind::Info).base, "#3b82f6");
        assert_eq!(colors_for(PoiKind::Link).base, "#10b981");
        assert_eq!(colors_for(PoiKind::Media).base, "#a855f7");
    }

    #[test]
    fn pulse_stays_in_band_and_oscillates() {
        let mut p = PulseState::default();
        let mut seen_max = false;
        let mut seen_min_again = false;
        for _ in 0..80 {
            let s = p.step();
            // Hard bounds: the clamp must hold them exactly, not within an
            // epsilon. Accumulated 0.01 steps land short of 1.2, and the
            // turnaround once overshot to 1.21 on the next tick.
            assert!(
                (PULSE_SCALE_MIN..=PULSE_SCALE_MAX).contains(&s),
                "scale {s} escaped the band"
            );
            if s == PULSE_SCALE_MAX {
                seen_max = true;
            }
            if seen_max && s == PULSE_SCALE_MIN {
                seen_min_again = true;
            }
        }
        // 20 steps up + 20 down fits comfortably in 80 ticks.
        assert!(seen_max && seen_min_again);
    }

    #[test]
    fn pulse_turnaround_hits_the_bounds_exactly() {
        let mut p = PulseState::default();
        let mut peak = f32::MIN;
        let mut floor = f32::MAX;
        for _ in 0..40 {
            let s = p.step();
            peak = peak.max(s);
            floor = floor.min(s);
        }
        assert_eq!(peak, PULSE_SCALE_MAX);
        assert_eq!(floor, PULSE_SCALE_MIN);
    }

    #[test]
    fn billboard_faces_camera() {
        // Camera due +Z of the object: no rotation needed beyond yaw 0.
        let r = billboard_rotation_deg(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)).unwrap();
        assert!(r.x.abs() < 1e-4 && r.y.abs() < 1e-4);
        // Camera due +X: yaw 90.
        let r = billboard_rotation_deg(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert!((r.y - 90.0).abs() < 1e-3);
        // Camera straight above: pitch 90.
        let r = billboard_rotation_deg(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!((r.x - 90.0).abs() < 1e-3);
        // Coincident positions yield no rotation at all.
        assert_eq!(billboard_rotation_deg(Vec3::ONE, Vec3::ONE), None);
    }

    #[test]
    fn arrow_wobble_is_bounded() {
        for t in 0..200 {
            let a = arrow_oscillation_rad(t as f64 * 37.0);
            assert!(a.abs() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn path_parsing() {
        assert_eq!(space_id_from_path("/space/scene/sp42/sc7"), Some("sp42"));
        assert_eq!(scene_id_from_path("/space/scene/sp42/sc7"), Some("sc7"));
        assert_eq!(space_id_from_path("/space/pois/sc7"), None);
        assert_eq!(
            scene_link_href("/space/scene/sp42/sc7", "sc9"),
            Some("/space/scene/sp42/sc9".to_owned())
        );
        assert_eq!(scene_link_href("/space/scene/sp42/sc7", ""), None);
        assert_eq!(scene_link_href("/dashboard", "sc9"), None);
    }
}
