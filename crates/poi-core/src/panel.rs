//! Pure panel behavior: distance-driven scale/fade curves and the entry/exit
//! animation timings shared between the wasm panel and its tests.

pub const PANEL_DEFAULT_WIDTH: f32 = 2.0;
pub const PANEL_DEFAULT_HEIGHT: f32 = 1.5;

/// How far in front of the camera a freshly opened panel sits.
pub const PANEL_SPAWN_AHEAD_METERS: f32 = 2.0;

pub const SCALE_MIN: f32 = 0.5;
pub const SCALE_MAX: f32 = 2.0;
pub const OPACITY_MIN: f32 = 0.3;
pub const OPACITY_MAX: f32 = 0.95;

/// Entry: grow 0.1 -> 1.0 with overshoot while fading in.
pub const ENTRY_SCALE_MS: i32 = 300;
pub const ENTRY_FADE_MS: i32 = 200;
/// Exit: shrink + fade, then removal once the animation has finished.
pub const EXIT_ANIM_MS: i32 = 200;
pub const EXIT_REMOVE_MS: i32 = 250;

/// Scale relative to the distance captured at creation, clamped to
/// [[`SCALE_MIN`], [`SCALE_MAX`]]. A zero or non-finite baseline would turn
/// the ratio into inf/NaN, so it resolves to the neutral 1.0 instead.
pub fn scale_factor(current_distance: f32, baseline_distance: f32) -> f32 {
    let ratio = current_distance / baseline_distance;
    if !ratio.is_finite() {
        return 1.0;
    }
    ratio.clamp(SCALE_MIN, SCALE_MAX)
}

/// Opacity that falls off as the camera retreats past the baseline, clamped
/// to [[`OPACITY_MIN`], [`OPACITY_MAX`]]. The degenerate-baseline guard
/// resolves to full visibility.
pub fn opacity(current_distance: f32, baseline_distance: f32) -> f32 {
    let falloff = (current_distance - baseline_distance) / (baseline_distance * 3.0);
    if !falloff.is_finite() {
        return OPACITY_MAX;
    }
    (1.0 - falloff).clamp(OPACITY_MIN, OPACITY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_tracks_distance_within_clamp() {
        assert!((scale_factor(2.0, 2.0) - 1.0).abs() < 1e-6);
        assert!((scale_factor(3.0, 2.0) - 1.5).abs() < 1e-6);
        assert_eq!(scale_factor(20.0, 2.0), SCALE_MAX);
        assert_eq!(scale_factor(0.1, 2.0), SCALE_MIN);
    }

    #[test]
    fn zero_baseline_never_produces_nan() {
        let s = scale_factor(3.0, 0.0);
        assert!(s.is_finite());
        assert_eq!(s, 1.0);
        let o = opacity(3.0, 0.0);
        assert!(o.is_finite());
        assert_eq!(o, OPACITY_MAX);
        assert!(scale_factor(0.0, 0.0).is_finite());
        assert!(opacity(0.0, 0.0).is_finite());
    }

    #[test]
    fn opacity_fades_with_retreat() {
        // At the baseline the panel is as opaque as it gets.
        assert_eq!(opacity(2.0, 2.0), OPACITY_MAX);
        // Closer than baseline stays at the cap.
        assert_eq!(opacity(1.0, 2.0), OPACITY_MAX);
        // Retreating fades, monotonically, down to the floor.
        let near = opacity(4.0, 2.0);
        let far = opacity(8.0, 2.0);
        assert!(near > far);
        assert_eq!(opacity(100.0, 2.0), OPACITY_MIN);
    }

    #[test]
    fn removal_waits_for_the_exit_animation() {
        assert!(EXIT_REMOVE_MS > EXIT_ANIM_MS);
    }
}
