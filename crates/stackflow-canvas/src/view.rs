//! Global pan and zoom.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;

/// The transform applied on top of world space: `translate(pan) scale(scale)`,
/// scaled about the container centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    /// Screen-space translation
    pub pan: DVec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: DVec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// Map a world point to screen space.
    pub fn world_to_screen(&self, world: DVec2, origin: DVec2) -> DVec2 {
        origin + (world - origin) * self.scale + self.pan
    }

    /// Map a screen point to world space.
    pub fn screen_to_world(&self, screen: DVec2, origin: DVec2) -> DVec2 {
        origin + (screen - self.pan - origin) / self.scale
    }
}

/// A scroll-wheel gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub delta_y: f64,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

/// What the host should do with a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WheelOutcome {
    /// The gesture zoomed; the host must suppress default scrolling.
    Zoomed { scale: f64 },
    /// No modifier held; let the page scroll.
    PassThrough,
}

impl WheelOutcome {
    pub fn prevent_default(&self) -> bool {
        matches!(self, WheelOutcome::Zoomed { .. })
    }
}

/// Owns the [`ViewTransform`] and enforces its zoom bounds.
#[derive(Debug, Clone)]
pub struct ViewController {
    transform: ViewTransform,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
    wheel_step: f64,
}

impl ViewController {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            transform: ViewTransform::default(),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
            wheel_step: config.wheel_zoom_step,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn pan(&self) -> DVec2 {
        self.transform.pan
    }

    /// Zoom level as a whole percentage, for the zoom indicator.
    pub fn zoom_percent(&self) -> u32 {
        (self.transform.scale * 100.0).round() as u32
    }

    /// Change the scale by `delta`, rounded to two decimals and clamped.
    /// A non-finite delta leaves the scale unchanged.
    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        if !delta.is_finite() {
            tracing::debug!(delta, "ignoring non-finite zoom delta");
            return self.transform.scale;
        }
        let target = round2(self.transform.scale + delta);
        self.transform.scale = target.clamp(self.min_scale, self.max_scale);
        self.transform.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom_by(self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom_by(-self.zoom_step)
    }

    /// Screen-space pan. Not scaled.
    pub fn pan_by(&mut self, delta: DVec2) {
        if !delta.is_finite() {
            tracing::debug!(?delta, "ignoring non-finite pan delta");
            return;
        }
        self.transform.pan += delta;
    }

    pub fn reset(&mut self) {
        self.transform = ViewTransform::default();
    }

    /// Convert a pointer delta to a node-offset delta.
    pub fn screen_delta_to_world_delta(&self, delta: DVec2) -> DVec2 {
        delta / self.transform.scale
    }

    /// Zoom on ctrl/cmd + wheel only, so plain scrolling keeps working.
    pub fn wheel(&mut self, input: WheelInput) -> WheelOutcome {
        if !(input.ctrl || input.meta) {
            return WheelOutcome::PassThrough;
        }
        let delta = if input.delta_y > 0.0 {
            -self.wheel_step
        } else {
            self.wheel_step
        };
        WheelOutcome::Zoomed {
            scale: self.zoom_by(delta),
        }
    }
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewController {
        ViewController::new(&CanvasConfig::default())
    }

    #[test]
    fn zoom_steps_are_exact() {
        let mut view = view();
        assert_eq!(view.zoom_in(), 1.2);
        assert_eq!(view.zoom_in(), 1.4);
        assert_eq!(view.zoom_out(), 1.2);
        assert_eq!(view.zoom_percent(), 120);
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut view = view();
        for _ in 0..20 {
            view.zoom_in();
        }
        assert_eq!(view.scale(), 2.0);
        for _ in 0..20 {
            view.zoom_out();
        }
        assert_eq!(view.scale(), 0.5);
    }

    #[test]
    fn wheel_needs_modifier() {
        let mut view = view();
        let outcome = view.wheel(WheelInput { delta_y: -120.0, ctrl: false, meta: false });
        assert_eq!(outcome, WheelOutcome::PassThrough);
        assert!(!outcome.prevent_default());
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let mut view = view();
        let outcome = view.wheel(WheelInput { delta_y: 120.0, ctrl: true, meta: false });
        assert_eq!(outcome, WheelOutcome::Zoomed { scale: 0.9 });
        assert!(outcome.prevent_default());

        let outcome = view.wheel(WheelInput { delta_y: -1.0, ctrl: false, meta: true });
        assert_eq!(outcome, WheelOutcome::Zoomed { scale: 1.0 });
    }

    #[test]
    fn pan_is_screen_space() {
        let mut view = view();
        view.zoom_by(1.0);
        view.pan_by(DVec2::new(30.0, -10.0));
        assert_eq!(view.pan(), DVec2::new(30.0, -10.0));
    }

    #[test]
    fn non_finite_deltas_are_ignored() {
        let mut view = view();
        view.zoom_in();
        view.pan_by(DVec2::new(4.0, -2.0));

        assert_eq!(view.zoom_by(f64::NAN), 1.2);
        assert_eq!(view.zoom_by(f64::INFINITY), 1.2);
        assert_eq!(view.zoom_by(f64::NEG_INFINITY), 1.2);
        view.pan_by(DVec2::NAN);
        view.pan_by(DVec2::new(f64::INFINITY, 0.0));

        assert!((0.5..=2.0).contains(&view.scale()));
        assert_eq!(view.pan(), DVec2::new(4.0, -2.0));
    }

    #[test]
    fn wheel_outcome_is_tagged_on_the_wire() {
        let json = serde_json::to_value(WheelOutcome::Zoomed { scale: 1.1 }).unwrap();
        assert_eq!(json["kind"], "zoomed");
        assert_eq!(json["scale"], 1.1);
        let json = serde_json::to_value(WheelOutcome::PassThrough).unwrap();
        assert_eq!(json["kind"], "pass_through");
    }

    #[test]
    fn reset_restores_identity() {
        let mut view = view();
        view.zoom_in();
        view.pan_by(DVec2::splat(5.0));
        view.reset();
        assert_eq!(view.transform(), ViewTransform::default());
    }

    #[test]
    fn world_delta_divides_by_scale() {
        let mut view = view();
        view.zoom_by(1.0);
        assert_eq!(view.screen_delta_to_world_delta(DVec2::new(10.0, 4.0)), DVec2::new(5.0, 2.0));
    }

    #[test]
    fn screen_world_mapping_round_trips() {
        let transform = ViewTransform { scale: 1.6, pan: DVec2::new(-40.0, 25.0) };
        let origin = DVec2::new(500.0, 300.0);
        let world = DVec2::new(123.0, 456.0);
        let back = transform.screen_to_world(transform.world_to_screen(world, origin), origin);
        assert!((back - world).length() < 1e-9);
    }

    #[test]
    fn origin_is_fixed_under_zoom() {
        let transform = ViewTransform { scale: 2.0, pan: DVec2::ZERO };
        let origin = DVec2::new(500.0, 300.0);
        assert_eq!(transform.world_to_screen(origin, origin), origin);
    }
}
