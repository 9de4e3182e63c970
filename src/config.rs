//! Tunables for the hover effect.
//!
//! [`EffectConfig`] gathers every constant the effect depends on: the camera
//! rig, the desktop breakpoint used by the mode selector, and the timings of
//! the hover tweens. The defaults reproduce the stock look; override fields
//! with the builder methods.
//!
//! ```
//! use hoverplane::{EffectConfig, Easing};
//!
//! let config = EffectConfig::new()
//!     .idle_delay(0.2)
//!     .hover_out(0.5)
//!     .easing(Easing::Power2Out);
//! assert_eq!(config.camera_distance, 600.0);
//! ```

use crate::tween::Easing;

/// Configuration shared by the scene builder, the pointer tracker and the
/// browser host.
#[derive(Clone, Debug)]
pub struct EffectConfig {
    /// Distance of the camera from the image plane (z = 0), in scene units.
    pub camera_distance: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Viewports narrower than this (CSS pixels) run in degraded mode.
    pub desktop_min_width: f32,
    /// Duration of the hover-in tweens (`uMouse` and `uHover`), in seconds.
    pub hover_in: f64,
    /// Duration of the hover-out fade, in seconds.
    pub hover_out: f64,
    /// Quiet period after the last pointer move before hover fades out, in seconds.
    pub idle_delay: f64,
    /// Easing curve used by every hover tween.
    pub easing: Easing,
    /// Upper bound for the device pixel ratio of the render surface.
    pub max_pixel_ratio: f32,
    /// Fade the previously hovered plane as soon as the pointer leaves it for
    /// another plane (or for empty space), instead of waiting for the idle reset.
    pub fade_on_switch: bool,
    /// CSS selector of the render canvas (browser host).
    pub canvas_selector: String,
    /// CSS selector of the source images (browser host).
    pub image_selector: String,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            camera_distance: 600.0,
            near: 0.1,
            far: 1000.0,
            desktop_min_width: 1024.0,
            hover_in: 0.03,
            hover_out: 0.3,
            idle_delay: 0.1,
            easing: Easing::Power2Out,
            max_pixel_ratio: 2.0,
            fade_on_switch: true,
            canvas_selector: "#canvas".to_string(),
            image_selector: "img".to_string(),
        }
    }
}

impl EffectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera_distance(mut self, distance: f32) -> Self {
        self.camera_distance = distance;
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn desktop_min_width(mut self, width: f32) -> Self {
        self.desktop_min_width = width;
        self
    }

    pub fn hover_in(mut self, seconds: f64) -> Self {
        self.hover_in = seconds;
        self
    }

    pub fn hover_out(mut self, seconds: f64) -> Self {
        self.hover_out = seconds;
        self
    }

    pub fn idle_delay(mut self, seconds: f64) -> Self {
        self.idle_delay = seconds;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn max_pixel_ratio(mut self, ratio: f32) -> Self {
        self.max_pixel_ratio = ratio;
        self
    }

    pub fn fade_on_switch(mut self, enabled: bool) -> Self {
        self.fade_on_switch = enabled;
        self
    }

    pub fn canvas_selector(mut self, selector: impl Into<String>) -> Self {
        self.canvas_selector = selector.into();
        self
    }

    pub fn image_selector(mut self, selector: impl Into<String>) -> Self {
        self.image_selector = selector.into();
        self
    }

    /// Clamp a device pixel ratio to `(0, max_pixel_ratio]`.
    pub fn pixel_ratio(&self, device_ratio: f64) -> f32 {
        let ratio = device_ratio as f32;
        if ratio.is_finite() && ratio > 0.0 {
            ratio.min(self.max_pixel_ratio)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_effect() {
        let config = EffectConfig::default();
        assert_eq!(config.camera_distance, 600.0);
        assert_eq!(config.desktop_min_width, 1024.0);
        assert_eq!(config.hover_in, 0.03);
        assert_eq!(config.hover_out, 0.3);
        assert_eq!(config.idle_delay, 0.1);
        assert!(config.fade_on_switch);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let config = EffectConfig::default();
        assert_eq!(config.pixel_ratio(3.0), 2.0);
        assert_eq!(config.pixel_ratio(1.5), 1.5);
        assert_eq!(config.pixel_ratio(0.0), 1.0);
        assert_eq!(config.pixel_ratio(f64::NAN), 1.0);
    }
}
