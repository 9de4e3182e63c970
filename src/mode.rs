//! Startup choice between the full effect and the plain page.
//!
//! The decision is made once from the user agent and the viewport width. Small
//! or mobile screens get [`Mode::Degraded`]: the render surface is hidden and
//! the images are shown as-is. Nothing re-evaluates the mode later, even if the
//! viewport crosses the breakpoint.

use crate::config::EffectConfig;
use crate::layout::ImageId;

/// User-agent fragments that identify a mobile browser.
const MOBILE_AGENTS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// How the page is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Images become GPU planes with the hover distortion.
    Immersive,
    /// Render surface hidden, images shown at full opacity.
    Degraded,
}

/// Device facts the mode decision is based on.
#[derive(Clone, Debug)]
pub struct DeviceSignals {
    pub user_agent: String,
    /// Viewport width in CSS pixels.
    pub viewport_width: f32,
}

impl DeviceSignals {
    pub fn new(user_agent: impl Into<String>, viewport_width: f32) -> Self {
        Self {
            user_agent: user_agent.into(),
            viewport_width,
        }
    }
}

/// Case-insensitive check for a mobile browser user agent.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    MOBILE_AGENTS.iter().any(|agent| user_agent.contains(agent))
}

pub fn select_mode(signals: &DeviceSignals, config: &EffectConfig) -> Mode {
    let mobile = is_mobile_user_agent(&signals.user_agent);
    let desktop = signals.viewport_width >= config.desktop_min_width;

    if !mobile && desktop {
        Mode::Immersive
    } else {
        Mode::Degraded
    }
}

/// Write access to the page for the degraded presentation.
pub trait DocumentSurface {
    fn image_count(&self) -> usize;

    /// Hide the render surface entirely.
    fn hide_render_surface(&mut self);

    fn set_image_opacity(&mut self, id: ImageId, opacity: f32);
}

/// Present the page without the effect: hide the canvas and reveal every image.
pub fn apply_degraded<S: DocumentSurface + ?Sized>(surface: &mut S) {
    surface.hide_render_surface();
    for index in 0..surface.image_count() {
        surface.set_image_opacity(ImageId(index), 1.0);
    }
    log::info!(
        "degraded mode: render surface hidden, {} images revealed",
        surface.image_count()
    );
}
