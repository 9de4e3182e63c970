//! # Hoverplane
//!
//! **Page images as GPU planes that ripple under the cursor.**
//!
//! Every image on a page is mirrored by a textured plane in a scene whose
//! camera maps one scene unit to one CSS pixel, so planes sit exactly on top
//! of their images. Each frame the planes are resynced to the live layout
//! (scrolling included); moving the pointer raycasts into the scene and
//! tweens the hovered plane's `uMouse` and `uHover` uniforms, which the
//! fragment shader turns into a distortion around the cursor.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(not(target_arch = "wasm32"))]
//! fn main() -> hoverplane::Result<()> {
//!     hoverplane::run_with_config(
//!         hoverplane::AppConfig::new()
//!             .title("Gallery")
//!             .effect(hoverplane::EffectConfig::new().hover_out(0.5)),
//!     )
//! }
//! # #[cfg(target_arch = "wasm32")]
//! # fn main() {}
//! ```
//!
//! In a browser the module exports `mount()`, which takes over `#canvas` and
//! every `img` on the page.
//!
//! ## Layers
//!
//! - [`HoverEffect`] is pure state: camera, planes, pointer, tweens. It never
//!   touches the GPU and is driven with explicit timestamps.
//! - [`PlanePass`] draws whatever the effect currently holds.
//! - [`Runtime`] ties both to a host page and an [`EventSource`].
//! - Small screens and mobile browsers get [`Mode::Degraded`]: no effect, the
//!   plain images instead.

#[cfg(not(target_arch = "wasm32"))]
mod app;
mod camera;
mod config;
mod debounce;
mod effect;
mod error;
mod events;
mod gpu;
mod layout;
mod material;
mod mode;
mod page;
mod picking;
mod plane;
mod pointer;
mod render;
mod runtime;
mod scroll;
mod texture;
mod tween;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use app::{AppConfig, ImageSource, default_images, native_user_agent, run, run_with_config};
pub use camera::{PixelCamera, fov_for_height};
pub use config::EffectConfig;
pub use debounce::Debounce;
pub use effect::HoverEffect;
pub use error::{Error, Result};
pub use events::{
    EffectEvent, EventBus, EventHandler, EventKind, EventSource, SubscriptionId, Teardown,
};
pub use gpu::GpuContext;
pub use layout::{Bounds, ImageId, LayoutSource, Viewport};
pub use material::{HoverMaterial, MOUSE_REST, PlaneUniforms, UvTransform};
pub use mode::{
    DeviceSignals, DocumentSurface, Mode, apply_degraded, is_mobile_user_agent, select_mode,
};
pub use page::{Page, PageImage};
pub use picking::{PlaneHit, Ray, raycast, raycast_all};
pub use plane::{PLANE_INDICES, Plane, PlaneVertex};
pub use pointer::{PointerState, to_ndc};
pub use render::{CameraUniforms, PlanePass};
pub use runtime::{EventSink, HostPage, Runtime, connect, css_size, physical_size};
pub use scroll::{LerpScroll, SmoothScroll};
pub use texture::{Texture, decode_rgba, fit_within, swatch};
pub use tween::{Animated, Easing, Lerp, Tween};
#[cfg(target_arch = "wasm32")]
pub use web::{DomEvents, DomPage, EffectHandle, mount};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
