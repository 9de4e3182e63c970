//! The hover effect as one owned context object.
//!
//! [`HoverEffect`] holds everything the effect mutates: the camera, the plane
//! list, the pointer state and the idle debounce. Hosts drive it from three
//! entry points, all of which take the host clock in seconds:
//!
//! - [`HoverEffect::pointer_move`] on every pointer-move event
//! - [`HoverEffect::resize`] when the viewport changes size
//! - [`HoverEffect::frame`] once per animation frame, before rendering
//!
//! Nothing here touches the GPU; [`PlanePass`](crate::PlanePass) reads the
//! planes afterwards and draws them.
//!
//! # Example
//!
//! ```
//! use hoverplane::*;
//!
//! struct Page(Vec<Bounds>);
//!
//! impl LayoutSource for Page {
//!     fn viewport(&self) -> Viewport {
//!         Viewport::new(1280.0, 800.0)
//!     }
//!     fn image_count(&self) -> usize {
//!         self.0.len()
//!     }
//!     fn image_bounds(&self, id: ImageId) -> Option<Bounds> {
//!         self.0.get(id.0).copied()
//!     }
//! }
//!
//! let page = Page(vec![Bounds::new(100.0, 100.0, 400.0, 300.0)]);
//! let mut effect = HoverEffect::build(&page, EffectConfig::default());
//!
//! // Hover the middle of the image.
//! effect.pointer_move(Vec2::new(300.0, 250.0), page.surface_bounds(), 0.0);
//! effect.frame(&page, 0.05);
//! assert_eq!(effect.hovered(), Some(0));
//! assert!((effect.planes()[0].material.hover() - 1.0).abs() < 1e-6);
//! ```

use glam::Vec2;

use crate::camera::PixelCamera;
use crate::config::EffectConfig;
use crate::layout::{Bounds, LayoutSource, Viewport};
use crate::picking::{PlaneHit, Ray, raycast};
use crate::plane::Plane;
use crate::pointer::{PointerState, to_ndc};

/// Camera, planes and pointer state of one mounted effect.
pub struct HoverEffect {
    config: EffectConfig,
    viewport: Viewport,
    camera: PixelCamera,
    planes: Vec<Plane>,
    pointer: PointerState,
}

impl HoverEffect {
    /// Build the scene: one plane per image, sized and placed from the layout,
    /// and a camera that maps scene units to CSS pixels.
    ///
    /// Images that cannot be measured start as empty planes and pick up their
    /// bounds on the next sync.
    pub fn build<L: LayoutSource + ?Sized>(layout: &L, config: EffectConfig) -> Self {
        let viewport = layout.viewport();
        let camera = PixelCamera::new(
            viewport,
            config.camera_distance,
            config.near,
            config.far,
        );

        let planes: Vec<Plane> = layout
            .image_ids()
            .into_iter()
            .map(|id| Plane::new(id, layout.image_bounds(id).unwrap_or_default(), viewport))
            .collect();

        log::info!(
            "scene built: {} planes, viewport {}x{}, fov {:.2}°",
            planes.len(),
            viewport.width,
            viewport.height,
            camera.fov_degrees()
        );

        Self {
            pointer: PointerState::new(config.idle_delay),
            config,
            viewport,
            camera,
            planes,
        }
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &PixelCamera {
        &self.camera
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Index of the plane currently under the pointer.
    pub fn hovered(&self) -> Option<usize> {
        self.pointer.hovered
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Handle a pointer move at `client` (CSS pixels) over a render surface
    /// occupying `surface`.
    ///
    /// Returns the plane hit, if any.
    pub fn pointer_move(&mut self, client: Vec2, surface: Bounds, now: f64) -> Option<PlaneHit> {
        // A reset that came due before this move still has to happen.
        self.poll_idle(now);
        // Retargeted tweens start from the value at `now`, not at the last frame.
        for plane in &mut self.planes {
            plane.material.tick(now);
        }

        let ndc = to_ndc(client, surface)?;
        self.pointer.ndc = ndc;

        let ray = Ray::from_camera(&self.camera, ndc);
        let hit = raycast(&self.planes, &ray);

        for plane in &mut self.planes {
            plane.material.reset_mouse();
        }

        let current = hit.map(|hit| hit.index);
        if self.config.fade_on_switch {
            if let Some(previous) = self.pointer.hovered.filter(|&index| Some(index) != current) {
                log::debug!("pointer left plane {previous}");
                self.planes[previous].material.animate_hover(
                    0.0,
                    now,
                    self.config.hover_out,
                    self.config.easing,
                );
            }
        }

        if let Some(hit) = hit {
            let material = &mut self.planes[hit.index].material;
            material.animate_mouse(hit.uv, now, self.config.hover_in, self.config.easing);
            material.animate_hover(1.0, now, self.config.hover_in, self.config.easing);
            self.pointer.hovered = Some(hit.index);
        } else if self.config.fade_on_switch {
            self.pointer.hovered = None;
        }

        self.pointer.idle.arm(now);
        hit
    }

    /// Refit the camera to a new viewport and resync every plane right away.
    pub fn resize<L: LayoutSource + ?Sized>(&mut self, viewport: Viewport, layout: &L) {
        self.viewport = viewport;
        self.camera.resize(viewport);
        self.sync_planes(layout);
        log::debug!(
            "resized to {}x{}, fov {:.2}°",
            viewport.width,
            viewport.height,
            self.camera.fov_degrees()
        );
    }

    /// Per-frame update: fire a due idle reset, resync planes with the layout,
    /// then advance every uniform tween to `now`.
    pub fn frame<L: LayoutSource + ?Sized>(&mut self, layout: &L, now: f64) {
        self.poll_idle(now);
        self.sync_planes(layout);
        for plane in &mut self.planes {
            plane.material.tick(now);
        }
    }

    /// Rebuild every plane's geometry and position from its image's current
    /// bounds. Planes whose image can no longer be measured keep their last
    /// geometry.
    pub fn sync_planes<L: LayoutSource + ?Sized>(&mut self, layout: &L) {
        let viewport = self.viewport;
        for plane in &mut self.planes {
            if let Some(bounds) = layout.image_bounds(plane.image) {
                plane.sync(bounds, viewport);
            }
        }
    }

    /// Fade every plane's hover out once the pointer has been idle long enough.
    fn poll_idle(&mut self, now: f64) {
        let Some(due) = self.pointer.idle.poll(now) else {
            return;
        };

        log::debug!("pointer idle, fading {} planes", self.planes.len());
        for plane in &mut self.planes {
            // Catch up to the deadline first so the fade starts from the value
            // the plane actually had then.
            plane.material.tick(due);
            plane
                .material
                .animate_hover(0.0, due, self.config.hover_out, self.config.easing);
        }
        self.pointer.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ImageId;
    use crate::material::MOUSE_REST;

    struct StaticLayout {
        viewport: Viewport,
        images: Vec<Bounds>,
    }

    impl LayoutSource for StaticLayout {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn image_count(&self) -> usize {
            self.images.len()
        }

        fn image_bounds(&self, id: ImageId) -> Option<Bounds> {
            self.images.get(id.0).copied()
        }
    }

    fn two_images() -> StaticLayout {
        StaticLayout {
            viewport: Viewport::new(1200.0, 800.0),
            images: vec![
                Bounds::new(100.0, 100.0, 400.0, 300.0),
                Bounds::new(700.0, 100.0, 400.0, 300.0),
            ],
        }
    }

    fn at_uv(layout: &StaticLayout, index: usize, uv: Vec2) -> Vec2 {
        let bounds = layout.images[index];
        Vec2::new(
            bounds.left + uv.x * bounds.width,
            bounds.top + (1.0 - uv.y) * bounds.height,
        )
    }

    #[test]
    fn hover_in_then_idle_fade() {
        let layout = two_images();
        let mut effect = HoverEffect::build(&layout, EffectConfig::default());
        let surface = layout.surface_bounds();

        let hit = effect
            .pointer_move(at_uv(&layout, 0, Vec2::new(0.3, 0.7)), surface, 1.0)
            .expect("pointer is over the first image");
        assert_eq!(hit.index, 0);

        effect.frame(&layout, 1.05);
        let material = effect.planes()[0].material;
        assert!((material.mouse() - Vec2::new(0.3, 0.7)).length() < 1e-3);
        assert!((material.hover() - 1.0).abs() < 1e-6);

        // 100ms after the last move the hover starts fading.
        effect.frame(&layout, 1.2);
        assert_eq!(effect.hovered(), None);
        assert_eq!(effect.planes()[0].material.hover_target(), 0.0);

        effect.frame(&layout, 1.5);
        assert_eq!(effect.planes()[0].material.hover(), 0.0);
    }

    #[test]
    fn moving_off_every_plane_leaves_mouse_at_rest() {
        let layout = two_images();
        let mut effect = HoverEffect::build(&layout, EffectConfig::default());
        let surface = layout.surface_bounds();

        effect.pointer_move(at_uv(&layout, 1, Vec2::new(0.9, 0.1)), surface, 0.0);
        assert!(effect.pointer_move(Vec2::new(600.0, 700.0), surface, 0.01).is_none());
        effect.frame(&layout, 0.02);
        for plane in effect.planes() {
            assert_eq!(plane.material.mouse(), MOUSE_REST);
        }
    }

    #[test]
    fn switching_planes_fades_the_previous_one() {
        let layout = two_images();
        let mut effect = HoverEffect::build(&layout, EffectConfig::default());
        let surface = layout.surface_bounds();

        effect.pointer_move(at_uv(&layout, 0, Vec2::splat(0.5)), surface, 0.0);
        effect.frame(&layout, 0.05);
        effect.pointer_move(at_uv(&layout, 1, Vec2::splat(0.5)), surface, 0.06);

        assert_eq!(effect.hovered(), Some(1));
        assert_eq!(effect.planes()[0].material.hover_target(), 0.0);
        assert_eq!(effect.planes()[1].material.hover_target(), 1.0);
    }

    #[test]
    fn stale_hover_survives_switch_when_fading_is_disabled() {
        let layout = two_images();
        let config = EffectConfig::default().fade_on_switch(false);
        let mut effect = HoverEffect::build(&layout, config);
        let surface = layout.surface_bounds();

        effect.pointer_move(at_uv(&layout, 0, Vec2::splat(0.5)), surface, 0.0);
        effect.frame(&layout, 0.05);
        effect.pointer_move(at_uv(&layout, 1, Vec2::splat(0.5)), surface, 0.06);
        effect.frame(&layout, 0.1);

        assert!((effect.planes()[0].material.hover() - 1.0).abs() < 1e-6);
        assert!((effect.planes()[1].material.hover() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hover_converges_when_moves_outpace_frames() {
        let layout = two_images();
        let mut effect = HoverEffect::build(&layout, EffectConfig::default());
        let surface = layout.surface_bounds();

        // A 1 kHz mouse against a 60 Hz frame loop.
        let mut next_frame = 1.0 / 60.0;
        for step in 0..100 {
            let now = step as f64 * 0.001;
            let uv = Vec2::new(0.3 + step as f32 * 0.002, 0.5);
            effect.pointer_move(at_uv(&layout, 0, uv), surface, now);
            if now >= next_frame {
                effect.frame(&layout, now);
                next_frame += 1.0 / 60.0;
            }
        }
        effect.frame(&layout, 0.1);

        let hover = effect.planes()[0].material.hover();
        assert!(hover > 0.99, "hover only reached {hover}");
    }

    #[test]
    fn late_move_still_triggers_pending_reset() {
        let layout = two_images();
        let mut effect = HoverEffect::build(&layout, EffectConfig::default());
        let surface = layout.surface_bounds();

        effect.pointer_move(at_uv(&layout, 0, Vec2::splat(0.5)), surface, 0.0);
        effect.frame(&layout, 0.05);

        // No frame ran between the deadline and this move.
        effect.pointer_move(Vec2::new(600.0, 700.0), surface, 0.5);
        assert_eq!(effect.planes()[0].material.hover_target(), 0.0);
        assert!(effect.pointer().idle.is_pending());
    }
}
