//! The layout mirror: where the source images currently sit on screen.
//!
//! The host layout (the DOM in a browser, [`Page`](crate::Page) natively) is the
//! source of truth for every plane's size and position. This module defines
//! the read surface the effect consumes, [`LayoutSource`], and the mapping
//! from top-left-origin screen rectangles to center-origin scene coordinates.
//!
//! ```
//! use hoverplane::{Bounds, Viewport};
//!
//! let viewport = Viewport::new(1280.0, 800.0);
//! let image = Bounds::new(100.0, 50.0, 400.0, 300.0);
//! let center = image.scene_center(viewport);
//! assert_eq!(center.x, 100.0 - 640.0 + 200.0);
//! assert_eq!(center.y, -50.0 + 400.0 - 150.0);
//! ```

use glam::Vec2;

/// Index of a source image inside its [`LayoutSource`].
///
/// Images are enumerated once at startup; the index stays valid for the
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

/// Size of the viewport in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// The viewport as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// An on-screen rectangle in CSS pixels, origin at the top-left of the
/// viewport, y growing downwards. Mirrors `getBoundingClientRect()`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Center of the rectangle in scene coordinates.
    ///
    /// Scene coordinates put the origin at the middle of the viewport with y
    /// pointing up, so with the pixel camera one scene unit is one CSS pixel.
    pub fn scene_center(&self, viewport: Viewport) -> Vec2 {
        Vec2::new(
            self.left - viewport.width / 2.0 + self.width / 2.0,
            -self.top + viewport.height / 2.0 - self.height / 2.0,
        )
    }
}

/// Read access to the host layout.
///
/// Implementations are queried at startup and on every frame, so reads should
/// be cheap and side-effect free.
pub trait LayoutSource {
    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Bounding box of the render surface (the canvas). Pointer coordinates
    /// are normalized against this rectangle.
    fn surface_bounds(&self) -> Bounds {
        self.viewport().bounds()
    }

    /// Number of source images. Fixed for the session.
    fn image_count(&self) -> usize;

    /// Current bounding box of an image, or `None` if it can no longer be
    /// measured.
    fn image_bounds(&self, id: ImageId) -> Option<Bounds>;

    /// All image ids in document order.
    fn image_ids(&self) -> Vec<ImageId> {
        (0..self.image_count()).map(ImageId).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_left_image_maps_to_upper_left_quadrant() {
        let viewport = Viewport::new(1000.0, 600.0);
        let bounds = Bounds::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(bounds.scene_center(viewport), Vec2::new(-400.0, 250.0));
    }

    #[test]
    fn centered_image_maps_to_origin() {
        let viewport = Viewport::new(1000.0, 600.0);
        let bounds = Bounds::new(400.0, 250.0, 200.0, 100.0);
        assert_eq!(bounds.scene_center(viewport), Vec2::ZERO);
    }

    #[test]
    fn image_scrolled_above_viewport_is_above_scene_top() {
        let viewport = Viewport::new(1000.0, 600.0);
        let bounds = Bounds::new(0.0, -500.0, 1000.0, 200.0);
        let center = bounds.scene_center(viewport);
        assert_eq!(center.x, 0.0);
        assert!(center.y - 100.0 > 300.0);
    }

    #[test]
    fn degenerate_viewport_aspect() {
        assert_eq!(Viewport::new(800.0, 0.0).aspect(), 1.0);
        assert_eq!(Viewport::new(800.0, 400.0).aspect(), 2.0);
    }
}
