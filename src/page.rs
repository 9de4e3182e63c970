//! The native stand-in for a web page: a centered, scrollable column of
//! images.
//!
//! [`Page`] plays the role the DOM plays in a browser. It owns the layout the
//! effect mirrors, scrolls it through a [`LerpScroll`], and keeps the
//! presentation state the degraded mode writes to.

use glam::Vec2;

use crate::layout::{Bounds, ImageId, LayoutSource, Viewport};
use crate::mode::DocumentSurface;
use crate::runtime::HostPage;
use crate::scroll::{LerpScroll, SmoothScroll};

/// Widest an image column gets, in CSS pixels.
pub const COLUMN_MAX_WIDTH: f32 = 720.0;
/// Column width as a share of the viewport width.
pub const COLUMN_RATIO: f32 = 0.6;
/// Vertical space between images.
pub const IMAGE_GAP: f32 = 80.0;
/// Space above the first image and below the last.
pub const PAGE_PADDING: f32 = 120.0;

/// One image on the page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageImage {
    pub label: String,
    /// Intrinsic size in pixels.
    pub width: u32,
    pub height: u32,
    /// Presentation opacity, written by the degraded mode.
    pub opacity: f32,
}

impl PageImage {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            opacity: 0.0,
        }
    }

    /// Height over width, or 0 for an empty image.
    fn height_ratio(&self) -> f32 {
        if self.width == 0 {
            0.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

pub struct Page {
    viewport: Viewport,
    images: Vec<PageImage>,
    scroll: LerpScroll,
    canvas_hidden: bool,
}

impl Page {
    pub fn new(viewport: Viewport, images: Vec<PageImage>) -> Self {
        let mut page = Self {
            viewport,
            images,
            scroll: LerpScroll::new(),
            canvas_hidden: false,
        };
        page.refresh_scroll_range();
        page
    }

    pub fn images(&self) -> &[PageImage] {
        &self.images
    }

    pub fn scroll(&self) -> &LerpScroll {
        &self.scroll
    }

    pub fn is_canvas_hidden(&self) -> bool {
        self.canvas_hidden
    }

    /// Width of the image column for the current viewport.
    pub fn column_width(&self) -> f32 {
        (self.viewport.width * COLUMN_RATIO).min(COLUMN_MAX_WIDTH).max(0.0)
    }

    /// Total height of the content, padding included.
    pub fn content_height(&self) -> f32 {
        let width = self.column_width();
        let images: f32 = self
            .images
            .iter()
            .map(|image| width * image.height_ratio())
            .sum();
        let gaps = IMAGE_GAP * self.images.len().saturating_sub(1) as f32;
        PAGE_PADDING * 2.0 + images + gaps
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.refresh_scroll_range();
    }

    /// Feed a wheel delta (CSS pixels, positive scrolls down).
    pub fn wheel(&mut self, delta: f32) {
        self.scroll.wheel(delta);
    }

    /// Advance the smooth scroller.
    pub fn update(&mut self, dt: f32) {
        self.scroll.update(dt);
    }

    pub fn destroy(&mut self) {
        self.scroll.destroy();
    }

    fn refresh_scroll_range(&mut self) {
        let range = self.content_height() - self.viewport.height;
        self.scroll.set_max_offset(range);
    }
}

impl LayoutSource for Page {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn image_bounds(&self, id: ImageId) -> Option<Bounds> {
        self.images.get(id.0)?;

        let width = self.column_width();
        let left = (self.viewport.width - width) * 0.5;
        let mut top = PAGE_PADDING - self.scroll.scroll_offset();
        for image in &self.images[..id.0] {
            top += width * image.height_ratio() + IMAGE_GAP;
        }
        let height = width * self.images[id.0].height_ratio();

        Some(Bounds::new(left, top, width, height))
    }
}

impl HostPage for Page {
    fn resize(&mut self, viewport: Viewport) {
        Page::resize(self, viewport);
    }

    fn wheel(&mut self, delta: Vec2) {
        Page::wheel(self, delta.y);
    }

    fn update(&mut self, dt: f32) {
        Page::update(self, dt);
    }
}

impl DocumentSurface for Page {
    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn hide_render_surface(&mut self) {
        self.canvas_hidden = true;
    }

    fn set_image_opacity(&mut self, id: ImageId, opacity: f32) {
        if let Some(image) = self.images.get_mut(id.0) {
            image.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::apply_degraded;

    fn page() -> Page {
        Page::new(
            Viewport::new(1280.0, 800.0),
            vec![
                PageImage::new("a", 1600, 900),
                PageImage::new("b", 1000, 1000),
                PageImage::new("c", 800, 1200),
            ],
        )
    }

    #[test]
    fn images_stack_in_a_centered_column() {
        let page = page();
        let first = page.image_bounds(ImageId(0)).unwrap();
        let second = page.image_bounds(ImageId(1)).unwrap();

        assert_eq!(first.width, 720.0);
        assert_eq!(first.left, (1280.0 - 720.0) / 2.0);
        assert_eq!(first.top, PAGE_PADDING);
        assert!((first.height - 405.0).abs() < 1e-3);
        assert!((second.top - (first.bottom() + IMAGE_GAP)).abs() < 1e-3);
        assert!(page.image_bounds(ImageId(3)).is_none());
    }

    #[test]
    fn narrow_viewport_shrinks_the_column() {
        let mut page = page();
        page.resize(Viewport::new(800.0, 600.0));
        let bounds = page.image_bounds(ImageId(1)).unwrap();
        // 800 * 0.6 is not exact in f32.
        assert!((bounds.width - 480.0).abs() < 1e-3);
        assert!((bounds.height - 480.0).abs() < 1e-3);
    }

    #[test]
    fn scrolling_moves_every_image_up() {
        let mut page = page();
        let before = page.image_bounds(ImageId(2)).unwrap();
        page.wheel(200.0);
        page.update(1.0);
        let after = page.image_bounds(ImageId(2)).unwrap();
        assert!((before.top - after.top - page.scroll().scroll_offset()).abs() < 1e-3);
        assert!(after.top < before.top);
    }

    #[test]
    fn scroll_range_covers_the_content() {
        let mut page = page();
        page.wheel(1.0e6);
        assert_eq!(page.scroll().target, page.content_height() - 800.0);
    }

    #[test]
    fn degraded_mode_reveals_images() {
        let mut page = page();
        apply_degraded(&mut page);
        assert!(page.is_canvas_hidden());
        assert!(page.images().iter().all(|image| image.opacity == 1.0));
    }
}
