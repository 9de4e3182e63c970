//! Image planes and their geometry.
//!
//! A [`Plane`] is the scene-side twin of one page image. Its size and
//! position are never edited directly: [`Plane::sync`] rebuilds them from the
//! image's current bounding box, which is what keeps the scene glued to the
//! layout while the page scrolls.
//!
//! # Vertex Layout
//!
//! Planes are drawn from four [`PlaneVertex`] corners (20 bytes each):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | uv        | Float32x2 | 12     | 1               |
//!
//! UVs follow the usual plane convention: `u` runs left to right, `v` runs
//! bottom to top.

use glam::{Mat4, Vec2, Vec3};

use crate::layout::{Bounds, ImageId, Viewport};
use crate::material::{HoverMaterial, UvTransform};

/// A corner of a plane.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PlaneVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// Two counter-clockwise triangles over the four corners.
pub const PLANE_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// One image rendered as a textured rectangle.
#[derive(Clone, Debug)]
pub struct Plane {
    /// The page image this plane mirrors. Only used to re-read its bounds.
    pub image: ImageId,
    /// Width and height in scene units (CSS pixels).
    pub size: Vec2,
    /// Center of the plane. `z` is always 0.
    pub position: Vec3,
    pub material: HoverMaterial,
}

impl Plane {
    /// Create a plane matching `bounds` under the given viewport.
    pub fn new(image: ImageId, bounds: Bounds, viewport: Viewport) -> Self {
        let mut plane = Self {
            image,
            size: Vec2::ZERO,
            position: Vec3::ZERO,
            material: HoverMaterial::new(),
        };
        plane.sync(bounds, viewport);
        plane
    }

    /// Rebuild size and position from a fresh bounding box and reset the
    /// texture transform.
    pub fn sync(&mut self, bounds: Bounds, viewport: Viewport) {
        self.size = bounds.size();
        self.position = bounds.scene_center(viewport).extend(0.0);
        self.material.uv = UvTransform::IDENTITY;
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// A plane with no area cannot be seen or hit.
    pub fn is_degenerate(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// Local-space corners, centered on the origin, in index order
    /// bottom-left, bottom-right, top-right, top-left.
    pub fn vertices(&self) -> [PlaneVertex; 4] {
        let half = self.half_extents();
        [
            PlaneVertex::new([-half.x, -half.y, 0.0], [0.0, 0.0]),
            PlaneVertex::new([half.x, -half.y, 0.0], [1.0, 0.0]),
            PlaneVertex::new([half.x, half.y, 0.0], [1.0, 1.0]),
            PlaneVertex::new([-half.x, half.y, 0.0], [0.0, 1.0]),
        ]
    }

    /// Texture coordinates of a scene-space point lying on the plane.
    pub fn uv_at(&self, point: Vec3) -> Vec2 {
        let local = point.truncate() - self.position.truncate();
        (local + self.half_extents()) / self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1200.0, 800.0)
    }

    #[test]
    fn new_plane_mirrors_bounds() {
        let plane = Plane::new(ImageId(3), Bounds::new(100.0, 200.0, 300.0, 150.0), viewport());
        assert_eq!(plane.image, ImageId(3));
        assert_eq!(plane.size, Vec2::new(300.0, 150.0));
        assert_eq!(plane.position, Vec3::new(100.0 - 600.0 + 150.0, -200.0 + 400.0 - 75.0, 0.0));
    }

    #[test]
    fn vertices_span_the_size() {
        let plane = Plane::new(ImageId(0), Bounds::new(0.0, 0.0, 40.0, 20.0), viewport());
        let vertices = plane.vertices();
        assert_eq!(vertices[0].position, [-20.0, -10.0, 0.0]);
        assert_eq!(vertices[2].position, [20.0, 10.0, 0.0]);
        assert_eq!(vertices[3].uv, [0.0, 1.0]);
    }

    #[test]
    fn uv_at_corners_and_center() {
        let plane = Plane::new(ImageId(0), Bounds::new(500.0, 300.0, 200.0, 100.0), viewport());
        let center = plane.position;
        assert_eq!(plane.uv_at(center), Vec2::splat(0.5));

        let bottom_left = center - Vec3::new(100.0, 50.0, 0.0);
        assert_eq!(plane.uv_at(bottom_left), Vec2::ZERO);

        let top_right = center + Vec3::new(100.0, 50.0, 0.0);
        assert_eq!(plane.uv_at(top_right), Vec2::ONE);
    }

    #[test]
    fn sync_resets_uv_transform() {
        let mut plane = Plane::new(ImageId(0), Bounds::new(0.0, 0.0, 10.0, 10.0), viewport());
        plane.material.uv.repeat = Vec2::splat(2.0);
        plane.material.uv.offset = Vec2::splat(0.25);
        plane.sync(Bounds::new(0.0, 0.0, 10.0, 10.0), viewport());
        assert_eq!(plane.material.uv, UvTransform::IDENTITY);
    }

    #[test]
    fn zero_area_is_degenerate() {
        let plane = Plane::new(ImageId(0), Bounds::new(0.0, 0.0, 0.0, 10.0), viewport());
        assert!(plane.is_degenerate());
    }
}
