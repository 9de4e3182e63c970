//! Ray casting from the pointer into the plane scene.
//!
//! This module provides the pieces the pointer tracker needs to find what the
//! cursor is over:
//!
//! - [`Ray`]: a 3D ray with origin and direction, built from the camera and a
//!   point in normalized device coordinates
//! - [`PlaneHit`]: which plane was hit, where, and at which texture coordinate
//! - [`raycast`]: nearest hit across all planes
//!
//! # Example
//!
//! ```
//! use hoverplane::{raycast, Bounds, ImageId, PixelCamera, Plane, Ray, Vec2, Viewport};
//!
//! let viewport = Viewport::new(1000.0, 800.0);
//! let camera = PixelCamera::new(viewport, 600.0, 0.1, 1000.0);
//! let planes = vec![Plane::new(ImageId(0), Bounds::new(400.0, 300.0, 200.0, 200.0), viewport)];
//!
//! // The middle of the screen is the middle of the image.
//! let hit = raycast(&planes, &Ray::from_camera(&camera, Vec2::ZERO)).unwrap();
//! assert_eq!(hit.index, 0);
//! assert!((hit.uv - Vec2::splat(0.5)).length() < 1e-4);
//! ```

use glam::{Vec2, Vec3};

use crate::camera::PixelCamera;
use crate::plane::Plane;

/// A ray in 3D space, used for picking.
///
/// A ray has an origin point and a normalized direction. It represents
/// an infinite half-line starting at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3,
    /// The normalized direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with the given origin and direction.
    ///
    /// The direction will be normalized automatically.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray leaving the camera through a point in normalized device
    /// coordinates (`[-1, 1]` on both axes, y up).
    pub fn from_camera(camera: &PixelCamera, ndc: Vec2) -> Self {
        // The camera looks down -z with y up, so the view basis is the world basis.
        let half_height = (camera.fov * 0.5).tan();
        let direction = Vec3::new(
            ndc.x * half_height * camera.aspect,
            ndc.y * half_height,
            -1.0,
        );
        Self::new(camera.position(), direction)
    }

    /// Get a point along the ray at the given distance from the origin.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect with the front face of a plane.
    ///
    /// Planes lie in z = `position.z` and face +z, so rays travelling away from
    /// the viewer, parallel rays, and zero-area planes never hit.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<(f32, Vec3)> {
        if plane.is_degenerate() || self.direction.z >= -f32::EPSILON {
            return None;
        }

        let t = (plane.position.z - self.origin.z) / self.direction.z;
        if t < 0.0 {
            return None;
        }

        let point = self.point_at(t);
        let local = (point - plane.position).truncate().abs();
        let half = plane.half_extents();
        if local.x > half.x || local.y > half.y {
            return None;
        }

        Some((t, point))
    }
}

/// Information about a ray-plane intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneHit {
    /// Index of the plane in the effect's plane list.
    pub index: usize,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Scene-space position of the hit point.
    pub point: Vec3,
    /// Texture coordinate of the hit point.
    pub uv: Vec2,
}

/// Cast a ray against all planes and return every hit, closest first.
///
/// Hits at equal distance keep plane order.
pub fn raycast_all(planes: &[Plane], ray: &Ray) -> Vec<PlaneHit> {
    let mut hits: Vec<PlaneHit> = planes
        .iter()
        .enumerate()
        .filter_map(|(index, plane)| {
            ray.intersect_plane(plane).map(|(distance, point)| PlaneHit {
                index,
                distance,
                point,
                uv: plane.uv_at(point),
            })
        })
        .collect();

    // Stable sort keeps document order for overlapping planes.
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    hits
}

/// Cast a ray and return the closest hit, or `None` if nothing was hit.
pub fn raycast(planes: &[Plane], ray: &Ray) -> Option<PlaneHit> {
    raycast_all(planes, ray).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Bounds, ImageId, Viewport};

    fn camera(viewport: Viewport) -> PixelCamera {
        PixelCamera::new(viewport, 600.0, 0.1, 1000.0)
    }

    #[test]
    fn center_ray_points_down_negative_z() {
        let viewport = Viewport::new(1000.0, 800.0);
        let ray = Ray::from_camera(&camera(viewport), Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 600.0));
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn ray_through_ndc_lands_on_matching_pixel() {
        let viewport = Viewport::new(1000.0, 800.0);
        let planes = vec![Plane::new(ImageId(0), viewport.bounds(), viewport)];

        let ray = Ray::from_camera(&camera(viewport), Vec2::new(0.5, -0.5));
        let hit = raycast(&planes, &ray).expect("full-screen plane is hit");

        assert!((hit.point.x - 250.0).abs() < 1e-2);
        assert!((hit.point.y + 200.0).abs() < 1e-2);
        assert!((hit.uv.x - 0.75).abs() < 1e-4);
        assert!((hit.uv.y - 0.25).abs() < 1e-4);
        let expected = Vec3::new(250.0, -200.0, -600.0).length();
        assert!((hit.distance - expected).abs() < 1e-1);
    }

    #[test]
    fn misses_outside_and_behind() {
        let viewport = Viewport::new(1000.0, 800.0);
        let planes = vec![Plane::new(ImageId(0), Bounds::new(0.0, 0.0, 100.0, 100.0), viewport)];

        let ray = Ray::from_camera(&camera(viewport), Vec2::ZERO);
        assert!(raycast(&planes, &ray).is_none());

        let away = Ray::new(Vec3::new(-450.0, 350.0, 600.0), Vec3::Z);
        assert!(raycast(&planes, &away).is_none());
    }

    #[test]
    fn degenerate_planes_are_never_hit() {
        let viewport = Viewport::new(1000.0, 800.0);
        let planes = vec![Plane::new(ImageId(0), Bounds::new(500.0, 0.0, 0.0, 800.0), viewport)];
        let ray = Ray::from_camera(&camera(viewport), Vec2::ZERO);
        assert!(raycast(&planes, &ray).is_none());
    }

    #[test]
    fn overlapping_planes_keep_document_order() {
        let viewport = Viewport::new(1000.0, 800.0);
        let planes = vec![
            Plane::new(ImageId(0), Bounds::new(400.0, 300.0, 200.0, 200.0), viewport),
            Plane::new(ImageId(1), Bounds::new(450.0, 350.0, 100.0, 100.0), viewport),
        ];
        let ray = Ray::from_camera(&camera(viewport), Vec2::ZERO);

        let hits = raycast_all(&planes, &ray);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 0);
        assert_eq!(raycast(&planes, &ray).map(|hit| hit.index), Some(0));
    }
}
