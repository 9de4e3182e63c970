use glam::{Mat4, Vec3};

use crate::layout::Viewport;

/// A perspective camera whose visible slice at z = 0 is exactly the viewport.
///
/// The camera sits at `(0, 0, distance)` looking down −z. Its vertical field
/// of view is chosen so the visible height at `distance` equals the viewport
/// height, which makes one scene unit one CSS pixel on the image plane.
#[derive(Clone, Copy, Debug)]
pub struct PixelCamera {
    pub distance: f32,
    pub fov: f32, // radians
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PixelCamera {
    pub fn new(viewport: Viewport, distance: f32, near: f32, far: f32) -> Self {
        Self {
            distance,
            fov: fov_for_height(viewport.height, distance),
            aspect: viewport.aspect(),
            near,
            far,
        }
    }

    /// Refit the camera to a new viewport.
    ///
    /// Both the aspect ratio and the field of view follow the viewport so the
    /// pixel mapping survives height changes too.
    pub fn resize(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
        self.fov = fov_for_height(viewport.height, self.distance);
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Field of view in degrees.
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position();
        Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Vertical field of view (radians) that frames `height` units at `distance`.
pub fn fov_for_height(height: f32, distance: f32) -> f32 {
    2.0 * ((height / 2.0) / distance).atan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(camera: &PixelCamera, point: Vec3) -> (f32, f32) {
        let clip = camera.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        (clip.x / clip.w, clip.y / clip.w)
    }

    #[test]
    fn fov_frames_viewport_height() {
        let camera = PixelCamera::new(Viewport::new(1280.0, 800.0), 600.0, 0.1, 1000.0);
        let expected = 2.0 * (400.0f32 / 600.0).atan();
        assert!((camera.fov - expected).abs() < 1e-6);
        assert!((camera.aspect - 1.6).abs() < 1e-6);
    }

    #[test]
    fn one_unit_is_one_pixel_on_the_image_plane() {
        let camera = PixelCamera::new(Viewport::new(1280.0, 800.0), 600.0, 0.1, 1000.0);

        // Viewport corners land on the NDC corners.
        let (x, y) = project(&camera, Vec3::new(640.0, 400.0, 0.0));
        assert!((x - 1.0).abs() < 1e-4);
        assert!((y - 1.0).abs() < 1e-4);

        let (x, y) = project(&camera, Vec3::new(-320.0, -100.0, 0.0));
        assert!((x + 0.5).abs() < 1e-4);
        assert!((y + 0.25).abs() < 1e-4);
    }

    #[test]
    fn resize_keeps_mapping_pixel_exact() {
        let mut camera = PixelCamera::new(Viewport::new(1280.0, 800.0), 600.0, 0.1, 1000.0);
        camera.resize(Viewport::new(1500.0, 1000.0));

        assert!((camera.aspect - 1.5).abs() < 1e-6);
        let (x, y) = project(&camera, Vec3::new(750.0, -500.0, 0.0));
        assert!((x - 1.0).abs() < 1e-4);
        assert!((y + 1.0).abs() < 1e-4);
    }
}
