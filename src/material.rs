//! Per-plane shader inputs.
//!
//! Each plane owns a [`HoverMaterial`]: the animated `uMouse` and `uHover`
//! values the fragment shader reads, plus the texture repeat/offset. The
//! texture itself (`uTexture`) is owned by the GPU side in
//! [`PlanePass`](crate::PlanePass); the material only describes how it is
//! sampled.
//!
//! # WGSL Declaration
//!
//! [`PlaneUniforms`] is what actually reaches the GPU, bound at
//! `@group(1) @binding(0)`:
//!
//! ```wgsl
//! struct Plane {
//!     model: mat4x4f,
//!     mouse: vec2f,       // uMouse
//!     hover: f32,         // uHover
//!     _pad: f32,
//!     uv_repeat: vec2f,
//!     uv_offset: vec2f,
//! }
//! @group(1) @binding(0) var<uniform> plane: Plane;
//! @group(1) @binding(1) var uTexture: texture_2d<f32>;
//! @group(1) @binding(2) var uSampler: sampler;
//! ```

use glam::{Mat4, Vec2};

use crate::tween::{Animated, Easing};

/// Resting value of `uMouse`: the middle of the texture.
pub const MOUSE_REST: Vec2 = Vec2::new(0.5, 0.5);

/// Texture repeat and offset applied to the plane's UVs before sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvTransform {
    pub repeat: Vec2,
    pub offset: Vec2,
}

impl UvTransform {
    pub const IDENTITY: Self = Self {
        repeat: Vec2::ONE,
        offset: Vec2::ZERO,
    };

    pub fn apply(&self, uv: Vec2) -> Vec2 {
        uv * self.repeat + self.offset
    }
}

impl Default for UvTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The animated uniform set of one plane.
#[derive(Clone, Copy, Debug)]
pub struct HoverMaterial {
    mouse: Animated<Vec2>,
    hover: Animated<f32>,
    pub uv: UvTransform,
}

impl Default for HoverMaterial {
    fn default() -> Self {
        Self {
            mouse: Animated::new(MOUSE_REST),
            hover: Animated::new(0.0),
            uv: UvTransform::IDENTITY,
        }
    }
}

impl HoverMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `uMouse`.
    pub fn mouse(&self) -> Vec2 {
        self.mouse.value()
    }

    /// Current `uHover`.
    pub fn hover(&self) -> f32 {
        self.hover.value()
    }

    /// Where `uMouse` is heading (its current value when idle).
    pub fn mouse_target(&self) -> Vec2 {
        self.mouse.target()
    }

    /// Where `uHover` is heading (its current value when idle).
    pub fn hover_target(&self) -> f32 {
        self.hover.target()
    }

    pub fn is_animating(&self) -> bool {
        self.mouse.is_animating() || self.hover.is_animating()
    }

    /// Snap `uMouse` back to the texture center, dropping any mouse tween.
    pub fn reset_mouse(&mut self) {
        self.mouse.set(MOUSE_REST);
    }

    pub fn animate_mouse(&mut self, uv: Vec2, now: f64, duration: f64, easing: Easing) {
        self.mouse.animate_to(uv, now, duration, easing);
    }

    pub fn animate_hover(&mut self, hover: f32, now: f64, duration: f64, easing: Easing) {
        self.hover.animate_to(hover.clamp(0.0, 1.0), now, duration, easing);
    }

    pub fn tick(&mut self, now: f64) {
        self.mouse.tick(now);
        self.hover.tick(now);
    }

    /// Pack the material for upload, together with the plane's model matrix.
    pub fn uniforms(&self, model: Mat4) -> PlaneUniforms {
        PlaneUniforms {
            model: model.to_cols_array_2d(),
            mouse: self.mouse().to_array(),
            hover: self.hover(),
            _pad: 0.0,
            uv_repeat: self.uv.repeat.to_array(),
            uv_offset: self.uv.offset.to_array(),
        }
    }
}

/// GPU layout of a plane's uniform block (96 bytes, 16-byte aligned).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneUniforms {
    /// Model matrix placing the plane in the scene.
    pub model: [[f32; 4]; 4],
    /// `uMouse`, in texture space.
    pub mouse: [f32; 2],
    /// `uHover`, 0 at rest and 1 while hovered.
    pub hover: f32,
    /// Padding for 16-byte alignment.
    pub _pad: f32,
    pub uv_repeat: [f32; 2],
    pub uv_offset: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_at_rest() {
        let material = HoverMaterial::new();
        assert_eq!(material.mouse(), MOUSE_REST);
        assert_eq!(material.hover(), 0.0);
        assert_eq!(material.uv, UvTransform::IDENTITY);
        assert!(!material.is_animating());
    }

    #[test]
    fn reset_mouse_overrides_running_tween() {
        let mut material = HoverMaterial::new();
        material.animate_mouse(Vec2::new(0.2, 0.8), 0.0, 0.03, Easing::Power2Out);
        material.tick(0.01);
        material.reset_mouse();
        material.tick(1.0);
        assert_eq!(material.mouse(), MOUSE_REST);
    }

    #[test]
    fn hover_target_is_clamped() {
        let mut material = HoverMaterial::new();
        material.animate_hover(3.0, 0.0, 0.1, Easing::Linear);
        assert_eq!(material.hover_target(), 1.0);
        material.tick(0.1);
        assert_eq!(material.hover(), 1.0);
    }

    #[test]
    fn uniform_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<PlaneUniforms>(), 96);
        let packed = HoverMaterial::new().uniforms(Mat4::IDENTITY);
        assert_eq!(packed.mouse, [0.5, 0.5]);
        assert_eq!(packed.uv_repeat, [1.0, 1.0]);
    }
}
