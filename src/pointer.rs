use glam::Vec2;

use crate::debounce::Debounce;
use crate::layout::Bounds;

/// Convert a pointer position (CSS pixels, top-left origin) into normalized
/// device coordinates relative to `surface`.
///
/// Returns `None` when the surface has no area.
pub fn to_ndc(client: Vec2, surface: Bounds) -> Option<Vec2> {
    if surface.width <= 0.0 || surface.height <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        ((client.x - surface.left) / surface.width) * 2.0 - 1.0,
        -((client.y - surface.top) / surface.height) * 2.0 + 1.0,
    ))
}

/// Transient pointer state owned by the effect.
#[derive(Clone, Copy, Debug)]
pub struct PointerState {
    /// Last pointer position in normalized device coordinates.
    pub ndc: Vec2,
    /// Plane currently under the pointer, if any.
    pub hovered: Option<usize>,
    /// Fires once the pointer has been still for the idle delay.
    pub idle: Debounce,
}

impl PointerState {
    pub fn new(idle_delay: f64) -> Self {
        Self {
            ndc: Vec2::ZERO,
            hovered: None,
            idle: Debounce::new(idle_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_ndc_corners() {
        let surface = Bounds::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(to_ndc(Vec2::ZERO, surface), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(to_ndc(Vec2::new(800.0, 600.0), surface), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(to_ndc(Vec2::new(400.0, 300.0), surface), Some(Vec2::ZERO));
    }

    #[test]
    fn offset_surface_is_respected() {
        let surface = Bounds::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(to_ndc(Vec2::new(200.0, 100.0), surface), Some(Vec2::ZERO));
    }

    #[test]
    fn empty_surface_has_no_ndc() {
        assert_eq!(to_ndc(Vec2::ZERO, Bounds::new(0.0, 0.0, 0.0, 100.0)), None);
    }
}
