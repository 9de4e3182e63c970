//! Smooth scrolling.
//!
//! The effect never scrolls anything itself. It only reads image bounds, and
//! those move because a smooth scroller moves the content. [`SmoothScroll`] is
//! the seam: the browser host binds `locomotive-scroll`, the native host uses
//! [`LerpScroll`].

/// A scroller that eases the content offset toward a target.
pub trait SmoothScroll {
    /// Current content offset in CSS pixels (positive = scrolled down).
    fn scroll_offset(&self) -> f32;

    /// Advance the easing by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Release the scroller. Further updates are no-ops.
    fn destroy(&mut self);
}

/// Wheel-driven scroller that lerps toward its target every frame.
///
/// # Example
/// ```
/// use hoverplane::{LerpScroll, SmoothScroll};
///
/// let mut scroll = LerpScroll::new().max_offset(1000.0);
/// scroll.wheel(240.0);
/// for _ in 0..120 {
///     scroll.update(1.0 / 60.0);
/// }
/// assert!((scroll.scroll_offset() - 240.0).abs() < 0.5);
/// ```
#[derive(Clone, Debug)]
pub struct LerpScroll {
    /// Offset the content is easing toward.
    pub target: f32,
    /// Offset currently applied.
    pub current: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub lerp: f32,
    /// Largest reachable offset.
    pub max_offset: f32,
    destroyed: bool,
}

impl Default for LerpScroll {
    fn default() -> Self {
        Self {
            target: 0.0,
            current: 0.0,
            lerp: 0.1,
            max_offset: 0.0,
            destroyed: false,
        }
    }
}

impl LerpScroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lerp(mut self, lerp: f32) -> Self {
        self.lerp = lerp.clamp(0.0, 1.0);
        self
    }

    pub fn max_offset(mut self, max_offset: f32) -> Self {
        self.set_max_offset(max_offset);
        self
    }

    /// Update the scroll range, e.g. after a resize changed the content height.
    pub fn set_max_offset(&mut self, max_offset: f32) {
        self.max_offset = max_offset.max(0.0);
        self.target = self.target.clamp(0.0, self.max_offset);
        self.current = self.current.clamp(0.0, self.max_offset);
    }

    /// Push the target by `delta` pixels.
    pub fn wheel(&mut self, delta: f32) {
        if self.destroyed {
            return;
        }
        self.target = (self.target + delta).clamp(0.0, self.max_offset);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl SmoothScroll for LerpScroll {
    fn scroll_offset(&self) -> f32 {
        self.current
    }

    fn update(&mut self, dt: f32) {
        if self.destroyed || dt <= 0.0 {
            return;
        }
        // Frame-rate independent: `lerp` is defined per 60 Hz frame.
        let factor = 1.0 - (1.0 - self.lerp).powf(dt * 60.0);
        self.current += (self.target - self.current) * factor;
        if (self.target - self.current).abs() < 0.01 {
            self.current = self.target;
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.target = self.current;
    }
}
