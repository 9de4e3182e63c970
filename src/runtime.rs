//! Host-independent glue between the effect, the layout and the GPU.
//!
//! Both hosts build a [`Runtime`], park it in an `Rc<RefCell<_>>` and wire it
//! to their [`EventSource`] with [`connect`]. From then on the host only has
//! to dispatch events and call [`Runtime::frame`] once per animation frame.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::config::EffectConfig;
use crate::effect::HoverEffect;
use crate::events::{EffectEvent, EventKind, EventSource, Teardown};
use crate::gpu::GpuContext;
use crate::layout::{LayoutSource, Viewport};
use crate::render::PlanePass;
use crate::texture::Texture;

/// A layout the host can also push changes into.
///
/// The DOM updates itself, so the browser page ignores most of these; the
/// native [`Page`](crate::Page) recomputes its column from them.
pub trait HostPage: LayoutSource {
    /// The viewport changed size.
    fn resize(&mut self, _viewport: Viewport) {}

    /// Scroll wheel input in CSS pixels.
    fn wheel(&mut self, _delta: Vec2) {}

    /// Advance host-side animation such as smooth scrolling.
    fn update(&mut self, _dt: f32) {}
}

/// Anything that consumes [`EffectEvent`]s.
pub trait EventSink {
    fn handle(&mut self, event: &EffectEvent);
}

/// Subscribe `sink` to `kinds` on `source`.
///
/// The returned [`Teardown`] removes every subscription made here. Events that
/// arrive while the sink is already borrowed are dropped with a warning
/// instead of panicking.
pub fn connect<T, S>(sink: &Rc<RefCell<T>>, source: &mut S, kinds: &[EventKind]) -> Teardown
where
    T: EventSink + 'static,
    S: EventSource + ?Sized,
{
    let mut teardown = Teardown::new();
    for &kind in kinds {
        let sink = Rc::clone(sink);
        let id = source.subscribe(
            kind,
            Box::new(move |event: &EffectEvent| match sink.try_borrow_mut() {
                Ok(mut sink) => sink.handle(event),
                Err(_) => log::warn!("dropped {:?} event: effect busy", event.kind()),
            }),
        );
        teardown.push(id);
    }
    teardown
}

/// Everything a running effect owns.
pub struct Runtime<P> {
    pub gpu: GpuContext,
    pub pass: PlanePass,
    pub effect: HoverEffect,
    pub page: P,
    pixel_ratio: f32,
    started_at: Option<f64>,
    last_frame: Option<f64>,
}

impl<P: HostPage> Runtime<P> {
    /// Build the scene from `page` and mirror it on the GPU.
    pub fn new(gpu: GpuContext, page: P, config: EffectConfig, pixel_ratio: f32) -> Self {
        let effect = HoverEffect::build(&page, config);
        let pass = PlanePass::new(&gpu, &effect);
        Self {
            gpu,
            pass,
            effect,
            page,
            pixel_ratio,
            started_at: None,
            last_frame: None,
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Change the render surface resolution multiplier. Takes effect on the
    /// next resize.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Attach the decoded image for plane `index`.
    pub fn set_texture(&mut self, index: usize, texture: Texture) {
        self.pass.set_texture(&self.gpu, index, texture);
    }

    /// Resize the page, the render surface and the scene, in that order.
    pub fn resize(&mut self, viewport: Viewport) {
        self.page.resize(viewport);
        let (width, height) = physical_size(viewport, self.pixel_ratio);
        self.gpu.resize(width, height);
        self.effect.resize(viewport, &self.page);
    }

    /// Run one animation frame at host time `now` (seconds) and present it.
    pub fn frame(&mut self, now: f64) -> crate::Result<()> {
        let started_at = *self.started_at.get_or_insert(now);
        let dt = self.last_frame.map_or(0.0, |last| (now - last).max(0.0) as f32);
        self.last_frame = Some(now);

        self.page.update(dt);
        self.effect.frame(&self.page, now);
        self.pass
            .draw_frame(&self.gpu, &self.effect, (now - started_at) as f32)
    }
}

impl<P: HostPage> EventSink for Runtime<P> {
    fn handle(&mut self, event: &EffectEvent) {
        match *event {
            EffectEvent::PointerMove { client, at } => {
                let surface = self.page.surface_bounds();
                if let Some(hit) = self.effect.pointer_move(client, surface, at) {
                    log::debug!("pointer over plane {} at uv {:?}", hit.index, hit.uv);
                }
            }
            EffectEvent::Resize { viewport, .. } => self.resize(viewport),
            EffectEvent::Wheel { delta, .. } => self.page.wheel(delta),
        }
    }
}

/// Render surface size in physical pixels for a CSS-pixel viewport.
pub fn physical_size(viewport: Viewport, pixel_ratio: f32) -> (u32, u32) {
    let scale = |value: f32| (value * pixel_ratio).round().max(1.0) as u32;
    (scale(viewport.width), scale(viewport.height))
}

/// CSS `width` and `height` that pin the render surface to the viewport, so a
/// high pixel ratio adds resolution instead of enlarging the canvas.
pub fn css_size(viewport: Viewport) -> [(&'static str, String); 2] {
    [
        ("width", format!("{}px", viewport.width)),
        ("height", format!("{}px", viewport.height)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<EventKind>,
    }

    impl EventSink for Recorder {
        fn handle(&mut self, event: &EffectEvent) {
            self.seen.push(event.kind());
        }
    }

    fn resize_event() -> EffectEvent {
        EffectEvent::Resize {
            viewport: Viewport::new(640.0, 480.0),
            at: 0.0,
        }
    }

    #[test]
    fn connect_only_subscribes_requested_kinds() {
        let sink = Rc::new(RefCell::new(Recorder::default()));
        let mut bus = EventBus::new();
        let teardown = connect(&sink, &mut bus, &[EventKind::Resize]);
        assert_eq!(teardown.len(), 1);

        bus.dispatch(&EffectEvent::PointerMove {
            client: Vec2::ZERO,
            at: 0.0,
        });
        bus.dispatch(&resize_event());
        assert_eq!(sink.borrow().seen, vec![EventKind::Resize]);
    }

    #[test]
    fn teardown_disconnects_the_sink() {
        let sink = Rc::new(RefCell::new(Recorder::default()));
        let mut bus = EventBus::new();
        let mut teardown = connect(&sink, &mut bus, &[EventKind::Resize, EventKind::Wheel]);

        teardown.run(&mut bus);
        bus.dispatch(&resize_event());
        assert!(sink.borrow().seen.is_empty());
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(Rc::strong_count(&sink), 1);
    }

    #[test]
    fn busy_sink_drops_the_event() {
        let sink = Rc::new(RefCell::new(Recorder::default()));
        let mut bus = EventBus::new();
        let _teardown = connect(&sink, &mut bus, &[EventKind::Resize]);

        {
            let _held = sink.borrow_mut();
            bus.dispatch(&resize_event());
        }
        assert!(sink.borrow().seen.is_empty());
    }

    #[test]
    fn physical_size_scales_and_never_hits_zero() {
        assert_eq!(physical_size(Viewport::new(1280.0, 720.0), 2.0), (2560, 1440));
        assert_eq!(physical_size(Viewport::new(0.0, 0.4), 1.0), (1, 1));
    }

    #[test]
    fn css_size_stays_at_viewport_size() {
        let viewport = Viewport::new(1280.0, 720.5);
        let [width, height] = css_size(viewport);
        assert_eq!(width, ("width", "1280px".to_string()));
        assert_eq!(height, ("height", "720.5px".to_string()));
        assert_eq!(physical_size(viewport, 2.0), (2560, 1441));
    }
}
