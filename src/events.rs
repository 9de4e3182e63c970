//! Explicit event subscriptions.
//!
//! The effect reacts to pointer moves and viewport resizes. Instead of
//! registering anonymous callbacks nobody can remove, hosts expose an
//! [`EventSource`]: every subscription returns a [`SubscriptionId`] that can be
//! handed back to [`EventSource::unsubscribe`], so teardown is deterministic.
//!
//! [`EventBus`] is the in-process implementation used by the native host and
//! by tests. The browser host maps the same interface onto DOM listeners.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use hoverplane::{EffectEvent, EventBus, EventKind, EventSource, Vec2};
//!
//! let mut bus = EventBus::new();
//! let moves = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&moves);
//! let id = bus.subscribe(
//!     EventKind::PointerMove,
//!     Box::new(move |_: &EffectEvent| counter.set(counter.get() + 1)),
//! );
//!
//! bus.dispatch(&EffectEvent::PointerMove { client: Vec2::ZERO, at: 0.0 });
//! bus.unsubscribe(id);
//! bus.dispatch(&EffectEvent::PointerMove { client: Vec2::ZERO, at: 0.1 });
//! assert_eq!(moves.get(), 1);
//! ```

use glam::Vec2;

use crate::layout::Viewport;

/// An input the effect cares about. `at` is the host clock in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectEvent {
    /// Pointer moved to `client` (CSS pixels, viewport top-left origin).
    PointerMove { client: Vec2, at: f64 },
    /// The viewport changed size.
    Resize { viewport: Viewport, at: f64 },
    /// Scroll wheel input, in CSS pixels. Only the native scroller consumes it.
    Wheel { delta: Vec2, at: f64 },
}

impl EffectEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EffectEvent::PointerMove { .. } => EventKind::PointerMove,
            EffectEvent::Resize { .. } => EventKind::Resize,
            EffectEvent::Wheel { .. } => EventKind::Wheel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    Resize,
    Wheel,
}

/// Handle returned by [`EventSource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub type EventHandler = Box<dyn FnMut(&EffectEvent)>;

/// Something that delivers [`EffectEvent`]s to subscribers.
pub trait EventSource {
    fn subscribe(&mut self, kind: EventKind, handler: EventHandler) -> SubscriptionId;

    /// Remove a subscription. Returns `false` if it was already gone.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// A set of subscriptions that are removed together.
#[derive(Debug, Default)]
pub struct Teardown {
    subscriptions: Vec<SubscriptionId>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: SubscriptionId) {
        self.subscriptions.push(id);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Unsubscribe everything from `source`.
    pub fn run<S: EventSource + ?Sized>(&mut self, source: &mut S) {
        for id in self.subscriptions.drain(..) {
            source.unsubscribe(id);
        }
    }
}

/// Synchronous, single-threaded event dispatcher.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, EventKind, EventHandler)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `event` to every matching subscriber, in subscription order.
    pub fn dispatch(&mut self, event: &EffectEvent) {
        let kind = event.kind();
        for (_, listens_to, handler) in &mut self.listeners {
            if *listens_to == kind {
                handler(event);
            }
        }
    }
}

impl EventSource for EventBus {
    fn subscribe(&mut self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, handler));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _, _)| *listener != id);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> EventHandler {
        let log = Rc::clone(log);
        Box::new(move |_: &EffectEvent| log.borrow_mut().push(name))
    }

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::PointerMove, recorder(&log, "move"));
        bus.subscribe(EventKind::Resize, recorder(&log, "resize"));

        bus.dispatch(&EffectEvent::Resize {
            viewport: Viewport::new(800.0, 600.0),
            at: 0.0,
        });
        assert_eq!(*log.borrow(), vec!["resize"]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventKind::Wheel, Box::new(|_: &EffectEvent| {}));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn teardown_removes_every_listener() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let mut teardown = Teardown::new();
        teardown.push(bus.subscribe(EventKind::PointerMove, recorder(&log, "a")));
        teardown.push(bus.subscribe(EventKind::PointerMove, recorder(&log, "b")));
        let survivor = bus.subscribe(EventKind::PointerMove, recorder(&log, "c"));

        teardown.run(&mut bus);
        assert!(teardown.is_empty());

        bus.dispatch(&EffectEvent::PointerMove {
            client: Vec2::ZERO,
            at: 0.0,
        });
        assert_eq!(*log.borrow(), vec!["c"]);
        assert!(bus.unsubscribe(survivor));
    }
}
