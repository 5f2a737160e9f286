// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene events and a typed listener registry.
//!
//! A [`Scene`](crate::scene::Scene) emits [`SceneEvent`]s of three
//! [`EventKind`]s as its progress moves:
//!
//! | kind | emitted when |
//! |---|---|
//! | [`Enter`](EventKind::Enter) | progress leaves an edge (previous was 0 or 1) |
//! | [`Progress`](EventKind::Progress) | progress changed at all |
//! | [`Leave`](EventKind::Leave) | progress reaches an edge (next is 0 or 1) |
//!
//! [`EventDispatcher`] is generic over any [`Event`] type. It is a cheap
//! cloneable handle; listeners are `Rc` closures, and dispatch snapshots the
//! listener list before invoking anything so listeners may add or remove
//! listeners (or drive the scene) re-entrantly.

use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use core::str::FromStr;
use std::rc::{Rc, Weak};

/// The kind of a [`SceneEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Progress moved away from 0 or 1.
    Enter,
    /// Progress changed.
    Progress,
    /// Progress arrived at 0 or 1.
    Leave,
}

impl EventKind {
    /// Every kind, in dispatch order.
    pub const ALL: [Self; 3] = [Self::Enter, Self::Progress, Self::Leave];

    /// Returns the lowercase event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Progress => "progress",
            Self::Leave => "leave",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind {
                name: s.to_owned(),
            })
    }
}

impl TryFrom<&str> for EventKind {
    type Error = UnknownEventKind;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An event name that is not `enter`, `progress` or `leave`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEventKind {
    /// The name as given.
    pub name: String,
}

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event kind `{}` (expected `enter`, `progress` or `leave`)",
            self.name
        )
    }
}

impl core::error::Error for UnknownEventKind {}

/// Anything that names an [`EventKind`]: the kind itself or its string name.
pub trait IntoEventKind {
    /// Resolves the kind.
    fn into_event_kind(self) -> Result<EventKind, UnknownEventKind>;
}

impl IntoEventKind for EventKind {
    fn into_event_kind(self) -> Result<EventKind, UnknownEventKind> {
        Ok(self)
    }
}

impl IntoEventKind for &str {
    fn into_event_kind(self) -> Result<EventKind, UnknownEventKind> {
        self.parse()
    }
}

/// Which way progress moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards 1.
    Forward,
    /// Towards 0.
    Reverse,
}

impl Direction {
    /// `Forward` for a positive delta, `Reverse` otherwise.
    #[inline]
    #[must_use]
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Forward
        } else {
            Self::Reverse
        }
    }
}

/// A progress notification from a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEvent {
    /// What happened.
    pub kind: EventKind,
    /// Progress after the change, in `[0, 1]`.
    pub progress: f64,
    /// Signed change; never zero.
    pub delta: f64,
    /// Sign of `delta`.
    pub direction: Direction,
}

impl SceneEvent {
    /// Builds an event, deriving the direction from `delta`.
    #[must_use]
    pub fn new(kind: EventKind, progress: f64, delta: f64) -> Self {
        Self {
            kind,
            progress,
            delta,
            direction: Direction::of(delta),
        }
    }
}

/// An event routed by kind.
pub trait Event {
    /// Routing key.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// Returns the routing key of this event.
    fn kind(&self) -> Self::Kind;
}

impl Event for SceneEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Identifies a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct Registry<E: Event> {
    next_id: u64,
    listeners: Vec<(ListenerId, E::Kind, Listener<E>)>,
}

/// A kind-keyed listener registry.
pub struct EventDispatcher<E: Event> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: Event> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: Event> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<E: Event> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventDispatcher")
            .field(
                "listeners",
                &registry
                    .listeners
                    .iter()
                    .map(|(id, kind, _)| (id, kind))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<E: Event + 'static> EventDispatcher<E> {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`.
    pub fn add_listener(&self, kind: E::Kind, listener: impl Fn(&E) + 'static) -> ListenerId {
        let mut registry = self.registry.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((id, kind, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|(other, _, _)| *other != id);
        registry.listeners.len() != before
    }

    /// Removes every listener for `kind`, returning how many were removed.
    pub fn remove_kind(&self, kind: E::Kind) -> usize {
        let mut registry = self.registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|(_, other, _)| *other != kind);
        before - registry.listeners.len()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.registry.borrow_mut().listeners.clear();
    }

    /// Returns the number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|(_, other, _)| *other == kind)
            .count()
    }

    /// Invokes every listener registered for the event's kind, in
    /// registration order.
    ///
    /// Listeners registered or removed during dispatch take effect from the
    /// next dispatch on.
    pub fn dispatch(&self, event: &E) {
        let kind = event.kind();
        let listeners: Vec<Listener<E>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|(_, other, _)| *other == kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Registers `listener` and returns a handle that removes it.
    pub fn subscribe(&self, kind: E::Kind, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = self.add_listener(kind, listener);
        let registry: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry
                        .borrow_mut()
                        .listeners
                        .retain(|(other, _, _)| *other != id);
                }
            })),
        }
    }
}

/// Handle returned by [`EventDispatcher::subscribe`].
///
/// The listener stays registered until [`unsubscribe`](Self::unsubscribe) is
/// called; dropping the handle does not remove it.
#[must_use = "dropping a Subscription leaves the listener registered"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

impl Subscription {
    /// Removes the listener. A no-op if the dispatcher is gone.
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    #[test]
    fn kinds_parse_from_names() {
        assert_eq!("enter".parse::<EventKind>(), Ok(EventKind::Enter));
        assert_eq!(EventKind::try_from("leave"), Ok(EventKind::Leave));
        let err = "scroll".parse::<EventKind>().unwrap_err();
        assert_eq!(err.name, "scroll");
        assert!(err.to_string().contains("`scroll`"));
        assert_eq!("progress".into_event_kind(), Ok(EventKind::Progress));
    }

    #[test]
    fn direction_follows_delta_sign() {
        assert_eq!(SceneEvent::new(EventKind::Progress, 0.5, 0.1).direction, Direction::Forward);
        assert_eq!(SceneEvent::new(EventKind::Progress, 0.4, -0.1).direction, Direction::Reverse);
    }

    #[test]
    fn dispatch_routes_by_kind_in_registration_order() {
        let dispatcher = EventDispatcher::<SceneEvent>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            dispatcher.add_listener(EventKind::Progress, move |e| {
                log.borrow_mut().push((tag, e.progress));
            });
        }
        let leave_log = Rc::clone(&log);
        dispatcher.add_listener(EventKind::Leave, move |_| leave_log.borrow_mut().push(("leave", 0.0)));

        dispatcher.dispatch(&SceneEvent::new(EventKind::Progress, 0.25, 0.25));
        assert_eq!(*log.borrow(), [("a", 0.25), ("b", 0.25)]);
        assert_eq!(dispatcher.listener_count(EventKind::Progress), 2);
        assert_eq!(dispatcher.listener_count(EventKind::Enter), 0);
    }

    #[test]
    fn remove_and_unsubscribe() {
        let dispatcher = EventDispatcher::<SceneEvent>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = dispatcher.add_listener(EventKind::Enter, move |_| h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        let sub = dispatcher.subscribe(EventKind::Enter, move |_| h.set(h.get() + 10));

        let event = SceneEvent::new(EventKind::Enter, 0.1, 0.1);
        dispatcher.dispatch(&event);
        assert_eq!(hits.get(), 11);

        assert!(dispatcher.remove_listener(id));
        assert!(!dispatcher.remove_listener(id));
        sub.unsubscribe();
        dispatcher.dispatch(&event);
        assert_eq!(hits.get(), 11);
    }

    #[test]
    fn listeners_may_mutate_registry_during_dispatch() {
        let dispatcher = EventDispatcher::<SceneEvent>::new();
        let inner = dispatcher.clone();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        dispatcher.add_listener(EventKind::Progress, move |_| {
            h.set(h.get() + 1);
            inner.remove_kind(EventKind::Progress);
        });
        let event = SceneEvent::new(EventKind::Progress, 0.5, 0.5);
        dispatcher.dispatch(&event);
        dispatcher.dispatch(&event);
        assert_eq!(hits.get(), 1);
    }
}
