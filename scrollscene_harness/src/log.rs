// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collects scene events for assertions.

use core::cell::RefCell;
use std::rc::Rc;

use scrollscene_core::backend::Platform;
use scrollscene_core::event::{EventKind, SceneEvent};
use scrollscene_core::scene::Scene;

/// Records every event a scene dispatches, in order.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SceneEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log listening to every event kind of `scene`.
    #[must_use]
    pub fn attach<P: Platform>(scene: &Scene<P>) -> Self {
        let log = Self::new();
        for kind in EventKind::ALL {
            let _ = scene.on(kind, log.listener());
        }
        log
    }

    /// Returns a listener that appends to this log.
    pub fn listener(&self) -> impl Fn(&SceneEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event| events.borrow_mut().push(*event)
    }

    /// Returns `(kind, progress)` for every recorded event.
    #[must_use]
    pub fn entries(&self) -> Vec<(EventKind, f64)> {
        self.events
            .borrow()
            .iter()
            .map(|e| (e.kind, e.progress))
            .collect()
    }

    /// Returns the kinds of every recorded event.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(|e| e.kind).collect()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SceneEvent> {
        self.events.borrow().clone()
    }

    /// Returns the last recorded event.
    #[must_use]
    pub fn last(&self) -> Option<SceneEvent> {
        self.events.borrow().last().copied()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<SceneEvent> {
        core::mem::take(&mut *self.events.borrow_mut())
    }
}
