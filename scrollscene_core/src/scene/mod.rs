// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene controller.
//!
//! A [`Scene`] tracks one element through a trigger region of a scroll
//! container and reports a progress value in `[0, 1]`.
//!
//! # Data flow
//!
//! ```text
//! modify(partial) ──▶ process ──▶ diff ──▶ ReactionGraph ──▶ reaction pass
//!                                                             │
//!   container resize/scroll ─┐                                ▼
//!   element resize (throttled)├──▶ ExecutionQueue ──frame──▶ SceneTask
//!   intersection change ─────┘                                │
//!                                                             ▼
//!                                            progress ──▶ enter/progress/leave
//! ```
//!
//! Option changes are applied synchronously: [`Scene::modify`] resolves the
//! new options, diffs them against the previous snapshot and runs one
//! reaction pass for the changed fields. Platform notifications only
//! schedule [`SceneTask`]s; the queue runs them once per frame in FIFO
//! order, or immediately through [`Scene::flush_now`].
//!
//! # Re-entrancy
//!
//! No internal borrow is held while listeners run, so listeners may read or
//! modify the scene. Platform callbacks hold weak references and become
//! no-ops once the scene is destroyed or dropped.

mod progress;
mod task;

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

pub use progress::{TriggerBounds, compute_progress, edges};
pub use task::SceneTask;

use crate::backend::{
    Container, ContainerEvent, Platform, ResizeObserver, ViewportConfig, ViewportObserver,
};
use crate::defaults::{self, DefaultOptions};
use crate::dirty::ReactionGraph;
use crate::event::{
    EventDispatcher, IntoEventKind, ListenerId, SceneEvent, Subscription, UnknownEventKind,
};
use crate::options::{
    self, Extent, FieldSet, PartialOptions, PrivateOptions, PublicOptions, ScrollParent,
};
use crate::queue::{ExecutionQueue, Scheduled};
use crate::throttle::Throttle;
use crate::time::HostTime;
use crate::trace::{
    ActiveChangedEvent, FlushEvent, FlushMode, OptionsChangedEvent, ProgressEvent,
    TaskScheduledEvent, TraceSink, Tracer,
};

/// Absolute scroll positions at which progress is 0 and 1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffset {
    /// Scroll position where progress is 0.
    pub start: f64,
    /// Scroll position where progress is 1.
    pub end: f64,
}

#[derive(Debug, Default)]
struct State {
    trigger_bounds: TriggerBounds,
    progress: f64,
    active: Option<bool>,
    destroyed: bool,
}

struct Inner<P: Platform> {
    platform: P,
    public: RefCell<PublicOptions<P::Element>>,
    private: RefCell<PrivateOptions<P::Element>>,
    configured: Cell<bool>,
    state: RefCell<State>,
    queue: RefCell<ExecutionQueue<SceneTask, Scene<P>>>,
    dispatcher: EventDispatcher<SceneEvent>,
    reactions: RefCell<ReactionGraph>,
    container: RefCell<P::Container>,
    viewport: RefCell<P::Viewport>,
    viewport_config: RefCell<Option<ViewportConfig<P::Element>>>,
    resize: RefCell<P::Resize>,
    element_resize: Throttle<()>,
    trace: RefCell<Option<Box<dyn TraceSink>>>,
}

impl<P: Platform> Drop for Inner<P> {
    fn drop(&mut self) {
        self.queue.get_mut().clear();
        self.container.get_mut().detach();
        self.viewport.get_mut().disconnect();
        self.resize.get_mut().disconnect();
    }
}

/// A scroll-linked progress tracker.
///
/// `Scene` is a cheap handle; clones share the same controller. The
/// controller lives until the last handle is dropped or
/// [`destroy`](Self::destroy) is called.
pub struct Scene<P: Platform> {
    inner: Rc<Inner<P>>,
}

impl<P: Platform> Clone for Scene<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: Platform> fmt::Debug for Scene<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Scene")
            .field("options", &*self.inner.public.borrow())
            .field("trigger_bounds", &state.trigger_bounds)
            .field("progress", &state.progress)
            .field("active", &state.active)
            .field("destroyed", &state.destroyed)
            .finish_non_exhaustive()
    }
}

impl<P: Platform> Scene<P> {
    /// Creates a scene from the process-wide defaults with `options` merged
    /// on top, and runs the initial reaction pass.
    pub fn new(platform: P, options: PartialOptions<P::Element>) -> Self {
        let public = PublicOptions::from_defaults(&defaults::defaults());
        let private = options::process(&public, PartialOptions::new(), None).private;
        let frames = platform.frames();

        let inner = Rc::new_cyclic(|weak: &Weak<Inner<P>>| {
            let wake = {
                let weak = weak.clone();
                move |now: HostTime| {
                    if let Some(scene) = Self::upgrade(&weak) {
                        scene.flush(FlushMode::Frame, Some(now));
                    }
                }
            };
            let element_resize = {
                let weak = weak.clone();
                Throttle::new(Rc::clone(&frames), move |()| {
                    if let Some(scene) = Self::upgrade(&weak) {
                        scene.on_element_resize();
                    }
                })
            };
            let viewport = {
                let weak = weak.clone();
                platform.viewport_observer(Box::new(move |intersecting, target| {
                    if let Some(scene) = Self::upgrade(&weak) {
                        scene.on_intersection(intersecting, target);
                    }
                }))
            };
            let resize = {
                let weak = weak.clone();
                platform.resize_observer(Box::new(move || {
                    if let Some(scene) = Self::upgrade(&weak) {
                        scene.inner.element_resize.call(());
                    }
                }))
            };
            Inner {
                container: RefCell::new(platform.container()),
                platform,
                public: RefCell::new(public),
                private: RefCell::new(private),
                configured: Cell::new(false),
                state: RefCell::new(State::default()),
                queue: RefCell::new(ExecutionQueue::new(frames, wake)),
                dispatcher: EventDispatcher::new(),
                reactions: RefCell::new(ReactionGraph::new()),
                viewport: RefCell::new(viewport),
                viewport_config: RefCell::new(None),
                resize: RefCell::new(resize),
                element_resize,
                trace: RefCell::new(None),
            }
        });

        let scene = Self { inner };
        scene.modify(options);
        scene
    }

    fn upgrade(weak: &Weak<Inner<P>>) -> Option<Self> {
        let inner = weak.upgrade()?;
        if inner.state.borrow().destroyed {
            return None;
        }
        Some(Self { inner })
    }

    /// Returns the platform the scene was created with.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.inner.platform
    }

    // -- configuration -----------------------------------------------------

    /// Applies a partial option update.
    ///
    /// Values are sanitized and merged; if no resolved field changed the call
    /// has no effect at all. Otherwise derived state reacts synchronously and
    /// a progress update is scheduled.
    pub fn modify(&self, partial: PartialOptions<P::Element>) -> &Self {
        if self.is_destroyed() {
            return self;
        }
        let processed = {
            let public = self.inner.public.borrow();
            let private = self.inner.private.borrow();
            let previous = self.inner.configured.get().then_some(&*private);
            options::process(&public, partial, previous)
        };
        self.trace(|t| {
            for correction in &processed.corrections {
                t.option_corrected(correction);
            }
        });

        let changed = {
            let private = self.inner.private.borrow();
            let previous = self.inner.configured.get().then_some(&*private);
            options::diff(previous, &processed.private)
        };
        if changed.is_empty() {
            return self;
        }

        *self.inner.public.borrow_mut() = processed.public;
        *self.inner.private.borrow_mut() = processed.private;
        self.inner.configured.set(true);
        self.trace(|t| t.options_changed(&OptionsChangedEvent { changed }));
        self.react(changed);
        self
    }

    fn react(&self, changed: FieldSet) {
        let reactions = self.inner.reactions.borrow_mut().react(changed);
        if reactions.trigger_bounds {
            self.update_trigger_bounds();
        }
        if reactions.observed_element {
            self.reattach_observers();
        }
        if reactions.container {
            self.reattach_container();
        }
        if reactions.viewport_margin {
            self.update_viewport_observer();
        }
        self.schedule(SceneTask::UpdateProgress);
    }

    /// Returns the tracked element.
    #[must_use]
    pub fn element(&self) -> Option<P::Element> {
        self.inner.public.borrow().element.clone()
    }

    /// Sets or clears the tracked element.
    pub fn set_element(&self, element: Option<P::Element>) -> &Self {
        self.modify(PartialOptions {
            element: Some(element),
            ..PartialOptions::new()
        })
    }

    /// Returns the scroll container.
    #[must_use]
    pub fn scroll_parent(&self) -> ScrollParent<P::Element> {
        self.inner.public.borrow().scroll_parent.clone()
    }

    /// Sets the scroll container.
    pub fn set_scroll_parent(&self, scroll_parent: ScrollParent<P::Element>) -> &Self {
        self.modify(PartialOptions::new().scroll_parent(scroll_parent))
    }

    /// Returns `true` when tracking vertical scrolling.
    #[must_use]
    pub fn vertical(&self) -> bool {
        self.inner.public.borrow().vertical
    }

    /// Selects vertical or horizontal tracking.
    pub fn set_vertical(&self, vertical: bool) -> &Self {
        self.modify(PartialOptions::new().vertical(vertical))
    }

    /// Returns the track start fraction.
    #[must_use]
    pub fn track_start(&self) -> f64 {
        self.inner.public.borrow().track_start
    }

    /// Sets the track start fraction.
    pub fn set_track_start(&self, track_start: f64) -> &Self {
        self.modify(PartialOptions::new().track_start(track_start))
    }

    /// Returns the track end fraction.
    #[must_use]
    pub fn track_end(&self) -> f64 {
        self.inner.public.borrow().track_end
    }

    /// Sets the track end fraction.
    pub fn set_track_end(&self, track_end: f64) -> &Self {
        self.modify(PartialOptions::new().track_end(track_end))
    }

    /// Returns the trigger offset.
    #[must_use]
    pub fn offset(&self) -> Extent {
        self.inner.public.borrow().offset.clone()
    }

    /// Sets the trigger offset.
    pub fn set_offset(&self, offset: impl Into<Extent>) -> &Self {
        self.modify(PartialOptions::new().offset(offset))
    }

    /// Returns the trigger size.
    #[must_use]
    pub fn size(&self) -> Extent {
        self.inner.public.borrow().size.clone()
    }

    /// Sets the trigger size.
    pub fn set_size(&self, size: impl Into<Extent>) -> &Self {
        self.modify(PartialOptions::new().size(size))
    }

    /// Returns the resolved options the scene computes with.
    #[must_use]
    pub fn computed_options(&self) -> PrivateOptions<P::Element> {
        self.inner.private.borrow().clone()
    }

    /// Returns the public view of the current options.
    #[must_use]
    pub fn options(&self) -> PublicOptions<P::Element> {
        options::output(&self.inner.private.borrow())
    }

    /// Reads or updates the process-wide defaults.
    ///
    /// With `Some(partial)`, the update is sanitized and merged into the
    /// defaults. Either way the current defaults are returned. Existing
    /// scenes are not affected.
    pub fn default_options(partial: Option<PartialOptions<P::Element>>) -> DefaultOptions {
        match partial {
            Some(partial) => defaults::set_defaults(partial),
            None => defaults::defaults(),
        }
    }

    // -- state -------------------------------------------------------------

    /// Returns the current progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.inner.state.borrow().progress
    }

    /// Returns the current trigger bounds.
    #[must_use]
    pub fn trigger_bounds(&self) -> TriggerBounds {
        self.inner.state.borrow().trigger_bounds
    }

    /// Returns whether the element intersects the margin-expanded viewport;
    /// `None` while unknown.
    #[must_use]
    pub fn active(&self) -> Option<bool> {
        self.inner.state.borrow().active
    }

    /// Returns `true` once [`destroy`](Self::destroy) was called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.state.borrow().destroyed
    }

    /// Computes the absolute scroll positions at which progress is 0 and 1,
    /// from the current layout. `None` without an element.
    #[must_use]
    pub fn scroll_offset(&self) -> Option<ScrollOffset> {
        let private = self.inner.private.borrow();
        let element = private.element.as_ref()?;
        let bounds = self.trigger_bounds();
        let span = private.axis.span(self.inner.platform.element_rect(element));
        let container = private
            .axis
            .container(&self.inner.container.borrow().rect());
        let absolute = span.start - container.start + container.scroll_position;
        Some(ScrollOffset {
            start: absolute + bounds.start - private.track_start * container.client_size,
            end: absolute + bounds.end - private.track_end * container.client_size,
        })
    }

    // -- events ------------------------------------------------------------

    /// Registers a listener for `kind` (an [`EventKind`](crate::event::EventKind)
    /// or its name).
    pub fn on(
        &self,
        kind: impl IntoEventKind,
        listener: impl Fn(&SceneEvent) + 'static,
    ) -> Result<ListenerId, UnknownEventKind> {
        let kind = kind.into_event_kind()?;
        Ok(self.inner.dispatcher.add_listener(kind, listener))
    }

    /// Removes one listener, or every listener of `kind` when `id` is
    /// `None`. Returns how many listeners were removed.
    pub fn off(
        &self,
        kind: impl IntoEventKind,
        id: Option<ListenerId>,
    ) -> Result<usize, UnknownEventKind> {
        let kind = kind.into_event_kind()?;
        Ok(match id {
            Some(id) => usize::from(self.inner.dispatcher.remove_listener(id)),
            None => self.inner.dispatcher.remove_kind(kind),
        })
    }

    /// Registers a listener and returns a handle that removes it.
    pub fn subscribe(
        &self,
        kind: impl IntoEventKind,
        listener: impl Fn(&SceneEvent) + 'static,
    ) -> Result<Subscription, UnknownEventKind> {
        let kind = kind.into_event_kind()?;
        Ok(self.inner.dispatcher.subscribe(kind, listener))
    }

    // -- scheduling --------------------------------------------------------

    /// Runs pending tasks now instead of on the next frame.
    pub fn flush_now(&self) {
        self.flush(FlushMode::Immediate, None);
    }

    fn flush(&self, mode: FlushMode, timestamp: Option<HostTime>) {
        if self.is_destroyed() {
            return;
        }
        let batch = self.inner.queue.borrow_mut().take();
        if batch.is_empty() {
            return;
        }
        let stats = batch.run(self);
        if self.is_destroyed() {
            return;
        }
        self.trace(|t| {
            t.flush(&FlushEvent {
                mode,
                timestamp,
                ran: stats.ran,
                skipped: stats.skipped,
            });
        });
    }

    fn schedule(&self, task: SceneTask) {
        let scheduled = self.inner.queue.borrow_mut().schedule(task);
        self.trace_scheduled(task, scheduled);
    }

    fn schedule_if(&self, task: SceneTask, condition: impl Fn(&Self) -> bool + 'static) {
        let scheduled = self.inner.queue.borrow_mut().schedule_if(task, condition);
        self.trace_scheduled(task, scheduled);
    }

    fn trace_scheduled(&self, task: SceneTask, scheduled: Scheduled) {
        self.trace(|t| {
            t.task_scheduled(&TaskScheduledEvent {
                task,
                merged: scheduled == Scheduled::Merged,
            });
        });
    }

    // -- platform notifications --------------------------------------------

    fn on_element_resize(&self) {
        let before = self.trigger_bounds();
        self.schedule(SceneTask::UpdateTriggerBounds);
        self.schedule_if(SceneTask::UpdateViewportObserver, move |scene| {
            scene.trigger_bounds() != before
        });
        self.schedule(SceneTask::UpdateProgress);
    }

    fn on_container_event(&self, event: ContainerEvent) {
        if event == ContainerEvent::Resize {
            self.schedule(SceneTask::UpdateViewportObserver);
        }
        self.schedule(SceneTask::UpdateProgress);
    }

    fn on_intersection(&self, intersecting: bool, target: &P::Element) {
        if self.inner.private.borrow().element.as_ref() != Some(target) {
            return;
        }
        self.schedule(SceneTask::UpdateProgress);
        if !intersecting {
            // Settle progress at the edge while still active.
            self.flush_now();
        }
        self.set_active(Some(intersecting));
    }

    // -- derived state -----------------------------------------------------

    fn update_trigger_bounds(&self) {
        let bounds = {
            let private = self.inner.private.borrow();
            match &private.element {
                Some(element) => {
                    let span = private.axis.span(self.inner.platform.element_rect(element));
                    TriggerBounds::resolve(span.size, &private.offset, &private.size)
                }
                None => TriggerBounds::default(),
            }
        };
        self.inner.state.borrow_mut().trigger_bounds = bounds;
    }

    fn reattach_observers(&self) {
        let element = self.inner.private.borrow().element.clone();
        let mut viewport = self.inner.viewport.borrow_mut();
        let mut resize = self.inner.resize.borrow_mut();
        viewport.disconnect();
        resize.disconnect();
        if let Some(element) = element {
            viewport.observe(&element);
            resize.observe(&element);
        }
    }

    fn reattach_container(&self) {
        let target = self.inner.private.borrow().container.clone();
        let weak = Rc::downgrade(&self.inner);
        self.inner.container.borrow_mut().attach(
            &target,
            Box::new(move |event| {
                if let Some(scene) = Self::upgrade(&weak) {
                    scene.on_container_event(event);
                }
            }),
        );
        self.set_active(None);
    }

    fn update_viewport_observer(&self) {
        let config = {
            let private = self.inner.private.borrow();
            let container = private
                .axis
                .container(&self.inner.container.borrow().rect());
            ViewportConfig {
                root: private.container.element().cloned(),
                margin: self.trigger_bounds().viewport_margin(
                    private.axis,
                    private.track_start,
                    private.track_end,
                    container.client_size,
                ),
            }
        };
        {
            let mut applied = self.inner.viewport_config.borrow_mut();
            if applied.as_ref() == Some(&config) {
                return;
            }
            *applied = Some(config.clone());
        }
        self.inner.viewport.borrow_mut().modify(config);
    }

    fn update_progress(&self) {
        let next = {
            let state = self.inner.state.borrow();
            if state.destroyed || state.active != Some(true) {
                return;
            }
            let private = self.inner.private.borrow();
            let Some(element) = &private.element else {
                return;
            };
            let span = private.axis.span(self.inner.platform.element_rect(element));
            let container = private
                .axis
                .container(&self.inner.container.borrow().rect());
            compute_progress(
                &state.trigger_bounds,
                span.start - container.start,
                container.client_size,
                private.track_start,
                private.track_end,
            )
        };
        if let Some(next) = next {
            self.set_progress(next);
        }
    }

    fn set_progress(&self, next: f64) {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            let previous = state.progress;
            if previous == next {
                return;
            }
            state.progress = next;
            previous
        };
        self.trace(|t| t.progress(&ProgressEvent { previous, next }));
        for kind in edges(previous, next) {
            self.inner
                .dispatcher
                .dispatch(&SceneEvent::new(kind, next, next - previous));
        }
    }

    fn set_active(&self, next: Option<bool>) {
        let previous = core::mem::replace(&mut self.inner.state.borrow_mut().active, next);
        if previous != next {
            self.trace(|t| t.active_changed(&ActiveChangedEvent { previous, next }));
        }
    }

    // -- teardown ----------------------------------------------------------

    /// Tears the scene down: pending work is dropped, observers are
    /// disconnected, the container is detached and all listeners are
    /// removed. Later calls and platform callbacks are no-ops.
    pub fn destroy(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
        }
        self.inner.queue.borrow_mut().clear();
        self.inner.element_resize.cancel();
        self.inner.container.borrow_mut().detach();
        self.inner.viewport.borrow_mut().disconnect();
        self.inner.resize.borrow_mut().disconnect();
        self.inner.dispatcher.clear();
        self.trace(|t| t.destroyed());
    }

    // -- diagnostics -------------------------------------------------------

    /// Installs (or with `None`, removes) the trace sink.
    ///
    /// Events are only delivered when the `trace` feature is enabled.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink>>) {
        *self.inner.trace.borrow_mut() = sink;
    }

    fn trace(&self, f: impl FnOnce(&mut Tracer<'_>)) {
        let mut slot = self.inner.trace.borrow_mut();
        match slot.as_deref_mut() {
            Some(sink) => f(&mut Tracer::new(sink)),
            None => f(&mut Tracer::none()),
        }
    }
}
