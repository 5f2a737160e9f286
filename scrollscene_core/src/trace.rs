// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the scene controller.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! scene calls as options change, tasks are scheduled and flushed, and
//! progress moves. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use core::cell::RefCell;
use std::rc::Rc;

use crate::options::{Correction, FieldSet};
use crate::scene::SceneTask;
use crate::time::HostTime;

/// How a batch of tasks was flushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlushMode {
    /// From the frame callback.
    Frame,
    /// Promoted and run synchronously.
    Immediate,
}

/// Emitted after a `modify` call changed at least one field.
#[derive(Clone, Copy, Debug)]
pub struct OptionsChangedEvent {
    /// Fields whose resolved value changed.
    pub changed: FieldSet,
}

/// Emitted for each task schedule.
#[derive(Clone, Copy, Debug)]
pub struct TaskScheduledEvent {
    /// The scheduled task.
    pub task: SceneTask,
    /// `true` if the task was already pending.
    pub merged: bool,
}

/// Emitted after a batch of tasks ran.
#[derive(Clone, Copy, Debug)]
pub struct FlushEvent {
    /// Frame or immediate flush.
    pub mode: FlushMode,
    /// Frame time for [`FlushMode::Frame`].
    pub timestamp: Option<HostTime>,
    /// Tasks that ran.
    pub ran: u32,
    /// Tasks dropped by their condition.
    pub skipped: u32,
}

/// Emitted when a new progress value is committed.
#[derive(Clone, Copy, Debug)]
pub struct ProgressEvent {
    /// Progress before the update.
    pub previous: f64,
    /// Progress after the update.
    pub next: f64,
}

/// Emitted when the active flag changes.
#[derive(Clone, Copy, Debug)]
pub struct ActiveChangedEvent {
    /// Flag before the change.
    pub previous: Option<bool>,
    /// Flag after the change.
    pub next: Option<bool>,
}

/// Receives trace events from a scene.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after options changed.
    fn on_options_changed(&mut self, e: &OptionsChangedEvent) {
        _ = e;
    }

    /// Called for every value corrected by sanitization.
    fn on_option_corrected(&mut self, c: &Correction) {
        _ = c;
    }

    /// Called when a task is scheduled.
    fn on_task_scheduled(&mut self, e: &TaskScheduledEvent) {
        _ = e;
    }

    /// Called after a batch flush.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called when progress is committed.
    fn on_progress(&mut self, e: &ProgressEvent) {
        _ = e;
    }

    /// Called when the active flag changes.
    fn on_active_changed(&mut self, e: &ActiveChangedEvent) {
        _ = e;
    }

    /// Called once when the scene is destroyed.
    fn on_destroyed(&mut self) {}
}

/// Shares a sink between a scene and the code that inspects it.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_options_changed(&mut self, e: &OptionsChangedEvent) {
        self.borrow_mut().on_options_changed(e);
    }

    fn on_option_corrected(&mut self, c: &Correction) {
        self.borrow_mut().on_option_corrected(c);
    }

    fn on_task_scheduled(&mut self, e: &TaskScheduledEvent) {
        self.borrow_mut().on_task_scheduled(e);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.borrow_mut().on_flush(e);
    }

    fn on_progress(&mut self, e: &ProgressEvent) {
        self.borrow_mut().on_progress(e);
    }

    fn on_active_changed(&mut self, e: &ActiveChangedEvent) {
        self.borrow_mut().on_active_changed(e);
    }

    fn on_destroyed(&mut self) {
        self.borrow_mut().on_destroyed();
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`OptionsChangedEvent`].
    #[inline]
    pub fn options_changed(&mut self, e: &OptionsChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_options_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`Correction`].
    #[inline]
    pub fn option_corrected(&mut self, c: &Correction) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_option_corrected(c);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = c;
        }
    }

    /// Emits a [`TaskScheduledEvent`].
    #[inline]
    pub fn task_scheduled(&mut self, e: &TaskScheduledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_task_scheduled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushEvent`].
    #[inline]
    pub fn flush(&mut self, e: &FlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ProgressEvent`].
    #[inline]
    pub fn progress(&mut self, e: &ProgressEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_progress(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ActiveChangedEvent`].
    #[inline]
    pub fn active_changed(&mut self, e: &ActiveChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_active_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Signals destruction.
    #[inline]
    pub fn destroyed(&mut self) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_destroyed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CorrectionKind, Field};

    #[derive(Default)]
    struct Counting {
        progress: u32,
        destroyed: bool,
    }

    impl TraceSink for Counting {
        fn on_progress(&mut self, _e: &ProgressEvent) {
            self.progress += 1;
        }

        fn on_destroyed(&mut self) {
            self.destroyed = true;
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_options_changed(&OptionsChangedEvent {
            changed: FieldSet::ALL,
        });
        sink.on_option_corrected(&Correction {
            field: Field::TrackStart,
            kind: CorrectionKind::Rejected,
        });
        sink.on_flush(&FlushEvent {
            mode: FlushMode::Immediate,
            timestamp: None,
            ran: 1,
            skipped: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.progress(&ProgressEvent {
            previous: 0.0,
            next: 0.5,
        });
        tracer.destroyed();
    }

    #[test]
    fn tracer_dispatches_only_with_feature() {
        let mut sink = Counting::default();
        {
            let mut tracer = Tracer::new(&mut sink);
            tracer.progress(&ProgressEvent {
                previous: 0.0,
                next: 0.5,
            });
            tracer.destroyed();
        }
        if cfg!(feature = "trace") {
            assert_eq!(sink.progress, 1);
            assert!(sink.destroyed);
        } else {
            assert_eq!(sink.progress, 0);
            assert!(!sink.destroyed);
        }
    }
}
