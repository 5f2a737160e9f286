// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for scrollscene
//! diagnostics.
//!
//! This crate provides [`TraceSink`](scrollscene_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording of every event as a
//!   [`recorder::RecordedEvent`].
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from a
//!   recording.
//!
//! Sinks are attached with
//! [`Scene::set_trace_sink`](scrollscene_core::scene::Scene::set_trace_sink).
//! Wrap a sink in `Rc<RefCell<_>>` to keep a handle for inspection.

pub mod chrome;
pub mod pretty;
pub mod recorder;

use scrollscene_core::scene::SceneTask;
use scrollscene_core::trace::FlushMode;

pub(crate) fn task_name(task: SceneTask) -> &'static str {
    match task {
        SceneTask::UpdateTriggerBounds => "update_trigger_bounds",
        SceneTask::UpdateViewportObserver => "update_viewport_observer",
        SceneTask::UpdateProgress => "update_progress",
    }
}

pub(crate) fn flush_mode_name(mode: FlushMode) -> &'static str {
    match mode {
        FlushMode::Frame => "frame",
        FlushMode::Immediate => "immediate",
    }
}
