// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and stores every event, in
//! arrival order, as a [`RecordedEvent`]. Recordings are inspected directly in
//! tests or exported with [`chrome::export`](crate::chrome::export).

use scrollscene_core::options::{Correction, FieldSet};
use scrollscene_core::scene::SceneTask;
use scrollscene_core::time::HostTime;
use scrollscene_core::trace::{
    ActiveChangedEvent, FlushEvent, FlushMode, OptionsChangedEvent, ProgressEvent,
    TaskScheduledEvent, TraceSink,
};

/// A single recorded trace event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// Options changed.
    OptionsChanged {
        /// Fields whose resolved value changed.
        changed: FieldSet,
    },
    /// A value was corrected by sanitization.
    OptionCorrected(Correction),
    /// A task was scheduled.
    TaskScheduled {
        /// The task.
        task: SceneTask,
        /// `true` if it merged into a pending entry.
        merged: bool,
    },
    /// A batch of tasks ran.
    Flush {
        /// Frame or immediate.
        mode: FlushMode,
        /// Frame time, for frame flushes.
        timestamp: Option<HostTime>,
        /// Tasks that ran.
        ran: u32,
        /// Tasks dropped by their condition.
        skipped: u32,
    },
    /// Progress was committed.
    Progress {
        /// Value before.
        previous: f64,
        /// Value after.
        next: f64,
    },
    /// The active flag changed.
    ActiveChanged {
        /// Flag before.
        previous: Option<bool>,
        /// Flag after.
        next: Option<bool>,
    },
    /// The scene was destroyed.
    Destroyed,
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the committed progress values, in order.
    pub fn progress_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::Progress { next, .. } => Some(*next),
            _ => None,
        })
    }

    /// Returns the scheduled tasks that were newly queued, in order.
    pub fn queued_tasks(&self) -> impl Iterator<Item = SceneTask> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::TaskScheduled {
                task,
                merged: false,
            } => Some(*task),
            _ => None,
        })
    }
}

impl TraceSink for RecorderSink {
    fn on_options_changed(&mut self, e: &OptionsChangedEvent) {
        self.events
            .push(RecordedEvent::OptionsChanged { changed: e.changed });
    }

    fn on_option_corrected(&mut self, c: &Correction) {
        self.events.push(RecordedEvent::OptionCorrected(*c));
    }

    fn on_task_scheduled(&mut self, e: &TaskScheduledEvent) {
        self.events.push(RecordedEvent::TaskScheduled {
            task: e.task,
            merged: e.merged,
        });
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.events.push(RecordedEvent::Flush {
            mode: e.mode,
            timestamp: e.timestamp,
            ran: e.ran,
            skipped: e.skipped,
        });
    }

    fn on_progress(&mut self, e: &ProgressEvent) {
        self.events.push(RecordedEvent::Progress {
            previous: e.previous,
            next: e.next,
        });
    }

    fn on_active_changed(&mut self, e: &ActiveChangedEvent) {
        self.events.push(RecordedEvent::ActiveChanged {
            previous: e.previous,
            next: e.next,
        });
    }

    fn on_destroyed(&mut self) {
        self.events.push(RecordedEvent::Destroyed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollscene_core::options::{CorrectionKind, Field};

    #[test]
    fn records_in_arrival_order() {
        let mut rec = RecorderSink::new();
        rec.on_task_scheduled(&TaskScheduledEvent {
            task: SceneTask::UpdateTriggerBounds,
            merged: false,
        });
        rec.on_task_scheduled(&TaskScheduledEvent {
            task: SceneTask::UpdateProgress,
            merged: false,
        });
        rec.on_task_scheduled(&TaskScheduledEvent {
            task: SceneTask::UpdateProgress,
            merged: true,
        });
        rec.on_progress(&ProgressEvent {
            previous: 0.0,
            next: 0.25,
        });
        rec.on_flush(&FlushEvent {
            mode: FlushMode::Frame,
            timestamp: Some(HostTime(100)),
            ran: 2,
            skipped: 0,
        });
        rec.on_destroyed();

        assert_eq!(rec.len(), 6);
        assert_eq!(
            rec.queued_tasks().collect::<Vec<_>>(),
            [SceneTask::UpdateTriggerBounds, SceneTask::UpdateProgress]
        );
        assert_eq!(rec.progress_values().collect::<Vec<_>>(), [0.25]);
        assert_eq!(
            rec.events()[4],
            RecordedEvent::Flush {
                mode: FlushMode::Frame,
                timestamp: Some(HostTime(100)),
                ran: 2,
                skipped: 0,
            }
        );
        assert_eq!(rec.events().last(), Some(&RecordedEvent::Destroyed));
    }

    #[test]
    fn keeps_corrections_and_field_sets() {
        let mut rec = RecorderSink::new();
        let correction = Correction {
            field: Field::TrackStart,
            kind: CorrectionKind::Clamped { from: 1.5, to: 1.0 },
        };
        rec.on_option_corrected(&correction);
        rec.on_options_changed(&OptionsChangedEvent {
            changed: FieldSet::EMPTY.with(Field::Offset),
        });
        rec.on_active_changed(&ActiveChangedEvent {
            previous: Some(true),
            next: Some(false),
        });

        let events = rec.clone().into_events();
        assert_eq!(events[0], RecordedEvent::OptionCorrected(correction));
        match events[1] {
            RecordedEvent::OptionsChanged { changed } => {
                assert!(changed.contains(Field::Offset));
                assert_eq!(changed.len(), 1);
            }
            other => panic!("expected OptionsChanged, got {other:?}"),
        }
        assert_eq!(
            events[2],
            RecordedEvent::ActiveChanged {
                previous: Some(true),
                next: Some(false),
            }
        );

        rec.clear();
        assert!(rec.is_empty());
    }
}
