// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Frame
//! timestamps are converted to microseconds using a [`Timebase`].

use std::io::Write;

use scrollscene_core::options::{Correction, CorrectionKind};
use scrollscene_core::time::{HostTime, Timebase};
use scrollscene_core::trace::{
    ActiveChangedEvent, FlushEvent, OptionsChangedEvent, ProgressEvent, TaskScheduledEvent,
    TraceSink,
};

use crate::{flush_mode_name, task_name};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn host_us(&self, t: HostTime) -> f64 {
        t.to_nanos(self.timebase) as f64 / 1000.0
    }
}

fn active_name(active: Option<bool>) -> &'static str {
    match active {
        Some(true) => "active",
        Some(false) => "inactive",
        None => "unknown",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_options_changed(&mut self, e: &OptionsChangedEvent) {
        let _ = write!(self.writer, "[options] changed=");
        for (i, field) in e.changed.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            let _ = write!(self.writer, "{sep}{}", field.name());
        }
        let _ = writeln!(self.writer);
    }

    fn on_option_corrected(&mut self, c: &Correction) {
        let _ = match c.kind {
            CorrectionKind::Rejected => {
                writeln!(self.writer, "[correct] {} rejected", c.field.name())
            }
            CorrectionKind::Clamped { from, to } => writeln!(
                self.writer,
                "[correct] {} clamped {from} -> {to}",
                c.field.name(),
            ),
        };
    }

    fn on_task_scheduled(&mut self, e: &TaskScheduledEvent) {
        let _ = writeln!(
            self.writer,
            "[schedule] {}{}",
            task_name(e.task),
            if e.merged { " (merged)" } else { "" },
        );
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        let _ = match e.timestamp {
            Some(t) => writeln!(
                self.writer,
                "[flush] mode={} at {:.1}µs ran={} skipped={}",
                flush_mode_name(e.mode),
                self.host_us(t),
                e.ran,
                e.skipped,
            ),
            None => writeln!(
                self.writer,
                "[flush] mode={} ran={} skipped={}",
                flush_mode_name(e.mode),
                e.ran,
                e.skipped,
            ),
        };
    }

    fn on_progress(&mut self, e: &ProgressEvent) {
        let _ = writeln!(
            self.writer,
            "[progress] {:.4} -> {:.4}",
            e.previous, e.next,
        );
    }

    fn on_active_changed(&mut self, e: &ActiveChangedEvent) {
        let _ = writeln!(
            self.writer,
            "[active] {} -> {}",
            active_name(e.previous),
            active_name(e.next),
        );
    }

    fn on_destroyed(&mut self) {
        let _ = writeln!(self.writer, "[destroyed]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollscene_core::options::{Field, FieldSet};
    use scrollscene_core::scene::SceneTask;
    use scrollscene_core::trace::FlushMode;

    fn render(f: impl FnOnce(&mut PrettyPrintSink<Vec<u8>>)) -> String {
        let mut sink = PrettyPrintSink::with_writer(Vec::new(), Timebase::MICROS);
        f(&mut sink);
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn flush_line_includes_frame_time() {
        let out = render(|s| {
            s.on_flush(&FlushEvent {
                mode: FlushMode::Frame,
                timestamp: Some(HostTime(16_667)),
                ran: 2,
                skipped: 1,
            });
        });
        assert_eq!(out, "[flush] mode=frame at 16667.0µs ran=2 skipped=1\n");
    }

    #[test]
    fn immediate_flush_has_no_timestamp() {
        let out = render(|s| {
            s.on_flush(&FlushEvent {
                mode: FlushMode::Immediate,
                timestamp: None,
                ran: 1,
                skipped: 0,
            });
        });
        assert_eq!(out, "[flush] mode=immediate ran=1 skipped=0\n");
    }

    #[test]
    fn options_changed_lists_fields() {
        let out = render(|s| {
            s.on_options_changed(&OptionsChangedEvent {
                changed: FieldSet::EMPTY
                    .with(Field::TrackStart)
                    .with(Field::Vertical),
            });
        });
        assert_eq!(out, "[options] changed=vertical,track_start\n");
    }

    #[test]
    fn corrections_and_schedules() {
        let out = render(|s| {
            s.on_option_corrected(&Correction {
                field: Field::TrackEnd,
                kind: CorrectionKind::Clamped { from: 2.0, to: 1.0 },
            });
            s.on_option_corrected(&Correction {
                field: Field::TrackStart,
                kind: CorrectionKind::Rejected,
            });
            s.on_task_scheduled(&TaskScheduledEvent {
                task: SceneTask::UpdateProgress,
                merged: true,
            });
        });
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "[correct] track_end clamped 2 -> 1",
                "[correct] track_start rejected",
                "[schedule] update_progress (merged)",
            ]
        );
    }

    #[test]
    fn progress_active_and_destroyed() {
        let out = render(|s| {
            s.on_active_changed(&ActiveChangedEvent {
                previous: None,
                next: Some(true),
            });
            s.on_progress(&ProgressEvent {
                previous: 0.0,
                next: 0.5,
            });
            s.on_destroyed();
        });
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "[active] unknown -> active",
                "[progress] 0.0000 -> 0.5000",
                "[destroyed]",
            ]
        );
    }
}
