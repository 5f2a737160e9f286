// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads events recorded by a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Only frame flushes carry a host timestamp. Every other event is stamped
//! with the time of the frame flush that closes its batch, so the work a frame
//! did lines up under that frame. Events after the last frame flush reuse its
//! time. Arrival order is kept in `args.seq`.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use scrollscene_core::options::CorrectionKind;
use scrollscene_core::time::{HostTime, Timebase};
use scrollscene_core::trace::FlushMode;

use crate::recorder::RecordedEvent;
use crate::{flush_mode_name, task_name};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Progress is written as a counter track.
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(events: &[RecordedEvent], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let stamps = frame_stamps(events, timebase);
    let mut out: Vec<Value> = Vec::with_capacity(events.len());

    for (seq, (recorded, ts)) in events.iter().zip(stamps).enumerate() {
        let value = match *recorded {
            RecordedEvent::OptionsChanged { changed } => instant(
                "options",
                "scene",
                ts,
                json!({
                    "seq": seq,
                    "changed": changed.iter().map(|f| f.name()).collect::<Vec<_>>(),
                }),
            ),
            RecordedEvent::OptionCorrected(c) => {
                let args = match c.kind {
                    CorrectionKind::Rejected => json!({
                        "seq": seq,
                        "field": c.field.name(),
                        "kind": "rejected",
                    }),
                    CorrectionKind::Clamped { from, to } => json!({
                        "seq": seq,
                        "field": c.field.name(),
                        "kind": "clamped",
                        "from": from,
                        "to": to,
                    }),
                };
                instant("correction", "scene", ts, args)
            }
            RecordedEvent::TaskScheduled { task, merged } => instant(
                task_name(task),
                "queue",
                ts,
                json!({ "seq": seq, "merged": merged }),
            ),
            RecordedEvent::Flush {
                mode, ran, skipped, ..
            } => instant(
                "flush",
                "queue",
                ts,
                json!({
                    "seq": seq,
                    "mode": flush_mode_name(mode),
                    "ran": ran,
                    "skipped": skipped,
                }),
            ),
            RecordedEvent::Progress { next, .. } => json!({
                "ph": "C",
                "name": "progress",
                "cat": "scene",
                "ts": ts,
                "pid": 0,
                "tid": 0,
                "args": { "progress": next },
            }),
            RecordedEvent::ActiveChanged { previous, next } => instant(
                "active",
                "scene",
                ts,
                json!({ "seq": seq, "previous": previous, "next": next }),
            ),
            RecordedEvent::Destroyed => instant("destroyed", "scene", ts, json!({ "seq": seq })),
        };
        out.push(value);
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn frame_time(event: &RecordedEvent) -> Option<HostTime> {
    match *event {
        RecordedEvent::Flush {
            mode: FlushMode::Frame,
            timestamp,
            ..
        } => timestamp,
        _ => None,
    }
}

/// Assigns each event the time of the next frame flush at or after it.
fn frame_stamps(events: &[RecordedEvent], timebase: Timebase) -> Vec<f64> {
    let to_us = |t: HostTime| t.to_nanos(timebase) as f64 / 1000.0;
    let mut current = events.iter().rev().find_map(frame_time).map_or(0.0, to_us);
    let mut stamps: Vec<f64> = events
        .iter()
        .rev()
        .map(|e| {
            if let Some(t) = frame_time(e) {
                current = to_us(t);
            }
            current
        })
        .collect();
    stamps.reverse();
    stamps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use scrollscene_core::scene::SceneTask;
    use scrollscene_core::trace::{FlushEvent, ProgressEvent, TaskScheduledEvent, TraceSink};

    fn parse(out: Vec<u8>) -> Vec<Value> {
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_task_scheduled(&TaskScheduledEvent {
            task: SceneTask::UpdateProgress,
            merged: false,
        });
        rec.on_progress(&ProgressEvent {
            previous: 0.0,
            next: 0.5,
        });
        rec.on_flush(&FlushEvent {
            mode: FlushMode::Frame,
            timestamp: Some(HostTime(2_000)),
            ran: 1,
            skipped: 0,
        });
        rec.on_destroyed();

        let mut out = Vec::new();
        export(rec.events(), Timebase::MICROS, &mut out).unwrap();
        let parsed = parse(out);
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "update_progress");
        assert_eq!(parsed[0]["args"]["merged"], false);

        assert_eq!(parsed[1]["ph"], "C");
        assert_eq!(parsed[1]["args"]["progress"], 0.5);

        assert_eq!(parsed[2]["name"], "flush");
        assert_eq!(parsed[2]["args"]["mode"], "frame");

        // Everything in the batch carries the frame's time.
        for event in &parsed {
            assert_eq!(event["ts"], 2_000.0);
        }
    }

    #[test]
    fn events_take_the_time_of_their_closing_frame() {
        let flush = |t| RecordedEvent::Flush {
            mode: FlushMode::Frame,
            timestamp: Some(HostTime(t)),
            ran: 1,
            skipped: 0,
        };
        let events = [
            RecordedEvent::Destroyed,
            flush(1_000),
            RecordedEvent::Destroyed,
            RecordedEvent::Flush {
                mode: FlushMode::Immediate,
                timestamp: None,
                ran: 1,
                skipped: 0,
            },
            flush(3_000),
            RecordedEvent::Destroyed,
        ];
        assert_eq!(
            frame_stamps(&events, Timebase::NANOS),
            [1.0, 1.0, 3.0, 3.0, 3.0, 3.0]
        );
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        assert!(parse(out).is_empty());
    }
}
