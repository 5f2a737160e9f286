// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-linked progress tracking.
//!
//! `scrollscene_core` computes how far a tracked element has moved through a
//! trigger region of a scroll container, as a progress value in `[0, 1]`,
//! and emits `enter` / `progress` / `leave` events as that value changes.
//! Layout access goes through the [`backend::Platform`] contract, so the
//! same controller runs against a browser or a scripted test world.
//!
//! # Architecture
//!
//! ```text
//!   Scene::modify(partial)
//!       │
//!       ▼
//!   options::process ──► options::diff ──► FieldSet
//!                                             │
//!                 ┌───────────────────────────┘
//!                 ▼
//!   ReactionGraph::react ──► reaction pass (bounds, observers, margin)
//!                                             │
//!   Platform signals ──► ExecutionQueue ◄─────┘
//!                             │ (one flush per frame)
//!                             ▼
//!                        SceneTask ──► progress ──► EventDispatcher
//! ```
//!
//! **[`scene`]**: The [`Scene`](scene::Scene) controller. Owns the options,
//! derived trigger bounds, the active flag and progress; the only component
//! with business logic.
//!
//! **[`options`]**: Public, partial and private option shapes, with
//! sanitization, derivation and field-by-field diffing.
//!
//! **[`dirty`]**: Reaction graph via `understory_dirty`. Changed option
//! fields propagate to the derived state that has to react.
//!
//! **[`queue`]**: Deduplicating, frame-throttled execution queue with
//! per-command conditions and synchronous promotion.
//!
//! **[`throttle`]**: Coalesces bursts of calls into one per frame.
//!
//! **[`event`]**: Scene events and a kind-keyed listener registry.
//!
//! **[`backend`]**: The platform contract: frames, container proxy,
//! viewport and resize observers, element measurement.
//!
//! **[`geometry`]**: Axis projection of `kurbo` rects and CSS-style margin
//! formatting.
//!
//! **[`defaults`]**: Process-wide default options.
//!
//! **[`time`]**: Frame timestamps and timebase conversion.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! scene instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod defaults;
pub mod dirty;
pub mod event;
pub mod geometry;
pub mod options;
pub mod queue;
pub mod scene;
pub mod throttle;
pub mod time;
pub mod trace;

#[cfg(test)]
mod testing;
