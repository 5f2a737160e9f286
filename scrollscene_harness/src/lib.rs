// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic test doubles for scrollscene.
//!
//! - [`ManualFrames`]: frames fire when the test says so.
//! - [`MockPlatform`]: a scripted layout world with observers that only
//!   report what the test emits.
//! - [`EventLog`]: records what a scene dispatched.
//!
//! ```
//! use kurbo::Rect;
//! use scrollscene_core::options::PartialOptions;
//! use scrollscene_core::scene::Scene;
//! use scrollscene_harness::{EventLog, MockPlatform};
//!
//! let platform = MockPlatform::new();
//! let el = platform.element(Rect::new(0.0, 900.0, 100.0, 1000.0));
//! let scene = Scene::new(platform.clone(), PartialOptions::new().element(el));
//! let log = EventLog::attach(&scene);
//!
//! platform.emit_intersection(el, true);
//! platform.fire_frame();
//! assert!(scene.progress() > 0.0);
//! assert_eq!(log.len(), 2);
//! ```

mod frames;
mod log;
mod platform;

pub use frames::{DEFAULT_INTERVAL, ManualFrames};
pub use log::EventLog;
pub use platform::{
    MockContainer, MockElement, MockPlatform, MockResizeObserver, MockViewportObserver,
};
