// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for scrollscene.
//!
//! This crate implements the [`Platform`] contract on browser APIs:
//!
//! - [`RafFrames`]: `requestAnimationFrame` frame requester
//! - [`DomContainer`]: window or element scroll container
//! - [`DomViewportObserver`]: `IntersectionObserver` wrapper
//! - [`DomResizeObserver`]: `ResizeObserver` wrapper
//! - [`WebPlatform`]: bundles the above with `Element` as the element type
//!
//! ```no_run
//! use scrollscene_backend_web::WebPlatform;
//! use scrollscene_core::options::PartialOptions;
//! use scrollscene_core::scene::Scene;
//!
//! # fn demo(element: web_sys::Element) {
//! let scene = Scene::new(
//!     WebPlatform::new(),
//!     PartialOptions::new().element(element).track_start(0.9),
//! );
//! let _listener = scene.on("progress", |e| {
//!     let _ = e.progress;
//! });
//! # }
//! ```

#![no_std]

extern crate alloc;

mod container;
mod frames;
mod observers;

use alloc::boxed::Box;
use alloc::rc::Rc;

pub use container::DomContainer;
pub use frames::RafFrames;
pub use observers::{DomResizeObserver, DomViewportObserver};

use kurbo::Rect;
use scrollscene_core::backend::{FrameRequester, IntersectionCallback, Platform};
use scrollscene_core::time::{HostTime, Timebase};
use web_sys::Element;

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    frames::host_time_from_ms(frames::performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::new(1000, 1)
}

/// The browser [`Platform`].
///
/// All scenes created from clones of one `WebPlatform` share a single
/// [`RafFrames`], so their work lands in the same animation frame.
#[derive(Clone, Debug)]
pub struct WebPlatform {
    frames: Rc<RafFrames>,
}

impl WebPlatform {
    /// Creates a platform with its own frame requester.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Rc::new(RafFrames::new()),
        }
    }
}

impl Default for WebPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WebPlatform {
    type Element = Element;
    type Container = DomContainer;
    type Viewport = DomViewportObserver;
    type Resize = DomResizeObserver;

    fn frames(&self) -> Rc<dyn FrameRequester> {
        Rc::clone(&self.frames) as Rc<dyn FrameRequester>
    }

    fn element_rect(&self, element: &Element) -> Rect {
        let r = element.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn container(&self) -> DomContainer {
        DomContainer::new()
    }

    fn viewport_observer(&self, on_change: IntersectionCallback<Element>) -> DomViewportObserver {
        DomViewportObserver::new(on_change)
    }

    fn resize_observer(&self, on_resize: Box<dyn FnMut()>) -> DomResizeObserver {
        DomResizeObserver::new(on_resize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_is_microsecond() {
        let tb = timebase();
        // 1 tick = 1 µs = 1000 ns
        assert_eq!(tb.ticks_to_nanos(1), 1000);
        assert_eq!(tb.ticks_to_nanos(1_000_000), 1_000_000_000);
    }

    #[test]
    fn timestamps_convert_to_microseconds() {
        assert_eq!(frames::host_time_from_ms(16.5), HostTime(16_500));
        assert_eq!(frames::host_time_from_ms(0.0), HostTime(0));
    }
}
