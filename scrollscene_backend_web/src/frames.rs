// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame requester.
//!
//! [`RafFrames`] batches every callback requested before the next frame into
//! a single `requestAnimationFrame` registration. The browser callback
//! receives a [`DOMHighResTimeStamp`][mdn] (milliseconds from
//! `performance.now()`), which is converted to microsecond [`HostTime`]
//! ticks.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use scrollscene_core::backend::{FrameCallback, FrameRequest, FrameRequester};
use scrollscene_core::time::HostTime;

// Direct global bindings instead of `web_sys::Window` methods, so no Window
// object has to be fetched on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// Converts a `DOMHighResTimeStamp` to microsecond ticks.
pub(crate) fn host_time_from_ms(ms: f64) -> HostTime {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "timestamps are small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

/// A [`FrameRequester`] backed by `requestAnimationFrame`.
pub struct RafFrames {
    inner: Rc<RafInner>,
}

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`. Created once
    /// and re-registered for every frame that has pending callbacks.
    closure: RefCell<Option<RafClosure>>,

    /// Callbacks waiting for the next frame, in request order.
    pending: RefCell<Vec<(FrameRequest, FrameCallback)>>,

    next_id: Cell<u64>,

    /// The outstanding `requestAnimationFrame` id, if any.
    raf_id: Cell<Option<i32>>,
}

impl RafFrames {
    /// Creates a requester with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        let inner = Rc::new(RafInner {
            closure: RefCell::new(None),
            pending: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            raf_id: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Some(inner) = weak.upgrade() else { return };
            inner.raf_id.set(None);
            let now = host_time_from_ms(timestamp_ms);
            // Take the batch first: callbacks commonly request the next frame.
            let batch = core::mem::take(&mut *inner.pending.borrow_mut());
            for (_, callback) in batch {
                callback(now);
            }
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Returns the number of callbacks waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }
}

impl Default for RafFrames {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRequester for RafFrames {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let request = FrameRequest(self.inner.next_id.get());
        self.inner.next_id.set(request.0 + 1);
        self.inner.pending.borrow_mut().push((request, callback));

        if self.inner.raf_id.get().is_none()
            && let Some(ref closure) = *self.inner.closure.borrow()
        {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.raf_id.set(Some(id));
        }
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        let mut pending = self.inner.pending.borrow_mut();
        pending.retain(|(id, _)| *id != request);
        if pending.is_empty()
            && let Some(id) = self.inner.raf_id.take()
        {
            cancel_animation_frame(id);
        }
    }
}

impl Drop for RafFrames {
    fn drop(&mut self) {
        if let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
        self.inner.pending.borrow_mut().clear();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafFrames {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafFrames")
            .field("pending", &self.inner.pending.borrow().len())
            .field("raf_id", &self.inner.raf_id.get())
            .finish_non_exhaustive()
    }
}
