// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame call coalescing.
//!
//! A [`Throttle`] turns a burst of calls into a single invocation on the next
//! frame, carrying the most recent value. It knows nothing about what the
//! frame source is; any [`FrameRequester`] works.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use crate::backend::{FrameRequest, FrameRequester};

struct Shared<T> {
    frames: Rc<dyn FrameRequester>,
    latest: RefCell<Option<T>>,
    request: Cell<Option<FrameRequest>>,
    callback: Box<dyn Fn(T)>,
}

/// Coalesces calls to at most one per frame, keeping the latest value.
///
/// Dropping the throttle cancels any pending invocation.
pub struct Throttle<T: 'static> {
    shared: Rc<Shared<T>>,
}

impl<T: 'static> fmt::Debug for Throttle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("request", &self.shared.request.get())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Throttle<T> {
    /// Creates a throttle that invokes `callback` on frames from `frames`.
    pub fn new(frames: Rc<dyn FrameRequester>, callback: impl Fn(T) + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                frames,
                latest: RefCell::new(None),
                request: Cell::new(None),
                callback: Box::new(callback),
            }),
        }
    }

    /// Records `value` and makes sure a frame is requested.
    pub fn call(&self, value: T) {
        *self.shared.latest.borrow_mut() = Some(value);
        if self.shared.request.get().is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.shared);
        let request = self.shared.frames.request_frame(Box::new(move |_| {
            let Some(shared) = weak.upgrade() else { return };
            shared.request.set(None);
            let value = shared.latest.borrow_mut().take();
            if let Some(value) = value {
                (shared.callback)(value);
            }
        }));
        self.shared.request.set(Some(request));
    }

    /// Returns `true` while an invocation is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.request.get().is_some()
    }

    /// Drops the pending value and cancels the frame request.
    pub fn cancel(&self) {
        if let Some(request) = self.shared.request.take() {
            self.shared.frames.cancel_frame(request);
        }
        self.shared.latest.borrow_mut().take();
    }
}

impl<T: 'static> Drop for Throttle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFrames;

    fn recording(frames: &Rc<TestFrames>) -> (Throttle<u32>, Rc<RefCell<Vec<u32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let throttle = Throttle::new(Rc::clone(frames) as Rc<dyn FrameRequester>, move |v| {
            sink.borrow_mut().push(v);
        });
        (throttle, seen)
    }

    #[test]
    fn burst_collapses_to_latest_value() {
        let frames = Rc::new(TestFrames::default());
        let (throttle, seen) = recording(&frames);
        throttle.call(1);
        throttle.call(2);
        throttle.call(3);
        assert_eq!(frames.pending(), 1);
        assert!(throttle.is_pending());

        frames.fire();
        assert_eq!(*seen.borrow(), [3]);
        assert!(!throttle.is_pending());

        throttle.call(4);
        frames.fire();
        assert_eq!(*seen.borrow(), [3, 4]);
    }

    #[test]
    fn cancel_discards_pending_call() {
        let frames = Rc::new(TestFrames::default());
        let (throttle, seen) = recording(&frames);
        throttle.call(1);
        throttle.cancel();
        assert_eq!(frames.pending(), 0);
        frames.fire();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn drop_cancels_frame() {
        let frames = Rc::new(TestFrames::default());
        let (throttle, _seen) = recording(&frames);
        throttle.call(7);
        drop(throttle);
        assert_eq!(frames.pending(), 0);
    }
}
