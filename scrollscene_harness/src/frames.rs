// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A frame requester driven by the test.

use core::cell::{Cell, RefCell};

use scrollscene_core::backend::{FrameCallback, FrameRequest, FrameRequester};
use scrollscene_core::time::HostTime;

/// Default frame interval: 60 Hz in microsecond ticks.
pub const DEFAULT_INTERVAL: u64 = 16_667;

/// A [`FrameRequester`] whose frames fire only when [`fire`](Self::fire) is
/// called.
///
/// Time starts at zero and advances by [`DEFAULT_INTERVAL`] on every fire,
/// so timestamps are deterministic.
pub struct ManualFrames {
    next_id: Cell<u64>,
    now: Cell<u64>,
    pending: RefCell<Vec<(FrameRequest, FrameCallback)>>,
}

impl ManualFrames {
    /// Creates a requester with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            now: Cell::new(0),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Returns the time of the last fired frame.
    #[must_use]
    pub fn now(&self) -> HostTime {
        HostTime(self.now.get())
    }

    /// Returns the number of callbacks waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Advances time by one interval and runs every callback requested
    /// before the call. Callbacks requested while firing wait for the next
    /// frame. Returns how many ran.
    pub fn fire(&self) -> usize {
        let batch = core::mem::take(&mut *self.pending.borrow_mut());
        self.now.set(self.now.get() + DEFAULT_INTERVAL);
        let now = self.now();
        let count = batch.len();
        for (_, callback) in batch {
            callback(now);
        }
        count
    }

    /// Fires frames until nothing is pending, at most `limit` times. Returns
    /// the number of frames fired.
    pub fn settle(&self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit && self.pending() > 0 {
            self.fire();
            fired += 1;
        }
        fired
    }
}

impl Default for ManualFrames {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRequester for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let id = FrameRequest(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push((id, callback));
        id
    }

    fn cancel_frame(&self, request: FrameRequest) {
        self.pending.borrow_mut().retain(|(id, _)| *id != request);
    }
}

impl core::fmt::Debug for ManualFrames {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ManualFrames")
            .field("now", &self.now.get())
            .field("pending", &self.pending.borrow().len())
            .finish_non_exhaustive()
    }
}
