// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-crate test doubles.

use core::cell::{Cell, RefCell};

use crate::backend::{FrameCallback, FrameRequest, FrameRequester};
use crate::time::HostTime;

/// Frames that fire only when a test calls [`fire`](Self::fire).
#[derive(Default)]
pub(crate) struct TestFrames {
    next_id: Cell<u64>,
    now: Cell<u64>,
    pending: RefCell<Vec<(FrameRequest, FrameCallback)>>,
}

impl TestFrames {
    pub(crate) fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs every callback requested so far; returns how many ran.
    pub(crate) fn fire(&self) -> usize {
        let batch = core::mem::take(&mut *self.pending.borrow_mut());
        self.now.set(self.now.get() + 16_667);
        let now = HostTime(self.now.get());
        let count = batch.len();
        for (_, callback) in batch {
            callback(now);
        }
        count
    }
}

impl FrameRequester for TestFrames {
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
