// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deduplicating, frame-throttled execution queue.
//!
//! [`ExecutionQueue`] collects [`Command`]s and runs them at most once per
//! animation frame:
//!
//! - **Deduplication**: a command identity is pending at most once.
//!   Scheduling it again keeps its position and only updates its condition.
//! - **Throttling**: the first schedule into an empty queue requests one
//!   frame from the [`FrameRequester`]; further schedules ride along.
//! - **Conditions**: [`schedule_if`](ExecutionQueue::schedule_if) attaches a
//!   predicate evaluated immediately before the command would run, after all
//!   earlier commands in the batch have run. A `false` result drops the
//!   command silently.
//! - **Promotion**: [`take`](ExecutionQueue::take) hands the pending batch
//!   out for synchronous execution and cancels the frame request, which is how
//!   a caller flushes "now" instead of waiting for the frame.
//! - **Teardown**: [`clear`](ExecutionQueue::clear) drops everything without
//!   running it.
//!
//! The queue does not run commands itself: the frame callback (`wake`) and
//! the immediate path both call [`take`](ExecutionQueue::take) and then
//! [`Batch::run`] with no borrow of the queue held, so commands are free to
//! schedule follow-up work, which lands in the next frame.

use core::fmt;
use std::rc::Rc;

use crate::backend::{FrameRequest, FrameRequester};
use crate::time::HostTime;

/// A unit of work with a stable identity.
///
/// Identity is value equality, so commands are usually fieldless enums that
/// dispatch to methods on the context.
pub trait Command<Ctx: ?Sized>: Copy + Eq + fmt::Debug {
    /// Runs the command.
    fn execute(self, ctx: &Ctx);

    /// Returns `true` once `ctx` accepts no further work.
    ///
    /// Checked before every command of a running batch, so a command that
    /// tears the context down stops the rest of its batch.
    fn halted(_ctx: &Ctx) -> bool {
        false
    }
}

/// A "still required?" predicate evaluated right before a command runs.
pub type Condition<Ctx> = Box<dyn Fn(&Ctx) -> bool>;

/// Outcome of scheduling a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheduled {
    /// The command was appended to the queue.
    Queued,
    /// The command was already pending; only its condition was updated.
    Merged,
}

struct Pending<C, Ctx: ?Sized> {
    command: C,
    condition: Option<Condition<Ctx>>,
}

/// A throttled, deduplicating command queue.
pub struct ExecutionQueue<C, Ctx: ?Sized> {
    pending: Vec<Pending<C, Ctx>>,
    frames: Rc<dyn FrameRequester>,
    wake: Rc<dyn Fn(HostTime)>,
    request: Option<FrameRequest>,
}

impl<C: fmt::Debug, Ctx: ?Sized> fmt::Debug for ExecutionQueue<C, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionQueue")
            .field(
                "pending",
                &self.pending.iter().map(|p| &p.command).collect::<Vec<_>>(),
            )
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl<C: Command<Ctx>, Ctx: ?Sized> ExecutionQueue<C, Ctx> {
    /// Creates an empty queue.
    ///
    /// `wake` is invoked from the frame callback; it is expected to
    /// [`take`](Self::take) the pending batch and run it.
    pub fn new(frames: Rc<dyn FrameRequester>, wake: impl Fn(HostTime) + 'static) -> Self {
        Self {
            pending: Vec::new(),
            frames,
            wake: Rc::new(wake),
            request: None,
        }
    }

    /// Schedules `command` unconditionally.
    ///
    /// An unconditional schedule also removes any condition the pending
    /// entry carried.
    pub fn schedule(&mut self, command: C) -> Scheduled {
        self.push(command, None)
    }

    /// Schedules `command`, to run only if `condition` holds at flush time.
    ///
    /// If `command` is already pending with a condition, the condition is
    /// replaced; if it is pending unconditionally, it stays unconditional.
    pub fn schedule_if(
        &mut self,
        command: C,
        condition: impl Fn(&Ctx) -> bool + 'static,
    ) -> Scheduled {
        self.push(command, Some(Box::new(condition)))
    }

    fn push(&mut self, command: C, condition: Option<Condition<Ctx>>) -> Scheduled {
        if let Some(existing) = self.pending.iter_mut().find(|p| p.command == command) {
            if existing.condition.is_some() {
                existing.condition = condition;
            }
            return Scheduled::Merged;
        }
        self.pending.push(Pending { command, condition });
        if self.request.is_none() {
            let wake = Rc::clone(&self.wake);
            self.request = Some(self.frames.request_frame(Box::new(move |now| wake(now))));
        }
        Scheduled::Queued
    }

    /// Returns `true` if `command` is pending.
    #[must_use]
    pub fn is_pending(&self, command: C) -> bool {
        self.pending.iter().any(|p| p.command == command)
    }

    /// Returns the number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` while a frame request is outstanding.
    #[must_use]
    pub fn has_frame_request(&self) -> bool {
        self.request.is_some()
    }

    /// Removes the pending batch for execution and cancels the outstanding
    /// frame request.
    #[must_use]
    pub fn take(&mut self) -> Batch<C, Ctx> {
        if let Some(request) = self.request.take() {
            self.frames.cancel_frame(request);
        }
        Batch {
            entries: core::mem::take(&mut self.pending),
        }
    }

    /// Drops all pending work without running it.
    pub fn clear(&mut self) {
        drop(self.take());
    }
}

/// Commands removed from an [`ExecutionQueue`], in scheduling order.
pub struct Batch<C, Ctx: ?Sized> {
    entries: Vec<Pending<C, Ctx>>,
}

impl<C: fmt::Debug, Ctx: ?Sized> fmt::Debug for Batch<C, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|p| &p.command))
            .finish()
    }
}

/// Counters from one [`Batch::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BatchStats {
    /// Commands that ran.
    pub ran: u32,
    /// Commands dropped because their condition was false.
    pub skipped: u32,
}

impl<C: Command<Ctx>, Ctx: ?Sized> Batch<C, Ctx> {
    /// Returns `true` if the batch holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the commands in the batch.
    pub fn commands(&self) -> impl Iterator<Item = C> + '_ {
        self.entries.iter().map(|p| p.command)
    }

    /// Runs every command in order, evaluating conditions lazily.
    ///
    /// Once [`Command::halted`] reports `true`, the remaining commands are
    /// dropped and counted as skipped.
    pub fn run(self, ctx: &Ctx) -> BatchStats {
        let mut stats = BatchStats::default();
        for entry in self.entries {
            if C::halted(ctx) {
                stats.skipped += 1;
                continue;
            }
            if let Some(condition) = &entry.condition
                && !condition(ctx)
            {
                stats.skipped += 1;
                continue;
            }
            entry.command.execute(ctx);
            stats.ran += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};
    use std::rc::Weak;

    use super::*;
    use crate::testing::TestFrames;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Task {
        Bounds,
        Margin,
        Progress,
        Teardown,
    }

    #[derive(Default)]
    struct Log {
        ran: RefCell<Vec<Task>>,
        flag: Cell<bool>,
        closed: Cell<bool>,
    }

    impl Command<Log> for Task {
        fn execute(self, ctx: &Log) {
            ctx.ran.borrow_mut().push(self);
            match self {
                Self::Bounds => ctx.flag.set(true),
                Self::Teardown => ctx.closed.set(true),
                Self::Margin | Self::Progress => {}
            }
        }

        fn halted(ctx: &Log) -> bool {
            ctx.closed.get()
        }
    }

    fn queue(frames: &Rc<TestFrames>) -> ExecutionQueue<Task, Log> {
        ExecutionQueue::new(Rc::clone(frames) as Rc<dyn FrameRequester>, |_| {})
    }

    #[test]
    fn duplicate_schedules_run_once_in_fifo_order() {
        let frames = Rc::new(TestFrames::default());
        let mut q = queue(&frames);
        assert_eq!(q.schedule(Task::Progress), Scheduled::Queued);
        assert_eq!(q.schedule(Task::Bounds), Scheduled::Queued);
        assert_eq!(q.schedule(Task::Progress), Scheduled::Merged);
        assert_eq!(frames.pending(), 1, "one frame per batch");

        let log = Log::default();
        let stats = q.take().run(&log);
        assert_eq!(*log.ran.borrow(), [Task::Progress, Task::Bounds]);
        assert_eq!(stats, BatchStats { ran: 2, skipped: 0 });
    }

    #[test]
    fn condition_sees_effects_of_earlier_commands() {
        let frames = Rc::new(TestFrames::default());
        let mut q = queue(&frames);
        q.schedule(Task::Bounds);
        q.schedule_if(Task::Margin, |log: &Log| log.flag.get());
        q.schedule_if(Task::Progress, |_: &Log| false);

        let log = Log::default();
        let stats = q.take().run(&log);
        assert_eq!(*log.ran.borrow(), [Task::Bounds, Task::Margin]);
        assert_eq!(stats, BatchStats { ran: 2, skipped: 1 });
    }

    #[test]
    fn halted_context_stops_the_rest_of_the_batch() {
        let frames = Rc::new(TestFrames::default());
        let mut q = queue(&frames);
        q.schedule(Task::Bounds);
        q.schedule(Task::Teardown);
        q.schedule(Task::Margin);
        q.schedule_if(Task::Progress, |_: &Log| true);

        let log = Log::default();
        let stats = q.take().run(&log);
        assert_eq!(*log.ran.borrow(), [Task::Bounds, Task::Teardown]);
        assert_eq!(stats, BatchStats { ran: 2, skipped: 2 });
    }

    #[test]
    fn unconditional_schedule_dominates() {
        let frames = Rc::new(TestFrames::default());
        let mut q = queue(&frames);
        q.schedule_if(Task::Margin, |_: &Log| false);
        q.schedule(Task::Margin);
        q.schedule_if(Task::Margin, |_: &Log| false);

        let log = Log::default();
        q.take().run(&log);
        assert_eq!(*log.ran.borrow(), [Task::Margin]);
    }

    #[test]
    fn newest_condition_replaces_older_one() {
        let frames = Rc::new(TestFrames::default());
        let mut q = queue(&frames);
        q.schedule_if(Task::Margin, |_: &Log| false);
        q.schedule_if(Task::Margin, |_: &Log| true);

        let log = Log::default();
        q.take().run(&log);
        assert_eq!(*log.ran.borrow(), [Task::Margin]);
    }

    #[test]
    fn take_cancels_frame_and_clear_drops_work() {
        let frames = Rc::new(TestFrames::default());
        let mut q = queue(&frames);
        q.schedule(Task::Bounds);
        assert!(q.has_frame_request());
        let batch = q.take();
        assert!(!q.has_frame_request());
        assert_eq!(frames.pending(), 0, "promoted batch cancels its frame");
        assert_eq!(batch.commands().collect::<Vec<_>>(), [Task::Bounds]);

        q.schedule(Task::Progress);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(frames.pending(), 0);
    }

    struct Looped {
        queue: RefCell<ExecutionQueue<Task, Log>>,
        log: Log,
    }

    #[test]
    fn frame_callback_flushes_and_rescheduling_requests_next_frame() {
        let frames = Rc::new(TestFrames::default());
        let ctx = Rc::new_cyclic(|weak: &Weak<Looped>| {
            let weak = weak.clone();
            Looped {
                queue: RefCell::new(ExecutionQueue::new(
                    Rc::clone(&frames) as Rc<dyn FrameRequester>,
                    move |_| {
                        let Some(ctx) = weak.upgrade() else { return };
                        let batch = ctx.queue.borrow_mut().take();
                        batch.run(&ctx.log);
                        // Work scheduled during a flush waits for the next frame.
                        ctx.queue.borrow_mut().schedule(Task::Progress);
                    },
                )),
                log: Log::default(),
            }
        });

        ctx.queue.borrow_mut().schedule(Task::Bounds);
        ctx.queue.borrow_mut().schedule(Task::Bounds);
        assert_eq!(frames.fire(), 1);
        assert_eq!(*ctx.log.ran.borrow(), [Task::Bounds]);
        assert!(ctx.queue.borrow().is_pending(Task::Progress));
        assert_eq!(frames.pending(), 1);
    }
}
