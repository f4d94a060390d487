//! Frame Scheduler
//!
//! Paces waves of callbacks one frame apart and provides the quiet-period
//! primitive.
//!
//! # Invariants
//!
//! - Waves run in queue order and never interleave.
//! - Every callback of a wave runs synchronously in the same frame.
//! - Consecutive waves are at least one frame apart; the first wave of an
//!   idle scheduler runs as soon as it is scheduled.
//! - At most one quiet callback is outstanding; while it is, waves are held.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::frame::{FrameRequestId, SharedFrames};

/// Zero-argument callback run by the scheduler
pub type Task = Box<dyn FnOnce()>;

/// Callbacks that run together within one frame
pub type Wave = Vec<Task>;

struct SchedulerInner {
    frames: SharedFrames,
    queue: RefCell<VecDeque<Wave>>,
    advance: Cell<Option<FrameRequestId>>,
    quiet: Cell<Option<FrameRequestId>>,
    running: Cell<bool>,
    waves_run: Cell<u64>,
}

/// Sets the running flag for the duration of a wave, unwinding included
struct RunningGuard<'a>(&'a Cell<bool>);

impl<'a> RunningGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Cooperative wave scheduler
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<SchedulerInner>,
}

impl FrameScheduler {
    pub fn new(frames: SharedFrames) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                frames,
                queue: RefCell::new(VecDeque::new()),
                advance: Cell::new(None),
                quiet: Cell::new(None),
                running: Cell::new(false),
                waves_run: Cell::new(0),
            }),
        }
    }

    /// Append waves; runs the first one right away when idle
    pub fn schedule(&self, waves: impl IntoIterator<Item = Wave>) {
        self.inner.queue.borrow_mut().extend(waves);
        if self.is_idle() {
            self.next_tick();
        }
    }

    /// Run `f` after one uncancelled frame, superseding any earlier quiet
    /// callback. Wave advancement resumes once it fired.
    pub fn wait_until_quiet(&self, f: impl FnOnce() + 'static) {
        if let Some(id) = self.inner.quiet.take() {
            tracing::trace!("Quiet callback superseded");
            self.inner.frames.cancel_frame(id);
        }
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.frames.request_frame(Box::new(move || {
            let Some(scheduler) = Self::upgrade(&weak) else { return };
            scheduler.inner.quiet.set(None);
            {
                let _running = RunningGuard::new(&scheduler.inner.running);
                f();
            }
            scheduler.next_tick();
        }));
        self.inner.quiet.set(Some(id));
    }

    /// Waves still queued
    pub fn queued(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn waves_run(&self) -> u64 {
        self.inner.waves_run.get()
    }

    pub fn is_quiet_pending(&self) -> bool {
        self.inner.quiet.get().is_some()
    }

    /// No advance frame pending, no quiet callback outstanding, no wave running
    pub fn is_idle(&self) -> bool {
        self.inner.advance.get().is_none()
            && self.inner.quiet.get().is_none()
            && !self.inner.running.get()
    }

    /// Frames backing the schedule
    pub fn frames(&self) -> &SharedFrames {
        &self.inner.frames
    }

    fn upgrade(weak: &Weak<SchedulerInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn next_tick(&self) {
        let wave = self.inner.queue.borrow_mut().pop_front();
        let Some(wave) = wave else { return };

        tracing::trace!("Running wave of {} callbacks", wave.len());
        {
            let _running = RunningGuard::new(&self.inner.running);
            for task in wave {
                task();
            }
        }
        self.inner.waves_run.set(self.inner.waves_run.get() + 1);

        if self.inner.quiet.get().is_none() {
            self.request_advance();
        }
    }

    fn request_advance(&self) {
        if let Some(id) = self.inner.advance.take() {
            self.inner.frames.cancel_frame(id);
        }
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.frames.request_frame(Box::new(move || {
            let Some(scheduler) = Self::upgrade(&weak) else { return };
            scheduler.inner.advance.set(None);
            if scheduler.inner.quiet.get().is_none() {
                scheduler.next_tick();
            }
        }));
        self.inner.advance.set(Some(id));
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("queued", &self.queued())
            .field("quiet_pending", &self.is_quiet_pending())
            .field("idle", &self.is_idle())
            .finish()
    }
}
