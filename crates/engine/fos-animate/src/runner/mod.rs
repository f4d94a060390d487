//! Animation runners
//!
//! Every animation operation returns an [`AnimationRunner`]: a cancellable,
//! composable handle that settles exactly once, either completed (`true`)
//! or cancelled (`false`).
//!
//! # Invariants
//!
//! 1. Status never changes after the runner is done.
//! 2. `done` listeners fire exactly once, never synchronously: at the
//!    earliest one frame after completion was signalled.
//! 3. `end`/`cancel` forward to the host before settling, so listeners of
//!    an inner runner fire before those of the runner wrapping it.

mod combinators;
mod future;
mod prepared;

pub use combinators::ChainStep;
pub use future::RunnerFuture;
pub use prepared::PreparedAnimation;

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::frame::SharedFrames;

/// Listener invoked with the final status
pub type DoneCallback = Box<dyn FnOnce(bool)>;

/// Control surface a runner delegates to
pub trait RunnerHost {
    fn end(&self) {}
    fn cancel(&self) {}
    fn pause(&self) {}
    fn resume(&self) {}
}

/// Runner lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Running, nothing signalled yet
    Pending,
    /// Completion signalled, settles on the next frame
    Resolving,
    /// Settled; status is final
    Done,
}

/// Closure-backed [`RunnerHost`]
#[derive(Default)]
pub struct HostFns {
    end: Option<Box<dyn Fn()>>,
    cancel: Option<Box<dyn Fn()>>,
    pause: Option<Box<dyn Fn()>>,
    resume: Option<Box<dyn Fn()>>,
}

impl HostFns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_end(mut self, f: impl Fn() + 'static) -> Self {
        self.end = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + 'static) -> Self {
        self.cancel = Some(Box::new(f));
        self
    }

    pub fn on_pause(mut self, f: impl Fn() + 'static) -> Self {
        self.pause = Some(Box::new(f));
        self
    }

    pub fn on_resume(mut self, f: impl Fn() + 'static) -> Self {
        self.resume = Some(Box::new(f));
        self
    }

    pub fn into_host(self) -> Rc<dyn RunnerHost> {
        Rc::new(self)
    }
}

impl RunnerHost for HostFns {
    fn end(&self) {
        if let Some(f) = &self.end {
            f();
        }
    }

    fn cancel(&self) {
        if let Some(f) = &self.cancel {
            f();
        }
    }

    fn pause(&self) {
        if let Some(f) = &self.pause {
            f();
        }
    }

    fn resume(&self) {
        if let Some(f) = &self.resume {
            f();
        }
    }
}

struct RunnerInner {
    frames: SharedFrames,
    state: Cell<RunnerState>,
    status: Cell<Option<bool>>,
    host: RefCell<Option<Rc<dyn RunnerHost>>>,
    callbacks: RefCell<Vec<DoneCallback>>,
    settlement: OnceCell<Rc<future::Settlement>>,
}

/// Handle to one in-flight or finished animation
#[derive(Clone)]
pub struct AnimationRunner {
    inner: Rc<RunnerInner>,
}

impl AnimationRunner {
    pub fn new(frames: SharedFrames) -> Self {
        Self {
            inner: Rc::new(RunnerInner {
                frames,
                state: Cell::new(RunnerState::Pending),
                status: Cell::new(None),
                host: RefCell::new(None),
                callbacks: RefCell::new(Vec::new()),
                settlement: OnceCell::new(),
            }),
        }
    }

    pub fn with_host(frames: SharedFrames, host: Rc<dyn RunnerHost>) -> Self {
        let runner = Self::new(frames);
        runner.set_host(host);
        runner
    }

    /// Runner that is already completed with `status`
    pub fn resolved(frames: SharedFrames, status: bool) -> Self {
        let runner = Self::new(frames);
        runner.settle(status);
        runner
    }

    /// Delegate `end`/`cancel`/`pause`/`resume` to `host`
    pub fn set_host(&self, host: Rc<dyn RunnerHost>) {
        if self.is_done() {
            return;
        }
        *self.inner.host.borrow_mut() = Some(host);
    }

    pub fn state(&self) -> RunnerState {
        self.inner.state.get()
    }

    /// Final status once done
    pub fn status(&self) -> Option<bool> {
        self.inner.status.get()
    }

    pub fn is_done(&self) -> bool {
        self.inner.state.get() == RunnerState::Done
    }

    pub fn frames(&self) -> &SharedFrames {
        &self.inner.frames
    }

    /// Register a one-shot listener for the final status
    pub fn done(&self, listener: impl FnOnce(bool) + 'static) {
        match self.inner.status.get() {
            Some(status) if self.is_done() => {
                self.inner.frames.request_frame(Box::new(move || listener(status)));
            }
            _ => self.inner.callbacks.borrow_mut().push(Box::new(listener)),
        }
    }

    /// Finish now as completed
    pub fn end(&self) {
        if self.is_done() {
            return;
        }
        if let Some(host) = self.host() {
            host.end();
        }
        self.settle(true);
    }

    /// Finish now as cancelled
    pub fn cancel(&self) {
        if self.is_done() {
            return;
        }
        if let Some(host) = self.host() {
            host.cancel();
        }
        self.settle(false);
    }

    pub fn pause(&self) {
        if let Some(host) = self.host() {
            host.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(host) = self.host() {
            host.resume();
        }
    }

    /// Signal completion from the driver side; settles on the next frame
    pub fn complete(&self, status: bool) {
        if self.inner.state.get() != RunnerState::Pending {
            return;
        }
        self.inner.state.set(RunnerState::Resolving);
        let inner = Rc::clone(&self.inner);
        self.inner.frames.request_frame(Box::new(move || {
            AnimationRunner { inner }.resolve_now(status);
        }));
    }

    /// Awaitable view, built once per runner
    pub fn future(&self) -> RunnerFuture {
        let settlement = self.inner.settlement.get_or_init(|| {
            let settlement = Rc::new(future::Settlement::default());
            let slot = Rc::clone(&settlement);
            self.done(move |status| slot.fulfil(status));
            settlement
        });
        RunnerFuture::new(Rc::clone(settlement))
    }

    fn host(&self) -> Option<Rc<dyn RunnerHost>> {
        self.inner.host.borrow().clone()
    }

    fn mark_done(&self, status: bool) -> Option<Vec<DoneCallback>> {
        if self.is_done() {
            return None;
        }
        self.inner.state.set(RunnerState::Done);
        self.inner.status.set(Some(status));
        self.inner.host.borrow_mut().take();
        tracing::trace!("Runner settled: {}", status);
        Some(std::mem::take(&mut *self.inner.callbacks.borrow_mut()))
    }

    /// Settle immediately; listeners fire on the next frame
    fn settle(&self, status: bool) {
        let Some(callbacks) = self.mark_done(status) else { return };
        if callbacks.is_empty() {
            return;
        }
        self.inner.frames.request_frame(Box::new(move || {
            for callback in callbacks {
                callback(status);
            }
        }));
    }

    /// Settle from inside a frame callback, typically another runner's
    /// `done` listener; listeners fire right away
    pub(crate) fn resolve_now(&self, status: bool) {
        let Some(callbacks) = self.mark_done(status) else { return };
        for callback in callbacks {
            callback(status);
        }
    }
}

impl RunnerHost for AnimationRunner {
    fn end(&self) {
        AnimationRunner::end(self);
    }

    fn cancel(&self) {
        AnimationRunner::cancel(self);
    }

    fn pause(&self) {
        AnimationRunner::pause(self);
    }

    fn resume(&self) {
        AnimationRunner::resume(self);
    }
}

impl std::future::IntoFuture for AnimationRunner {
    type Output = Result<(), crate::error::AnimationCancelled>;
    type IntoFuture = RunnerFuture;

    fn into_future(self) -> RunnerFuture {
        self.future()
    }
}

impl fmt::Debug for AnimationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRunner")
            .field("state", &self.state())
            .field("status", &self.status())
            .finish()
    }
}
