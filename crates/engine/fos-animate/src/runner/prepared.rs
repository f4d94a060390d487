//! Prepared (not yet started) animations

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::{AnimationRunner, HostFns};
use crate::frame::SharedFrames;

type StartFn = Box<dyn FnOnce() -> AnimationRunner>;
type CloseFn = Box<dyn FnOnce()>;

struct PreparedInner {
    frames: SharedFrames,
    will_animate: bool,
    start: RefCell<Option<StartFn>>,
    close: RefCell<Option<CloseFn>>,
    runner: OnceCell<AnimationRunner>,
}

/// Animation a driver has accepted (or declined) but not started yet.
/// `start` is idempotent: every call returns the same runner.
#[derive(Clone)]
pub struct PreparedAnimation {
    inner: Rc<PreparedInner>,
}

impl PreparedAnimation {
    pub fn new(frames: SharedFrames, start: impl FnOnce() -> AnimationRunner + 'static) -> Self {
        Self::build(frames, true, Some(Box::new(start)))
    }

    /// Declined animation; starting it yields a completed runner
    pub fn noop(frames: SharedFrames) -> Self {
        Self::build(frames, false, None)
    }

    /// Wrap a runner that is already in flight
    pub fn started(runner: AnimationRunner) -> Self {
        let prepared = Self::build(runner.frames().clone(), true, None);
        let _ = prepared.inner.runner.set(runner);
        prepared
    }

    /// Start every part together; the combined runner completes through
    /// `all` and `end`/`cancel` end every part
    pub fn all(frames: SharedFrames, parts: Vec<PreparedAnimation>) -> Self {
        let combined_frames = frames.clone();
        Self::new(frames, move || {
            let runners: Vec<AnimationRunner> = parts.iter().map(PreparedAnimation::start).collect();
            let (enders, cancellers) = (runners.clone(), runners.clone());
            let runner = AnimationRunner::with_host(
                combined_frames,
                HostFns::new()
                    .on_end(move || enders.iter().for_each(AnimationRunner::end))
                    .on_cancel(move || cancellers.iter().for_each(AnimationRunner::end))
                    .into_host(),
            );
            let done = runner.clone();
            AnimationRunner::all(&runners, move |status| done.complete(status));
            runner
        })
    }

    fn build(frames: SharedFrames, will_animate: bool, start: Option<StartFn>) -> Self {
        Self {
            inner: Rc::new(PreparedInner {
                frames,
                will_animate,
                start: RefCell::new(start),
                close: RefCell::new(None),
                runner: OnceCell::new(),
            }),
        }
    }

    /// Run `close` if the animation is ended before it was started
    pub fn on_close(self, close: impl FnOnce() + 'static) -> Self {
        *self.inner.close.borrow_mut() = Some(Box::new(close));
        self
    }

    pub fn will_animate(&self) -> bool {
        self.inner.will_animate
    }

    pub fn is_started(&self) -> bool {
        self.inner.runner.get().is_some()
    }

    pub fn start(&self) -> AnimationRunner {
        self.inner
            .runner
            .get_or_init(|| {
                self.inner.close.borrow_mut().take();
                let start = self.inner.start.borrow_mut().take();
                match start {
                    Some(start) => start(),
                    None => AnimationRunner::resolved(self.inner.frames.clone(), true),
                }
            })
            .clone()
    }

    /// End a started animation, or close an unstarted one
    pub fn end(&self) -> AnimationRunner {
        if let Some(runner) = self.inner.runner.get() {
            runner.end();
            return runner.clone();
        }
        self.inner.start.borrow_mut().take();
        let close = self.inner.close.borrow_mut().take();
        if let Some(close) = close {
            close();
        }
        self.inner
            .runner
            .get_or_init(|| AnimationRunner::resolved(self.inner.frames.clone(), true))
            .clone()
    }
}

impl fmt::Debug for PreparedAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedAnimation")
            .field("will_animate", &self.will_animate())
            .field("started", &self.is_started())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameLoop;
    use std::cell::Cell;

    #[test]
    fn test_start_is_idempotent() {
        let frames: SharedFrames = Rc::new(FrameLoop::display());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let f = frames.clone();
        let prepared = PreparedAnimation::new(frames, move || {
            c.set(c.get() + 1);
            AnimationRunner::new(f)
        });

        let a = prepared.start();
        let b = prepared.start();
        a.end();
        assert_eq!(calls.get(), 1);
        assert_eq!(b.status(), Some(true));
    }

    #[test]
    fn test_end_before_start_closes() {
        let frames: SharedFrames = Rc::new(FrameLoop::display());
        let closed = Rc::new(Cell::new(false));
        let c = closed.clone();
        let f = frames.clone();
        let prepared = PreparedAnimation::new(frames, move || AnimationRunner::new(f))
            .on_close(move || c.set(true));

        let runner = prepared.end();
        assert!(closed.get());
        assert_eq!(runner.status(), Some(true));
        assert_eq!(prepared.start().status(), Some(true));
    }

    #[test]
    fn test_all_completes_after_every_part() {
        let frames = Rc::new(FrameLoop::display());
        let shared: SharedFrames = frames.clone();
        let inner: Vec<AnimationRunner> = (0..2).map(|_| AnimationRunner::new(shared.clone())).collect();
        let parts = inner.iter().cloned().map(PreparedAnimation::started).collect();
        let combined = PreparedAnimation::all(shared, parts).start();

        inner[0].end();
        frames.tick();
        assert!(!combined.is_done());

        combined.cancel();
        assert_eq!(inner[1].status(), Some(true));
        frames.tick();
        assert_eq!(combined.status(), Some(false));
    }

    #[test]
    fn test_noop_does_not_animate() {
        let frames: SharedFrames = Rc::new(FrameLoop::display());
        let prepared = PreparedAnimation::noop(frames);
        assert!(!prepared.will_animate());
        assert!(prepared.start().is_done());
    }
}
