//! Awaitable view of a runner

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::AnimationCancelled;

/// Outcome slot shared by every future of one runner
#[derive(Default)]
pub(super) struct Settlement {
    outcome: Cell<Option<bool>>,
    wakers: RefCell<Vec<Waker>>,
}

impl Settlement {
    pub(super) fn fulfil(&self, status: bool) {
        self.outcome.set(Some(status));
        for waker in self.wakers.borrow_mut().drain(..) {
            waker.wake();
        }
    }
}

/// Resolves `Ok(())` when the runner completes, `Err(AnimationCancelled)`
/// when it is cancelled
pub struct RunnerFuture {
    settlement: Rc<Settlement>,
}

impl RunnerFuture {
    pub(super) fn new(settlement: Rc<Settlement>) -> Self {
        Self { settlement }
    }
}

impl Future for RunnerFuture {
    type Output = Result<(), AnimationCancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.settlement.outcome.get() {
            Some(true) => Poll::Ready(Ok(())),
            Some(false) => Poll::Ready(Err(AnimationCancelled)),
            None => {
                let mut wakers = self.settlement.wakers.borrow_mut();
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AnimationCancelled;
    use crate::frame::{FrameLoop, SharedFrames};
    use crate::runner::AnimationRunner;
    use std::future::IntoFuture;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_future_resolves_on_end() {
        let frames = Rc::new(FrameLoop::timer(Duration::from_millis(1)));
        let shared: SharedFrames = frames.clone();
        let runner = AnimationRunner::new(shared);
        let fut = runner.future();
        runner.end();

        let result = smol::block_on(async {
            frames.run_until_idle().await;
            fut.await
        });
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_future_rejects_on_cancel() {
        let frames = Rc::new(FrameLoop::timer(Duration::from_millis(1)));
        let shared: SharedFrames = frames.clone();
        let runner = AnimationRunner::new(shared);
        let fut = runner.clone().into_future();
        runner.cancel();

        let result = smol::block_on(async {
            frames.run_until_idle().await;
            fut.await
        });
        assert_eq!(result, Err(AnimationCancelled));
    }
}
