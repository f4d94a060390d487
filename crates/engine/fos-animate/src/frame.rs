//! Frame callbacks
//!
//! The per-frame callback primitive (`requestAnimationFrame`) the scheduler
//! and runners are paced by. [`FrameLoop`] is pumped by the host: once per
//! display refresh, or on a fixed timer when the host has no frame callback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::config::AnimateConfig;

/// Callback run on the next frame
pub type FrameCallback = Box<dyn FnOnce()>;

/// Handle of a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

/// Host frame primitive
pub trait FrameHost {
    /// Run `callback` on the next frame
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Drop a pending request; unknown or already-run ids are ignored
    fn cancel_frame(&self, id: FrameRequestId);

    /// False when frames are simulated with a timer
    fn is_supported(&self) -> bool;
}

pub type SharedFrames = Rc<dyn FrameHost>;

/// How frames are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// Driven by the display refresh
    Display,
    /// Degraded fixed-interval timer
    Timer { interval: Duration },
}

/// Host-pumped frame loop
pub struct FrameLoop {
    mode: FrameMode,
    next_id: Cell<u64>,
    pending: RefCell<Vec<(FrameRequestId, FrameCallback)>>,
    frame_count: Cell<u64>,
}

impl FrameLoop {
    pub fn display() -> Self {
        Self::with_mode(FrameMode::Display)
    }

    pub fn timer(interval: Duration) -> Self {
        Self::with_mode(FrameMode::Timer { interval })
    }

    /// Pick the mode from the host's frame capability
    pub fn detect(config: &AnimateConfig, has_frame_callback: bool) -> Self {
        if has_frame_callback {
            Self::display()
        } else {
            tracing::warn!(
                "No frame callback available, falling back to {}ms timer",
                config.fallback_frame_interval_ms
            );
            Self::timer(config.fallback_frame_interval())
        }
    }

    fn with_mode(mode: FrameMode) -> Self {
        Self {
            mode,
            next_id: Cell::new(1),
            pending: RefCell::new(Vec::new()),
            frame_count: Cell::new(0),
        }
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    /// Run one frame: every callback requested before this call, in request
    /// order. Callbacks requested while the frame runs wait for the next one;
    /// callbacks cancelled while it runs are skipped.
    pub fn tick(&self) -> usize {
        let due: Vec<FrameRequestId> = self.pending.borrow().iter().map(|(id, _)| *id).collect();
        self.frame_count.set(self.frame_count.get() + 1);
        let mut count = 0;
        for id in due {
            let callback = {
                let mut pending = self.pending.borrow_mut();
                pending.iter().position(|(pending, _)| *pending == id).map(|i| pending.remove(i).1)
            };
            if let Some(callback) = callback {
                callback();
                count += 1;
            }
        }
        count
    }

    /// Pump frames on the fallback timer until nothing is pending
    pub async fn run_until_idle(&self) {
        let interval = match self.mode {
            FrameMode::Timer { interval } => interval,
            FrameMode::Display => Duration::from_millis(16),
        };
        while self.pending() > 0 {
            smol::Timer::after(interval).await;
            self.tick();
        }
    }
}

impl FrameHost for FrameLoop {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let id = FrameRequestId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.pending.borrow_mut().retain(|(pending, _)| *pending != id);
    }

    fn is_supported(&self) -> bool {
        matches!(self.mode, FrameMode::Display)
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("mode", &self.mode)
            .field("pending", &self.pending())
            .field("frame_count", &self.frame_count())
            .finish()
    }
}
