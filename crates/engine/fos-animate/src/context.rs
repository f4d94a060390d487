//! Animation context
//!
//! Root object owning the services shared by every driver: configuration,
//! the document, frame host, scheduler, cache and script registry.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use fos_dom::{AnimationTimings, Document};

use crate::cache::AnimationCache;
use crate::config::AnimateConfig;
use crate::error::AnimateError;
use crate::frame::SharedFrames;
use crate::runner::AnimationRunner;
use crate::scheduler::{FrameScheduler, Task};
use crate::script::AnimationRegistry;

struct ContextInner {
    config: AnimateConfig,
    document: Document,
    frames: SharedFrames,
    scheduler: FrameScheduler,
    cache: AnimationCache<AnimationTimings>,
    registry: AnimationRegistry,
    /// Tasks for the scheduler's next quiet period
    quiet_tasks: RefCell<Vec<Task>>,
    flush_requested: Cell<bool>,
}

/// Shared animation services; cloning shares the same instance
#[derive(Clone)]
pub struct AnimateContext {
    inner: Rc<ContextInner>,
}

impl AnimateContext {
    pub fn new(config: AnimateConfig, document: Document, frames: SharedFrames) -> Result<Self, AnimateError> {
        config.validate()?;
        tracing::debug!(
            "Animation context: prefix={} drivers={:?} frames_supported={}",
            config.class_prefix,
            config.drivers,
            frames.is_supported()
        );
        Ok(Self {
            inner: Rc::new(ContextInner {
                scheduler: FrameScheduler::new(frames.clone()),
                config,
                document,
                frames,
                cache: AnimationCache::new(),
                registry: AnimationRegistry::new(),
                quiet_tasks: RefCell::new(Vec::new()),
                flush_requested: Cell::new(false),
            }),
        })
    }

    pub fn config(&self) -> &AnimateConfig {
        &self.inner.config
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn frames(&self) -> &SharedFrames {
        &self.inner.frames
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.inner.scheduler
    }

    pub fn cache(&self) -> &AnimationCache<AnimationTimings> {
        &self.inner.cache
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.inner.registry
    }

    /// `<prefix>-<suffix>`
    pub fn class_name(&self, suffix: &str) -> String {
        self.inner.config.class_name(suffix)
    }

    /// Queue `task` for the scheduler's next quiet period. Every task
    /// waiting on this context runs then, after the cache is flushed.
    pub fn wait_until_quiet(&self, task: Task) {
        self.inner.quiet_tasks.borrow_mut().push(task);
        let weak = Rc::downgrade(&self.inner);
        self.inner.scheduler.wait_until_quiet(move || {
            let Some(inner) = weak.upgrade() else { return };
            inner.cache.flush();
            let tasks = std::mem::take(&mut *inner.quiet_tasks.borrow_mut());
            tracing::trace!("Quiet period: running {} style task(s)", tasks.len());
            for task in tasks {
                task();
            }
        });
    }

    /// Flush the cache on the next frame. Waves are not held back.
    pub fn request_cache_flush(&self) {
        if self.inner.flush_requested.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        self.inner.frames.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.flush_requested.set(false);
                inner.cache.flush();
            }
        }));
    }

    /// Tasks waiting for the next quiet period
    pub fn quiet_tasks(&self) -> usize {
        self.inner.quiet_tasks.borrow().len()
    }

    /// Fresh pending runner paced by this context's frames
    pub fn runner(&self) -> AnimationRunner {
        AnimationRunner::new(self.inner.frames.clone())
    }
}

impl fmt::Debug for AnimateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimateContext")
            .field("config", &self.inner.config)
            .field("scheduler", &self.inner.scheduler)
            .field("cached", &self.inner.cache.len())
            .field("quiet_tasks", &self.quiet_tasks())
            .finish()
    }
}
