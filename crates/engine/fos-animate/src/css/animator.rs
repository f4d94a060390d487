//! Style animator
//!
//! # Lifecycle
//!
//! 1. `init`: preparation classes (`<prefix>-<event>`, `<class>-add`,
//!    `<class>-remove`) and `from` styles go on right away, then timings
//!    are probed through the cache.
//! 2. `start`: waits for a quiet period, then adds the `-active` classes
//!    and the `to` styles.
//! 3. Close: on an end event covering the whole duration, on
//!    `end`/`cancel`, or when the closing timer runs out (delay plus 1.5x
//!    the duration, counted in frames). Temporary classes and styles come
//!    off and the final classes and styles are applied.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::{AnimationEndEvent, AnimationTimings, Element, ListenerId};

use super::CssOptions;
use crate::classes::{
    apply_animation_classes, apply_animation_from_styles, apply_animation_styles, merge_classes,
    pend_classes, ACTIVE_CLASS_SUFFIX, ADD_CLASS_SUFFIX, REMOVE_CLASS_SUFFIX,
};
use crate::context::AnimateContext;
use crate::frame::{FrameRequestId, SharedFrames};
use crate::options::AnimationOptions;
use crate::runner::{AnimationRunner, HostFns, PreparedAnimation};
use crate::scheduler::Task;

/// End event elapsed times are compared at this precision
const ELAPSED_TIME_DECIMALS: i32 = 3;

const PLAY_STATE: &str = "animation-play-state";

/// Closing timer length, as a multiple of the longest duration
const CLOSING_TIME_BUFFER: f64 = 1.5;

fn round_elapsed(elapsed: f64) -> f64 {
    let scale = 10f64.powi(ELAPSED_TIME_DECIMALS);
    (elapsed * scale).round() / scale
}

/// State of one style animation
struct CssRun {
    element: Element,
    frames: SharedFrames,
    options: RefCell<AnimationOptions>,
    on_done: RefCell<Option<Box<dyn FnOnce()>>>,
    cleanup_styles: bool,
    preparation_classes: RefCell<String>,
    active_classes: RefCell<String>,
    timings: Cell<AnimationTimings>,
    max_duration: Cell<f64>,
    /// Inline properties set for the animation only
    temporary_styles: RefCell<Vec<String>>,
    /// Prior values of properties overwritten by `to`
    restore_styles: RefCell<BTreeMap<String, Option<String>>>,
    listener: Cell<Option<ListenerId>>,
    expiry: Cell<Option<FrameRequestId>>,
    runner: RefCell<Option<AnimationRunner>>,
    closed: Cell<bool>,
    completed: Cell<bool>,
    paused: Cell<bool>,
}

impl CssRun {
    fn new(
        element: Element,
        frames: SharedFrames,
        options: AnimationOptions,
        on_done: Option<Box<dyn FnOnce()>>,
        cleanup_styles: bool,
    ) -> Self {
        Self {
            element,
            frames,
            options: RefCell::new(options),
            on_done: RefCell::new(on_done),
            cleanup_styles,
            preparation_classes: RefCell::new(String::new()),
            active_classes: RefCell::new(String::new()),
            timings: Cell::new(AnimationTimings::default()),
            max_duration: Cell::new(0.0),
            temporary_styles: RefCell::new(Vec::new()),
            restore_styles: RefCell::new(BTreeMap::new()),
            listener: Cell::new(None),
            expiry: Cell::new(None),
            runner: RefCell::new(None),
            closed: Cell::new(false),
            completed: Cell::new(false),
            paused: Cell::new(false),
        }
    }

    fn set_temporary_style(&self, prop: &str, value: &str) {
        self.element.set_style(prop, value);
        let mut temporary = self.temporary_styles.borrow_mut();
        if !temporary.iter().any(|p| p == prop) {
            temporary.push(prop.to_string());
        }
    }

    fn start(self: Rc<Self>, animator: &CssAnimator) -> AnimationRunner {
        let (on_end, on_cancel, on_pause, on_resume) =
            (Rc::clone(&self), Rc::clone(&self), Rc::clone(&self), Rc::clone(&self));
        let runner = AnimationRunner::with_host(
            animator.ctx.frames().clone(),
            HostFns::new()
                .on_end(move || on_end.close(false))
                .on_cancel(move || on_cancel.close(true))
                .on_pause(move || on_pause.play_pause(false))
                .on_resume(move || on_resume.play_pause(true))
                .into_host(),
        );
        *self.runner.borrow_mut() = Some(runner.clone());

        let run = Rc::clone(&self);
        let frame_ms = animator.ctx.config().fallback_frame_interval_ms;
        animator.wait_until_quiet(Box::new(move || run.begin(frame_ms)));
        runner
    }

    /// Runs once the starting state had a frame to register
    fn begin(self: Rc<Self>, frame_ms: u64) {
        if self.closed.get() {
            return;
        }
        if !self.element.has_parent() {
            self.close(false);
            return;
        }

        let active = self.active_classes.borrow().clone();
        if !active.is_empty() {
            self.element.add_class(&active);
        }

        let weak = Rc::downgrade(&self);
        let id = self.element.on_animation_end(move |event| {
            if let Some(run) = weak.upgrade() {
                run.on_animation_end(event);
            }
        });
        self.listener.set(Some(id));

        let to = self.options.borrow_mut().to.take();
        if let Some(to) = to {
            if self.cleanup_styles {
                let mut restore = self.restore_styles.borrow_mut();
                for (prop, _) in to.iter() {
                    restore.entry(prop.to_string()).or_insert_with(|| self.element.style(prop));
                }
            }
            self.element.set_styles(&to);
        }
        self.arm_expiry(self.expiry_frames(frame_ms));

        tracing::trace!(
            "Style animation running on {:?} for {}s",
            self.element.id(),
            self.max_duration.get()
        );
    }

    fn expiry_frames(&self, frame_ms: u64) -> u64 {
        let seconds = self.timings.get().max_delay() + CLOSING_TIME_BUFFER * self.max_duration.get();
        let frames = (seconds * 1000.0 / frame_ms.max(1) as f64).ceil();
        frames.max(1.0) as u64
    }

    /// Closes the animation after `remaining` frames unless an end event
    /// got there first
    fn arm_expiry(self: &Rc<Self>, remaining: u64) {
        let weak = Rc::downgrade(self);
        let id = self.frames.request_frame(Box::new(move || {
            let Some(run) = weak.upgrade() else { return };
            run.expiry.set(None);
            if run.closed.get() {
                return;
            }
            if remaining > 1 {
                run.arm_expiry(remaining - 1);
            } else {
                tracing::debug!("Style animation on {:?} expired without an end event", run.element.id());
                run.close(false);
            }
        }));
        self.expiry.set(Some(id));
    }

    fn on_animation_end(&self, event: &AnimationEndEvent) {
        if round_elapsed(event.elapsed_time) >= self.max_duration.get() {
            self.completed.set(true);
            self.close(false);
        }
    }

    fn play_pause(&self, play: bool) {
        if !self.completed.get() {
            self.paused.set(!play);
            if self.timings.get().animation_duration > 0.0 {
                if play {
                    self.element.remove_style(PLAY_STATE);
                    self.temporary_styles.borrow_mut().retain(|p| p != PLAY_STATE);
                } else {
                    self.set_temporary_style(PLAY_STATE, "paused");
                }
            }
        } else if self.paused.get() && play {
            self.paused.set(false);
            self.close(false);
        }
    }

    fn close(&self, rejected: bool) {
        // a completed animation stays put until resumed
        if self.closed.get() || (self.completed.get() && self.paused.get()) {
            return;
        }
        self.closed.set(true);
        self.paused.set(false);

        let preparation = self.preparation_classes.take();
        if !preparation.is_empty() {
            self.element.remove_class(&preparation);
        }
        let active = self.active_classes.take();
        if !active.is_empty() {
            self.element.remove_class(&active);
        }
        for prop in self.temporary_styles.take() {
            self.element.remove_style(&prop);
        }

        {
            let mut options = self.options.borrow_mut();
            apply_animation_classes(&self.element, &mut options);
            apply_animation_styles(&self.element, &mut options);
        }
        for (prop, prior) in self.restore_styles.take() {
            match prior {
                Some(value) => self.element.set_style(&prop, &value),
                None => self.element.remove_style(&prop),
            }
        }

        let on_done = self.on_done.borrow_mut().take();
        if let Some(on_done) = on_done {
            on_done();
        }
        if let Some(id) = self.listener.take() {
            self.element.off_animation_end(id);
        }
        if let Some(id) = self.expiry.take() {
            self.frames.cancel_frame(id);
        }

        let runner = self.runner.borrow().clone();
        if let Some(runner) = runner {
            runner.complete(!rejected);
        }
    }
}

/// Builds style-driven animations
#[derive(Clone)]
pub struct CssAnimator {
    ctx: AnimateContext,
}

impl CssAnimator {
    pub fn new(ctx: AnimateContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AnimateContext {
        &self.ctx
    }

    /// Shared with every style animation on this context's scheduler
    fn wait_until_quiet(&self, task: Task) {
        self.ctx.wait_until_quiet(task);
    }

    /// Prepare a style animation on `element`. Declined animations close
    /// right away (final classes and styles applied) and report
    /// `will_animate() == false`.
    pub fn init(&self, element: &Element, options: CssOptions) -> PreparedAnimation {
        let CssOptions {
            event,
            structural,
            add_class,
            remove_class,
            from,
            to,
            duration,
            apply_classes_early,
            cleanup_styles,
            on_done,
        } = options;

        let final_options = AnimationOptions {
            add_class: add_class.clone(),
            remove_class: remove_class.clone(),
            from,
            to,
            ..AnimationOptions::default()
        };
        let run = Rc::new(CssRun::new(
            element.clone(),
            self.ctx.frames().clone(),
            final_options,
            on_done,
            cleanup_styles,
        ));

        if !self.ctx.config().enabled || !element.has_parent() {
            return self.decline(run, "element is detached");
        }
        let capabilities = self.ctx.document().capabilities();
        if !capabilities.any() {
            return self.decline(run, "no transition or keyframe support");
        }

        let structural_class = match event {
            Some(event) if structural => self.ctx.class_name(event.name()),
            _ => String::new(),
        };
        let add_remove_classes = merge_classes(
            &pend_classes(add_class.as_deref().unwrap_or(""), ADD_CLASS_SUFFIX, false),
            &pend_classes(remove_class.as_deref().unwrap_or(""), REMOVE_CLASS_SUFFIX, false),
        );
        if apply_classes_early && !add_remove_classes.is_empty() {
            apply_animation_classes(element, &mut run.options.borrow_mut());
        }

        let preparation = merge_classes(&structural_class, &add_remove_classes);
        let has_to_styles = run.options.borrow().to.as_ref().is_some_and(|to| !to.is_empty());
        if !has_to_styles && preparation.is_empty() {
            return self.decline(run, "nothing to animate");
        }

        let event_name = event.map(|e| e.name()).unwrap_or("");
        let cache_key =
            self.ctx.cache().cache_key(element, event_name, add_class.as_deref(), remove_class.as_deref());
        if self.ctx.cache().contains_cached_animation_without_duration(&cache_key) {
            return self.decline(run, "cached without duration");
        }

        if !preparation.is_empty() {
            element.add_class(&preparation);
        }
        *run.preparation_classes.borrow_mut() = preparation.clone();
        apply_animation_from_styles(element, &mut run.options.borrow_mut());

        let is_structural = structural && event.is_some();
        let timings = self.compute_timings(element, &cache_key, !is_structural);
        run.timings.set(timings);

        let mut max_duration = timings.max_duration();
        if let Some(duration) = duration {
            max_duration = duration;
            if duration > 0.0 {
                let value = format!("{}s", duration);
                if timings.animation_duration > 0.0 {
                    run.set_temporary_style("animation-duration", &value);
                }
                if timings.transition_duration > 0.0 || timings.animation_duration == 0.0 {
                    run.set_temporary_style("transition-duration", &value);
                }
            }
        }
        if max_duration <= 0.0 {
            return self.decline(run, "zero duration");
        }
        run.max_duration.set(max_duration);
        *run.active_classes.borrow_mut() = pend_classes(&preparation, ACTIVE_CLASS_SUFFIX, false);

        tracing::debug!(
            "Style animation prepared on {:?}: event={} classes='{}' duration={}s",
            element.id(),
            event_name,
            preparation,
            max_duration
        );

        let animator = self.clone();
        let closer = Rc::clone(&run);
        PreparedAnimation::new(self.ctx.frames().clone(), move || run.start(&animator))
            .on_close(move || closer.close(false))
    }

    fn decline(&self, run: Rc<CssRun>, reason: &str) -> PreparedAnimation {
        tracing::trace!("Style animation declined on {:?}: {}", run.element.id(), reason);
        // cached timings stay valid for the rest of this frame
        self.ctx.request_cache_flush();
        run.close(false);
        PreparedAnimation::noop(self.ctx.frames().clone())
    }

    fn compute_timings(&self, element: &Element, cache_key: &str, allow_no_duration: bool) -> AnimationTimings {
        let cache = self.ctx.cache();
        let timings = match cache.get(cache_key) {
            Some(timings) => timings,
            None => element.computed_timings(),
        };
        let has_duration = allow_no_duration || timings.has_duration();
        cache.put(cache_key, timings, has_duration);
        timings
    }
}

impl fmt::Debug for CssAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssAnimator")
            .field("quiet_tasks", &self.ctx.quiet_tasks())
            .finish()
    }
}
