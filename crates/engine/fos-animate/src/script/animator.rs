//! Script animator
//!
//! Runs the registered animations matching an element in two phases. The
//! before phase (absent for enter and move) runs while the DOM is still in
//! its old state; class and DOM changes are applied between the phases;
//! the after phase runs on the new state. Members of a phase run in
//! parallel, phases in sequence.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fos_dom::Element;

use super::{Hook, HookContext, HookDone, HookHandler, HookReturn, ScriptAnimation};
use crate::classes::{apply_animation_classes, apply_animation_styles, merge_classes};
use crate::context::AnimateContext;
use crate::options::{AnimationEvent, AnimationOptions};
use crate::runner::{AnimationRunner, ChainStep, HostFns, PreparedAnimation};

/// Stops the members of a running phase; `true` cancels them
type PhaseEnd = Box<dyn FnOnce(bool)>;

/// Handlers of one phase, with the event each one is told about
struct Phase {
    operations: Vec<(AnimationEvent, HookHandler)>,
}

impl Phase {
    fn package(event: AnimationEvent, animations: &[Rc<ScriptAnimation>], hook: Hook) -> Option<Phase> {
        let mut operations: Vec<_> = animations
            .iter()
            .filter_map(|animation| animation.handler(hook))
            .map(|handler| (event, handler))
            .collect();

        if operations.is_empty() {
            if let Some(halves) = hook.fan_out() {
                for (event, hook) in halves {
                    operations.extend(
                        animations
                            .iter()
                            .filter_map(|animation| animation.handler(hook))
                            .map(|handler| (event, handler)),
                    );
                }
            }
        }

        (!operations.is_empty()).then_some(Phase { operations })
    }

    fn start(self, base: &HookContext, on_done: Box<dyn FnOnce(bool)>) -> PhaseEnd {
        let runners: Vec<AnimationRunner> = self
            .operations
            .iter()
            .map(|(event, handler)| run_hook(base, *event, handler))
            .collect();
        AnimationRunner::all(&runners, on_done);
        Box::new(move |cancel| {
            for runner in &runners {
                if cancel {
                    runner.cancel();
                } else {
                    runner.end();
                }
            }
        })
    }
}

/// Invoke one handler, wrapping whatever it reports in a runner
fn run_hook(base: &HookContext, event: AnimationEvent, handler: &HookHandler) -> AnimationRunner {
    let runner = base.runner();
    let resolved = Rc::new(Cell::new(false));
    let on_end: Rc<RefCell<Option<Box<dyn FnOnce(bool)>>>> = Rc::new(RefCell::new(None));

    // `in_frame`: reported by another runner's listener, which already
    // waited its frame
    let finish: Rc<dyn Fn(bool, bool)> = {
        let runner = runner.clone();
        let on_end = Rc::clone(&on_end);
        Rc::new(move |cancelled: bool, in_frame: bool| {
            if resolved.replace(true) {
                return;
            }
            let callback = on_end.borrow_mut().take();
            if let Some(callback) = callback {
                callback(cancelled);
            }
            if in_frame {
                runner.resolve_now(!cancelled);
            } else {
                runner.complete(!cancelled);
            }
        })
    };

    let (on_host_end, on_host_cancel) = (Rc::clone(&finish), Rc::clone(&finish));
    runner.set_host(
        HostFns::new()
            .on_end(move || on_host_end(false, false))
            .on_cancel(move || on_host_cancel(true, false))
            .into_host(),
    );

    let mut context = base.clone();
    context.event = event;
    let done = {
        let finish = Rc::clone(&finish);
        HookDone::new(move |status| finish(!status, false))
    };

    match handler(&context, done) {
        HookReturn::Nothing => {}
        HookReturn::Runner(inner) => inner.done(move |status| finish(!status, true)),
        HookReturn::Prepared(prepared) => prepared.start().done(move |status| finish(!status, true)),
        HookReturn::OnEnd(callback) => *on_end.borrow_mut() = Some(callback),
    }
    runner
}

/// Shared state of one script animation run
struct ScriptRun {
    element: Element,
    options: RefCell<AnimationOptions>,
    closed: Cell<bool>,
    active: RefCell<Option<PhaseEnd>>,
}

impl ScriptRun {
    fn apply_options(&self) {
        let operation = self.options.borrow().dom_operation.clone();
        if let Some(operation) = operation {
            operation.run();
        }
        apply_animation_classes(&self.element, &mut self.options.borrow_mut());
    }

    fn close(&self) {
        self.closed.set(true);
        self.apply_options();
        apply_animation_styles(&self.element, &mut self.options.borrow_mut());
    }

    fn phase_step(self: &Rc<Self>, phase: Phase, base: HookContext) -> ChainStep {
        let run = Rc::clone(self);
        Box::new(move |done| {
            if run.closed.get() {
                done(false);
                return;
            }
            let end = phase.start(&base, done);
            *run.active.borrow_mut() = Some(end);
        })
    }

    fn start(self: Rc<Self>, ctx: &AnimateContext, base: HookContext, before: Option<Phase>, after: Option<Phase>) -> AnimationRunner {
        let runner = ctx.runner();

        let on_complete: Rc<dyn Fn(bool)> = {
            let run = Rc::clone(&self);
            let runner = runner.clone();
            Rc::new(move |success| {
                if run.closed.get() {
                    return;
                }
                run.close();
                runner.complete(success);
            })
        };

        let end_animations: Rc<dyn Fn(bool)> = {
            let run = Rc::clone(&self);
            let on_complete = Rc::clone(&on_complete);
            Rc::new(move |cancelled| {
                if run.closed.get() {
                    return;
                }
                let active = run.active.borrow_mut().take();
                if let Some(active) = active {
                    active(cancelled);
                }
                on_complete(!cancelled);
            })
        };
        let (on_end, on_cancel) = (Rc::clone(&end_animations), end_animations);
        runner.set_host(
            HostFns::new()
                .on_end(move || on_end(false))
                .on_cancel(move || on_cancel(true))
                .into_host(),
        );

        let mut steps: Vec<ChainStep> = Vec::new();
        if let Some(phase) = before {
            steps.push(self.phase_step(phase, base.clone()));
            let run = Rc::clone(&self);
            steps.push(Box::new(move |done| {
                run.apply_options();
                done(true);
            }));
        } else {
            self.apply_options();
        }
        if let Some(phase) = after {
            steps.push(self.phase_step(phase, base));
        }

        AnimationRunner::chain(steps, move |success| on_complete(success));
        runner
    }
}

/// Builds script animations from the registry
#[derive(Debug, Clone)]
pub struct ScriptAnimator {
    ctx: AnimateContext,
}

impl ScriptAnimator {
    pub fn new(ctx: AnimateContext) -> Self {
        Self { ctx }
    }

    /// Prepare the script animation for `event`, or `None` when no
    /// registered animation has a handler for it. `classes` defaults to the
    /// element's classes plus the requested changes.
    pub fn init(
        &self,
        element: &Element,
        event: AnimationEvent,
        classes: Option<&str>,
        options: AnimationOptions,
    ) -> Option<PreparedAnimation> {
        let classes = match classes {
            Some(classes) => classes.to_string(),
            None => merge_classes(
                &element.class_attribute(),
                &merge_classes(
                    options.add_class.as_deref().unwrap_or(""),
                    options.remove_class.as_deref().unwrap_or(""),
                ),
            ),
        };

        let animations = self.ctx.registry().lookup(&classes);
        if animations.is_empty() {
            return None;
        }

        let before = Hook::before(event).and_then(|hook| Phase::package(event, &animations, hook));
        let after = Phase::package(event, &animations, Hook::after(event));
        if before.is_none() && after.is_none() {
            return None;
        }
        tracing::debug!(
            "Script animation for {} on {:?}: {} animations, before={} after={}",
            event,
            element.id(),
            animations.len(),
            before.is_some(),
            after.is_some()
        );

        let base = HookContext {
            element: element.clone(),
            event,
            add_class: options.add_class.clone(),
            remove_class: options.remove_class.clone(),
            from: options.from.clone(),
            to: options.to.clone(),
            frames: self.ctx.frames().clone(),
        };
        let run = Rc::new(ScriptRun {
            element: element.clone(),
            options: RefCell::new(options),
            closed: Cell::new(false),
            active: RefCell::new(None),
        });

        let ctx = self.ctx.clone();
        let closer = Rc::clone(&run);
        Some(
            PreparedAnimation::new(self.ctx.frames().clone(), move || run.start(&ctx, base, before, after))
                .on_close(move || closer.close()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimateConfig;
    use crate::frame::FrameLoop;
    use fos_dom::Document;

    fn setup() -> (Rc<FrameLoop>, AnimateContext, Element) {
        let frames = Rc::new(FrameLoop::display());
        let doc = Document::new();
        let ctx = AnimateContext::new(AnimateConfig::default(), doc.clone(), frames.clone()).unwrap();
        let el = doc.create_element("div");
        doc.body().append_child(&el).unwrap();
        (frames, ctx, el)
    }

    fn logging(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> impl Fn(&HookContext, HookDone) -> HookReturn + 'static {
        let log = log.clone();
        move |ctx, done| {
            log.borrow_mut().push(format!("{}:{}", label, ctx.event));
            done.complete();
            HookReturn::Nothing
        }
    }

    #[test]
    fn test_no_matching_animation_declines() {
        let (_frames, ctx, el) = setup();
        el.add_class("plain");
        let animator = ScriptAnimator::new(ctx);
        assert!(animator.init(&el, AnimationEvent::Enter, None, AnimationOptions::new()).is_none());
    }

    #[test]
    fn test_missing_hook_declines() {
        let (_frames, ctx, el) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        ctx.registry()
            .register(".fade", move || ScriptAnimation::new().on(Hook::Leave, logging(&l, "leave")))
            .unwrap();
        el.add_class("fade");
        let animator = ScriptAnimator::new(ctx);
        assert!(animator.init(&el, AnimationEvent::Enter, None, AnimationOptions::new()).is_none());
    }

    #[test]
    fn test_before_phase_precedes_class_change() {
        let (frames, ctx, el) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2) = (log.clone(), log.clone());
        let probe = el.clone();
        ctx.registry()
            .register(".box", move || {
                ScriptAnimation::new()
                    .on(Hook::BeforeAddClass, move |_, done| {
                        l1.borrow_mut().push(format!("before:{}", probe.has_class("on")));
                        done.complete();
                        HookReturn::Nothing
                    })
                    .on(Hook::AddClass, logging(&l2, "after"))
            })
            .unwrap();
        el.add_class("box");

        let animator = ScriptAnimator::new(ctx);
        let prepared = animator
            .init(&el, AnimationEvent::AddClass, None, AnimationOptions::new().add_class("on"))
            .unwrap();
        let runner = prepared.start();
        assert_eq!(*log.borrow(), vec!["before:false"]);

        frames.tick();
        assert_eq!(*log.borrow(), vec!["before:false", "after:addClass"]);
        assert!(el.has_class("on"));

        frames.tick();
        frames.tick();
        assert_eq!(runner.status(), Some(true));
    }

    #[test]
    fn test_set_class_fans_out_remove_then_add() {
        let (frames, ctx, el) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2) = (log.clone(), log.clone());
        ctx.registry()
            .register(".swap", move || {
                ScriptAnimation::new()
                    .on(Hook::AddClass, logging(&l1, "add"))
                    .on(Hook::RemoveClass, logging(&l2, "remove"))
            })
            .unwrap();
        el.add_class("swap old");

        let animator = ScriptAnimator::new(ctx);
        let prepared = animator
            .init(
                &el,
                AnimationEvent::SetClass,
                None,
                AnimationOptions::new().add_class("new").remove_class("old"),
            )
            .unwrap();
        prepared.start();
        for _ in 0..4 {
            frames.tick();
        }
        assert_eq!(*log.borrow(), vec!["remove:removeClass", "add:addClass"]);
        assert_eq!(el.class_attribute(), "swap new");
    }

    #[test]
    fn test_resolves_one_frame_after_returned_runner() {
        let (frames, ctx, el) = setup();
        let slot: Rc<RefCell<Option<AnimationRunner>>> = Rc::new(RefCell::new(None));
        let s = slot.clone();
        ctx.registry()
            .register(".fade", move || {
                let s = s.clone();
                ScriptAnimation::new().on(Hook::Enter, move |ctx, _| {
                    let runner = ctx.runner();
                    *s.borrow_mut() = Some(runner.clone());
                    HookReturn::Runner(runner)
                })
            })
            .unwrap();
        el.add_class("fade");

        let animator = ScriptAnimator::new(ctx);
        let runner = animator
            .init(&el, AnimationEvent::Enter, None, AnimationOptions::new())
            .unwrap()
            .start();
        let hook_runner = slot.borrow().clone().unwrap();
        frames.tick();
        assert!(!runner.is_done());

        hook_runner.complete(true);
        frames.tick();
        assert!(hook_runner.is_done());
        assert!(!runner.is_done());
        frames.tick();
        assert_eq!(runner.status(), Some(true));
    }

    #[test]
    fn test_cancel_forwards_to_active_phase() {
        let (frames, ctx, el) = setup();
        let ended = Rc::new(Cell::new(None));
        let e = ended.clone();
        ctx.registry()
            .register(".slow", move || {
                let e = e.clone();
                ScriptAnimation::new().on(Hook::Enter, move |_, _done| {
                    let e = e.clone();
                    HookReturn::OnEnd(Box::new(move |cancelled| e.set(Some(cancelled))))
                })
            })
            .unwrap();
        el.add_class("slow");

        let animator = ScriptAnimator::new(ctx);
        let runner = animator
            .init(&el, AnimationEvent::Enter, None, AnimationOptions::new())
            .unwrap()
            .start();
        runner.cancel();
        assert_eq!(ended.get(), Some(true));
        frames.tick();
        assert_eq!(runner.status(), Some(false));
    }

    #[test]
    fn test_end_before_start_applies_options() {
        let (_frames, ctx, el) = setup();
        ctx.registry()
            .register(".x", || ScriptAnimation::new().on(Hook::AddClass, |_, _| HookReturn::Nothing))
            .unwrap();
        el.add_class("x");
        let animator = ScriptAnimator::new(ctx);
        let prepared = animator
            .init(&el, AnimationEvent::AddClass, None, AnimationOptions::new().add_class("y"))
            .unwrap();
        let runner = prepared.end();
        assert!(el.has_class("y"));
        assert_eq!(runner.status(), Some(true));
    }
}
