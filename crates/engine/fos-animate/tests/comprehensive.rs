//! Comprehensive tests for fos-animate
//!
//! Runner contracts, scheduler pacing, class resolution, cache behaviour
//! and end-to-end animations through the queue.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use fos_animate::runner::ChainStep;
use fos_animate::{
    resolve_element_classes, AnimateConfig, AnimateContext, AnimationCache, AnimationCancelled, AnimationEvent,
    AnimationOptions, AnimationQueue, AnimationRunner, FrameLoop, FrameScheduler, Hook, HookReturn,
    ScriptAnimation, SharedFrames,
};
use fos_dom::{AnimationEndEvent, Document, Element, StyleMap, TimingRule};

fn frames() -> (Rc<FrameLoop>, SharedFrames) {
    let frames = Rc::new(FrameLoop::display());
    let shared: SharedFrames = frames.clone();
    (frames, shared)
}

struct Page {
    frames: Rc<FrameLoop>,
    doc: Document,
    ctx: AnimateContext,
    queue: AnimationQueue,
}

fn page() -> Page {
    let frames = Rc::new(FrameLoop::display());
    let doc = Document::new();
    let ctx = AnimateContext::new(AnimateConfig::default(), doc.clone(), frames.clone()).unwrap();
    let queue = AnimationQueue::new(ctx.clone());
    Page { frames, doc, ctx, queue }
}

fn attach(doc: &Document, classes: &str) -> Element {
    let el = doc.create_element("div");
    el.set_class_attribute(classes);
    doc.body().append_child(&el).unwrap();
    el
}

fn tick_until_done(frames: &FrameLoop, runner: &AnimationRunner, max: usize) -> usize {
    let mut ticks = 0;
    while !runner.is_done() && ticks < max {
        frames.tick();
        ticks += 1;
    }
    ticks
}

// Runner

#[test]
fn test_done_after_end_fires_once_asynchronously() {
    let (frames, shared) = frames();
    let runner = AnimationRunner::new(shared);
    runner.end();

    let calls = Rc::new(RefCell::new(Vec::new()));
    let c = calls.clone();
    runner.done(move |status| c.borrow_mut().push(status));
    assert!(calls.borrow().is_empty());

    frames.tick();
    frames.tick();
    assert_eq!(*calls.borrow(), vec![true]);
}

#[test]
fn test_cancel_after_end_is_noop() {
    let (frames, shared) = frames();
    let runner = AnimationRunner::new(shared);
    runner.end();
    frames.tick();
    runner.cancel();
    assert_eq!(runner.status(), Some(true));
}

#[test]
fn test_all_completes_after_every_member() {
    let (frames, shared) = frames();
    let runners: Vec<_> = (0..3).map(|_| AnimationRunner::new(shared.clone())).collect();
    let results = Rc::new(RefCell::new(Vec::new()));
    let r = results.clone();
    AnimationRunner::all(&runners, move |status| r.borrow_mut().push(status));

    runners[0].end();
    runners[1].end();
    frames.tick();
    assert!(results.borrow().is_empty());

    runners[2].end();
    frames.tick();
    assert_eq!(*results.borrow(), vec![true]);
}

#[test]
fn test_all_reports_cancel_without_waiting() {
    let (frames, shared) = frames();
    let runners: Vec<_> = (0..3).map(|_| AnimationRunner::new(shared.clone())).collect();
    let results = Rc::new(RefCell::new(Vec::new()));
    let r = results.clone();
    AnimationRunner::all(&runners, move |status| r.borrow_mut().push(status));

    runners[2].cancel();
    frames.tick();
    assert_eq!(*results.borrow(), vec![false]);
    // siblings keep running
    assert!(!runners[0].is_done());
    assert!(!runners[1].is_done());

    runners[0].end();
    runners[1].end();
    frames.tick();
    assert_eq!(*results.borrow(), vec![false]);
}

#[test]
fn test_chain_stops_at_first_failure() {
    let ran = Rc::new(RefCell::new(Vec::new()));
    let steps: Vec<ChainStep> = (0..3)
        .map(|i| {
            let ran = ran.clone();
            let step: ChainStep = Box::new(move |next| {
                ran.borrow_mut().push(i);
                next(false);
            });
            step
        })
        .collect();
    let result = Rc::new(Cell::new(None));
    let r = result.clone();
    AnimationRunner::chain(steps, move |ok| r.set(Some(ok)));

    assert_eq!(*ran.borrow(), vec![0]);
    assert_eq!(result.get(), Some(false));
}

#[test]
fn test_future_rejects_when_cancelled() {
    let frames = Rc::new(FrameLoop::timer(Duration::from_millis(1)));
    let shared: SharedFrames = frames.clone();
    let runner = AnimationRunner::new(shared);
    let fut = runner.future();
    runner.cancel();

    let result = smol::block_on(async {
        frames.run_until_idle().await;
        fut.await
    });
    assert_eq!(result, Err(AnimationCancelled));
}

// Scheduler

#[test]
fn test_five_waves_one_frame_apart() {
    let (frames, shared) = frames();
    let scheduler = FrameScheduler::new(shared);
    let log = Rc::new(RefCell::new(Vec::new()));
    let waves = (0..5).map(|i| {
        let log = log.clone();
        let task: Box<dyn FnOnce()> = Box::new(move || log.borrow_mut().push(i));
        vec![task]
    });
    scheduler.schedule(waves);
    assert_eq!(*log.borrow(), vec![0]);

    for expected in 1..5 {
        frames.tick();
        assert_eq!(log.borrow().len(), expected + 1);
    }
    assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_second_quiet_callback_wins() {
    let (frames, shared) = frames();
    let scheduler = FrameScheduler::new(shared);
    let fired = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (fired.clone(), fired.clone());
    scheduler.wait_until_quiet(move || a.borrow_mut().push("first"));
    scheduler.wait_until_quiet(move || b.borrow_mut().push("second"));

    frames.tick();
    frames.tick();
    assert_eq!(*fired.borrow(), vec!["second"]);
}

// Class resolution and cache

#[test]
fn test_conflicting_class_add_wins() {
    let delta = resolve_element_classes("a b", "b c", "a c");
    assert_eq!(delta.add_class, "c");
    assert_eq!(delta.remove_class, "a");
}

#[test]
fn test_cache_put_twice_keeps_first_validity() {
    let cache = AnimationCache::new();
    cache.put("key", "first", true);
    cache.put("key", "second", false);
    assert_eq!(cache.count("key"), 2);
    assert_eq!(cache.get("key"), Some("second"));
    assert!(!cache.contains_cached_animation_without_duration("key"));

    cache.flush();
    assert_eq!(cache.count("key"), 0);
}

#[test]
fn test_cache_key_memoizes_parent_token() {
    let doc = Document::new();
    let parent = attach(&doc, "list");
    let a = doc.create_element("li");
    let b = doc.create_element("li");
    parent.append_child(&a).unwrap();
    parent.append_child(&b).unwrap();

    let cache: AnimationCache<u32> = AnimationCache::new();
    let key_a = cache.cache_key(&a, "enter", None, None);
    let key_b = cache.cache_key(&b, "enter", None, None);
    assert_eq!(key_a, key_b);

    let detached = doc.create_element("li");
    assert!(cache.cache_key(&detached, "enter", Some("on"), None).starts_with("0 enter"));
}

// End to end

#[test]
fn test_fade_enter_runs_script_animation() {
    let page = page();
    let entered = Rc::new(Cell::new(0));
    let e = entered.clone();
    page.ctx
        .registry()
        .register(".fade", move || {
            let e = e.clone();
            ScriptAnimation::new().on(Hook::Enter, move |_, done| {
                e.set(e.get() + 1);
                done.complete();
                HookReturn::Nothing
            })
        })
        .unwrap();

    let el = attach(&page.doc, "fade");
    let runner = page.queue.animate(&el, AnimationEvent::Enter, AnimationOptions::new());
    page.queue.flush();
    assert_eq!(entered.get(), 1);

    tick_until_done(&page.frames, &runner, 10);
    assert_eq!(runner.status(), Some(true));
    assert!(!el.has_class("fos-animate"));
}

#[test]
fn test_top_level_resolves_one_frame_after_hook_runner() {
    let page = page();
    let inner: Rc<RefCell<Option<AnimationRunner>>> = Rc::new(RefCell::new(None));
    let slot = inner.clone();
    page.ctx
        .registry()
        .register(".fade", move || {
            let slot = slot.clone();
            ScriptAnimation::new().on(Hook::Enter, move |ctx, _| {
                let runner = ctx.runner();
                *slot.borrow_mut() = Some(runner.clone());
                HookReturn::Runner(runner)
            })
        })
        .unwrap();

    let el = attach(&page.doc, "fade");
    let runner = page.queue.animate(&el, AnimationEvent::Enter, AnimationOptions::new());
    page.queue.flush();
    for _ in 0..3 {
        page.frames.tick();
    }
    assert!(!runner.is_done());

    let hook_runner = inner.borrow().clone().unwrap();
    hook_runner.complete(true);
    page.frames.tick();
    assert!(hook_runner.is_done());
    assert!(!runner.is_done());

    page.frames.tick();
    assert_eq!(runner.status(), Some(true));
    assert!(!el.has_class("fos-animate"));
}

#[test]
fn test_css_enter_through_queue() {
    let page = page();
    page.doc.add_timing_rule(TimingRule::new(".item.fos-enter").transition(0.3, 0.0));
    let el = attach(&page.doc, "item");

    let runner = page.queue.animate(&el, AnimationEvent::Enter, AnimationOptions::new().add_class("shown"));
    page.queue.flush();
    assert!(el.has_class("fos-enter"));
    assert!(el.has_class("fos-animate"));
    assert!(el.has_class("shown"));

    page.frames.tick();
    assert!(el.has_class("fos-enter-active"));
    el.dispatch_animation_end(AnimationEndEvent::transition(0.3));

    tick_until_done(&page.frames, &runner, 5);
    assert_eq!(runner.status(), Some(true));
    assert_eq!(el.class_attribute(), "item shown");
}

#[test]
fn test_css_leave_removes_element_when_done() {
    let page = page();
    page.doc.add_timing_rule(TimingRule::new(".fos-leave").transition(0.5, 0.0));
    let el = attach(&page.doc, "item");
    let target = el.clone();
    let options = AnimationOptions::new().dom_operation(move || target.remove());

    let runner = page.queue.animate(&el, AnimationEvent::Leave, options);
    page.queue.flush();
    page.frames.tick();
    assert!(el.has_parent());

    el.dispatch_animation_end(AnimationEndEvent::transition(0.5));
    assert!(!el.has_parent());
    tick_until_done(&page.frames, &runner, 5);
    assert_eq!(runner.status(), Some(true));
}

#[test]
fn test_cancelling_entry_cancels_driver_animation() {
    let page = page();
    page.doc.add_timing_rule(TimingRule::new(".fos-enter").transition(2.0, 0.0));
    let el = attach(&page.doc, "item");

    let runner = page.queue.animate(&el, AnimationEvent::Enter, AnimationOptions::new());
    page.queue.flush();
    page.frames.tick();
    assert!(el.has_class("fos-enter-active"));

    runner.cancel();
    assert!(!el.has_class("fos-enter"));
    assert!(!el.has_class("fos-enter-active"));
    assert_eq!(runner.status(), Some(false));
    for _ in 0..3 {
        page.frames.tick();
    }
    assert!(!el.has_class("fos-animate"));
}

#[test]
fn test_style_animation_applies_to_styles() {
    let page = page();
    let el = attach(&page.doc, "panel");
    let options = AnimationOptions::new()
        .from_styles(StyleMap::from_pairs(&[("height", "0px")]))
        .to_styles(StyleMap::from_pairs(&[("height", "200px")]))
        .duration(0.2);

    let runner = page.queue.animate(&el, AnimationEvent::Animate, options);
    page.queue.flush();
    assert_eq!(el.style("height").as_deref(), Some("0px"));
    page.frames.tick();
    assert_eq!(el.style("height").as_deref(), Some("200px"));

    el.dispatch_animation_end(AnimationEndEvent::transition(0.2));
    tick_until_done(&page.frames, &runner, 5);
    assert_eq!(runner.status(), Some(true));
    assert_eq!(el.style("transition-duration"), None);
}
