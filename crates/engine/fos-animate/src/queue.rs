//! Animation Queue
//!
//! Collects animation requests between re-render notifications, merges
//! class changes queued for the same element, pairs leave/enter requests
//! that share anchors, and hands the work to the frame scheduler
//! parent-first: an element animates one wave after its nearest animating
//! ancestor.
//!
//! # Lifecycle of an entry
//!
//! 1. `animate`: queued, caller receives the entry runner
//! 2. `flush`: grouped and sorted into waves; waiting entries get a
//!    `<prefix>-<event>-prepare` class
//! 3. wave: the first driver willing to animate takes over; the entry
//!    runner delegates control to the driver runner
//! 4. close: final classes and styles, DOM operation, temporary classes
//!    removed, entry runner completed

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::{Element, NodeId};

use crate::classes::{apply_animation_classes, apply_animation_styles, merge_animation_details, merge_classes};
use crate::config::DriverKind;
use crate::context::AnimateContext;
use crate::css::CssDriver;
use crate::driver::AnimationDriver;
use crate::options::{
    AnchorPair, AnchoredDetails, AnimationDetails, AnimationEvent, AnimationOptions, AnimationRequest,
};
use crate::runner::{AnimationRunner, HostFns, PreparedAnimation};
use crate::scheduler::{Task, Wave};
use crate::script::ScriptDriver;

fn is_class_event(event: AnimationEvent) -> bool {
    matches!(event, AnimationEvent::AddClass | AnimationEvent::RemoveClass | AnimationEvent::SetClass)
}

/// One queued request and the runner handed to its caller
struct QueueEntry {
    element: Element,
    event: Cell<AnimationEvent>,
    structural: bool,
    classes: RefCell<String>,
    options: RefCell<AnimationOptions>,
    temp_classes: RefCell<Option<String>>,
    preparation_class: Option<String>,
    animate_class: String,
    runner: AnimationRunner,
    closed: Cell<bool>,
}

type SharedEntry = Rc<QueueEntry>;

impl QueueEntry {
    fn refresh_classes(&self) {
        let options = self.options.borrow();
        let pending = merge_classes(
            options.add_class.as_deref().unwrap_or(""),
            options.remove_class.as_deref().unwrap_or(""),
        );
        let mut classes = merge_classes(&self.element.class_attribute(), &pending);
        if let Some(temp) = self.temp_classes.borrow().as_deref() {
            classes = merge_classes(&classes, temp);
        }
        *self.classes.borrow_mut() = classes;
    }

    fn details(&self) -> AnimationDetails {
        AnimationDetails {
            element: self.element.clone(),
            event: self.event.get(),
            classes: self.classes.borrow().clone(),
            structural: self.structural,
            options: self.options.borrow().clone(),
        }
    }

    fn add_preparation_class(&self) {
        if let Some(class) = &self.preparation_class {
            self.element.add_class(class);
        }
    }

    fn before_start(&self) {
        let temp = merge_classes(self.temp_classes.borrow().as_deref().unwrap_or(""), &self.animate_class);
        self.element.add_class(&temp);
        *self.temp_classes.borrow_mut() = Some(temp);
        if let Some(class) = &self.preparation_class {
            self.element.remove_class(class);
        }
    }

    fn close(&self, rejected: bool) {
        if self.release(rejected) {
            self.runner.complete(!rejected);
        }
    }

    /// The driver runner settled with `status`; runs inside its listener
    fn settle(&self, status: bool) {
        if self.release(!status) {
            self.runner.resolve_now(status);
        }
    }

    /// Final classes, styles and DOM operation; false when already closed
    fn release(&self, rejected: bool) -> bool {
        if self.closed.replace(true) {
            return false;
        }
        {
            let mut options = self.options.borrow_mut();
            apply_animation_classes(&self.element, &mut options);
            apply_animation_styles(&self.element, &mut options);
        }
        let dom_operation = self.options.borrow().dom_operation.clone();
        if let Some(op) = dom_operation {
            op.run();
        }
        if let Some(temp) = self.temp_classes.take() {
            self.element.remove_class(&temp);
        }
        if let Some(class) = &self.preparation_class {
            self.element.remove_class(class);
        }
        tracing::trace!("Closed {} on {:?} (rejected={})", self.event.get(), self.element.id(), rejected);
        true
    }
}

/// A flushed unit of work: one entry, or a leave/enter pair with anchors
enum QueuedAnimation {
    Single(SharedEntry),
    Anchored {
        from: SharedEntry,
        to: SharedEntry,
        classes: String,
        anchors: Vec<AnchorPair>,
    },
}

impl QueuedAnimation {
    fn entries(&self) -> Vec<&SharedEntry> {
        match self {
            Self::Single(entry) => vec![entry],
            Self::Anchored { from, to, .. } => vec![from, to],
        }
    }

    /// Element the animation is sorted and cached by
    fn element(&self) -> &Element {
        match self {
            Self::Single(entry) => &entry.element,
            Self::Anchored { from, .. } => &from.element,
        }
    }

    fn primary(&self) -> &SharedEntry {
        match self {
            Self::Single(entry) => entry,
            Self::Anchored { from, .. } => from,
        }
    }

    fn request(&self) -> AnimationRequest {
        match self {
            Self::Single(entry) => AnimationRequest::Single(entry.details()),
            Self::Anchored { from, to, classes, anchors } => AnimationRequest::Anchored(AnchoredDetails {
                from: from.details(),
                to: to.details(),
                classes: classes.clone(),
                anchors: anchors.clone(),
            }),
        }
    }

    fn is_open(&self) -> bool {
        self.entries().iter().all(|entry| !entry.closed.get())
    }

    fn before_start(&self) {
        self.entries().iter().for_each(|entry| entry.before_start());
    }

    fn close(&self, rejected: bool) {
        self.entries().iter().for_each(|entry| entry.close(rejected));
    }

    fn settle(&self, status: bool) {
        self.entries().iter().for_each(|entry| entry.settle(status));
    }

    /// Hand control of every entry runner to the driver runner
    fn set_host(&self, runner: &AnimationRunner) {
        for entry in self.entries() {
            entry.runner.set_host(Rc::new(runner.clone()));
        }
    }
}

/// Elements carrying a non-empty anchor reference: `element` itself, or
/// else its descendants
fn anchor_nodes(element: &Element, ref_attr: &str) -> Vec<Element> {
    let candidates = if element.has_attribute(ref_attr) {
        vec![element.clone()]
    } else {
        element.descendants_with_attribute(ref_attr)
    };
    candidates
        .into_iter()
        .filter(|node| node.attribute(ref_attr).is_some_and(|value| !value.is_empty()))
        .collect()
}

/// Classes present in both lists, generated classes excluded
fn shared_classes(a: &str, b: &str, prefix: &str) -> String {
    let marker = format!("{}-", prefix);
    let b: Vec<&str> = b.split_whitespace().collect();
    a.split_whitespace()
        .filter(|class| !class.starts_with(&marker) && b.contains(class))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Default)]
struct AnchorRef {
    key: String,
    from: Option<(usize, Element)>,
    to: Option<(usize, Element)>,
}

/// Parent-first levels: each item lands one level below its nearest
/// ancestor among the items
fn sort_parent_first<T>(items: Vec<T>, element: impl Fn(&T) -> &Element) -> Vec<Vec<T>> {
    let lookup: HashMap<NodeId, usize> =
        items.iter().enumerate().map(|(index, item)| (element(item).id(), index)).collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let parent = element(item)
            .ancestors()
            .iter()
            .find_map(|ancestor| lookup.get(&ancestor.id()).copied())
            .filter(|&parent| parent != index);
        match parent {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let mut levels = Vec::new();
    let mut level = roots;
    while !level.is_empty() {
        let next: Vec<usize> = level.iter().flat_map(|&index| children[index].iter().copied()).collect();
        levels.push(level);
        level = next;
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    levels
        .into_iter()
        .map(|level| level.into_iter().filter_map(|index| slots[index].take()).collect())
        .collect()
}

struct QueueInner {
    ctx: AnimateContext,
    drivers: Vec<Rc<dyn AnimationDriver>>,
    pending: RefCell<Vec<SharedEntry>>,
}

/// Request queue and driver dispatcher
#[derive(Clone)]
pub struct AnimationQueue {
    inner: Rc<QueueInner>,
}

impl AnimationQueue {
    /// Queue with the built-in drivers in configured order
    pub fn new(ctx: AnimateContext) -> Self {
        let drivers = ctx
            .config()
            .drivers
            .iter()
            .map(|kind| -> Rc<dyn AnimationDriver> {
                match kind {
                    DriverKind::Script => Rc::new(ScriptDriver::new(ctx.clone())),
                    DriverKind::Css => Rc::new(CssDriver::new(ctx.clone())),
                }
            })
            .collect();
        Self::with_drivers(ctx, drivers)
    }

    pub fn with_drivers(ctx: AnimateContext, drivers: Vec<Rc<dyn AnimationDriver>>) -> Self {
        Self { inner: Rc::new(QueueInner { ctx, drivers, pending: RefCell::new(Vec::new()) }) }
    }

    pub fn context(&self) -> &AnimateContext {
        &self.inner.ctx
    }

    /// Names of the drivers, in dispatch order
    pub fn driver_names(&self) -> Vec<&'static str> {
        self.inner.drivers.iter().map(|driver| driver.name()).collect()
    }

    /// Requests waiting for the next `flush`
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Queue an animation. Class changes on an element that already has
    /// queued class changes are merged into that request and share its
    /// runner.
    pub fn animate(&self, element: &Element, event: AnimationEvent, mut options: AnimationOptions) -> AnimationRunner {
        let ctx = &self.inner.ctx;

        if is_class_event(event) {
            if let Some(existing) = self.pending_class_entry(element) {
                if let Some(temp) = options.temp_classes.take() {
                    let mut slot = existing.temp_classes.borrow_mut();
                    *slot = Some(merge_classes(slot.as_deref().unwrap_or(""), &temp));
                }
                merge_animation_details(element, &mut existing.options.borrow_mut(), options);
                let merged_event = {
                    let options = existing.options.borrow();
                    match (options.add_class.is_some(), options.remove_class.is_some()) {
                        (true, true) => AnimationEvent::SetClass,
                        (true, false) => AnimationEvent::AddClass,
                        (false, true) => AnimationEvent::RemoveClass,
                        (false, false) => existing.event.get(),
                    }
                };
                existing.event.set(merged_event);
                existing.refresh_classes();
                tracing::trace!("Merged {} into queued {} on {:?}", event, merged_event, element.id());
                return existing.runner.clone();
            }
        }

        let structural = event.is_structural();
        let temp_classes = options.temp_classes.take();
        let runner = ctx.runner();
        let entry = Rc::new(QueueEntry {
            element: element.clone(),
            event: Cell::new(event),
            structural,
            classes: RefCell::new(String::new()),
            options: RefCell::new(options),
            temp_classes: RefCell::new(temp_classes),
            preparation_class: structural.then(|| ctx.class_name(&format!("{}-prepare", event.name()))),
            animate_class: ctx.class_name("animate"),
            runner: runner.clone(),
            closed: Cell::new(false),
        });
        entry.refresh_classes();

        let (on_end, on_cancel) = (Rc::downgrade(&entry), Rc::downgrade(&entry));
        runner.set_host(
            HostFns::new()
                .on_end(move || {
                    if let Some(entry) = on_end.upgrade() {
                        entry.close(false);
                    }
                })
                .on_cancel(move || {
                    if let Some(entry) = on_cancel.upgrade() {
                        entry.close(true);
                    }
                })
                .into_host(),
        );

        if !ctx.config().enabled || self.inner.drivers.is_empty() {
            tracing::debug!("Animations disabled, {} on {:?} resolves immediately", event, element.id());
            entry.close(false);
            return runner;
        }

        tracing::trace!("Queued {} on {:?}", event, element.id());
        self.inner.pending.borrow_mut().push(entry);
        runner
    }

    fn pending_class_entry(&self, element: &Element) -> Option<SharedEntry> {
        self.inner
            .pending
            .borrow()
            .iter()
            .find(|entry| {
                entry.element == *element
                    && is_class_event(entry.event.get())
                    && !entry.closed.get()
            })
            .cloned()
    }

    /// Re-render notification: group, sort and schedule everything queued
    pub fn flush(&self) {
        let entries: Vec<SharedEntry> = self
            .inner
            .pending
            .take()
            .into_iter()
            .filter(|entry| !entry.closed.get())
            .collect();
        if entries.is_empty() {
            return;
        }

        let animations: Vec<Rc<QueuedAnimation>> =
            self.group_animations(entries).into_iter().map(Rc::new).collect();
        let count = animations.len();
        let levels = sort_parent_first(animations, |animation| animation.element());

        let mut waves: Vec<Wave> = Vec::with_capacity(levels.len());
        for (depth, level) in levels.into_iter().enumerate() {
            let mut wave: Wave = Vec::with_capacity(level.len());
            for animation in level {
                if depth > 0 {
                    animation.entries().iter().for_each(|entry| entry.add_preparation_class());
                }
                wave.push(self.trigger(animation));
            }
            waves.push(wave);
        }

        tracing::debug!("Flushing {} animation(s) into {} wave(s)", count, waves.len());
        self.inner.ctx.scheduler().schedule(waves);
    }

    fn group_animations(&self, entries: Vec<SharedEntry>) -> Vec<QueuedAnimation> {
        let config = self.inner.ctx.config();
        let ref_attr = config.anchor_ref_attribute();

        let mut prepared = Vec::new();
        let mut refs: Vec<AnchorRef> = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let anchors = if entry.structural { anchor_nodes(&entry.element, &ref_attr) } else { Vec::new() };
            if anchors.is_empty() {
                prepared.push(QueuedAnimation::Single(Rc::clone(entry)));
                continue;
            }
            let incoming = matches!(entry.event.get(), AnimationEvent::Enter | AnimationEvent::Move);
            for anchor in anchors {
                let key = anchor.attribute(&ref_attr).unwrap_or_default();
                let position = match refs.iter().position(|r| r.key == key) {
                    Some(position) => position,
                    None => {
                        refs.push(AnchorRef { key, ..AnchorRef::default() });
                        refs.len() - 1
                    }
                };
                let side = Some((index, anchor));
                if incoming {
                    refs[position].to = side;
                } else {
                    refs[position].from = side;
                }
            }
        }

        let mut used = vec![false; entries.len()];
        // from index -> position of its anchored group in `prepared`
        let mut groups: HashMap<usize, Option<usize>> = HashMap::new();
        for anchor_ref in refs {
            let (from, to) = match (anchor_ref.from, anchor_ref.to) {
                (Some(from), Some(to)) => (from, to),
                (Some((index, _)), None) | (None, Some((index, _))) => {
                    if !used[index] {
                        used[index] = true;
                        prepared.push(QueuedAnimation::Single(Rc::clone(&entries[index])));
                    }
                    continue;
                }
                (None, None) => continue,
            };
            let ((from_index, out_element), (to_index, in_element)) = (from, to);
            let group = *groups.entry(from_index).or_insert_with(|| {
                let from_entry = Rc::clone(&entries[from_index]);
                let to_entry = Rc::clone(&entries[to_index]);
                let classes =
                    shared_classes(&from_entry.classes.borrow(), &to_entry.classes.borrow(), &config.class_prefix);
                if classes.is_empty() {
                    prepared.push(QueuedAnimation::Single(from_entry));
                    prepared.push(QueuedAnimation::Single(to_entry));
                    None
                } else {
                    prepared.push(QueuedAnimation::Anchored {
                        from: from_entry,
                        to: to_entry,
                        classes,
                        anchors: Vec::new(),
                    });
                    Some(prepared.len() - 1)
                }
            });
            if let Some(QueuedAnimation::Anchored { anchors, .. }) = group.and_then(|g| prepared.get_mut(g)) {
                anchors.push(AnchorPair { out_element, in_element });
            }
        }
        prepared
    }

    fn trigger(&self, animation: Rc<QueuedAnimation>) -> Task {
        let ctx = &self.inner.ctx;
        let primary = animation.primary();
        let cache_key = {
            let options = primary.options.borrow();
            let extra = merge_classes(options.add_class.as_deref().unwrap_or(""), &ctx.class_name("animate"));
            ctx.cache().cache_key(
                &primary.element,
                primary.event.get().name(),
                Some(extra.as_str()),
                options.remove_class.as_deref(),
            )
        };
        let queue = self.clone();
        Box::new(move || queue.start_animation(&animation, &cache_key))
    }

    fn start_animation(&self, animation: &Rc<QueuedAnimation>, cache_key: &str) {
        // ended or cancelled while waiting for its wave
        if !animation.is_open() {
            animation.close(false);
            return;
        }
        if self.inner.ctx.cache().contains_cached_animation_without_duration(cache_key) {
            tracing::trace!("Skipping {:?}: cached without duration", animation.element().id());
            animation.close(false);
            return;
        }

        animation.before_start();
        let Some(prepared) = self.dispatch(&animation.request()) else {
            animation.close(false);
            return;
        };

        let runner = prepared.start();
        let closer = Rc::clone(animation);
        runner.done(move |status| closer.settle(status));
        animation.set_host(&runner);
    }

    /// First driver, in order, whose preparation will animate
    pub fn dispatch(&self, request: &AnimationRequest) -> Option<PreparedAnimation> {
        for driver in &self.inner.drivers {
            match driver.init(request) {
                Some(prepared) if prepared.will_animate() => {
                    tracing::debug!("Driver '{}' takes '{}'", driver.name(), request.classes());
                    return Some(prepared);
                }
                _ => tracing::trace!("Driver '{}' declined '{}'", driver.name(), request.classes()),
            }
        }
        None
    }

    /// Dispatch and start right away; nothing to animate resolves as
    /// completed
    pub fn run(&self, request: &AnimationRequest) -> AnimationRunner {
        match self.dispatch(request) {
            Some(prepared) => prepared.start(),
            None => AnimationRunner::resolved(self.inner.ctx.frames().clone(), true),
        }
    }
}

impl fmt::Debug for AnimationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationQueue")
            .field("drivers", &self.driver_names())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimateConfig;
    use crate::frame::FrameLoop;
    use fos_dom::Document;

    /// Records what it is asked and declines everything
    struct RecordingDriver {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl AnimationDriver for RecordingDriver {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn init(&self, request: &AnimationRequest) -> Option<PreparedAnimation> {
            let line = match request {
                AnimationRequest::Single(details) => {
                    format!("{} {}", details.event, details.element.tag_name())
                }
                AnimationRequest::Anchored(anchored) => {
                    format!("anchored '{}' x{}", anchored.classes, anchored.anchors.len())
                }
            };
            self.seen.borrow_mut().push(line);
            None
        }
    }

    struct Fixture {
        frames: Rc<FrameLoop>,
        doc: Document,
        queue: AnimationQueue,
        seen: Rc<RefCell<Vec<String>>>,
    }

    fn setup_with(config: AnimateConfig) -> Fixture {
        let frames = Rc::new(FrameLoop::display());
        let doc = Document::new();
        let ctx = AnimateContext::new(config, doc.clone(), frames.clone()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let driver: Rc<dyn AnimationDriver> = Rc::new(RecordingDriver { seen: seen.clone() });
        let queue = AnimationQueue::with_drivers(ctx, vec![driver]);
        Fixture { frames, doc, queue, seen }
    }

    fn setup() -> Fixture {
        setup_with(AnimateConfig::default())
    }

    fn child(parent: &Element, tag: &str) -> Element {
        let doc = parent.document().unwrap();
        let el = doc.create_element(tag);
        parent.append_child(&el).unwrap();
        el
    }

    #[test]
    fn test_default_drivers_follow_config() {
        let frames = Rc::new(FrameLoop::display());
        let config = AnimateConfig { drivers: vec![DriverKind::Css], ..AnimateConfig::default() };
        let ctx = AnimateContext::new(config, Document::new(), frames).unwrap();
        assert_eq!(AnimationQueue::new(ctx.clone()).driver_names(), vec!["css"]);

        let ctx = AnimateContext::new(AnimateConfig::default(), Document::new(), ctx.frames().clone()).unwrap();
        assert_eq!(AnimationQueue::new(ctx).driver_names(), vec!["script", "css"]);
    }

    #[test]
    fn test_disabled_resolves_immediately() {
        let fx = setup_with(AnimateConfig { enabled: false, ..AnimateConfig::default() });
        let el = child(&fx.doc.body(), "div");
        let runner = fx.queue.animate(&el, AnimationEvent::AddClass, AnimationOptions::new().add_class("on"));
        assert!(el.has_class("on"));
        assert_eq!(fx.queue.pending(), 0);
        fx.frames.tick();
        assert_eq!(runner.status(), Some(true));
        assert!(fx.seen.borrow().is_empty());
    }

    #[test]
    fn test_class_requests_merge() {
        let fx = setup();
        let el = child(&fx.doc.body(), "div");
        el.add_class("b");
        let a = fx.queue.animate(&el, AnimationEvent::AddClass, AnimationOptions::new().add_class("a"));
        let b = fx.queue.animate(&el, AnimationEvent::RemoveClass, AnimationOptions::new().remove_class("b"));
        assert_eq!(fx.queue.pending(), 1);

        fx.queue.flush();
        assert_eq!(*fx.seen.borrow(), vec!["setClass div".to_string()]);
        assert!(el.has_class("a"));
        assert!(!el.has_class("b"));
        assert!(!el.has_class("fos-animate"));
        fx.frames.tick();
        assert_eq!(a.status(), Some(true));
        assert_eq!(b.status(), Some(true));
    }

    #[test]
    fn test_parent_animates_before_child() {
        let fx = setup();
        let list = child(&fx.doc.body(), "ul");
        let item = child(&list, "li");
        fx.queue.animate(&item, AnimationEvent::Enter, AnimationOptions::new());
        fx.queue.animate(&list, AnimationEvent::Enter, AnimationOptions::new());

        fx.queue.flush();
        assert_eq!(*fx.seen.borrow(), vec!["enter ul".to_string()]);
        assert!(item.has_class("fos-enter-prepare"));
        assert!(!list.has_class("fos-enter-prepare"));

        fx.frames.tick();
        assert_eq!(fx.seen.borrow().len(), 2);
        assert_eq!(fx.seen.borrow()[1], "enter li");
        assert!(!item.has_class("fos-enter-prepare"));
    }

    #[test]
    fn test_anchors_group_leave_and_enter() {
        let fx = setup();
        let old_page = child(&fx.doc.body(), "section");
        let new_page = child(&fx.doc.body(), "section");
        old_page.set_class_attribute("page list");
        new_page.set_class_attribute("page detail");
        child(&old_page, "img").set_attribute("fos-animate-ref", "hero");
        child(&new_page, "img").set_attribute("fos-animate-ref", "hero");

        fx.queue.animate(&old_page, AnimationEvent::Leave, AnimationOptions::new());
        fx.queue.animate(&new_page, AnimationEvent::Enter, AnimationOptions::new());
        fx.queue.flush();
        assert_eq!(*fx.seen.borrow(), vec!["anchored 'page' x1".to_string()]);
    }

    #[test]
    fn test_anchors_without_shared_classes_stay_separate() {
        let fx = setup();
        let old_page = child(&fx.doc.body(), "section");
        let new_page = child(&fx.doc.body(), "article");
        child(&old_page, "img").set_attribute("fos-animate-ref", "hero");
        child(&new_page, "img").set_attribute("fos-animate-ref", "hero");

        fx.queue.animate(&old_page, AnimationEvent::Leave, AnimationOptions::new());
        fx.queue.animate(&new_page, AnimationEvent::Enter, AnimationOptions::new());
        fx.queue.flush();
        assert_eq!(*fx.seen.borrow(), vec!["leave section".to_string(), "enter article".to_string()]);
    }

    #[test]
    fn test_cancel_before_flush_skips_dispatch() {
        let fx = setup();
        let el = child(&fx.doc.body(), "div");
        let removed = el.clone();
        let options = AnimationOptions::new().dom_operation(move || removed.remove());
        let runner = fx.queue.animate(&el, AnimationEvent::Leave, options);
        runner.cancel();
        assert!(!el.has_parent());

        fx.queue.flush();
        assert!(fx.seen.borrow().is_empty());
        fx.frames.tick();
        assert_eq!(runner.status(), Some(false));
    }

    #[test]
    fn test_run_without_driver_resolves_completed() {
        let fx = setup();
        let el = child(&fx.doc.body(), "div");
        let request = AnimationDetails::new(el, AnimationEvent::Enter, AnimationOptions::new()).into();
        let runner = fx.queue.run(&request);
        assert_eq!(runner.status(), Some(true));
    }

    #[test]
    fn test_sort_parent_first_uses_nearest_animating_ancestor() {
        let doc = Document::new();
        let a = child(&doc.body(), "a");
        let b = child(&a, "b");
        let c = child(&b, "c");
        let d = child(&doc.body(), "d");
        let levels = sort_parent_first(vec![c.clone(), a.clone(), d.clone()], |el| el);
        assert_eq!(levels, vec![vec![a, d], vec![c]]);
    }

    #[test]
    fn test_shared_classes_skip_generated() {
        assert_eq!(shared_classes("page fos-leave list", "fos-leave page", "fos"), "page");
        assert_eq!(shared_classes("a", "b", "fos"), "");
    }
}
