//! Shared-element anchors
//!
//! A deep clone of the outgoing anchor is parked in the document body and
//! animated from the outgoing geometry to the incoming one. The real
//! anchors carry the shim class meanwhile.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fos_dom::{Element, StyleMap};

use super::{CssAnimator, CssOptions};
use crate::classes::{merge_classes, strip_prefixed_classes};
use crate::options::AnchorPair;
use crate::runner::{AnimationRunner, HostFns, PreparedAnimation};

const ANCHOR_STYLE_PROPS: [&str; 4] = ["width", "height", "top", "left"];

/// Classes of `a` missing from `b`
fn unique_classes(a: &str, b: &str) -> String {
    let b: Vec<&str> = b.split_whitespace().collect();
    a.split_whitespace().filter(|class| !b.contains(class)).collect::<Vec<_>>().join(" ")
}

/// Document-relative geometry of `anchor` as inline styles
pub(crate) fn anchor_styles(anchor: &Element) -> StyleMap {
    let scroll = anchor.document().map(|doc| doc.scroll_offset()).unwrap_or_default();
    let rect = anchor.bounding_rect().offset(scroll);
    let mut styles = StyleMap::new();
    for prop in ANCHOR_STYLE_PROPS {
        let value = match prop {
            "width" => rect.width,
            "height" => rect.height,
            "top" => rect.top,
            _ => rect.left,
        };
        styles.set(prop, &format!("{}px", value.floor()));
    }
    styles
}

struct AnchorState {
    animator: CssAnimator,
    anchor_clone: Element,
    pair: AnchorPair,
    shim_class: String,
    starting_classes: String,
    current: RefCell<Option<AnimationRunner>>,
    /// Set once the outer runner was ended or cancelled
    ended: Cell<bool>,
}

impl AnchorState {
    fn prepare_out(&self) -> Option<PreparedAnimation> {
        let ctx = self.animator.context();
        let options = CssOptions {
            add_class: Some(ctx.class_name("anchor-out")),
            from: Some(anchor_styles(&self.pair.out_element)),
            ..CssOptions::new()
        };
        let prepared = self.animator.init(&self.anchor_clone, options);
        prepared.will_animate().then_some(prepared)
    }

    fn prepare_in(&self) -> Option<PreparedAnimation> {
        let ctx = self.animator.context();
        let prefix = &ctx.config().class_prefix;
        let ending = strip_prefixed_classes(&self.pair.in_element.class_attribute(), prefix);
        let to_add = unique_classes(&ending, &self.starting_classes);
        let to_remove = unique_classes(&self.starting_classes, &ending);
        let options = CssOptions {
            to: Some(anchor_styles(&self.pair.in_element)),
            add_class: Some(merge_classes(&ctx.class_name("anchor-in"), &to_add)),
            remove_class: Some(merge_classes(&ctx.class_name("anchor-out"), &to_remove)),
            ..CssOptions::new()
        };
        let prepared = self.animator.init(&self.anchor_clone, options);
        prepared.will_animate().then_some(prepared)
    }

    fn cleanup(&self) {
        self.anchor_clone.remove();
        self.pair.out_element.remove_class(&self.shim_class);
        self.pair.in_element.remove_class(&self.shim_class);
    }

    fn end_current(&self) {
        self.ended.set(true);
        let current = self.current.borrow().clone();
        if let Some(current) = current {
            current.end();
        }
    }

    /// Out animation finished (or never ran); run the in side if it animates
    fn after_out(self: Rc<Self>, runner: AnimationRunner) {
        self.current.borrow_mut().take();
        if self.ended.get() {
            self.cleanup();
            runner.complete(true);
            return;
        }
        match self.prepare_in() {
            Some(animator_in) => {
                let current = animator_in.start();
                *self.current.borrow_mut() = Some(current.clone());
                let state = Rc::clone(&self);
                current.done(move |_| {
                    state.current.borrow_mut().take();
                    state.cleanup();
                    runner.complete(true);
                });
            }
            None => {
                self.cleanup();
                runner.complete(true);
            }
        }
    }
}

/// Prepare the clone animation for one anchor pair; `None` when neither
/// side would animate
pub(super) fn prepare_anchor(animator: &CssAnimator, pair: &AnchorPair) -> Option<PreparedAnimation> {
    let ctx = animator.context();
    let anchor_clone = pair.out_element.clone_node(true);
    let starting_classes =
        strip_prefixed_classes(&anchor_clone.class_attribute(), &ctx.config().class_prefix);
    let shim_class = ctx.class_name("animate-shim");

    pair.out_element.add_class(&shim_class);
    pair.in_element.add_class(&shim_class);
    anchor_clone.add_class(&ctx.class_name("anchor"));

    let state = Rc::new(AnchorState {
        animator: animator.clone(),
        anchor_clone,
        pair: pair.clone(),
        shim_class,
        starting_classes,
        current: RefCell::new(None),
        ended: Cell::new(false),
    });

    if let Err(err) = ctx.document().body().append_child(&state.anchor_clone) {
        tracing::warn!("Anchor clone could not be attached: {}", err);
        state.cleanup();
        return None;
    }

    // when the out side declines the in side runs alone
    let (starting, starts_with_in) = match state.prepare_out() {
        Some(animator_out) => (animator_out, false),
        None => match state.prepare_in() {
            Some(animator_in) => (animator_in, true),
            None => {
                tracing::trace!("Anchor {:?} has nothing to animate", pair.out_element.id());
                state.cleanup();
                return None;
            }
        },
    };

    let frames = ctx.frames().clone();
    let closer = Rc::clone(&state);
    let unstarted = starting.clone();
    let prepared = PreparedAnimation::new(frames.clone(), move || {
        let (on_end, on_cancel) = (Rc::clone(&state), Rc::clone(&state));
        let runner = AnimationRunner::with_host(
            frames,
            HostFns::new()
                .on_end(move || on_end.end_current())
                .on_cancel(move || on_cancel.end_current())
                .into_host(),
        );

        let current = starting.start();
        *state.current.borrow_mut() = Some(current.clone());
        let outer = runner.clone();
        current.done(move |_| {
            if starts_with_in {
                state.current.borrow_mut().take();
                state.cleanup();
                outer.complete(true);
            } else {
                state.after_out(outer);
            }
        });
        runner
    })
    .on_close(move || {
        unstarted.end();
        closer.cleanup();
    });

    Some(prepared)
}
