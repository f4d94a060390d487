//! Style driver

use super::anchor::prepare_anchor;
use super::{CssAnimator, CssOptions};
use crate::context::AnimateContext;
use crate::driver::AnimationDriver;
use crate::options::{AnchoredDetails, AnimationDetails, AnimationEvent, AnimationRequest};
use crate::runner::PreparedAnimation;

/// Drives requests through the host's transitions and keyframe animations
#[derive(Debug, Clone)]
pub struct CssDriver {
    animator: CssAnimator,
}

impl CssDriver {
    pub fn new(ctx: AnimateContext) -> Self {
        Self { animator: CssAnimator::new(ctx) }
    }

    pub fn animator(&self) -> &CssAnimator {
        &self.animator
    }

    fn prepare_regular(&self, details: &AnimationDetails) -> Option<PreparedAnimation> {
        let options = &details.options;
        let mut css = CssOptions {
            event: Some(details.event),
            add_class: options.add_class.clone(),
            remove_class: options.remove_class.clone(),
            from: options.from.clone(),
            to: options.to.clone(),
            duration: options.duration,
            ..CssOptions::new()
        };
        if details.structural {
            css.structural = true;
            css.apply_classes_early = true;
            if details.event == AnimationEvent::Leave {
                if let Some(op) = options.dom_operation.clone() {
                    css.on_done = Some(Box::new(move || op.run()));
                }
            }
        }

        let prepared = self.animator.init(&details.element, css);
        prepared.will_animate().then_some(prepared)
    }

    fn prepare_anchored(&self, anchored: &AnchoredDetails) -> Option<PreparedAnimation> {
        let mut parts: Vec<PreparedAnimation> = [&anchored.from, &anchored.to]
            .into_iter()
            .filter_map(|details| self.prepare_regular(details))
            .collect();
        parts.extend(anchored.anchors.iter().filter_map(|pair| prepare_anchor(&self.animator, pair)));
        if parts.is_empty() {
            return None;
        }

        tracing::debug!(
            "Anchored style animation for '{}': {} part(s), {} anchor(s)",
            anchored.classes,
            parts.len(),
            anchored.anchors.len()
        );
        Some(PreparedAnimation::all(self.animator.context().frames().clone(), parts))
    }
}

impl AnimationDriver for CssDriver {
    fn name(&self) -> &'static str {
        "css"
    }

    fn init(&self, request: &AnimationRequest) -> Option<PreparedAnimation> {
        if !self.animator.context().document().capabilities().any() {
            return None;
        }
        match request {
            AnimationRequest::Single(details) => self.prepare_regular(details),
            AnimationRequest::Anchored(anchored) => self.prepare_anchored(anchored),
        }
    }
}
