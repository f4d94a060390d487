//! Script driver

use super::ScriptAnimator;
use crate::context::AnimateContext;
use crate::driver::AnimationDriver;
use crate::options::{AnimationDetails, AnimationRequest};
use crate::runner::PreparedAnimation;

/// Drives requests through registered script animations
#[derive(Debug, Clone)]
pub struct ScriptDriver {
    ctx: AnimateContext,
    animator: ScriptAnimator,
}

impl ScriptDriver {
    pub fn new(ctx: AnimateContext) -> Self {
        Self { animator: ScriptAnimator::new(ctx.clone()), ctx }
    }

    fn prepare(&self, details: &AnimationDetails) -> Option<PreparedAnimation> {
        self.animator.init(
            &details.element,
            details.event,
            Some(&details.classes),
            details.options.clone(),
        )
    }
}

impl AnimationDriver for ScriptDriver {
    fn name(&self) -> &'static str {
        "script"
    }

    fn init(&self, request: &AnimationRequest) -> Option<PreparedAnimation> {
        let anchored = match request {
            AnimationRequest::Single(details) => return self.prepare(details),
            AnimationRequest::Anchored(anchored) => anchored,
        };

        // anchors are left to the style driver
        let sides: Vec<PreparedAnimation> = [&anchored.from, &anchored.to]
            .into_iter()
            .filter_map(|details| self.prepare(details))
            .collect();
        if sides.is_empty() {
            return None;
        }

        Some(PreparedAnimation::all(self.ctx.frames().clone(), sides))
    }
}
