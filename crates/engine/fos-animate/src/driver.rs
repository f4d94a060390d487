//! Driver seam
//!
//! A driver inspects a request and either declines (`None`) or hands back a
//! prepared animation. Dispatch tries drivers in the configured order and
//! takes the first one whose preparation will actually animate.

use crate::options::AnimationRequest;
use crate::runner::PreparedAnimation;

pub trait AnimationDriver {
    fn name(&self) -> &'static str;

    fn init(&self, request: &AnimationRequest) -> Option<PreparedAnimation>;
}
