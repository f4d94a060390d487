//! Animation end events
//!
//! `transitionend` / `animationend` as delivered to element listeners.

/// Which engine finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEndKind {
    Transition,
    Keyframes,
}

/// Event fired when a native transition or keyframe animation ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationEndEvent {
    pub kind: AnimationEndKind,
    /// Seconds the animation has been running, excluding delay
    pub elapsed_time: f64,
}

impl AnimationEndEvent {
    pub fn transition(elapsed_time: f64) -> Self {
        Self { kind: AnimationEndKind::Transition, elapsed_time }
    }

    pub fn keyframes(elapsed_time: f64) -> Self {
        Self { kind: AnimationEndKind::Keyframes, elapsed_time }
    }
}

/// Handle returned when registering an end listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u32);
