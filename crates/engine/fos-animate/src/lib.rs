//! fOS Animate - Animation Coordination
//!
//! Frame-synchronized coordination of element animations: cancellable
//! runners, a wave scheduler with a quiet-period primitive, class-delta
//! resolution, a probe cache, and two drivers (registered script
//! animations, native transitions/keyframes) tried in order by the queue.
//! Everything is single-threaded and paced by the host's frame callback.

pub mod cache;
pub mod classes;
pub mod config;
pub mod context;
pub mod css;
pub mod driver;
pub mod error;
pub mod frame;
pub mod options;
pub mod queue;
pub mod runner;
pub mod scheduler;
pub mod script;

pub use cache::AnimationCache;
pub use classes::{resolve_element_classes, ClassDelta};
pub use config::{AnimateConfig, DriverKind};
pub use context::AnimateContext;
pub use css::{CssAnimator, CssDriver, CssOptions};
pub use driver::AnimationDriver;
pub use error::{AnimateError, AnimationCancelled};
pub use frame::{FrameHost, FrameLoop, FrameMode, SharedFrames};
pub use options::{
    AnchorPair, AnchoredDetails, AnimationDetails, AnimationEvent, AnimationOptions, AnimationRequest,
};
pub use queue::AnimationQueue;
pub use runner::{AnimationRunner, HostFns, PreparedAnimation, RunnerHost, RunnerState};
pub use scheduler::FrameScheduler;
pub use script::{AnimationRegistry, Hook, HookContext, HookDone, HookReturn, ScriptAnimation, ScriptAnimator, ScriptDriver};
