//! Style/transition-driven animations
//!
//! Animations carried out by the host's native transition and keyframe
//! engine: the animator toggles preparation and `-active` classes and
//! inline styles, then waits for the element's animation-end event.
//! Shared-element moves are bridged by a cloned anchor.

mod anchor;
mod animator;
mod driver;

pub use animator::CssAnimator;
pub use driver::CssDriver;

use fos_dom::StyleMap;

use crate::options::AnimationEvent;

/// Instructions for one style-driven animation
#[derive(Default)]
pub struct CssOptions {
    /// Event the animation belongs to; names the cache signature
    pub event: Option<AnimationEvent>,
    /// Adds the `<prefix>-<event>` class
    pub structural: bool,
    pub add_class: Option<String>,
    pub remove_class: Option<String>,
    /// Applied immediately
    pub from: Option<StyleMap>,
    /// Applied once the starting state registered
    pub to: Option<StyleMap>,
    /// Seconds; overrides the probed duration
    pub duration: Option<f64>,
    /// Apply `add_class`/`remove_class` up front instead of on close
    pub apply_classes_early: bool,
    /// Restore the properties touched by `to` on close
    pub cleanup_styles: bool,
    /// Runs when the animation closes
    pub on_done: Option<Box<dyn FnOnce()>>,
}

impl CssOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for CssOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CssOptions")
            .field("event", &self.event)
            .field("structural", &self.structural)
            .field("add_class", &self.add_class)
            .field("remove_class", &self.remove_class)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}
