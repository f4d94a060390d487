//! Script-driven animations
//!
//! Animations defined in code and registered under a class name. Each
//! [`ScriptAnimation`] maps lifecycle hooks to handlers; the
//! [`ScriptAnimator`] matches them against an element's classes and runs
//! them in before/after phases.

mod animator;
mod driver;
mod registry;

pub use animator::ScriptAnimator;
pub use driver::ScriptDriver;
pub use registry::AnimationRegistry;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use fos_dom::{Element, StyleMap};

use crate::frame::SharedFrames;
use crate::options::AnimationEvent;
use crate::runner::{AnimationRunner, PreparedAnimation};

/// Lifecycle hook of a script animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Enter,
    Leave,
    AfterLeave,
    Move,
    AddClass,
    BeforeAddClass,
    RemoveClass,
    BeforeRemoveClass,
    SetClass,
    BeforeSetClass,
    Animate,
    BeforeAnimate,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::AfterLeave => "afterLeave",
            Self::Move => "move",
            Self::AddClass => "addClass",
            Self::BeforeAddClass => "beforeAddClass",
            Self::RemoveClass => "removeClass",
            Self::BeforeRemoveClass => "beforeRemoveClass",
            Self::SetClass => "setClass",
            Self::BeforeSetClass => "beforeSetClass",
            Self::Animate => "animate",
            Self::BeforeAnimate => "beforeAnimate",
        }
    }

    /// Hook of the phase that runs before the DOM is changed; enter and
    /// move have none
    pub fn before(event: AnimationEvent) -> Option<Hook> {
        match event {
            AnimationEvent::Enter | AnimationEvent::Move => None,
            AnimationEvent::Leave => Some(Self::Leave),
            AnimationEvent::AddClass => Some(Self::BeforeAddClass),
            AnimationEvent::RemoveClass => Some(Self::BeforeRemoveClass),
            AnimationEvent::SetClass => Some(Self::BeforeSetClass),
            AnimationEvent::Animate => Some(Self::BeforeAnimate),
        }
    }

    /// Hook of the main phase
    pub fn after(event: AnimationEvent) -> Hook {
        match event {
            AnimationEvent::Enter => Self::Enter,
            AnimationEvent::Leave => Self::AfterLeave,
            AnimationEvent::Move => Self::Move,
            AnimationEvent::AddClass => Self::AddClass,
            AnimationEvent::RemoveClass => Self::RemoveClass,
            AnimationEvent::SetClass => Self::SetClass,
            AnimationEvent::Animate => Self::Animate,
        }
    }

    /// `setClass` hooks fall back to their remove/add halves, in that order
    pub(crate) fn fan_out(self) -> Option<[(AnimationEvent, Hook); 2]> {
        match self {
            Self::SetClass => Some([
                (AnimationEvent::RemoveClass, Self::RemoveClass),
                (AnimationEvent::AddClass, Self::AddClass),
            ]),
            Self::BeforeSetClass => Some([
                (AnimationEvent::RemoveClass, Self::BeforeRemoveClass),
                (AnimationEvent::AddClass, Self::BeforeAddClass),
            ]),
            _ => None,
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a hook handler sees
#[derive(Clone)]
pub struct HookContext {
    pub element: Element,
    pub event: AnimationEvent,
    pub add_class: Option<String>,
    pub remove_class: Option<String>,
    pub from: Option<StyleMap>,
    pub to: Option<StyleMap>,
    frames: SharedFrames,
}

impl HookContext {
    /// Fresh runner a handler can return
    pub fn runner(&self) -> AnimationRunner {
        AnimationRunner::new(self.frames.clone())
    }
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("element", &self.element)
            .field("event", &self.event)
            .field("add_class", &self.add_class)
            .field("remove_class", &self.remove_class)
            .finish()
    }
}

/// Completion handle given to a hook handler; only the first call counts
#[derive(Clone)]
pub struct HookDone(Rc<RefCell<Option<Box<dyn FnOnce(bool)>>>>);

impl HookDone {
    fn new(f: impl FnOnce(bool) + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Report the outcome; `false` cancels
    pub fn call(&self, status: bool) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f(status);
        }
    }

    pub fn complete(&self) {
        self.call(true);
    }

    pub fn cancel(&self) {
        self.call(false);
    }
}

/// Value returned by a hook handler
pub enum HookReturn {
    /// Completion is reported through [`HookDone`]
    Nothing,
    /// Completes when the runner does
    Runner(AnimationRunner),
    /// Started right away; completes when its runner does
    Prepared(PreparedAnimation),
    /// Called with `true` when the hook is cancelled, `false` when ended
    OnEnd(Box<dyn FnOnce(bool)>),
}

pub type HookHandler = Rc<dyn Fn(&HookContext, HookDone) -> HookReturn>;

/// A set of hook handlers registered under one class
#[derive(Clone, Default)]
pub struct ScriptAnimation {
    hooks: HashMap<Hook, HookHandler>,
}

impl ScriptAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, hook: Hook, handler: impl Fn(&HookContext, HookDone) -> HookReturn + 'static) -> Self {
        self.hooks.insert(hook, Rc::new(handler));
        self
    }

    pub fn handler(&self, hook: Hook) -> Option<HookHandler> {
        self.hooks.get(&hook).cloned()
    }
}

impl fmt::Debug for ScriptAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&str> = self.hooks.keys().map(|h| h.name()).collect();
        hooks.sort_unstable();
        f.debug_struct("ScriptAnimation").field("hooks", &hooks).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_phase_hooks() {
        assert_eq!(Hook::before(AnimationEvent::Enter), None);
        assert_eq!(Hook::before(AnimationEvent::Move), None);
        assert_eq!(Hook::before(AnimationEvent::Leave), Some(Hook::Leave));
        assert_eq!(Hook::after(AnimationEvent::Leave), Hook::AfterLeave);
        assert_eq!(Hook::before(AnimationEvent::SetClass), Some(Hook::BeforeSetClass));
        assert_eq!(Hook::after(AnimationEvent::Animate).name(), "animate");
    }

    #[test]
    fn test_set_class_fans_out_remove_first() {
        let [first, second] = Hook::SetClass.fan_out().unwrap();
        assert_eq!(first.1, Hook::RemoveClass);
        assert_eq!(second.1, Hook::AddClass);
        assert!(Hook::Enter.fan_out().is_none());
    }

    #[test]
    fn test_hook_done_is_one_shot() {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let done = HookDone::new(move |_| h.set(h.get() + 1));
        done.complete();
        done.cancel();
        assert_eq!(hits.get(), 1);
    }
}
