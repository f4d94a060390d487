//! Animation requests and options

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use fos_dom::{Element, StyleMap};

use crate::classes::merge_classes;
use crate::error::AnimateError;

/// Event an animation is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationEvent {
    Enter,
    Leave,
    Move,
    AddClass,
    RemoveClass,
    SetClass,
    Animate,
}

impl AnimationEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Move => "move",
            Self::AddClass => "addClass",
            Self::RemoveClass => "removeClass",
            Self::SetClass => "setClass",
            Self::Animate => "animate",
        }
    }

    /// Enter, leave and move insert or remove nodes
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Enter | Self::Leave | Self::Move)
    }
}

impl fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationEvent {
    type Err = AnimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enter" => Ok(Self::Enter),
            "leave" => Ok(Self::Leave),
            "move" => Ok(Self::Move),
            "addClass" => Ok(Self::AddClass),
            "removeClass" => Ok(Self::RemoveClass),
            "setClass" => Ok(Self::SetClass),
            "animate" => Ok(Self::Animate),
            _ => Err(AnimateError::UnknownEvent(s.to_string())),
        }
    }
}

/// DOM mutation run at the commit point of an animation; runs at most once
/// no matter how many clones of the handle exist
#[derive(Clone, Default)]
pub struct DomOperation(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl DomOperation {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Run the operation if it has not run yet
    pub fn run(&self) {
        let op = self.0.borrow_mut().take();
        if let Some(op) = op {
            op();
        }
    }

    pub fn has_run(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl fmt::Debug for DomOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomOperation").field("has_run", &self.has_run()).finish()
    }
}

/// Options attached to an animation request
#[derive(Debug, Clone, Default)]
pub struct AnimationOptions {
    pub add_class: Option<String>,
    pub remove_class: Option<String>,
    /// Styles applied before the animation starts
    pub from: Option<StyleMap>,
    /// Styles the animation moves to
    pub to: Option<StyleMap>,
    pub dom_operation: Option<DomOperation>,
    /// Classes present only while the animation runs
    pub temp_classes: Option<String>,
    /// Explicit duration in seconds, overriding the probed one
    pub duration: Option<f64>,
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(mut self, classes: &str) -> Self {
        self.add_class = Some(classes.to_string());
        self
    }

    pub fn remove_class(mut self, classes: &str) -> Self {
        self.remove_class = Some(classes.to_string());
        self
    }

    pub fn from_styles(mut self, styles: StyleMap) -> Self {
        self.from = Some(styles);
        self
    }

    pub fn to_styles(mut self, styles: StyleMap) -> Self {
        self.to = Some(styles);
        self
    }

    pub fn dom_operation(mut self, f: impl FnOnce() + 'static) -> Self {
        self.dom_operation = Some(DomOperation::new(f));
        self
    }

    pub fn temp_classes(mut self, classes: &str) -> Self {
        self.temp_classes = Some(classes.to_string());
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

/// A normalized single-element request
#[derive(Debug, Clone)]
pub struct AnimationDetails {
    pub element: Element,
    pub event: AnimationEvent,
    /// Classes script animations are matched against
    pub classes: String,
    pub structural: bool,
    pub options: AnimationOptions,
}

impl AnimationDetails {
    pub fn new(element: Element, event: AnimationEvent, options: AnimationOptions) -> Self {
        let mut details = Self {
            structural: event.is_structural(),
            element,
            event,
            classes: String::new(),
            options,
        };
        details.refresh_classes();
        details
    }

    /// Recompute the matched classes from the element and options
    pub fn refresh_classes(&mut self) {
        let pending = merge_classes(
            self.options.add_class.as_deref().unwrap_or(""),
            self.options.remove_class.as_deref().unwrap_or(""),
        );
        self.classes = merge_classes(&self.element.class_attribute(), &pending);
    }
}

/// Pair of elements bridged by a cloned anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPair {
    pub out_element: Element,
    pub in_element: Element,
}

/// A leave/enter pair sharing anchors
#[derive(Debug, Clone)]
pub struct AnchoredDetails {
    pub from: AnimationDetails,
    pub to: AnimationDetails,
    /// Classes shared by both sides
    pub classes: String,
    pub anchors: Vec<AnchorPair>,
}

/// What a driver is asked to animate
#[derive(Debug, Clone)]
pub enum AnimationRequest {
    Single(AnimationDetails),
    Anchored(AnchoredDetails),
}

impl AnimationRequest {
    /// Classes script animations are matched against
    pub fn classes(&self) -> &str {
        match self {
            Self::Single(details) => &details.classes,
            Self::Anchored(anchored) => &anchored.classes,
        }
    }
}

impl From<AnimationDetails> for AnimationRequest {
    fn from(details: AnimationDetails) -> Self {
        Self::Single(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Document;
    use std::cell::Cell;

    #[test]
    fn test_event_names_roundtrip() {
        for event in [
            AnimationEvent::Enter,
            AnimationEvent::Leave,
            AnimationEvent::Move,
            AnimationEvent::AddClass,
            AnimationEvent::RemoveClass,
            AnimationEvent::SetClass,
            AnimationEvent::Animate,
        ] {
            assert_eq!(event.name().parse::<AnimationEvent>(), Ok(event));
        }
        assert_eq!(
            "fly".parse::<AnimationEvent>(),
            Err(AnimateError::UnknownEvent("fly".to_string()))
        );
    }

    #[test]
    fn test_dom_operation_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let op = DomOperation::new(move || c.set(c.get() + 1));
        let copy = op.clone();
        op.run();
        copy.run();
        assert_eq!(count.get(), 1);
        assert!(copy.has_run());
    }

    #[test]
    fn test_details_collect_classes() {
        let doc = Document::new();
        let el = doc.create_element("div");
        el.add_class("item");
        let details = AnimationDetails::new(
            el,
            AnimationEvent::AddClass,
            AnimationOptions::new().add_class("on").remove_class("off"),
        );
        assert_eq!(details.classes, "item on off");
        assert!(!details.structural);
    }
}
