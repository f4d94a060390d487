//! Document
//!
//! Owns the body element, node id allocation, the timing sheet used for
//! computed-style probes and the host capability flags.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::element::Element;
use crate::geometry::ScrollOffset;
use crate::style::{AnimationTimings, TimingRule};
use crate::NodeId;

/// What the host's style engine can animate natively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub transitions: bool,
    pub keyframe_animations: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { transitions: true, keyframe_animations: true }
    }
}

impl Capabilities {
    /// Host without any native animation support
    pub fn none() -> Self {
        Self { transitions: false, keyframe_animations: false }
    }

    pub fn any(&self) -> bool {
        self.transitions || self.keyframe_animations
    }
}

pub(crate) struct DocumentInner {
    body: Element,
    next_id: Cell<u32>,
    rules: RefCell<Vec<TimingRule>>,
    capabilities: Cell<Capabilities>,
    scroll: Cell<ScrollOffset>,
    probes: Cell<usize>,
}

impl DocumentInner {
    pub(crate) fn allocate_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    pub(crate) fn computed_timings(&self, element: &Element) -> AnimationTimings {
        self.probes.set(self.probes.get() + 1);
        let mut timings = AnimationTimings::default();
        for rule in self.rules.borrow().iter() {
            if rule.matches(|class| element.has_class(class)) {
                rule.apply(&mut timings);
            }
        }
        timings
    }
}

/// Handle to a document
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let inner = Rc::new_cyclic(|weak| DocumentInner {
            body: Element::new(NodeId::ROOT, "body", weak.clone()),
            next_id: Cell::new(1),
            rules: RefCell::new(Vec::new()),
            capabilities: Cell::new(Capabilities::default()),
            scroll: Cell::new(ScrollOffset::default()),
            probes: Cell::new(0),
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<DocumentInner>) -> Self {
        Self { inner }
    }

    pub fn body(&self) -> Element {
        self.inner.body.clone()
    }

    /// Create a detached element
    pub fn create_element(&self, tag: &str) -> Element {
        Element::new(self.inner.allocate_id(), tag, Rc::downgrade(&self.inner))
    }

    /// Register a timing rule; later rules override earlier ones
    pub fn add_timing_rule(&self, rule: TimingRule) {
        self.inner.rules.borrow_mut().push(rule);
    }

    pub fn clear_timing_rules(&self) {
        self.inner.rules.borrow_mut().clear();
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities.get()
    }

    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.inner.capabilities.set(capabilities);
    }

    pub fn scroll_offset(&self) -> ScrollOffset {
        self.inner.scroll.get()
    }

    pub fn set_scroll_offset(&self, scroll: ScrollOffset) {
        self.inner.scroll.set(scroll);
    }

    /// How many computed-style probes have run so far
    pub fn style_probe_count(&self) -> usize {
        self.inner.probes.get()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("rules", &self.inner.rules.borrow().len())
            .field("capabilities", &self.inner.capabilities.get())
            .finish()
    }
}
