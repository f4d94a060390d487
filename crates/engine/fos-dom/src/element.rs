//! Element handles
//!
//! Elements are reference-counted handles; cloning an `Element` clones the
//! handle, not the node (use [`Element::clone_node`] for that).

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::classlist::ClassList;
use crate::document::{Document, DocumentInner};
use crate::events::{AnimationEndEvent, ListenerId};
use crate::geometry::Rect;
use crate::style::{AnimationTimings, StyleMap};
use crate::{DomError, NodeId};

type EndListener = Rc<dyn Fn(&AnimationEndEvent)>;

pub(crate) struct ElementInner {
    id: NodeId,
    tag: String,
    document: Weak<DocumentInner>,
    classes: RefCell<ClassList>,
    attributes: RefCell<BTreeMap<String, String>>,
    style: RefCell<StyleMap>,
    data: RefCell<HashMap<String, String>>,
    rect: Cell<Rect>,
    parent: RefCell<Weak<ElementInner>>,
    children: RefCell<Vec<Element>>,
    listeners: RefCell<Vec<(ListenerId, EndListener)>>,
    next_listener: Cell<u32>,
}

/// Handle to an element node
#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementInner>,
}

impl Element {
    pub(crate) fn new(id: NodeId, tag: &str, document: Weak<DocumentInner>) -> Self {
        Self {
            inner: Rc::new(ElementInner {
                id,
                tag: tag.to_ascii_lowercase(),
                document,
                classes: RefCell::new(ClassList::new()),
                attributes: RefCell::new(BTreeMap::new()),
                style: RefCell::new(StyleMap::new()),
                data: RefCell::new(HashMap::new()),
                rect: Cell::new(Rect::default()),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn tag_name(&self) -> &str {
        &self.inner.tag
    }

    pub fn document(&self) -> Option<Document> {
        self.inner.document.upgrade().map(Document::from_inner)
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Current `class` attribute
    pub fn class_attribute(&self) -> String {
        self.inner.classes.borrow().value()
    }

    pub fn set_class_attribute(&self, value: &str) {
        *self.inner.classes.borrow_mut() = ClassList::parse(value);
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.inner.classes.borrow().contains(name)
    }

    /// Add space-separated classes
    pub fn add_class(&self, names: &str) {
        self.inner.classes.borrow_mut().add(names);
    }

    /// Remove space-separated classes
    pub fn remove_class(&self, names: &str) {
        self.inner.classes.borrow_mut().remove(names);
    }

    // ------------------------------------------------------------------
    // Attributes, styles and data
    // ------------------------------------------------------------------

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.attributes.borrow().get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner.attributes.borrow().contains_key(name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner.attributes.borrow_mut().insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.inner.attributes.borrow_mut().remove(name);
    }

    /// Inline style value
    pub fn style(&self, prop: &str) -> Option<String> {
        self.inner.style.borrow().get(prop).map(|s| s.to_string())
    }

    /// Snapshot of every inline declaration
    pub fn styles(&self) -> StyleMap {
        self.inner.style.borrow().clone()
    }

    pub fn set_style(&self, prop: &str, value: &str) {
        self.inner.style.borrow_mut().set(prop, value);
    }

    /// Apply every declaration in `styles`
    pub fn set_styles(&self, styles: &StyleMap) {
        self.inner.style.borrow_mut().extend(styles);
    }

    pub fn remove_style(&self, prop: &str) {
        self.inner.style.borrow_mut().remove(prop);
    }

    /// Per-element data slot (jQuery-style `data`)
    pub fn data(&self, key: &str) -> Option<String> {
        self.inner.data.borrow().get(key).cloned()
    }

    pub fn set_data(&self, key: &str, value: &str) {
        self.inner.data.borrow_mut().insert(key.to_string(), value.to_string());
    }

    pub fn remove_data(&self, key: &str) -> Option<String> {
        self.inner.data.borrow_mut().remove(key)
    }

    // ------------------------------------------------------------------
    // Geometry and computed style
    // ------------------------------------------------------------------

    pub fn bounding_rect(&self) -> Rect {
        self.inner.rect.get()
    }

    pub fn set_bounding_rect(&self, rect: Rect) {
        self.inner.rect.set(rect);
    }

    /// Probe computed transition/keyframe timings (expensive in a real host)
    pub fn computed_timings(&self) -> AnimationTimings {
        match self.inner.document.upgrade() {
            Some(doc) => doc.computed_timings(self),
            None => AnimationTimings::default(),
        }
    }

    // ------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<Element> {
        self.inner.parent.borrow().upgrade().map(|inner| Element { inner })
    }

    pub fn has_parent(&self) -> bool {
        self.inner.parent.borrow().strong_count() > 0
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.children.borrow().clone()
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            out.push(node);
        }
        out
    }

    /// True if `other` is this element or one of its descendants
    pub fn contains(&self, other: &Element) -> bool {
        other == self || other.ancestors().iter().any(|a| a == self)
    }

    /// Append `child`, detaching it from its current parent first
    pub fn append_child(&self, child: &Element) -> Result<(), DomError> {
        if child.contains(self) {
            return Err(DomError::HierarchyRequest { parent: self.id(), child: child.id() });
        }
        child.remove();
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.children.borrow_mut().push(child.clone());
        tracing::trace!("Appended {:?} to {:?}", child.id(), self.id());
        Ok(())
    }

    /// Detach from the parent (no-op when already detached)
    pub fn remove(&self) {
        let Some(parent) = self.parent() else { return };
        parent.inner.children.borrow_mut().retain(|c| c != self);
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    /// Descendants (excluding self) carrying `attr`, in document order
    pub fn descendants_with_attribute(&self, attr: &str) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack: Vec<Element> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.has_attribute(attr) {
                out.push(node.clone());
            }
            stack.extend(node.children().into_iter().rev());
        }
        out
    }

    /// Copy this node (and its subtree when `deep`), detached
    pub fn clone_node(&self, deep: bool) -> Element {
        let id = match self.inner.document.upgrade() {
            Some(doc) => doc.allocate_id(),
            None => self.id(),
        };
        let copy = Element::new(id, &self.inner.tag, self.inner.document.clone());
        *copy.inner.classes.borrow_mut() = self.inner.classes.borrow().clone();
        *copy.inner.attributes.borrow_mut() = self.inner.attributes.borrow().clone();
        *copy.inner.style.borrow_mut() = self.inner.style.borrow().clone();
        copy.inner.rect.set(self.inner.rect.get());
        if deep {
            for child in self.children() {
                let child_copy = child.clone_node(true);
                *child_copy.inner.parent.borrow_mut() = Rc::downgrade(&copy.inner);
                copy.inner.children.borrow_mut().push(child_copy);
            }
        }
        copy
    }

    // ------------------------------------------------------------------
    // Animation end events
    // ------------------------------------------------------------------

    pub fn on_animation_end(&self, listener: impl Fn(&AnimationEndEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn off_animation_end(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Deliver an end event to every listener, returns how many ran
    pub fn dispatch_animation_end(&self, event: AnimationEndEvent) -> usize {
        // Listeners may detach themselves while running
        let snapshot: Vec<EndListener> =
            self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in &snapshot {
            listener(&event);
        }
        snapshot.len()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{} class=\"{}\">", self.inner.tag, self.inner.id.0, self.class_attribute())
    }
}
