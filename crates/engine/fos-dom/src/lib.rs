//! fOS DOM - Document Object Model
//!
//! Single-threaded element tree with the mutation surface the animation
//! core needs: classes, inline styles, attributes, data slots, geometry,
//! cloning and animation-end events.

mod classlist;
mod document;
mod element;
mod events;
mod geometry;
mod style;

pub use classlist::ClassList;
pub use document::{Capabilities, Document};
pub use element::Element;
pub use events::{AnimationEndEvent, AnimationEndKind, ListenerId};
pub use geometry::{Rect, ScrollOffset};
pub use style::{parse_time, AnimationTimings, StyleMap, TimingRule};

/// Node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (body) node ID
    pub const ROOT: NodeId = NodeId(0);

    pub fn get(self) -> u32 {
        self.0
    }
}

/// DOM mutation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Cannot insert node {child:?} into {parent:?}: it would contain itself")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
