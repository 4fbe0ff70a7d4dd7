//! loadmore DOM - Document Object Model
//!
//! Arena-based DOM tree with the small slice of the web platform the
//! load-more widget drives: selector lookup, class lists, focus, node
//! insertion/removal and click listeners.

mod attributes;
mod classlist;
mod document;
mod dom_events;
mod node;
mod operations;
mod selector;
mod serializer;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use classlist::DOMTokenList;
pub use document::{Document, SharedDocument};
pub use dom_events::{dispatch_event, DomEvent, EventListeners, EventType, Listener, ListenerId};
pub use node::{ElementData, Node, NodeData, TextData};
pub use operations::{DomError, DomResult};
pub use selector::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node" links inside the arena
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id points at a node rather than the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert a sentinel-linked id into an `Option`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
