//! DOM Node
//!
//! Nodes live in the [`DomTree`](crate::DomTree) arena and link to each other
//! through [`NodeId`]s instead of pointers.

use crate::{DOMTokenList, NamedNodeMap, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(name)))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(TextData { content: content.into() }))
    }

    /// Create a new comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Comment(content.into()))
    }

    /// Create a doctype node
    pub fn doctype(name: impl Into<String>) -> Self {
        Self::with_data(NodeData::Doctype { name: name.into() })
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Whether children may be inserted under this node
    #[inline]
    pub fn can_have_children(&self) -> bool {
        matches!(self.data, NodeData::Document | NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase local tag name
    local_name: String,
    attrs: NamedNodeMap,
    /// Mirror of the `class` attribute
    class_list: DOMTokenList,
}

impl ElementData {
    pub fn new(name: &str) -> Self {
        Self {
            local_name: name.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            class_list: DOMTokenList::new(),
        }
    }

    /// Tag name, lowercase
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name.eq_ignore_ascii_case("class") {
            self.class_list = DOMTokenList::from_string(&value);
        }
        self.attrs.set(name, value);
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case("class") {
            self.class_list = DOMTokenList::new();
        }
        self.attrs.remove(name).map(|a| a.value)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains(name)
    }

    /// All attributes in source order
    pub fn attrs(&self) -> &NamedNodeMap {
        &self.attrs
    }

    /// `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    pub fn class_list(&self) -> &DOMTokenList {
        &self.class_list
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.contains(class)
    }

    /// Add a class, keeping the `class` attribute in sync
    pub fn add_class(&mut self, class: &str) -> bool {
        let added = self.class_list.add(class);
        if added {
            self.attrs.set("class", self.class_list.value());
        }
        added
    }

    /// Remove a class, keeping the `class` attribute in sync
    pub fn remove_class(&mut self, class: &str) -> bool {
        let removed = self.class_list.remove(class);
        if removed {
            self.attrs.set("class", self.class_list.value());
        }
        removed
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}
