//! Document - High-level document API

use std::cell::RefCell;
use std::rc::Rc;

use crate::{DomTree, EventListeners, NodeId, SelectorList};

/// Document shared between the host page and widgets bound to it
pub type SharedDocument = Rc<RefCell<Document>>;

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL, base for relative requests
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Focused element
    active_element: Option<NodeId>,
    listeners: EventListeners,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created, distinct elements: these links cannot fail
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            active_element: None,
            listeners: EventListeners::new(),
        }
    }

    /// Create an empty document (no structure); call [`finalize`](Self::finalize)
    /// after filling the tree
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            active_element: None,
            listeners: EventListeners::new(),
        }
    }

    /// Locate and cache the html, head and body elements
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self.find_child_element(root, "html").unwrap_or(NodeId::NONE);
        if self.html_element.is_valid() {
            self.head_element = self.find_child_element(self.html_element, "head").unwrap_or(NodeId::NONE);
            self.body_element = self.find_child_element(self.html_element, "body").unwrap_or(NodeId::NONE);
        }
    }

    fn find_child_element(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.tree
            .children(parent)
            .find(|(_, node)| node.as_element().is_some_and(|e| e.local_name() == name))
            .map(|(id, _)| id)
    }

    /// Wrap into the shared handle widgets bind to
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        self.find_child_element(self.head_element, "title")
            .map(|title| self.tree.text_content(title).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// First connected element matching `selector`, in document order.
    ///
    /// Unsupported selectors match nothing.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector)?;
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&id| list.matches(&self.tree, id))
    }

    /// All connected elements matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&id| list.matches(&self.tree, id))
            .collect()
    }

    /// Focused element, if it is still connected
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.filter(|&id| self.tree.is_connected(id))
    }

    /// Focus a connected element
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.tree.element(id).is_none() || !self.tree.is_connected(id) {
            return false;
        }
        self.active_element = Some(id);
        true
    }

    /// Drop focus from `id`; returns true if it held focus
    pub fn blur(&mut self, id: NodeId) -> bool {
        if self.active_element == Some(id) {
            self.active_element = None;
            true
        } else {
            false
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut EventListeners {
        &mut self.listeners
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
