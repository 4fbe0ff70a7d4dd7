//! HTML5 Parser implementation
//!
//! Parses with html5ever into its `RcDom` and converts the result into the
//! arena DOM.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use loadmore_dom::{Document, DomTree, Node, NodeId};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = Self::parse_rcdom(html);

        let mut document = Document::empty(url);
        let root = document.tree().root();
        for child in dom.document.children.borrow().iter() {
            self.convert_node(child, document.tree_mut(), Some(root));
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse `html` as a full document and return the element children of its
    /// `<body>`, created detached inside `tree`.
    ///
    /// html5ever never fails: empty or malformed input yields whatever body
    /// the HTML5 algorithm recovers, possibly with no element children.
    pub fn parse_body_children(&self, html: &str, tree: &mut DomTree) -> Vec<NodeId> {
        let dom = Self::parse_rcdom(html);
        let Some(body) = find_element(&dom.document, "html").and_then(|h| find_element(&h, "body")) else {
            return Vec::new();
        };

        let nodes: Vec<NodeId> = body
            .children
            .borrow()
            .iter()
            .filter(|child| matches!(child.data, RcNodeData::Element { .. }))
            .filter_map(|child| self.convert_node(child, tree, None))
            .collect();

        tracing::debug!("Parsed {} body elements from {} bytes", nodes.len(), html.len());
        nodes
    }

    fn parse_rcdom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    /// Convert an RcDom node (and its subtree) into `tree`, appending it to
    /// `parent` when given
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: Option<NodeId>) -> Option<NodeId> {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return parent;
            }
            RcNodeData::Doctype { name, .. } => tree.push(Node::doctype(name.to_string())),
            RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                if let Some(elem) = tree.element_mut(id) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, attr.value.to_string());
                    }
                }
                id
            }
            RcNodeData::ProcessingInstruction { .. } => return None,
        };

        if let Some(parent) = parent {
            if let Err(err) = tree.append_child(parent, id) {
                tracing::warn!("Dropping node {}: {}", id, err);
                return None;
            }
        }

        if let RcNodeData::Element { template_contents, .. } = &handle.data {
            for child in handle.children.borrow().iter() {
                self.convert_node(child, tree, Some(id));
            }
            // <template> keeps its parsed content in a separate fragment
            if let Some(content) = template_contents.borrow().as_ref() {
                for child in content.children.borrow().iter() {
                    self.convert_node(child, tree, Some(id));
                }
            }
        }

        Some(id)
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn find_element(parent: &Handle, local: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, RcNodeData::Element { name, .. } if &*name.local == local))
        .cloned()
}
