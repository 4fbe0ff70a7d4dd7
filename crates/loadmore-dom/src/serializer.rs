//! HTML serialization

use crate::{DomTree, NodeData, NodeId};

/// Elements whose text children are written verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext"];

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

impl DomTree {
    /// Serialize a node and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for (child, _) in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for (child, _) in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|parent| self.element(parent))
                    .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.local_name()));
                if raw {
                    out.push_str(&text.content);
                } else {
                    escape_into(&text.content, false, out);
                }
            }
            NodeData::Comment(content) => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(elem.local_name());
                for attr in elem.attrs().iter() {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&elem.local_name()) {
                    return;
                }
                for (child, _) in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(elem.local_name());
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
