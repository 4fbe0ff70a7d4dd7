//! loadmore HTML Parser
//!
//! HTML5 parsing built on html5ever, producing `loadmore-dom` trees.

mod parser;

pub use loadmore_dom::{Document, DomTree, NodeId};
pub use parser::HtmlParser;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}
