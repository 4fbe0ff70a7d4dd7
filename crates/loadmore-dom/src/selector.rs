//! Selectors
//!
//! The subset of CSS selectors used to locate widget elements:
//! type, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`, compound selectors,
//! descendant (` `) and child (`>`) combinators and selector lists (`,`).

use crate::{DomTree, ElementData, NodeId};

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

impl SimpleSelector {
    /// Check a single element against this selector
    pub fn matches(&self, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => elem.local_name().eq_ignore_ascii_case(tag),
            Self::Id(id) => elem.id() == Some(id.as_str()),
            Self::Class(class) => elem.has_class(class),
            Self::Attribute { name, value: None } => elem.has_attr(name),
            Self::Attribute { name, value: Some(value) } => elem.get_attr(name) == Some(value.as_str()),
        }
    }
}

/// Sequence of simple selectors that must all match one element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn matches(&self, elem: &ElementData) -> bool {
        self.parts.iter().all(|p| p.matches(elem))
    }
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators, left to right.
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Check whether `node` is matched by the rightmost compound with the
    /// rest of the chain satisfied by its ancestors
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(tree, node, n - 1),
        }
    }

    fn matches_at(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        let Some(elem) = tree.element(node) else {
            return false;
        };
        if !self.compounds[idx].matches(elem) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|p| self.matches_at(tree, p, idx - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent_element(node);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, ancestor, idx - 1) {
                        return true;
                    }
                    current = tree.parent_element(ancestor);
                }
                false
            }
        }
    }
}

/// Comma-separated list of complex selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector string.
    ///
    /// Returns `None` for empty or unsupported input; callers treat that the
    /// same as a selector that matches nothing.
    pub fn parse(input: &str) -> Option<Self> {
        let selectors = input
            .split(',')
            .map(parse_complex)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { selectors })
    }

    /// Whether any selector in the list matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn parse_complex(input: &str) -> Option<ComplexSelector> {
    let mut chars = input.trim().chars().peekable();
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut current = CompoundSelector::default();
    let mut pending: Option<Combinator> = None;

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == '>' {
            chars.next();
            if !current.parts.is_empty() {
                compounds.push(std::mem::take(&mut current));
                pending = Some(Combinator::Descendant);
            }
            if c == '>' {
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return None;
                }
                pending = Some(Combinator::Child);
            }
            continue;
        }

        if current.parts.is_empty() {
            if let Some(combinator) = pending.take() {
                combinators.push(combinator);
            }
        }

        let simple = match c {
            '*' => {
                chars.next();
                SimpleSelector::Universal
            }
            '#' | '.' => {
                chars.next();
                let name = take_ident(&mut chars)?;
                if c == '#' {
                    SimpleSelector::Id(name)
                } else {
                    SimpleSelector::Class(name)
                }
            }
            '[' => {
                chars.next();
                parse_attribute(&mut chars)?
            }
            c if is_ident_char(c) => SimpleSelector::Tag(take_ident(&mut chars)?.to_ascii_lowercase()),
            _ => return None,
        };
        current.parts.push(simple);
    }

    if current.parts.is_empty() {
        // Trailing combinator or empty input
        if pending == Some(Combinator::Child) || compounds.is_empty() {
            return None;
        }
    } else {
        compounds.push(current);
    }

    Some(ComplexSelector { compounds, combinators })
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    (!ident.is_empty()).then_some(ident)
}

fn parse_attribute(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<SimpleSelector> {
    let name = take_ident(chars)?.to_ascii_lowercase();
    match chars.next()? {
        ']' => Some(SimpleSelector::Attribute { name, value: None }),
        '=' => {
            let value = match chars.peek() {
                Some(&quote) if quote == '"' || quote == '\'' => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        let c = chars.next()?;
                        if c == quote {
                            break;
                        }
                        value.push(c);
                    }
                    value
                }
                _ => take_ident(chars)?,
            };
            (chars.next()? == ']').then_some(SimpleSelector::Attribute { name, value: Some(value) })
        }
        _ => None,
    }
}
