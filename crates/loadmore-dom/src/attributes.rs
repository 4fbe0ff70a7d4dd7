//! Element Attributes
//!
//! Ordered attribute storage: get, set, remove, has.

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    /// Create an attribute; HTML attribute names are ASCII case-insensitive
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.into(),
        }
    }
}

/// Named node map (attribute collection), kept in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedNodeMap {
    attributes: Vec<Attr>,
}

impl NamedNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Get attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set attribute, returning the previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(attr) => Some(std::mem::replace(&mut attr.value, value)),
            None => {
                self.attributes.push(Attr::new(name, value));
                None
            }
        }
    }

    /// Remove attribute by name
    pub fn remove(&mut self, name: &str) -> Option<Attr> {
        let index = self.attributes.iter().position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(index))
    }

    /// Check if attribute exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}
