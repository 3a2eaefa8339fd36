//! In-memory markup tree model
//!
//! The tree is what any DOM-style markup parser produces: named elements
//! with ordered attributes and ordered children, plus the character data
//! found directly under an element. The flattener reads this tree and
//! never mutates it.

use indexmap::IndexMap;

/// A parsed markup document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Node,
}

/// A single element in the markup tree
///
/// `attributes` iterates in document order. `text` holds the concatenated
/// non-whitespace character data directly under the element; it is only
/// meaningful for elements without child elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
    pub text: String,
}

impl Node {
    /// Create an element with no attributes, children or text
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// True if the element has no child elements
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Builder-style: add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style: append a child element
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}
