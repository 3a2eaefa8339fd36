//! Flattening of markup trees into ordered locale-data maps
//!
//! Sibling elements sharing a tag name are told apart by folding their
//! distinguishing attributes into the map key, e.g.
//! `calendar[@type="gregorian"]`. Siblings that still collide after key
//! synthesis are redundant variants under the source format's inheritance
//! model, so the first one in document order wins and the rest are dropped.

use crate::markup::model::{Document, Node};
use crate::value::{Map, Value};

/// Attribute names that participate in key synthesis.
///
/// Fixed configuration of the locale-data format; never derived from input.
pub const DISTINGUISHING_ATTRIBUTES: [&str; 17] = [
    "key", "request", "id", "_q", "registry", "alt", "iso4217", "iso3166", "mzone", "from", "to",
    "type", "source", "path", "locales", "count", "choice",
];

/// Returns true if the attribute name participates in key synthesis
pub fn is_distinguishing(name: &str) -> bool {
    DISTINGUISHING_ATTRIBUTES.contains(&name)
}

/// Build the map key for an element: its tag name followed by one
/// `[@name="value"]` suffix per distinguishing attribute, in document
/// order. Attribute values are inserted verbatim, without escaping.
pub fn synthesized_key(node: &Node) -> String {
    let mut key = node.name.clone();
    for (name, value) in &node.attributes {
        if is_distinguishing(name) {
            key.push_str("[@");
            key.push_str(name);
            key.push_str("=\"");
            key.push_str(value);
            key.push_str("\"]");
        }
    }
    key
}

/// Flatten a single element.
///
/// An element without child elements flattens to its text content; anything
/// else flattens to an ordered map over its children, keyed by
/// [`synthesized_key`]. Pure and total: no input tree makes this fail.
/// Recursion depth equals tree depth, which the markup parser already caps.
pub fn flatten_node(node: &Node) -> Value {
    if node.children.is_empty() {
        return Value::String(node.text.clone());
    }

    let mut map = Map::with_capacity(node.children.len());
    for child in &node.children {
        let key = synthesized_key(child);
        if map.contains_key(&key) {
            // first sibling wins; the duplicate is not even recursed into
            continue;
        }
        let value = flatten_node(child);
        map.insert(key, value);
    }
    Value::Map(map)
}

/// Flatten a document, keeping the root element's key as the outermost
/// entry so lookup paths start at the root tag.
pub fn flatten(doc: &Document) -> Value {
    let mut root = Map::with_capacity(1);
    root.insert(synthesized_key(&doc.root), flatten_node(&doc.root));
    Value::Map(root)
}

/// Recursively merge two flattened values, `overlay` taking precedence.
///
/// Locale data is assembled from an inheritance chain (root, then language,
/// then territory); each file in the chain overrides the previous ones.
/// Maps merge key by key, base key order first with overlay-only keys
/// appended; any other combination resolves to the overlay.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Map(a), Value::Map(b)) => {
            let mut out = Map::with_capacity(a.len().max(b.len()));
            for (key, value) in a {
                let merged = match b.get(key) {
                    Some(over) => merge(value, over),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            for (key, value) in b {
                if !out.contains_key(key) {
                    out.insert(key.clone(), value.clone());
                }
            }
            Value::Map(out)
        }
        _ => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinguishing_membership() {
        assert!(is_distinguishing("type"));
        assert!(is_distinguishing("_q"));
        assert!(is_distinguishing("iso4217"));
        assert!(!is_distinguishing("draft"));
        assert!(!is_distinguishing("references"));
        assert_eq!(DISTINGUISHING_ATTRIBUTES.len(), 17);
    }

    #[test]
    fn test_synthesized_key_plain() {
        let node = Node::new("months");
        assert_eq!(synthesized_key(&node), "months");
    }

    #[test]
    fn test_synthesized_key_mixed_attributes() {
        // non-distinguishing attributes never reach the key
        let node = Node::new("calendar")
            .with_attribute("draft", "unconfirmed")
            .with_attribute("type", "gregorian");
        assert_eq!(synthesized_key(&node), "calendar[@type=\"gregorian\"]");
    }

    #[test]
    fn test_synthesized_key_attribute_order() {
        // suffixes follow document order, not the constant list's order
        let node = Node::new("zone")
            .with_attribute("to", "2000")
            .with_attribute("from", "1970");
        assert_eq!(synthesized_key(&node), "zone[@to=\"2000\"][@from=\"1970\"]");
    }

    #[test]
    fn test_synthesized_key_verbatim_value() {
        let node = Node::new("alias").with_attribute("path", "../months[@x=\"1\"]");
        assert_eq!(
            synthesized_key(&node),
            "alias[@path=\"../months[@x=\"1\"]\"]"
        );
    }

    #[test]
    fn test_leaf_rule() {
        let node = Node::new("month")
            .with_attribute("type", "1")
            .with_text("January");
        assert_eq!(flatten_node(&node), Value::String("January".to_string()));
    }

    #[test]
    fn test_empty_leaf() {
        assert_eq!(
            flatten_node(&Node::new("months")),
            Value::String(String::new())
        );
    }

    #[test]
    fn test_first_wins() {
        let first = Node::new("calendar")
            .with_attribute("type", "gregorian")
            .with_child(Node::new("months").with_text("first"));
        let second = Node::new("calendar")
            .with_attribute("type", "gregorian")
            .with_child(Node::new("days").with_text("second"));
        let root = Node::new("calendars").with_child(first).with_child(second);

        let value = flatten_node(&root);
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 1);
        let kept = map.get("calendar[@type=\"gregorian\"]").unwrap();
        assert!(kept.find("months").is_some());
        assert!(kept.find("days").is_none());
    }

    #[test]
    fn test_merge_overlay_wins() {
        let mut base = Map::new();
        base.insert("months", "base");
        base.insert("days", "base");
        let mut overlay = Map::new();
        overlay.insert("months", "overlay");
        overlay.insert("eras", "overlay");

        let merged = merge(&Value::Map(base), &Value::Map(overlay));
        let map = merged.as_map().unwrap();
        assert_eq!(map.get("months").and_then(Value::as_str), Some("overlay"));
        assert_eq!(map.get("days").and_then(Value::as_str), Some("base"));
        assert_eq!(map.get("eras").and_then(Value::as_str), Some("overlay"));
        // base order first, overlay-only keys appended
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["months", "days", "eras"]);
    }

    #[test]
    fn test_merge_leaf_replaces_map() {
        let mut base = Map::new();
        base.insert("months", Value::Map(Map::new()));
        let mut overlay = Map::new();
        overlay.insert("months", "flat");

        let merged = merge(&Value::Map(base), &Value::Map(overlay));
        assert_eq!(merged.find("months").and_then(Value::as_str), Some("flat"));
    }
}
