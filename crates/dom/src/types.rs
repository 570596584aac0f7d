//! Core type definitions for the in-memory tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Attributes keep insertion order, like the DOM's NamedNodeMap

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Node type, numbered as in the DOM standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    DocumentFragment = 11,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Element => "element",
            NodeType::Text => "text",
            NodeType::Comment => "comment",
            NodeType::DocumentFragment => "document-fragment",
        }
    }

    /// Whether nodes of this type may hold children
    pub fn is_container(&self) -> bool {
        matches!(self, NodeType::Element | NodeType::DocumentFragment)
    }
}

/// Where `insert_adjacent_html_unescaped` places parsed content,
/// relative to the target node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Before the node itself (needs a parent)
    BeforeBegin,
    /// Before the node's first child
    AfterBegin,
    /// After the node's last child
    BeforeEnd,
    /// After the node itself (needs a parent)
    AfterEnd,
}

impl InsertPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "beforebegin" => Some(InsertPosition::BeforeBegin),
            "afterbegin" => Some(InsertPosition::AfterBegin),
            "beforeend" => Some(InsertPosition::BeforeEnd),
            "afterend" => Some(InsertPosition::AfterEnd),
            _ => None,
        }
    }
}

/// The main tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Lowercase tag name for elements, `#text` / `#comment` / `#document-fragment` otherwise
    pub node_name: String,
    /// Character data for text and comment nodes
    pub node_value: String,
    pub attributes: SmallVec<[(String, String); 4]>,
}

impl DomNode {
    /// Create a new detached node with required fields
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: SmallVec::new(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set attribute value; an existing attribute keeps its position
    pub fn set_attr(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Check the whitespace-separated `class` attribute for a token
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }
}

/// Elements that never have content or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text up to the matching end tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements whose content is text with character references decoded
pub const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_order_is_stable() {
        let mut node = DomNode::new(0, NodeType::Element, "div".to_string());
        node.set_attr("id", "a".to_string());
        node.set_attr("class", "x".to_string());
        node.set_attr("id", "b".to_string());

        let keys: Vec<&str> = node.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "class"]);
        assert_eq!(node.attr("id"), Some("b"));
    }

    #[test]
    fn test_has_class() {
        let mut node = DomNode::new(0, NodeType::Element, "div".to_string());
        node.set_attr("class", "  card  active ".to_string());
        assert!(node.has_class("card"));
        assert!(node.has_class("active"));
        assert!(!node.has_class("car"));
    }

    #[test]
    fn test_insert_position_parse() {
        assert_eq!(
            InsertPosition::parse("beforeEnd"),
            Some(InsertPosition::BeforeEnd)
        );
        assert_eq!(InsertPosition::parse("middle"), None);
    }
}
