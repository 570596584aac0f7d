//! HTML Serializer - Convert a subtree back to markup
//!
//! This module handles:
//! - `outer_html` / `inner_html` for any node
//! - escaping of text and attribute values
//! - void elements (no end tag) and raw-text elements (no escaping)
//! - an optional indented layout for debugging output

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;
use crate::utils;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// One node per line, indented by depth; text is trimmed
    pub pretty: bool,
    pub indent_width: usize,
    /// When set, only these attributes are written
    pub include_attributes: Option<Vec<String>>,
    pub include_comments: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent_width: 2,
            include_attributes: None,
            include_comments: true,
        }
    }
}

/// Subtree serializer
pub struct HtmlSerializer {
    config: SerializerConfig,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Indented layout with default settings
    pub fn pretty() -> Self {
        Self::with_config(SerializerConfig {
            pretty: true,
            ..SerializerConfig::default()
        })
    }

    /// Serialize a node including itself
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(arena, node_id, 0, false, &mut output)?;
        Ok(output)
    }

    /// Serialize only the children of a node
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let node = arena.get(node_id)?;
        let raw_text = node
            .tag_name()
            .map(utils::is_raw_text_element)
            .unwrap_or(false);

        let mut output = String::with_capacity(256);
        for &child_id in &node.children_ids {
            self.serialize_node(arena, child_id, 0, raw_text, &mut output)?;
        }
        Ok(output)
    }

    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        raw_text: bool,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = if self.config.pretty {
            " ".repeat(depth * self.config.indent_width)
        } else {
            String::new()
        };
        let newline = if self.config.pretty { "\n" } else { "" };

        match node.node_type {
            NodeType::Element => {
                // Format: <tag id="123" class="foo">
                output.push_str(&indent);
                output.push('<');
                output.push_str(&node.node_name);
                for (name, value) in &node.attributes {
                    if !self.should_write_attribute(name) {
                        continue;
                    }
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&utils::escape_attribute(value));
                    output.push('"');
                }
                output.push('>');

                if utils::is_void_element(&node.node_name) {
                    output.push_str(newline);
                    return Ok(());
                }
                output.push_str(newline);

                let child_raw = utils::is_raw_text_element(&node.node_name);
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth + 1, child_raw, output)?;
                }

                // Closing tag
                output.push_str(&indent);
                output.push_str("</");
                output.push_str(&node.node_name);
                output.push('>');
                output.push_str(newline);
            }
            NodeType::Text => {
                let text = if self.config.pretty {
                    node.node_value.trim()
                } else {
                    node.node_value.as_str()
                };
                if !text.is_empty() {
                    output.push_str(&indent);
                    if raw_text {
                        output.push_str(text);
                    } else {
                        output.push_str(&utils::escape_text(text));
                    }
                    output.push_str(newline);
                }
            }
            NodeType::Comment => {
                if self.config.include_comments {
                    output.push_str(&indent);
                    output.push_str("<!--");
                    output.push_str(&node.node_value);
                    output.push_str("-->");
                    output.push_str(newline);
                }
            }
            NodeType::DocumentFragment => {
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth, false, output)?;
                }
            }
        }

        Ok(())
    }

    fn should_write_attribute(&self, name: &str) -> bool {
        match &self.config.include_attributes {
            Some(allowed) => allowed.iter().any(|a| a == name),
            None => true,
        }
    }
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}
