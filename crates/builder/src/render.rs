//! Child rendering
//!
//! Primitives in a sequence are inserted as trusted markup at the end of the
//! node. Built nodes are appended. A nested list is flattened exactly one
//! level; an item inside it must be a primitive or a node.
//!
//! Bare-text children are walked one character at a time, and a single
//! character never forms a tag or a character reference, so the text lands
//! verbatim as one text node.

use crate::args::{Child, Children};
use crate::error::{BuildError, Result};
use elemental_dom::{Document, InsertPosition, NodeId};

/// Render `children` into `node`, in order
pub(crate) fn render_children(doc: &mut Document, node: NodeId, children: Children) -> Result<()> {
    match children {
        Children::Text(text) => {
            if !text.is_empty() {
                doc.append_text(node, text)?;
            }
            Ok(())
        }
        Children::List(items) => {
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Child::List(nested) => {
                        for (offset, inner) in nested.into_iter().enumerate() {
                            if let Child::List(_) = inner {
                                return Err(BuildError::NotANode {
                                    index,
                                    nested: offset,
                                });
                            }
                            render_leaf(doc, node, inner)?;
                        }
                    }
                    leaf => render_leaf(doc, node, leaf)?,
                }
            }
            Ok(())
        }
    }
}

fn render_leaf(doc: &mut Document, node: NodeId, child: Child) -> Result<()> {
    if let Child::Node(child_id) = child {
        doc.append_child(node, child_id)?;
        return Ok(());
    }
    match child.to_markup() {
        Some(markup) => insert_markup(doc, node, &markup),
        None => Ok(()),
    }
}

fn insert_markup(doc: &mut Document, node: NodeId, markup: &str) -> Result<()> {
    if markup.is_empty() {
        return Ok(());
    }
    doc.insert_adjacent_html_unescaped(node, InsertPosition::BeforeEnd, markup)?;
    Ok(())
}
