//! Document - owner of the node arena and the listener registry
//!
//! This is the surface element-building code talks to:
//! - node creation (elements, text, comments, fragments)
//! - tree mutation with DOM hierarchy checks
//! - attributes
//! - trusted markup insertion
//! - selector queries
//! - listener registration and dispatch
//! - serialization helpers

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::events::{self, Event, Listener, ListenerRegistry};
use crate::markup;
use crate::selector::Selector;
use crate::serializer::HtmlSerializer;
use crate::types::*;
use crate::utils;
use serde_json::{json, Value};
use uuid::Uuid;

/// An in-memory document: every node it creates is addressed by a [`NodeId`]
#[derive(Debug)]
pub struct Document {
    id: Uuid,
    arena: DomArena,
    listeners: ListenerRegistry,
    /// Fragment reused by every markup insertion; empty between calls
    scratch: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            arena: DomArena::new(),
            listeners: ListenerRegistry::new(),
            scratch: None,
        }
    }

    /// Unique id of this document (shows up in logs)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn node(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.arena.get_mut(node_id)
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Create a detached element; the tag name is ASCII-lowercased
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        if !utils::is_valid_element_name(tag) {
            return Err(DomError::InvalidCharacter(tag.to_string()));
        }
        let node_id = self
            .arena
            .alloc(NodeType::Element, tag.to_ascii_lowercase());
        tracing::trace!("Created <{}> as node {}", tag, node_id);
        Ok(node_id)
    }

    pub fn create_text_node(&mut self, text: impl Into<String>) -> NodeId {
        let node_id = self.arena.alloc(NodeType::Text, "#text".to_string());
        if let Ok(node) = self.arena.get_mut(node_id) {
            node.node_value = text.into();
        }
        node_id
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        let node_id = self.arena.alloc(NodeType::Comment, "#comment".to_string());
        if let Ok(node) = self.arena.get_mut(node_id) {
            node.node_value = text.into();
        }
        node_id
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.arena
            .alloc(NodeType::DocumentFragment, "#document-fragment".to_string())
    }

    // ---------------------------------------------------------------------
    // Tree structure
    // ---------------------------------------------------------------------

    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        self.arena.parent(node_id)
    }

    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.arena.get(node_id)?.children_ids)
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    /// elsewhere. Appending a fragment moves the fragment's children instead.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId> {
        let parent_node = self.arena.get(parent)?;
        if !parent_node.node_type.is_container() {
            return Err(DomError::HierarchyRequest(format!(
                "{} node {} cannot have children",
                parent_node.node_type.as_str(),
                parent
            )));
        }
        let child_type = self.arena.get(child)?.node_type;
        if self.arena.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::HierarchyRequest(format!(
                "node {} is an inclusive ancestor of node {}",
                child, parent
            )));
        }
        if let Some(reference) = reference {
            if self.arena.get(reference)?.parent_id != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        let moved: Vec<NodeId> = if child_type == NodeType::DocumentFragment {
            self.arena.get(child)?.children_ids.to_vec()
        } else {
            vec![child]
        };

        // Inserting a node before itself means "before its next sibling"
        let reference = match reference {
            Some(r) if moved.contains(&r) => self.next_sibling_outside(r, &moved)?,
            other => other,
        };

        for &node_id in &moved {
            self.detach(node_id)?;
        }

        let parent_node = self.arena.get_mut(parent)?;
        let mut index = match reference {
            Some(r) => parent_node
                .children_ids
                .iter()
                .position(|&id| id == r)
                .unwrap_or(parent_node.children_ids.len()),
            None => parent_node.children_ids.len(),
        };
        for &node_id in &moved {
            parent_node.children_ids.insert(index, node_id);
            index += 1;
        }
        for &node_id in &moved {
            self.arena.get_mut(node_id)?.parent_id = Some(parent);
        }

        Ok(child)
    }

    fn next_sibling_outside(&self, node_id: NodeId, skip: &[NodeId]) -> Result<Option<NodeId>> {
        let Some(parent) = self.arena.parent(node_id)? else {
            return Ok(None);
        };
        let siblings = &self.arena.get(parent)?.children_ids;
        let start = siblings
            .iter()
            .position(|&id| id == node_id)
            .map(|p| p + 1)
            .unwrap_or(siblings.len());
        Ok(siblings[start..].iter().copied().find(|id| !skip.contains(id)))
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        if self.arena.get(child)?.parent_id != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child)?;
        Ok(child)
    }

    fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let Some(parent) = self.arena.get(node_id)?.parent_id else {
            return Ok(());
        };
        self.arena
            .get_mut(parent)?
            .children_ids
            .retain(|id| *id != node_id);
        self.arena.get_mut(node_id)?.parent_id = None;
        Ok(())
    }

    pub fn traverse_df<F>(&self, start_id: NodeId, visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        self.arena.traverse_df(start_id, visit)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();
        self.arena.traverse_df(node_id, |node| {
            if node.is_text() {
                text.push_str(&node.node_value);
            }
            Ok(())
        })?;
        Ok(text)
    }

    /// First descendant element with the given `id` attribute
    pub fn find_by_id(&self, root: NodeId, id: &str) -> Result<Option<NodeId>> {
        Ok(self
            .arena
            .find_descendants(root, |node| node.is_element() && node.attr("id") == Some(id))?
            .into_iter()
            .next())
    }

    /// All descendant elements with the given tag name
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Result<Vec<NodeId>> {
        self.arena
            .find_descendants(root, |node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let node = self.arena.get_mut(node_id)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: "element".to_string(),
                actual: node.node_type.as_str().to_string(),
            });
        }
        Ok(node)
    }

    /// Set an attribute; the name is validated and ASCII-lowercased
    pub fn set_attribute(
        &mut self,
        node_id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        if !utils::is_valid_attribute_name(name) {
            return Err(DomError::InvalidCharacter(name.to_string()));
        }
        let name = name.to_ascii_lowercase();
        self.element_mut(node_id)?.set_attr(&name, value.into());
        Ok(())
    }

    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self.arena.get(node_id)?.attr(&name.to_ascii_lowercase()))
    }

    pub fn has_attribute(&self, node_id: NodeId, name: &str) -> Result<bool> {
        Ok(self.get_attribute(node_id, name)?.is_some())
    }

    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self
            .element_mut(node_id)?
            .remove_attr(&name.to_ascii_lowercase()))
    }

    // ---------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------

    /// Append `text` as a text node. Safe for untrusted input: nothing is parsed.
    pub fn append_text(&mut self, node_id: NodeId, text: impl Into<String>) -> Result<NodeId> {
        let text_id = self.create_text_node(text);
        self.append_child(node_id, text_id)
    }

    /// Parse `html` as a fragment and insert it relative to `node_id`.
    ///
    /// The markup is trusted: tags in it become elements, nothing is escaped.
    /// Never pass user-supplied text here; use [`Document::append_text`].
    pub fn insert_adjacent_html_unescaped(
        &mut self,
        node_id: NodeId,
        position: InsertPosition,
        html: &str,
    ) -> Result<()> {
        let parent = self.arena.get(node_id)?.parent_id;
        if matches!(position, InsertPosition::BeforeBegin | InsertPosition::AfterEnd)
            && parent.is_none()
        {
            return Err(DomError::HierarchyRequest(format!(
                "node {} has no parent to insert {:?} into",
                node_id, position
            )));
        }

        let fragment = self.scratch_fragment()?;
        markup::parse_into(self, fragment, html)?;

        match (position, parent) {
            (InsertPosition::BeforeBegin, Some(parent)) => {
                self.insert_before(parent, fragment, Some(node_id))?;
            }
            (InsertPosition::AfterEnd, Some(parent)) => {
                let next = self.next_sibling_outside(node_id, &[])?;
                self.insert_before(parent, fragment, next)?;
            }
            (InsertPosition::AfterBegin, _) => {
                let first = self.arena.get(node_id)?.children_ids.first().copied();
                self.insert_before(node_id, fragment, first)?;
            }
            _ => {
                self.append_child(node_id, fragment)?;
            }
        }
        Ok(())
    }

    /// The shared insertion fragment, emptied of anything a failed parse
    /// left behind
    fn scratch_fragment(&mut self) -> Result<NodeId> {
        let Some(fragment) = self.scratch else {
            let fragment = self.create_document_fragment();
            self.scratch = Some(fragment);
            return Ok(fragment);
        };
        let leftovers = self.arena.get(fragment)?.children_ids.to_vec();
        for child in leftovers {
            self.detach(child)?;
        }
        Ok(fragment)
    }

    // ---------------------------------------------------------------------
    // Selectors
    // ---------------------------------------------------------------------

    /// All descendants of `root` matching `selector`, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        let mut found = Vec::new();
        for candidate in self.arena.find_descendants(root, DomNode::is_element)? {
            if selector.matches(&self.arena, candidate)? {
                found.push(candidate);
            }
        }
        Ok(found)
    }

    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(root, selector)?.into_iter().next())
    }

    pub fn matches(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        Selector::parse(selector)?.matches(&self.arena, node_id)
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    pub fn add_event_listener(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        listener: Listener,
    ) -> Result<()> {
        self.arena.get(node_id)?;
        if self.listeners.add(node_id, event_type, listener) {
            tracing::trace!("Bound '{}' listener on node {}", event_type, node_id);
        }
        Ok(())
    }

    pub fn remove_event_listener(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        listener: &Listener,
    ) -> bool {
        self.listeners.remove(node_id, event_type, listener)
    }

    pub fn listener_count(&self, node_id: NodeId, event_type: &str) -> usize {
        self.listeners.count(node_id, event_type)
    }

    /// Dispatch `event` at `target`, bubbling through ancestors when the
    /// event bubbles. Returns `false` if a listener prevented the default.
    pub fn dispatch_event(&mut self, target: NodeId, mut event: Event) -> Result<bool> {
        let mut path = vec![target];
        let mut cursor = self.arena.parent(target)?;
        while let Some(ancestor) = cursor {
            path.push(ancestor);
            cursor = self.arena.parent(ancestor)?;
        }

        tracing::trace!(
            "[{}] Dispatching '{}' at node {} (path length {})",
            self.id,
            event.event_type(),
            target,
            path.len()
        );
        events::dispatch_along(self, &path, &mut event);
        Ok(!event.default_prevented())
    }

    // ---------------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------------

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        HtmlSerializer::new().outer_html(&self.arena, node_id)
    }

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        HtmlSerializer::new().inner_html(&self.arena, node_id)
    }

    /// Dump a subtree as JSON in the same nested shape CDP's `DOM.getDocument` uses
    pub fn snapshot_json(&self, node_id: NodeId) -> Result<Value> {
        let node = self.arena.get(node_id)?;
        let attributes: Vec<&str> = node
            .attributes
            .iter()
            .flat_map(|(k, v)| [k.as_str(), v.as_str()])
            .collect();
        let children = node
            .children_ids
            .iter()
            .map(|&child| self.snapshot_json(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "nodeId": node.node_id,
            "nodeType": node.node_type as u8,
            "nodeName": node.node_name,
            "nodeValue": node.node_value,
            "attributes": attributes,
            "listeners": self.listeners.event_types(node_id),
            "children": children,
        }))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
