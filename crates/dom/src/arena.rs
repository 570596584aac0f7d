//! Arena-based node storage
//!
//! Every node a document ever creates lives here, addressed by a 4-byte
//! index. Detached nodes stay allocated; ownership is expressed through
//! `parent_id` / `children_ids`, not through the arena.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

/// Arena allocator for DOM nodes
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a detached node, returns its ID
    pub fn alloc(&mut self, node_type: NodeType, node_name: String) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(DomNode::new(node_id, node_type, node_name));
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Whether `node_id` names an allocated node
    pub fn contains(&self, node_id: NodeId) -> bool {
        (node_id as usize) < self.nodes.len()
    }

    /// Total number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Whether `ancestor` is `node_id` itself or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id;
        }
        Ok(false)
    }

    /// Traverse subtree depth-first in document order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Descendants of `root` (excluding `root`) matching a predicate, in document order
    pub fn find_descendants<F>(&self, root: NodeId, predicate: F) -> Result<Vec<NodeId>>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut found = Vec::new();
        self.traverse_df(root, |node| {
            if node.node_id != root && predicate(node) {
                found.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(arena: &mut DomArena, parent: NodeId, child: NodeId) {
        arena.get_mut(parent).unwrap().children_ids.push(child);
        arena.get_mut(child).unwrap().parent_id = Some(parent);
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();

        let id = arena.alloc(NodeType::Element, "div".to_string());
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert!(retrieved.parent_id.is_none());
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }

    #[test]
    fn test_traverse_df() {
        let mut arena = DomArena::new();

        // Create tree: root -> [child1 -> [leaf], child2]
        let root = arena.alloc(NodeType::Element, "div".to_string());
        let child1 = arena.alloc(NodeType::Element, "span".to_string());
        let leaf = arena.alloc(NodeType::Element, "b".to_string());
        let child2 = arena.alloc(NodeType::Element, "span".to_string());
        link(&mut arena, root, child1);
        link(&mut arena, child1, leaf);
        link(&mut arena, root, child2);

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["div", "span", "b", "span"]);
    }

    #[test]
    fn test_ancestry() {
        let mut arena = DomArena::new();
        let root = arena.alloc(NodeType::Element, "ul".to_string());
        let item = arena.alloc(NodeType::Element, "li".to_string());
        link(&mut arena, root, item);

        assert!(arena.is_inclusive_ancestor(root, item).unwrap());
        assert!(arena.is_inclusive_ancestor(item, item).unwrap());
        assert!(!arena.is_inclusive_ancestor(item, root).unwrap());

        let spans = arena
            .find_descendants(root, |node| node.node_name == "li")
            .unwrap();
        assert_eq!(spans, vec![item]);
    }
}
