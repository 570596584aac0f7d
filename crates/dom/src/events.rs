//! Event listeners and dispatch
//!
//! Listeners are reference-counted closures stored per node. Dispatch walks
//! target → ancestors (bubbling) and snapshots each node's listener list
//! before calling into it, so handlers are free to mutate the document,
//! including adding or removing listeners.

use crate::document::Document;
use crate::types::NodeId;
use ahash::AHashMap;
use std::fmt;
use std::rc::Rc;

/// A registered event handler
///
/// Handlers receive the owning document mutably, so they can inspect or
/// change the tree in response to the event.
pub type Listener = Rc<dyn Fn(&mut Document, &mut Event)>;

/// Wrap a closure as a [`Listener`]
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&mut Document, &mut Event) + 'static,
{
    Rc::new(f)
}

/// Dispatch phase of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None,
    AtTarget,
    Bubbling,
}

/// An event travelling through the tree
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    phase: EventPhase,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    /// A bubbling, cancelable event (what user-agent input events look like)
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: true,
            cancelable: true,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Has no effect on non-cancelable events
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Per-node listener lists, in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    by_node: AHashMap<NodeId, Vec<(String, Listener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; registering the same listener twice for the
    /// same node and type is a no-op
    pub fn add(&mut self, node_id: NodeId, event_type: &str, listener: Listener) -> bool {
        let entries = self.by_node.entry(node_id).or_default();
        let duplicate = entries
            .iter()
            .any(|(ty, existing)| ty == event_type && Rc::ptr_eq(existing, &listener));
        if duplicate {
            return false;
        }
        entries.push((event_type.to_string(), listener));
        true
    }

    pub fn remove(&mut self, node_id: NodeId, event_type: &str, listener: &Listener) -> bool {
        let Some(entries) = self.by_node.get_mut(&node_id) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(ty, existing)| !(ty == event_type && Rc::ptr_eq(existing, listener)));
        before != entries.len()
    }

    /// Snapshot of the listeners registered on a node for one event type
    pub fn matching(&self, node_id: NodeId, event_type: &str) -> Vec<Listener> {
        self.by_node
            .get(&node_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(ty, _)| ty == event_type)
                    .map(|(_, l)| Rc::clone(l))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, node_id: NodeId, event_type: &str) -> usize {
        self.by_node
            .get(&node_id)
            .map(|entries| entries.iter().filter(|(ty, _)| ty == event_type).count())
            .unwrap_or(0)
    }

    /// Event types with at least one listener on a node, in registration order
    pub fn event_types(&self, node_id: NodeId) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        if let Some(entries) = self.by_node.get(&node_id) {
            for (ty, _) in entries {
                if !types.contains(&ty.as_str()) {
                    types.push(ty);
                }
            }
        }
        types
    }

    pub fn clear(&mut self) {
        self.by_node.clear();
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.by_node.values().map(Vec::len).sum();
        f.debug_struct("ListenerRegistry")
            .field("nodes", &self.by_node.len())
            .field("listeners", &total)
            .finish()
    }
}

/// Run an event through `path` (target first, then ancestors)
pub(crate) fn dispatch_along(doc: &mut Document, path: &[NodeId], event: &mut Event) {
    let Some(&target) = path.first() else {
        return;
    };
    event.target = Some(target);

    for (depth, &node_id) in path.iter().enumerate() {
        if depth > 0 && !event.bubbles {
            break;
        }
        event.phase = if depth == 0 {
            EventPhase::AtTarget
        } else {
            EventPhase::Bubbling
        };
        event.current_target = Some(node_id);

        let listeners = doc.listeners().matching(node_id, &event.event_type);
        for handler in listeners {
            handler(&mut *doc, &mut *event);
            if event.immediate_propagation_stopped {
                break;
            }
        }

        if event.propagation_stopped {
            break;
        }
    }

    event.phase = EventPhase::None;
    event.current_target = None;
}
