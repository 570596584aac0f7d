//! Event maps and the event binder
//!
//! An [`Events`] map is ordered. Two keys are directives rather than event
//! types:
//! - `sub_events`: selector → `{type, func}`, bound on matching descendants
//! - `after`: a one-shot callback that receives the finished node
//!
//! Every other key is an event type bound directly on the new node.

use crate::builder::BuilderConfig;
use crate::error::{BuildError, Result};
use elemental_dom::{listener, Document, Event, Listener, NodeId};
use std::fmt;
use std::rc::Rc;

/// Reserved key: descendant bindings
pub const SUB_EVENTS: &str = "sub_events";

/// Reserved key: post-construction callback
pub const AFTER: &str = "after";

/// Callback run once with the fully assembled node
pub type AfterHook = Box<dyn FnOnce(&mut Document, NodeId)>;

/// `{type, func}` descriptor for a descendant binding
#[derive(Clone)]
pub struct SubEvent {
    pub event_type: String,
    pub func: Listener,
}

impl SubEvent {
    pub fn new<F>(event_type: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        Self::with_listener(event_type, listener(func))
    }

    pub fn with_listener(event_type: impl Into<String>, func: Listener) -> Self {
        Self {
            event_type: event_type.into(),
            func,
        }
    }
}

impl fmt::Debug for SubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubEvent")
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}

/// Value stored under an events-map key
pub enum Binding {
    Listener(Listener),
    SubEvents(Vec<(String, SubEvent)>),
    After(AfterHook),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Listener(_) => "a listener",
            Binding::SubEvents(_) => "a selector map",
            Binding::After(_) => "a callback",
        }
    }
}

/// Ordered events map
#[derive(Default)]
pub struct Events {
    entries: Vec<(String, Binding)>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; an overwritten key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, binding: Binding) -> Option<Binding> {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, binding)),
            None => {
                self.entries.push((key, binding));
                None
            }
        }
    }

    /// Bind `f` for `event_type` on the new node
    pub fn on<F>(self, event_type: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        self.listener(event_type, listener(f))
    }

    /// Like [`Events::on`] with a shared listener
    pub fn listener(mut self, event_type: impl Into<String>, listener: Listener) -> Self {
        self.insert(event_type, Binding::Listener(listener));
        self
    }

    /// Bind `f` for `event_type` on every descendant matching `selector`
    pub fn sub<F>(self, selector: impl Into<String>, event_type: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        self.sub_event(selector, SubEvent::new(event_type, f))
    }

    /// Add one `selector → {type, func}` entry under `sub_events`;
    /// a repeated selector replaces its descriptor in place
    pub fn sub_event(mut self, selector: impl Into<String>, descriptor: SubEvent) -> Self {
        let selector = selector.into();
        let existing = self
            .entries
            .iter_mut()
            .find(|(key, _)| key == SUB_EVENTS)
            .map(|(_, binding)| binding);

        match existing {
            Some(Binding::SubEvents(map)) => {
                match map.iter_mut().find(|(s, _)| *s == selector) {
                    Some((_, slot)) => *slot = descriptor,
                    None => map.push((selector, descriptor)),
                }
            }
            _ => {
                self.insert(SUB_EVENTS, Binding::SubEvents(vec![(selector, descriptor)]));
            }
        }
        self
    }

    /// Run `f` with the finished node before the build call returns
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Document, NodeId) + 'static,
    {
        self.insert(AFTER, Binding::After(Box::new(f)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Binding)> {
        self.entries
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, binding)| (key, binding.kind())))
            .finish()
    }
}

fn expected_for(key: &str) -> &'static str {
    match key {
        SUB_EVENTS => "a selector map",
        AFTER => "a callback",
        _ => "a listener",
    }
}

/// Walk the events map in order and bind everything onto `node`.
///
/// With `defer_after` the `after` hook runs once everything else is bound,
/// regardless of its position in the map.
pub(crate) fn bind_events(
    doc: &mut Document,
    node: NodeId,
    events: Events,
    config: &BuilderConfig,
) -> Result<()> {
    let mut deferred: Option<AfterHook> = None;

    for (key, binding) in events.into_entries() {
        match binding {
            Binding::SubEvents(map) if key == SUB_EVENTS => bind_sub_events(doc, node, &map)?,
            Binding::After(hook) if key == AFTER => {
                if config.defer_after {
                    deferred = Some(hook);
                } else {
                    run_after(doc, node, hook);
                }
            }
            Binding::Listener(l) if key != SUB_EVENTS && key != AFTER => {
                doc.add_event_listener(node, &key, l)?;
            }
            other => {
                let expected = expected_for(&key);
                if config.strict_bindings {
                    return Err(BuildError::BindingMismatch {
                        key,
                        expected,
                        actual: other.kind(),
                    });
                }
                tracing::warn!(
                    "Skipping event key '{}': expected {}, got {}",
                    key,
                    expected,
                    other.kind()
                );
            }
        }
    }

    if let Some(hook) = deferred {
        run_after(doc, node, hook);
    }
    Ok(())
}

fn bind_sub_events(doc: &mut Document, node: NodeId, map: &[(String, SubEvent)]) -> Result<()> {
    for (selector, descriptor) in map {
        let targets = doc.query_selector_all(node, selector)?;
        tracing::debug!(
            "sub_events '{}' matched {} descendant(s) of node {}",
            selector,
            targets.len(),
            node
        );
        for target in targets {
            doc.add_event_listener(target, &descriptor.event_type, Rc::clone(&descriptor.func))?;
        }
    }
    Ok(())
}

fn run_after(doc: &mut Document, node: NodeId, hook: AfterHook) {
    tracing::trace!("Running after hook for node {}", node);
    hook(doc, node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use elemental_dom::InsertPosition;
    use std::cell::{Cell, RefCell};

    fn strict() -> BuilderConfig {
        BuilderConfig::default()
    }

    #[test]
    fn test_events_map_order_and_replace() {
        let events = Events::new()
            .on("click", |_, _| {})
            .after(|_, _| {})
            .on("input", |_, _| {})
            .on("click", |_, _| {});
        let keys: Vec<&str> = events.keys().collect();
        assert_eq!(keys, vec!["click", "after", "input"]);
    }

    #[test]
    fn test_sub_event_entries_merge() {
        let events = Events::new()
            .sub("span", "click", |_, _| {})
            .on("focus", |_, _| {})
            .sub("b", "click", |_, _| {})
            .sub("span", "mouseover", |_, _| {});

        assert_eq!(events.len(), 2);
        let entries = events.into_entries();
        let Binding::SubEvents(map) = &entries[0].1 else {
            panic!("expected sub_events first");
        };
        let summary: Vec<(&str, &str)> = map
            .iter()
            .map(|(s, d)| (s.as_str(), d.event_type.as_str()))
            .collect();
        assert_eq!(summary, vec![("span", "mouseover"), ("b", "click")]);
    }

    #[test]
    fn test_sub_events_bind_on_every_match() {
        let mut doc = Document::new();
        let node = doc.create_element("div").unwrap();
        doc.insert_adjacent_html_unescaped(
            node,
            InsertPosition::BeforeEnd,
            "<span>a</span><p><span>b</span></p>",
        )
        .unwrap();

        let events = Events::new()
            .sub("span", "click", |_, _| {})
            .sub("table", "click", |_, _| {});
        bind_events(&mut doc, node, events, &strict()).unwrap();

        let spans = doc.query_selector_all(node, "span").unwrap();
        for span in spans {
            assert_eq!(doc.listener_count(span, "click"), 1);
        }
        assert_eq!(doc.listener_count(node, "click"), 0);
    }

    #[test]
    fn test_sub_events_skip_later_descendants() {
        let mut doc = Document::new();
        let node = doc.create_element("div").unwrap();
        doc.insert_adjacent_html_unescaped(node, InsertPosition::BeforeEnd, "<span>a</span>")
            .unwrap();

        let events = Events::new().sub("span", "click", |_, _| {});
        bind_events(&mut doc, node, events, &strict()).unwrap();

        let late = doc.create_element("span").unwrap();
        doc.append_child(node, late).unwrap();

        let spans = doc.query_selector_all(node, "span").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(doc.listener_count(spans[0], "click"), 1);
        assert_eq!(doc.listener_count(late, "click"), 0);
    }

    #[test]
    fn test_after_runs_last_when_deferred() {
        let mut doc = Document::new();
        let node = doc.create_element("div").unwrap();
        let seen = Rc::new(Cell::new(usize::MAX));

        let tracker = Rc::clone(&seen);
        let events = Events::new()
            .after(move |doc, node| tracker.set(doc.listener_count(node, "click")))
            .on("click", |_, _| {});
        bind_events(&mut doc, node, events, &strict()).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_after_in_map_position_when_not_deferred() {
        let mut doc = Document::new();
        let node = doc.create_element("div").unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));

        let tracker = Rc::clone(&order);
        let events = Events::new()
            .after(move |doc, node| {
                tracker
                    .borrow_mut()
                    .push(doc.listener_count(node, "click"))
            })
            .on("click", |_, _| {});
        let config = BuilderConfig {
            defer_after: false,
            ..BuilderConfig::default()
        };
        bind_events(&mut doc, node, events, &config).unwrap();
        assert_eq!(*order.borrow(), vec![0]);
    }

    #[test]
    fn test_reserved_key_with_wrong_binding() {
        let mut doc = Document::new();
        let node = doc.create_element("div").unwrap();

        let mut events = Events::new();
        events.insert(AFTER, Binding::Listener(listener(|_, _| {})));
        let err = bind_events(&mut doc, node, events, &strict()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::BindingMismatch { ref key, expected: "a callback", .. } if key == AFTER
        ));

        let mut events = Events::new();
        events.insert("click", Binding::After(Box::new(|_: &mut Document, _: NodeId| {})));
        events.insert("input", Binding::Listener(listener(|_, _| {})));
        let lenient = BuilderConfig {
            strict_bindings: false,
            ..BuilderConfig::default()
        };
        bind_events(&mut doc, node, events, &lenient).unwrap();
        assert_eq!(doc.listener_count(node, "click"), 0);
        assert_eq!(doc.listener_count(node, "input"), 1);
    }

    #[test]
    fn test_invalid_sub_event_selector_propagates() {
        let mut doc = Document::new();
        let node = doc.create_element("div").unwrap();
        let events = Events::new().sub("span[", "click", |_, _| {});

        let err = bind_events(&mut doc, node, events, &strict()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Dom(elemental_dom::DomError::InvalidSelector(_))
        ));
    }
}
