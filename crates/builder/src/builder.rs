//! The element builder
//!
//! One call: classify the arguments, create the element, render children,
//! set attributes, bind events. Errors abort the call; whatever was already
//! built stays in the document.

use crate::args::IntoArgs;
use crate::attrs::apply_attributes;
use crate::bind::bind_events;
use crate::error::Result;
use crate::normalize::{normalize, Normalized};
use crate::render::render_children;
use elemental_dom::{Document, NodeId};
use serde::Deserialize;

/// Builder behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Run the `after` hook once every other binding is in place, instead of
    /// at its position in the events map
    pub defer_after: bool,
    /// Fail on a reserved event key holding the wrong kind of binding;
    /// when off, the entry is skipped with a warning
    pub strict_bindings: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            defer_after: true,
            strict_bindings: true,
        }
    }
}

impl BuilderConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of a build call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Built {
    /// A freshly created element, owned by the document
    Node(NodeId),
    /// The text shorthand: children were bare text and there were no
    /// attributes, so nothing was built
    Text(String),
}

impl Built {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Built::Node(node_id) => Some(*node_id),
            Built::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Built::Node(_) => None,
            Built::Text(text) => Some(text),
        }
    }
}

/// Element builder
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: BuilderConfig,
}

impl Builder {
    /// Create builder with default config
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build a `tag` element from up to three positional arguments.
    ///
    /// ```text
    /// build(doc, "div", ())                          → <div></div>
    /// build(doc, "div", "hello")                     → Built::Text("hello")
    /// build(doc, "div", (attrs, "hello"))            → <div class="x">hello</div>
    /// build(doc, "ul", (vec![li_a, li_b], events))   → children first, no attributes
    /// ```
    pub fn build(&self, doc: &mut Document, tag: &str, args: impl IntoArgs) -> Result<Built> {
        let [a, b, c] = args.into_args();
        let resolved = match normalize(a, b, c)? {
            Normalized::Text(text) => {
                tracing::trace!("<{}> short-circuited to text", tag);
                return Ok(Built::Text(text));
            }
            Normalized::Build(resolved) => resolved,
        };

        let node = doc.create_element(tag)?;
        render_children(doc, node, resolved.children)?;
        if let Some(attrs) = &resolved.attributes {
            apply_attributes(doc, node, attrs)?;
        }

        let bindings = resolved.events.len();
        bind_events(doc, node, resolved.events, &self.config)?;

        tracing::debug!(
            "[{}] Built <{}> as node {} ({} attribute(s), {} binding(s))",
            doc.id(),
            tag,
            node,
            resolved.attributes.as_ref().map_or(0, |attrs| attrs.len()),
            bindings
        );
        Ok(Built::Node(node))
    }
}

/// Build with the default [`Builder`]
pub fn build(doc: &mut Document, tag: &str, args: impl IntoArgs) -> Result<Built> {
    Builder::new().build(doc, tag, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Child, Children};
    use crate::attrs::Attributes;
    use crate::bind::Events;
    use crate::error::BuildError;
    use elemental_dom::Event;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_attributes_only() {
        let mut doc = Document::new();
        let attrs = Attributes::from([("id", "main"), ("class", "x")]);
        let node = build(&mut doc, "div", (attrs, Children::default()))
            .unwrap()
            .node()
            .unwrap();

        let set: Vec<(&str, &str)> = doc
            .node(node)
            .unwrap()
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(set, vec![("id", "main"), ("class", "x")]);
        assert!(doc.children(node).unwrap().is_empty());
    }

    #[test]
    fn test_no_arguments() {
        let mut doc = Document::new();
        let built = build(&mut doc, "br", ()).unwrap();
        assert_eq!(doc.outer_html(built.node().unwrap()).unwrap(), "<br>");
    }

    #[test]
    fn test_text_shorthand_builds_nothing() {
        let mut doc = Document::new();
        let built = build(&mut doc, "div", "hello").unwrap();
        assert_eq!(built, Built::Text("hello".to_string()));
        assert_eq!(built.text(), Some("hello"));
        assert!(doc.arena().is_empty());

        let built = build(&mut doc, "div", (Attributes::new(), "hello")).unwrap();
        assert_eq!(built.text(), Some("hello"));
        assert!(doc.arena().is_empty());
    }

    #[test]
    fn test_attributes_with_text() {
        let mut doc = Document::new();
        let node = build(&mut doc, "div", (Attributes::from([("class", "x")]), "hello"))
            .unwrap()
            .node()
            .unwrap();
        assert_eq!(doc.outer_html(node).unwrap(), "<div class=\"x\">hello</div>");

        let node = build(
            &mut doc,
            "div",
            (Attributes::from([("class", "x")]), "<b>x</b> &amp;"),
        )
        .unwrap()
        .node()
        .unwrap();
        assert_eq!(
            doc.outer_html(node).unwrap(),
            "<div class=\"x\">&lt;b&gt;x&lt;/b&gt; &amp;amp;</div>"
        );
        assert!(doc.find_by_tag(node, "b").unwrap().is_empty());
    }

    #[test]
    fn test_primitive_children_concatenate() {
        let mut doc = Document::new();
        let node = build(
            &mut doc,
            "p",
            vec![Child::from("total: "), Child::from(3), Child::from(" / "), Child::from(2.5)],
        )
        .unwrap()
        .node()
        .unwrap();
        assert_eq!(doc.text_content(node).unwrap(), "total: 3 / 2.5");
    }

    #[test]
    fn test_nested_children_follow_in_order() {
        let mut doc = Document::new();
        let b = build(&mut doc, "b", vec!["b"]).unwrap();
        let node = build(
            &mut doc,
            "div",
            vec![Child::from("a"), Child::list([Child::from(b), Child::from("c")])],
        )
        .unwrap()
        .node()
        .unwrap();
        assert_eq!(doc.inner_html(node).unwrap(), "a<b>b</b>c");
    }

    #[test]
    fn test_nested_builds_compose() {
        let mut doc = Document::new();
        let items: Vec<Child> = ["one", "two"]
            .into_iter()
            .map(|label| build(&mut doc, "li", vec![label]).map(Child::from))
            .collect::<Result<_>>()
            .unwrap();
        let list = build(&mut doc, "ul", (Attributes::from([("class", "menu")]), items))
            .unwrap()
            .node()
            .unwrap();
        assert_eq!(
            doc.outer_html(list).unwrap(),
            "<ul class=\"menu\"><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn test_click_listener_runs_on_dispatch_only() {
        let mut doc = Document::new();
        let clicks = Rc::new(Cell::new(0));

        let counter = Rc::clone(&clicks);
        let events = Events::new().on("click", move |_, _| counter.set(counter.get() + 1));
        let node = build(&mut doc, "button", (Attributes::new(), vec!["Go"], events))
            .unwrap()
            .node()
            .unwrap();
        assert_eq!(clicks.get(), 0);

        doc.dispatch_event(node, Event::new("input")).unwrap();
        assert_eq!(clicks.get(), 0);
        doc.dispatch_event(node, Event::new("click")).unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_sub_events_reach_every_match() {
        let mut doc = Document::new();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&hits);
        let events = Events::new().sub("span", "click", move |_, event| {
            log.borrow_mut().push(event.current_target());
        });
        let node = build(
            &mut doc,
            "div",
            (vec!["<span>a</span><span>b</span>"], events),
        )
        .unwrap()
        .node()
        .unwrap();

        let spans = doc.query_selector_all(node, "span").unwrap();
        assert_eq!(spans.len(), 2);
        for &span in &spans {
            doc.dispatch_event(span, Event::new("click").with_bubbles(false))
                .unwrap();
        }
        let expected: Vec<Option<NodeId>> = spans.iter().copied().map(Some).collect();
        assert_eq!(*hits.borrow(), expected);
    }

    #[test]
    fn test_sub_events_bind_at_construction_only() {
        let mut doc = Document::new();
        let events = Events::new().sub("span", "click", |_, _| {});
        let node = build(&mut doc, "div", (vec!["<span>early</span>"], events))
            .unwrap()
            .node()
            .unwrap();

        let late = build(&mut doc, "span", (Attributes::from([("class", "late")]), "late"))
            .unwrap()
            .node()
            .unwrap();
        doc.append_child(node, late).unwrap();

        let early = doc.query_selector(node, "span").unwrap().unwrap();
        assert_eq!(doc.listener_count(early, "click"), 1);
        assert_eq!(doc.listener_count(late, "click"), 0);
    }

    #[test]
    fn test_after_sees_finished_node() {
        let mut doc = Document::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let tracker = Rc::clone(&seen);
        let events = Events::new()
            .after(move |doc, node| {
                tracker
                    .borrow_mut()
                    .push((node, doc.outer_html(node).unwrap()));
            })
            .on("click", |_, _| {});
        let built = build(
            &mut doc,
            "div",
            (Attributes::from([("id", "card")]), vec!["body"], events),
        )
        .unwrap();

        let node = built.node().unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![(node, "<div id=\"card\">body</div>".to_string())]
        );
        assert_eq!(doc.listener_count(node, "click"), 1);
    }

    #[test]
    fn test_errors_leave_partial_node() {
        let mut doc = Document::new();
        let err = build(
            &mut doc,
            "div",
            (
                Attributes::from([("class", "x")]),
                vec!["kept"],
                Events::new().sub("[", "click", |_, _| {}),
            ),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Dom(elemental_dom::DomError::InvalidSelector(_))
        ));

        // the element was the first node allocated; no rollback
        assert_eq!(doc.node(0).unwrap().tag_name(), Some("div"));
        assert_eq!(doc.text_content(0).unwrap(), "kept");
        assert_eq!(doc.get_attribute(0, "class").unwrap(), Some("x"));
    }

    #[test]
    fn test_invalid_tag_name() {
        let mut doc = Document::new();
        let err = build(&mut doc, "not a tag", ()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Dom(elemental_dom::DomError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_config_from_json() {
        let config = BuilderConfig::from_json(r#"{"defer_after": false}"#).unwrap();
        assert!(!config.defer_after);
        assert!(config.strict_bindings);

        assert_eq!(BuilderConfig::from_json("{}").unwrap(), BuilderConfig::default());
        assert!(matches!(
            BuilderConfig::from_json(r#"{"defer": true}"#),
            Err(BuildError::Config(_))
        ));
    }

    #[test]
    fn test_builder_uses_its_config() {
        let mut doc = Document::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let events = Events::new().after(move |doc, node| {
            first.borrow_mut().push(doc.listener_count(node, "click"))
        });
        let events = events.on("click", |_, _| {});

        let builder = Builder::with_config(BuilderConfig {
            defer_after: false,
            ..BuilderConfig::default()
        });
        assert!(!builder.config().defer_after);
        builder
            .build(&mut doc, "div", (Attributes::new(), Children::default(), events))
            .unwrap();
        assert_eq!(*order.borrow(), vec![0]);
    }
}
