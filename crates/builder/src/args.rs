//! Argument shapes accepted by the builder
//!
//! A call takes up to three positional [`Arg`]s. Each one is a tagged
//! union over the shapes the call surface understands, so the normalizer
//! can decide what a position means by looking at its shape alone.

use crate::attrs::Attributes;
use crate::bind::Events;
use crate::builder::Built;
use elemental_dom::NodeId;
use std::borrow::Cow;

/// One item of a children sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Inserted as raw markup
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// An already-built node, appended as-is
    Node(NodeId),
    /// A nested sequence; only one level of nesting is flattened
    List(Vec<Child>),
}

impl Child {
    pub fn node(node_id: NodeId) -> Self {
        Child::Node(node_id)
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Child>,
    {
        Child::List(items.into_iter().map(Into::into).collect())
    }

    /// String form of a primitive, coerced the way a JS engine would
    /// (`true`, `42`, `1.5`, `NaN`, `Infinity`). `None` for nodes and lists.
    pub fn to_markup(&self) -> Option<Cow<'_, str>> {
        match self {
            Child::Str(s) => Some(Cow::Borrowed(s)),
            Child::Int(n) => Some(Cow::Owned(n.to_string())),
            Child::Float(f) => Some(Cow::Owned(js_number(*f))),
            Child::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Child::Node(_) | Child::List(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Child::Str(_) => "string",
            Child::Int(_) | Child::Float(_) => "number",
            Child::Bool(_) => "boolean",
            Child::Node(_) => "node",
            Child::List(_) => "list",
        }
    }
}

/// Number → string the way `String(n)` does it
pub(crate) fn js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if !(1e-6..1e21).contains(&abs) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    value.to_string()
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Str(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Str(value)
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Child::Str(value.clone())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Int(value.into())
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Int(value)
    }
}

impl From<usize> for Child {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(Child::Int)
            .unwrap_or(Child::Float(value as f64))
    }
}

impl From<f32> for Child {
    fn from(value: f32) -> Self {
        Child::Float(value.into())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Float(value)
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Child::Bool(value)
    }
}

/// A nested build result: nodes are appended, short-circuited text is markup
impl From<Built> for Child {
    fn from(value: Built) -> Self {
        match value {
            Built::Node(node_id) => Child::Node(node_id),
            Built::Text(text) => Child::Str(text),
        }
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::list(items)
    }
}

/// The children position of a call: bare text or a sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    Text(String),
    List(Vec<Child>),
}

impl Children {
    pub fn is_empty(&self) -> bool {
        match self {
            Children::Text(text) => text.is_empty(),
            Children::List(items) => items.is_empty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Children::Text(_) => "text",
            Children::List(_) => "sequence",
        }
    }
}

impl Default for Children {
    fn default() -> Self {
        Children::List(Vec::new())
    }
}

impl From<&str> for Children {
    fn from(value: &str) -> Self {
        Children::Text(value.to_string())
    }
}

impl From<String> for Children {
    fn from(value: String) -> Self {
        Children::Text(value)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Children {
    fn from(items: Vec<T>) -> Self {
        Children::List(items.into_iter().map(Into::into).collect())
    }
}

/// One positional argument
#[derive(Debug)]
pub enum Arg {
    Attrs(Attributes),
    Children(Children),
    Events(Events),
}

impl Arg {
    /// Whether this argument is ordered-list-like (a children sequence or bare text)
    pub fn is_sequence(&self) -> bool {
        matches!(self, Arg::Children(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Attrs(_) => "attributes",
            Arg::Children(children) => children.kind(),
            Arg::Events(_) => "events",
        }
    }
}

impl From<Attributes> for Arg {
    fn from(value: Attributes) -> Self {
        Arg::Attrs(value)
    }
}

impl From<Children> for Arg {
    fn from(value: Children) -> Self {
        Arg::Children(value)
    }
}

impl From<Events> for Arg {
    fn from(value: Events) -> Self {
        Arg::Events(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Children(value.into())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Children(value.into())
    }
}

impl<T: Into<Child>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::Children(items.into())
    }
}

/// Anything that can stand in for the `(a?, b?, c?)` argument list
///
/// Implemented for `()`, single arguments and tuples of up to three.
pub trait IntoArgs {
    fn into_args(self) -> [Option<Arg>; 3];
}

impl IntoArgs for () {
    fn into_args(self) -> [Option<Arg>; 3] {
        [None, None, None]
    }
}

impl IntoArgs for Arg {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self), None, None]
    }
}

impl IntoArgs for Attributes {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.into()), None, None]
    }
}

impl IntoArgs for Children {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.into()), None, None]
    }
}

impl IntoArgs for &str {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.into()), None, None]
    }
}

impl IntoArgs for String {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.into()), None, None]
    }
}

impl<T: Into<Child>> IntoArgs for Vec<T> {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.into()), None, None]
    }
}

impl<A: Into<Arg>> IntoArgs for (A,) {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.0.into()), None, None]
    }
}

impl<A: Into<Arg>, B: Into<Arg>> IntoArgs for (A, B) {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.0.into()), Some(self.1.into()), None]
    }
}

impl<A: Into<Arg>, B: Into<Arg>, C: Into<Arg>> IntoArgs for (A, B, C) {
    fn into_args(self) -> [Option<Arg>; 3] {
        [Some(self.0.into()), Some(self.1.into()), Some(self.2.into())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_coercion() {
        assert_eq!(Child::from("<b>x</b>").to_markup().unwrap(), "<b>x</b>");
        assert_eq!(Child::from(true).to_markup().unwrap(), "true");
        assert_eq!(Child::from(42).to_markup().unwrap(), "42");
        assert_eq!(Child::from(1.5).to_markup().unwrap(), "1.5");
        assert_eq!(Child::from(2.0).to_markup().unwrap(), "2");
        assert!(Child::node(3).to_markup().is_none());
        assert!(Child::list(["a"]).to_markup().is_none());
    }

    #[test]
    fn test_js_number_edge_cases() {
        assert_eq!(js_number(f64::NAN), "NaN");
        assert_eq!(js_number(f64::INFINITY), "Infinity");
        assert_eq!(js_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(js_number(-0.0), "0");
        assert_eq!(js_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(js_number(1e21), "1e+21");
        assert_eq!(js_number(1.5e-7), "1.5e-7");
        assert_eq!(js_number(-250.0), "-250");
    }

    #[test]
    fn test_arg_shapes() {
        assert!(Arg::from("hello").is_sequence());
        assert!(Arg::from(vec!["a", "b"]).is_sequence());
        assert!(!Arg::from(Attributes::new()).is_sequence());
        assert!(!Arg::from(Events::new()).is_sequence());
        assert_eq!(Arg::from("x").kind(), "text");
    }

    #[test]
    fn test_into_args_positions() {
        let [a, b, c] = ("x", vec![1i64, 2]).into_args();
        assert!(matches!(a, Some(Arg::Children(Children::Text(_)))));
        assert!(matches!(b, Some(Arg::Children(Children::List(ref v))) if v.len() == 2));
        assert!(c.is_none());

        let [a, b, c] = ().into_args();
        assert!(a.is_none() && b.is_none() && c.is_none());
    }
}
