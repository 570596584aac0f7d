//! Attribute maps and the attribute applier

use crate::args::js_number;
use crate::error::Result;
use elemental_dom::{Document, NodeId};
use smallvec::SmallVec;

/// A value that can be stored as an attribute, stringified the same way
/// sequence children are (`true`, `2`, `0.5`, `Infinity`)
pub trait AttrValue {
    fn into_attr_value(self) -> String;
}

impl AttrValue for &str {
    fn into_attr_value(self) -> String {
        self.to_string()
    }
}

impl AttrValue for String {
    fn into_attr_value(self) -> String {
        self
    }
}

impl AttrValue for &String {
    fn into_attr_value(self) -> String {
        self.clone()
    }
}

impl AttrValue for char {
    fn into_attr_value(self) -> String {
        self.to_string()
    }
}

impl AttrValue for bool {
    fn into_attr_value(self) -> String {
        self.to_string()
    }
}

impl AttrValue for f64 {
    fn into_attr_value(self) -> String {
        js_number(self)
    }
}

impl AttrValue for f32 {
    fn into_attr_value(self) -> String {
        js_number(self.into())
    }
}

macro_rules! integer_attr_values {
    ($($ty:ty),*) => {
        $(
            impl AttrValue for $ty {
                fn into_attr_value(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_attr_values!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Ordered attribute map; values are coerced to strings on insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: SmallVec<[(String, String); 4]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl AttrValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or overwrite; an overwritten key keeps its original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl AttrValue) -> Option<String> {
        let name = name.into();
        let value = value.into_attr_value();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: AttrValue> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

impl<K: Into<String>, V: AttrValue, const N: usize> From<[(K, V); N]> for Attributes {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Set every attribute on `node`, in map order
pub(crate) fn apply_attributes(doc: &mut Document, node: NodeId, attrs: &Attributes) -> Result<()> {
    for (name, value) in attrs.iter() {
        doc.set_attribute(node, name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut attrs = Attributes::from([("id", "a"), ("class", "x")]);
        assert_eq!(attrs.insert("id", "b"), Some("a".to_string()));

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("id", "b"), ("class", "x")]);
    }

    #[test]
    fn test_values_are_coerced() {
        let attrs = Attributes::new()
            .with("tabindex", 0)
            .with("hidden", true)
            .with("ratio", 0.5);
        assert_eq!(attrs.get("tabindex"), Some("0"));
        assert_eq!(attrs.get("hidden"), Some("true"));
        assert_eq!(attrs.get("ratio"), Some("0.5"));
        assert_eq!(attrs.len(), 3);
    }

    #[test]
    fn test_numbers_match_child_coercion() {
        let attrs = Attributes::new()
            .with("max", f64::INFINITY)
            .with("min", f64::NEG_INFINITY)
            .with("step", f64::NAN)
            .with("width", 2.0)
            .with("scale", 1e21);
        assert_eq!(attrs.get("max"), Some("Infinity"));
        assert_eq!(attrs.get("min"), Some("-Infinity"));
        assert_eq!(attrs.get("step"), Some("NaN"));
        assert_eq!(attrs.get("width"), Some("2"));
        assert_eq!(attrs.get("scale"), Some("1e+21"));

        for value in [f64::INFINITY, 2.0, 0.1 + 0.2] {
            let child = crate::args::Child::from(value);
            let attrs = Attributes::new().with("v", value);
            assert_eq!(attrs.get("v"), child.to_markup().as_deref());
        }
    }

    #[test]
    fn test_apply_attributes() {
        let mut doc = Document::new();
        let node = doc.create_element("a").unwrap();
        let attrs = Attributes::from([("href", "/docs"), ("target", "_blank")]);

        apply_attributes(&mut doc, node, &attrs).unwrap();

        assert_eq!(doc.get_attribute(node, "href").unwrap(), Some("/docs"));
        assert_eq!(doc.get_attribute(node, "target").unwrap(), Some("_blank"));
    }

    #[test]
    fn test_apply_rejects_bad_name() {
        let mut doc = Document::new();
        let node = doc.create_element("a").unwrap();
        let attrs = Attributes::new().with("ok", 1).with("not ok", 2);

        assert!(apply_attributes(&mut doc, node, &attrs).is_err());
        // no rollback: the first attribute stays
        assert_eq!(doc.get_attribute(node, "ok").unwrap(), Some("1"));
    }
}
