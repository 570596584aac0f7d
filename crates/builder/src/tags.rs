//! Tag table
//!
//! `tags.tag("section")` hands out a [`Tag`] bound to one element name,
//! creating and caching it on first use. Common elements also get shortcut
//! methods, so `tags.div(doc, args)` reads like the markup it produces.

use crate::args::IntoArgs;
use crate::builder::{Builder, Built};
use crate::error::Result;
use ahash::AHashMap;
use elemental_dom::Document;
use std::cell::RefCell;
use std::rc::Rc;

/// A builder bound to one tag name
#[derive(Debug, Clone)]
pub struct Tag {
    name: Rc<str>,
    builder: Builder,
}

impl Tag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self, doc: &mut Document, args: impl IntoArgs) -> Result<Built> {
        self.builder.build(doc, &self.name, args)
    }
}

/// Lazily filled tag-name → [`Tag`] table
#[derive(Debug, Default)]
pub struct Tags {
    builder: Builder,
    table: RefCell<AHashMap<String, Tag>>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tag handed out shares `builder`'s config
    pub fn with_builder(builder: Builder) -> Self {
        Self {
            builder,
            table: RefCell::new(AHashMap::new()),
        }
    }

    /// Get the [`Tag`] for `name`, creating it on first access.
    /// Names are case-insensitive.
    pub fn tag(&self, name: &str) -> Tag {
        let key = name.to_ascii_lowercase();
        let mut table = self.table.borrow_mut();
        if let Some(tag) = table.get(&key) {
            return tag.clone();
        }

        tracing::trace!("Caching tag builder for <{}>", key);
        let tag = Tag {
            name: Rc::from(key.as_str()),
            builder: self.builder.clone(),
        };
        table.insert(key, tag.clone());
        tag
    }

    /// Number of tags created so far
    pub fn cached(&self) -> usize {
        self.table.borrow().len()
    }
}

macro_rules! tag_shortcuts {
    ($($name:ident),* $(,)?) => {
        impl Tags {
            $(
                #[doc = concat!("Build a `<", stringify!($name), ">` element")]
                pub fn $name(&self, doc: &mut Document, args: impl IntoArgs) -> Result<Built> {
                    self.tag(stringify!($name)).build(doc, args)
                }
            )*
        }
    };
}

tag_shortcuts!(
    a, article, aside, b, button, code, div, em, footer, form, h1, h2, h3, header, i, img,
    input, label, li, nav, ol, option, p, pre, section, select, span, strong, table, tbody,
    td, textarea, th, thead, tr, ul,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Attributes;
    use crate::builder::BuilderConfig;

    #[test]
    fn test_tags_are_created_lazily() {
        let tags = Tags::new();
        assert_eq!(tags.cached(), 0);

        let first = tags.tag("section");
        let again = tags.tag("SECTION");
        assert_eq!(first.name(), "section");
        assert_eq!(again.name(), "section");
        assert_eq!(tags.cached(), 1);

        tags.tag("aside");
        assert_eq!(tags.cached(), 2);
    }

    #[test]
    fn test_shortcuts_build_elements() {
        let mut doc = Document::new();
        let tags = Tags::new();

        let item = tags.li(&mut doc, vec!["one"]).unwrap();
        let list = tags
            .ul(&mut doc, (Attributes::from([("id", "menu")]), vec![item]))
            .unwrap()
            .node()
            .unwrap();

        assert_eq!(
            doc.outer_html(list).unwrap(),
            "<ul id=\"menu\"><li>one</li></ul>"
        );
        assert_eq!(tags.cached(), 2);
    }

    #[test]
    fn test_text_shorthand_through_shortcut() {
        let mut doc = Document::new();
        let tags = Tags::new();
        let built = tags.span(&mut doc, "plain").unwrap();
        assert_eq!(built.text(), Some("plain"));
    }

    #[test]
    fn test_tags_share_builder_config() {
        let config = BuilderConfig {
            defer_after: false,
            ..BuilderConfig::default()
        };
        let tags = Tags::with_builder(Builder::with_config(config.clone()));
        assert_eq!(tags.tag("div").builder.config(), &config);
    }
}
