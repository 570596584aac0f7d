//! Declarative element construction
//!
//! One call turns a tag name plus optional attributes, children and event
//! bindings into an element of an [`elemental_dom::Document`]:
//!
//! ```text
//! build(doc, tag, (attrs?, children?, events?))
//!
//! attrs    : Attributes         name → value, set after children
//! children : "text" | [Child]   text kept literal; sequence primitives as
//!                               trusted markup, nodes appended, one level
//!                               of nested lists flattened
//! events   : Events             type → listener
//!                               sub_events → selector → {type, func}
//!                               after      → FnOnce(&mut Document, NodeId)
//! ```
//!
//! When the first argument is a children sequence the positions shift:
//! `(children, events)`. Bare text with no attributes is returned as-is
//! without building anything.
//!
//! ```ignore
//! use elemental::{attrs, build, children, Events};
//! use elemental_dom::Document;
//!
//! let mut doc = Document::new();
//! let item = build(&mut doc, "li", children!["one"])?;
//! let list = build(
//!     &mut doc,
//!     "ul",
//!     (attrs! { "class" => "menu" }, children![item], Events::new().on("click", |_, _| {})),
//! )?;
//! ```

pub mod args;
pub mod attrs;
pub mod bind;
pub mod builder;
pub mod error;
pub mod normalize;
pub mod render;
pub mod tags;

pub use args::{Arg, Child, Children, IntoArgs};
pub use attrs::{AttrValue, Attributes};
pub use bind::{AfterHook, Binding, Events, SubEvent, AFTER, SUB_EVENTS};
pub use builder::{build, Builder, BuilderConfig, Built};
pub use error::{BuildError, Result};
pub use normalize::{normalize, Normalized, Resolved};
pub use tags::{Tag, Tags};

/// Build an [`Attributes`] map: `attrs! { "id" => "main", "tabindex" => 0 }`
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attributes::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::Attributes::new();
        $( attrs.insert($name, $value); )+
        attrs
    }};
}

/// Build a [`Children`] sequence from anything convertible to [`Child`]
#[macro_export]
macro_rules! children {
    ($($item:expr),* $(,)?) => {
        $crate::Children::List(vec![$($crate::Child::from($item)),*])
    };
}

/// Build a nested [`Child::List`]
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::Child::List(vec![$($crate::Child::from($item)),*])
    };
}
