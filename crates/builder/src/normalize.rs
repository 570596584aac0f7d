//! Argument normalizer
//!
//! Resolves the overloaded `(a?, b?, c?)` call shape into an explicit
//! `(attributes, children, events)` triple by inspecting `a` once:
//!
//! ```text
//! a is a sequence (or bare text) → children = a, events = b, no attributes
//! otherwise                      → attributes = a, children = b, events = c
//! ```
//!
//! Bare-text children without non-empty attributes short-circuit: the text
//! is handed back and no node gets built.

use crate::args::{Arg, Children};
use crate::attrs::Attributes;
use crate::bind::Events;
use crate::error::{BuildError, Result};

/// Explicit form of a call's arguments
#[derive(Debug, Default)]
pub struct Resolved {
    /// `None` when the first argument was children
    pub attributes: Option<Attributes>,
    pub children: Children,
    pub events: Events,
}

/// Outcome of normalization
#[derive(Debug)]
pub enum Normalized {
    /// Text shorthand: return this, build nothing
    Text(String),
    Build(Resolved),
}

/// Classify up to three positional arguments.
///
/// Missing arguments take their defaults: empty attributes, empty children,
/// empty events.
pub fn normalize(a: Option<Arg>, b: Option<Arg>, c: Option<Arg>) -> Result<Normalized> {
    let first = a.unwrap_or_else(|| Arg::Attrs(Attributes::new()));

    let (attributes, children, events) = match first {
        Arg::Children(children) => {
            if let Some(extra) = &c {
                tracing::trace!(
                    "Ignoring third argument ({}) of a children-first call",
                    extra.kind()
                );
            }
            (None, children, events_slot(b, 2)?)
        }
        Arg::Attrs(attrs) => (Some(attrs), children_slot(b, 2)?, events_slot(c, 3)?),
        // `{}` is `{}`: an empty events map reads as empty attributes
        Arg::Events(events) if events.is_empty() => {
            (Some(Attributes::new()), children_slot(b, 2)?, events_slot(c, 3)?)
        }
        Arg::Events(_) => {
            return Err(BuildError::ArgumentShape {
                position: 1,
                expected: "attributes or children",
                actual: "events",
            })
        }
    };

    let has_attributes = attributes.as_ref().is_some_and(|attrs| !attrs.is_empty());
    match children {
        Children::Text(text) if !has_attributes => Ok(Normalized::Text(text)),
        children => Ok(Normalized::Build(Resolved {
            attributes,
            children,
            events,
        })),
    }
}

fn children_slot(arg: Option<Arg>, position: usize) -> Result<Children> {
    match arg {
        None => Ok(Children::default()),
        Some(Arg::Children(children)) => Ok(children),
        Some(other) => Err(BuildError::ArgumentShape {
            position,
            expected: "children",
            actual: other.kind(),
        }),
    }
}

/// Events position; empty maps and empty sequences read as "no events"
fn events_slot(arg: Option<Arg>, position: usize) -> Result<Events> {
    match arg {
        None => Ok(Events::new()),
        Some(Arg::Events(events)) => Ok(events),
        Some(Arg::Attrs(attrs)) if attrs.is_empty() => Ok(Events::new()),
        Some(Arg::Children(children)) if children.is_empty() => Ok(Events::new()),
        Some(other) => Err(BuildError::ArgumentShape {
            position,
            expected: "events",
            actual: other.kind(),
        }),
    }
}
