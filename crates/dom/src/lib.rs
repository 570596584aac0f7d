//! In-memory DOM substrate
//!
//! A small, synchronous document model: arena-allocated nodes, trusted
//! markup fragments, CSS selector queries and listener dispatch. It is the
//! "host document" element-building code runs against.
//!
//! ## Core Design
//!
//! ```text
//! Document ─┬─ DomArena (Vec<DomNode>, NodeId = u32)
//!           └─ ListenerRegistry (NodeId → [(type, Rc<dyn Fn>)])
//!
//! markup  : &str      → DocumentFragment
//! selector: &str      → Selector → matches(NodeId)
//! serializer: NodeId  → String
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod events;
pub mod markup;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::Document;
pub use error::{DomError, Result};
pub use events::{listener, Event, EventPhase, Listener};
pub use selector::Selector;
pub use serializer::{HtmlSerializer, SerializerConfig};
pub use types::*;
