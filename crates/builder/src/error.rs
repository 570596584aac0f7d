//! Error types for element building
//!
//! Failures from the document (bad tag names, bad selectors, hierarchy
//! violations) pass through unchanged; the builder only adds the shape
//! errors its own argument handling can detect.

use elemental_dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("Child {index}[{nested}] is a list nested two levels deep, not a node")]
    NotANode { index: usize, nested: usize },

    #[error("Argument {position} has the wrong shape: expected {expected}, got {actual}")]
    ArgumentShape {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Event key '{key}' expects {expected}, got {actual}")]
    BindingMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid builder config: {0}")]
    Config(#[from] serde_json::Error),
}
