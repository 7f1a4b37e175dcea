//! Engine errors.

use graft_path::PatternError;
use thiserror::Error;

/// Errors surfaced by traversal and cloning.
///
/// All variants are immediately fatal to the current call: no retries, no
/// partial results. The soft "property is absent here" outcome is not an
/// error; collaborators signal it by resolving to `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The type of a node to clone cannot be default-constructed.
    #[error("type `{0}` cannot be instantiated")]
    Instantiation(String),

    /// A property read or write failed: the property is not declared for the
    /// node's type, or the node is an opaque value.
    #[error("type `{type_name}` has no property `{property}`")]
    PropertyAccess { type_name: String, property: String },

    /// A relation's stored value contradicts its declared shape.
    #[error("relation `{type_name}.{property}` holds an unsupported shape")]
    UnsupportedShape { type_name: String, property: String },

    /// A map-entry pseudo-node was asked for a property other than `key` or
    /// `value`.
    #[error("map entry does not have property `{0}`")]
    EntryProperty(String),
}

impl EngineError {
    pub(crate) fn property_access(type_name: &str, property: &str) -> Self {
        EngineError::PropertyAccess {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn unsupported_shape(type_name: &str, property: &str) -> Self {
        EngineError::UnsupportedShape {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }
}
