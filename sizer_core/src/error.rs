//! Error types for sizer_core.

use thiserror::Error;

/// Result type alias using sizer_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while sizing objects.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error on one of the store channels.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Object not found in store.
    #[error("Object not found: {oid}")]
    ObjectNotFound { oid: String },

    /// Object exists but has the wrong type for the requested operation.
    #[error("Object {oid} is a {got}, not a {expected}")]
    TypeMismatch {
        oid: String,
        expected: String,
        got: String,
    },

    /// Object has a type that cannot be sized (commits and tags).
    #[error("Object {oid} has unexpected type '{object_type}'")]
    UnexpectedType { oid: String, object_type: String },

    /// Invalid object ID format or encoding.
    #[error("Invalid object ID: {reason}")]
    InvalidOid { reason: String },

    /// Malformed tree payload.
    #[error("Invalid tree entry: {reason}")]
    InvalidTreeEntry { reason: String },

    /// The store process sent a response we could not make sense of.
    #[error("Protocol error: {reason}")]
    Protocol { reason: String },
}

impl Error {
    /// Create an ObjectNotFound error.
    pub fn object_not_found(oid: impl ToString) -> Self {
        Error::ObjectNotFound {
            oid: oid.to_string(),
        }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(
        oid: impl ToString,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            oid: oid.to_string(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create an UnexpectedType error.
    pub fn unexpected_type(oid: impl ToString, object_type: impl Into<String>) -> Self {
        Error::UnexpectedType {
            oid: oid.to_string(),
            object_type: object_type.into(),
        }
    }

    /// Create an InvalidOid error.
    pub fn invalid_oid(reason: impl Into<String>) -> Self {
        Error::InvalidOid {
            reason: reason.into(),
        }
    }

    /// Create an InvalidTreeEntry error.
    pub fn invalid_tree_entry(reason: impl Into<String>) -> Self {
        Error::InvalidTreeEntry {
            reason: reason.into(),
        }
    }

    /// Create a Protocol error.
    pub fn protocol(reason: impl Into<String>) -> Self {
        Error::Protocol {
            reason: reason.into(),
        }
    }

    /// Returns true if this error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound { .. })
    }
}
