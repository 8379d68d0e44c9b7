//! Error types for the object store mapping layer
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors fall into five kinds (see [`ErrorKind`]):
//! - **Argument**: invalid names, identifiers or configuration, raised locally
//! - **Type**: declared-vs-actual type mismatches in values, elements or puts
//! - **Schema**: a field or class that is not part of the bound schema
//! - **State**: an operation on a field container that was already submitted
//! - **Store**: anything surfaced by the backing store, passed through unchanged

use crate::item::ObjectStoreItem;
use crate::value::FieldType;
use thiserror::Error;

/// Result type alias for object store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by store errors
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for the object store mapping layer
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid argument (name, identifier, parameter combination)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value does not match its declared type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Runtime type of the payload
        actual: String,
    },

    /// A field name already holds a value of another type
    #[error("Field '{field}' already holds a {existing} value, cannot store {attempted}")]
    TypeAlreadyBound {
        /// Field name
        field: String,
        /// Type pinned by the first write
        existing: FieldType,
        /// Type of the rejected write
        attempted: FieldType,
    },

    /// Field is not declared in the schema of the class
    #[error("Field '{field}' not found in schema of class '{class_name}'")]
    FieldNotFound {
        /// Class (object table) name
        class_name: String,
        /// Field name
        field: String,
    },

    /// Field is declared, but with a different shape (e.g. list vs map)
    #[error("Field '{field}' is declared as {declared}, not {requested}")]
    FieldKindMismatch {
        /// Field name
        field: String,
        /// Type declared in the schema
        declared: FieldType,
        /// Type the caller tried to use
        requested: FieldType,
    },

    /// Operation is not valid in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A revivable type could not be constructed
    #[error("Could not create instance of type {type_name}")]
    Instantiation {
        /// Rust type name of the revivable type
        type_name: &'static str,
    },

    /// Conditional ("if not exists") write was rejected by the store
    #[error("Conditional write rejected for class '{class_name}' ({} conflicting items)", items.len())]
    Conflict {
        /// Class (object table) name
        class_name: String,
        /// Conflicting items reported by the store
        items: Vec<ObjectStoreItem>,
    },

    /// Failure surfaced by the backing store
    #[error("Store error: {message}")]
    Store {
        /// Description of the failure
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<BoxedCause>,
    },

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid argument or configuration
    Argument,
    /// Declared-vs-actual type mismatch
    Type,
    /// Field or class absent from the bound schema
    Schema,
    /// Operation invalid in the current lifecycle state
    State,
    /// Failure reported by the backing store
    Store,
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create an opaque store error without a cause
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create an opaque store error wrapping a cause
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a type mismatch error from anything displayable
    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) | Error::Config(_) | Error::Instantiation { .. } => {
                ErrorKind::Argument
            }
            Error::TypeMismatch { .. } | Error::TypeAlreadyBound { .. } => ErrorKind::Type,
            Error::FieldNotFound { .. } | Error::FieldKindMismatch { .. } => ErrorKind::Schema,
            Error::InvalidState(_) => ErrorKind::State,
            Error::Conflict { .. } | Error::Store { .. } => ErrorKind::Store,
        }
    }
}
