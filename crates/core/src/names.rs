//! Identifier rules for class and field names
//!
//! Class (object table) names and field names are identifiers in the
//! backing store's query language:
//! - Length: 1-48 characters
//! - Characters: `[a-zA-Z0-9_]`
//!
//! Enforcing these is the backing store's job; the rules live here so that
//! every store implementation validates the same way.

use crate::error::{Error, Result};
use std::fmt;

/// Maximum length of a class or field name
pub const MAX_IDENTIFIER_LENGTH: usize = 48;

/// Reserved primary key field present in every object table
pub const ID_FIELD: &str = "id";

/// Reserved last-modified field present in every object table
pub const LAST_MODIFIED_FIELD: &str = "lastModifiedAt";

/// Error when validating an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Identifier is empty
    Empty,
    /// Identifier exceeds maximum length
    TooLong {
        /// Actual length of the identifier
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Identifier contains invalid character
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierError::Empty => write!(f, "identifier cannot be empty"),
            IdentifierError::TooLong { length, max } => {
                write!(f, "identifier too long: {} chars (max {})", length, max)
            }
            IdentifierError::InvalidChar { char, position } => write!(
                f,
                "invalid character '{}' at position {} (only alphanumeric and underscore allowed)",
                char, position
            ),
        }
    }
}

impl std::error::Error for IdentifierError {}

/// Validate an identifier against `[a-zA-Z0-9_]{1,48}`
pub fn validate_identifier(name: &str) -> std::result::Result<(), IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let length = name.chars().count();
    if length > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong {
            length,
            max: MAX_IDENTIFIER_LENGTH,
        });
    }

    for (position, c) in name.chars().enumerate() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(IdentifierError::InvalidChar { char: c, position });
        }
    }

    Ok(())
}

/// Validate a named identifier, mapping failures to argument errors
///
/// `what` names the role of the identifier in the message, e.g.
/// `"className"` or `"fieldName"`.
pub fn validate_name(what: &str, name: &str) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::invalid_argument(format!("{} '{}': {}", what, name, e)))
}

/// Check if a field name is one of the reserved identity fields
pub fn is_reserved_field(name: &str) -> bool {
    name == ID_FIELD || name == LAST_MODIFIED_FIELD
}
