//! Core types for the object store mapping layer
//!
//! This crate defines the foundational types used throughout the system:
//! - PrimitiveType / Primitive: the twelve storable primitive kinds and their payloads
//! - CollectionValue: validated maps, lists and sets of primitives
//! - FieldType / Value: declared types and tagged values (including typed nulls)
//! - FieldMetadata / StoreObjectMetadata: per-class schema snapshots
//! - ConsistencyLevel: tunable replica acknowledgement levels
//! - ObjectStoreItem: named values exchanged with the backing store
//! - Identifier rules for class and field names
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod consistency;
pub mod error;
pub mod item;
pub mod names;
pub mod schema;
pub mod value;

pub use collection::{CollectionKind, CollectionValue};
pub use consistency::ConsistencyLevel;
pub use error::{Error, ErrorKind, Result};
pub use item::ObjectStoreItem;
pub use names::{
    is_reserved_field, validate_identifier, validate_name, IdentifierError, ID_FIELD,
    LAST_MODIFIED_FIELD, MAX_IDENTIFIER_LENGTH,
};
pub use schema::{FieldMetadata, StoreObjectMetadata};
pub use value::{FieldType, Primitive, PrimitiveField, PrimitiveType, Value};

// Payload types re-exported so callers need not depend on them directly
pub use bigdecimal::BigDecimal;
pub use chrono::{DateTime, Utc};
pub use num_bigint::BigInt;
pub use uuid::Uuid;
