//! Domain object mapping onto typed field containers
//!
//! This crate provides:
//! - StorableIdentity: class name, id, timestamp and consistency of one object
//! - Storable / Revivable: the store/revive lifecycle with overridable field hooks
//! - fields: generic flatten/unflatten helpers for plain and nested fields,
//!   single-valued or in lists, sets and maps

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fields;
pub mod identity;
pub mod storable;

pub use fields::{FieldMapping, Nested, Plain};
pub use identity::StorableIdentity;
pub use storable::{
    create_and_revive, instantiate, instantiate_all, ConstructHint, Revivable, Storable,
};
