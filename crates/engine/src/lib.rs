//! Field containers, queries and the backing store contract
//!
//! This crate provides:
//! - ObjectStore: the trait a backing store implements (schema, lifecycle, querying)
//! - StoreObject: the schema-validated field container for one record
//! - StoreResult: outcome of submitting a field container
//! - StoreObjectQuery / Where / Relation: flat conjunctive query builder
//!
//! No I/O happens here. `StoreObject::store` and `StoreObjectQuery::execute`
//! delegate to the bound `ObjectStore`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod object;
pub mod query;
pub mod result;
pub mod traits;

#[cfg(test)]
mod testing;

pub use object::{ObjectState, StoreObject};
pub use query::{Relation, RelationOp, StoreObjectQuery, Where};
pub use result::StoreResult;
pub use traits::{ObjectStore, StoreRequest};
