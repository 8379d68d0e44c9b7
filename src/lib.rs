//! Objectstore - typed object mapping over a schema-on-write key/value store
//!
//! Domain objects declare their fields once, store themselves as rows of a
//! class-named object table and revive from retrieved rows. Every row carries
//! a store-assigned id and last-modified timestamp; reads and writes take an
//! optional consistency level.
//!
//! # Quick Start
//!
//! ```ignore
//! use objectstore::{MemoryObjectStore, ObjectStore, Where};
//!
//! let store = MemoryObjectStore::new();
//! person.create_object_table(&store, true)?;
//! let id = person.store_to(&store)?;
//!
//! let mut query = person.create_query(&store)?;
//! query.set_where(Where::equal("name", "Ada")?).set_allow_filtering(true);
//! let found = person.revive_query(&mut query)?;
//! ```
//!
//! # Architecture
//!
//! - `objectstore-core`: values, schema metadata, names and errors
//! - `objectstore-engine`: field containers, queries and the `ObjectStore` trait
//! - `objectstore-storage`: the in-memory backend and its configuration
//! - `objectstore-mapping`: the `Storable` lifecycle and field helpers

pub use objectstore_core::*;
pub use objectstore_engine::*;
pub use objectstore_mapping::*;
pub use objectstore_storage::*;
