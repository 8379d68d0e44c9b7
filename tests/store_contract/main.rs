//! Store Contract Tests
//!
//! Exercises the `ObjectStore` contract through `MemoryObjectStore` without
//! the mapping layer:
//! - containers: type pinning, defaults and the single-submit lifecycle
//! - queries: relations, membership, limits and filtering policy
//! - schema: table and field evolution
//! - config: `objectstore.toml` loading

#[path = "../common/mod.rs"]
mod common;

mod config;
mod containers;
mod queries;
mod schema;
