//! Storage backends for the object store mapping layer
//!
//! This crate provides:
//! - MemoryObjectStore: in-memory `ObjectStore` with schema catalog,
//!   conditional writes and relation evaluation
//! - StoreConfig: `objectstore.toml` defaults for consistency, limits and
//!   filtering policy
//!
//! # Concurrency
//!
//! Tables are sharded by class name in a DashMap. Operations on one class are
//! serialized by its shard lock.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod memory;
mod table;

pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use memory::MemoryObjectStore;
