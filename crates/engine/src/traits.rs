//! The backing store contract
//!
//! This module defines the `ObjectStore` trait: the narrow interface through
//! which field containers and queries reach the external, multi-replica
//! key/value store. Schema management, object lifecycle and querying all go
//! through it. Nothing in this crate performs I/O on its own.
//!
//! Thread safety: All methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync). Calls may block; the mapping
//! layer treats each as a synchronous, potentially failing operation.
//!
//! ## Names
//!
//! Class and field names must match `[a-zA-Z0-9_]*` and be at most 48
//! characters long (see `objectstore_core::names`). Implementations are
//! expected to reject anything else with an argument error.

use crate::object::StoreObject;
use crate::query::StoreObjectQuery;
use crate::result::StoreResult;
use chrono::{DateTime, Utc};
use objectstore_core::{
    CollectionKind, ConsistencyLevel, ObjectStoreItem, PrimitiveType, Result, StoreObjectMetadata,
};
use uuid::Uuid;

/// Flattened snapshot of a field container handed to [`ObjectStore::submit`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRequest {
    /// Class (object table) name
    pub class_name: String,
    /// Identifier; `None` asks the store to assign one
    pub id: Option<Uuid>,
    /// Last-modified timestamp known to the caller
    pub last_modified: Option<DateTime<Utc>>,
    /// Write consistency; `None` means the store default
    pub consistency: Option<ConsistencyLevel>,
    /// Field values to write; typed nulls clear the column
    pub items: Vec<ObjectStoreItem>,
    /// Guard items; `Some` makes the write conditional on absence of the row
    pub if_not_exists: Option<Vec<ObjectStoreItem>>,
}

impl StoreRequest {
    /// Check if the write is conditional
    pub fn is_conditional(&self) -> bool {
        self.if_not_exists.is_some()
    }
}

/// External object store: schema catalog, record lifecycle, querying
///
/// Every `if_not_exists` / `if_exists` flag controls idempotency: with the
/// flag set, the presence (or absence) of the target makes the call a no-op;
/// without it, the call fails with a store error.
pub trait ObjectStore: Send + Sync {
    /// Create an object table with the identity columns `id` and
    /// `lastModifiedAt`
    ///
    /// # Errors
    ///
    /// Fails if the table exists and `if_not_exists` is false.
    fn create_object_table(
        &self,
        class_name: &str,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata>;

    /// Drop an object table and every record in it
    ///
    /// Returns the schema of the dropped table, or `None` if it did not exist
    /// and `if_exists` was set.
    ///
    /// # Errors
    ///
    /// Fails if the table does not exist and `if_exists` is false.
    fn drop_object_table(
        &self,
        class_name: &str,
        if_exists: bool,
    ) -> Result<Option<StoreObjectMetadata>>;

    /// Add a primitive field to an existing object table
    ///
    /// # Errors
    ///
    /// Fails if the table is missing, or the field exists and
    /// `if_not_exists` is false.
    fn add_primitive_field(
        &self,
        class_name: &str,
        field_name: &str,
        field_type: PrimitiveType,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata>;

    /// Add a map, list or set field to an existing object table
    ///
    /// `second` is the map value kind and must be `None` for lists and sets.
    ///
    /// # Errors
    ///
    /// Fails if the table is missing, the element types do not fit the
    /// collection kind, or the field exists and `if_not_exists` is false.
    fn add_collection_field(
        &self,
        class_name: &str,
        field_name: &str,
        kind: CollectionKind,
        first: PrimitiveType,
        second: Option<PrimitiveType>,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata>;

    /// Drop a field and its data from every record of the table
    ///
    /// # Errors
    ///
    /// Fails if the table or field does not exist.
    fn drop_field(&self, class_name: &str, field_name: &str) -> Result<StoreObjectMetadata>;

    /// Change the type of an existing primitive field to another primitive
    ///
    /// # Errors
    ///
    /// Fails if the table or field does not exist, or the field is a
    /// collection.
    fn change_field_type(
        &self,
        class_name: &str,
        field_name: &str,
        new_type: PrimitiveType,
    ) -> Result<StoreObjectMetadata>;

    /// Current schema snapshot of an object table
    fn metadata(&self, class_name: &str) -> Result<StoreObjectMetadata>;

    /// Create an empty field container bound to the table's current schema
    fn create_store_object(&self, class_name: &str, id: Option<Uuid>) -> Result<StoreObject>;

    /// Delete one record; deleting a missing record is not an error
    fn delete(&self, class_name: &str, id: Uuid, level: Option<ConsistencyLevel>) -> Result<()>;

    /// Create a query over an object table, optionally scoped to one id
    fn create_query(&self, class_name: &str, id: Option<Uuid>) -> Result<StoreObjectQuery>;

    /// List record identifiers of an object table
    fn retrieve_ids(
        &self,
        class_name: &str,
        limit: Option<usize>,
        level: Option<ConsistencyLevel>,
    ) -> Result<Vec<Uuid>>;

    /// Persist a flattened field container
    ///
    /// On success the result carries the `id` and `lastModifiedAt` items the
    /// store assigned. A rejected conditional write is reported as a failed
    /// result carrying the conflicting items, not as an error.
    fn submit(&self, request: StoreRequest) -> Result<StoreResult>;

    /// Run a query, returning one hydrated field container per matching row
    fn execute(&self, query: &StoreObjectQuery) -> Result<Vec<StoreObject>>;
}
