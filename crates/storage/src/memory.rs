//! In-memory object store
//!
//! `MemoryObjectStore` implements the full [`ObjectStore`] contract over
//! process memory. It serves as the reference backend for tests and as an
//! embeddable store for single-process use.
//!
//! # Design
//!
//! - DashMap keyed by class name: a table operation locks only its shard
//! - Rows in a BTreeMap keyed by id, so id listings are deterministic
//! - Clones share state; field containers and queries hold a clone
//!
//! Consistency levels are accepted and logged but have no effect: there is
//! only one replica.

use crate::config::StoreConfig;
use crate::table::ObjectTable;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use objectstore_core::{
    is_reserved_field, validate_name, CollectionKind, ConsistencyLevel, Error, FieldMetadata,
    FieldType, PrimitiveType, Result, StoreObjectMetadata,
};
use objectstore_engine::{ObjectStore, StoreObject, StoreObjectQuery, StoreRequest, StoreResult};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct Shared {
    tables: DashMap<String, ObjectTable>,
    config: StoreConfig,
    read_consistency: ConsistencyLevel,
    write_consistency: ConsistencyLevel,
    injected_failure: Mutex<Option<String>>,
}

/// Object store backed by process memory
#[derive(Clone)]
pub struct MemoryObjectStore {
    shared: Arc<Shared>,
}

impl MemoryObjectStore {
    /// Create an empty store with the default configuration
    pub fn new() -> Self {
        let config = StoreConfig::default();
        Self::build(config, ConsistencyLevel::One, ConsistencyLevel::One)
    }

    /// Create an empty store with the given configuration
    ///
    /// # Errors
    ///
    /// Returns a config error if the configuration does not validate.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let read = config.read_consistency()?;
        let write = config.write_consistency()?;
        Ok(Self::build(config, read, write))
    }

    fn build(config: StoreConfig, read: ConsistencyLevel, write: ConsistencyLevel) -> Self {
        MemoryObjectStore {
            shared: Arc::new(Shared {
                tables: DashMap::new(),
                config,
                read_consistency: read,
                write_consistency: write,
                injected_failure: Mutex::new(None),
            }),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Make the next data operation fail with a store error
    ///
    /// Applies to `submit`, `execute`, `delete` and `retrieve_ids`. The
    /// failure is consumed by the first call that sees it.
    pub fn inject_failure(&self, message: impl Into<String>) {
        *self.shared.injected_failure.lock() = Some(message.into());
    }

    /// Names of all object tables, sorted
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shared.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of rows stored for a class, 0 if the table does not exist
    pub fn row_count(&self, class_name: &str) -> usize {
        self.shared
            .tables
            .get(class_name)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    fn handle(&self) -> Arc<dyn ObjectStore> {
        Arc::new(self.clone())
    }

    fn take_failure(&self, operation: &str) -> Result<()> {
        match self.shared.injected_failure.lock().take() {
            Some(message) => {
                warn!(target: "objectstore::memory", operation, %message, "Injected failure");
                Err(Error::store(message))
            }
            None => Ok(()),
        }
    }

    fn missing_table(class_name: &str) -> Error {
        Error::store(format!("object table '{}' does not exist", class_name))
    }

    /// Run `f` against a table under its shard lock
    fn with_table_mut<T>(
        &self,
        class_name: &str,
        f: impl FnOnce(&mut ObjectTable) -> Result<T>,
    ) -> Result<T> {
        validate_name("class", class_name)?;
        let mut table = self
            .shared
            .tables
            .get_mut(class_name)
            .ok_or_else(|| Self::missing_table(class_name))?;
        f(table.value_mut())
    }

    fn add_field(
        &self,
        class_name: &str,
        field: FieldMetadata,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        validate_name("field", field.name())?;
        self.with_table_mut(class_name, |table| {
            if table.metadata.has_field(field.name()) {
                if if_not_exists {
                    return Ok(table.metadata.clone());
                }
                return Err(Error::store(format!(
                    "field '{}' already exists in object table '{}'",
                    field.name(),
                    class_name
                )));
            }
            info!(
                target: "objectstore::memory",
                class = class_name,
                field = field.name(),
                field_type = %field.field_type(),
                "Added field"
            );
            table.metadata.add_field(field);
            Ok(table.metadata.clone())
        })
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryObjectStore")
            .field("tables", &self.class_names())
            .field("config", &self.shared.config)
            .finish()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn create_object_table(
        &self,
        class_name: &str,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        validate_name("class", class_name)?;
        match self.shared.tables.entry(class_name.to_string()) {
            Entry::Occupied(existing) => {
                if if_not_exists {
                    Ok(existing.get().metadata.clone())
                } else {
                    Err(Error::store(format!(
                        "object table '{}' already exists",
                        class_name
                    )))
                }
            }
            Entry::Vacant(slot) => {
                let table = ObjectTable::new(class_name);
                let metadata = table.metadata.clone();
                slot.insert(table);
                info!(target: "objectstore::memory", class = class_name, "Created object table");
                Ok(metadata)
            }
        }
    }

    fn drop_object_table(
        &self,
        class_name: &str,
        if_exists: bool,
    ) -> Result<Option<StoreObjectMetadata>> {
        validate_name("class", class_name)?;
        match self.shared.tables.remove(class_name) {
            Some((_, table)) => {
                info!(
                    target: "objectstore::memory",
                    class = class_name,
                    rows = table.rows.len(),
                    "Dropped object table"
                );
                Ok(Some(table.metadata))
            }
            None if if_exists => Ok(None),
            None => Err(Self::missing_table(class_name)),
        }
    }

    fn add_primitive_field(
        &self,
        class_name: &str,
        field_name: &str,
        field_type: PrimitiveType,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        self.add_field(
            class_name,
            FieldMetadata::new(field_name, field_type),
            if_not_exists,
        )
    }

    fn add_collection_field(
        &self,
        class_name: &str,
        field_name: &str,
        kind: CollectionKind,
        first: PrimitiveType,
        second: Option<PrimitiveType>,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        let field_type = FieldType::collection(kind, first, second)?;
        self.add_field(
            class_name,
            FieldMetadata::new(field_name, field_type),
            if_not_exists,
        )
    }

    fn drop_field(&self, class_name: &str, field_name: &str) -> Result<StoreObjectMetadata> {
        validate_name("field", field_name)?;
        if is_reserved_field(field_name) {
            return Err(Error::invalid_argument(format!(
                "identity field '{}' cannot be dropped",
                field_name
            )));
        }
        self.with_table_mut(class_name, |table| {
            if table.metadata.remove_field(field_name).is_none() {
                return Err(Error::store(format!(
                    "field '{}' does not exist in object table '{}'",
                    field_name, class_name
                )));
            }
            table.clear_column(field_name);
            info!(target: "objectstore::memory", class = class_name, field = field_name, "Dropped field");
            Ok(table.metadata.clone())
        })
    }

    fn change_field_type(
        &self,
        class_name: &str,
        field_name: &str,
        new_type: PrimitiveType,
    ) -> Result<StoreObjectMetadata> {
        validate_name("field", field_name)?;
        if is_reserved_field(field_name) {
            return Err(Error::invalid_argument(format!(
                "identity field '{}' cannot change type",
                field_name
            )));
        }
        self.with_table_mut(class_name, |table| {
            let current = table
                .metadata
                .field(field_name)
                .map(|f| f.field_type())
                .ok_or_else(|| {
                    Error::store(format!(
                        "field '{}' does not exist in object table '{}'",
                        field_name, class_name
                    ))
                })?;
            if current.is_collection() {
                return Err(Error::invalid_argument(format!(
                    "field '{}' is a {} and cannot change to a primitive type",
                    field_name, current
                )));
            }
            table
                .metadata
                .change_field_type(field_name, FieldType::Primitive(new_type));
            let dropped = table.retain_column_type(field_name);
            info!(
                target: "objectstore::memory",
                class = class_name,
                field = field_name,
                from = %current,
                to = %new_type,
                dropped,
                "Changed field type"
            );
            Ok(table.metadata.clone())
        })
    }

    fn metadata(&self, class_name: &str) -> Result<StoreObjectMetadata> {
        validate_name("class", class_name)?;
        self.shared
            .tables
            .get(class_name)
            .map(|t| t.metadata.clone())
            .ok_or_else(|| Self::missing_table(class_name))
    }

    fn create_store_object(&self, class_name: &str, id: Option<Uuid>) -> Result<StoreObject> {
        let metadata = self.metadata(class_name)?;
        Ok(StoreObject::new(self.handle(), metadata, id))
    }

    fn delete(&self, class_name: &str, id: Uuid, level: Option<ConsistencyLevel>) -> Result<()> {
        self.take_failure("delete")?;
        let level = level.unwrap_or(self.shared.write_consistency);
        self.with_table_mut(class_name, |table| {
            let removed = table.rows.remove(&id).is_some();
            debug!(
                target: "objectstore::memory",
                class = class_name,
                %id,
                %level,
                removed,
                "Deleted row"
            );
            Ok(())
        })
    }

    fn create_query(&self, class_name: &str, id: Option<Uuid>) -> Result<StoreObjectQuery> {
        let metadata = self.metadata(class_name)?;
        Ok(StoreObjectQuery::new(self.handle(), metadata, id))
    }

    fn retrieve_ids(
        &self,
        class_name: &str,
        limit: Option<usize>,
        level: Option<ConsistencyLevel>,
    ) -> Result<Vec<Uuid>> {
        self.take_failure("retrieve_ids")?;
        validate_name("class", class_name)?;
        let level = level.unwrap_or(self.shared.read_consistency);
        let limit = limit.or(self.shared.config.default_query_limit);
        let table = self
            .shared
            .tables
            .get(class_name)
            .ok_or_else(|| Self::missing_table(class_name))?;
        let ids: Vec<Uuid> = table
            .rows
            .keys()
            .copied()
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        debug!(target: "objectstore::memory", class = class_name, %level, count = ids.len(), "Retrieved ids");
        Ok(ids)
    }

    fn submit(&self, request: StoreRequest) -> Result<StoreResult> {
        self.take_failure("submit")?;
        let level = request.consistency.unwrap_or(self.shared.write_consistency);
        let conditional = request.is_conditional();
        let class_name = request.class_name;
        self.with_table_mut(&class_name, |table| {
            table.check_items(&request.items)?;

            if conditional {
                if let Some(existing) = request.id.and_then(|id| table.rows.get(&id).map(|r| (id, r))) {
                    let (id, row) = existing;
                    debug!(
                        target: "objectstore::memory",
                        class = %class_name,
                        %id,
                        "Row exists, conditional write not applied"
                    );
                    return Ok(StoreResult::failure(row.identity_items(id)?));
                }
            }

            let id = request.id.unwrap_or_else(Uuid::new_v4);
            let row = table.upsert(id, Utc::now(), request.items);
            debug!(
                target: "objectstore::memory",
                class = %class_name,
                %id,
                %level,
                columns = row.values.len(),
                "Stored row"
            );
            Ok(StoreResult::success(row.identity_items(id)?))
        })
    }

    fn execute(&self, query: &StoreObjectQuery) -> Result<Vec<StoreObject>> {
        self.take_failure("execute")?;
        let class_name = query.class_name();
        validate_name("class", class_name)?;
        let level = query.consistency().unwrap_or(self.shared.read_consistency);
        let limit = query
            .limit()
            .or(self.shared.config.default_query_limit)
            .unwrap_or(usize::MAX);
        let relations = query.filter().map(|w| w.relations()).unwrap_or(&[]);

        let (metadata, rows) = {
            let table = self
                .shared
                .tables
                .get(class_name)
                .ok_or_else(|| Self::missing_table(class_name))?;

            for relation in relations {
                let name = relation.identifier();
                if !table.metadata.has_field(name) {
                    return Err(Error::FieldNotFound {
                        class_name: class_name.to_string(),
                        field: name.to_string(),
                    });
                }
                if !table.metadata.is_primary_key(name)
                    && self.shared.config.require_allow_filtering
                    && !query.allow_filtering()
                {
                    return Err(Error::invalid_argument(format!(
                        "relation on non-key field '{}' requires allow_filtering",
                        name
                    )));
                }
            }

            let rows = table
                .rows
                .iter()
                .filter(|(id, _)| query.id().map_or(true, |wanted| wanted == **id))
                .filter(|(id, row)| row.matches(**id, relations))
                .take(limit)
                .map(|(id, row)| row.items(*id))
                .collect::<Result<Vec<_>>>()?;
            (table.metadata.clone(), rows)
        };

        debug!(
            target: "objectstore::memory",
            class = class_name,
            %level,
            relations = relations.len(),
            rows = rows.len(),
            "Executed query"
        );

        let handle = self.handle();
        rows.into_iter()
            .map(|items| {
                let object = StoreObject::new(Arc::clone(&handle), metadata.clone(), None);
                object.hydrate(items)?;
                object.set_consistency(query.consistency())?;
                Ok(object)
            })
            .collect()
    }
}
