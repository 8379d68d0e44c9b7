//! Schema-validated field container
//!
//! A `StoreObject` holds the named field values of one in-flight record. It is
//! bound to exactly one schema snapshot and one backing store, populated by
//! typed puts (or by raw hydration of a retrieved row), and consumed once by
//! [`StoreObject::store`].
//!
//! ## Type pinning
//!
//! All fields live in a single name-keyed map of tagged [`Value`]s. The first
//! write under a name pins its [`FieldType`]; any later write of a different
//! type under the same name fails with [`Error::TypeAlreadyBound`]. This holds
//! on the raw path too, which otherwise skips schema validation.
//!
//! ## Defaults
//!
//! Numeric and boolean getters return the zero value of their kind for a field
//! that was never written, exactly like a field explicitly set to zero. Use
//! [`StoreObject::get`] or [`StoreObject::contains`] to tell the two apart.
//!
//! ## Locking
//!
//! Every operation takes the container's mutex for its whole duration. The
//! lock is released before `store()` calls into the backing store.

use crate::result::StoreResult;
use crate::traits::{ObjectStore, StoreRequest};
use chrono::{DateTime, Utc};
use objectstore_core::{
    is_reserved_field, BigDecimal, BigInt, CollectionKind, CollectionValue, ConsistencyLevel,
    Error, FieldType, ObjectStoreItem, Primitive, PrimitiveField, PrimitiveType, Result,
    StoreObjectMetadata, Value, ID_FIELD, LAST_MODIFIED_FIELD,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Lifecycle of a field container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectState {
    /// Schema attached, no field set
    Unbound,
    /// One or more fields set
    Populated,
    /// `store()` in flight
    Submitted,
    /// Result applied or error surfaced
    Terminal,
}

impl ObjectState {
    /// Check if the container still accepts writes
    pub fn is_writable(&self) -> bool {
        matches!(self, ObjectState::Unbound | ObjectState::Populated)
    }
}

struct Inner {
    id: Option<Uuid>,
    last_modified: Option<DateTime<Utc>>,
    consistency: Option<ConsistencyLevel>,
    fields: BTreeMap<String, Value>,
    if_not_exists_items: Option<Vec<ObjectStoreItem>>,
    state: ObjectState,
}

impl Inner {
    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.state.is_writable() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "cannot {} after store() was invoked",
                operation
            )))
        }
    }

    /// Insert a value, enforcing the type pinned by the first write
    fn insert(&mut self, name: &str, value: Value) -> Result<()> {
        self.ensure_writable("put")?;
        if let Some(existing) = self.fields.get(name) {
            let existing = existing.field_type();
            let attempted = value.field_type();
            if existing != attempted {
                return Err(Error::TypeAlreadyBound {
                    field: name.to_string(),
                    existing,
                    attempted,
                });
            }
        }
        self.fields.insert(name.to_string(), value);
        self.state = ObjectState::Populated;
        Ok(())
    }
}

/// One typed field container bound to a schema and a backing store
pub struct StoreObject {
    store: Arc<dyn ObjectStore>,
    metadata: StoreObjectMetadata,
    inner: Mutex<Inner>,
}

impl StoreObject {
    /// Create an empty container for the given schema
    ///
    /// Backends call this from [`ObjectStore::create_store_object`] and while
    /// materializing query results.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        metadata: StoreObjectMetadata,
        id: Option<Uuid>,
    ) -> Self {
        StoreObject {
            store,
            metadata,
            inner: Mutex::new(Inner {
                id,
                last_modified: None,
                consistency: None,
                fields: BTreeMap::new(),
                if_not_exists_items: None,
                state: ObjectState::Unbound,
            }),
        }
    }

    /// Class (object table) name
    pub fn class_name(&self) -> &str {
        self.metadata.class_name()
    }

    /// Schema snapshot this container is bound to
    pub fn metadata(&self) -> &StoreObjectMetadata {
        &self.metadata
    }

    /// Backing store this container submits to
    pub fn store_handle(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ObjectState {
        self.inner.lock().state
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Record identifier, if known
    pub fn id(&self) -> Option<Uuid> {
        self.inner.lock().id
    }

    /// Set the record identifier
    pub fn set_id(&self, id: Option<Uuid>) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_writable("set id")?;
        inner.id = id;
        Ok(())
    }

    /// Last-modified timestamp, if known
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().last_modified
    }

    /// Set the last-modified timestamp
    pub fn set_last_modified(&self, at: Option<DateTime<Utc>>) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_writable("set lastModifiedAt")?;
        inner.last_modified = at;
        Ok(())
    }

    /// Consistency level forwarded with the write; `None` is the store default
    pub fn consistency(&self) -> Option<ConsistencyLevel> {
        self.inner.lock().consistency
    }

    /// Set the consistency level
    pub fn set_consistency(&self, level: Option<ConsistencyLevel>) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_writable("set consistency")?;
        inner.consistency = level;
        Ok(())
    }

    // ========================================================================
    // Schema validation
    // ========================================================================

    fn declared_type(&self, name: &str) -> Result<FieldType> {
        self.metadata
            .field(name)
            .map(|f| f.field_type())
            .ok_or_else(|| Error::FieldNotFound {
                class_name: self.class_name().to_string(),
                field: name.to_string(),
            })
    }

    /// Check that `name` is declared with exactly `requested`
    fn check_declared(&self, name: &str, requested: FieldType) -> Result<FieldType> {
        let declared = self.declared_type(name)?;
        if declared == requested {
            return Ok(declared);
        }
        if declared.collection_kind() != requested.collection_kind() {
            return Err(Error::FieldKindMismatch {
                field: name.to_string(),
                declared,
                requested,
            });
        }
        Err(Error::type_mismatch(declared, requested))
    }

    /// Check that a put of `requested` into `name` would be accepted
    ///
    /// Runs the same name, schema and state checks as the validated puts
    /// without storing anything. Callers that must do work before the put
    /// (such as storing nested rows) check first.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an identity field name
    /// - `FieldNotFound`, `FieldKindMismatch` or `TypeMismatch` against the schema
    /// - `InvalidState` once `store()` was invoked
    pub fn check_field(&self, name: &str, requested: FieldType) -> Result<()> {
        Self::check_not_reserved(name)?;
        self.check_declared(name, requested)?;
        self.inner.lock().ensure_writable("put")
    }

    fn check_not_reserved(name: &str) -> Result<()> {
        if is_reserved_field(name) {
            return Err(Error::invalid_argument(format!(
                "'{}' is an identity field, use set_id / set_last_modified",
                name
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Validated puts
    // ========================================================================

    /// Put a primitive value into a declared primitive field
    ///
    /// # Errors
    ///
    /// - `FieldNotFound` if the schema does not declare `name`
    /// - `FieldKindMismatch` if it is declared as a collection
    /// - `TypeMismatch` if it is declared with another primitive kind
    /// - `TypeAlreadyBound` if a value of another type was already put
    pub fn put(&self, name: &str, value: impl Into<Primitive>) -> Result<()> {
        self.put_value(name, Value::Primitive(value.into()))
    }

    /// Put any tagged value into a declared field
    pub fn put_value(&self, name: &str, value: Value) -> Result<()> {
        Self::check_not_reserved(name)?;
        self.check_declared(name, value.field_type())?;
        self.inner.lock().insert(name, value)
    }

    /// Put a map into a declared map field
    ///
    /// Every key and value is checked against the given kinds before
    /// anything is stored.
    pub fn put_map(
        &self,
        name: &str,
        key_type: PrimitiveType,
        value_type: PrimitiveType,
        entries: impl IntoIterator<Item = (Primitive, Primitive)>,
    ) -> Result<()> {
        self.check_declared(
            name,
            FieldType::Map {
                key: key_type,
                value: value_type,
            },
        )?;
        let map = CollectionValue::map(key_type, value_type, entries)?;
        self.put_value(name, Value::Collection(map))
    }

    /// Put a list into a declared list field
    pub fn put_list(
        &self,
        name: &str,
        element_type: PrimitiveType,
        elements: impl IntoIterator<Item = Primitive>,
    ) -> Result<()> {
        self.check_declared(name, FieldType::List(element_type))?;
        let list = CollectionValue::list(element_type, elements)?;
        self.put_value(name, Value::Collection(list))
    }

    /// Put a set into a declared set field
    pub fn put_set(
        &self,
        name: &str,
        element_type: PrimitiveType,
        elements: impl IntoIterator<Item = Primitive>,
    ) -> Result<()> {
        self.check_declared(name, FieldType::Set(element_type))?;
        let set = CollectionValue::set(element_type, elements)?;
        self.put_value(name, Value::Collection(set))
    }

    /// Clear a declared field back to a typed null
    pub fn reset(&self, name: &str) -> Result<()> {
        Self::check_not_reserved(name)?;
        let declared = self.declared_type(name)?;
        let mut inner = self.inner.lock();
        inner.ensure_writable("reset")?;
        inner.insert(name, Value::Null(declared))
    }

    // ========================================================================
    // Raw (trusted) path
    // ========================================================================

    /// Put a primitive by runtime type tag, without schema validation
    ///
    /// Only the type pinning rule applies. `None` stores a typed null.
    pub fn put_primitive(
        &self,
        name: &str,
        primitive_type: PrimitiveType,
        payload: Option<Primitive>,
    ) -> Result<()> {
        let value = Value::typed(primitive_type, payload)?;
        self.put_raw(name, value)
    }

    /// Put any value without schema validation
    pub fn put_raw(&self, name: &str, value: Value) -> Result<()> {
        self.inner.lock().insert(name, value)
    }

    /// Get a primitive by runtime type tag, without schema validation
    ///
    /// A field never written (or reset) yields the kind's default, which is
    /// `None` for the kinds without one.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the field holds a value of another type.
    pub fn get_primitive(
        &self,
        name: &str,
        primitive_type: PrimitiveType,
    ) -> Result<Option<Primitive>> {
        let inner = self.inner.lock();
        match inner.fields.get(name) {
            None => Ok(primitive_type.default_primitive()),
            Some(value) => {
                value.check_type(FieldType::Primitive(primitive_type))?;
                Ok(value
                    .as_primitive()
                    .cloned()
                    .or_else(|| primitive_type.default_primitive()))
            }
        }
    }

    /// Get a collection without schema validation; `None` if unset or null
    pub fn get_collection(&self, name: &str) -> Option<CollectionValue> {
        self.inner
            .lock()
            .fields
            .get(name)
            .and_then(|v| v.as_collection())
            .cloned()
    }

    /// Rebuild a retrieved row from store items
    ///
    /// `id` and `lastModifiedAt` items set the identity; everything else goes
    /// through the raw put path.
    pub fn hydrate(&self, items: impl IntoIterator<Item = ObjectStoreItem>) -> Result<()> {
        for item in items {
            let (key, value) = item.into_parts();
            match key.as_str() {
                ID_FIELD => {
                    let id = value.as_primitive().and_then(|p| p.as_uuid());
                    self.inner.lock().id = id;
                }
                LAST_MODIFIED_FIELD => {
                    let at = value.as_primitive().and_then(|p| p.as_timestamp());
                    self.inner.lock().last_modified = at;
                }
                _ => self.put_raw(&key, value)?,
            }
        }
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Stored value of a field, `None` if never written
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.lock().fields.get(name).cloned()
    }

    /// Check if a field has been written (including a typed null)
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().fields.contains_key(name)
    }

    /// Names of all written fields, in order
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().fields.keys().cloned().collect()
    }

    /// Type pinned for a written field
    pub fn field_type_of(&self, name: &str) -> Option<FieldType> {
        self.inner.lock().fields.get(name).map(|v| v.field_type())
    }

    /// Read a declared primitive field as a Rust payload type
    ///
    /// `None` if the field was never written or holds a null.
    pub fn get_as<T: PrimitiveField>(&self, name: &str) -> Result<Option<T>> {
        self.check_declared(name, FieldType::Primitive(T::TYPE))?;
        Ok(self
            .inner
            .lock()
            .fields
            .get(name)
            .and_then(|v| v.as_primitive())
            .cloned()
            .and_then(T::from_primitive))
    }

    fn get_or_default<T: PrimitiveField>(&self, name: &str) -> Result<T> {
        match self.get_as::<T>(name)? {
            Some(v) => Ok(v),
            None => T::TYPE
                .default_primitive()
                .and_then(T::from_primitive)
                .ok_or_else(|| Error::type_mismatch(T::TYPE, "no default")),
        }
    }

    /// Text field
    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        self.get_as(name)
    }

    /// Blob field
    pub fn get_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.get_as(name)
    }

    /// Timestamp field
    pub fn get_timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        self.get_as(name)
    }

    /// Uuid field
    pub fn get_uuid(&self, name: &str) -> Result<Option<Uuid>> {
        self.get_as(name)
    }

    /// Network address field
    pub fn get_inet(&self, name: &str) -> Result<Option<IpAddr>> {
        self.get_as(name)
    }

    /// 64-bit integer field, 0 if unset
    pub fn get_long(&self, name: &str) -> Result<i64> {
        self.get_or_default(name)
    }

    /// 32-bit integer field, 0 if unset
    pub fn get_int(&self, name: &str) -> Result<i32> {
        self.get_or_default(name)
    }

    /// Boolean field, false if unset
    pub fn get_boolean(&self, name: &str) -> Result<bool> {
        self.get_or_default(name)
    }

    /// 32-bit float field, 0.0 if unset
    pub fn get_float(&self, name: &str) -> Result<f32> {
        self.get_or_default(name)
    }

    /// 64-bit float field, 0.0 if unset
    pub fn get_double(&self, name: &str) -> Result<f64> {
        self.get_or_default(name)
    }

    /// Decimal field, 0 if unset
    pub fn get_decimal(&self, name: &str) -> Result<BigDecimal> {
        self.get_or_default(name)
    }

    /// Arbitrary-precision integer field, 0 if unset
    pub fn get_var_int(&self, name: &str) -> Result<BigInt> {
        self.get_or_default(name)
    }

    fn get_collection_of(&self, name: &str, kind: CollectionKind) -> Result<Option<CollectionValue>> {
        let declared = self.declared_type(name)?;
        if declared.collection_kind() != Some(kind) {
            let requested = match kind {
                CollectionKind::Map => "map",
                CollectionKind::List => "list",
                CollectionKind::Set => "set",
            };
            return Err(Error::type_mismatch(declared, requested));
        }
        Ok(self.get_collection(name))
    }

    /// Map field entries, `None` if unset or null
    pub fn get_map(&self, name: &str) -> Result<Option<HashMap<Primitive, Primitive>>> {
        Ok(self
            .get_collection_of(name, CollectionKind::Map)?
            .and_then(|c| c.as_map().cloned()))
    }

    /// List field elements, `None` if unset or null
    pub fn get_list(&self, name: &str) -> Result<Option<Vec<Primitive>>> {
        Ok(self
            .get_collection_of(name, CollectionKind::List)?
            .and_then(|c| c.as_list().map(|l| l.to_vec())))
    }

    /// Set field elements, `None` if unset or null
    pub fn get_set(&self, name: &str) -> Result<Option<HashSet<Primitive>>> {
        Ok(self
            .get_collection_of(name, CollectionKind::Set)?
            .and_then(|c| c.as_set().cloned()))
    }

    // ========================================================================
    // Conditional writes
    // ========================================================================

    /// Check if the write is conditional on the absence of the row
    pub fn is_if_not_exists(&self) -> bool {
        self.inner.lock().if_not_exists_items.is_some()
    }

    /// Enable or clear the "if not exists" guard
    ///
    /// Enabling adds a `lastModifiedAt` guard item carrying the current
    /// timestamp; disabling drops every guard item.
    pub fn set_if_not_exists(&self, if_not_exists: bool) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_writable("change guard")?;
        if if_not_exists {
            let item = ObjectStoreItem::typed(
                LAST_MODIFIED_FIELD,
                PrimitiveType::Timestamp,
                inner.last_modified.map(Primitive::Timestamp),
            )?;
            inner.if_not_exists_items.get_or_insert_with(Vec::new).push(item);
        } else {
            inner.if_not_exists_items = None;
        }
        Ok(())
    }

    /// Append a guard item, enabling the guard if needed
    pub fn add_if_not_exists_item(&self, item: ObjectStoreItem) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_writable("change guard")?;
        inner.if_not_exists_items.get_or_insert_with(Vec::new).push(item);
        Ok(())
    }

    /// Guard items in insertion order, `None` if unguarded
    pub fn if_not_exists_items(&self) -> Option<Vec<ObjectStoreItem>> {
        self.inner.lock().if_not_exists_items.clone()
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Flatten the written fields into store items
    pub fn collect_items(&self) -> Result<Vec<ObjectStoreItem>> {
        let inner = self.inner.lock();
        inner
            .fields
            .iter()
            .map(|(k, v)| ObjectStoreItem::new(k.clone(), v.clone()))
            .collect()
    }

    /// Submit this container to its backing store
    ///
    /// On success the `id` and `lastModifiedAt` items reported by the store
    /// are applied to this container and removed from the returned result. A
    /// rejected conditional write is returned as a failed result carrying the
    /// conflicting items; it is not an error.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if `store()` was already invoked
    /// - any error surfaced by the backing store
    pub fn store(&self) -> Result<StoreResult> {
        let request = {
            let mut inner = self.inner.lock();
            if !inner.state.is_writable() {
                return Err(Error::InvalidState(
                    "store() may only be invoked once".to_string(),
                ));
            }
            let items = inner
                .fields
                .iter()
                .map(|(k, v)| ObjectStoreItem::new(k.clone(), v.clone()))
                .collect::<Result<Vec<_>>>()?;
            inner.state = ObjectState::Submitted;
            StoreRequest {
                class_name: self.class_name().to_string(),
                id: inner.id,
                last_modified: inner.last_modified,
                consistency: inner.consistency,
                items,
                if_not_exists: inner.if_not_exists_items.clone(),
            }
        };

        debug!(
            target: "objectstore::object",
            class = %request.class_name,
            id = ?request.id,
            fields = request.items.len(),
            conditional = request.is_conditional(),
            "Submitting store object"
        );

        let outcome = self.store.submit(request);
        let mut inner = self.inner.lock();
        inner.state = ObjectState::Terminal;
        let result = outcome?;

        if !result.is_success() {
            warn!(
                target: "objectstore::object",
                class = %self.class_name(),
                conflicts = result.items().len(),
                "Conditional write rejected"
            );
            return Ok(result);
        }

        let mut remaining = Vec::new();
        for item in result.into_items() {
            match item.key() {
                ID_FIELD => inner.id = item.primitive().and_then(|p| p.as_uuid()),
                LAST_MODIFIED_FIELD => {
                    inner.last_modified = item.primitive().and_then(|p| p.as_timestamp())
                }
                _ => remaining.push(item),
            }
        }
        Ok(StoreResult::success(remaining))
    }
}

impl fmt::Debug for StoreObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("StoreObject")
            .field("class_name", &self.class_name())
            .field("id", &inner.id)
            .field("last_modified", &inner.last_modified)
            .field("state", &inner.state)
            .field("fields", &inner.fields)
            .finish()
    }
}
