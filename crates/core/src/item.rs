//! Named values exchanged with the backing store

use crate::collection::CollectionValue;
use crate::error::{Error, Result};
use crate::value::{FieldType, Primitive, PrimitiveType, Value};
use serde::{Deserialize, Serialize};

/// One named value: a column of a retrieved row, a conditional-write guard,
/// or an item reported back in a store result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreItem {
    key: String,
    value: Value,
}

impl ObjectStoreItem {
    /// Create an item; the key must not be empty
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::invalid_argument("key cannot be empty"));
        }
        Ok(ObjectStoreItem {
            key,
            value: value.into(),
        })
    }

    /// Create an item of a declared primitive kind; `None` yields a typed null
    pub fn typed(
        key: impl Into<String>,
        declared: PrimitiveType,
        payload: Option<Primitive>,
    ) -> Result<Self> {
        ObjectStoreItem::new(key, Value::typed(declared, payload)?)
    }

    /// Item key (field name)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Item value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Declared type of the value
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }

    /// Check if the value is a collection
    pub fn is_collection(&self) -> bool {
        self.value.is_collection()
    }

    /// Get the collection payload, if any
    pub fn collection_value(&self) -> Option<&CollectionValue> {
        self.value.as_collection()
    }

    /// Get the primitive payload, if any
    pub fn primitive(&self) -> Option<&Primitive> {
        self.value.as_primitive()
    }

    /// Split into key and value
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}
