//! Object tables: one schema plus its rows

use chrono::{DateTime, Utc};
use objectstore_core::{
    Error, ObjectStoreItem, Primitive, Result, StoreObjectMetadata, Value, ID_FIELD,
    LAST_MODIFIED_FIELD,
};
use objectstore_engine::Relation;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A persisted record
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub last_modified: DateTime<Utc>,
    /// Non-null column values; cleared columns are absent
    pub values: BTreeMap<String, Value>,
}

impl Row {
    fn new(last_modified: DateTime<Utc>) -> Self {
        Row {
            last_modified,
            values: BTreeMap::new(),
        }
    }

    /// Value of a column, with the identity columns resolved from the row
    fn column(&self, id: Uuid, name: &str) -> Option<Primitive> {
        match name {
            ID_FIELD => Some(Primitive::Uuid(id)),
            LAST_MODIFIED_FIELD => Some(Primitive::Timestamp(self.last_modified)),
            _ => self.values.get(name).and_then(|v| v.as_primitive()).cloned(),
        }
    }

    /// Identity items of this row
    pub fn identity_items(&self, id: Uuid) -> Result<Vec<ObjectStoreItem>> {
        Ok(vec![
            ObjectStoreItem::new(ID_FIELD, id)?,
            ObjectStoreItem::new(LAST_MODIFIED_FIELD, self.last_modified)?,
        ])
    }

    /// All items of this row: identity first, then columns in name order
    pub fn items(&self, id: Uuid) -> Result<Vec<ObjectStoreItem>> {
        let mut items = self.identity_items(id)?;
        for (k, v) in &self.values {
            items.push(ObjectStoreItem::new(k.clone(), v.clone())?);
        }
        Ok(items)
    }

    /// Check a conjunction of relations; missing and null columns never match
    pub fn matches(&self, id: Uuid, relations: &[Relation]) -> bool {
        relations.iter().all(|r| {
            self.column(id, r.identifier())
                .map(|stored| r.matches(&stored))
                .unwrap_or(false)
        })
    }
}

/// Schema and rows of one class
#[derive(Debug, Clone)]
pub(crate) struct ObjectTable {
    pub metadata: StoreObjectMetadata,
    pub rows: BTreeMap<Uuid, Row>,
}

impl ObjectTable {
    pub fn new(class_name: &str) -> Self {
        ObjectTable {
            metadata: StoreObjectMetadata::with_identity(class_name),
            rows: BTreeMap::new(),
        }
    }

    /// Check submitted items against the schema
    pub fn check_items(&self, items: &[ObjectStoreItem]) -> Result<()> {
        for item in items {
            let field = self
                .metadata
                .field(item.key())
                .ok_or_else(|| Error::FieldNotFound {
                    class_name: self.metadata.class_name().to_string(),
                    field: item.key().to_string(),
                })?;
            item.value().check_type(field.field_type())?;
        }
        Ok(())
    }

    /// Insert or merge a row; typed nulls clear their column
    pub fn upsert(&mut self, id: Uuid, at: DateTime<Utc>, items: Vec<ObjectStoreItem>) -> &Row {
        let row = self.rows.entry(id).or_insert_with(|| Row::new(at));
        row.last_modified = at;
        for item in items {
            let (key, value) = item.into_parts();
            if value.is_null() {
                row.values.remove(&key);
            } else {
                row.values.insert(key, value);
            }
        }
        row
    }

    /// Remove a column from every row
    pub fn clear_column(&mut self, name: &str) {
        for row in self.rows.values_mut() {
            row.values.remove(name);
        }
    }

    /// Remove values of a column that no longer match its declared type
    pub fn retain_column_type(&mut self, name: &str) -> usize {
        let Some(declared) = self.metadata.field(name).map(|f| f.field_type()) else {
            return 0;
        };
        let mut dropped = 0;
        for row in self.rows.values_mut() {
            if let Some(v) = row.values.get(name) {
                if v.field_type() != declared {
                    row.values.remove(name);
                    dropped += 1;
                }
            }
        }
        dropped
    }
}
