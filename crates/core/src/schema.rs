//! Schema model: per-class field metadata
//!
//! A `StoreObjectMetadata` is an immutable snapshot of one object table's
//! schema as produced by the backing store. Field containers validate every
//! put against it.

use crate::collection::CollectionKind;
use crate::names::{ID_FIELD, LAST_MODIFIED_FIELD};
use crate::value::{FieldType, PrimitiveType};
use serde::{Deserialize, Serialize};

/// Descriptor of one field in an object table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    name: String,
    field_type: FieldType,
}

impl FieldMetadata {
    /// Create a field descriptor
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        FieldMetadata {
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Check if the field is a map, list or set
    pub fn is_collection_type(&self) -> bool {
        self.field_type.is_collection()
    }

    /// Check if the field is a map
    pub fn is_map(&self) -> bool {
        self.field_type.is_map()
    }

    /// Check if the field is a list
    pub fn is_list(&self) -> bool {
        self.field_type.is_list()
    }

    /// Check if the field is a set
    pub fn is_set(&self) -> bool {
        self.field_type.is_set()
    }

    /// Map key kind, or list/set element kind
    pub fn first_element_type(&self) -> Option<PrimitiveType> {
        self.field_type.first_element_type()
    }

    /// Map value kind
    pub fn second_element_type(&self) -> Option<PrimitiveType> {
        self.field_type.second_element_type()
    }

    /// Check if a primitive of the given kind may be stored in this field
    pub fn is_valid(&self, primitive_type: PrimitiveType) -> bool {
        self.field_type == FieldType::Primitive(primitive_type)
    }

    /// Check if a collection of the given shape may be stored in this field
    pub fn is_valid_collection(
        &self,
        kind: CollectionKind,
        first: PrimitiveType,
        second: Option<PrimitiveType>,
    ) -> bool {
        self.field_type.collection_kind() == Some(kind)
            && self.first_element_type() == Some(first)
            && self.second_element_type() == second
    }

    pub(crate) fn set_field_type(&mut self, field_type: FieldType) {
        self.field_type = field_type;
    }
}

/// Schema of one object table: class name, ordered fields, primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreObjectMetadata {
    class_name: String,
    fields: Vec<FieldMetadata>,
    primary_key: Vec<String>,
}

impl StoreObjectMetadata {
    /// Create an empty schema with no fields and no primary key
    pub fn new(class_name: impl Into<String>) -> Self {
        StoreObjectMetadata {
            class_name: class_name.into(),
            fields: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Create a schema holding the identity columns every object table has:
    /// `id` (uuid, primary key) and `lastModifiedAt` (timestamp)
    pub fn with_identity(class_name: impl Into<String>) -> Self {
        let mut metadata = StoreObjectMetadata::new(class_name);
        metadata
            .fields
            .push(FieldMetadata::new(ID_FIELD, PrimitiveType::Uuid));
        metadata
            .fields
            .push(FieldMetadata::new(LAST_MODIFIED_FIELD, PrimitiveType::Timestamp));
        metadata.primary_key.push(ID_FIELD.to_string());
        metadata
    }

    /// Builder: append a field
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.add_field(field);
        self
    }

    /// Class (object table) name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// All fields, in declaration order
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check if a field is declared
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Primary key fields, in key order
    pub fn primary_key(&self) -> Vec<&FieldMetadata> {
        self.primary_key
            .iter()
            .filter_map(|name| self.field(name))
            .collect()
    }

    /// Check if a field is part of the primary key
    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key.iter().any(|k| k == name)
    }

    /// Append a field, replacing any field with the same name
    pub fn add_field(&mut self, field: FieldMetadata) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Remove a field, returning it if it was declared
    pub fn remove_field(&mut self, name: &str) -> Option<FieldMetadata> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        self.primary_key.retain(|k| k != name);
        Some(self.fields.remove(idx))
    }

    /// Change the declared type of a field, returning the previous type
    pub fn change_field_type(&mut self, name: &str, field_type: FieldType) -> Option<FieldType> {
        let field = self.fields.iter_mut().find(|f| f.name == name)?;
        let previous = field.field_type();
        field.set_field_type(field_type);
        Some(previous)
    }
}
