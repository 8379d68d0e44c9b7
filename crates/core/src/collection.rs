//! Collection values: maps, lists and sets of primitives
//!
//! A `CollectionValue` carries its element type(s) as data next to the
//! payload. Every factory validates every element (or key/value pair) before
//! the value exists, so there is no partially-validated collection state.

use crate::error::{Error, Result};
use crate::value::{FieldType, Primitive, PrimitiveField, PrimitiveType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The three collection shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    /// Key/value map
    Map,
    /// Ordered list
    List,
    /// Unordered set
    Set,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Map => f.write_str("map"),
            CollectionKind::List => f.write_str("list"),
            CollectionKind::Set => f.write_str("set"),
        }
    }
}

/// A validated map, list or set of primitives
///
/// Fields are private: the factories below (and deserialization, which routes
/// through them) are the only ways to build one, so every element always
/// matches the declared kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCollection", into = "RawCollection")]
pub struct CollectionValue {
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    Map {
        key_type: PrimitiveType,
        value_type: PrimitiveType,
        entries: HashMap<Primitive, Primitive>,
    },
    List {
        element_type: PrimitiveType,
        elements: Vec<Primitive>,
    },
    Set {
        element_type: PrimitiveType,
        elements: HashSet<Primitive>,
    },
}

/// Wire form; map entries as pairs so non-string keys survive JSON
#[derive(Serialize, Deserialize)]
enum RawCollection {
    Map {
        key_type: PrimitiveType,
        value_type: PrimitiveType,
        entries: Vec<(Primitive, Primitive)>,
    },
    List {
        element_type: PrimitiveType,
        elements: Vec<Primitive>,
    },
    Set {
        element_type: PrimitiveType,
        elements: Vec<Primitive>,
    },
}

impl TryFrom<RawCollection> for CollectionValue {
    type Error = Error;

    fn try_from(raw: RawCollection) -> Result<Self> {
        match raw {
            RawCollection::Map {
                key_type,
                value_type,
                entries,
            } => CollectionValue::map(key_type, value_type, entries),
            RawCollection::List {
                element_type,
                elements,
            } => CollectionValue::list(element_type, elements),
            RawCollection::Set {
                element_type,
                elements,
            } => CollectionValue::set(element_type, elements),
        }
    }
}

impl From<CollectionValue> for RawCollection {
    fn from(value: CollectionValue) -> Self {
        match value.payload {
            Payload::Map {
                key_type,
                value_type,
                entries,
            } => RawCollection::Map {
                key_type,
                value_type,
                entries: entries.into_iter().collect(),
            },
            Payload::List {
                element_type,
                elements,
            } => RawCollection::List {
                element_type,
                elements,
            },
            Payload::Set {
                element_type,
                elements,
            } => RawCollection::Set {
                element_type,
                elements: elements.into_iter().collect(),
            },
        }
    }
}

impl From<Payload> for CollectionValue {
    fn from(payload: Payload) -> Self {
        CollectionValue { payload }
    }
}

impl CollectionValue {
    /// Build a map, failing on the first key or value of the wrong kind
    pub fn map(
        key_type: PrimitiveType,
        value_type: PrimitiveType,
        entries: impl IntoIterator<Item = (Primitive, Primitive)>,
    ) -> Result<Self> {
        let mut checked = HashMap::new();
        for (k, v) in entries {
            k.check_type(key_type)?;
            v.check_type(value_type)?;
            checked.insert(k, v);
        }
        Ok(Payload::Map {
            key_type,
            value_type,
            entries: checked,
        }
        .into())
    }

    /// Build a list, failing on the first element of the wrong kind
    pub fn list(
        element_type: PrimitiveType,
        elements: impl IntoIterator<Item = Primitive>,
    ) -> Result<Self> {
        let elements = elements
            .into_iter()
            .map(|e| e.check_type(element_type).map(|_| e))
            .collect::<Result<Vec<_>>>()?;
        Ok(Payload::List {
            element_type,
            elements,
        }
        .into())
    }

    /// Build a set, failing on the first element of the wrong kind
    pub fn set(
        element_type: PrimitiveType,
        elements: impl IntoIterator<Item = Primitive>,
    ) -> Result<Self> {
        let elements = elements
            .into_iter()
            .map(|e| e.check_type(element_type).map(|_| e))
            .collect::<Result<HashSet<_>>>()?;
        Ok(Payload::Set {
            element_type,
            elements,
        }
        .into())
    }

    /// Build a map from statically typed keys and values
    pub fn map_of<K: PrimitiveField, V: PrimitiveField>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Payload::Map {
            key_type: K::TYPE,
            value_type: V::TYPE,
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into_primitive(), v.into_primitive()))
                .collect(),
        }
        .into()
    }

    /// Build a list from statically typed elements
    pub fn list_of<T: PrimitiveField>(elements: impl IntoIterator<Item = T>) -> Self {
        Payload::List {
            element_type: T::TYPE,
            elements: elements.into_iter().map(T::into_primitive).collect(),
        }
        .into()
    }

    /// Build a set from statically typed elements
    pub fn set_of<T: PrimitiveField>(elements: impl IntoIterator<Item = T>) -> Self {
        Payload::Set {
            element_type: T::TYPE,
            elements: elements.into_iter().map(T::into_primitive).collect(),
        }
        .into()
    }

    /// Empty map of the given kinds
    pub fn empty_map(key_type: PrimitiveType, value_type: PrimitiveType) -> Self {
        Payload::Map {
            key_type,
            value_type,
            entries: HashMap::new(),
        }
        .into()
    }

    /// Empty list of the given kind
    pub fn empty_list(element_type: PrimitiveType) -> Self {
        Payload::List {
            element_type,
            elements: Vec::new(),
        }
        .into()
    }

    /// Empty set of the given kind
    pub fn empty_set(element_type: PrimitiveType) -> Self {
        Payload::Set {
            element_type,
            elements: HashSet::new(),
        }
        .into()
    }

    /// Rebuild a collection of the given declared type from raw parts
    ///
    /// Used when the declared type is only known at runtime, e.g. while
    /// flattening domain collections. Validates like the typed factories.
    pub fn from_elements(
        field_type: FieldType,
        elements: Vec<Primitive>,
        values: Option<Vec<Primitive>>,
    ) -> Result<Self> {
        match field_type {
            FieldType::List(e) => CollectionValue::list(e, elements),
            FieldType::Set(e) => CollectionValue::set(e, elements),
            FieldType::Map { key, value } => {
                let values = values.ok_or_else(|| {
                    Error::invalid_argument("map collections require values")
                })?;
                if values.len() != elements.len() {
                    return Err(Error::invalid_argument(format!(
                        "map has {} keys but {} values",
                        elements.len(),
                        values.len()
                    )));
                }
                CollectionValue::map(key, value, elements.into_iter().zip(values))
            }
            FieldType::Primitive(p) => Err(Error::invalid_argument(format!(
                "{} is not a collection type",
                p
            ))),
        }
    }

    /// Shape of this collection
    pub fn kind(&self) -> CollectionKind {
        match &self.payload {
            Payload::Map { .. } => CollectionKind::Map,
            Payload::List { .. } => CollectionKind::List,
            Payload::Set { .. } => CollectionKind::Set,
        }
    }

    /// Check if this is a map
    pub fn is_map(&self) -> bool {
        matches!(self.payload, Payload::Map { .. })
    }

    /// Check if this is a list
    pub fn is_list(&self) -> bool {
        matches!(self.payload, Payload::List { .. })
    }

    /// Check if this is a set
    pub fn is_set(&self) -> bool {
        matches!(self.payload, Payload::Set { .. })
    }

    /// Map key kind, or list/set element kind
    pub fn first_type(&self) -> PrimitiveType {
        match &self.payload {
            Payload::Map { key_type, .. } => *key_type,
            Payload::List { element_type, .. }
            | Payload::Set { element_type, .. } => *element_type,
        }
    }

    /// Map value kind; `None` for lists and sets
    pub fn second_type(&self) -> Option<PrimitiveType> {
        match &self.payload {
            Payload::Map { value_type, .. } => Some(*value_type),
            _ => None,
        }
    }

    /// Declared type of this collection
    pub fn field_type(&self) -> FieldType {
        match &self.payload {
            Payload::Map {
                key_type,
                value_type,
                ..
            } => FieldType::Map {
                key: *key_type,
                value: *value_type,
            },
            Payload::List { element_type, .. } => FieldType::List(*element_type),
            Payload::Set { element_type, .. } => FieldType::Set(*element_type),
        }
    }

    /// Number of elements (or entries)
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Map { entries, .. } => entries.len(),
            Payload::List { elements, .. } => elements.len(),
            Payload::Set { elements, .. } => elements.len(),
        }
    }

    /// Check if the collection holds nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the entries if this is a map
    pub fn as_map(&self) -> Option<&HashMap<Primitive, Primitive>> {
        match &self.payload {
            Payload::Map { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Get the elements if this is a list
    pub fn as_list(&self) -> Option<&[Primitive]> {
        match &self.payload {
            Payload::List { elements, .. } => Some(elements),
            _ => None,
        }
    }

    /// Get the elements if this is a set
    pub fn as_set(&self) -> Option<&HashSet<Primitive>> {
        match &self.payload {
            Payload::Set { elements, .. } => Some(elements),
            _ => None,
        }
    }

    /// Check whether a primitive is one of the elements (or map keys)
    pub fn contains(&self, candidate: &Primitive) -> bool {
        match &self.payload {
            Payload::Map { entries, .. } => entries.contains_key(candidate),
            Payload::List { elements, .. } => elements.contains(candidate),
            Payload::Set { elements, .. } => elements.contains(candidate),
        }
    }
}

impl fmt::Display for CollectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_type())?;
        match &self.payload {
            Payload::Map { entries, .. } => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Payload::List { elements, .. } => {
                f.write_str("[")?;
                write_joined(f, elements.iter())?;
                f.write_str("]")
            }
            Payload::Set { elements, .. } => {
                f.write_str("{")?;
                write_joined(f, elements.iter())?;
                f.write_str("}")
            }
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Primitive>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
