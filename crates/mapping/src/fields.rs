//! Field mapping helpers
//!
//! One generic flatten/unflatten step covers every field shape. A
//! [`FieldMapping`] says how a single element crosses the storage boundary:
//!
//! - [`Plain<T>`]: a primitive payload type, passed through unchanged
//! - [`Nested<T>`]: a revivable domain type, stored as its own row first and
//!   referenced by id; revived from the same store on the way back
//!
//! The `store_*` helpers check the field against the schema before any
//! nested row is written, and return `Ok(false)` when there was nothing to write
//! (absent value or empty collection) so hooks can compose optional fields
//! without extra guards. The `revive_*` helpers return `None` for unset,
//! null and empty fields.

use crate::storable::{create_and_revive, Revivable, Storable};
use objectstore_core::{
    CollectionKind, Error, FieldType, Primitive, PrimitiveField, PrimitiveType, Result, Value,
};
use objectstore_engine::{ObjectStore, StoreObject};
use std::marker::PhantomData;
use tracing::debug;

/// How one element of a field crosses the storage boundary
pub trait FieldMapping {
    /// Domain-side element type
    type Item;

    /// Primitive kind the element is stored as
    const STORED: PrimitiveType;

    /// Turn a domain element into its stored primitive
    fn flatten(item: &Self::Item, store: &dyn ObjectStore) -> Result<Primitive>;

    /// Turn a stored primitive back into a domain element
    fn unflatten(stored: Primitive, store: &dyn ObjectStore) -> Result<Self::Item>;
}

/// Element stored as its own primitive payload
pub struct Plain<T>(PhantomData<T>);

impl<T: PrimitiveField + Clone> FieldMapping for Plain<T> {
    type Item = T;
    const STORED: PrimitiveType = T::TYPE;

    fn flatten(item: &T, _store: &dyn ObjectStore) -> Result<Primitive> {
        Ok(item.clone().into_primitive())
    }

    fn unflatten(stored: Primitive, _store: &dyn ObjectStore) -> Result<T> {
        let actual = stored.primitive_type();
        T::from_primitive(stored).ok_or_else(|| Error::type_mismatch(T::TYPE, actual))
    }
}

/// Element stored as a separate row and referenced by id
pub struct Nested<T>(PhantomData<T>);

impl<T: Revivable> FieldMapping for Nested<T> {
    type Item = T;
    const STORED: PrimitiveType = PrimitiveType::Uuid;

    fn flatten(item: &T, store: &dyn ObjectStore) -> Result<Primitive> {
        let id = item.store_to(store)?;
        debug!(
            target: "objectstore::mapping",
            class = item.class_name(),
            %id,
            "Stored nested object"
        );
        Ok(Primitive::Uuid(id))
    }

    fn unflatten(stored: Primitive, store: &dyn ObjectStore) -> Result<T> {
        match stored {
            Primitive::Uuid(id) => create_and_revive::<T>(store, id),
            other => Err(Error::type_mismatch(
                PrimitiveType::Uuid,
                other.primitive_type(),
            )),
        }
    }
}

fn flatten_all<'a, M>(
    object: &StoreObject,
    values: impl IntoIterator<Item = &'a M::Item>,
) -> Result<Vec<Primitive>>
where
    M: FieldMapping,
    M::Item: 'a,
{
    let store = object.store_handle();
    values
        .into_iter()
        .map(|v| M::flatten(v, store.as_ref()))
        .collect()
}

// ============================================================================
// Single values
// ============================================================================

/// Write one value; `Ok(false)` if there is none
pub fn store_field<M: FieldMapping>(
    object: &StoreObject,
    name: &str,
    value: Option<&M::Item>,
) -> Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    object.check_field(name, FieldType::Primitive(M::STORED))?;
    let store = object.store_handle();
    let flat = M::flatten(value, store.as_ref())?;
    object.put_value(name, Value::Primitive(flat))?;
    Ok(true)
}

/// Read one value; `None` if unset or null
pub fn revive_field<M: FieldMapping>(object: &StoreObject, name: &str) -> Result<Option<M::Item>> {
    match object.get(name) {
        Some(Value::Primitive(p)) => {
            p.check_type(M::STORED)?;
            let store = object.store_handle();
            M::unflatten(p, store.as_ref()).map(Some)
        }
        Some(Value::Collection(c)) => Err(Error::type_mismatch(M::STORED, c.field_type())),
        Some(Value::Null(_)) | None => Ok(None),
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Write a list; `Ok(false)` if it is empty
pub fn store_list_field<'a, M, I>(object: &StoreObject, name: &str, values: I) -> Result<bool>
where
    M: FieldMapping,
    M::Item: 'a,
    I: IntoIterator<Item = &'a M::Item>,
{
    object.check_field(name, FieldType::List(M::STORED))?;
    let flat = flatten_all::<M>(object, values)?;
    if flat.is_empty() {
        return Ok(false);
    }
    object.put_list(name, M::STORED, flat)?;
    Ok(true)
}

/// Read a list into any collection; `None` if unset, null or empty
pub fn revive_list_field<M, C>(object: &StoreObject, name: &str) -> Result<Option<C>>
where
    M: FieldMapping,
    C: FromIterator<M::Item>,
{
    match object.get_list(name)? {
        Some(elements) if !elements.is_empty() => {
            let store = object.store_handle();
            elements
                .into_iter()
                .map(|e| M::unflatten(e, store.as_ref()))
                .collect::<Result<C>>()
                .map(Some)
        }
        _ => Ok(None),
    }
}

/// Write a set; `Ok(false)` if it is empty
pub fn store_set_field<'a, M, I>(object: &StoreObject, name: &str, values: I) -> Result<bool>
where
    M: FieldMapping,
    M::Item: 'a,
    I: IntoIterator<Item = &'a M::Item>,
{
    object.check_field(name, FieldType::Set(M::STORED))?;
    let flat = flatten_all::<M>(object, values)?;
    if flat.is_empty() {
        return Ok(false);
    }
    object.put_set(name, M::STORED, flat)?;
    Ok(true)
}

/// Read a set into any collection; `None` if unset, null or empty
pub fn revive_set_field<M, C>(object: &StoreObject, name: &str) -> Result<Option<C>>
where
    M: FieldMapping,
    C: FromIterator<M::Item>,
{
    match object.get_set(name)? {
        Some(elements) if !elements.is_empty() => {
            let store = object.store_handle();
            elements
                .into_iter()
                .map(|e| M::unflatten(e, store.as_ref()))
                .collect::<Result<C>>()
                .map(Some)
        }
        _ => Ok(None),
    }
}

/// Write a map; `Ok(false)` if it is empty
///
/// Nested keys and values are each stored as their own rows first.
pub fn store_map_field<'a, K, V, I>(object: &StoreObject, name: &str, entries: I) -> Result<bool>
where
    K: FieldMapping,
    V: FieldMapping,
    K::Item: 'a,
    V::Item: 'a,
    I: IntoIterator<Item = (&'a K::Item, &'a V::Item)>,
{
    object.check_field(
        name,
        FieldType::Map {
            key: K::STORED,
            value: V::STORED,
        },
    )?;
    let store = object.store_handle();
    let flat = entries
        .into_iter()
        .map(|(k, v)| Ok((K::flatten(k, store.as_ref())?, V::flatten(v, store.as_ref())?)))
        .collect::<Result<Vec<_>>>()?;
    if flat.is_empty() {
        return Ok(false);
    }
    object.put_map(name, K::STORED, V::STORED, flat)?;
    Ok(true)
}

/// Read a map into any collection of pairs; `None` if unset, null or empty
pub fn revive_map_field<K, V, C>(object: &StoreObject, name: &str) -> Result<Option<C>>
where
    K: FieldMapping,
    V: FieldMapping,
    C: FromIterator<(K::Item, V::Item)>,
{
    match object.get_map(name)? {
        Some(entries) if !entries.is_empty() => {
            let store = object.store_handle();
            entries
                .into_iter()
                .map(|(k, v)| {
                    Ok((
                        K::unflatten(k, store.as_ref())?,
                        V::unflatten(v, store.as_ref())?,
                    ))
                })
                .collect::<Result<C>>()
                .map(Some)
        }
        _ => Ok(None),
    }
}

// ============================================================================
// Schema declaration
// ============================================================================

/// Declare a single-value field
pub fn create_field<M: FieldMapping>(
    store: &dyn ObjectStore,
    class_name: &str,
    field_name: &str,
    if_not_exists: bool,
) -> Result<()> {
    store.add_primitive_field(class_name, field_name, M::STORED, if_not_exists)?;
    Ok(())
}

/// Declare a list field
pub fn create_list_field<M: FieldMapping>(
    store: &dyn ObjectStore,
    class_name: &str,
    field_name: &str,
    if_not_exists: bool,
) -> Result<()> {
    store.add_collection_field(
        class_name,
        field_name,
        CollectionKind::List,
        M::STORED,
        None,
        if_not_exists,
    )?;
    Ok(())
}

/// Declare a set field
pub fn create_set_field<M: FieldMapping>(
    store: &dyn ObjectStore,
    class_name: &str,
    field_name: &str,
    if_not_exists: bool,
) -> Result<()> {
    store.add_collection_field(
        class_name,
        field_name,
        CollectionKind::Set,
        M::STORED,
        None,
        if_not_exists,
    )?;
    Ok(())
}

/// Declare a map field
pub fn create_map_field<K: FieldMapping, V: FieldMapping>(
    store: &dyn ObjectStore,
    class_name: &str,
    field_name: &str,
    if_not_exists: bool,
) -> Result<()> {
    store.add_collection_field(
        class_name,
        field_name,
        CollectionKind::Map,
        K::STORED,
        Some(V::STORED),
        if_not_exists,
    )?;
    Ok(())
}

/// Declare several primitive fields from parallel name and type slices
///
/// # Errors
///
/// Returns an argument error if the slices differ in length.
pub fn create_primitive_fields(
    store: &dyn ObjectStore,
    class_name: &str,
    field_names: &[&str],
    field_types: &[PrimitiveType],
    if_not_exists: bool,
) -> Result<()> {
    if field_names.len() != field_types.len() {
        return Err(Error::invalid_argument(format!(
            "field names and field types must have same length ({} vs {})",
            field_names.len(),
            field_types.len()
        )));
    }
    for (name, field_type) in field_names.iter().zip(field_types) {
        store.add_primitive_field(class_name, name, *field_type, if_not_exists)?;
    }
    Ok(())
}
