//! Domain objects that store and revive themselves
//!
//! A domain type implements [`Storable`] by exposing its
//! [`StorableIdentity`] and overriding the three field hooks. Everything else
//! (table creation, the store round trip, revival, deletion, queries) comes
//! from provided methods.
//!
//! ## Nested objects
//!
//! Nested domain objects are stored as separate rows before their parent and
//! referenced by id (see [`crate::fields::Nested`]). There is no transaction
//! across the graph: if a later write fails, nested rows already written stay
//! persisted. Graphs must be acyclic.

use crate::identity::StorableIdentity;
use objectstore_core::{Error, Primitive, Result, StoreObjectMetadata};
use objectstore_engine::{ObjectStore, StoreObject, StoreObjectQuery};
use tracing::{debug, warn};
use uuid::Uuid;

/// A domain object mapped onto one object table
pub trait Storable {
    /// Identity of this object
    fn identity(&self) -> &StorableIdentity;

    /// Declare this type's fields on the store
    ///
    /// Called by [`Storable::create_object_table`] after the table exists.
    fn create_fields(&self, _store: &dyn ObjectStore, _if_not_exists: bool) -> Result<()> {
        Ok(())
    }

    /// Write this object's fields into a field container
    fn store_fields(&self, _object: &StoreObject) -> Result<()> {
        Ok(())
    }

    /// Read this object's fields back from a retrieved field container
    fn revive_fields(&mut self, _object: &StoreObject) -> Result<()> {
        Ok(())
    }

    /// Class (object table) name
    fn class_name(&self) -> &str {
        self.identity().class_name()
    }

    /// Identifier, `None` until first stored
    fn id(&self) -> Option<Uuid> {
        self.identity().id()
    }

    /// Create the object table and declare the fields
    ///
    /// With `if_not_exists`, repeating the call is a no-op.
    fn create_object_table(
        &self,
        store: &dyn ObjectStore,
        if_not_exists: bool,
    ) -> Result<StoreObjectMetadata> {
        store.create_object_table(self.class_name(), if_not_exists)?;
        self.create_fields(store, if_not_exists)?;
        store.metadata(self.class_name())
    }

    /// Store this object and record the id and timestamp the store assigned
    ///
    /// # Errors
    ///
    /// - `Conflict` if the object is marked "if not exists" and its row
    ///   already exists; the identity is left unchanged
    /// - any error from the field hooks or the backing store
    fn store_to(&self, store: &dyn ObjectStore) -> Result<Uuid> {
        let identity = self.identity();
        let object = store.create_store_object(self.class_name(), identity.id())?;
        object.set_last_modified(identity.last_modified())?;
        object.set_consistency(identity.write_consistency())?;
        if identity.is_if_not_exists() {
            object.set_if_not_exists(true)?;
        }
        self.store_fields(&object)?;

        let result = object.store()?;
        if !result.is_success() {
            warn!(
                target: "objectstore::mapping",
                class = self.class_name(),
                id = ?identity.id(),
                "Store rejected, object already exists"
            );
            return Err(Error::Conflict {
                class_name: self.class_name().to_string(),
                items: result.into_items(),
            });
        }

        let id = object
            .id()
            .ok_or_else(|| Error::store("store did not report an id"))?;
        identity.set_id(Some(id));
        identity.set_last_modified(object.last_modified());
        debug!(target: "objectstore::mapping", class = self.class_name(), %id, "Stored object");
        Ok(id)
    }

    /// Delete this object's row
    ///
    /// # Errors
    ///
    /// Returns an argument error if the object has no id.
    fn delete_from(&self, store: &dyn ObjectStore) -> Result<()> {
        let id = self
            .id()
            .ok_or_else(|| Error::invalid_argument("id cannot be empty to delete"))?;
        store.delete(self.class_name(), id, self.identity().write_consistency())
    }

    /// Query over this object's table
    fn create_query(&self, store: &dyn ObjectStore) -> Result<StoreObjectQuery> {
        let mut query = store.create_query(self.class_name(), None)?;
        query.set_consistency(self.identity().read_consistency());
        Ok(query)
    }

    /// Ids stored in this object's table
    fn retrieve_ids(&self, store: &dyn ObjectStore, limit: Option<usize>) -> Result<Vec<Uuid>> {
        store.retrieve_ids(self.class_name(), limit, self.identity().read_consistency())
    }

    /// Load identity and fields from a retrieved field container
    fn revive_from(&mut self, object: &StoreObject) -> Result<()> {
        let identity = self.identity();
        identity.set_id(object.id());
        identity.set_last_modified(object.last_modified());
        object.set_consistency(identity.read_consistency())?;
        self.revive_fields(object)
    }

    /// Reload this object from the row with the given id
    ///
    /// # Errors
    ///
    /// Returns a store error if no row has that id.
    fn revive(&mut self, store: &dyn ObjectStore, id: Uuid) -> Result<()> {
        let mut query = store.create_query(self.class_name(), Some(id))?;
        query.set_consistency(self.identity().read_consistency());
        let object = query
            .execute()?
            .into_iter()
            .next()
            .ok_or_else(|| Error::store(format!("no store objects found for id={}", id)))?;
        self.revive_from(&object)
    }

    /// Revive a new instance of this type for every row the query returns
    ///
    /// Instances are built through [`Revivable::construct`] with the class
    /// name as the hint, falling back to the argument-free constructor.
    fn revive_query(&self, query: &mut StoreObjectQuery) -> Result<Vec<Self>>
    where
        Self: Revivable + Sized,
    {
        query.set_consistency(self.identity().read_consistency());
        let hint = Primitive::Text(self.class_name().to_string());
        let mut revived = Vec::new();
        for object in query.execute()? {
            let mut instance = instantiate::<Self>(ConstructHint::With(&hint))?;
            instance.identity().set_read_consistency(self.identity().read_consistency());
            instance.revive_from(&object)?;
            revived.push(instance);
        }
        debug!(
            target: "objectstore::mapping",
            class = self.class_name(),
            count = revived.len(),
            "Revived objects"
        );
        Ok(revived)
    }

    /// Revive every row of this object's table
    fn revive_all(&self, store: &dyn ObjectStore) -> Result<Vec<Self>>
    where
        Self: Revivable + Sized,
    {
        let mut query = self.create_query(store)?;
        self.revive_query(&mut query)
    }
}

/// Argument offered to [`Revivable::construct`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstructHint<'a> {
    /// Construct from one argument
    With(&'a Primitive),
    /// Construct without arguments
    Without,
}

/// A storable type that can construct fresh instances of itself
///
/// `construct` returns `None` when the type has no constructor for the
/// offered hint. [`instantiate`] then retries with
/// [`ConstructHint::Without`]; a type that refuses both cannot be revived.
pub trait Revivable: Storable + Sized {
    /// Build an empty instance ready to be revived
    fn construct(hint: ConstructHint<'_>) -> Option<Self>;
}

/// Construct an instance, preferring the one-argument form
///
/// # Errors
///
/// Returns `Instantiation` if the type accepts neither form.
pub fn instantiate<T: Revivable>(hint: ConstructHint<'_>) -> Result<T> {
    let instance = match hint {
        ConstructHint::With(_) => T::construct(hint).or_else(|| T::construct(ConstructHint::Without)),
        ConstructHint::Without => T::construct(ConstructHint::Without),
    };
    instance.ok_or(Error::Instantiation {
        type_name: std::any::type_name::<T>(),
    })
}

/// Construct one instance per hint
pub fn instantiate_all<'a, T: Revivable>(
    hints: impl IntoIterator<Item = &'a Primitive>,
) -> Result<Vec<T>> {
    hints
        .into_iter()
        .map(|h| instantiate(ConstructHint::With(h)))
        .collect()
}

/// Construct a fresh instance and revive it from the row with the given id
pub fn create_and_revive<T: Revivable>(store: &dyn ObjectStore, id: Uuid) -> Result<T> {
    let mut instance = instantiate::<T>(ConstructHint::Without)?;
    instance.revive(store, id)?;
    Ok(instance)
}
