//! Identity carried by every domain object

use objectstore_core::{validate_name, ConsistencyLevel, DateTime, Result, Utc};
use parking_lot::RwLock;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct IdentityState {
    id: Option<Uuid>,
    last_modified: Option<DateTime<Utc>>,
    read_consistency: Option<ConsistencyLevel>,
    write_consistency: Option<ConsistencyLevel>,
    if_not_exists: bool,
}

/// Class name plus the mutable identity of one domain object
///
/// The id and timestamp are written back by `store_to` through a shared
/// reference, so nested objects held in sets and map keys can be stored in
/// place. Two identities are equal when class name and id are equal.
///
/// No `Hash` impl: the id changes on first store. Domain types used as set
/// elements or map keys hash their own fields.
pub struct StorableIdentity {
    class_name: String,
    state: RwLock<IdentityState>,
}

impl StorableIdentity {
    /// Identity for a new object of the given class
    ///
    /// # Errors
    ///
    /// Returns an argument error if the class name is not a valid identifier.
    pub fn new(class_name: impl Into<String>) -> Result<Self> {
        let class_name = class_name.into();
        validate_name("className", &class_name)?;
        Ok(StorableIdentity {
            class_name,
            state: RwLock::new(IdentityState::default()),
        })
    }

    /// Identity for an object already known by id
    pub fn with_id(class_name: impl Into<String>, id: Uuid) -> Result<Self> {
        let identity = Self::new(class_name)?;
        identity.set_id(Some(id));
        Ok(identity)
    }

    /// Class (object table) name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Identifier, `None` until first stored
    pub fn id(&self) -> Option<Uuid> {
        self.state.read().id
    }

    /// Set the identifier
    pub fn set_id(&self, id: Option<Uuid>) {
        self.state.write().id = id;
    }

    /// Last-modified timestamp reported by the store
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_modified
    }

    /// Set the last-modified timestamp
    pub fn set_last_modified(&self, at: Option<DateTime<Utc>>) {
        self.state.write().last_modified = at;
    }

    /// Consistency used for revives, queries and id listings
    pub fn read_consistency(&self) -> Option<ConsistencyLevel> {
        self.state.read().read_consistency
    }

    /// Set the read consistency
    pub fn set_read_consistency(&self, level: Option<ConsistencyLevel>) {
        self.state.write().read_consistency = level;
    }

    /// Consistency used for stores and deletes
    pub fn write_consistency(&self) -> Option<ConsistencyLevel> {
        self.state.read().write_consistency
    }

    /// Set the write consistency
    pub fn set_write_consistency(&self, level: Option<ConsistencyLevel>) {
        self.state.write().write_consistency = level;
    }

    /// Check if stores are conditional on the row not existing yet
    pub fn is_if_not_exists(&self) -> bool {
        self.state.read().if_not_exists
    }

    /// Make stores conditional on the row not existing yet
    pub fn set_if_not_exists(&self, if_not_exists: bool) {
        self.state.write().if_not_exists = if_not_exists;
    }
}

impl Clone for StorableIdentity {
    fn clone(&self) -> Self {
        StorableIdentity {
            class_name: self.class_name.clone(),
            state: RwLock::new(self.state.read().clone()),
        }
    }
}

impl PartialEq for StorableIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name && self.id() == other.id()
    }
}

impl Eq for StorableIdentity {}

impl fmt::Debug for StorableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("StorableIdentity")
            .field("class_name", &self.class_name)
            .field("id", &state.id)
            .field("last_modified", &state.last_modified)
            .field("if_not_exists", &state.if_not_exists)
            .finish()
    }
}
