//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Once;

pub use objectstore::fields::{
    create_field, create_list_field, create_map_field, create_set_field, revive_field,
    revive_list_field, revive_map_field, revive_set_field, store_field, store_list_field,
    store_map_field, store_set_field,
};
pub use objectstore::{
    ConsistencyLevel, ConstructHint, Error, ErrorKind, MemoryObjectStore, Nested, ObjectStore,
    Plain, Primitive, PrimitiveType, Result, Revivable, Storable, StorableIdentity, StoreConfig,
    StoreObject, Uuid, Where,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Domain types
// ============================================================================

/// Leaf object stored on its own and referenced by id from `Person`.
#[derive(Debug, Clone)]
pub struct Address {
    pub identity: StorableIdentity,
    pub street: String,
    pub zip: i32,
}

impl Address {
    pub fn new(street: &str, zip: i32) -> Self {
        Address {
            identity: StorableIdentity::new("Address").unwrap(),
            street: street.to_string(),
            zip,
        }
    }
}

impl Storable for Address {
    fn identity(&self) -> &StorableIdentity {
        &self.identity
    }

    fn create_fields(&self, store: &dyn ObjectStore, if_not_exists: bool) -> Result<()> {
        create_field::<Plain<String>>(store, self.class_name(), "street", if_not_exists)?;
        create_field::<Plain<i32>>(store, self.class_name(), "zip", if_not_exists)
    }

    fn store_fields(&self, object: &StoreObject) -> Result<()> {
        store_field::<Plain<String>>(object, "street", Some(&self.street))?;
        store_field::<Plain<i32>>(object, "zip", Some(&self.zip))?;
        Ok(())
    }

    fn revive_fields(&mut self, object: &StoreObject) -> Result<()> {
        self.street = revive_field::<Plain<String>>(object, "street")?.unwrap_or_default();
        self.zip = revive_field::<Plain<i32>>(object, "zip")?.unwrap_or_default();
        Ok(())
    }
}

impl Revivable for Address {
    fn construct(_hint: ConstructHint<'_>) -> Option<Self> {
        Some(Address::new("", 0))
    }
}

/// Object with every field shape: plain, nested, list, set and map.
#[derive(Debug, Clone)]
pub struct Person {
    pub identity: StorableIdentity,
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub nicknames: BTreeSet<String>,
    pub scores: BTreeMap<String, i64>,
    pub home: Option<Address>,
    pub previous: Vec<Address>,
}

impl Person {
    pub fn new(name: &str, age: i32) -> Self {
        Person {
            identity: StorableIdentity::new("Person").unwrap(),
            name: name.to_string(),
            age,
            email: None,
            tags: Vec::new(),
            nicknames: BTreeSet::new(),
            scores: BTreeMap::new(),
            home: None,
            previous: Vec::new(),
        }
    }
}

impl Storable for Person {
    fn identity(&self) -> &StorableIdentity {
        &self.identity
    }

    fn create_fields(&self, store: &dyn ObjectStore, if_not_exists: bool) -> Result<()> {
        let class = self.class_name();
        create_field::<Plain<String>>(store, class, "name", if_not_exists)?;
        create_field::<Plain<i32>>(store, class, "age", if_not_exists)?;
        create_field::<Plain<String>>(store, class, "email", if_not_exists)?;
        create_list_field::<Plain<String>>(store, class, "tags", if_not_exists)?;
        create_set_field::<Plain<String>>(store, class, "nicknames", if_not_exists)?;
        create_map_field::<Plain<String>, Plain<i64>>(store, class, "scores", if_not_exists)?;
        create_field::<Nested<Address>>(store, class, "home", if_not_exists)?;
        create_list_field::<Nested<Address>>(store, class, "previous", if_not_exists)
    }

    fn store_fields(&self, object: &StoreObject) -> Result<()> {
        store_field::<Plain<String>>(object, "name", Some(&self.name))?;
        store_field::<Plain<i32>>(object, "age", Some(&self.age))?;
        store_field::<Plain<String>>(object, "email", self.email.as_ref())?;
        store_list_field::<Plain<String>, _>(object, "tags", &self.tags)?;
        store_set_field::<Plain<String>, _>(object, "nicknames", &self.nicknames)?;
        store_map_field::<Plain<String>, Plain<i64>, _>(object, "scores", &self.scores)?;
        store_field::<Nested<Address>>(object, "home", self.home.as_ref())?;
        store_list_field::<Nested<Address>, _>(object, "previous", &self.previous)?;
        Ok(())
    }

    fn revive_fields(&mut self, object: &StoreObject) -> Result<()> {
        self.name = revive_field::<Plain<String>>(object, "name")?.unwrap_or_default();
        self.age = revive_field::<Plain<i32>>(object, "age")?.unwrap_or_default();
        self.email = revive_field::<Plain<String>>(object, "email")?;
        self.tags = revive_list_field::<Plain<String>, _>(object, "tags")?.unwrap_or_default();
        self.nicknames =
            revive_set_field::<Plain<String>, _>(object, "nicknames")?.unwrap_or_default();
        self.scores =
            revive_map_field::<Plain<String>, Plain<i64>, _>(object, "scores")?.unwrap_or_default();
        self.home = revive_field::<Nested<Address>>(object, "home")?;
        self.previous =
            revive_list_field::<Nested<Address>, _>(object, "previous")?.unwrap_or_default();
        Ok(())
    }
}

impl Revivable for Person {
    fn construct(_hint: ConstructHint<'_>) -> Option<Self> {
        Some(Person::new("", 0))
    }
}

// ============================================================================
// Store setup
// ============================================================================

/// In-memory store with the Person and Address tables created.
pub fn people_store() -> MemoryObjectStore {
    init_tracing();
    let store = MemoryObjectStore::new();
    Address::new("", 0).create_object_table(&store, true).unwrap();
    Person::new("", 0).create_object_table(&store, true).unwrap();
    store
}

/// Store and return a person with just a name and age.
pub fn insert_person(store: &MemoryObjectStore, name: &str, age: i32) -> Uuid {
    Person::new(name, age).store_to(store).unwrap()
}
