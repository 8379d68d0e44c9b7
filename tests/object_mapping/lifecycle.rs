//! Lifecycle Tests
//!
//! Table creation, conditional stores, deletes, id listings and queries
//! driven through the `Storable` provided methods.

use crate::common::*;

// ============================================================================
// Tables
// ============================================================================

#[test]
fn create_object_table_is_idempotent() {
    let store = people_store();
    let person = Person::new("", 0);
    let before = store.metadata("Person").unwrap();
    let after = person.create_object_table(&store, true).unwrap();
    assert_eq!(before, after);
    assert!(after.has_field("previous"));
}

#[test]
fn create_object_table_twice_without_flag_fails() {
    let store = people_store();
    let err = Person::new("", 0).create_object_table(&store, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

// ============================================================================
// Conditional stores
// ============================================================================

#[test]
fn if_not_exists_conflict_reports_existing_row() {
    let store = people_store();
    let original = Person::new("Ada", 36);
    let id = original.store_to(&store).unwrap();

    let duplicate = Person::new("Impostor", 1);
    duplicate.identity.set_id(Some(id));
    duplicate.identity.set_if_not_exists(true);

    match duplicate.store_to(&store) {
        Err(Error::Conflict { class_name, items }) => {
            assert_eq!(class_name, "Person");
            let keys: Vec<&str> = items.iter().map(|i| i.key()).collect();
            assert_eq!(keys, vec!["id", "lastModifiedAt"]);
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    let mut back = Person::new("", 0);
    back.revive(&store, id).unwrap();
    assert_eq!(back.name, "Ada");
}

#[test]
fn if_not_exists_on_new_object_succeeds() {
    let store = people_store();
    let person = Person::new("Fresh", 20);
    person.identity.set_if_not_exists(true);
    let id = person.store_to(&store).unwrap();
    assert_eq!(person.id(), Some(id));
}

// ============================================================================
// Deletes and ids
// ============================================================================

#[test]
fn delete_removes_row() {
    let store = people_store();
    let person = Person::new("Temp", 1);
    person.store_to(&store).unwrap();
    assert_eq!(person.retrieve_ids(&store, None).unwrap().len(), 1);

    person.delete_from(&store).unwrap();
    assert!(person.retrieve_ids(&store, None).unwrap().is_empty());
}

#[test]
fn delete_without_id_is_argument_error() {
    let store = people_store();
    let err = Person::new("Never stored", 1).delete_from(&store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn revive_query_with_filter() {
    let store = people_store();
    for (name, age) in [("a", 10), ("b", 20), ("c", 30), ("d", 40)] {
        insert_person(&store, name, age);
    }

    let template = Person::new("", 0);
    template.identity.set_read_consistency(Some(ConsistencyLevel::Quorum));
    let mut query = template.create_query(&store).unwrap();
    query
        .set_where(Where::new().greater_than_or_equal_to("age", 20).unwrap())
        .set_allow_filtering(true);

    let mut found = template.revive_query(&mut query).unwrap();
    found.sort_by_key(|p| p.age);
    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["b", "c", "d"]);
    assert!(found
        .iter()
        .all(|p| p.identity.read_consistency() == Some(ConsistencyLevel::Quorum)));
}

#[test]
fn revive_all_respects_limit() {
    let store = people_store();
    for i in 0..5 {
        insert_person(&store, &format!("p{}", i), i);
    }
    let template = Person::new("", 0);
    assert_eq!(template.revive_all(&store).unwrap().len(), 5);

    let mut query = template.create_query(&store).unwrap();
    query.set_limit(Some(2));
    assert_eq!(template.revive_query(&mut query).unwrap().len(), 2);
}

#[test]
fn store_failure_leaves_identity_untouched() {
    let store = people_store();
    store.inject_failure("coordinator unavailable");
    let person = Person::new("Unlucky", 1);
    let err = person.store_to(&store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(person.id().is_none());
    assert!(person.identity.last_modified().is_none());
}
