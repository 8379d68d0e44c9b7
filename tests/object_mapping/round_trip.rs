//! Round Trip Tests
//!
//! A person with plain, nested and collection fields is stored and revived.

use crate::common::*;
use std::collections::BTreeMap;

fn full_person() -> Person {
    let mut person = Person::new("Ada", 36);
    person.email = Some("ada@example.com".to_string());
    person.tags = vec!["math".to_string(), "engines".to_string(), "math".to_string()];
    person.nicknames = ["Countess".to_string(), "Enchantress".to_string()]
        .into_iter()
        .collect();
    person.scores = BTreeMap::from([("chess".to_string(), 1800), ("go".to_string(), 2)]);
    person.home = Some(Address::new("St James's Square", 10));
    person.previous = vec![Address::new("Ockham Park", 1), Address::new("Fordhook", 2)];
    person
}

#[test]
fn every_field_shape_survives_round_trip() {
    let store = people_store();
    let person = full_person();
    let id = person.store_to(&store).unwrap();

    let mut back = Person::construct(ConstructHint::Without).unwrap();
    back.revive(&store, id).unwrap();

    assert_eq!(back.identity, person.identity);
    assert_eq!(back.name, "Ada");
    assert_eq!(back.age, 36);
    assert_eq!(back.email.as_deref(), Some("ada@example.com"));
    assert_eq!(back.tags, person.tags);
    assert_eq!(back.nicknames, person.nicknames);
    assert_eq!(back.scores, person.scores);

    let home = back.home.expect("home revived");
    assert_eq!(home.street, "St James's Square");
    assert_eq!(home.zip, 10);
    assert_eq!(home.identity, person.home.as_ref().unwrap().identity);

    let streets: Vec<&str> = back.previous.iter().map(|a| a.street.as_str()).collect();
    assert_eq!(streets, vec!["Ockham Park", "Fordhook"]);
}

#[test]
fn nested_objects_are_stored_first() {
    let store = people_store();
    let person = full_person();
    person.store_to(&store).unwrap();

    assert_eq!(store.row_count("Address"), 3);
    assert_eq!(store.row_count("Person"), 1);
    assert!(person.home.as_ref().unwrap().id().is_some());
    assert!(person.previous.iter().all(|a| a.id().is_some()));
}

#[test]
fn absent_fields_revive_as_defaults() {
    let store = people_store();
    let id = insert_person(&store, "Grace", 85);

    let mut back = Person::new("", 0);
    back.revive(&store, id).unwrap();
    assert_eq!(back.name, "Grace");
    assert_eq!(back.email, None);
    assert!(back.tags.is_empty());
    assert!(back.nicknames.is_empty());
    assert!(back.scores.is_empty());
    assert!(back.home.is_none());
    assert!(back.previous.is_empty());
}

#[test]
fn restore_updates_same_row() {
    let store = people_store();
    let mut person = Person::new("Alan", 41);
    let id = person.store_to(&store).unwrap();
    let first_stamp = person.identity.last_modified();

    person.age = 42;
    person.email = Some("alan@example.com".to_string());
    assert_eq!(person.store_to(&store).unwrap(), id);
    assert_eq!(store.row_count("Person"), 1);
    assert!(person.identity.last_modified() >= first_stamp);

    let mut back = Person::new("", 0);
    back.revive(&store, id).unwrap();
    assert_eq!(back.age, 42);
    assert_eq!(back.email.as_deref(), Some("alan@example.com"));
}

#[test]
fn revive_missing_row_fails() {
    let store = people_store();
    let mut person = Person::new("", 0);
    let err = person.revive(&store, Uuid::new_v4()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}
