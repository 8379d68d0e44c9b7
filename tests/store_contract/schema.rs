//! Schema Evolution Tests

use crate::common::*;
use objectstore::CollectionKind;

#[test]
fn tables_are_listed_and_dropped() {
    let store = MemoryObjectStore::new();
    store.create_object_table("Alpha", false).unwrap();
    store.create_object_table("Beta", false).unwrap();
    let mut names = store.class_names();
    names.sort();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    assert!(store.drop_object_table("Alpha", false).unwrap().is_some());
    assert!(store.drop_object_table("Alpha", true).unwrap().is_none());
    assert!(store.drop_object_table("Alpha", false).is_err());
}

#[test]
fn invalid_class_and_field_names() {
    let store = MemoryObjectStore::new();
    assert_eq!(
        store.create_object_table("bad name", true).unwrap_err().kind(),
        ErrorKind::Argument
    );
    store.create_object_table("Good", true).unwrap();
    assert_eq!(
        store
            .add_primitive_field("Good", "first-name", PrimitiveType::Text, true)
            .unwrap_err()
            .kind(),
        ErrorKind::Argument
    );
}

#[test]
fn identity_fields_are_fixed() {
    let store = MemoryObjectStore::new();
    store.create_object_table("Fixed", true).unwrap();
    assert!(store.drop_field("Fixed", "id").is_err());
    assert!(store
        .change_field_type("Fixed", "lastModifiedAt", PrimitiveType::Long)
        .is_err());
}

#[test]
fn dropped_field_data_is_gone() {
    let store = MemoryObjectStore::new();
    store.create_object_table("Doc", true).unwrap();
    store
        .add_primitive_field("Doc", "body", PrimitiveType::Text, true)
        .unwrap();
    let object = store.create_store_object("Doc", None).unwrap();
    object.put("body", "hello").unwrap();
    object.store().unwrap();

    store.drop_field("Doc", "body").unwrap();
    store
        .add_primitive_field("Doc", "body", PrimitiveType::Text, true)
        .unwrap();
    let rows = store.create_query("Doc", object.id()).unwrap().execute().unwrap();
    assert_eq!(rows[0].get_string("body").unwrap(), None);
}

#[test]
fn collection_field_shape_is_declared() {
    let store = MemoryObjectStore::new();
    store.create_object_table("Bag", true).unwrap();
    let meta = store
        .add_collection_field(
            "Bag",
            "counts",
            CollectionKind::Map,
            PrimitiveType::Text,
            Some(PrimitiveType::Long),
            true,
        )
        .unwrap();
    let field = meta.field("counts").unwrap();
    assert!(field.is_map());
    assert!(field.is_valid_collection(
        CollectionKind::Map,
        PrimitiveType::Text,
        Some(PrimitiveType::Long)
    ));
}
