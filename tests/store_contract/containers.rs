//! Field Container Tests

use crate::common::*;
use objectstore::{FieldType, ObjectState, Value};

fn task_store() -> MemoryObjectStore {
    init_tracing();
    let store = MemoryObjectStore::new();
    store.create_object_table("Task", false).unwrap();
    store
        .add_primitive_field("Task", "title", PrimitiveType::Text, false)
        .unwrap();
    store
        .add_primitive_field("Task", "priority", PrimitiveType::Int, false)
        .unwrap();
    store
        .add_primitive_field("Task", "done", PrimitiveType::Boolean, false)
        .unwrap();
    store
}

#[test]
fn field_type_is_pinned_by_first_put() {
    let store = task_store();
    let object = store.create_store_object("Task", None).unwrap();
    object
        .put_primitive("scratch", PrimitiveType::Long, Some(Primitive::Long(1)))
        .unwrap();
    let err = object
        .put_primitive("scratch", PrimitiveType::Text, Some(Primitive::from("x")))
        .unwrap_err();
    assert!(matches!(err, Error::TypeAlreadyBound { .. }));

    object.put_primitive("scratch", PrimitiveType::Long, None).unwrap();
    assert_eq!(
        object.field_type_of("scratch"),
        Some(FieldType::Primitive(PrimitiveType::Long))
    );
}

#[test]
fn unset_numeric_fields_read_as_defaults() {
    let store = task_store();
    let object = store.create_store_object("Task", None).unwrap();
    assert_eq!(object.get_int("priority").unwrap(), 0);
    assert!(!object.get_boolean("done").unwrap());
    assert_eq!(object.get_string("title").unwrap(), None);
    assert!(!object.contains("priority"));
}

#[test]
fn undeclared_and_mistyped_puts_rejected() {
    let store = task_store();
    let object = store.create_store_object("Task", None).unwrap();
    assert_eq!(object.put("owner", "me").unwrap_err().kind(), ErrorKind::Schema);
    assert_eq!(object.put("priority", "high").unwrap_err().kind(), ErrorKind::Type);
    assert_eq!(object.put("id", Uuid::new_v4()).unwrap_err().kind(), ErrorKind::Argument);
}

#[test]
fn store_is_single_shot() {
    let store = task_store();
    let object = store.create_store_object("Task", None).unwrap();
    object.put("title", "write tests").unwrap();
    assert_eq!(object.state(), ObjectState::Populated);

    let result = object.store().unwrap();
    assert!(result.is_success());
    assert!(result.items().is_empty());
    assert_eq!(object.state(), ObjectState::Terminal);
    assert!(object.id().is_some());
    assert!(object.last_modified().is_some());

    assert_eq!(object.store().unwrap_err().kind(), ErrorKind::State);
    assert_eq!(object.put("title", "again").unwrap_err().kind(), ErrorKind::State);
}

#[test]
fn reset_clears_stored_column() {
    let store = task_store();
    let object = store.create_store_object("Task", None).unwrap();
    object.put("title", "temporary").unwrap();
    object.store().unwrap();
    let id = object.id().unwrap();

    let update = store.create_store_object("Task", Some(id)).unwrap();
    update.reset("title").unwrap();
    update.store().unwrap();

    let rows = store.create_query("Task", Some(id)).unwrap().execute().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_string("title").unwrap(), None);
}

#[test]
fn conditional_write_returns_failed_result() {
    let store = task_store();
    let first = store.create_store_object("Task", None).unwrap();
    first.put("title", "original").unwrap();
    first.store().unwrap();
    let id = first.id().unwrap();

    let second = store.create_store_object("Task", Some(id)).unwrap();
    second.set_if_not_exists(true).unwrap();
    second.put("title", "overwrite").unwrap();
    let result = second.store().unwrap();
    assert!(!result.is_success());
    assert!(result.item("id").is_some());

    let rows = store.create_query("Task", Some(id)).unwrap().execute().unwrap();
    assert_eq!(rows[0].get_string("title").unwrap().as_deref(), Some("original"));
}

#[test]
fn retrieved_rows_carry_values() {
    let store = task_store();
    let object = store.create_store_object("Task", None).unwrap();
    object.put("title", "ship").unwrap();
    object.put("priority", 3i32).unwrap();
    object.put("done", true).unwrap();
    object.store().unwrap();

    let rows = store
        .create_query("Task", object.id())
        .unwrap()
        .execute()
        .unwrap();
    let row = &rows[0];
    assert_eq!(row.id(), object.id());
    assert_eq!(row.get_int("priority").unwrap(), 3);
    assert!(row.get_boolean("done").unwrap());
    assert_eq!(row.get("title"), Some(Value::from("ship".to_string())));
}
