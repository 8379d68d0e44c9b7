//! Query Tests

use crate::common::*;
use proptest::prelude::*;

fn scored_store(scores: &[i64]) -> MemoryObjectStore {
    init_tracing();
    let store = MemoryObjectStore::new();
    store.create_object_table("Score", true).unwrap();
    store
        .add_primitive_field("Score", "points", PrimitiveType::Long, true)
        .unwrap();
    store
        .add_primitive_field("Score", "player", PrimitiveType::Text, true)
        .unwrap();
    for (i, points) in scores.iter().enumerate() {
        let object = store.create_store_object("Score", None).unwrap();
        object.put("points", *points).unwrap();
        object.put("player", format!("p{}", i)).unwrap();
        object.store().unwrap();
    }
    store
}

fn points_matching(store: &MemoryObjectStore, filter: Where) -> Vec<i64> {
    let mut query = store.create_query("Score", None).unwrap();
    query.set_where(filter).set_allow_filtering(true);
    let mut points: Vec<i64> = query
        .execute()
        .unwrap()
        .iter()
        .map(|o| o.get_long("points").unwrap())
        .collect();
    points.sort_unstable();
    points
}

#[test]
fn membership_relation() {
    let store = scored_store(&[1, 2, 3, 4, 5]);
    let filter = Where::new().is_in("points", vec![2i64, 4, 9]).unwrap();
    assert_eq!(points_matching(&store, filter), vec![2, 4]);
}

#[test]
fn conjunction_of_ranges() {
    let store = scored_store(&[1, 2, 3, 4, 5]);
    let filter = Where::new()
        .greater_than("points", 1i64)
        .unwrap()
        .less_than_or_equal_to("points", 4i64)
        .unwrap();
    assert_eq!(points_matching(&store, filter), vec![2, 3, 4]);
}

#[test]
fn relation_on_text_field() {
    let store = scored_store(&[10, 20]);
    let filter = Where::new().equal_to("player", "p1").unwrap();
    assert_eq!(points_matching(&store, filter), vec![20]);
}

#[test]
fn id_relation_needs_no_filtering_flag() {
    let store = scored_store(&[7]);
    let id = store.retrieve_ids("Score", None, None).unwrap()[0];
    let mut query = store.create_query("Score", None).unwrap();
    query.set_where(Where::new().equal_to("id", id).unwrap());
    assert_eq!(query.execute().unwrap().len(), 1);
}

#[test]
fn non_key_relation_requires_filtering_flag() {
    let store = scored_store(&[7]);
    let mut query = store.create_query("Score", None).unwrap();
    query.set_where(Where::new().equal_to("points", 7i64).unwrap());
    assert_eq!(query.execute().unwrap_err().kind(), ErrorKind::Argument);
}

#[test]
fn unknown_relation_field() {
    let store = scored_store(&[7]);
    let mut query = store.create_query("Score", None).unwrap();
    query
        .set_where(Where::new().equal_to("rank", 1i64).unwrap())
        .set_allow_filtering(true);
    assert_eq!(query.execute().unwrap_err().kind(), ErrorKind::Schema);
}

#[test]
fn empty_identifier_rejected() {
    assert_eq!(
        Where::new().equal_to("", 1i64).unwrap_err().kind(),
        ErrorKind::Argument
    );
}

#[test]
fn query_limit_and_id_listing_limit() {
    let store = scored_store(&[1, 2, 3, 4]);
    let mut query = store.create_query("Score", None).unwrap();
    query.set_limit(Some(3));
    assert_eq!(query.execute().unwrap().len(), 3);
    assert_eq!(store.retrieve_ids("Score", Some(1), None).unwrap().len(), 1);
}

proptest! {
    #[test]
    fn membership_matches_model(
        scores in prop::collection::vec(0i64..10, 0..10),
        wanted in prop::collection::vec(0i64..10, 1..4),
    ) {
        let store = scored_store(&scores);
        let filter = Where::new().is_in("points", wanted.clone()).unwrap();
        let mut expected: Vec<i64> =
            scores.iter().copied().filter(|s| wanted.contains(s)).collect();
        expected.sort_unstable();
        prop_assert_eq!(points_matching(&store, filter), expected);
    }
}
