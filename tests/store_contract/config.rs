//! Configuration Tests

use crate::common::*;
use objectstore::CONFIG_FILE_NAME;
use std::fs;

#[test]
fn default_config_written_once_and_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    StoreConfig::write_default_if_missing(&path).unwrap();
    let config = StoreConfig::from_file(&path).unwrap();
    assert_eq!(config, StoreConfig::default());
    assert_eq!(config.read_consistency().unwrap(), ConsistencyLevel::One);
}

#[test]
fn store_uses_configured_query_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &path,
        "default_read_consistency = \"QUORUM\"\n\
         default_write_consistency = \"ALL\"\n\
         default_query_limit = 2\n\
         require_allow_filtering = false\n",
    )
    .unwrap();

    let store = MemoryObjectStore::with_config(StoreConfig::from_file(&path).unwrap()).unwrap();
    store.create_object_table("Row", true).unwrap();
    for _ in 0..3 {
        store.create_store_object("Row", None).unwrap().store().unwrap();
    }
    let query = store.create_query("Row", None).unwrap();
    assert_eq!(query.execute().unwrap().len(), 2);
}

#[test]
fn unknown_consistency_rejected() {
    let config = StoreConfig {
        default_read_consistency: "SOMETIMES".to_string(),
        ..StoreConfig::default()
    };
    assert!(MemoryObjectStore::with_config(config).is_err());
}
