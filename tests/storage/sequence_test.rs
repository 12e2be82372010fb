//! Sequence counter tests

use certify_server::storage::SqliteStore;
use certify_server::traits::SequenceStore;

use crate::common::*;

fn allocates_from_one(store: &dyn SequenceStore) {
    assert_eq!(store.current().unwrap(), None);
    assert_eq!(store.allocate_next().unwrap(), 1);
    assert_eq!(store.allocate_next().unwrap(), 2);
    assert_eq!(store.allocate_next().unwrap(), 3);
    assert_eq!(store.current().unwrap(), Some(3));
}

#[test]
fn test_sqlite_allocates_from_one() {
    let (_dir, store) = sqlite_store();
    allocates_from_one(store.as_ref());
}

#[test]
fn test_memory_allocates_from_one() {
    let store = seeded_memory_store();
    allocates_from_one(store.as_ref());
}

#[test]
fn test_sqlite_counter_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("certify.db");

    {
        let store = SqliteStore::new(&path).unwrap();
        store.initialize().unwrap();
        for _ in 0..3 {
            store.allocate_next().unwrap();
        }
    }

    let store = SqliteStore::new(&path).unwrap();
    store.initialize().unwrap();
    assert_eq!(store.current().unwrap(), Some(3));
    assert_eq!(store.allocate_next().unwrap(), 4);
}

#[test]
fn test_memory_injected_failure_consumes_nothing() {
    let store = seeded_memory_store();
    store.fail_next_allocation();

    assert!(store.allocate_next().is_err());
    assert_eq!(store.current().unwrap(), None);
    assert_eq!(store.allocate_next().unwrap(), 1);
}
