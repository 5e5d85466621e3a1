mod support;

use std::sync::Arc;
use std::thread;

use serde_json::json;
use worldstore::{
    keys, DocumentStore, InMemoryDocumentStore, InMemoryLockManager, Lock, LockManager,
    LogPublisher, NullTemplateSource, StateError, StateManager, UpdateSet,
};

use support::{seed_config, seed_world, shared_config};

fn shared_manager(store: &InMemoryDocumentStore) -> StateManager<InMemoryDocumentStore> {
    seed_config(store, &shared_config("demo"));
    seed_world(
        store,
        "demo",
        &json!({"counter": 0, "metadata": {"_version": 1}}),
    );
    StateManager::new(store.clone())
}

#[test]
fn counter_update_returns_post_merge_document() {
    let store = InMemoryDocumentStore::new();
    let manager = shared_manager(&store);

    let updated = manager
        .update_world_state("demo", None, UpdateSet::new().set("counter", json!(5)))
        .unwrap();

    assert_eq!(updated["counter"], json!(5));
    assert_eq!(updated["metadata"]["_version"], json!(2));
    assert!(updated["metadata"]["last_modified"].is_string());

    // The write is durable, not just the returned value.
    let stored = store.load(&keys::world("demo")).unwrap().unwrap();
    assert_eq!(stored["counter"], json!(5));
}

#[test]
fn every_successful_update_increments_version_by_one() {
    let store = InMemoryDocumentStore::new();
    let manager = shared_manager(&store);

    for round in 1..=5 {
        let updated = manager
            .update_world_state("demo", None, UpdateSet::new().set("round", json!(round)))
            .unwrap();
        assert_eq!(updated["metadata"]["_version"], json!(1 + round));
    }
}

#[test]
fn missing_world_document_is_not_found() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &shared_config("demo"));
    let manager = StateManager::new(store);

    let err = manager.get_world_state("demo", None).unwrap_err();
    assert!(matches!(err, StateError::NotFound { .. }));

    let err = manager
        .update_world_state("demo", None, UpdateSet::new().set("counter", json!(1)))
        .unwrap_err();
    assert!(matches!(err, StateError::NotFound { .. }));
}

#[test]
fn unknown_experience_is_rejected_before_touching_state() {
    let store = InMemoryDocumentStore::new();
    let manager = StateManager::new(store);
    let err = manager.get_world_state("ghost", None).unwrap_err();
    assert!(matches!(err, StateError::NotFound { .. }));
}

#[test]
fn concurrent_increments_are_fully_serialized() {
    let store = InMemoryDocumentStore::new();
    let manager = Arc::new(shared_manager(&store));

    const THREADS: usize = 8;
    const ROUNDS: usize = 5;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    manager
                        .update_world_state_with("demo", None, |current| {
                            let counter = current["counter"].as_i64().unwrap_or(0);
                            UpdateSet::new().set("counter", json!(counter + 1))
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let world = manager.get_world_state("demo", None).unwrap();
    let total = (THREADS * ROUNDS) as i64;
    assert_eq!(world["counter"], json!(total));
    assert_eq!(world["metadata"]["_version"], json!(1 + total));
}

#[test]
fn held_lock_times_out_and_leaves_document_untouched() {
    let store = InMemoryDocumentStore::new();
    let mut config = shared_config("demo");
    config["state"]["coordination"] = json!({"lock_timeout_ms": 250});
    seed_config(&store, &config);
    seed_world(
        &store,
        "demo",
        &json!({"counter": 0, "metadata": {"_version": 1}}),
    );

    let locks = InMemoryLockManager::new();
    let manager = StateManager::with_parts(
        store.clone(),
        locks.clone(),
        Box::new(LogPublisher),
        Box::new(NullTemplateSource),
    );

    // Simulate a writer that never lets go.
    let held = locks.get_lock(&keys::world("demo")).unwrap();
    assert!(held.try_lock().unwrap());

    let before = serde_json::to_string(&store.load(&keys::world("demo")).unwrap().unwrap()).unwrap();
    let err = manager
        .update_world_state("demo", None, UpdateSet::new().set("counter", json!(9)))
        .unwrap_err();
    assert!(matches!(err, StateError::LockTimeout { .. }));

    let after = serde_json::to_string(&store.load(&keys::world("demo")).unwrap().unwrap()).unwrap();
    assert_eq!(before, after);

    held.unlock().unwrap();

    // Once released, the same update goes through.
    let updated = manager
        .update_world_state("demo", None, UpdateSet::new().set("counter", json!(9)))
        .unwrap();
    assert_eq!(updated["counter"], json!(9));
}

#[test]
fn config_is_cached_across_calls() {
    let store = InMemoryDocumentStore::new();
    let manager = shared_manager(&store);

    let first = manager.load_config("demo", false).unwrap();
    let second = manager.load_config("demo", false).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let reloaded = manager.load_config("demo", true).unwrap();
    assert_eq!(*reloaded, *first);
}
