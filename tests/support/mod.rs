//! Shared fixtures for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use worldstore::{keys, DocumentStore, InMemoryDocumentStore};

/// A minimal valid shared-model experience config.
pub fn shared_config(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Test Experience",
        "version": "1.0.0",
        "state": {"model": "shared"}
    })
}

/// A minimal valid isolated-model experience config.
pub fn isolated_config(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Test Experience",
        "version": "1.0.0",
        "state": {
            "model": "isolated",
            "coordination": {"locking_enabled": false}
        }
    })
}

pub fn seed_config(store: &InMemoryDocumentStore, config: &Value) {
    let id = config["id"].as_str().expect("config id");
    store.save(&keys::config(id), config).unwrap();
}

pub fn seed_world(store: &InMemoryDocumentStore, experience: &str, doc: &Value) {
    store.save(&keys::world(experience), doc).unwrap();
}

pub fn seed_world_template(store: &InMemoryDocumentStore, experience: &str, doc: &Value) {
    store.save(&keys::world_template(experience), doc).unwrap();
}
