mod support;

use serde_json::json;
use worldstore::{InMemoryDocumentStore, StateError, StateManager, UpdateSet};

use support::{isolated_config, seed_config, seed_world_template, shared_config};

#[test]
fn shared_bootstrap_seeds_from_config() {
    let store = InMemoryDocumentStore::new();
    let mut config = shared_config("demo");
    config["bootstrap"] = json!({
        "starting_location": "spawn",
        "starting_inventory": ["torch"]
    });
    seed_config(&store, &config);
    let manager = StateManager::new(store);

    let view = manager.bootstrap_player("demo", "alice").unwrap();
    assert_eq!(view["player"]["location"], json!("spawn"));
    assert_eq!(view["player"]["inventory"], json!(["torch"]));
    assert_eq!(view["progress"]["visited_locations"], json!([]));
    assert_eq!(view["session"]["turns_taken"], json!(0));
    assert_eq!(view["metadata"]["_version"], json!(1));
}

#[test]
fn isolated_bootstrap_seeds_inventory_scenario() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &isolated_config("demo-iso"));
    seed_world_template(
        &store,
        "demo-iso",
        &json!({
            "player": {"location": "spawn", "inventory": ["torch"]},
            "areas": {"spawn": {"name": "The Landing"}}
        }),
    );
    let manager = StateManager::new(store);

    let view = manager.bootstrap_player("demo-iso", "alice").unwrap();
    assert_eq!(view["player"]["inventory"], json!(["torch"]));
    assert_eq!(view["areas"]["spawn"]["name"], json!("The Landing"));
    assert!(view["session"]["id"]
        .as_str()
        .unwrap()
        .starts_with("alice-"));
    assert!(view["session"]["started_at"].is_string());
    assert_eq!(view["metadata"]["_version"], json!(1));
    assert_eq!(view["metadata"]["_user_id"], json!("alice"));
    assert_eq!(
        view["metadata"]["_copied_from_template"],
        json!("template:demo-iso")
    );
}

#[test]
fn bootstrap_is_idempotent() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &shared_config("demo"));
    let manager = StateManager::new(store);

    let first = manager.bootstrap_player("demo", "alice").unwrap();
    let second = manager.bootstrap_player("demo", "alice").unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn repeated_bootstrap_does_not_reset_progress() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &shared_config("demo"));
    let manager = StateManager::new(store);

    manager.bootstrap_player("demo", "alice").unwrap();
    manager
        .update_player_view(
            "demo",
            "alice",
            UpdateSet::new().merge_object(
                "progress",
                UpdateSet::new().append("visited_locations", json!("cave")),
            ),
        )
        .unwrap();

    let again = manager.bootstrap_player("demo", "alice").unwrap();
    assert_eq!(again["progress"]["visited_locations"], json!(["cave"]));
    assert_eq!(again["metadata"]["_version"], json!(2));
}

#[test]
fn missing_template_fails_isolated_bootstrap() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &isolated_config("demo-iso"));
    let manager = StateManager::new(store);

    let err = manager.bootstrap_player("demo-iso", "alice").unwrap_err();
    assert!(matches!(err, StateError::NotFound { .. }));
}

#[test]
fn get_player_view_before_bootstrap_is_none() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &shared_config("demo"));
    let manager = StateManager::new(store);

    assert!(manager.get_player_view("demo", "alice").unwrap().is_none());
}

#[test]
fn update_player_view_before_bootstrap_is_not_found() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &shared_config("demo"));
    let manager = StateManager::new(store);

    let err = manager
        .update_player_view("demo", "alice", UpdateSet::new().set("x", json!(1)))
        .unwrap_err();
    assert!(matches!(err, StateError::NotFound { .. }));
}

#[test]
fn isolated_world_state_requires_a_user() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &isolated_config("demo-iso"));
    let manager = StateManager::new(store);

    let err = manager.get_world_state("demo-iso", None).unwrap_err();
    assert!(matches!(err, StateError::ConfigValidation(_)));

    let err = manager
        .update_world_state("demo-iso", None, UpdateSet::new().set("x", json!(1)))
        .unwrap_err();
    assert!(matches!(err, StateError::ConfigValidation(_)));
}

#[test]
fn isolated_world_state_is_the_player_view() {
    let store = InMemoryDocumentStore::new();
    seed_config(&store, &isolated_config("demo-iso"));
    seed_world_template(&store, "demo-iso", &json!({"counter": 0}));
    let manager = StateManager::new(store);

    manager.bootstrap_player("demo-iso", "alice").unwrap();
    let updated = manager
        .update_world_state(
            "demo-iso",
            Some("alice"),
            UpdateSet::new().set("counter", json!(3)),
        )
        .unwrap();
    assert_eq!(updated["counter"], json!(3));
    assert_eq!(updated["metadata"]["_version"], json!(2));

    // Same document through both entry points.
    let view = manager.get_player_view("demo-iso", "alice").unwrap().unwrap();
    assert_eq!(view["counter"], json!(3));
    let world = manager.get_world_state("demo-iso", Some("alice")).unwrap();
    assert_eq!(world, view);

    // Another player bootstraps their own untouched copy.
    let bob = manager.bootstrap_player("demo-iso", "bob").unwrap();
    assert_eq!(bob["counter"], json!(0));
}
