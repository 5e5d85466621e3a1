use chrono::Utc;
use serde_json::{json, Map, Value};

use super::manager::StateManager;
use crate::config::{ExperienceConfig, StateModel};
use crate::error::StateError;
use crate::lock::LockManager;
use crate::storage::{keys, DocumentStore};

impl<S: DocumentStore, L: LockManager> StateManager<S, L> {
    /// Create a player's initial view for an experience.
    ///
    /// Idempotent: if the view already exists it is returned unchanged —
    /// re-running bootstrap must never reset a player's progress. Shared
    /// experiences get a minimal view seeded from the bootstrap config;
    /// isolated experiences get a verbatim copy of the world template with
    /// a fresh session identity.
    pub fn bootstrap_player(&self, experience: &str, user: &str) -> Result<Value, StateError> {
        let config = self.load_config(experience, false)?;
        let key = keys::view(experience, user);

        if let Some(existing) = self.storage().load(&key)? {
            tracing::warn!(
                experience,
                user,
                "player already bootstrapped; returning existing view"
            );
            return Ok(existing);
        }

        let view = match config.state.model {
            StateModel::Shared => shared_initial_view(&config),
            StateModel::Isolated => self.isolated_initial_view(&config, experience, user)?,
        };
        self.storage().save(&key, &view)?;
        tracing::debug!(experience, user, model = ?config.state.model, "player bootstrapped");
        Ok(view)
    }

    fn isolated_initial_view(
        &self,
        config: &ExperienceConfig,
        experience: &str,
        user: &str,
    ) -> Result<Value, StateError> {
        let template_key = config
            .bootstrap
            .world_template_path
            .clone()
            .unwrap_or_else(|| keys::world_template(experience));
        let template = self
            .storage()
            .load(&template_key)?
            .ok_or_else(|| StateError::NotFound {
                key: template_key.clone(),
            })?;
        let Value::Object(mut view) = template else {
            return Err(StateError::ConfigValidation(format!(
                "world template '{}' is not a JSON object",
                template_key
            )));
        };

        let now = Utc::now();
        let mut session = take_object(&mut view, "session");
        session.insert(
            "id".to_string(),
            json!(format!("{}-{}", user, now.timestamp_millis())),
        );
        session.insert("started_at".to_string(), json!(now.to_rfc3339()));
        view.insert("session".to_string(), Value::Object(session));

        let mut metadata = take_object(&mut view, "metadata");
        metadata.insert("_version".to_string(), json!(1));
        metadata.insert("last_modified".to_string(), json!(now.to_rfc3339()));
        metadata.insert("_copied_from_template".to_string(), json!(template_key));
        metadata.insert("_user_id".to_string(), json!(user));
        view.insert("metadata".to_string(), Value::Object(metadata));

        Ok(Value::Object(view))
    }
}

fn shared_initial_view(config: &ExperienceConfig) -> Value {
    let now = Utc::now().to_rfc3339();
    json!({
        "player": {
            "location": config.bootstrap.starting_location,
            "inventory": config.bootstrap.starting_inventory,
            "stats": {}
        },
        "progress": {
            "visited_locations": [],
            "quest_progress": {},
            "achievements": []
        },
        "session": {
            "started_at": now,
            "turns_taken": 0
        },
        "metadata": {
            "_version": 1,
            "last_modified": now
        }
    })
}

/// Remove `key` from the document, yielding its object fields (empty when
/// absent or not an object).
fn take_object(doc: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match doc.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
