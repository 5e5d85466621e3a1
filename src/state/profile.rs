use serde_json::{json, Value};

use super::manager::StateManager;
use crate::error::StateError;
use crate::lock::LockManager;
use crate::merge::UpdateSet;
use crate::storage::{keys, DocumentStore};

impl<S: DocumentStore, L: LockManager> StateManager<S, L> {
    /// Read a user's cross-experience profile. A fresh default (version 0,
    /// not yet persisted) is returned when none exists; the first write
    /// stamps version 1.
    pub fn get_player_profile(&self, user: &str) -> Result<Value, StateError> {
        Ok(self
            .storage()
            .load(&keys::profile(user))?
            .unwrap_or_else(default_profile))
    }

    /// Apply `updates` to a user's profile with the usual deep-merge and
    /// version-increment discipline. Creates the profile on first write.
    pub fn update_player_profile(
        &self,
        user: &str,
        updates: UpdateSet,
    ) -> Result<Value, StateError> {
        let key = keys::profile(user);
        let (_, _, next) =
            self.direct_update(&key, Some(default_profile()), move |_| updates)?;
        Ok(next)
    }

    /// Record `experience` as the user's current experience.
    ///
    /// The target experience's config must exist and validate before it is
    /// recorded. `global_stats.experiences_played` tracks every experience
    /// the user has pointed at, deduplicated.
    pub fn set_current_experience(
        &self,
        user: &str,
        experience: &str,
    ) -> Result<Value, StateError> {
        self.load_config(experience, false)?;

        let key = keys::profile(user);
        let experience = experience.to_string();
        let (_, _, next) = self.direct_update(&key, Some(default_profile()), move |current| {
            let mut updates =
                UpdateSet::new().set("current_experience", json!(experience.clone()));
            if !already_played(current, &experience) {
                updates = updates.merge_object(
                    "global_stats",
                    UpdateSet::new().append("experiences_played", json!(experience)),
                );
            }
            updates
        })?;
        Ok(next)
    }

    /// The experience the user is currently in, if any.
    pub fn get_current_experience(&self, user: &str) -> Result<Option<String>, StateError> {
        let profile = self.get_player_profile(user)?;
        Ok(profile
            .get("current_experience")
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

fn default_profile() -> Value {
    json!({
        "current_experience": null,
        "global_stats": {
            "experiences_played": []
        },
        "metadata": {
            "_version": 0
        }
    })
}

fn already_played(profile: &Value, experience: &str) -> bool {
    profile
        .get("global_stats")
        .and_then(|stats| stats.get("experiences_played"))
        .and_then(Value::as_array)
        .map_or(false, |played| {
            played.iter().any(|entry| entry.as_str() == Some(experience))
        })
}
