use serde_json::Value;

use super::manager::{version_of, StateManager};
use crate::config::StateModel;
use crate::error::StateError;
use crate::lock::LockManager;
use crate::merge::UpdateSet;
use crate::storage::{keys, DocumentStore};

impl<S: DocumentStore, L: LockManager> StateManager<S, L> {
    /// Read the world state of an experience.
    ///
    /// Under the shared model this is the authoritative world document.
    /// Under the isolated model the player's view *is* their copy of world
    /// state, so a `user` id is required and their view document is
    /// returned. Fails with [`StateError::NotFound`] when the backing
    /// document is absent.
    pub fn get_world_state(
        &self,
        experience: &str,
        user: Option<&str>,
    ) -> Result<Value, StateError> {
        let config = self.load_config(experience, false)?;
        let key = match config.state.model {
            StateModel::Shared => keys::world(experience),
            StateModel::Isolated => keys::view(experience, require_user(user, experience)?),
        };
        self.storage()
            .load(&key)?
            .ok_or(StateError::NotFound { key })
    }

    /// Apply `updates` to the world state and return the post-merge
    /// document.
    pub fn update_world_state(
        &self,
        experience: &str,
        user: Option<&str>,
        updates: UpdateSet,
    ) -> Result<Value, StateError> {
        self.update_world_state_with(experience, user, move |_| updates)
    }

    /// Like [`update_world_state`](Self::update_world_state), but the update
    /// set is computed from the current document inside the critical
    /// section. Use this for read-modify-write updates (counters, swaps)
    /// that must not lose concurrent writes.
    pub fn update_world_state_with<F>(
        &self,
        experience: &str,
        user: Option<&str>,
        f: F,
    ) -> Result<Value, StateError>
    where
        F: FnOnce(&Value) -> UpdateSet,
    {
        let config = self.load_config(experience, false)?;
        let (updates, base_version, next) = match config.state.model {
            StateModel::Shared => {
                let key = keys::world(experience);
                if config.state.coordination.locking_enabled {
                    self.locked_update(&key, config.state.coordination.lock_timeout_ms, f)?
                } else {
                    self.direct_update(&key, None, f)?
                }
            }
            // Per-player copies are single-owner; no lock needed.
            StateModel::Isolated => {
                let key = keys::view(experience, require_user(user, experience)?);
                self.direct_update(&key, None, f)?
            }
        };
        self.publish_delta(experience, user, &updates, base_version, version_of(&next));
        Ok(next)
    }
}

fn require_user<'a>(user: Option<&'a str>, experience: &str) -> Result<&'a str, StateError> {
    user.ok_or_else(|| {
        StateError::ConfigValidation(format!(
            "experience '{}' uses the isolated state model; a user id is required",
            experience
        ))
    })
}
