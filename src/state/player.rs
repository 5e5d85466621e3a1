use serde_json::Value;

use super::manager::{version_of, StateManager};
use crate::error::StateError;
use crate::lock::LockManager;
use crate::merge::UpdateSet;
use crate::storage::{keys, DocumentStore};

impl<S: DocumentStore, L: LockManager> StateManager<S, L> {
    /// Read a player's view of an experience.
    ///
    /// `Ok(None)` means the player has not been bootstrapped yet — a
    /// legitimate state, not an error.
    pub fn get_player_view(
        &self,
        experience: &str,
        user: &str,
    ) -> Result<Option<Value>, StateError> {
        self.load_config(experience, false)?;
        Ok(self.storage().load(&keys::view(experience, user))?)
    }

    /// Apply `updates` to a player's view and return the post-merge
    /// document. Fails with [`StateError::NotFound`] when the player was
    /// never bootstrapped.
    ///
    /// No locking: each (experience, user) pair owns exactly one document,
    /// so writers never contend across users.
    pub fn update_player_view(
        &self,
        experience: &str,
        user: &str,
        updates: UpdateSet,
    ) -> Result<Value, StateError> {
        self.load_config(experience, false)?;
        let key = keys::view(experience, user);
        let (updates, base_version, next) = self.direct_update(&key, None, move |_| updates)?;
        self.publish_delta(
            experience,
            Some(user),
            &updates,
            base_version,
            version_of(&next),
        );
        Ok(next)
    }
}
