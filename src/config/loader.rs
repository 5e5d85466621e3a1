use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::ExperienceConfig;
use crate::error::StateError;
use crate::storage::{keys, DocumentStore};

/// Process-lifetime cache of validated experience configs.
///
/// Owned by the state manager instance rather than being module-global, so
/// two managers never share (or clobber) each other's cache. Entries are
/// inserted on first successful validation and only replaced via
/// `force_reload`.
pub struct ConfigCache {
    cache: RwLock<HashMap<String, Arc<ExperienceConfig>>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load, validate, default, and cache the config for `experience`.
    ///
    /// Without `force_reload`, repeated calls return the identical cached
    /// `Arc`. Fails with [`StateError::NotFound`] when no config document
    /// exists and [`StateError::ConfigValidation`] when it is malformed.
    pub fn load<S: DocumentStore>(
        &self,
        storage: &S,
        experience: &str,
        force_reload: bool,
    ) -> Result<Arc<ExperienceConfig>, StateError> {
        if !force_reload {
            let cache = self
                .cache
                .read()
                .map_err(|_| StateError::Storage("config cache poisoned".to_string()))?;
            if let Some(config) = cache.get(experience) {
                return Ok(config.clone());
            }
        }

        let key = keys::config(experience);
        let raw = storage
            .load(&key)?
            .ok_or_else(|| StateError::NotFound { key: key.clone() })?;
        let config: ExperienceConfig = serde_json::from_value(raw)
            .map_err(|e| StateError::ConfigValidation(e.to_string()))?;
        config.validate(experience)?;

        let config = Arc::new(config);
        let mut cache = self
            .cache
            .write()
            .map_err(|_| StateError::Storage("config cache poisoned".to_string()))?;
        cache.insert(experience.to_string(), config.clone());
        tracing::debug!(experience, "experience config loaded and cached");
        Ok(config)
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}
