use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::config::{ConfigCache, ExperienceConfig};
use crate::error::StateError;
use crate::events::{changes_from_updates, DeltaPublisher, EventPublisher, WorldUpdateEvent};
use crate::lock::{acquire, InMemoryLockManager, LockError, LockManager};
use crate::merge::{merge, UpdateSet};
use crate::storage::DocumentStore;
use crate::template::{NullTemplateSource, TemplateSource};

/// Facade over the whole store: experience config, world state, player
/// views, bootstrap, and profiles.
///
/// All methods take `&self`; a manager wrapped in an `Arc` is safe to use
/// from many request-handling threads. The shared world document is the
/// only resource serialized between writers (via the lock manager); player
/// views and profiles are single-owner documents written directly.
pub struct StateManager<S: DocumentStore, L: LockManager = InMemoryLockManager> {
    storage: S,
    locks: L,
    configs: ConfigCache,
    delta: DeltaPublisher,
    templates: Box<dyn TemplateSource>,
}

impl<S: DocumentStore> StateManager<S> {
    /// Create a manager with the default in-memory lock manager, a log-only
    /// event sink, and no template source.
    pub fn new(storage: S) -> Self {
        Self::with_parts(
            storage,
            InMemoryLockManager::new(),
            Box::new(crate::events::LogPublisher),
            Box::new(NullTemplateSource),
        )
    }
}

impl<S: DocumentStore, L: LockManager> StateManager<S, L> {
    /// Create a manager from explicit collaborators.
    pub fn with_parts(
        storage: S,
        locks: L,
        publisher: Box<dyn EventPublisher>,
        templates: Box<dyn TemplateSource>,
    ) -> Self {
        Self {
            storage,
            locks,
            configs: ConfigCache::new(),
            delta: DeltaPublisher::new(publisher),
            templates,
        }
    }

    /// Access the underlying document store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load (and cache) the validated config for `experience`.
    pub fn load_config(
        &self,
        experience: &str,
        force_reload: bool,
    ) -> Result<Arc<ExperienceConfig>, StateError> {
        self.configs.load(&self.storage, experience, force_reload)
    }

    /// Locked write path: one active writer per document, bounded wait.
    ///
    /// The closure sees the current document from inside the critical
    /// section, so read-modify-write updates cannot lose concurrent writes.
    /// The lock is released on every exit path, success or error.
    pub(crate) fn locked_update<F>(
        &self,
        key: &str,
        timeout_ms: u64,
        f: F,
    ) -> Result<(UpdateSet, u64, Value), StateError>
    where
        F: FnOnce(&Value) -> UpdateSet,
    {
        let lock = self.locks.get_lock(key)?;
        let _guard = match acquire(lock, Duration::from_millis(timeout_ms)) {
            Ok(guard) => guard,
            Err(LockError::Timeout { waited_ms }) => {
                return Err(StateError::LockTimeout {
                    key: key.to_string(),
                    waited_ms,
                })
            }
            Err(other) => return Err(other.into()),
        };
        tracing::debug!(key, "write lock acquired");
        self.read_merge_write(key, None, f)
    }

    /// Direct write path for single-owner documents (and shared documents
    /// with locking disabled). Same read→merge→version→write sequence,
    /// no lock.
    pub(crate) fn direct_update<F>(
        &self,
        key: &str,
        seed: Option<Value>,
        f: F,
    ) -> Result<(UpdateSet, u64, Value), StateError>
    where
        F: FnOnce(&Value) -> UpdateSet,
    {
        self.read_merge_write(key, seed, f)
    }

    fn read_merge_write<F>(
        &self,
        key: &str,
        seed: Option<Value>,
        f: F,
    ) -> Result<(UpdateSet, u64, Value), StateError>
    where
        F: FnOnce(&Value) -> UpdateSet,
    {
        let current = match self.storage.load(key)? {
            Some(doc) => doc,
            None => seed.ok_or_else(|| StateError::NotFound {
                key: key.to_string(),
            })?,
        };
        let base_version = version_of(&current);
        let updates = f(&current);
        let mut next = merge(&current, &updates);
        stamp(&mut next, base_version + 1);
        self.storage.save(key, &next)?;
        tracing::debug!(key, version = base_version + 1, "state document written");
        Ok((updates, base_version, next))
    }

    /// Emit a delta event for a committed update. Best-effort; requires a
    /// user id for the topic, otherwise the event is skipped.
    pub(crate) fn publish_delta(
        &self,
        experience: &str,
        user: Option<&str>,
        updates: &UpdateSet,
        base_version: u64,
        snapshot_version: u64,
    ) {
        let Some(user) = user else {
            tracing::debug!(experience, "update has no user id; delta publish skipped");
            return;
        };
        let changes = changes_from_updates(experience, updates, self.templates.as_ref());
        let event =
            WorldUpdateEvent::new(experience, user, base_version, snapshot_version, changes);
        self.delta.publish(&event);
    }
}

/// Current change counter of a document, 0 when unversioned.
pub(crate) fn version_of(doc: &Value) -> u64 {
    doc.get("metadata")
        .and_then(|m| m.get("_version"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Stamp `metadata._version` and `metadata.last_modified` on a merged
/// document, creating the metadata object if the merge clobbered it.
pub(crate) fn stamp(doc: &mut Value, version: u64) {
    let Value::Object(map) = doc else { return };
    let metadata = map
        .entry("metadata")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !metadata.is_object() {
        *metadata = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(meta) = metadata {
        meta.insert("_version".to_string(), Value::from(version));
        meta.insert(
            "last_modified".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
}
