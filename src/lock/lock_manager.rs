use std::sync::Arc;

use super::{Lock, LockError};

/// Factory trait for obtaining per-document locks.
///
/// The state manager asks its `LockManager` for one lock per storage key
/// before entering the locked write path. The default [`InMemoryLockManager`]
/// stores locks in a `HashMap`; distributed implementations might talk to
/// Redis, Postgres, etc.
///
/// [`InMemoryLockManager`]: super::InMemoryLockManager
pub trait LockManager: Send + Sync {
    /// The concrete lock type returned by this manager.
    type Lock: Lock + 'static;

    /// Get (or create) a lock for the given key.
    ///
    /// Repeated calls with the same `key` must return the same logical lock
    /// (i.e. the same `Arc` for in-memory, or the same distributed key).
    fn get_lock(&self, key: &str) -> Result<Arc<Self::Lock>, LockError>;
}
