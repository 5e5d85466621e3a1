use std::fmt;

use crate::lock::LockError;
use crate::storage::StorageError;

/// Top-level error type for state operations.
///
/// The first three variants form the caller-facing taxonomy: validation
/// failures are scoped to one experience, `NotFound` distinguishes "never
/// bootstrapped" from "document vanished", and `LockTimeout` is transient —
/// the caller decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Malformed experience config, or an isolated-model call missing the
    /// required user id.
    ConfigValidation(String),
    /// An expected document is absent.
    NotFound { key: String },
    /// The advisory lock was not acquired within the configured timeout.
    LockTimeout { key: String, waited_ms: u64 },
    /// Lock infrastructure failure (e.g. a poisoned mutex).
    Lock(LockError),
    /// Storage backend failure.
    Storage(String),
    /// Serialization/deserialization failure.
    Serde(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::ConfigValidation(msg) => write!(f, "config validation failed: {}", msg),
            StateError::NotFound { key } => write!(f, "state document not found: {}", key),
            StateError::LockTimeout { key, waited_ms } => {
                write!(f, "lock on {} not acquired after {}ms", key, waited_ms)
            }
            StateError::Lock(err) => write!(f, "lock error: {}", err),
            StateError::Storage(msg) => write!(f, "storage error: {}", msg),
            StateError::Serde(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StateError {}

impl From<LockError> for StateError {
    fn from(err: LockError) -> Self {
        StateError::Lock(err)
    }
}

impl From<StorageError> for StateError {
    fn from(err: StorageError) -> Self {
        StateError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serde(err.to_string())
    }
}
