use serde_json::Value;

use super::StorageError;

/// Abstract keyed storage for JSON documents.
///
/// Backends must be safe to share across threads; the state manager calls
/// `load`/`save` from many request-handling threads concurrently. Each call
/// is individually consistent, but cross-call coordination (read-merge-write)
/// is the caller's job — that is what the lock module is for.
pub trait DocumentStore: Send + Sync {
    /// Load a document by key. Returns `None` if absent.
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a document, creating or replacing it.
    fn save(&self, key: &str, doc: &Value) -> Result<(), StorageError>;

    /// Whether a document exists under `key`.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.load(key)?.is_some())
    }
}
