use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{DocumentStore, StorageError};

/// In-memory document store backed by a `HashMap`.
///
/// The default backend for tests and single-process deployments.
/// Clone-friendly via `Arc`: clones share the same storage.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    docs: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            docs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StorageError::Poisoned("read"))?;
        Ok(docs.get(key).cloned())
    }

    fn save(&self, key: &str, doc: &Value) -> Result<(), StorageError> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StorageError::Poisoned("write"))?;
        docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StorageError::Poisoned("read"))?;
        Ok(docs.contains_key(key))
    }
}
