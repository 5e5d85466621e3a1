use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{DocumentStore, StorageError};

/// Filesystem-backed document store.
///
/// Each document lives at a fixed path under the root directory: key
/// segments (`:`) become path components and the file gets a `.json`
/// suffix, so `view:demo:alice` maps to `<root>/view/demo/alice.json`.
/// Parent directories are created on first save.
///
/// Note this backend does not serialize writers by itself; concurrent
/// writes to the same shared document must go through the locked update
/// path of the state manager.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        let mut segments = key.split(':').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                // Appended rather than set_extension, so ids containing dots
                // keep their full name.
                path.push(format!("{}.json", segment));
            }
        }
        path
    }
}

fn io_err(path: &Path, err: &std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {}", path.display(), err))
}

impl DocumentStore for FsDocumentStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_err(&path, &err)),
        };
        let doc = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serde(format!("{}: {}", path.display(), e)))?;
        Ok(Some(doc))
    }

    fn save(&self, key: &str, doc: &Value) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, &e))?;
        }
        let bytes = serde_json::to_vec_pretty(doc).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(&path, bytes).map_err(|e| io_err(&path, &e))
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.path_for(key).is_file())
    }
}
