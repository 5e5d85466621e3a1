//! Document storage backends.
//!
//! Every persisted document (config, world state, player views, profiles,
//! templates) is a JSON value stored under a string key. Keys are segmented
//! with `:` — see [`keys`] for the canonical scheme.

mod fs;
mod in_memory;
mod store;

use std::fmt;

pub use fs::FsDocumentStore;
pub use in_memory::InMemoryDocumentStore;
pub use store::DocumentStore;

/// Canonical storage keys for the document types the store manages.
pub mod keys {
    /// Experience configuration document.
    pub fn config(experience: &str) -> String {
        format!("config:{}", experience)
    }

    /// The authoritative world document of a shared experience.
    pub fn world(experience: &str) -> String {
        format!("world:{}", experience)
    }

    /// A player's view of (or isolated copy of) an experience.
    pub fn view(experience: &str, user: &str) -> String {
        format!("view:{}:{}", experience, user)
    }

    /// Cross-experience player profile.
    pub fn profile(user: &str) -> String {
        format!("profile:{}", user)
    }

    /// World template an isolated experience bootstraps players from.
    pub fn world_template(experience: &str) -> String {
        format!("template:{}", experience)
    }

    /// An entity template document.
    pub fn template(experience: &str, kind: &str, id: &str) -> String {
        format!("template:{}:{}:{}", experience, kind, id)
    }
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying I/O failure.
    Io(String),
    /// Stored bytes were not valid JSON (or failed to serialize).
    Serde(String),
    /// An internal lock was poisoned.
    Poisoned(&'static str),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "storage io error: {}", msg),
            StorageError::Serde(msg) => write!(f, "storage serde error: {}", msg),
            StorageError::Poisoned(op) => write!(f, "storage lock poisoned during {}", op),
        }
    }
}

impl std::error::Error for StorageError {}
