//! Configuration-driven state store for interactive experiences.
//!
//! Each experience (a game, an AR space) declares one of two coordination
//! models in its config: **shared** — a single authoritative world document
//! guarded by per-document locking — or **isolated** — every player owns a
//! private copy of the world bootstrapped from a template. The store covers
//! config validation and caching, deep-merge updates with append/remove
//! list operations, per-write version counters, idempotent player
//! bootstrap, player profiles, and versioned delta events for real-time
//! client sync.

mod config;
mod error;
mod events;
mod lock;
mod merge;
mod state;
mod storage;
mod template;

pub use config::{
    BootstrapConfig, ConfigCache, ContentConfig, CoordinationConfig, ExperienceConfig,
    MultiplayerConfig, PersistenceConfig, StateConfig, StateModel,
};
pub use error::StateError;
pub use events::{
    changes_from_updates, BufferPublisher, ChangeOp, DeltaPublisher, EventPublisher,
    LogPublisher, PublishError, WorldChange, WorldUpdateEvent, WIRE_VERSION,
};
pub use lock::{
    acquire, InMemoryLock, InMemoryLockManager, Lock, LockError, LockGuard, LockManager,
    POLL_INTERVAL,
};
pub use merge::{merge, MergeError, UpdateOp, UpdateSet, APPEND_KEY, REMOVE_KEY};
pub use state::StateManager;
pub use storage::{keys, DocumentStore, FsDocumentStore, InMemoryDocumentStore, StorageError};
pub use template::{
    merge_template_instance, NullTemplateSource, StoreTemplateSource, TemplateSource,
};

#[cfg(feature = "emitter")]
pub use events::EmitterPublisher;

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
