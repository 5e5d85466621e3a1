//! Per-document advisory locking.
//!
//! The shared world document is the only resource in the store that needs
//! mutual exclusion. Locks are keyed by storage key and acquired with a
//! bounded poll: non-blocking `try_lock`, 100ms sleep between attempts,
//! failure once the configured timeout elapses. Acquisition hands back a
//! [`LockGuard`] that releases on drop, so a lock is never left held on any
//! exit path.

mod error;
mod in_memory;
mod lock;
mod lock_manager;

pub use error::LockError;
pub use in_memory::{InMemoryLock, InMemoryLockManager};
pub use lock::{acquire, Lock, LockGuard, POLL_INTERVAL};
pub use lock_manager::LockManager;
