use std::fmt;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The underlying lock primitive was poisoned (a thread panicked while holding it).
    Poisoned(String),
    /// The lock was not acquired within the allowed time.
    Timeout { waited_ms: u64 },
    /// Failed to release the lock.
    ReleaseFailed(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Poisoned(msg) => write!(f, "lock poisoned: {}", msg),
            LockError::Timeout { waited_ms } => {
                write!(f, "lock not acquired after {}ms", waited_ms)
            }
            LockError::ReleaseFailed(msg) => write!(f, "lock release failed: {}", msg),
        }
    }
}

impl std::error::Error for LockError {}
