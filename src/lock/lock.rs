use std::sync::Arc;
use std::time::{Duration, Instant};

use super::LockError;

/// Sleep between `try_lock` attempts while waiting for a contended lock.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Trait for a single lock instance.
///
/// Implementations provide non-blocking try-lock and unlock. In-memory locks
/// use `Mutex<bool>`; distributed locks might use Redis, Postgres advisory
/// locks, etcd leases, etc.
pub trait Lock: Send + Sync {
    /// Try to acquire the lock without blocking.
    /// Returns `Ok(true)` if acquired, `Ok(false)` if already held.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock.
    fn unlock(&self) -> Result<(), LockError>;
}

/// RAII guard for an acquired lock. Releases on drop.
pub struct LockGuard<L: Lock> {
    lock: Arc<L>,
}

impl<L: Lock> std::fmt::Debug for LockGuard<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.unlock() {
            tracing::warn!(error = %err, "failed to release lock");
        }
    }
}

/// Acquire `lock` within `timeout`, polling `try_lock` every [`POLL_INTERVAL`].
///
/// Fails with [`LockError::Timeout`] once elapsed time exceeds `timeout`.
pub fn acquire<L: Lock>(lock: Arc<L>, timeout: Duration) -> Result<LockGuard<L>, LockError> {
    let started = Instant::now();
    loop {
        if lock.try_lock()? {
            return Ok(LockGuard { lock });
        }
        if started.elapsed() > timeout {
            return Err(LockError::Timeout {
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        std::thread::sleep(POLL_INTERVAL.min(timeout));
    }
}
