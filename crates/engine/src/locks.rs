//! Per-key serialization with bounded waits.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use fuelcast_shared::types::StockKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{EngineError, EngineResult};

/// One async mutex per (site, fuel) key.
///
/// Holders of different keys never wait on each other. Entries are created on
/// first use and kept for the life of the map.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<StockKey, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    /// Creates an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `timeout` for the lock on `key`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Timeout` if the lock is still held when the bound elapses.
    pub async fn acquire(
        &self,
        key: StockKey,
        operation: &'static str,
        timeout: Duration,
    ) -> EngineResult<OwnedMutexGuard<()>> {
        let lock = Arc::clone(self.locks.entry(key).or_default().value());
        tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| EngineError::Timeout {
                operation,
                after: timeout,
            })
    }

    /// Number of keys that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no key has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Runs `future` with an upper bound on its duration.
///
/// # Errors
///
/// Returns `EngineError::Timeout` when the bound elapses, otherwise whatever
/// `future` returned, converted.
pub async fn bounded<T, E, F>(operation: &'static str, after: Duration, future: F) -> EngineResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<EngineError>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(EngineError::Timeout { operation, after }),
    }
}
