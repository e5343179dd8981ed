//! Single-flight coordination keyed by cache key
//!
//! Concurrent requests that miss the cache under the same key would each
//! issue their own upstream call. `KeyedLock` serializes the miss path per
//! key: the first caller holds the lock while it fetches and fills the
//! cache, later callers re-check the cache once the lock is released.
//!
//! Registry entries are cleaned up when a guard is dropped, never while
//! the key's mutex is still held: a caller arriving mid-fetch must find
//! the holder's mutex and wait on it, not insert a fresh one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as RegistryMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

type Registry = Arc<RegistryMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// Per-key async mutex registry
pub struct KeyedLock {
    locks: Registry,
}

/// Holds a key's mutex until dropped
///
/// Dropping releases the mutex first and then removes the registry entry
/// if nobody else holds a reference to it.
pub struct KeyedGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Registry,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        // Release the key's mutex before inspecting the registry; a
        // waiter parked on lock_owned still holds its own Arc clone
        self.guard.take();

        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = locks.get(&self.key) {
            // Only the registry's own reference left: no holder, no waiters
            if Arc::strong_count(entry) <= 1 {
                locks.remove(&self.key);
            }
        }
    }
}

impl KeyedLock {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RegistryMutex::new(HashMap::new())),
        }
    }

    /// Acquire the lock for a key, waiting if another caller holds it
    pub async fn acquire(&self, key: &str) -> KeyedGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = lock.lock_owned().await;

        KeyedGuard {
            guard: Some(guard),
            key: key.to_string(),
            locks: self.locks.clone(),
        }
    }
}

impl Default for KeyedLock {
    fn default() -> Self {
        Self::new()
    }
}
