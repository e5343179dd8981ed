//! Cache module
//!
//! Provides the TTL-on-write cache store used by the resolver, the per-page
//! song cache, and the aggregate cache, plus the deterministic cache-key
//! builders and the single-flight keyed lock.
//!
//! Entries expire relative to their write time only; reading an entry never
//! refreshes its TTL. The three namespaces (resolver, per-page, aggregate)
//! are independent: an entry is never read across namespaces.

pub mod keys;
pub mod single_flight;

pub use single_flight::KeyedLock;

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Key-value store with TTL-on-write semantics
///
/// Values are opaque strings; callers serialize their own payloads. Injected
/// as a capability into every component that caches.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the value for a key, or None if absent or expired
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value with the given time-to-live
    async fn set(&self, key: &str, value: String, ttl: Duration);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process cache store
///
/// Expired entries are dropped lazily on read; `sweep` removes them eagerly
/// for long-running processes.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Remove all expired entries
    pub async fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of live (non-expired) entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.expires_at > now).count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but is expired; drop it
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= now {
                entries.remove(key);
            }
        }
        None
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }
}
