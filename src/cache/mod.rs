//! String-keyed in-memory cache with per-entry TTL.
//!
//! Entries expire on read; `cleanup` sweeps whatever expired without being
//! touched. Values are serialized strings, typically JSON.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default TTL for entries inserted without an explicit one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

/// In-memory TTL cache. Cloning shares the underlying store.
#[derive(Debug, Clone)]
pub struct TtlCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    default_ttl: Option<Duration>,
}

impl TtlCache {
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Inserts a value; `ttl` falls back to the cache's default.
    pub fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let ttl = ttl.or(self.default_ttl);
        let mut store = self.store.write().unwrap();
        store.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
    }

    /// Returns the value for `key`, dropping and missing expired entries.
    pub fn get(&self, key: &str) -> Option<String> {
        {
            let store = self.store.read().unwrap();
            match store.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }
        // Expired: take the write lock to drop it.
        let mut store = self.store.write().unwrap();
        store.remove(key);
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut store = self.store.write().unwrap();
        store.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut store = self.store.write().unwrap();
        store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sweeps entries that expired without being read.
    pub fn cleanup(&self) {
        let mut store = self.store.write().unwrap();
        store.retain(|_, entry| !entry.is_expired());
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TTL))
    }
}

/// Async cache facade so callers can swap in an external backend later.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

#[async_trait::async_trait]
impl CacheBackend for TtlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(TtlCache::get(self, key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        TtlCache::set(self, key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        TtlCache::delete(self, key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(TtlCache::contains(self, key))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        TtlCache::clear(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_value() {
        let cache = TtlCache::default();
        cache.set("k", "v", None);
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert!(cache.contains("k"));
    }

    #[test]
    fn expired_entries_miss_and_are_dropped() {
        let cache = TtlCache::default();
        cache.set("k", "v", Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn entries_without_ttl_never_expire() {
        let cache = TtlCache::new(None);
        cache.set("k", "v", None);
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn cleanup_sweeps_expired_entries() {
        let cache = TtlCache::default();
        cache.set("old", "v", Some(Duration::ZERO));
        cache.set("fresh", "v", Some(Duration::from_secs(60)));
        std::thread::sleep(Duration::from_millis(5));

        cache.cleanup();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("fresh"));
    }

    #[test]
    fn delete_and_clear() {
        let cache = TtlCache::default();
        cache.set("a", "1", None);
        cache.set("b", "2", None);
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
