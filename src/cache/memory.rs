// src/cache/memory.rs
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{CacheError, CacheStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process TTL cache. Used when no Redis is configured, and in tests.
///
/// Expiry is absolute (no sliding refresh); expired entries are evicted on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated cache, handy for fallback scenarios.
    pub fn with_entry(key: &str, value: &str, ttl: Duration) -> Self {
        let cache = Self::new();
        cache.insert(key, value, ttl);
        cache
    }

    fn insert(&self, key: &str, value: &str, ttl: Duration) {
        let mut g = match self.entries.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        };
        g.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut g = self
            .entries
            .lock()
            .map_err(|_| CacheError::Backend("memory cache lock poisoned".to_string()))?;

        match g.get(key) {
            Some(e) if e.expires_at > Instant::now() => Ok(Some(e.value.clone())),
            Some(_) => {
                g.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.insert(key, value, ttl);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// A store that refuses every operation. Stands in for an unreachable backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
