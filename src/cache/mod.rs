//! Single-slot dashboard cache: trait seam plus in-process and Redis backends.
//!
//! The aggregator only ever uses one key (`CACHE_KEY`). Store failures are reported,
//! never retried; callers decide whether a failure matters.

// src/cache/mod.rs
pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::{FailingCache, MemoryCache};
pub use self::redis::RedisCache;

/// The one slot the dashboard lives in. Last write wins.
pub const CACHE_KEY: &str = "dashboard:cache";

/// Default lifetime of the cached dashboard.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),

    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}
