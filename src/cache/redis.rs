// src/cache/redis.rs
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, info};

use super::{CacheError, CacheStore};

/// Redis-backed store. `ConnectionManager` reconnects on its own; a dead server
/// surfaces as `CacheError::Redis` per call.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("redis_url", &self.redis_url)
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    /// Opens the client and establishes the first connection.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        info!(redis_url = %redis_url, "redis cache connected");
        Ok(Self {
            conn,
            redis_url: redis_url.to_string(),
        })
    }
}

/// Redis expiry has second granularity; never send 0 (that is an error for SETEX).
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        debug!(key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let secs = ttl_secs(ttl);
        conn.set_ex::<_, _, ()>(key, value, secs).await?;
        debug!(key, ttl_secs = secs, "redis SETEX");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
