// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod sources;

use std::sync::Arc;

use axum::Router;
use tracing::{info, warn};

pub use crate::aggregator::{AggregateDocument, AggregationError, Aggregator, Dashboard, Origin};
pub use crate::api::{create_router, AppState};
pub use crate::cache::{CacheStore, MemoryCache, RedisCache, CACHE_KEY};
pub use crate::config::{AggregatorConfig, ServerConfig};
pub use crate::sources::{FetchError, HttpFetcher, Source, SourceFetcher};

/// Pick the cache backend. Redis when configured and reachable, otherwise the
/// in-process store; the service keeps working either way.
pub async fn build_cache(redis_url: Option<&str>) -> Arc<dyn CacheStore> {
    let Some(url) = redis_url else {
        info!("REDIS_URL not set; using in-memory dashboard cache");
        return Arc::new(MemoryCache::new());
    };
    match RedisCache::connect(url).await {
        Ok(c) => Arc::new(c),
        Err(e) => {
            warn!(error = %e, "redis unreachable at startup; using in-memory dashboard cache");
            Arc::new(MemoryCache::new())
        }
    }
}

/// Wire the full application router from loaded configuration.
pub async fn app(
    cfg: &AggregatorConfig,
    server: &ServerConfig,
    metrics: Option<&metrics::Metrics>,
) -> anyhow::Result<Router> {
    let fetcher = Arc::new(HttpFetcher::new()?);
    let cache = build_cache(server.redis_url.as_deref()).await;
    let aggregator = Aggregator::from_config(cfg, fetcher, cache);

    let mut router = create_router(AppState::new(aggregator));
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    Ok(router)
}
