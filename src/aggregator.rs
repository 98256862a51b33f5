//! Dashboard aggregation: concurrent fan-out to every source, merge of whatever
//! answered, write-through to the cache, and cache fallback when nothing answered.
//!
//! Per call:
//! `FETCHING -> MERGE_AND_CACHE -> fresh` when at least one source succeeded,
//! `FETCHING -> CACHE_LOOKUP -> cached | AggregationError` otherwise.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::counter;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStore, CACHE_KEY, DEFAULT_CACHE_TTL};
use crate::config::AggregatorConfig;
use crate::metrics::ensure_metrics_described;
use crate::sources::{FetchOutcome, Source, SourceFetcher};

/// Merged view: source name -> that source's document.
pub type AggregateDocument = Map<String, Value>;

/// The single error surfaced to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("No data and cache empty")]
    NoData,

    #[error("aggregation timed out after {0:?}")]
    TimedOut(Duration),
}

/// Where a dashboard body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Fresh { succeeded: usize, failed: usize },
    Cache,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Fresh { .. } => "fresh",
            Origin::Cache => "cache",
        }
    }
}

/// Result of one aggregation. `body` is compact JSON: freshly serialized, or the
/// cached text exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub body: String,
    pub origin: Origin,
}

impl Dashboard {
    pub fn is_fresh(&self) -> bool {
        matches!(self.origin, Origin::Fresh { .. })
    }
}

/// Fold outcomes into the aggregate document. Failures contribute nothing.
/// Keys are kept sorted, so equal inputs serialize to identical bytes.
pub fn merge<I>(outcomes: I) -> AggregateDocument
where
    I: IntoIterator<Item = FetchOutcome>,
{
    outcomes
        .into_iter()
        .filter_map(|o| o.result.ok().map(|doc| (o.name, doc)))
        .collect()
}

/// Orchestrates one dashboard request. Collaborators are injected; cheap to share
/// behind an `Arc`.
///
/// Concurrent calls are not deduplicated: each one fetches every source and
/// overwrites the cache slot independently.
pub struct Aggregator {
    sources: Arc<[Source]>,
    fetcher: Arc<dyn SourceFetcher>,
    cache: Arc<dyn CacheStore>,
    cache_ttl: Duration,
    timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new(
        sources: Vec<Source>,
        fetcher: Arc<dyn SourceFetcher>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            sources: sources.into(),
            fetcher,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
            timeout: None,
        }
    }

    pub fn from_config(
        cfg: &AggregatorConfig,
        fetcher: Arc<dyn SourceFetcher>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self::new(cfg.sources.clone(), fetcher, cache)
            .with_cache_ttl(cfg.cache_ttl())
            .with_timeout(cfg.aggregate_timeout())
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Bound the whole call. On elapse every in-flight fetch is dropped and the call
    /// fails; partial results are not salvaged.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub async fn aggregate(&self) -> Result<Dashboard, AggregationError> {
        ensure_metrics_described();

        let res = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.run()).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "aggregation timed out");
                    Err(AggregationError::TimedOut(limit))
                }
            },
            None => self.run().await,
        };

        let outcome = match &res {
            Ok(d) => d.origin.as_str(),
            Err(AggregationError::NoData) => "no_data",
            Err(AggregationError::TimedOut(_)) => "timeout",
        };
        counter!("dashboard_requests_total", "outcome" => outcome).increment(1);
        res
    }

    async fn run(&self) -> Result<Dashboard, AggregationError> {
        let outcomes = self.fetch_all().await;
        let total = outcomes.len();
        let mut failed = 0;

        for o in &outcomes {
            if let Err(e) = &o.result {
                failed += 1;
                info!(
                    source = %o.name,
                    fetcher = self.fetcher.name(),
                    error = %e,
                    "source fetch failed; excluded from dashboard"
                );
                counter!(
                    "dashboard_source_errors_total",
                    "source" => o.name.clone(),
                    "kind" => e.kind()
                )
                .increment(1);
            }
        }

        let doc = merge(outcomes);
        if doc.is_empty() {
            return self.fallback(total).await;
        }

        let succeeded = total - failed;
        let body = Value::Object(doc).to_string();
        self.store(&body).await;

        debug!(succeeded, failed, "fresh dashboard built");
        Ok(Dashboard {
            body,
            origin: Origin::Fresh { succeeded, failed },
        })
    }

    /// One future per source, no width limit, joined as a barrier.
    async fn fetch_all(&self) -> Vec<FetchOutcome> {
        let fetches = self.sources.iter().map(|source| async move {
            FetchOutcome {
                name: source.name.clone(),
                result: self.fetcher.fetch(source).await,
            }
        });
        join_all(fetches).await
    }

    /// Write-through. A failed write never costs the caller its fresh data.
    async fn store(&self, body: &str) {
        if let Err(e) = self.cache.set(CACHE_KEY, body, self.cache_ttl).await {
            error!(
                backend = self.cache.backend(),
                error = %e,
                "cache unavailable, skipping dashboard write"
            );
            counter!("dashboard_cache_write_errors_total").increment(1);
        }
    }

    /// Every source failed: serve the last stored dashboard verbatim, if any.
    async fn fallback(&self, failed: usize) -> Result<Dashboard, AggregationError> {
        let cached = match self.cache.get(CACHE_KEY).await {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    backend = self.cache.backend(),
                    error = %e,
                    "cache read failed during fallback; treating as miss"
                );
                None
            }
        };

        match cached {
            Some(body) => {
                warn!(failed, "all sources failed; serving cached dashboard");
                counter!("dashboard_cache_fallback_total").increment(1);
                Ok(Dashboard {
                    body,
                    origin: Origin::Cache,
                })
            }
            None => {
                warn!(failed, "all sources failed and no cached dashboard");
                counter!("dashboard_unavailable_total").increment(1);
                Err(AggregationError::NoData)
            }
        }
    }
}
