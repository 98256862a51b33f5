use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metric descriptions (so series show up on /metrics with help text).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "dashboard_requests_total",
            "Aggregations completed, labelled by outcome."
        );
        describe_counter!(
            "dashboard_source_errors_total",
            "Per-source fetch failures (transport, status, parse)."
        );
        describe_counter!(
            "dashboard_cache_write_errors_total",
            "Fresh dashboards that could not be written to the cache."
        );
        describe_counter!(
            "dashboard_cache_fallback_total",
            "Aggregations answered from the cache because every source failed."
        );
        describe_counter!(
            "dashboard_unavailable_total",
            "Aggregations with neither fresh nor cached data."
        );
        describe_histogram!("dashboard_fetch_ms", "Successful source fetch time in milliseconds.");
        describe_gauge!("dashboard_cache_ttl_secs", "Configured dashboard cache TTL.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish the configured TTL.
    /// Fails if a recorder is already installed in this process.
    pub fn init(cache_ttl_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        gauge!("dashboard_cache_ttl_secs").set(cache_ttl_secs as f64);
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
