//! Dashboard aggregator service: binary entrypoint.
//! Loads configuration, wires fetcher + cache + aggregator, and serves the Axum router.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dashboard_aggregator::metrics::Metrics;
use dashboard_aggregator::{AggregatorConfig, ServerConfig};

/// Compact human logs by default; `LOG_FORMAT=json` for structured output.
/// Filter comes from `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dashboard_aggregator=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AggregatorConfig::load_default().context("loading aggregator config")?;
    let server = ServerConfig::from_env()?;

    let metrics = if server.metrics {
        Some(Metrics::init(cfg.cache_ttl_secs)?)
    } else {
        None
    };

    let app = dashboard_aggregator::app(&cfg, &server, metrics.as_ref()).await?;

    let addr = server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, sources = cfg.sources.len(), "dashboard aggregator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
