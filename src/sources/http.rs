// src/sources/http.rs
use async_trait::async_trait;
use metrics::histogram;
use serde_json::Value;

use crate::sources::types::{FetchError, Source, SourceFetcher};

const USER_AGENT: &str = concat!("dashboard-aggregator/", env!("CARGO_PKG_VERSION"));

/// Fetches sources over HTTP(S) with one shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Reuse an already configured client (proxies, TLS roots, test setups).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &Source) -> Result<Value, FetchError> {
        let t0 = std::time::Instant::now();

        let resp = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                name: source.name.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                name: source.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| FetchError::Transport {
            name: source.name.clone(),
            message: e.to_string(),
        })?;

        let doc = parse_document(&source.name, &body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("dashboard_fetch_ms", "source" => source.name.clone()).record(ms);
        Ok(doc)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Parse a response body into a JSON tree. Any valid JSON value is accepted.
pub fn parse_document(name: &str, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        name: name.to_string(),
        message: e.to_string(),
    })
}
