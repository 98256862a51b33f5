// src/config/server.rs
use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const ENV_BIND: &str = "AGGREGATOR_BIND";
pub const ENV_PORT: &str = "PORT";
pub const ENV_REDIS_URL: &str = "REDIS_URL";
pub const ENV_METRICS: &str = "AGGREGATOR_METRICS";

/// Process-level settings, read from the environment only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            redis_url: None,
            metrics: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env`, with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(b) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            cfg.bind = b.trim().to_string();
        }
        if let Some(p) = lookup(ENV_PORT) {
            cfg.port = p
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_PORT} value: {p}"))?;
        }
        cfg.redis_url = lookup(ENV_REDIS_URL).filter(|v| !v.trim().is_empty());
        cfg.metrics = lookup(ENV_METRICS).is_some_and(|v| v == "1");
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {addr}"))
    }
}
