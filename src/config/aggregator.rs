// src/config/aggregator.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sources::Source;

pub const ENV_CONFIG_PATH: &str = "AGGREGATOR_CONFIG_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "AGGREGATOR_CACHE_TTL_SECS";
pub const DEFAULT_CONFIG_TOML: &str = "config/aggregator.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/aggregator.json";

fn default_cache_ttl_secs() -> u64 {
    60
}

/// Sources plus cache policy. Loaded once at startup, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub sources: Vec<Source>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Upper bound for one whole aggregation. None = wait for every source.
    #[serde(default)]
    pub aggregate_timeout_ms: Option<u64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            aggregate_timeout_ms: None,
        }
    }
}

impl AggregatorConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn aggregate_timeout(&self) -> Option<Duration> {
        self.aggregate_timeout_ms.map(Duration::from_millis)
    }

    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading aggregator config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = Self::parse(&content, ext.as_str())
            .with_context(|| format!("parsing aggregator config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the config file, then apply env overrides:
    /// 1) $AGGREGATOR_CONFIG_PATH
    /// 2) config/aggregator.toml
    /// 3) config/aggregator.json
    pub fn load_default() -> Result<Self> {
        let path = resolve_path()?;
        let mut cfg = Self::load_from(&path)?;
        if let Some(ttl) = parse_ttl_env(std::env::var(ENV_CACHE_TTL_SECS).ok())? {
            cfg.cache_ttl_secs = ttl;
        }
        tracing::info!(
            path = %path.display(),
            sources = cfg.sources.len(),
            cache_ttl_secs = cfg.cache_ttl_secs,
            "aggregator config loaded"
        );
        Ok(cfg)
    }

    pub fn parse(s: &str, hint_ext: &str) -> Result<Self> {
        match hint_ext {
            "json" => Ok(serde_json::from_str(s)?),
            "toml" => Ok(toml::from_str(s)?),
            // No usable extension: JSON documents start with '{'.
            _ if s.trim_start().starts_with('{') => Ok(serde_json::from_str(s)?),
            _ => Ok(toml::from_str(s)?),
        }
    }

    /// A zero TTL is rejected. For sources only presence of both fields is checked.
    /// Duplicate names are logged, not rejected.
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            bail!("cache_ttl_secs must be at least 1");
        }
        for (i, s) in self.sources.iter().enumerate() {
            if s.name.trim().is_empty() {
                bail!("source #{i} has an empty name");
            }
            if s.url.trim().is_empty() {
                bail!("source '{}' has an empty url", s.name);
            }
        }

        let mut seen = HashSet::new();
        for s in &self.sources {
            if !seen.insert(s.name.as_str()) {
                tracing::warn!(source = %s.name, "duplicate source name; the last answer wins");
            }
        }
        Ok(())
    }
}

fn resolve_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    for candidate in [DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_JSON] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(pb);
        }
    }
    Err(anyhow!(
        "no aggregator config found (set {ENV_CONFIG_PATH} or create {DEFAULT_CONFIG_TOML})"
    ))
}

fn parse_ttl_env(raw: Option<String>) -> Result<Option<u64>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            let ttl = v
                .parse::<u64>()
                .with_context(|| format!("{ENV_CACHE_TTL_SECS} must be whole seconds, got '{v}'"))?;
            if ttl == 0 {
                bail!("{ENV_CACHE_TTL_SECS} must be at least 1");
            }
            Ok(Some(ttl))
        }
    }
}
