// src/sources/types.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One upstream provider. `name` becomes the key of its document in the merged dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Why a single source produced nothing. Never fatal to an aggregation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{name}: request failed: {message}")]
    Transport { name: String, message: String },

    #[error("{name}: upstream answered with status {status}")]
    Status { name: String, status: u16 },

    #[error("{name}: body is not valid JSON: {message}")]
    Parse { name: String, message: String },
}

impl FetchError {
    pub fn source_name(&self) -> &str {
        match self {
            FetchError::Transport { name, .. }
            | FetchError::Status { name, .. }
            | FetchError::Parse { name, .. } => name,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Parse { .. } => "parse",
        }
    }
}

/// Result of one fetch, tagged with the source it came from.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub name: String,
    pub result: Result<Value, FetchError>,
}

impl FetchOutcome {
    pub fn success(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            result: Ok(document),
        }
    }

    pub fn failure(error: FetchError) -> Self {
        Self {
            name: error.source_name().to_string(),
            result: Err(error),
        }
    }
}

/// Retrieves and parses one source. Single attempt: no timeout, no retry.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Value, FetchError>;

    fn name(&self) -> &'static str;
}
