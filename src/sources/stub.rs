// src/sources/stub.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::sources::types::{FetchError, Source, SourceFetcher};

/// Canned answers keyed by source name, for tests and local runs without network.
/// Unknown names fail with a transport error.
#[derive(Debug, Default)]
pub struct StubFetcher {
    answers: HashMap<String, Result<Value, String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, name: &str, doc: Value) -> Self {
        self.answers.insert(name.to_string(), Ok(doc));
        self
    }

    pub fn fail(mut self, name: &str, message: &str) -> Self {
        self.answers
            .insert(name.to_string(), Err(message.to_string()));
        self
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for StubFetcher {
    async fn fetch(&self, source: &Source) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match self.answers.get(&source.name) {
            Some(Ok(doc)) => Ok(doc.clone()),
            Some(Err(message)) => Err(FetchError::Transport {
                name: source.name.clone(),
                message: message.clone(),
            }),
            None => Err(FetchError::Transport {
                name: source.name.clone(),
                message: "no stubbed answer".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
