//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::bundler::{FetchError, Fetcher};

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Per-URL bodies or errors
/// - Unknown URLs answer with a 404 status error
/// - Records every requested URL in order
/// - Optional simulated latency
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, Result<Vec<u8>, FetchError>>>>,
    requests: Arc<RwLock<Vec<String>>>,
    fetch_delay_ms: Arc<RwLock<u64>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub async fn set_response(&self, url: &str, body: Vec<u8>) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), Ok(body));
    }

    /// Fail every fetch of `url` with `error`.
    pub async fn set_error(&self, url: &str, error: FetchError) {
        self.responses
            .write()
            .await
            .insert(url.to_string(), Err(error));
    }

    /// Set the simulated fetch duration.
    pub async fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay_ms.write().await = delay.as_millis() as u64;
    }

    /// URLs requested so far, in order.
    pub async fn recorded_urls(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.write().await.push(url.to_string());

        let delay_ms = *self.fetch_delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        self.responses
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status { status: 404 }))
    }
}
