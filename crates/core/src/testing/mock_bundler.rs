//! Mock bundler for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::bundler::{ArchiveError, BundleFailure, BundleReport, Bundler};

/// A recorded bundling run for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBundle {
    pub task_id: String,
    pub urls: Vec<String>,
}

/// Mock implementation of the Bundler trait.
///
/// Provides controllable behavior for testing:
/// - Counts and records invocations
/// - Simulates run duration, to observe `InProgress`
/// - Reports selected URLs as bad links
/// - Simulates fatal archive failures and panics
#[derive(Debug, Clone, Default)]
pub struct MockBundler {
    runs: Arc<RwLock<Vec<RecordedBundle>>>,
    bad_links: Arc<RwLock<Vec<String>>>,
    fail: Arc<RwLock<bool>>,
    panic: Arc<RwLock<bool>>,
    delay_ms: Arc<RwLock<u64>>,
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
}

impl MockBundler {
    /// Create a new mock bundler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedBundle> {
        self.runs.read().await.clone()
    }

    /// Number of times `bundle` was called.
    pub async fn invocation_count(&self) -> usize {
        self.runs.read().await.len()
    }

    /// URLs to report as failed in the next runs.
    pub async fn set_bad_links(&self, urls: Vec<String>) {
        *self.bad_links.write().await = urls;
    }

    /// Make runs fail as if the archive could not be produced.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Make runs panic.
    pub async fn set_panic(&self, panic: bool) {
        *self.panic.write().await = panic;
    }

    /// Set the simulated run duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Highest number of runs observed executing at once.
    pub fn max_concurrent_runs(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bundler for MockBundler {
    fn name(&self) -> &str {
        "mock"
    }

    async fn bundle(&self, task_id: &str, urls: &[String]) -> Result<BundleReport, BundleFailure> {
        self.runs.write().await.push(RecordedBundle {
            task_id: task_id.to_string(),
            urls: urls.to_vec(),
        });

        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(running, Ordering::SeqCst);

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        if *self.panic.read().await {
            panic!("mock bundler panic for task {}", task_id);
        }

        let configured = self.bad_links.read().await.clone();
        let bad_links: Vec<String> = urls
            .iter()
            .filter(|u| configured.contains(u))
            .cloned()
            .collect();

        if *self.fail.read().await {
            return Err(BundleFailure::new(
                ArchiveError::FinalizeFailed {
                    path: format!("{}.zip", task_id).into(),
                    reason: "simulated failure".to_string(),
                },
                bad_links,
            ));
        }

        let entries = urls
            .iter()
            .filter(|u| !bad_links.contains(u))
            .map(|u| crate::bundler::entry_base_name(u))
            .collect();

        Ok(BundleReport {
            archive_location: format!("memory://archives/{}.zip", task_id),
            entries,
            bad_links,
        })
    }
}
