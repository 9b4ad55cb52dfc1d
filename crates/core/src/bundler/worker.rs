//! Bounded pool running bundling jobs off the request path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::traits::Bundler;
use crate::metrics::{BUNDLES_FINISHED, BUNDLE_DURATION};
use crate::task::{BundleOutcome, TaskStatus, TaskStore};

/// One bundling run: a task and the snapshot of its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleJob {
    pub task_id: String,
    pub urls: Vec<String>,
}

/// Snapshot of the pool's load.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub max_concurrent: usize,
    pub active_jobs: usize,
    pub queued_jobs: usize,
    pub total_processed: u64,
    pub total_failed: u64,
}

/// Tracks statistics for the pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

/// Runs at most `max_concurrent` bundling jobs at a time.
///
/// Must be used from within a Tokio runtime.
pub struct BundleWorkerPool {
    store: Arc<TaskStore>,
    bundler: Arc<dyn Bundler>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    stats: Arc<PoolStats>,
}

impl BundleWorkerPool {
    pub fn new(store: Arc<TaskStore>, bundler: Arc<dyn Bundler>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            store,
            bundler,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            max_concurrent: self.max_concurrent,
            active_jobs: self.stats.active.load(Ordering::Relaxed) as usize,
            queued_jobs: self.stats.queued.load(Ordering::Relaxed) as usize,
            total_processed: self.stats.total_processed.load(Ordering::Relaxed),
            total_failed: self.stats.total_failed.load(Ordering::Relaxed),
        }
    }

    /// Queue a job. Returns immediately; the job waits for a free slot.
    pub fn submit(&self, job: BundleJob) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let bundler = Arc::clone(&self.bundler);
        let semaphore = Arc::clone(&self.semaphore);
        let stats = Arc::clone(&self.stats);

        stats.queued.fetch_add(1, Ordering::Relaxed);
        info!(task_id = %job.task_id, files = job.urls.len(), "Bundling job queued");

        tokio::spawn(async move {
            // The semaphore is never closed, so acquiring only waits
            let _permit = semaphore.acquire_owned().await.ok();
            stats.queued.fetch_sub(1, Ordering::Relaxed);
            stats.active.fetch_add(1, Ordering::Relaxed);

            let succeeded = Self::run_job(&store, bundler, job).await;

            stats.active.fetch_sub(1, Ordering::Relaxed);
            stats.total_processed.fetch_add(1, Ordering::Relaxed);
            if !succeeded {
                stats.total_failed.fetch_add(1, Ordering::Relaxed);
            }
        })
    }

    /// Run one job through `InProgress` to a terminal status.
    async fn run_job(store: &TaskStore, bundler: Arc<dyn Bundler>, job: BundleJob) -> bool {
        let BundleJob { task_id, urls } = job;

        if let Err(e) = store.mark_in_progress(&task_id) {
            error!(task_id = %task_id, error = %e, "Cannot start bundling");
            return false;
        }

        let started = Instant::now();
        let run = {
            let task_id = task_id.clone();
            let urls = urls.clone();
            tokio::spawn(async move { bundler.bundle(&task_id, &urls).await })
        };

        let outcome = match run.await {
            Ok(Ok(report)) => BundleOutcome::Done {
                archive_location: report.archive_location,
                bad_links: report.bad_links,
            },
            Ok(Err(failure)) => {
                error!(task_id = %task_id, error = %failure, "Bundling failed");
                BundleOutcome::Failed {
                    bad_links: failure.bad_links,
                }
            }
            Err(e) => {
                error!(task_id = %task_id, error = %e, "Bundling run panicked");
                BundleOutcome::Failed { bad_links: urls }
            }
        };

        let status = outcome.status();
        BUNDLES_FINISHED.with_label_values(&[status.as_str()]).inc();
        BUNDLE_DURATION
            .with_label_values(&[status.as_str()])
            .observe(started.elapsed().as_secs_f64());

        match store.complete(&task_id, outcome) {
            Ok(task) => task.status == TaskStatus::Done,
            Err(e) => {
                error!(task_id = %task_id, error = %e, "Failed to record bundling outcome");
                false
            }
        }
    }
}
