//! Task manager: the operations exposed to the routing layer.
//!
//! Ties the task store to the bundling worker pool. Creation goes through
//! admission control, file submission through the accumulator, and the
//! submission that fills a task's quota hands a snapshot of its files to the
//! pool exactly once.

use std::sync::Arc;

use tracing::warn;

use crate::bundler::{BundleJob, BundleWorkerPool, Bundler, PoolStatus};
use crate::metrics::{ADMISSIONS_DENIED, FILES_ACCEPTED, FILES_REJECTED, TASKS_CREATED};
use crate::task::{AppendOutcome, Task, TaskError, TaskLimits, TaskStatusReport, TaskStore};

/// Entry point for create, add and status operations.
pub struct TaskManager {
    store: Arc<TaskStore>,
    pool: BundleWorkerPool,
}

impl TaskManager {
    /// Create a manager with its own store.
    pub fn new(limits: TaskLimits, bundler: Arc<dyn Bundler>, max_concurrent_bundles: usize) -> Self {
        Self::with_store(Arc::new(TaskStore::new(limits)), bundler, max_concurrent_bundles)
    }

    /// Create a manager around an existing store.
    pub fn with_store(
        store: Arc<TaskStore>,
        bundler: Arc<dyn Bundler>,
        max_concurrent_bundles: usize,
    ) -> Self {
        let pool = BundleWorkerPool::new(Arc::clone(&store), bundler, max_concurrent_bundles);
        Self { store, pool }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn limits(&self) -> &TaskLimits {
        self.store.limits()
    }

    /// Create a task, or fail with `AdmissionDenied` when at capacity.
    pub fn create_task(&self) -> Result<String, TaskError> {
        match self.store.create() {
            Ok(task) => {
                TASKS_CREATED.inc();
                Ok(task.id)
            }
            Err(e) => {
                if matches!(e, TaskError::AdmissionDenied { .. }) {
                    ADMISSIONS_DENIED.inc();
                    warn!(error = %e, "Task creation rejected");
                }
                Err(e)
            }
        }
    }

    /// Add a file URL to a task.
    ///
    /// When this call fills the quota, bundling is queued before returning.
    /// Must be called from within a Tokio runtime.
    pub fn add_file(&self, task_id: &str, url: &str) -> Result<(), TaskError> {
        match self.store.append_file(task_id, url) {
            Ok(AppendOutcome::Queued { .. }) => {
                FILES_ACCEPTED.inc();
                Ok(())
            }
            Ok(AppendOutcome::QuotaReached { files }) => {
                FILES_ACCEPTED.inc();
                self.pool.submit(BundleJob {
                    task_id: task_id.to_string(),
                    urls: files,
                });
                Ok(())
            }
            Err(e) => {
                let reason = match &e {
                    TaskError::Validation(v) => v.reason(),
                    TaskError::NotFound(_) => "not_found",
                    _ => "other",
                };
                FILES_REJECTED.with_label_values(&[reason]).inc();
                Err(e)
            }
        }
    }

    /// Current status, archive location and bad links of a task.
    pub fn status(&self, task_id: &str) -> Result<TaskStatusReport, TaskError> {
        self.store.status(task_id)
    }

    /// All tasks ordered by creation time.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.store.list()
    }

    /// Tasks counted against the admission ceiling.
    pub fn active_tasks(&self) -> usize {
        self.store.active_count()
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }
}
