//! Concurrency-safe task storage with admission control.
//!
//! Every read and write of task fields and of the active-task counter goes
//! through a single mutex. Critical sections never await, so a slow bundling
//! run never blocks create, add or status calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use super::error::{TaskError, ValidationError};
use super::id::{IdGenerator, RandomIdGenerator};
use super::limits::TaskLimits;
use super::types::{BundleOutcome, Task, TaskStatus, TaskStatusReport};

/// Result of a successful file append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The file was added; the task is still below its quota.
    Queued { files: usize },
    /// This append filled the quota. Carries the snapshot of files to bundle.
    QuotaReached { files: Vec<String> },
}

#[derive(Default)]
struct StoreState {
    tasks: HashMap<String, Task>,
    active: usize,
}

/// In-memory task store.
pub struct TaskStore {
    limits: TaskLimits,
    ids: Arc<dyn IdGenerator>,
    state: Mutex<StoreState>,
}

impl TaskStore {
    pub fn new(limits: TaskLimits) -> Self {
        Self::with_id_generator(limits, Arc::new(RandomIdGenerator))
    }

    pub fn with_id_generator(limits: TaskLimits, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            limits,
            ids,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn limits(&self) -> &TaskLimits {
        &self.limits
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Every mutation leaves the state consistent before it can panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new pending task if the active ceiling allows it.
    ///
    /// The ceiling check, insert and counter increment share one critical
    /// section, so concurrent creations cannot overshoot the limit.
    pub fn create(&self) -> Result<Task, TaskError> {
        let mut state = self.lock();
        if state.active >= self.limits.max_active_tasks {
            return Err(TaskError::AdmissionDenied {
                limit: self.limits.max_active_tasks,
            });
        }

        let task = Task::new(self.ids.generate());
        state.tasks.insert(task.id.clone(), task.clone());
        state.active += 1;
        info!(task_id = %task.id, active = state.active, "Task created");
        Ok(task)
    }

    /// Append a URL to a task.
    ///
    /// Checks run in order: task exists, quota not yet reached, URL non-empty,
    /// extension allowed. The append and the "quota just reached" check share
    /// one critical section, so exactly one caller ever sees `QuotaReached`.
    pub fn append_file(&self, task_id: &str, url: &str) -> Result<AppendOutcome, TaskError> {
        let mut state = self.lock();
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;

        let quota = self.limits.max_files_per_task;
        if task.files.len() >= quota {
            return Err(ValidationError::FileLimitReached { limit: quota }.into());
        }
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl.into());
        }
        if !self.limits.has_allowed_extension(url) {
            return Err(ValidationError::UnsupportedExtension {
                url: url.to_string(),
            }
            .into());
        }

        task.files.push(url.to_string());
        task.updated_at = Utc::now();
        debug!(task_id, url, files = task.files.len(), "File added to task");

        if task.files.len() == quota {
            info!(task_id, files = quota, "Task reached its file quota");
            Ok(AppendOutcome::QuotaReached {
                files: task.files.clone(),
            })
        } else {
            Ok(AppendOutcome::Queued {
                files: task.files.len(),
            })
        }
    }

    /// Move a pending task to `InProgress`.
    pub fn mark_in_progress(&self, task_id: &str) -> Result<(), TaskError> {
        let mut state = self.lock();
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
        Self::transition(task, TaskStatus::InProgress)?;
        Ok(())
    }

    /// Apply a bundling outcome and release the task's admission slot.
    ///
    /// Status, bad links, archive location and the counter decrement are
    /// applied together, so readers never observe a partial terminal state.
    pub fn complete(&self, task_id: &str, outcome: BundleOutcome) -> Result<Task, TaskError> {
        let mut state = self.lock();
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
        Self::transition(task, outcome.status())?;

        match outcome {
            BundleOutcome::Done {
                archive_location,
                bad_links,
            } => {
                task.archive_location = Some(archive_location);
                task.bad_links = bad_links;
            }
            BundleOutcome::Failed { bad_links } => {
                task.archive_location = None;
                task.bad_links = bad_links;
            }
        }
        let finished = task.clone();

        state.active = state.active.saturating_sub(1);
        info!(
            task_id,
            status = %finished.status,
            bad_links = finished.bad_links.len(),
            active = state.active,
            "Task finished"
        );
        Ok(finished)
    }

    fn transition(task: &mut Task, next: TaskStatus) -> Result<(), TaskError> {
        if !task.status.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                task_id: task.id.clone(),
                from: task.status,
                to: next,
            });
        }
        task.status = next;
        task.updated_at = Utc::now();
        Ok(())
    }

    /// Snapshot of a task's status fields.
    pub fn status(&self, task_id: &str) -> Result<TaskStatusReport, TaskError> {
        self.lock()
            .tasks
            .get(task_id)
            .map(Task::report)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))
    }

    /// Full copy of a task.
    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.lock().tasks.get(task_id).cloned()
    }

    /// All tasks ordered by creation time.
    pub fn list(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.lock().tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    /// Number of tasks per status.
    pub fn count_by_status(&self) -> HashMap<TaskStatus, usize> {
        let state = self.lock();
        let mut counts: HashMap<TaskStatus, usize> =
            TaskStatus::all().into_iter().map(|s| (s, 0)).collect();
        for task in state.tasks.values() {
            *counts.entry(task.status).or_default() += 1;
        }
        counts
    }

    /// Tasks counted against the admission ceiling.
    pub fn active_count(&self) -> usize {
        self.lock().active
    }

    /// Total number of tasks ever created.
    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
