//! Task data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a task.
///
/// Transitions only move forward: `Pending -> InProgress -> {Done, Error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accumulating files, or waiting for a bundling worker.
    Pending,
    /// A bundling run is fetching and archiving files.
    InProgress,
    /// The archive was produced (possibly with bad links).
    Done,
    /// The archive could not be produced.
    Error,
}

impl TaskStatus {
    /// Returns true for `Done` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }

    /// Whether moving to `next` respects the lifecycle order.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Done)
                | (TaskStatus::InProgress, TaskStatus::Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Error => "error",
        }
    }

    pub fn all() -> [TaskStatus; 4] {
        [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Error,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work: a bounded list of URLs bundled into one archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    /// Submitted URLs in submission order.
    pub files: Vec<String>,
    /// URLs that could not be fetched or archived, in the order encountered.
    pub bad_links: Vec<String>,
    /// Set only once the task is `Done`.
    pub archive_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: TaskStatus::Pending,
            files: Vec::new(),
            bad_links: Vec::new(),
            archive_location: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn report(&self) -> TaskStatusReport {
        TaskStatusReport {
            status: self.status,
            archive_location: self.archive_location.clone(),
            bad_links: self.bad_links.clone(),
        }
    }
}

/// Consistent snapshot returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatusReport {
    pub status: TaskStatus,
    pub archive_location: Option<String>,
    pub bad_links: Vec<String>,
}

/// Result of a bundling run, applied in the terminal transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    /// Archive produced at `archive_location`.
    Done {
        archive_location: String,
        bad_links: Vec<String>,
    },
    /// Archive could not be produced.
    Failed { bad_links: Vec<String> },
}

impl BundleOutcome {
    pub fn status(&self) -> TaskStatus {
        match self {
            BundleOutcome::Done { .. } => TaskStatus::Done,
            BundleOutcome::Failed { .. } => TaskStatus::Error,
        }
    }
}
