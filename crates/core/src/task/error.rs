//! Error types for task operations.

use thiserror::Error;

use super::TaskStatus;

/// Errors returned synchronously by create, add and status operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The active task ceiling has been reached.
    #[error("too many active tasks (limit: {limit})")]
    AdmissionDenied { limit: usize },

    /// No task exists with the given identifier.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The submitted file was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A status change that would move the task backwards.
    #[error("cannot move task {task_id} from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

/// Reasons a file submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    EmptyUrl,

    #[error("task file limit reached ({limit} files)")]
    FileLimitReached { limit: usize },

    #[error("unsupported file extension: {url}")]
    UnsupportedExtension { url: String },
}

impl ValidationError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyUrl => "empty_url",
            Self::FileLimitReached { .. } => "file_limit",
            Self::UnsupportedExtension { .. } => "extension",
        }
    }
}
