//! Task API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use linkpack_core::{Task, TaskError, TaskStatus, TaskStatusReport};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for adding a file to a task
#[derive(Debug, Deserialize)]
pub struct AddFileBody {
    /// Remote URL of the file. Missing is treated as empty.
    #[serde(default)]
    pub url: String,
}

/// Response for task creation
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub task_id: String,
}

/// Response for a successful file submission
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Status of a single task
#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub status: TaskStatus,
    /// Empty until the task is done.
    pub archive_url: String,
    pub error_files: Vec<String>,
}

impl From<TaskStatusReport> for TaskStatusResponse {
    fn from(report: TaskStatusReport) -> Self {
        Self {
            status: report.status,
            archive_url: report.archive_location.unwrap_or_default(),
            error_files: report.bad_links,
        }
    }
}

/// Task entry in list responses
#[derive(Debug, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub status: TaskStatus,
    pub files: Vec<String>,
    pub bad_links: Vec<String>,
    pub archive_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskSummary {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            status: task.status,
            files: task.files,
            bad_links: task.bad_links,
            archive_url: task.archive_location.unwrap_or_default(),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing tasks
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskSummary>,
    pub total: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TaskErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(TaskErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn task_error_response(err: TaskError) -> Response {
    let status = match &err {
        TaskError::AdmissionDenied { .. } => StatusCode::TOO_MANY_REQUESTS,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::Validation(_) => StatusCode::BAD_REQUEST,
        TaskError::InvalidTransition { .. } => {
            error!(error = %err, "Unexpected task transition");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new task
pub async fn create_task(State(state): State<Arc<AppState>>) -> Response {
    match state.tasks().create_task() {
        Ok(task_id) => {
            debug!(task_id = %task_id, "Task created");
            (StatusCode::CREATED, Json(CreateTaskResponse { task_id })).into_response()
        }
        Err(e) => task_error_response(e),
    }
}

/// List all tasks
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<ListTasksResponse> {
    let tasks: Vec<TaskSummary> = state
        .tasks()
        .list_tasks()
        .into_iter()
        .map(TaskSummary::from)
        .collect();
    let total = tasks.len();
    Json(ListTasksResponse { tasks, total })
}

/// Add a file URL to a task
pub async fn add_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<AddFileBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.tasks().add_file(&id, &body.url) {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "File queued".to_string(),
            }),
        )
            .into_response(),
        Err(e) => task_error_response(e),
    }
}

/// Get the status of a task
pub async fn get_status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.tasks().status(&id) {
        Ok(report) => Json(TaskStatusResponse::from(report)).into_response(),
        Err(e) => task_error_response(e),
    }
}
