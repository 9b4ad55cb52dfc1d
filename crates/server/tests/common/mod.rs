//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router with a mock
//! bundler injected, so the task API can be exercised without any network
//! access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use linkpack_core::testing::MockBundler;
use linkpack_core::{BundlerConfig, Config, ServerConfig, TaskManager, TasksConfig};
use linkpack_server::{api::create_router, state::AppState};

/// Test fixture for API testing with a mock bundler.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_task_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post_empty("/api/v1/tasks").await;
///
///     assert_eq!(response.status, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock bundler - control bundling outcomes
    pub bundler: MockBundler,
    /// Archive directory served under /archives
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Limits used by the fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub max_files_per_task: usize,
    pub max_active_tasks: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_files_per_task: 3,
            max_active_tasks: 3,
            allowed_extensions: vec![".pdf".to_string(), ".jpeg".to_string()],
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default limits.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom limits.
    pub fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            tasks: TasksConfig {
                max_files_per_task: test_config.max_files_per_task,
                allowed_extensions: test_config.allowed_extensions,
                max_active_tasks: test_config.max_active_tasks,
            },
            bundler: BundlerConfig {
                archive_dir: temp_dir.path().to_path_buf(),
                ..Default::default()
            },
        };

        let bundler = MockBundler::new();
        let tasks = Arc::new(TaskManager::new(
            config.task_limits(),
            Arc::new(bundler.clone()),
            config.bundler.max_concurrent_bundles,
        ));

        let state = Arc::new(AppState::new(config, tasks));
        let router = create_router(state);

        Self {
            router,
            bundler,
            temp_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Create a task and return its id.
    pub async fn create_task(&self) -> String {
        let response = self.post_empty("/api/v1/tasks").await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["task_id"]
            .as_str()
            .expect("task_id missing")
            .to_string()
    }

    /// Submit a URL to a task.
    pub async fn add_file(&self, task_id: &str, url: &str) -> TestResponse {
        self.post(
            &format!("/api/v1/tasks/{}/files", task_id),
            serde_json::json!({ "url": url }),
        )
        .await
    }

    /// Poll a task's status until it reaches a terminal state.
    pub async fn wait_for_terminal(&self, task_id: &str) -> TestResponse {
        for _ in 0..200 {
            let response = self.get(&format!("/api/v1/tasks/{}", task_id)).await;
            let status = response.body["status"].as_str().unwrap_or_default();
            if status == "done" || status == "error" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} did not reach a terminal state", task_id);
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
