use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config
fn minimal_config(port: u16, archive_dir: &std::path::Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[bundler]
archive_dir = "{}"
"#,
        port,
        archive_dir.display()
    )
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_linkpack"))
        .env("LINKPACK_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_binary_serves_task_api() {
    let port = get_available_port();
    let archive_dir = TempDir::new().unwrap();

    // Write temp config file
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(minimal_config(port, archive_dir.path()).as_bytes())
        .unwrap();
    temp_file.flush().unwrap();

    // Start server
    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("http://127.0.0.1:{}/api/v1/tasks", port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_fails() {
    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_linkpack"))
        .env("LINKPACK_CONFIG", "/nonexistent/linkpack.toml")
        .env("RUST_LOG", "error")
        .output()
        .await
        .expect("Failed to run server");

    assert!(!output.status.success());
}

#[tokio::test]
async fn test_invalid_config_fails() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[tasks]\nmax_files_per_task = 0\n")
        .unwrap();
    temp_file.flush().unwrap();

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_linkpack"))
        .env("LINKPACK_CONFIG", temp_file.path())
        .env("RUST_LOG", "error")
        .output()
        .await
        .expect("Failed to run server");

    assert!(!output.status.success());
}
