//! Task lifecycle tests.
//!
//! Drives the task manager through creation, file submission and bundling
//! with a mock fetcher and the real zip archive store, and checks the
//! archives left on disk.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tempfile::TempDir;

use linkpack_core::testing::{MockBundler, MockFetcher};
use linkpack_core::{
    FetchAndArchive, FetchError, TaskError, TaskLimits, TaskManager, TaskStatus,
    TaskStatusReport, ValidationError, ZipArchiveStore,
};

const BASE_URL: &str = "http://localhost:8080";

fn limits(max_files_per_task: usize, max_active_tasks: usize) -> TaskLimits {
    TaskLimits {
        max_files_per_task,
        allowed_extensions: vec![".pdf".to_string(), ".jpeg".to_string()],
        max_active_tasks,
    }
}

fn zip_manager(dir: &Path, fetcher: &MockFetcher, limits: TaskLimits) -> TaskManager {
    let bundler = FetchAndArchive::new(fetcher.clone(), ZipArchiveStore::new(dir, BASE_URL));
    TaskManager::new(limits, Arc::new(bundler), 2)
}

async fn wait_for_terminal(manager: &TaskManager, id: &str) -> TaskStatusReport {
    for _ in 0..300 {
        let report = manager.status(id).unwrap();
        if report.status.is_terminal() {
            return report;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {} did not finish", id);
}

fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

#[tokio::test]
async fn test_partial_failure_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new();
    fetcher
        .set_response("http://files.test/a/report.pdf", b"report".to_vec())
        .await;
    fetcher
        .set_error(
            "http://files.test/b/broken.pdf",
            FetchError::Request("connection refused".to_string()),
        )
        .await;
    fetcher
        .set_response("http://files.test/c/photo.jpeg", b"photo".to_vec())
        .await;

    let manager = zip_manager(temp_dir.path(), &fetcher, limits(3, 3));
    let id = manager.create_task().unwrap();

    manager.add_file(&id, "http://files.test/a/report.pdf").unwrap();
    manager.add_file(&id, "http://files.test/b/broken.pdf").unwrap();
    let before = manager.status(&id).unwrap();
    assert_eq!(before.status, TaskStatus::Pending);
    assert!(before.archive_location.is_none());

    manager.add_file(&id, "http://files.test/c/photo.jpeg").unwrap();

    let report = wait_for_terminal(&manager, &id).await;
    assert_eq!(report.status, TaskStatus::Done);
    assert_eq!(report.bad_links, vec!["http://files.test/b/broken.pdf"]);
    assert_eq!(
        report.archive_location.as_deref(),
        Some(format!("{}/archives/{}.zip", BASE_URL, id).as_str())
    );

    let entries = read_zip(&temp_dir.path().join(format!("{}.zip", id)));
    assert_eq!(
        entries,
        vec![
            ("report.pdf".to_string(), b"report".to_vec()),
            ("photo.jpeg".to_string(), b"photo".to_vec()),
        ]
    );

    // Fetched sequentially in submission order
    assert_eq!(
        fetcher.recorded_urls().await,
        vec![
            "http://files.test/a/report.pdf",
            "http://files.test/b/broken.pdf",
            "http://files.test/c/photo.jpeg",
        ]
    );
}

#[tokio::test]
async fn test_name_collisions_in_archive() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new();
    for (url, body) in [
        ("http://one.test/file.pdf", "one"),
        ("http://two.test/file.pdf", "two"),
        ("http://three.test/x/file.pdf", "three"),
    ] {
        fetcher.set_response(url, body.as_bytes().to_vec()).await;
    }

    let manager = zip_manager(temp_dir.path(), &fetcher, limits(3, 3));
    let id = manager.create_task().unwrap();
    manager.add_file(&id, "http://one.test/file.pdf").unwrap();
    manager.add_file(&id, "http://two.test/file.pdf").unwrap();
    manager.add_file(&id, "http://three.test/x/file.pdf").unwrap();

    let report = wait_for_terminal(&manager, &id).await;
    assert_eq!(report.status, TaskStatus::Done);

    let names: Vec<String> = read_zip(&temp_dir.path().join(format!("{}.zip", id)))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["file.pdf", "file (1).pdf", "file (2).pdf"]);
}

#[tokio::test]
async fn test_archive_failure_ends_in_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let fetcher = MockFetcher::new();
    fetcher
        .set_response("http://files.test/a.pdf", b"a".to_vec())
        .await;

    let manager = zip_manager(&blocker, &fetcher, limits(1, 1));
    let id = manager.create_task().unwrap();
    manager.add_file(&id, "http://files.test/a.pdf").unwrap();

    let report = wait_for_terminal(&manager, &id).await;
    assert_eq!(report.status, TaskStatus::Error);
    assert!(report.archive_location.is_none());
    assert_eq!(report.bad_links, vec!["http://files.test/a.pdf"]);

    // A failed task no longer counts against the ceiling
    assert_eq!(manager.active_tasks(), 0);
    assert!(manager.create_task().is_ok());
}

#[tokio::test]
async fn test_admission_ceiling_under_concurrency() {
    let manager = Arc::new(TaskManager::new(
        limits(3, 5),
        Arc::new(MockBundler::new()),
        2,
    ));

    let attempts = (0..20).map(|_| {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.create_task() })
    });
    let results: Vec<Result<String, TaskError>> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let denied = results
        .iter()
        .filter(|r| matches!(r, Err(TaskError::AdmissionDenied { limit: 5 })))
        .count();
    assert_eq!(created, 5);
    assert_eq!(denied, 15);
    assert_eq!(manager.active_tasks(), 5);
}

#[tokio::test]
async fn test_quota_reached_exactly_once_under_concurrency() {
    let bundler = MockBundler::new();
    let manager = Arc::new(TaskManager::new(
        limits(3, 3),
        Arc::new(bundler.clone()),
        2,
    ));
    let id = manager.create_task().unwrap();

    let submissions = (0..12).map(|i| {
        let manager = Arc::clone(&manager);
        let id = id.clone();
        tokio::spawn(async move {
            manager.add_file(&id, &format!("http://files.test/{}.pdf", i))
        })
    });
    let results: Vec<Result<(), TaskError>> = join_all(submissions)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        TaskError::Validation(ValidationError::FileLimitReached { limit: 3 })
    )));

    let report = wait_for_terminal(&manager, &id).await;
    assert_eq!(report.status, TaskStatus::Done);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let runs = bundler.recorded_runs().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].urls.len(), 3);
    assert_eq!(manager.store().get(&id).unwrap().files, runs[0].urls);
}

#[tokio::test]
async fn test_in_progress_is_observable() {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = MockFetcher::new();
    fetcher
        .set_response("http://files.test/slow.pdf", b"slow".to_vec())
        .await;
    fetcher.set_fetch_delay(Duration::from_millis(300)).await;

    let manager = zip_manager(temp_dir.path(), &fetcher, limits(1, 1));
    let id = manager.create_task().unwrap();
    manager.add_file(&id, "http://files.test/slow.pdf").unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let report = manager.status(&id).unwrap();
    assert_eq!(report.status, TaskStatus::InProgress);
    assert!(report.archive_location.is_none());
    assert!(report.bad_links.is_empty());

    // Still counted as active, so no new task is admitted
    assert!(matches!(
        manager.create_task(),
        Err(TaskError::AdmissionDenied { .. })
    ));

    let report = wait_for_terminal(&manager, &id).await;
    assert_eq!(report.status, TaskStatus::Done);
}

#[tokio::test]
async fn test_unknown_task() {
    let manager = TaskManager::new(limits(3, 3), Arc::new(MockBundler::new()), 1);

    assert!(matches!(
        manager.status("deadbeefdeadbeef"),
        Err(TaskError::NotFound(_))
    ));
    assert!(matches!(
        manager.add_file("deadbeefdeadbeef", "http://files.test/a.pdf"),
        Err(TaskError::NotFound(_))
    ));
}
