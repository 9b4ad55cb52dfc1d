//! Error types for the bundling pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// A single resource could not be fetched. Recorded as a bad link.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("Unexpected status {status}")]
    Status { status: u16 },

    /// The body could not be read to the end.
    #[error("Failed to read body: {0}")]
    Body(String),
}

/// The archive itself could not be produced. Fatal for the task.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failed to create the archive file or its directory.
    #[error("Failed to create archive at {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an entry.
    #[error("Failed to write entry {entry} to {path}: {reason}")]
    WriteFailed {
        path: PathBuf,
        entry: String,
        reason: String,
    },

    /// Failed to flush, close or publish the archive.
    #[error("Failed to finalize archive at {path}: {reason}")]
    FinalizeFailed { path: PathBuf, reason: String },

    /// A blocking archive operation panicked or was cancelled.
    #[error("Archive worker failed: {0}")]
    WorkerPanicked(String),
}

/// A bundling run that ended without an archive.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct BundleFailure {
    #[source]
    pub error: ArchiveError,
    /// URLs that failed before the run was aborted.
    pub bad_links: Vec<String>,
}

impl BundleFailure {
    pub fn new(error: ArchiveError, bad_links: Vec<String>) -> Self {
        Self { error, bad_links }
    }
}
