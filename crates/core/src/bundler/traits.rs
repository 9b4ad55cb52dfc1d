//! Trait definitions for the bundling pipeline.

use async_trait::async_trait;

use super::error::{ArchiveError, BundleFailure, FetchError};

/// Retrieves one remote resource.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetch the full body of `url`. Non-success responses are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Creates archives, one per task.
pub trait ArchiveStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Open a new archive for the task.
    fn create(&self, task_id: &str) -> Result<Box<dyn ArchiveWriter>, ArchiveError>;
}

/// An archive being written. Methods perform blocking I/O.
pub trait ArchiveWriter: Send {
    /// Add one entry. The name is already unique within this archive.
    fn add_entry(&mut self, name: &str, content: &[u8]) -> Result<(), ArchiveError>;

    /// Close the archive and return its location.
    fn finish(self: Box<Self>) -> Result<String, ArchiveError>;
}

/// Result of a bundling run that produced an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    /// Where the archive can be retrieved.
    pub archive_location: String,
    /// Entry names written, in order.
    pub entries: Vec<String>,
    /// URLs that failed, in the order encountered.
    pub bad_links: Vec<String>,
}

/// Fetch-and-archive strategy run once per task.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Returns the name of this bundler implementation.
    fn name(&self) -> &str;

    /// Fetch `urls` in order and archive the successes.
    ///
    /// Per-file failures end up in [`BundleReport::bad_links`]; only a
    /// failure to produce the archive at all is returned as an error.
    async fn bundle(&self, task_id: &str, urls: &[String]) -> Result<BundleReport, BundleFailure>;
}
