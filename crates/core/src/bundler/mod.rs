//! Bundling pipeline: fetch every URL of a task and pack the results into
//! one archive.
//!
//! The pieces are swappable:
//! - [`Fetcher`] retrieves one resource ([`HttpFetcher`] in production)
//! - [`ArchiveStore`] creates one archive per task ([`ZipArchiveStore`])
//! - [`Bundler`] is the whole fetch-and-archive strategy
//!   ([`FetchAndArchive`] composes a fetcher and an archive store)
//! - [`BundleWorkerPool`] runs the strategy off the request path with
//!   bounded concurrency and applies the outcome to the task store
//!
//! # Example
//!
//! ```ignore
//! use linkpack_core::bundler::{FetchAndArchive, HttpFetcher, ZipArchiveStore};
//!
//! let bundler = FetchAndArchive::new(
//!     HttpFetcher::new(Some(Duration::from_secs(300)))?,
//!     ZipArchiveStore::new("archives", "http://localhost:8080"),
//! );
//! let report = bundler.bundle("a1b2c3", &urls).await?;
//! println!("{} ({} bad links)", report.archive_location, report.bad_links.len());
//! ```

mod error;
mod http_fetcher;
mod naming;
mod pipeline;
mod traits;
mod worker;
mod zip_store;

pub use error::{ArchiveError, BundleFailure, FetchError};
pub use http_fetcher::HttpFetcher;
pub use naming::{entry_base_name, EntryNamer};
pub use pipeline::FetchAndArchive;
pub use traits::{ArchiveStore, ArchiveWriter, BundleReport, Bundler, Fetcher};
pub use worker::{BundleJob, BundleWorkerPool, PoolStatus};
pub use zip_store::ZipArchiveStore;
