//! Core of the link bundling service.
//!
//! Clients create tasks, submit file URLs to them, and poll their status.
//! Once a task has collected its quota of URLs, a background worker fetches
//! every URL and packs the successful downloads into a zip archive.

pub mod bundler;
pub mod config;
pub mod manager;
pub mod metrics;
pub mod task;
pub mod testing;

pub use bundler::{
    ArchiveError, ArchiveStore, ArchiveWriter, BundleFailure, BundleJob, BundleReport,
    BundleWorkerPool, Bundler, FetchAndArchive, FetchError, Fetcher, HttpFetcher, PoolStatus,
    ZipArchiveStore,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, BundlerConfig,
    Config, ConfigError, ServerConfig, TasksConfig,
};
pub use manager::TaskManager;
pub use task::{
    Task, TaskError, TaskLimits, TaskStatus, TaskStatusReport, TaskStore, ValidationError,
};
