use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::task::TaskLimits;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub bundler: BundlerConfig,
}

impl Config {
    /// Limits consumed by the task store and file accumulator.
    pub fn task_limits(&self) -> TaskLimits {
        TaskLimits {
            max_files_per_task: self.tasks.max_files_per_task,
            allowed_extensions: self.tasks.allowed_extensions.clone(),
            max_active_tasks: self.tasks.max_active_tasks,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Per-task and global task limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TasksConfig {
    /// Number of URLs a task accumulates before bundling starts.
    #[serde(default = "default_max_files_per_task")]
    pub max_files_per_task: usize,
    /// URL suffixes accepted by the file accumulator (case-insensitive).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Ceiling on tasks that are neither done nor failed.
    #[serde(default = "default_max_active_tasks")]
    pub max_active_tasks: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_files_per_task: default_max_files_per_task(),
            allowed_extensions: default_allowed_extensions(),
            max_active_tasks: default_max_active_tasks(),
        }
    }
}

fn default_max_files_per_task() -> usize {
    3
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".jpeg".to_string(), ".pdf".to_string()]
}

fn default_max_active_tasks() -> usize {
    3
}

/// Bundling pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BundlerConfig {
    /// Directory receiving finished archives.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
    /// Base URL prepended to archive locations reported to clients.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Number of bundling runs executing at the same time.
    #[serde(default = "default_max_concurrent_bundles")]
    pub max_concurrent_bundles: usize,
    /// Timeout for a single fetch in seconds (0 = no timeout).
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl BundlerConfig {
    /// Per-fetch timeout, `None` when disabled.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            archive_dir: default_archive_dir(),
            public_base_url: default_public_base_url(),
            max_concurrent_bundles: default_max_concurrent_bundles(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archives")
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_concurrent_bundles() -> usize {
    4
}

fn default_fetch_timeout() -> u64 {
    300 // 5 minutes
}
