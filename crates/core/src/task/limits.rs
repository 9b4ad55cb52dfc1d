/// Limits enforced by the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLimits {
    /// Quota of URLs per task; reaching it triggers bundling.
    pub max_files_per_task: usize,
    /// Accepted URL suffixes, compared case-insensitively.
    pub allowed_extensions: Vec<String>,
    /// Ceiling on tasks that have not reached a terminal status.
    pub max_active_tasks: usize,
}

impl TaskLimits {
    /// Whether the URL ends with one of the allowed suffixes.
    pub fn has_allowed_extension(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| url.ends_with(&ext.to_lowercase()))
    }
}

impl Default for TaskLimits {
    fn default() -> Self {
        Self {
            max_files_per_task: 3,
            allowed_extensions: vec![".jpeg".to_string(), ".pdf".to_string()],
            max_active_tasks: 3,
        }
    }
}
