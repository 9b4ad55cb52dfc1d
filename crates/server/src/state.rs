use std::sync::Arc;
use linkpack_core::{Config, TaskManager};

/// Shared application state
pub struct AppState {
    config: Config,
    tasks: Arc<TaskManager>,
}

impl AppState {
    pub fn new(config: Config, tasks: Arc<TaskManager>) -> Self {
        Self { config, tasks }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tasks(&self) -> &TaskManager {
        self.tasks.as_ref()
    }
}
