use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Task limits are at least 1
/// - Extension allowlist is non-empty and has no blank entries
/// - Bundler has a public base URL and at least one worker
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let tasks = &config.tasks;
    if tasks.max_files_per_task == 0 {
        return Err(ConfigError::ValidationError(
            "tasks.max_files_per_task must be at least 1".to_string(),
        ));
    }
    if tasks.max_active_tasks == 0 {
        return Err(ConfigError::ValidationError(
            "tasks.max_active_tasks must be at least 1".to_string(),
        ));
    }
    if tasks.allowed_extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "tasks.allowed_extensions cannot be empty".to_string(),
        ));
    }
    if tasks.allowed_extensions.iter().any(|e| e.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "tasks.allowed_extensions cannot contain blank entries".to_string(),
        ));
    }

    let bundler = &config.bundler;
    if bundler.public_base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "bundler.public_base_url cannot be empty".to_string(),
        ));
    }
    if bundler.max_concurrent_bundles == 0 {
        return Err(ConfigError::ValidationError(
            "bundler.max_concurrent_bundles must be at least 1".to_string(),
        ));
    }

    Ok(())
}
