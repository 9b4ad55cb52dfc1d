use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkpack_core::{
    load_config, load_config_from_env, validate_config, Bundler, FetchAndArchive, HttpFetcher,
    TaskManager, ZipArchiveStore,
};
use linkpack_server::api::create_router;
use linkpack_server::state::AppState;

/// Config file used when `LINKPACK_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path. An explicit path must exist; the default one is optional.
    let config = match std::env::var("LINKPACK_CONFIG") {
        Ok(path) => {
            let config_path = PathBuf::from(path);
            info!("Loading configuration from {:?}", config_path);
            load_config(&config_path)
                .with_context(|| format!("Failed to load config from {:?}", config_path))?
        }
        Err(_) => {
            let config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if config_path.exists() {
                info!("Loading configuration from {:?}", config_path);
                load_config(&config_path)
                    .with_context(|| format!("Failed to load config from {:?}", config_path))?
            } else {
                info!("No config file found, using defaults and environment");
                load_config_from_env().context("Failed to load config from environment")?
            }
        }
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        max_files_per_task = config.tasks.max_files_per_task,
        max_active_tasks = config.tasks.max_active_tasks,
        allowed_extensions = ?config.tasks.allowed_extensions,
        "Task limits"
    );
    info!("Archive directory: {:?}", config.bundler.archive_dir);

    // Create bundler: HTTP fetcher + zip archives on local disk
    let fetcher = HttpFetcher::new(config.bundler.fetch_timeout())
        .context("Failed to create HTTP client")?;
    let archives = ZipArchiveStore::new(
        config.bundler.archive_dir.clone(),
        config.bundler.public_base_url.clone(),
    );
    let bundler: Arc<dyn Bundler> = Arc::new(FetchAndArchive::new(fetcher, archives));
    info!("Using bundler: {}", bundler.name());

    // Create task manager with its bundling pool
    let tasks = Arc::new(TaskManager::new(
        config.task_limits(),
        bundler,
        config.bundler.max_concurrent_bundles,
    ));
    info!(
        "Bundling pool started (max concurrent: {})",
        config.bundler.max_concurrent_bundles
    );

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), tasks));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
