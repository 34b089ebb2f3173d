pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod pipeline;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Initialization failed: {0}")]
    Core(#[from] core_state::CoreError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration, reconcile storage, then serve the API until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    for dir in [
        &config.storage.uploads_dir,
        &config.storage.generated_dir,
        &config.storage.merged_dir,
    ] {
        pipeline::storage::ensure_dir(dir).await?;
    }

    let core = Arc::new(core_state::CoreState::from_config(&config)?);
    // Uploads whose record never landed are removed before any request.
    core.reconcile_uploads()?;

    let server = api::serve(core, config.bind_addr).await?;
    tracing::info!(addr = %server.local_addr, "Listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}
