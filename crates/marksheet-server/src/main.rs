//! Server binary for the Marksheet academic records backend.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `marksheet.yaml` (or `MARKSHEET_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the `PostgreSQL` pool
//! 4. Apply pending migrations
//! 5. Serve the HTTP API until `Ctrl-C`
//! 6. Close the pool

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use marksheet_api::AppState;
use marksheet_db::PostgresPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat, LoggingSection};
use crate::error::AppError;

/// Config file read when `MARKSHEET_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "marksheet.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, database setup, or serving fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    let (config, config_path) = load_config()?;
    init_logging(&config.logging)?;

    info!("marksheet-server starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        pass_rule = ?config.grading.pass_rule,
        cgpa_mode = ?config.grading.cgpa_mode,
        overall_pass_percentage = %config.grading.overall_pass_percentage,
        "Grading policy"
    );

    let pool = PostgresPool::connect(&config.database.to_postgres_config()).await?;
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }

    let state = Arc::new(AppState::new(pool.store(), config.grading.clone()));
    let served = marksheet_api::start_server(&config.server.to_server_config(), state).await;

    pool.close().await;
    served?;
    info!("marksheet-server stopped");
    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent.
///
/// Returns the path that was read, if any.
fn load_config() -> Result<(AppConfig, Option<PathBuf>), AppError> {
    let path = std::env::var("MARKSHEET_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = AppConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = AppConfig::default();
        config.apply_env_overrides()?;
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingSection) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}
