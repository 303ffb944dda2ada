pub mod config;
pub mod error;

pub use config::{
    CatalogConfig, Config, ForecastConfig, GeocodingConfig, HttpConfig, LocationConfig,
    ValidationResult,
};
pub use error::{AppError, ConfigError};

use anyhow::{Context, Result};
use std::path::Path;

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Initialize logging to stderr
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Panahon core initialized");
    Ok(())
}

/// Initialize logging to a file, for when the terminal UI owns the screen
pub fn init_with_log_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();

    tracing::info!("Panahon core initialized, logging to {}", path.display());
    Ok(())
}
