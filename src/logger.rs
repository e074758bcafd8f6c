//! Logging setup built on `fern`.
//!
//! Everything goes to stderr; when file logging is enabled the same lines are
//! appended to a log file as well.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;

use crate::config::{log_level_filter, LoggingConfig};

/// Default log file location: `<data_local_dir>/saint-sync/saint-sync.log`
pub fn get_log_file_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
        .map(|dir| dir.join("saint-sync").join("saint-sync.log"))
}

/// Build the dispatch described by the logging configuration without
/// installing it.
pub fn build_dispatch(config: &LoggingConfig) -> Result<fern::Dispatch> {
    let level = log_level_filter(&config.level)
        .ok_or_else(|| anyhow::anyhow!("Invalid log level '{}'", config.level))?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {:<5} {}: {}",
                Utc::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // sqlx logs every statement at info
        .level_for("sqlx", log::LevelFilter::Warn)
        .level_for("sea_orm", log::LevelFilter::Warn)
        .chain(std::io::stderr());

    if config.enabled {
        let path = match &config.file {
            Some(path) => path.clone(),
            None => get_log_file_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    Ok(dispatch)
}

/// Install the global logger.
///
/// # Errors
/// Returns error if the log file cannot be opened or a logger is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    build_dispatch(config)?
        .apply()
        .context("Failed to install logger")?;
    Ok(())
}
