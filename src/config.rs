//! Configuration management for Saint Sync
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    CONFIG_GENERATED, DATABASE_URL_ENV, DEFAULT_BIND_ADDRESS, DEFAULT_CREDENTIALS_ENV, DEFAULT_DATABASE_URL,
    EXPORT_RECORD_DELAY, PREVIEW_BATCH_SIZE, PREVIEW_CALL_DELAY, SHEETS_API_BASE_URL, SYNC_CALL_DELAY,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sheets: SheetsConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_address: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SeaORM connection URL; `DATABASE_URL` overrides it
    pub url: String,
}

/// Spreadsheet API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Client type: "google" or "memory"
    pub client_type: String,
    /// Path to the service account JSON key
    pub credentials_path: Option<PathBuf>,
    /// Environment variable consulted when `credentials_path` is not set
    pub credentials_env: String,
    /// Base URL of the Sheets REST API
    pub api_base_url: String,
    /// Token endpoint override (defaults to the key file's `token_uri`)
    pub token_url: Option<String>,
}

/// Sync pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay before each sheet call during preview, in milliseconds
    pub preview_delay_ms: u64,
    /// Delay before each sheet call during import and export, in milliseconds
    pub sync_delay_ms: u64,
    /// Per-record throttle during export, in milliseconds
    pub export_record_delay_ms: u64,
    /// Number of locations fetched concurrently by preview
    pub preview_batch_size: usize,
    /// Require a saint number on historical and milestone rows.
    /// When disabled, rows without one are matched by year or beer count.
    pub require_business_keys: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to a file
    pub enabled: bool,
    /// Log level filter ("error", "warn", "info", "debug", "trace")
    pub level: String,
    /// Log file path; defaults to the platform data directory
    pub file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            client_type: "google".to_string(),
            credentials_path: None,
            credentials_env: DEFAULT_CREDENTIALS_ENV.to_string(),
            api_base_url: SHEETS_API_BASE_URL.to_string(),
            token_url: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            preview_delay_ms: PREVIEW_CALL_DELAY.as_millis() as u64,
            sync_delay_ms: SYNC_CALL_DELAY.as_millis() as u64,
            export_record_delay_ms: EXPORT_RECORD_DELAY.as_millis() as u64,
            preview_batch_size: PREVIEW_BATCH_SIZE,
            require_business_keys: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl SheetsConfig {
    /// Resolve the credential path from the config file or the environment.
    pub fn resolve_credentials_path(&self) -> Option<PathBuf> {
        self.credentials_path.clone().or_else(|| {
            std::env::var(&self.credentials_env)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
    }
}

impl SyncConfig {
    pub fn preview_delay(&self) -> Duration {
        Duration::from_millis(self.preview_delay_ms)
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    pub fn export_record_delay(&self) -> Duration {
        Duration::from_millis(self.export_record_delay_ms)
    }

    /// Configuration with every delay set to zero, for tests and dry runs.
    pub fn without_delays() -> Self {
        Self {
            preview_delay_ms: 0,
            sync_delay_ms: 0,
            export_record_delay_ms: 0,
            ..Self::default()
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from("saint-sync.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("saint-sync").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("Invalid server.bind_address '{}'", self.server.bind_address);
        }

        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url cannot be empty");
        }

        match self.sheets.client_type.as_str() {
            "google" | "memory" => {}
            other => anyhow::bail!("Unsupported sheets.client_type '{}'", other),
        }

        if self.sheets.credentials_env.trim().is_empty() {
            anyhow::bail!("sheets.credentials_env cannot be empty");
        }

        if self.sync.preview_batch_size == 0 {
            anyhow::bail!("sync.preview_batch_size must be at least 1");
        }

        if self.sync.preview_delay_ms > 60_000 || self.sync.sync_delay_ms > 60_000 {
            anyhow::bail!("sync delays cannot exceed 60000 ms");
        }

        if log_level_filter(&self.logging.level).is_none() {
            anyhow::bail!("Invalid logging.level '{}'", self.logging.level);
        }

        Ok(())
    }

    /// Database URL with the `DATABASE_URL` environment override applied
    pub fn database_url(&self) -> String {
        std::env::var(DATABASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.database.url.clone())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# Saint Sync Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        log::info!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("saint-sync"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}

/// Parse a textual log level.
pub fn log_level_filter(level: &str) -> Option<log::LevelFilter> {
    level.trim().parse::<log::LevelFilter>().ok()
}
