//! Sheet client factory for creating clients from configuration.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::{GoogleSheetsClient, MemorySheets, SheetClient, SheetsError};
use crate::config::SheetsConfig;

/// Hands out an authenticated [`SheetClient`] for one pipeline invocation.
///
/// Providers are built once at startup and shared by every request; the
/// client they return is not reused across requests.
#[async_trait]
pub trait SheetsProvider: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn SheetClient>, SheetsError>;
}

/// Authenticates against Google with the configured service account per call.
pub struct GoogleSheetsProvider {
    config: SheetsConfig,
}

impl GoogleSheetsProvider {
    pub fn new(config: SheetsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SheetsProvider for GoogleSheetsProvider {
    async fn connect(&self) -> Result<Arc<dyn SheetClient>, SheetsError> {
        let client = GoogleSheetsClient::connect(&self.config).await?;
        Ok(Arc::new(client))
    }
}

/// Always returns the same client. Used with [`MemorySheets`].
pub struct StaticSheetsProvider {
    client: Arc<dyn SheetClient>,
}

impl StaticSheetsProvider {
    pub fn new(client: Arc<dyn SheetClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SheetsProvider for StaticSheetsProvider {
    async fn connect(&self) -> Result<Arc<dyn SheetClient>, SheetsError> {
        Ok(self.client.clone())
    }
}

/// Create a provider from the configured client type.
///
/// # Errors
/// Returns error if the client type is unknown.
pub fn create_provider(config: &SheetsConfig) -> Result<Arc<dyn SheetsProvider>> {
    match config.client_type.as_str() {
        "google" => Ok(Arc::new(GoogleSheetsProvider::new(config.clone()))),
        "memory" => Ok(Arc::new(StaticSheetsProvider::new(Arc::new(MemorySheets::new())))),
        other => Err(anyhow!("Unknown sheets client type: {}", other)),
    }
}
