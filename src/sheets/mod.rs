//! Spreadsheet client abstraction.
//!
//! This module defines the interface every spreadsheet backend implements, the
//! error taxonomy surfaced to the sync pipelines, and the rate-limiting wrapper
//! the pipelines actually talk to.

use async_trait::async_trait;

pub mod auth;
pub mod factory;
pub mod google;
pub mod memory;
pub mod rate_limited;

pub use factory::{create_provider, GoogleSheetsProvider, SheetsProvider, StaticSheetsProvider};
pub use google::GoogleSheetsClient;
pub use memory::MemorySheets;
pub use rate_limited::RateLimitedClient;

/// Raw cell values of one tab, row-major. The first row is usually the header.
pub type SheetValues = Vec<Vec<String>>;

/// Errors surfaced by spreadsheet operations.
///
/// Every variant renders a message that can be shown to an administrator as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetsError {
    #[error("Unable to read tab '{range}': the tab does not exist or is not accessible")]
    RangeParse { range: String },

    #[error("Access denied to spreadsheet {spreadsheet_id}. Share it with the service account email and try again")]
    AccessDenied { spreadsheet_id: String },

    #[error("Spreadsheet {spreadsheet_id} not found. Check the spreadsheet ID")]
    NotFound { spreadsheet_id: String },

    #[error("Google Sheets API quota exceeded: {0}")]
    Quota(String),

    #[error("Sheets configuration error: {0}")]
    Config(String),

    #[error("Google Sheets request failed: {0}")]
    Other(String),
}

impl SheetsError {
    /// Whether this failure is a rate-limit signal worth one retry.
    pub fn is_quota(&self) -> bool {
        match self {
            SheetsError::Quota(_) => true,
            SheetsError::Other(message) => is_quota_message(message),
            _ => false,
        }
    }
}

/// Check an API error message for rate-limit wording.
pub fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("quota") || lower.contains("rate limit") || lower.contains("ratelimit")
}

/// Interface to an external spreadsheet service.
///
/// Implementations perform exactly one remote call per method; pacing and
/// retries are layered on top by [`RateLimitedClient`].
#[async_trait]
pub trait SheetClient: Send + Sync {
    /// Returns the client type identifier (e.g., "google", "memory").
    fn client_type(&self) -> &str;

    /// List the tab titles of a spreadsheet in display order.
    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError>;

    /// Read every value of a tab.
    async fn read_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<SheetValues, SheetsError>;

    /// Overwrite a tab starting at its first cell.
    async fn write_tab(&self, spreadsheet_id: &str, tab: &str, values: &SheetValues) -> Result<(), SheetsError>;

    /// Remove every value of a tab, keeping the tab itself.
    async fn clear_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<(), SheetsError>;
}
