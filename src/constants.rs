//! Constants used throughout the sync engine
//!
//! This module centralizes tab names, default rate limits
//! and log message prefixes to keep them consistent across pipelines.

use std::time::Duration;

// Spreadsheet tab names
pub const TAB_SAINTS: &str = "Saints Data";
pub const TAB_HISTORICAL: &str = "Historical Data";
pub const TAB_MILESTONES: &str = "K Count";

// Event types
pub const EVENT_TYPE_FEAST: &str = "feast";

// Rate limiting defaults
/// Delay before every sheet call made by the preview pipeline
pub const PREVIEW_CALL_DELAY: Duration = Duration::from_millis(1000);
/// Delay before every sheet call made by the import and export pipelines
pub const SYNC_CALL_DELAY: Duration = Duration::from_millis(2000);
/// Per-record throttle applied by the export engine
pub const EXPORT_RECORD_DELAY: Duration = Duration::from_millis(100);
/// Number of locations fetched concurrently by the preview pipeline
pub const PREVIEW_BATCH_SIZE: usize = 3;
/// Number of sample saints reported per location by the preview pipeline
pub const PREVIEW_SAMPLE_SIZE: usize = 5;
/// Capacity of the progress channel before events are dropped
pub const PROGRESS_CHANNEL_CAPACITY: usize = 64;

// Google Sheets API
pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

// Storage
pub const DEFAULT_DATABASE_URL: &str = "sqlite://saint-sync.db?mode=rwc";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

// Log messages
pub const LOG_IMPORT_STARTED: &str = "📥 Starting sheet import";
pub const LOG_EXPORT_STARTED: &str = "📤 Starting sheet export";
pub const LOG_PREVIEW_STARTED: &str = "🔍 Starting sheet preview";
pub const LOG_QUOTA_RETRY: &str = "⏳ Sheets quota exceeded, retrying once";

// Server
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
