//! Spreadsheet synchronization engine.
//!
//! This module provides the [`SyncService`] struct which moves Saint Calendar
//! data between the club's Google Sheets and the relational store. It offers
//! three pipelines:
//! - Import: read location spreadsheets, validate rows, detect saint number
//!   conflicts and reconcile everything into the database, one transaction per
//!   location
//! - Export: write database records back to the location spreadsheets, keyed by
//!   business keys so existing rows are updated in place
//! - Preview: read-only fetch of every eligible location for a quick overview
//!
//! Every pipeline re-reads the master sheet and re-queries the database; nothing
//! is cached between calls.

pub mod conflicts;
pub mod export;
pub mod fetch;
pub mod headers;
pub mod import;
pub mod master;
pub mod parsers;
pub mod preview;
pub mod progress;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::constants::{TAB_HISTORICAL, TAB_MILESTONES, TAB_SAINTS};
use crate::sheets::{RateLimitedClient, SheetsError, SheetsProvider};
use crate::storage::Storage;

pub use conflicts::{detect_conflicts, SaintConflict};
pub use parsers::{parse_historical_tab, parse_milestones_tab, parse_saints_tab, TabParse};
pub use progress::{progress_channel, ProgressReporter, ProgressSender, SyncProgress, SyncStage};

/// One row of the master sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub sheet_id: String,
    pub state: String,
    pub city: String,
    pub address: String,
    pub is_active: bool,
    pub excluded: bool,
    pub name: Option<String>,
}

impl LocationRecord {
    /// Human-facing name, `"{city}, {state}"` unless the sheet names it.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}, {}", self.city, self.state),
        }
    }

    /// Whether the location's own spreadsheet should be fetched.
    pub fn is_eligible(&self) -> bool {
        self.is_active && !self.excluded
    }
}

/// One row of a Saints Data tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaintRecord {
    #[serde(skip)]
    pub row: usize,
    pub saint_number: String,
    pub name: String,
    pub saint_name: String,
    /// Normalized "Month Day"
    pub saint_date: String,
    pub saint_year: i32,
    pub total_beers: Option<i32>,
}

/// One row of a Historical Data tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaintYearRecord {
    #[serde(skip)]
    pub row: usize,
    pub saint_number: Option<String>,
    pub year: i32,
    pub burger: String,
    pub tap_beers: Vec<String>,
    pub can_bottle_beers: Vec<String>,
    pub facebook_event: Option<String>,
    pub sticker: Option<String>,
}

/// One row of a K Count tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRecord {
    #[serde(skip)]
    pub row: usize,
    pub saint_number: Option<String>,
    pub count: i32,
    pub date: String,
    pub sticker: Option<String>,
}

/// Entity types a pipeline can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Saints,
    Historical,
    Milestones,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Saints, DataType::Historical, DataType::Milestones];

    /// Name of the tab holding this entity type in a location spreadsheet.
    pub fn tab(&self) -> &'static str {
        match self {
            DataType::Saints => TAB_SAINTS,
            DataType::Historical => TAB_HISTORICAL,
            DataType::Milestones => TAB_MILESTONES,
        }
    }
}

/// What to do with saints that already exist in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    /// Leave existing saints untouched; any cross-location conflict aborts the import
    #[default]
    Skip,
    /// Replace every field and the owning location
    Overwrite,
    /// Update fields but keep ownership and stored values the sheet leaves blank
    Merge,
}

/// How the export engine treats existing tab contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Clear the tab and write every record
    Full,
    /// Update matching rows in place and append the rest
    #[default]
    Incremental,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportRequest {
    pub spreadsheet_id: String,
    pub selected_locations: Vec<String>,
    pub selected_data_types: Vec<DataType>,
    pub conflict_resolution: ConflictResolution,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRequest {
    pub spreadsheet_id: String,
    pub selected_locations: Vec<String>,
    pub selected_data_types: Vec<DataType>,
    pub export_mode: ExportMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewRequest {
    pub spreadsheet_id: String,
}

impl ImportRequest {
    pub fn validate(&self) -> Result<(), SyncError> {
        validate_selection(&self.spreadsheet_id, &self.selected_locations, &self.selected_data_types)
    }
}

impl ExportRequest {
    pub fn validate(&self) -> Result<(), SyncError> {
        validate_selection(&self.spreadsheet_id, &self.selected_locations, &self.selected_data_types)
    }
}

impl PreviewRequest {
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(SyncError::InvalidRequest("Spreadsheet ID is required".to_string()));
        }
        Ok(())
    }
}

fn validate_selection(spreadsheet_id: &str, locations: &[String], data_types: &[DataType]) -> Result<(), SyncError> {
    if spreadsheet_id.trim().is_empty() {
        return Err(SyncError::InvalidRequest("Spreadsheet ID is required".to_string()));
    }
    if locations.is_empty() {
        return Err(SyncError::InvalidRequest("At least one location must be selected".to_string()));
    }
    if data_types.is_empty() {
        return Err(SyncError::InvalidRequest("At least one data type must be selected".to_string()));
    }
    Ok(())
}

/// Per-entity counters reported by every pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub saints: usize,
    pub historical: usize,
    pub milestones: usize,
}

impl EntityCounts {
    pub fn total(&self) -> usize {
        self.saints + self.historical + self.milestones
    }

    pub fn add(&mut self, other: &EntityCounts) {
        self.saints += other.saints;
        self.historical += other.historical;
        self.milestones += other.milestones;
    }

    pub fn bump(&mut self, data_type: DataType) {
        match data_type {
            DataType::Saints => self.saints += 1,
            DataType::Historical => self.historical += 1,
            DataType::Milestones => self.milestones += 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub records_processed: EntityCounts,
    pub records_updated: EntityCounts,
    pub records_added: EntityCounts,
    pub conflicts: Vec<String>,
    pub errors: Vec<String>,
    pub progress: SyncProgress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    pub message: String,
    pub records_exported: EntityCounts,
    pub records_updated: EntityCounts,
    pub records_added: EntityCounts,
    pub errors: Vec<String>,
    pub progress: SyncProgress,
}

/// Preview of a single location spreadsheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPreview {
    pub sheet_id: String,
    pub display_name: String,
    pub counts: EntityCounts,
    pub sample_saints: Vec<SaintRecord>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub success: bool,
    pub message: String,
    pub locations: Vec<LocationPreview>,
    pub totals: EntityCounts,
    pub conflicts: Vec<String>,
    pub errors: Vec<String>,
    pub progress: SyncProgress,
}

/// Failures that abort a whole pipeline call.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The request is missing required fields
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error("Database error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl SyncError {
    /// Whether the caller sent a bad request rather than the pipeline failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SyncError::InvalidRequest(_))
    }
}

/// Runs the import, export and preview pipelines.
///
/// The store and the sheets provider are constructed by the hosting process
/// and injected here; each pipeline call connects a fresh sheet client through
/// the provider.
///
/// # Example
/// ```rust,no_run
/// use saint_sync::config::Config;
/// use saint_sync::sheets::create_provider;
/// use saint_sync::storage::Storage;
/// use saint_sync::sync::{PreviewRequest, SyncService};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let storage = Storage::connect(&config.database_url()).await?;
/// let provider = create_provider(&config.sheets)?;
/// let service = SyncService::new(storage, provider, config.sync.clone());
///
/// let request = PreviewRequest { spreadsheet_id: "master-sheet-id".to_string() };
/// let preview = service.preview(&request, None).await?;
/// println!("{} locations", preview.locations.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncService {
    storage: Storage,
    provider: Arc<dyn SheetsProvider>,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(storage: Storage, provider: Arc<dyn SheetsProvider>, config: SyncConfig) -> Self {
        Self {
            storage,
            provider,
            config,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Connect a sheet client paced for import and export.
    async fn sync_client(&self) -> Result<RateLimitedClient, SheetsError> {
        let client = self.provider.connect().await?;
        Ok(RateLimitedClient::new(client, self.config.sync_delay()))
    }

    /// Connect a sheet client paced for preview.
    async fn preview_client(&self) -> Result<RateLimitedClient, SheetsError> {
        let client = self.provider.connect().await?;
        Ok(RateLimitedClient::new(client, self.config.preview_delay()))
    }
}

/// Pick the selected locations out of the master sheet, in master-sheet order.
///
/// Selected ids that are missing, inactive or excluded yield an error message.
pub(crate) fn select_locations(
    all: &[LocationRecord],
    selected: &[String],
    errors: &mut Vec<String>,
) -> Vec<LocationRecord> {
    for id in selected {
        match all.iter().find(|location| &location.sheet_id == id) {
            None => errors.push(format!("Location {} was not found in the master sheet", id)),
            Some(location) if !location.is_eligible() => errors.push(format!(
                "Location {} is inactive or excluded and was skipped",
                location.display_name()
            )),
            Some(_) => {}
        }
    }

    all.iter()
        .filter(|location| location.is_eligible() && selected.contains(&location.sheet_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: &str, active: bool, excluded: bool) -> LocationRecord {
        LocationRecord {
            sheet_id: id.to_string(),
            state: "TX".to_string(),
            city: "Austin".to_string(),
            address: String::new(),
            is_active: active,
            excluded,
            name: None,
        }
    }

    #[test]
    fn test_display_name_defaults_to_city_and_state() {
        let mut record = location("a", true, false);
        assert_eq!(record.display_name(), "Austin, TX");
        record.name = Some("Austin Downtown".to_string());
        assert_eq!(record.display_name(), "Austin Downtown");
    }

    #[test]
    fn test_request_validation() {
        let mut request = ImportRequest::default();
        assert!(request.validate().unwrap_err().is_client_error());

        request.spreadsheet_id = "sheet".to_string();
        assert!(request.validate().unwrap_err().to_string().contains("location"));

        request.selected_locations = vec!["loc-1".to_string()];
        assert!(request.validate().unwrap_err().to_string().contains("data type"));

        request.selected_data_types = vec![DataType::Saints];
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: ImportRequest = serde_json::from_str(
            r#"{"spreadsheetId":"s","selectedLocations":["a"],"selectedDataTypes":["saints","milestones"],"conflictResolution":"merge"}"#,
        )
        .unwrap();
        assert_eq!(request.selected_data_types, vec![DataType::Saints, DataType::Milestones]);
        assert_eq!(request.conflict_resolution, ConflictResolution::Merge);

        let export: ExportRequest = serde_json::from_str(r#"{"spreadsheetId":"s"}"#).unwrap();
        assert_eq!(export.export_mode, ExportMode::Incremental);
    }

    #[test]
    fn test_select_locations_keeps_master_order_and_reports_ineligible() {
        let all = vec![location("a", true, false), location("b", false, false), location("c", true, true), location("d", true, false)];
        let selected = vec!["d".to_string(), "b".to_string(), "a".to_string(), "zzz".to_string(), "c".to_string()];
        let mut errors = Vec::new();

        let chosen = select_locations(&all, &selected, &mut errors);
        let ids: Vec<&str> = chosen.iter().map(|l| l.sheet_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(errors.len(), 3);
    }
}
