//! Export of stored rows back to the location spreadsheets, in full or incrementally by row key.

use log::{info, warn};
use std::collections::HashMap;
use uuid::Uuid;

use super::headers::{Field, HeaderMap, HISTORICAL_FIELDS, MILESTONE_FIELDS, SAINTS_FIELDS};
use super::master::resolve_locations;
use super::progress::{ProgressReporter, ProgressSender, SyncStage};
use super::{select_locations, DataType, EntityCounts, ExportMode, ExportRequest, ExportResult, SyncError, SyncService};
use crate::constants::LOG_EXPORT_STARTED;
use crate::entities::{milestone, saint, saint_year};
use crate::repositories::{MilestoneRepository, SaintRepository, SaintYearRepository};
use crate::sheets::{RateLimitedClient, SheetValues, SheetsError};
use crate::utils::text::{cell, is_blank_row};

/// Counters for one exported tab.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TabExport {
    pub exported: usize,
    pub updated: usize,
    pub added: usize,
}

impl DataType {
    /// Columns written for this entity type, in order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            DataType::Saints => &SAINTS_FIELDS,
            DataType::Historical => &HISTORICAL_FIELDS,
            DataType::Milestones => &MILESTONE_FIELDS,
        }
    }

    /// Business key of a row given its cells in [`DataType::fields`] order.
    ///
    /// Saints use the saint number, historical rows `year-saintNumber` and
    /// milestones `saintNumber-count-date`.
    pub fn row_key(&self, cells: &[String]) -> String {
        let get = |index: usize| cells.get(index).map(|value| value.trim()).unwrap_or("");
        match self {
            DataType::Saints => get(0).to_string(),
            DataType::Historical => format!("{}-{}", get(1), get(0)),
            DataType::Milestones => format!("{}-{}-{}", get(0), get(1), get(2)),
        }
    }
}

fn saint_cells(saint: &saint::Model) -> Vec<String> {
    vec![
        saint.saint_number.clone(),
        saint.name.clone(),
        saint.saint_name.clone(),
        saint.saint_date.clone(),
        saint.saint_year.to_string(),
        saint.total_beers.to_string(),
    ]
}

fn saint_year_cells(saint_number: &str, record: &saint_year::Model) -> Vec<String> {
    vec![
        saint_number.to_string(),
        record.year.to_string(),
        record.burger.clone(),
        record.tap_beer_list().join(", "),
        record.can_bottle_beer_list().join(", "),
        record.facebook_event.clone().unwrap_or_default(),
        record.sticker.clone().unwrap_or_default(),
    ]
}

fn milestone_cells(saint_number: &str, record: &milestone::Model) -> Vec<String> {
    vec![
        saint_number.to_string(),
        record.count.to_string(),
        record.date.clone(),
        record.sticker.clone().unwrap_or_default(),
    ]
}

impl SyncService {
    /// Exports database records to the selected location spreadsheets.
    ///
    /// For every location and data type the tab is read (or cleared in full
    /// mode), rows are matched by business key and updated in place or
    /// appended, and the whole tab is written back in one call.
    ///
    /// # Errors
    /// Returns an error for invalid requests, sheet access or quota failures
    /// and database failures.
    pub async fn export(
        &self,
        request: &ExportRequest,
        progress: Option<ProgressSender>,
    ) -> Result<ExportResult, SyncError> {
        request.validate()?;
        info!("{} for spreadsheet {}", LOG_EXPORT_STARTED, request.spreadsheet_id);

        let mut reporter = ProgressReporter::new(progress);
        let mut result = ExportResult::default();

        reporter.update(SyncStage::ReadingMaster, 0, 0, None);
        let client = self.sync_client().await?;
        let all_locations = resolve_locations(&client, &request.spreadsheet_id).await?;
        let locations = select_locations(&all_locations, &request.selected_locations, &mut result.errors);
        let total = locations.len();

        if locations.is_empty() {
            result.message = "No active locations matched the selection".to_string();
            result.progress = reporter.finish(0);
            return Ok(result);
        }

        let conn = &self.storage.conn;
        for (index, location) in locations.iter().enumerate() {
            let name = location.display_name();
            reporter.update(SyncStage::Exporting, index, total, Some(&name));

            let saints = SaintRepository::get_for_location(conn, &location.sheet_id).await?;
            let saint_ids: Vec<Uuid> = saints.iter().map(|saint| saint.id).collect();
            let numbers: HashMap<Uuid, &str> = saints
                .iter()
                .map(|saint| (saint.id, saint.saint_number.as_str()))
                .collect();

            for data_type in DataType::ALL {
                if !request.selected_data_types.contains(&data_type) {
                    continue;
                }

                let rows: Vec<Vec<String>> = match data_type {
                    DataType::Saints => saints.iter().map(saint_cells).collect(),
                    DataType::Historical => SaintYearRepository::get_for_saints(conn, &saint_ids)
                        .await?
                        .iter()
                        .filter_map(|record| {
                            numbers
                                .get(&record.saint_id)
                                .map(|number| saint_year_cells(number, record))
                        })
                        .collect(),
                    DataType::Milestones => MilestoneRepository::get_for_saints(conn, &saint_ids)
                        .await?
                        .iter()
                        .filter_map(|record| {
                            numbers
                                .get(&record.saint_id)
                                .map(|number| milestone_cells(number, record))
                        })
                        .collect(),
                };

                match self
                    .export_tab(&client, &location.sheet_id, data_type, &rows, request.export_mode)
                    .await
                {
                    Ok(stats) => {
                        info!(
                            "✅ Exported {} {} rows to {} ({} updated, {} added)",
                            stats.exported,
                            data_type.tab(),
                            name,
                            stats.updated,
                            stats.added
                        );
                        add_counts(&mut result.records_exported, data_type, stats.exported);
                        add_counts(&mut result.records_updated, data_type, stats.updated);
                        add_counts(&mut result.records_added, data_type, stats.added);
                    }
                    Err(SheetsError::RangeParse { .. }) => {
                        warn!("⚠️  {} has no '{}' tab, skipped", name, data_type.tab());
                        result.errors.push(format!(
                            "{} / {}: tab not found or not accessible",
                            name,
                            data_type.tab()
                        ));
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        result.success = true;
        result.message = format!(
            "Exported {} saints, {} historical records and {} milestones to {} location(s)",
            result.records_exported.saints,
            result.records_exported.historical,
            result.records_exported.milestones,
            total
        );
        result.progress = reporter.finish(total);
        Ok(result)
    }

    /// Merge `rows` into one tab and write it back in a single call.
    pub async fn export_tab(
        &self,
        client: &RateLimitedClient,
        spreadsheet_id: &str,
        data_type: DataType,
        rows: &[Vec<String>],
        mode: ExportMode,
    ) -> Result<TabExport, SheetsError> {
        let tab = data_type.tab();
        let mut values: SheetValues = match mode {
            ExportMode::Full => {
                client.clear_tab(spreadsheet_id, tab).await?;
                Vec::new()
            }
            ExportMode::Incremental => client.read_tab(spreadsheet_id, tab).await?,
        };

        let columns = prepare_header(&mut values, data_type.fields());
        let width = values[0].len();

        let mut index: HashMap<String, usize> = HashMap::new();
        for (row_index, row) in values.iter().enumerate().skip(1) {
            let cells: Vec<String> = columns.iter().map(|&col| cell(row, col).to_string()).collect();
            index.entry(data_type.row_key(&cells)).or_insert(row_index);
        }

        let delay = self.config.export_record_delay();
        let mut stats = TabExport::default();
        for cells in rows {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let key = data_type.row_key(cells);
            let target = match index.get(&key) {
                Some(&row_index) => {
                    stats.updated += 1;
                    row_index
                }
                None => {
                    values.push(Vec::new());
                    index.insert(key, values.len() - 1);
                    stats.added += 1;
                    values.len() - 1
                }
            };

            let row = &mut values[target];
            if row.len() < width {
                row.resize(width, String::new());
            }
            for (value, &col) in cells.iter().zip(&columns) {
                row[col] = value.clone();
            }
            stats.exported += 1;
        }

        client.write_tab(spreadsheet_id, tab, &values).await?;
        Ok(stats)
    }
}

/// Make sure the first row holds a header for every field and return the
/// column of each field, appending missing headers at the end.
fn prepare_header(values: &mut SheetValues, fields: &[Field]) -> Vec<usize> {
    if values.is_empty() {
        values.push(Vec::new());
    } else if is_blank_row(&values[0]) {
        values[0].clear();
    }

    let header_row = &mut values[0];
    let mut headers = HeaderMap::from_row(header_row.as_slice());
    fields
        .iter()
        .map(|field| match headers.find(field) {
            Some(col) => col,
            None => {
                let col = header_row.len();
                header_row.push(field.header.to_string());
                headers.insert(field.header, col);
                col
            }
        })
        .collect()
}

fn add_counts(counts: &mut EntityCounts, data_type: DataType, amount: usize) {
    match data_type {
        DataType::Saints => counts.saints += amount,
        DataType::Historical => counts.historical += amount,
        DataType::Milestones => counts.milestones += amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::memory::to_values;

    #[test]
    fn test_prepare_header_on_empty_tab() {
        let mut values = SheetValues::new();
        let columns = prepare_header(&mut values, DataType::Milestones.fields());
        assert_eq!(columns, vec![0, 1, 2, 3]);
        assert_eq!(values[0], vec!["Saint Number", "Count", "Date", "Sticker"]);
    }

    #[test]
    fn test_prepare_header_maps_existing_and_appends_missing() {
        let mut values = to_values(&[&["Saint Number", "Name", "Saint Year", "Notes", "Saint Date"]]);
        let columns = prepare_header(&mut values, DataType::Saints.fields());
        assert_eq!(columns, vec![0, 1, 5, 4, 2, 6]);
        assert_eq!(values[0][5], "Saint Name");
        assert_eq!(values[0][6], "Total Beers");
    }

    #[test]
    fn test_row_keys() {
        let saint = to_values(&[&["42", "Jane"]]);
        assert_eq!(DataType::Saints.row_key(&saint[0]), "42");

        let historical = to_values(&[&["42", "2019", "Classic"]]);
        assert_eq!(DataType::Historical.row_key(&historical[0]), "2019-42");

        let milestone = to_values(&[&["42", "1000", "4/9/2020", ""]]);
        assert_eq!(DataType::Milestones.row_key(&milestone[0]), "42-1000-4/9/2020");
    }
}
