//! Master-sheet resolution: the list of club locations and their spreadsheets.

use log::{debug, info};

use super::headers::{HeaderMap, ADDRESS, CITY, DISPLAY_NAME, EXCLUDE, IS_ACTIVE, SHEET_ID, STATE};
use super::LocationRecord;
use crate::sheets::{RateLimitedClient, SheetsError};
use crate::utils::text::{cell, is_blank_row, optional_cell, parse_flag};

/// Read every location listed in the master spreadsheet.
///
/// The master tab is whichever tab comes first; its name is never assumed.
pub async fn resolve_locations(
    client: &RateLimitedClient,
    spreadsheet_id: &str,
) -> Result<Vec<LocationRecord>, SheetsError> {
    let tab = client.first_tab(spreadsheet_id).await?;
    debug!("Master sheet tab is '{}'", tab);

    let values = client.read_tab(spreadsheet_id, &tab).await?;
    let locations = parse_master_rows(&values);
    info!(
        "📋 Master sheet lists {} locations ({} eligible)",
        locations.len(),
        locations.iter().filter(|l| l.is_eligible()).count()
    );
    Ok(locations)
}

/// Map master-sheet rows to locations.
///
/// Rows without a state, city or sheet id are dropped without an error.
pub fn parse_master_rows(values: &[Vec<String>]) -> Vec<LocationRecord> {
    let Some(header_row) = values.first() else {
        return Vec::new();
    };
    let headers = HeaderMap::from_row(header_row);

    let state_col = headers.column(&STATE, 0);
    let city_col = headers.column(&CITY, 1);
    let address_col = headers.column(&ADDRESS, 2);
    let sheet_col = headers.column(&SHEET_ID, 3);
    let active_col = headers.column(&IS_ACTIVE, 4);
    let exclude_col = headers.find(&EXCLUDE);
    let name_col = headers.find(&DISPLAY_NAME);

    values
        .iter()
        .skip(1)
        .filter(|row| !is_blank_row(row))
        .filter_map(|row| {
            let state = cell(row, state_col);
            let city = cell(row, city_col);
            let sheet_id = cell(row, sheet_col);
            if state.is_empty() || city.is_empty() || sheet_id.is_empty() {
                return None;
            }

            Some(LocationRecord {
                sheet_id: sheet_id.to_string(),
                state: state.to_string(),
                city: city.to_string(),
                address: cell(row, address_col).to_string(),
                is_active: parse_flag(cell(row, active_col)),
                excluded: exclude_col.map(|col| parse_flag(cell(row, col))).unwrap_or(false),
                name: optional_cell(row, name_col),
            })
        })
        .collect()
}
