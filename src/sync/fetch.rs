//! Fetching and parsing the tabs of one location spreadsheet.

use log::{debug, warn};

use super::parsers::{parse_historical_tab, parse_milestones_tab, parse_saints_tab};
use super::{DataType, LocationRecord, MilestoneRecord, SaintRecord, SaintYearRecord};
use crate::sheets::{RateLimitedClient, SheetsError};

/// Everything parsed from one location spreadsheet.
#[derive(Debug, Clone)]
pub struct LocationData {
    pub location: LocationRecord,
    pub saints: Vec<SaintRecord>,
    pub historical: Vec<SaintYearRecord>,
    pub milestones: Vec<MilestoneRecord>,
    /// Row errors and missing tabs, prefixed with the location and tab
    pub errors: Vec<String>,
}

impl LocationData {
    fn new(location: LocationRecord) -> Self {
        Self {
            location,
            saints: Vec::new(),
            historical: Vec::new(),
            milestones: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn display_name(&self) -> String {
        self.location.display_name()
    }
}

/// Read and parse the selected tabs of a location spreadsheet.
///
/// A missing tab is recorded as an error for that tab only. Any other sheet
/// failure (access, quota after retry) is returned to the caller.
pub async fn fetch_location(
    client: &RateLimitedClient,
    location: &LocationRecord,
    data_types: &[DataType],
    require_business_keys: bool,
) -> Result<LocationData, SheetsError> {
    let mut data = LocationData::new(location.clone());
    let display_name = location.display_name();

    for data_type in DataType::ALL {
        if !data_types.contains(&data_type) {
            continue;
        }
        let tab = data_type.tab();

        let values = match client.read_tab(&location.sheet_id, tab).await {
            Ok(values) => values,
            Err(SheetsError::RangeParse { .. }) => {
                warn!("⚠️  {} has no '{}' tab", display_name, tab);
                data.errors.push(format!("{} / {}: tab not found or not accessible", display_name, tab));
                continue;
            }
            Err(err) => return Err(err),
        };

        let prefix = |message: String| format!("{} / {}: {}", display_name, tab, message);
        match data_type {
            DataType::Saints => {
                let parsed = parse_saints_tab(&values);
                data.errors.extend(parsed.errors.into_iter().map(prefix));
                data.saints = parsed.records;
            }
            DataType::Historical => {
                let parsed = parse_historical_tab(&values, require_business_keys);
                data.errors.extend(parsed.errors.into_iter().map(prefix));
                data.historical = parsed.records;
            }
            DataType::Milestones => {
                let parsed = parse_milestones_tab(&values, require_business_keys);
                data.errors.extend(parsed.errors.into_iter().map(prefix));
                data.milestones = parsed.records;
            }
        }
    }

    debug!(
        "Fetched {}: {} saints, {} historical, {} milestones, {} errors",
        display_name,
        data.saints.len(),
        data.historical.len(),
        data.milestones.len(),
        data.errors.len()
    );
    Ok(data)
}
