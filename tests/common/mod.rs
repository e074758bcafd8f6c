#![allow(dead_code)]

use saint_sync::config::SyncConfig;
use saint_sync::sheets::memory::to_values;
use saint_sync::sheets::{MemorySheets, SheetValues, StaticSheetsProvider};
use saint_sync::storage::Storage;
use saint_sync::sync::SyncService;
use std::sync::Arc;

pub const MASTER: &str = "master-sheet";

pub const SAINTS_HEADER: &[&str] = &["Saint Number", "Name", "Saint Name", "Saint Date", "Saint Year"];
pub const HISTORICAL_HEADER: &[&str] = &[
    "Saint Number",
    "Year",
    "Burger",
    "Tap Beers",
    "Can/Bottle Beers",
    "Facebook Event",
    "Sticker",
];
pub const MILESTONES_HEADER: &[&str] = &["Saint Number", "Count", "Date", "Sticker"];

/// Fresh in-memory sheets and database wired into a service with no delays.
pub async fn setup() -> (Arc<MemorySheets>, SyncService) {
    let sheets = Arc::new(MemorySheets::new());
    let service = service_for(sheets.clone()).await;
    (sheets, service)
}

/// A service over a new empty database reading `sheets`.
pub async fn service_for(sheets: Arc<MemorySheets>) -> SyncService {
    let storage = Storage::in_memory().await.unwrap();
    let provider = Arc::new(StaticSheetsProvider::new(sheets));
    SyncService::new(storage, provider, SyncConfig::without_delays())
}

/// Master sheet rows: (sheet id, city, state, is active).
pub fn set_master(sheets: &MemorySheets, locations: &[(&str, &str, &str, bool)]) {
    let mut values = to_values(&[&["State", "City", "Address", "Sheet ID", "Is Active"]]);
    for (id, city, state, active) in locations {
        values.push(vec![
            state.to_string(),
            city.to_string(),
            String::new(),
            id.to_string(),
            if *active { "TRUE" } else { "FALSE" }.to_string(),
        ]);
    }
    sheets.set_tab(MASTER, "Locations", values);
}

/// Tab contents: a header followed by data rows.
pub fn tab(header: &[&str], rows: &[&[&str]]) -> SheetValues {
    let mut values = to_values(&[header]);
    values.extend(to_values(rows));
    values
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
