//! In-memory spreadsheet backend.
//!
//! Used by the test suite and for local dry runs. Failures can be queued with
//! [`MemorySheets::fail_next`] to simulate quota or access errors deterministically.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use super::{SheetClient, SheetValues, SheetsError};

#[derive(Default)]
struct MemoryState {
    /// spreadsheet id -> ordered list of (tab title, values)
    spreadsheets: HashMap<String, Vec<(String, SheetValues)>>,
    failures: VecDeque<SheetsError>,
    calls: usize,
    writes: usize,
}

/// Spreadsheet service backed by a map in process memory.
#[derive(Default)]
pub struct MemorySheets {
    state: Mutex<MemoryState>,
}

/// Build owned sheet values from string slices.
pub fn to_values(rows: &[&[&str]]) -> SheetValues {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a tab. Tabs keep their creation order.
    pub fn set_tab(&self, spreadsheet_id: &str, tab: &str, values: SheetValues) {
        if let Ok(mut state) = self.state.lock() {
            let tabs = state.spreadsheets.entry(spreadsheet_id.to_string()).or_default();
            match tabs.iter_mut().find(|(title, _)| title == tab) {
                Some((_, existing)) => *existing = values,
                None => tabs.push((tab.to_string(), values)),
            }
        }
    }

    /// Current contents of a tab, if it exists.
    pub fn tab(&self, spreadsheet_id: &str, tab: &str) -> Option<SheetValues> {
        let state = self.state.lock().ok()?;
        state
            .spreadsheets
            .get(spreadsheet_id)?
            .iter()
            .find(|(title, _)| title == tab)
            .map(|(_, values)| values.clone())
    }

    /// Make the next call fail with `error`. Queued failures are consumed in order.
    pub fn fail_next(&self, error: SheetsError) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.push_back(error);
        }
    }

    /// Total number of calls received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.state.lock().map(|state| state.calls).unwrap_or(0)
    }

    /// Number of successful write and clear calls.
    pub fn write_count(&self) -> usize {
        self.state.lock().map(|state| state.writes).unwrap_or(0)
    }

    /// Register a call and pop the next injected failure, if any.
    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>, SheetsError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SheetsError::Other("in-memory sheet state is poisoned".to_string()))?;
        state.calls += 1;
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn find_tab<'a>(
    state: &'a mut MemoryState,
    spreadsheet_id: &str,
    tab: &str,
) -> Result<&'a mut SheetValues, SheetsError> {
    let tabs = state
        .spreadsheets
        .get_mut(spreadsheet_id)
        .ok_or_else(|| SheetsError::NotFound {
            spreadsheet_id: spreadsheet_id.to_string(),
        })?;
    tabs.iter_mut()
        .find(|(title, _)| title == tab)
        .map(|(_, values)| values)
        .ok_or_else(|| SheetsError::RangeParse { range: tab.to_string() })
}

#[async_trait]
impl SheetClient for MemorySheets {
    fn client_type(&self) -> &str {
        "memory"
    }

    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        let state = self.begin()?;
        state
            .spreadsheets
            .get(spreadsheet_id)
            .map(|tabs| tabs.iter().map(|(title, _)| title.clone()).collect())
            .ok_or_else(|| SheetsError::NotFound {
                spreadsheet_id: spreadsheet_id.to_string(),
            })
    }

    async fn read_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<SheetValues, SheetsError> {
        let mut state = self.begin()?;
        find_tab(&mut state, spreadsheet_id, tab).map(|values| values.clone())
    }

    async fn write_tab(&self, spreadsheet_id: &str, tab: &str, values: &SheetValues) -> Result<(), SheetsError> {
        let mut state = self.begin()?;
        let existing = find_tab(&mut state, spreadsheet_id, tab)?;
        // Overwrite from A1; rows beyond the written range are left in place
        for (index, row) in values.iter().enumerate() {
            if index < existing.len() {
                existing[index] = row.clone();
            } else {
                existing.push(row.clone());
            }
        }
        state.writes += 1;
        Ok(())
    }

    async fn clear_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<(), SheetsError> {
        let mut state = self.begin()?;
        find_tab(&mut state, spreadsheet_id, tab)?.clear();
        state.writes += 1;
        Ok(())
    }
}
