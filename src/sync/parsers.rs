//! Tab parsers: raw sheet values to typed records.
//!
//! Parsers never fail as a whole. A bad row adds one error naming its sheet
//! row number (the header is row 1) and parsing moves on to the next row.

use super::headers::{
    HeaderMap, BURGER, CAN_BOTTLE_BEERS, COUNT, FACEBOOK_EVENT, MILESTONE_DATE, NAME, SAINT_DATE, SAINT_NAME,
    SAINT_NUMBER, SAINT_YEAR, STICKER, TAP_BEERS, TOTAL_BEERS, YEAR,
};
use super::{MilestoneRecord, SaintRecord, SaintYearRecord};
use crate::utils::datetime::{detect_date_format, normalize_saint_date};
use crate::utils::text::{cell, is_blank_row, optional_cell, parse_int, split_list};

/// Records parsed from one tab plus the errors of rejected rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabParse<T> {
    pub records: Vec<T>,
    pub errors: Vec<String>,
}

impl<T> Default for TabParse<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> TabParse<T> {
    fn failed(error: String) -> Self {
        Self {
            records: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Shared driver: header checks, blank-row skipping and row numbering.
fn parse_rows<T, F>(values: &[Vec<String>], required: &[super::headers::Field], mut parse_row: F) -> TabParse<T>
where
    F: FnMut(&HeaderMap, &[String], usize) -> Result<T, String>,
{
    let Some(header_row) = values.first().filter(|row| !is_blank_row(row)) else {
        return TabParse::failed("Tab is empty".to_string());
    };

    let headers = HeaderMap::from_row(header_row);
    if let Err(message) = headers.require(required) {
        return TabParse::failed(message);
    }

    let mut result = TabParse::default();
    for (index, row) in values.iter().enumerate().skip(1) {
        if is_blank_row(row) {
            continue;
        }
        let row_number = index + 1;
        match parse_row(&headers, row.as_slice(), row_number) {
            Ok(record) => result.records.push(record),
            Err(message) => result.errors.push(format!("Row {}: {}", row_number, message)),
        }
    }
    result
}

fn required_text(row: &[String], index: usize, what: &str) -> Result<String, String> {
    let value = cell(row, index);
    if value.is_empty() {
        Err(format!("missing {}", what))
    } else {
        Ok(value.to_string())
    }
}

fn required_int(row: &[String], index: usize, what: &str) -> Result<i32, String> {
    let raw = cell(row, index);
    if raw.is_empty() {
        return Err(format!("missing {}", what));
    }
    parse_int(raw).ok_or_else(|| format!("{} '{}' is not a whole number", what, raw))
}

fn saint_number(headers: &HeaderMap, row: &[String], required: bool) -> Result<Option<String>, String> {
    let number = optional_cell(row, headers.find(&SAINT_NUMBER));
    if number.is_none() && required {
        return Err("missing saint number".to_string());
    }
    Ok(number)
}

/// Parse a Saints Data tab.
pub fn parse_saints_tab(values: &[Vec<String>]) -> TabParse<SaintRecord> {
    parse_rows(values, &[SAINT_NUMBER], |headers, row, row_number| {
        let saint_number = required_text(row, headers.column(&SAINT_NUMBER, 0), "saint number")?;
        let name = required_text(row, headers.column(&NAME, 1), "name")?;
        let saint_name = cell(row, headers.column(&SAINT_NAME, 2)).to_string();

        let raw_date = cell(row, headers.column(&SAINT_DATE, 3));
        if raw_date.is_empty() {
            return Err("missing saint date".to_string());
        }
        let saint_date = normalize_saint_date(raw_date).ok_or_else(|| {
            format!(
                "invalid saint date '{}' (detected format: {})",
                raw_date,
                detect_date_format(raw_date)
            )
        })?;

        let saint_year = required_int(row, headers.column(&SAINT_YEAR, 4), "saint year")?;

        let total_beers = match optional_cell(row, headers.find(&TOTAL_BEERS)) {
            Some(raw) => Some(parse_int(&raw).ok_or_else(|| format!("total beers '{}' is not a whole number", raw))?),
            None => None,
        };

        Ok(SaintRecord {
            row: row_number,
            saint_number,
            name,
            saint_name,
            saint_date,
            saint_year,
            total_beers,
        })
    })
}

/// Parse a Historical Data tab.
///
/// With `require_saint_number` a row without a saint number is rejected.
pub fn parse_historical_tab(values: &[Vec<String>], require_saint_number: bool) -> TabParse<SaintYearRecord> {
    parse_rows(values, &[YEAR], |headers, row, row_number| {
        let year = required_int(row, headers.column(&YEAR, 0), "year")?;
        let saint_number = saint_number(headers, row, require_saint_number)?;

        Ok(SaintYearRecord {
            row: row_number,
            saint_number,
            year,
            burger: cell(row, headers.column(&BURGER, 1)).to_string(),
            tap_beers: split_list(cell(row, headers.column(&TAP_BEERS, 2))),
            can_bottle_beers: split_list(cell(row, headers.column(&CAN_BOTTLE_BEERS, 3))),
            facebook_event: optional_cell(row, Some(headers.column(&FACEBOOK_EVENT, 4))),
            sticker: optional_cell(row, Some(headers.column(&STICKER, 5))),
        })
    })
}

/// Parse a K Count (milestones) tab.
///
/// With `require_saint_number` a row without a saint number is rejected.
pub fn parse_milestones_tab(values: &[Vec<String>], require_saint_number: bool) -> TabParse<MilestoneRecord> {
    parse_rows(values, &[COUNT], |headers, row, row_number| {
        let count = required_int(row, headers.column(&COUNT, 0), "count")?;
        let date = required_text(row, headers.column(&MILESTONE_DATE, 1), "date")?;
        let saint_number = saint_number(headers, row, require_saint_number)?;

        Ok(MilestoneRecord {
            row: row_number,
            saint_number,
            count,
            date,
            sticker: optional_cell(row, Some(headers.column(&STICKER, 2))),
        })
    })
}
