//! Saint date detection and normalization
//!
//! Spreadsheet authors enter saint dates in many shapes ("4/9/2016", "2016-04-09",
//! "Apr 9", "9 April"). Everything stored in the database uses the canonical
//! "Month Day" form (e.g. "April 9"), which is also what the export engine writes
//! back, so a normalized date always normalizes to itself.

use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Leap year used to validate month/day pairs so that February 29 is accepted.
const VALIDATION_YEAR: i32 = 2000;

static SLASH_FULL_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static SLASH_SHORT_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").unwrap());
static SLASH_NO_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})$").unwrap());
static ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?$").unwrap());
static MONTH_DAY_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})$").unwrap());
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)\.?$").unwrap());

/// The shape a raw date string was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `4/9/2016`
    SlashFullYear,
    /// `4/9/16`
    SlashShortYear,
    /// `4/9`
    SlashNoYear,
    /// `2016-04-09`
    Iso,
    /// `April 9` or `Apr 9`
    MonthDay,
    /// `April 9, 2016`
    MonthDayYear,
    /// `9 April`
    DayMonth,
    /// Empty input
    Empty,
    /// Anything else
    Unknown,
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateFormat::SlashFullYear => "M/D/YYYY",
            DateFormat::SlashShortYear => "M/D/YY",
            DateFormat::SlashNoYear => "M/D",
            DateFormat::Iso => "YYYY-MM-DD",
            DateFormat::MonthDay => "Month D",
            DateFormat::MonthDayYear => "Month D, YYYY",
            DateFormat::DayMonth => "D Month",
            DateFormat::Empty => "empty",
            DateFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Detect which of the supported shapes a raw date string uses.
pub fn detect_date_format(raw: &str) -> DateFormat {
    let value = raw.trim();
    if value.is_empty() {
        DateFormat::Empty
    } else if SLASH_FULL_YEAR.is_match(value) {
        DateFormat::SlashFullYear
    } else if SLASH_SHORT_YEAR.is_match(value) {
        DateFormat::SlashShortYear
    } else if SLASH_NO_YEAR.is_match(value) {
        DateFormat::SlashNoYear
    } else if ISO.is_match(value) {
        DateFormat::Iso
    } else if MONTH_DAY_YEAR.is_match(value) {
        DateFormat::MonthDayYear
    } else if MONTH_DAY.is_match(value) {
        DateFormat::MonthDay
    } else if DAY_MONTH.is_match(value) {
        DateFormat::DayMonth
    } else {
        DateFormat::Unknown
    }
}

/// Normalize a raw saint date to the canonical "Month Day" form.
///
/// # Returns
/// * `Some("April 9")` for any supported format with a valid month/day pair
/// * `None` when the format is unsupported or the month/day pair does not exist
pub fn normalize_saint_date(raw: &str) -> Option<String> {
    let (month, day) = parse_month_day(raw)?;
    Some(format_month_day(month, day))
}

/// Extract the month (1-12) and day from a raw saint date.
pub fn parse_month_day(raw: &str) -> Option<(u32, u32)> {
    let value = raw.trim();
    let (month, day) = match detect_date_format(value) {
        DateFormat::SlashFullYear => numeric_pair(&SLASH_FULL_YEAR, value, 1, 2)?,
        DateFormat::SlashShortYear => numeric_pair(&SLASH_SHORT_YEAR, value, 1, 2)?,
        DateFormat::SlashNoYear => numeric_pair(&SLASH_NO_YEAR, value, 1, 2)?,
        DateFormat::Iso => numeric_pair(&ISO, value, 2, 3)?,
        DateFormat::MonthDay => named_pair(&MONTH_DAY, value, 1, 2)?,
        DateFormat::MonthDayYear => named_pair(&MONTH_DAY_YEAR, value, 1, 2)?,
        DateFormat::DayMonth => named_pair(&DAY_MONTH, value, 2, 1)?,
        DateFormat::Empty | DateFormat::Unknown => return None,
    };

    // Reject pairs like 2/30 or 13/1
    NaiveDate::from_ymd_opt(VALIDATION_YEAR, month, day)?;
    Some((month, day))
}

/// Format a month/day pair as "Month Day".
pub fn format_month_day(month: u32, day: u32) -> String {
    let name = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown");
    format!("{} {}", name, day)
}

fn numeric_pair(pattern: &Regex, value: &str, month_group: usize, day_group: usize) -> Option<(u32, u32)> {
    let caps = pattern.captures(value)?;
    let month = caps.get(month_group)?.as_str().parse().ok()?;
    let day = caps.get(day_group)?.as_str().parse().ok()?;
    Some((month, day))
}

fn named_pair(pattern: &Regex, value: &str, month_group: usize, day_group: usize) -> Option<(u32, u32)> {
    let caps = pattern.captures(value)?;
    let month = Month::from_str(caps.get(month_group)?.as_str()).ok()?;
    let day = caps.get(day_group)?.as_str().parse().ok()?;
    Some((month.number_from_month(), day))
}
