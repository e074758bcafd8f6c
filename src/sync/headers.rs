//! Header normalization and column lookup shared by every tab parser.

use std::collections::HashMap;

/// A logical column: the header the export engine writes plus the normalized
/// variants recognized on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub header: &'static str,
    pub aliases: &'static [&'static str],
}

// Saints Data
pub const SAINT_NUMBER: Field = Field {
    header: "Saint Number",
    aliases: &["saintnumber", "saintno", "saint#"],
};
pub const NAME: Field = Field {
    header: "Name",
    aliases: &["name", "realname", "legalname"],
};
pub const SAINT_NAME: Field = Field {
    header: "Saint Name",
    aliases: &["saintname"],
};
pub const SAINT_DATE: Field = Field {
    header: "Saint Date",
    aliases: &["saintdate", "date"],
};
pub const SAINT_YEAR: Field = Field {
    header: "Saint Year",
    aliases: &["saintyear"],
};
pub const TOTAL_BEERS: Field = Field {
    header: "Total Beers",
    aliases: &["totalbeers"],
};

// Historical Data
pub const YEAR: Field = Field {
    header: "Year",
    aliases: &["year", "historicalyear"],
};
pub const BURGER: Field = Field {
    header: "Burger",
    aliases: &["burger"],
};
pub const TAP_BEERS: Field = Field {
    header: "Tap Beers",
    aliases: &["tapbeers", "tapbeer"],
};
pub const CAN_BOTTLE_BEERS: Field = Field {
    header: "Can/Bottle Beers",
    aliases: &["can/bottlebeers", "canbottlebeers", "canbeers"],
};
pub const FACEBOOK_EVENT: Field = Field {
    header: "Facebook Event",
    aliases: &["facebookevent", "facebookeventurl"],
};
pub const STICKER: Field = Field {
    header: "Sticker",
    aliases: &["sticker", "stickerimage"],
};

// K Count
pub const COUNT: Field = Field {
    header: "Count",
    aliases: &["count", "beercount", "kcount"],
};
pub const MILESTONE_DATE: Field = Field {
    header: "Date",
    aliases: &["date", "milestonedate"],
};

// Master sheet
pub const STATE: Field = Field {
    header: "State",
    aliases: &["state"],
};
pub const CITY: Field = Field {
    header: "City",
    aliases: &["city"],
};
pub const ADDRESS: Field = Field {
    header: "Address",
    aliases: &["address"],
};
pub const SHEET_ID: Field = Field {
    header: "Sheet ID",
    aliases: &["sheetid", "spreadsheetid"],
};
pub const IS_ACTIVE: Field = Field {
    header: "Is Active",
    aliases: &["isactive", "active"],
};
pub const EXCLUDE: Field = Field {
    header: "Exclude",
    aliases: &["exclude", "excluded"],
};
pub const DISPLAY_NAME: Field = Field {
    header: "Display Name",
    aliases: &["displayname", "locationname"],
};

/// Columns written to the Saints Data tab, in order.
pub const SAINTS_FIELDS: [Field; 6] = [SAINT_NUMBER, NAME, SAINT_NAME, SAINT_DATE, SAINT_YEAR, TOTAL_BEERS];
/// Columns written to the Historical Data tab, in order.
pub const HISTORICAL_FIELDS: [Field; 7] = [
    SAINT_NUMBER,
    YEAR,
    BURGER,
    TAP_BEERS,
    CAN_BOTTLE_BEERS,
    FACEBOOK_EVENT,
    STICKER,
];
/// Columns written to the K Count tab, in order.
pub const MILESTONE_FIELDS: [Field; 4] = [SAINT_NUMBER, COUNT, MILESTONE_DATE, STICKER];

/// Canonical lookup key: lower-cased with whitespace and underscores removed.
///
/// `"Saint Number"`, `"saint_number"` and `"SaintNumber"` all map to `"saintnumber"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized header name to column index for one tab.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
    headers: Vec<String>,
}

impl HeaderMap {
    /// Build the map from a header row. The first occurrence of a name wins.
    pub fn from_row(row: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (index, header) in row.iter().enumerate() {
            let key = normalize_header(header);
            if !key.is_empty() {
                columns.entry(key).or_insert(index);
            }
        }
        Self {
            columns,
            headers: row.iter().map(|h| h.trim().to_string()).collect(),
        }
    }

    /// Look up a normalized key.
    pub fn get(&self, key: &str) -> Option<usize> {
        self.columns.get(key).copied()
    }

    /// Find the column of a field through its header or any alias.
    pub fn find(&self, field: &Field) -> Option<usize> {
        self.get(&normalize_header(field.header))
            .or_else(|| field.aliases.iter().find_map(|alias| self.get(alias)))
    }

    /// Find the column of a field, falling back to a fixed position.
    pub fn column(&self, field: &Field, fallback: usize) -> usize {
        self.find(field).unwrap_or(fallback)
    }

    /// Error message for the first field that has no column, if any.
    pub fn require(&self, fields: &[Field]) -> Result<(), String> {
        let missing: Vec<&str> = fields
            .iter()
            .filter(|field| self.find(field).is_none())
            .map(|field| field.header)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Missing required column(s) {} (found: {})",
                missing.join(", "),
                self.headers.join(", ")
            ))
        }
    }

    /// Register a new column at `index` (used when the export appends headers).
    pub fn insert(&mut self, header: &str, index: usize) {
        self.columns.entry(normalize_header(header)).or_insert(index);
        if self.headers.len() <= index {
            self.headers.resize(index + 1, String::new());
        }
        self.headers[index] = header.to_string();
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_normalize_ignores_case_spaces_and_underscores() {
        let variants = ["Saint Number", "saint_number", "SaintNumber", "  SAINT  NUMBER ", "Saint_ Number"];
        for variant in variants {
            assert_eq!(normalize_header(variant), "saintnumber", "{variant}");
        }
        assert_eq!(normalize_header("Can/Bottle Beers"), "can/bottlebeers");
    }

    #[test]
    fn test_find_uses_aliases() {
        let map = HeaderMap::from_row(&row(&["Historical Year", "K Count", "Facebook Event URL"]));
        assert_eq!(map.find(&YEAR), Some(0));
        assert_eq!(map.find(&COUNT), Some(1));
        assert_eq!(map.find(&FACEBOOK_EVENT), Some(2));
        assert_eq!(map.find(&STICKER), None);
        assert_eq!(map.column(&STICKER, 5), 5);
    }

    #[test]
    fn test_first_duplicate_header_wins() {
        let map = HeaderMap::from_row(&row(&["Name", "name", "NAME"]));
        assert_eq!(map.find(&NAME), Some(0));
    }

    #[test]
    fn test_require_lists_missing_columns() {
        let map = HeaderMap::from_row(&row(&["Name", "Saint Date"]));
        let message = map.require(&[SAINT_NUMBER]).unwrap_err();
        assert!(message.contains("Saint Number"));
        assert!(message.contains("found: Name, Saint Date"));
        assert!(map.require(&[NAME]).is_ok());
    }

    #[test]
    fn test_insert_appends_header() {
        let mut map = HeaderMap::from_row(&row(&["Saint Number"]));
        map.insert(TOTAL_BEERS.header, 1);
        assert_eq!(map.find(&TOTAL_BEERS), Some(1));
        assert_eq!(map.len(), 2);
    }
}
