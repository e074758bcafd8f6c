//! Cell-level helpers for spreadsheet rows.

/// Get a trimmed cell value, treating short rows as empty cells.
///
/// The Sheets API drops trailing empty cells, so rows are frequently shorter
/// than the header row.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|value| value.trim()).unwrap_or("")
}

/// Get a trimmed cell value as an owned optional, `None` when empty.
pub fn optional_cell(row: &[String], index: Option<usize>) -> Option<String> {
    let value = cell(row, index?);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check whether every cell in the row is empty.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|value| value.trim().is_empty())
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
///
/// Order is preserved and duplicates are kept.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strict integer parse: the whole trimmed value must be an integer.
pub fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Case-insensitive `"true"` match; anything else is false.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_cell_handles_short_rows() {
        let r = row(&[" a ", "b"]);
        assert_eq!(cell(&r, 0), "a");
        assert_eq!(cell(&r, 5), "");
        assert_eq!(optional_cell(&r, Some(1)), Some("b".to_string()));
        assert_eq!(optional_cell(&r, Some(7)), None);
        assert_eq!(optional_cell(&r, None), None);
    }

    #[test]
    fn test_split_list_keeps_order_and_duplicates() {
        assert_eq!(
            split_list(" Stone IPA, ,Guinness,Stone IPA ,"),
            vec!["Stone IPA", "Guinness", "Stone IPA"]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_int_is_strict() {
        assert_eq!(parse_int(" 2016 "), Some(2016));
        assert_eq!(parse_int("2016a"), None);
        assert_eq!(parse_int("20.5"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" true "));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_blank_row() {
        assert!(is_blank_row(&row(&["", "  "])));
        assert!(is_blank_row(&[]));
        assert!(!is_blank_row(&row(&["", "x"])));
    }
}
