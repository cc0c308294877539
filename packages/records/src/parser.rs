//! Line-oriented parser for the dashboard's comma-separated tables.
//!
//! Built on the `csv` reader with quoting disabled and flexible row lengths,
//! so that the accepted input is exactly "split each line on commas":
//!
//! * the first line is the header,
//! * blank lines are skipped,
//! * rows shorter than the header leave the trailing columns absent,
//! * values past the last header column are dropped,
//! * a `"` is an ordinary character.

use crate::{CellValue, Record, Table};

/// Parses delimited text into a [`Table`].
///
/// Never fails: text that is not valid table data degrades to fewer or
/// emptier records.
#[must_use]
pub fn parse(text: &str) -> Table {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = reader.records();

    let headers: Vec<String> = match rows.next() {
        Some(Ok(header)) => header.iter().map(ToString::to_string).collect(),
        Some(Err(e)) => {
            log::warn!("Unreadable header row: {e}");
            return Table::default();
        }
        None => return Table::default(),
    };

    let mut records = Vec::new();

    for (i, row) in rows.enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Skipping unreadable row {}: {e}", i + 2);
                continue;
            }
        };

        // Whitespace-only line
        if row.len() == 1 && row.get(0).is_some_and(str::is_empty) {
            continue;
        }

        if row.len() != headers.len() {
            log::debug!(
                "Row {} has {} fields, header has {}",
                i + 2,
                row.len(),
                headers.len()
            );
        }

        let mut record = Record::default();
        for (header, value) in headers.iter().zip(row.iter()) {
            record.insert(header.clone(), CellValue::coerce(value));
        }
        records.push(record);
    }

    Table { headers, records }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_numeric_row() {
        let table = parse("A,B\n1,2");
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].number("A"), Some(1.0));
        assert_eq!(table.records[0].number("B"), Some(2.0));
    }

    #[test]
    fn trims_headers_and_values() {
        let table = parse(" Location , Average_LAeq_dBA \n ito , 76.4 \n");
        assert_eq!(table.headers, vec!["Location", "Average_LAeq_dBA"]);
        assert_eq!(
            table.records[0].get("Location"),
            Some(&CellValue::Text("ito".to_string()))
        );
        assert_eq!(table.records[0].number("Average_LAeq_dBA"), Some(76.4));
    }

    #[test]
    fn skips_blank_lines() {
        let table = parse("A,B\n\n1,2\n   \n3,4\n\n");
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1].number("A"), Some(3.0));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let table = parse("A,B\r\nx,2\r\n");
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.records[0].text("A").as_deref(), Some("x"));
        assert_eq!(table.records[0].number("B"), Some(2.0));
    }

    #[test]
    fn short_rows_leave_columns_absent() {
        let table = parse("A,B,C\n1,2");
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].number("B"), Some(2.0));
        assert!(table.records[0].get("C").is_none());
    }

    #[test]
    fn long_rows_drop_extra_values() {
        let table = parse("A,B\n1,2,3,4");
        assert_eq!(table.records[0].0.len(), 2);
    }

    #[test]
    fn quotes_are_ordinary_characters() {
        let table = parse("A,B\n\"x,y\",1");
        assert_eq!(table.records[0].text("A").as_deref(), Some("\"x"));
        assert_eq!(table.records[0].text("B").as_deref(), Some("y\""));
    }

    #[test]
    fn empty_cells_stay_empty_strings() {
        let table = parse("A,B\n,5");
        assert_eq!(
            table.records[0].get("A"),
            Some(&CellValue::Text(String::new()))
        );
    }

    #[test]
    fn unknown_severity_category_is_accepted() {
        let table = parse("Location,Zone_Type,Severity_Category\nito,Commercial,Apocalyptic");
        assert_eq!(table.records.len(), 1);
        assert_eq!(
            table.records[0].text("Severity_Category").as_deref(),
            Some("Apocalyptic")
        );
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = parse("");
        assert!(table.headers.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn header_only_yields_no_records() {
        let table = parse("A,B\n");
        assert_eq!(table.headers.len(), 2);
        assert!(table.is_empty());
    }
}
