//! Flat-file ledger loading
//!
//! Reads the semicolon-delimited movements file and yields the normalized
//! in-memory table the aggregation engine consumes. Loading fails soft: a
//! missing or unreadable file is an empty table, and rows whose amount or
//! date cannot be normalized are dropped, never fatal. A fresh snapshot is
//! read on every request.

pub mod amount;

pub use self::amount::{format_amount, parse_amount};

use crate::models::{Movement, MovementKind};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Store format: `Description;Income/expensive;Amount;Category;Date`
/// with a datetime, or a bare date for hand-edited rows.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Income/expensive")]
    kind: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Date")]
    date: String,
}

/// Read-only handle on the movements file.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current snapshot as a normalized table.
    pub fn load(&self) -> Vec<Movement> {
        let mut reader = match csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ledger file unavailable, treating as empty");
                return Vec::new();
            }
        };

        let mut movements = Vec::new();

        for (index, record) in reader.deserialize::<RawRow>().enumerate() {
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    debug!(row = index + 1, error = %e, "Skipping malformed ledger row");
                    continue;
                }
            };

            match normalize_row(row) {
                Some(movement) => movements.push(movement),
                None => {
                    debug!(row = index + 1, "Skipping ledger row with invalid kind, amount or date");
                }
            }
        }

        debug!(count = movements.len(), "Ledger snapshot loaded");
        movements
    }
}

fn normalize_row(row: RawRow) -> Option<Movement> {
    let kind = MovementKind::from_token(&row.kind)?;
    let amount = parse_amount(&row.amount)?;
    let date = parse_date(&row.date)?;

    Some(Movement {
        description: row.description.trim().to_string(),
        kind,
        amount,
        category: row.category.trim().to_string(),
        date,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT) {
        return Some(datetime);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_ledger(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_normalizes_amounts_and_dates() {
        let file = write_ledger(
            "Description;Income/expensive;Amount;Category;Date\n\
             Salary; income ; $3.000.000,00 ;salary;2024-01-05 09:30:00\n\
             Supermarket;expensive;$350.000,00; food ;2024-01-10\n",
        );

        let table = LedgerStore::new(file.path()).load();
        assert_eq!(table.len(), 2);

        assert_eq!(table[0].kind, MovementKind::Income);
        assert_eq!(table[0].amount, Decimal::from(3000000));
        assert_eq!(table[0].category, "salary");

        assert_eq!(table[1].kind, MovementKind::Expense);
        assert_eq!(table[1].amount, Decimal::from(350000));
        assert_eq!(table[1].year(), 2024);
        assert_eq!(table[1].month(), 1);
    }

    #[test]
    fn test_invalid_rows_are_dropped() {
        let file = write_ledger(
            "Description;Income/expensive;Amount;Category;Date\n\
             Bad amount;expensive;not-a-number;food;2024-01-10 00:00:00\n\
             Bad date;expensive;$100,00;food;someday\n\
             Bad kind;transfer;$100,00;food;2024-01-10 00:00:00\n\
             Empty amount;expensive;;food;2024-01-10 00:00:00\n\
             Good;expensive;$100,00;food;2024-01-10 00:00:00\n",
        );

        let table = LedgerStore::new(file.path()).load();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].description, "Good");
    }

    #[test]
    fn test_all_invalid_ledger_equals_empty_ledger() {
        let file = write_ledger(
            "Description;Income/expensive;Amount;Category;Date\n\
             A;expensive;x;food;2024-01-10 00:00:00\n\
             B;expensive;$100,00;food;not a date\n",
        );

        let table = LedgerStore::new(file.path()).load();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty_not_error() {
        let table = LedgerStore::new("/nonexistent/movements.csv").load();
        assert!(table.is_empty());
    }
}
