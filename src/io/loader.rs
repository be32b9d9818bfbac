//! CSV ingest for yearly market files.
//!
//! This module turns one yearly CSV file per requested year into a single
//! unified `MarketTable`.
//!
//! Design goals:
//! - **Row-level tolerance**: skip bad rows, but report what happened
//! - **Year-level tolerance**: a missing/unreadable year is a warning, not
//!   a failure; only a load that yields zero rows overall is fatal
//! - **Deterministic behavior**: per-file row order is preserved, and files
//!   are appended in the order years were requested

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{MarketRecord, MarketTable};
use crate::error::AppError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub year: String,
    /// 1-based line number within the source file.
    pub line: usize,
    pub message: String,
}

/// A whole requested year that could not be loaded.
#[derive(Debug, Clone)]
pub struct YearSkip {
    pub year: String,
    pub message: String,
}

/// Load output: the unified table + per-row and per-year diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: MarketTable,
    pub row_errors: Vec<RowError>,
    pub year_skips: Vec<YearSkip>,
    pub rows_read: usize,
}

impl LoadedData {
    pub fn rows_used(&self) -> usize {
        self.table.len()
    }
}

/// Resolve the conventional file path for a year.
///
/// Deployments have used both `fmf<year>.csv` and `<year>.csv`; the prefixed
/// name wins when both exist.
pub fn resolve_year_file(data_dir: &Path, year: &str) -> Option<PathBuf> {
    let prefixed = data_dir.join(format!("fmf{year}.csv"));
    if prefixed.is_file() {
        return Some(prefixed);
    }
    let bare = data_dir.join(format!("{year}.csv"));
    if bare.is_file() {
        return Some(bare);
    }
    None
}

/// Load every requested year into one unified table.
///
/// Fails only when zero years yield any row; a partial load (some years
/// succeeded) is reported through `year_skips` instead.
pub fn load_years(data_dir: &Path, years: &[String]) -> Result<LoadedData, AppError> {
    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut year_skips = Vec::new();
    let mut rows_read = 0usize;

    for year in years {
        let Some(path) = resolve_year_file(data_dir, year) else {
            year_skips.push(YearSkip {
                year: year.clone(),
                message: format!(
                    "No file for year {year} (looked for fmf{year}.csv and {year}.csv under '{}').",
                    data_dir.display()
                ),
            });
            continue;
        };

        match load_year_file(&path, year, &mut records, &mut row_errors) {
            Ok(n) => rows_read += n,
            Err(message) => year_skips.push(YearSkip {
                year: year.clone(),
                message,
            }),
        }
    }

    if records.is_empty() {
        return Err(AppError::no_data_loaded(format!(
            "No market data loaded for year(s): {}.",
            years.join(", ")
        )));
    }

    Ok(LoadedData {
        table: MarketTable::from_records(records),
        row_errors,
        year_skips,
        rows_read,
    })
}

/// Parse one yearly file, appending well-formed rows to `records`.
///
/// Returns the number of data rows read, or an error message when the file
/// as a whole is unusable (cannot open, unreadable header).
fn load_year_file(
    path: &Path,
    year: &str,
    records: &mut Vec<MarketRecord>,
    row_errors: &mut Vec<RowError>,
) -> Result<usize, String> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open '{}': {e}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read CSV headers in '{}': {e}", path.display()))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in ["date", "type", "kg", "min price", "avg price", "max price"] {
        if !header_map.contains_key(name) {
            return Err(format!(
                "Missing required column `{name}` in '{}'.",
                path.display()
            ));
        }
    }

    let mut rows_read = 0usize;
    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    year: year.to_string(),
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, year) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError {
                year: year.to_string(),
                line,
                message,
            }),
        }
    }

    Ok(rows_read)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "\u{feff}date"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    year: &str,
) -> Result<MarketRecord, String> {
    // An unparseable date is not a row failure: the record keeps an explicit
    // unknown-date marker and is only excluded from date-keyed series.
    let raw_date = get_optional(record, header_map, "date")
        .unwrap_or_default()
        .to_string();
    let date = parse_market_date(&raw_date);

    let fish_type = get_required(record, header_map, "type")?.to_string();
    let weight_kg = parse_f64(record, header_map, "kg")?;
    let min_price = parse_f64(record, header_map, "min price")?;
    let avg_price = parse_f64(record, header_map, "avg price")?;
    let max_price = parse_f64(record, header_map, "max price")?;

    Ok(MarketRecord {
        date,
        raw_date,
        fish_type,
        weight_kg,
        min_price,
        avg_price,
        max_price,
        source_year: year.to_string(),
    })
}

/// Parse an 8-digit `YYYYMMDD` date field.
///
/// Anything that is not exactly eight ASCII digits (or eight digits that do
/// not form a valid calendar date) yields the unknown-date marker.
pub fn parse_market_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

fn parse_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let raw = get_required(record, header_map, name)?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite `{name}` value '{raw}'."));
    }
    Ok(value)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "date,type,kg,min price,avg price,max price\n";

    fn write_year(dir: &Path, year: &str, body: &str) {
        let path = dir.join(format!("fmf{year}.csv"));
        fs::write(path, format!("{HEADER}{body}")).unwrap();
    }

    #[test]
    fn load_is_idempotent_over_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        write_year(
            dir.path(),
            "2025",
            "20250101,Torsk,120.5,10,12,15\n20250102,Hysa 1 MSC,80,8,9,11\n",
        );

        let years = vec!["2025".to_string()];
        let first = load_years(dir.path(), &years).unwrap();
        let second = load_years(dir.path(), &years).unwrap();
        assert_eq!(first.table, second.table);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = String::new();
        for day in 1..=5 {
            body.push_str(&format!("2025010{day},Torsk,100,10,12,15\n"));
        }
        body.push_str("20250106,Torsk,not-a-number,10,12,15\n");
        for day in 1..=4 {
            body.push_str(&format!("2025020{day},Hysa 2,50,8,9,11\n"));
        }
        write_year(dir.path(), "2025", &body);

        let loaded = load_years(dir.path(), &[String::from("2025")]).unwrap();
        assert_eq!(loaded.rows_used(), 9);
        assert_eq!(loaded.rows_read, 10);
        assert_eq!(loaded.row_errors.len(), 1);
        assert_eq!(loaded.row_errors[0].line, 7);
    }

    #[test]
    fn all_years_failing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_years(dir.path(), &[String::from("9999")]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn partial_load_records_a_year_skip() {
        let dir = tempfile::tempdir().unwrap();
        write_year(dir.path(), "2024", "20240301,Torsk,60,9,10,12\n");

        let years = vec!["2024".to_string(), "2023".to_string()];
        let loaded = load_years(dir.path(), &years).unwrap();
        assert_eq!(loaded.rows_used(), 1);
        assert_eq!(loaded.year_skips.len(), 1);
        assert_eq!(loaded.year_skips[0].year, "2023");
    }

    #[test]
    fn records_are_tagged_and_ordered_by_requested_year() {
        let dir = tempfile::tempdir().unwrap();
        write_year(dir.path(), "2024", "20240101,Torsk,60,9,10,12\n");
        write_year(dir.path(), "2023", "20230101,Torsk,55,9,10,12\n");

        // 2024 requested first, so its rows come first even though 2023 sorts lower.
        let years = vec!["2024".to_string(), "2023".to_string()];
        let loaded = load_years(dir.path(), &years).unwrap();
        let tags: Vec<&str> = loaded
            .table
            .records()
            .iter()
            .map(|r| r.source_year.as_str())
            .collect();
        assert_eq!(tags, vec!["2024", "2023"]);
    }

    #[test]
    fn bare_year_file_name_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("2025.csv"),
            format!("{HEADER}20250101,Torsk,100,10,12,15\n"),
        )
        .unwrap();

        let loaded = load_years(dir.path(), &[String::from("2025")]).unwrap();
        assert_eq!(loaded.rows_used(), 1);
    }

    #[test]
    fn unknown_dates_are_kept_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_year(
            dir.path(),
            "2025",
            "banana,Torsk,100,10,12,15\n20250102,Torsk,90,10,12,15\n",
        );

        let loaded = load_years(dir.path(), &[String::from("2025")]).unwrap();
        assert_eq!(loaded.rows_used(), 2);
        assert_eq!(loaded.table.records()[0].date, None);
        assert_eq!(loaded.table.records()[0].raw_date, "banana");
        assert!(loaded.table.records()[1].date.is_some());
    }

    #[test]
    fn market_date_requires_eight_digits() {
        assert_eq!(
            parse_market_date("20250131"),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert_eq!(parse_market_date("2025131"), None);
        assert_eq!(parse_market_date("20251301"), None);
        assert_eq!(parse_market_date("2025-01-31"), None);
        assert_eq!(parse_market_date(""), None);
    }
}
