//! Export selected records and derived series.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts:
//!
//! - records CSV uses the same column layout as the input files
//! - series JSON is the "portable" representation of one query's derived
//!   output (price series, weight series, histogram)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{MarketTable, PriceSeries, VolumeHistogram, WeightSeries};
use crate::error::AppError;

/// Derived-series export schema.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesFile {
    pub tool: String,
    pub fish_type: String,
    pub years: Vec<String>,
    pub price: PriceSeries,
    pub weight: WeightSeries,
    pub histogram: VolumeHistogram,
}

/// Write the selected records to a CSV file in the input column layout,
/// plus the source-year tag.
pub fn write_records_csv(path: &Path, table: &MarketTable) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "date,type,kg,min price,avg price,max price,year")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for record in table.records() {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            record.raw_date,
            record.fish_type,
            record.weight_kg,
            record.min_price,
            record.avg_price,
            record.max_price,
            record.source_year,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write one query's derived series to a JSON file.
pub fn write_series_json(path: &Path, series: &SeriesFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create series JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, series)
        .map_err(|e| AppError::new(2, format!("Failed to write series JSON: {e}")))?;

    Ok(())
}
