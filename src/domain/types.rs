//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while deriving chart series
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the fish-type filter is matched against records.
///
/// A filter value of `"all"` (any casing) always resolves to `All`,
/// regardless of the mode requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Trimmed, case-insensitive equality.
    Exact,
    /// Lower-cased substring containment.
    Contains,
    /// Keep every record, unfiltered by type.
    All,
}

/// One row of market activity.
///
/// The `min <= avg <= max` price ordering is assumed by consumers but never
/// validated here; a row only fails to load when it cannot be parsed at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Calendar date parsed from the 8-digit `YYYYMMDD` field.
    ///
    /// `None` marks an unknown date. Such records stay in the table (they
    /// still count toward selection and exports) and are only dropped when
    /// deriving date-keyed series.
    pub date: Option<NaiveDate>,
    /// The date field as it appeared in the file (for diagnostics/exports).
    pub raw_date: String,
    pub fish_type: String,
    pub weight_kg: f64,
    pub min_price: f64,
    pub avg_price: f64,
    pub max_price: f64,
    /// The year label of the file this record came from.
    ///
    /// Grouping by requested years trusts this tag, not the year embedded in
    /// `date` (a mislabeled file keeps its file-name year).
    pub source_year: String,
}

/// An ordered sequence of market records.
///
/// Duplicate dates/types are valid: they represent separate transactions on
/// the same market day. Construction is append-only; tables are read-only
/// after they are built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketTable {
    records: Vec<MarketRecord>,
}

impl MarketTable {
    /// Build a table, normalizing every record's `fish_type` by trimming
    /// surrounding whitespace.
    ///
    /// Trimming happens here, once per table, so repeated queries against the
    /// same table are consistent.
    pub fn from_records(mut records: Vec<MarketRecord>) -> Self {
        for record in &mut records {
            let trimmed = record.fish_type.trim();
            if trimmed.len() != record.fish_type.len() {
                record.fish_type = trimmed.to_string();
            }
        }
        Self { records }
    }

    pub fn records(&self) -> &[MarketRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct `fish_type` values in case-insensitive alphabetical order.
    ///
    /// This listing is the user's recovery path after an empty selection, so
    /// it must cover the whole (unfiltered) table. Ties between values that
    /// differ only in case are broken by the exact string for determinism.
    pub fn distinct_types(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for record in &self.records {
            if seen.insert(record.fish_type.clone()) {
                out.push(record.fish_type.clone());
            }
        }
        out.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        out
    }
}

/// What to keep from a loaded table.
#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub type_filter: String,
    pub match_mode: MatchMode,
    /// Source-year labels to keep. Empty means "no year restriction".
    pub years: BTreeSet<String>,
}

impl SelectionCriteria {
    /// Build criteria, resolving the `"all"` wildcard.
    pub fn new(type_filter: &str, match_mode: MatchMode, years: impl IntoIterator<Item = String>) -> Self {
        let type_filter = type_filter.trim().to_string();
        let match_mode = if type_filter.eq_ignore_ascii_case("all") {
            MatchMode::All
        } else {
            match_mode
        };
        Self {
            type_filter,
            match_mode,
            years: years.into_iter().collect(),
        }
    }
}

/// One chart-ready price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Zero-based position in date order.
    ///
    /// Charts plot against this index, not the calendar date, so irregular
    /// gaps between market days do not compress or stretch the x-axis.
    pub seq: usize,
    pub date: NaiveDate,
    pub min_price: f64,
    pub avg_price: f64,
    pub max_price: f64,
    pub weight_kg: f64,
}

/// Price observations sorted ascending by date (stable: original row order
/// breaks ties).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
    /// Records excluded from this series because their date was unknown.
    pub dropped: usize,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sequence positions to re-label with a human-readable date.
    ///
    /// Every `max(1, len/10)`-th point, always including the first.
    pub fn date_ticks(&self) -> Vec<(usize, String)> {
        let step = (self.points.len() / 10).max(1);
        self.points
            .iter()
            .step_by(step)
            .map(|p| (p.seq, p.date.format("%Y-%m-%d").to_string()))
            .collect()
    }
}

/// Total weight traded on one market day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub total_kg: f64,
}

/// Daily weight totals, one entry per distinct date, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSeries {
    pub points: Vec<WeightPoint>,
}

/// One histogram bin: weight accumulated over a contiguous price range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBin {
    pub lo: f64,
    pub hi: f64,
    pub weight_kg: f64,
}

/// Weight-by-average-price histogram over equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeHistogram {
    pub bins: Vec<PriceBin>,
    pub y_min: f64,
    pub y_max: f64,
    pub bin_width: f64,
}

impl VolumeHistogram {
    pub fn total_weight(&self) -> f64 {
        self.bins.iter().map(|b| b.weight_kg).sum()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags or picker answers (plus defaults).
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub data_dir: PathBuf,
    /// Years to load, in the order they were requested.
    pub years: Vec<String>,
    pub type_filter: String,
    pub match_mode: MatchMode,

    /// Histogram bin count.
    pub bins: usize,
    /// Output path for the rendered chart (default depends on the chart).
    pub out: Option<PathBuf>,
    pub chart_width: u32,
    pub chart_height: u32,

    /// Draw min/max range lines on the price chart.
    pub show_range: bool,
    /// Overlay per-day weight bars on the price chart (secondary axis).
    pub show_volume: bool,

    pub export_records: Option<PathBuf>,
    pub export_series: Option<PathBuf>,
}

impl QueryConfig {
    pub fn criteria(&self) -> SelectionCriteria {
        SelectionCriteria::new(&self.type_filter, self.match_mode, self.years.iter().cloned())
    }
}
