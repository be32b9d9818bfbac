//! Derived chart series.
//!
//! Three independent derivations over a non-empty `MarketTable`:
//!
//! - `price_series`: date-ordered min/avg/max prices with a synthetic
//!   sequence index for evenly spaced chart x-coordinates
//! - `weight_series`: daily weight totals
//! - `volume_histogram`: weight accumulated into equal-width average-price
//!   bins
//!
//! Each derivation is total over its (non-empty) input: a record with an
//! unknown date is dropped from the derived series without aborting the
//! derivation. Invoking a derivation on empty input is caller misuse and
//! fails with an empty-input error.

use std::collections::BTreeMap;

use crate::domain::{
    MarketTable, PriceBin, PricePoint, PriceSeries, VolumeHistogram, WeightPoint, WeightSeries,
};
use crate::error::AppError;

/// Default histogram bin count.
pub const DEFAULT_BIN_COUNT: usize = 19;

/// Derive the price series: stable-sorted ascending by date, zero-based
/// sequence index in sorted order.
pub fn price_series(table: &MarketTable) -> Result<PriceSeries, AppError> {
    if table.is_empty() {
        return Err(AppError::empty_input(
            "Cannot derive a price series from an empty selection.",
        ));
    }

    let mut dropped = 0usize;
    let mut dated: Vec<(chrono::NaiveDate, &crate::domain::MarketRecord)> = Vec::new();
    for record in table.records() {
        match record.date {
            Some(date) => dated.push((date, record)),
            None => dropped += 1,
        }
    }

    // Stable: records on the same date keep their original relative order.
    dated.sort_by_key(|(date, _)| *date);

    let points = dated
        .into_iter()
        .enumerate()
        .map(|(seq, (date, record))| PricePoint {
            seq,
            date,
            min_price: record.min_price,
            avg_price: record.avg_price,
            max_price: record.max_price,
            weight_kg: record.weight_kg,
        })
        .collect();

    Ok(PriceSeries { points, dropped })
}

/// Derive daily weight totals: one entry per distinct date, ascending.
pub fn weight_series(table: &MarketTable) -> Result<WeightSeries, AppError> {
    if table.is_empty() {
        return Err(AppError::empty_input(
            "Cannot derive a weight series from an empty selection.",
        ));
    }

    let mut totals: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
    for record in table.records() {
        // Unknown dates cannot be grouped; drop them as in the price series.
        let Some(date) = record.date else { continue };
        *totals.entry(date).or_insert(0.0) += record.weight_kg;
    }

    Ok(WeightSeries {
        points: totals
            .into_iter()
            .map(|(date, total_kg)| WeightPoint { date, total_kg })
            .collect(),
    })
}

/// Accumulate each point's weight into the bin containing its average price.
///
/// Bounds are padded by one price unit on each side, so the range is never
/// degenerate even when every price in the series is equal. Bins are
/// half-open `[lo, hi)` with the final bin closed at `y_max`.
pub fn volume_histogram(series: &PriceSeries, bin_count: usize) -> Result<VolumeHistogram, AppError> {
    if series.is_empty() {
        return Err(AppError::empty_input(
            "Cannot derive a volume histogram from an empty price series.",
        ));
    }
    let bin_count = bin_count.max(1);

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in &series.points {
        y_min = y_min.min(p.min_price.min(p.avg_price));
        y_max = y_max.max(p.max_price.max(p.avg_price));
    }
    let y_min = y_min - 1.0;
    let y_max = y_max + 1.0;
    let bin_width = (y_max - y_min) / bin_count as f64;

    let mut bins: Vec<PriceBin> = (0..bin_count)
        .map(|i| PriceBin {
            lo: y_min + i as f64 * bin_width,
            hi: y_min + (i + 1) as f64 * bin_width,
            weight_kg: 0.0,
        })
        .collect();

    for p in &series.points {
        let idx = ((p.avg_price - y_min) / bin_width).floor() as isize;
        // The pad guarantees avg_price is inside [y_min, y_max]; the clamp
        // closes the final bin at y_max.
        let idx = idx.clamp(0, bin_count as isize - 1) as usize;
        bins[idx].weight_kg += p.weight_kg;
    }

    Ok(VolumeHistogram {
        bins,
        y_min,
        y_max,
        bin_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketRecord;
    use chrono::NaiveDate;

    fn record(raw_date: &str, avg: f64, kg: f64) -> MarketRecord {
        MarketRecord {
            date: crate::io::loader::parse_market_date(raw_date),
            raw_date: raw_date.to_string(),
            fish_type: "Torsk".to_string(),
            weight_kg: kg,
            min_price: avg - 1.0,
            avg_price: avg,
            max_price: avg + 1.0,
            source_year: "2025".to_string(),
        }
    }

    #[test]
    fn price_series_sorts_by_date_and_indexes_in_order() {
        let table = MarketTable::from_records(vec![
            record("20250103", 12.0, 10.0),
            record("20250101", 10.0, 10.0),
            record("20250102", 11.0, 10.0),
        ]);

        let series = price_series(&table).unwrap();
        let seqs: Vec<usize> = series.points.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn price_series_sort_is_stable_and_idempotent() {
        // Two same-date records must keep file order, and re-deriving from an
        // already-sorted table must be a no-op.
        let table = MarketTable::from_records(vec![
            record("20250101", 10.0, 1.0),
            record("20250101", 20.0, 2.0),
            record("20250102", 30.0, 3.0),
        ]);

        let series = price_series(&table).unwrap();
        assert_eq!(series.points[0].avg_price, 10.0);
        assert_eq!(series.points[1].avg_price, 20.0);

        let again = price_series(&table).unwrap();
        assert_eq!(series, again);
    }

    #[test]
    fn unknown_dates_are_dropped_from_the_series_only() {
        let table = MarketTable::from_records(vec![
            record("garbage", 10.0, 1.0),
            record("20250102", 11.0, 2.0),
        ]);

        let series = price_series(&table).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.dropped, 1);
    }

    #[test]
    fn weight_series_sums_per_distinct_date() {
        let table = MarketTable::from_records(vec![
            record("20250101", 10.0, 100.0),
            record("20250101", 12.0, 50.0),
            record("20250102", 11.0, 30.0),
        ]);

        let series = weight_series(&table).unwrap();
        assert_eq!(series.points.len(), 2);
        assert_eq!(
            series.points[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(series.points[0].total_kg, 150.0);
        assert_eq!(series.points[1].total_kg, 30.0);
    }

    #[test]
    fn histogram_conserves_total_weight() {
        let table = MarketTable::from_records(vec![
            record("20250101", 10.0, 100.0),
            record("20250102", 14.5, 50.0),
            record("20250103", 22.0, 25.0),
        ]);

        let series = price_series(&table).unwrap();
        let hist = volume_histogram(&series, DEFAULT_BIN_COUNT).unwrap();
        assert_eq!(hist.bins.len(), DEFAULT_BIN_COUNT);
        assert!((hist.total_weight() - 175.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_bounds_are_padded() {
        let table = MarketTable::from_records(vec![record("20250101", 10.0, 5.0)]);
        let series = price_series(&table).unwrap();

        // min_price = 9, max_price = 11, so bounds are [8, 12].
        let hist = volume_histogram(&series, 4).unwrap();
        assert_eq!(hist.y_min, 8.0);
        assert_eq!(hist.y_max, 12.0);
        assert_eq!(hist.bin_width, 1.0);
        // avg 10 lands in [10, 11).
        assert_eq!(hist.bins[2].weight_kg, 5.0);
    }

    #[test]
    fn equal_prices_do_not_degenerate() {
        let mut flat = record("20250101", 10.0, 5.0);
        flat.min_price = 10.0;
        flat.max_price = 10.0;
        let table = MarketTable::from_records(vec![flat]);

        let series = price_series(&table).unwrap();
        let hist = volume_histogram(&series, DEFAULT_BIN_COUNT).unwrap();
        assert!(hist.bin_width > 0.0);
        assert!((hist.total_weight() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn value_at_upper_bound_falls_into_the_last_bin() {
        // avg == max, so after padding avg sits exactly one unit below y_max;
        // force the boundary case with a single record and two bins.
        let mut top = record("20250101", 12.0, 3.0);
        top.min_price = 10.0;
        top.max_price = 12.0;
        let table = MarketTable::from_records(vec![top]);

        let series = price_series(&table).unwrap();
        // Bounds [9, 13], two bins: [9, 11) and [11, 13]. avg 12 -> last bin.
        let hist = volume_histogram(&series, 2).unwrap();
        assert_eq!(hist.bins[1].weight_kg, 3.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        let table = MarketTable::default();
        assert_eq!(price_series(&table).unwrap_err().exit_code(), 4);
        assert_eq!(weight_series(&table).unwrap_err().exit_code(), 4);

        let empty = PriceSeries {
            points: Vec::new(),
            dropped: 0,
        };
        assert_eq!(
            volume_histogram(&empty, DEFAULT_BIN_COUNT)
                .unwrap_err()
                .exit_code(),
            4
        );
    }
}
