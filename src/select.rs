//! Record selection: fish-type and source-year filtering.
//!
//! Selection is a pure subset operation: input order is preserved, an empty
//! result is not an error, and the year filter works off the `source_year`
//! tag assigned by the loader (the embedded date is never re-parsed).

use crate::domain::{MarketTable, MatchMode, SelectionCriteria};

/// Keep the records matching the criteria, in input order.
///
/// Type matching is case-insensitive via Unicode lowercasing: the market's
/// type labels contain non-ASCII letters (e.g. "Hýsa").
pub fn select(table: &MarketTable, criteria: &SelectionCriteria) -> MarketTable {
    let needle = criteria.type_filter.to_lowercase();

    let records = table
        .records()
        .iter()
        .filter(|record| {
            criteria.years.is_empty() || criteria.years.contains(&record.source_year)
        })
        .filter(|record| match criteria.match_mode {
            MatchMode::All => true,
            MatchMode::Exact => record.fish_type.to_lowercase() == needle,
            MatchMode::Contains => record.fish_type.to_lowercase().contains(&needle),
        })
        .cloned()
        .collect();

    MarketTable::from_records(records)
}
