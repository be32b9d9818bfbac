//! Formatted terminal output: run summaries, load warnings, and the
//! empty-selection diagnostic.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{MarketTable, MatchMode, QueryConfig};
use crate::io::loader::LoadedData;

/// Row errors shown in full before collapsing into a count.
const MAX_ROW_ERRORS_SHOWN: usize = 8;

/// Format the run summary (inputs + load stats + selection size).
pub fn format_run_summary(
    loaded: &LoadedData,
    selection: &MarketTable,
    config: &QueryConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== fmf - Faroe Fish Market Charts ===\n");
    out.push_str(&format!("Years: {}\n", config.years.join(", ")));
    out.push_str(&format!(
        "Type: '{}' ({})\n",
        config.type_filter,
        match_mode_label(config.match_mode),
    ));
    out.push_str(&format!(
        "Rows: read={} used={} | selected={}\n",
        loaded.rows_read,
        loaded.rows_used(),
        selection.len(),
    ));

    out
}

/// Format load warnings (year skips + row errors). Empty when clean.
pub fn format_warnings(loaded: &LoadedData) -> String {
    let mut out = String::new();

    for skip in &loaded.year_skips {
        out.push_str(&format!("warning: skipped year {}: {}\n", skip.year, skip.message));
    }

    for err in loaded.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!(
            "warning: skipped row {}:{}: {}\n",
            err.year, err.line, err.message
        ));
    }
    if loaded.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "warning: (+{} more skipped rows)\n",
            loaded.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }

    out
}

/// Format the empty-selection diagnostic.
///
/// The listing of available types is the user's only recovery path, so it
/// always covers the full (unfiltered) table.
pub fn format_empty_selection(type_filter: &str, available: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "No data found for '{type_filter}'. Available 'type' values:\n"
    ));
    for name in available {
        out.push_str(&format!("- {name}\n"));
    }
    out
}

fn match_mode_label(mode: MatchMode) -> &'static str {
    match mode {
        MatchMode::Exact => "exact",
        MatchMode::Contains => "contains",
        MatchMode::All => "all types",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::loader::{RowError, YearSkip};

    #[test]
    fn empty_selection_lists_every_available_type() {
        let available = vec!["Hysa 1 MSC".to_string(), "Torsk".to_string()];
        let text = format_empty_selection("Svartkjaftur", &available);
        assert!(text.contains("No data found for 'Svartkjaftur'"));
        assert!(text.contains("- Hysa 1 MSC"));
        assert!(text.contains("- Torsk"));
    }

    #[test]
    fn warnings_collapse_after_the_cap() {
        let loaded = LoadedData {
            table: MarketTable::default(),
            row_errors: (0..12)
                .map(|i| RowError {
                    year: "2025".to_string(),
                    line: i + 2,
                    message: "Invalid `kg` value 'x'.".to_string(),
                })
                .collect(),
            year_skips: vec![YearSkip {
                year: "2023".to_string(),
                message: "No file for year 2023.".to_string(),
            }],
            rows_read: 12,
        };

        let text = format_warnings(&loaded);
        assert!(text.contains("skipped year 2023"));
        assert!(text.contains("(+4 more skipped rows)"));
    }
}
