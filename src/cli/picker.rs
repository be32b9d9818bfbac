//! Interactive year/type picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `fmf` and answer two prompts" UX
//!
//! Years are discovered from the data directory's yearly CSV files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::AppError;

/// Answers collected from the prompts.
#[derive(Debug, Clone)]
pub struct PickedQuery {
    pub years: Vec<String>,
    pub fish_type: String,
}

/// Prompt the user for years and a fish type.
///
/// Behavior:
/// - list the years discovered in the data directory
/// - Enter accepts the default (latest year, all types)
/// - `q` cancels
pub fn prompt_for_query(data_dir: &Path) -> Result<PickedQuery, AppError> {
    let years = discover_years(data_dir);
    if years.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No yearly CSV files found under '{}'. Name them fmf<year>.csv or <year>.csv.",
                data_dir.display()
            ),
        ));
    }

    println!("Available years: {}", years.join(", "));
    let default_year = years.last().cloned().unwrap_or_default();

    let picked_years = loop {
        let input = read_prompt(&format!(
            "Year(s) to load, comma-separated (default: {default_year}, q to quit): "
        ))?;
        if input.is_empty() {
            break vec![default_year.clone()];
        }

        let tokens: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            println!("Enter at least one year, or press Enter for {default_year}.");
            continue;
        }
        break tokens;
    };

    let fish_type = {
        let input = read_prompt("Fish type to plot (default: all): ")?;
        if input.is_empty() {
            "all".to_string()
        } else {
            input
        }
    };

    Ok(PickedQuery {
        years: picked_years,
        fish_type,
    })
}

/// Discover year labels from the data directory (deterministic order).
///
/// Both `fmf<year>.csv` and `<year>.csv` naming conventions are recognized;
/// a year is any four-digit stem.
pub fn discover_years(data_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(data_dir) else {
        return Vec::new();
    };

    let mut years = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            != Some(true)
        {
            continue;
        }

        let candidate = stem.strip_prefix("fmf").unwrap_or(stem);
        if candidate.len() == 4 && candidate.bytes().all(|b| b.is_ascii_digit()) {
            years.push(candidate.to_string());
        }
    }

    years.sort();
    years.dedup();
    years
}

fn read_prompt(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

    if bytes == 0 {
        return Err(AppError::new(
            2,
            "No input received. Pass years and a type with `fmf prices -y <year> -t <type>`.",
        ));
    }

    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Err(AppError::new(2, "Canceled."));
    }
    Ok(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discover_years_accepts_both_naming_conventions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fmf2025.csv"), "x").unwrap();
        fs::write(dir.path().join("2023.csv"), "x").unwrap();
        fs::write(dir.path().join("fmf2023.csv"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("prices.csv"), "x").unwrap();

        assert_eq!(discover_years(dir.path()), vec!["2023", "2025"]);
    }

    #[test]
    fn discover_years_handles_a_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover_years(&missing).is_empty());
    }
}
