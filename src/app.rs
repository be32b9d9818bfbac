//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (or runs the interactive picker)
//! - loads and selects market records
//! - prints summaries/diagnostics
//! - renders charts and writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, PricesArgs, QueryArgs, VolumeArgs};
use crate::domain::QueryConfig;
use crate::error::AppError;
use crate::io::export::SeriesFile;

pub mod pipeline;

/// Entry point for the `fmf` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `fmf` (and `fmf -t Torsk`) to behave like `fmf pick ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the prompt-first UX of the original tool.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Prices(args) => handle_prices(args, false),
        Command::Pick(args) => handle_prices(args, true),
        Command::Weight(args) => handle_weight(args),
        Command::Volume(args) => handle_volume(args),
        Command::Types(args) => handle_types(args),
    }
}

fn handle_prices(args: PricesArgs, interactive: bool) -> Result<(), AppError> {
    let mut config = query_config_from_args(&args.query, crate::series::DEFAULT_BIN_COUNT);
    config.show_range = !args.no_range;
    config.show_volume = args.volume_bars;

    if interactive {
        let picked = crate::cli::picker::prompt_for_query(&config.data_dir)?;
        config.years = picked.years;
        config.type_filter = picked.fish_type;
        println!(
            "Plotting data for: {}, year(s) {}",
            config.type_filter,
            config.years.join(", ")
        );
    } else {
        resolve_default_years(&mut config)?;
    }

    let Some(run) = run_and_report(&config)? else {
        return Ok(());
    };

    let prices = crate::series::price_series(&run.selection)?;
    let out = output_path(&config, "fmf_prices.svg");
    crate::chart::render_price_chart(&prices, &config, &out)?;
    println!("Wrote {}", out.display());

    write_exports(&run, &config)
}

fn handle_weight(args: QueryArgs) -> Result<(), AppError> {
    let mut config = query_config_from_args(&args, crate::series::DEFAULT_BIN_COUNT);
    resolve_default_years(&mut config)?;

    let Some(run) = run_and_report(&config)? else {
        return Ok(());
    };

    let weights = crate::series::weight_series(&run.selection)?;
    let out = output_path(&config, "fmf_weight.svg");
    crate::chart::render_weight_chart(&weights, &config, &out)?;
    println!("Wrote {}", out.display());

    write_exports(&run, &config)
}

fn handle_volume(args: VolumeArgs) -> Result<(), AppError> {
    let mut config = query_config_from_args(&args.query, args.bins);
    resolve_default_years(&mut config)?;

    let Some(run) = run_and_report(&config)? else {
        return Ok(());
    };

    let prices = crate::series::price_series(&run.selection)?;
    let hist = crate::series::volume_histogram(&prices, config.bins)?;
    let out = output_path(&config, "fmf_volume.svg");
    crate::chart::render_volume_chart(&hist, &config, &out)?;
    println!("Wrote {}", out.display());

    write_exports(&run, &config)
}

fn handle_types(args: QueryArgs) -> Result<(), AppError> {
    let mut config = query_config_from_args(&args, crate::series::DEFAULT_BIN_COUNT);
    resolve_default_years(&mut config)?;

    let loaded = crate::io::loader::load_years(&config.data_dir, &config.years)?;
    print!("{}", crate::report::format_warnings(&loaded));

    println!("Types in year(s) {}:", config.years.join(", "));
    for name in loaded.table.distinct_types() {
        println!("- {name}");
    }
    Ok(())
}

/// Run the query pipeline and print the summary.
///
/// Returns `None` after printing the diagnostic when the selection is empty;
/// that is a reported outcome, not an error.
fn run_and_report(config: &QueryConfig) -> Result<Option<pipeline::RunOutput>, AppError> {
    let run = pipeline::run_query(config)?;

    print!("{}", crate::report::format_run_summary(&run.loaded, &run.selection, config));
    print!("{}", crate::report::format_warnings(&run.loaded));

    if run.selection.is_empty() {
        print!(
            "{}",
            crate::report::format_empty_selection(
                &config.type_filter,
                &run.loaded.table.distinct_types()
            )
        );
        return Ok(None);
    }

    Ok(Some(run))
}

fn write_exports(run: &pipeline::RunOutput, config: &QueryConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export_records {
        crate::io::export::write_records_csv(path, &run.selection)?;
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &config.export_series {
        let price = crate::series::price_series(&run.selection)?;
        let weight = crate::series::weight_series(&run.selection)?;
        let histogram = crate::series::volume_histogram(&price, config.bins)?;
        let series = SeriesFile {
            tool: "fmf".to_string(),
            fish_type: config.type_filter.clone(),
            years: config.years.clone(),
            price,
            weight,
            histogram,
        };
        crate::io::export::write_series_json(path, &series)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn query_config_from_args(args: &QueryArgs, bins: usize) -> QueryConfig {
    QueryConfig {
        data_dir: resolve_data_dir(args),
        years: args.years.clone(),
        type_filter: args.fish_type.clone(),
        match_mode: args.match_mode,
        bins,
        out: args.out.clone(),
        chart_width: args.width,
        chart_height: args.height,
        show_range: true,
        show_volume: false,
        export_records: args.export.clone(),
        export_series: args.export_series.clone(),
    }
}

/// Default to every year present in the data directory when `--year` was
/// not given, so `fmf prices -t Torsk` charts the full history.
fn resolve_default_years(config: &mut QueryConfig) -> Result<(), AppError> {
    if !config.years.is_empty() {
        return Ok(());
    }

    let discovered = crate::cli::picker::discover_years(&config.data_dir);
    if discovered.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No yearly CSV files found under '{}'. Pass -y <year> or set FMF_DATA_DIR.",
                config.data_dir.display()
            ),
        ));
    }
    config.years = discovered;
    Ok(())
}

fn resolve_data_dir(args: &QueryArgs) -> PathBuf {
    if let Some(dir) = &args.data_dir {
        return dir.clone();
    }

    dotenvy::dotenv().ok();
    std::env::var("FMF_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn output_path(config: &QueryConfig, default_name: &str) -> PathBuf {
    config
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_name))
}

/// Rewrite argv so `fmf` defaults to `fmf pick`.
///
/// Rules:
/// - `fmf`                     -> `fmf pick`
/// - `fmf -t Torsk ...`        -> `fmf pick -t Torsk ...`
/// - `fmf --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("pick".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "prices" | "weight" | "volume" | "types" | "pick"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "pick flags".
    if arg1.starts_with('-') {
        argv.insert(1, "pick".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_pick() {
        assert_eq!(rewrite_args(argv(&["fmf"])), argv(&["fmf", "pick"]));
        assert_eq!(
            rewrite_args(argv(&["fmf", "-t", "Torsk"])),
            argv(&["fmf", "pick", "-t", "Torsk"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["fmf", "prices", "-y", "2025"])),
            argv(&["fmf", "prices", "-y", "2025"])
        );
        assert_eq!(rewrite_args(argv(&["fmf", "--help"])), argv(&["fmf", "--help"]));
    }
}
