//! Command-line parsing for the fish-market chart tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::MatchMode;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fmf", version, about = "Fish-market CSV charts (prices, weight, volume)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the price-trend chart (min/avg/max over time).
    Prices(PricesArgs),
    /// Render the daily weight-trend chart.
    Weight(QueryArgs),
    /// Render the volume-by-price histogram chart.
    Volume(VolumeArgs),
    /// List the fish types present in the loaded years.
    Types(QueryArgs),
    /// Interactively pick years and a fish type, then render the price chart.
    ///
    /// This uses the same underlying query pipeline as `fmf prices`; only the
    /// year/type inputs come from prompts instead of flags.
    Pick(PricesArgs),
}

/// Common options for loading and selecting records.
#[derive(Debug, Parser, Clone)]
pub struct QueryArgs {
    /// Fish type to select ("all" keeps every type).
    #[arg(short = 't', long = "type", default_value = "all")]
    pub fish_type: String,

    /// Year to load (repeatable; defaults to every year found in the data directory).
    #[arg(short = 'y', long = "year")]
    pub years: Vec<String>,

    /// How the type filter is matched.
    #[arg(long, value_enum, default_value_t = MatchMode::Exact)]
    pub match_mode: MatchMode,

    /// Directory holding the yearly CSV files (fmf<year>.csv or <year>.csv).
    ///
    /// Defaults to $FMF_DATA_DIR (also read from .env), then `data`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Output path for the rendered chart.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 700)]
    pub height: u32,

    /// Export the selected records to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the derived series (price, weight, histogram) to JSON.
    #[arg(long = "export-series")]
    pub export_series: Option<PathBuf>,
}

/// Price-chart options.
#[derive(Debug, Parser, Clone)]
pub struct PricesArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Hide the min/max range lines (avg line only).
    #[arg(long)]
    pub no_range: bool,

    /// Overlay per-day weight bars on a secondary axis.
    #[arg(long)]
    pub volume_bars: bool,
}

/// Histogram options.
#[derive(Debug, Parser, Clone)]
pub struct VolumeArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Histogram bin count.
    #[arg(long, default_value_t = crate::series::DEFAULT_BIN_COUNT)]
    pub bins: usize,
}
