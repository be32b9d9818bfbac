//! Shared "query pipeline" logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load yearly CSVs -> select by type/year -> (caller derives series)
//!
//! Subcommands and the interactive picker can then focus on presentation
//! (which chart to render, what to print).

use crate::domain::{MarketTable, QueryConfig};
use crate::error::AppError;
use crate::io::loader::{self, LoadedData};
use crate::select;

/// The loaded inputs and selected subset of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub loaded: LoadedData,
    pub selection: MarketTable,
}

/// Execute the load + select pipeline.
///
/// An empty selection is not an error; callers decide whether to derive
/// series or surface the available-type diagnostic.
pub fn run_query(config: &QueryConfig) -> Result<RunOutput, AppError> {
    let loaded = loader::load_years(&config.data_dir, &config.years)?;
    let selection = select::select(&loaded.table, &config.criteria());
    Ok(RunOutput { loaded, selection })
}
