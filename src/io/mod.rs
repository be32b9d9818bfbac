//! Input/output helpers.
//!
//! - yearly CSV ingest + validation (`loader`)
//! - record/series exports (CSV/JSON) (`export`)

pub mod export;
pub mod loader;

pub use export::*;
pub use loader::*;
