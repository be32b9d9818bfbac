//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - market records and the unified table (`MarketRecord`, `MarketTable`)
//! - selection inputs (`SelectionCriteria`, `MatchMode`)
//! - derived chart series (`PriceSeries`, `WeightSeries`, `VolumeHistogram`)
//! - the resolved per-run configuration (`QueryConfig`)

pub mod types;

pub use types::*;
