//! PitchStats Core - football season ETL and analytical queries.
//!
//! This module provides:
//! - Raw CSV table reading with header canonicalization
//! - Normalization of scraped player and match tables
//! - Relational schema definition and a transactional loader
//! - A closed catalog of analytical query templates with team filtering
//! - Store inspection (liveness, per-table row counts)

pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod raw;

pub use config::{FieldPolicy, LoadConfig, NormalizeConfig};
pub use db::{Store, StoreConfig, TableCounts};
pub use error::{EtlError, EtlResult};
pub use loader::{load, LoadReport};
pub use pipeline::{run_pipeline, run_pipeline_from_paths, PipelineReport};
pub use query::{Cell, ChartKind, ChartSpec, QueryEngine, QueryTemplate, TabularResult};
pub use raw::RawTable;
