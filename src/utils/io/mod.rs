//! IO utilities for file operations
//!
//! This module provides readers for the clinical CSV and Parquet tables,
//! adapters from raw record batches to typed columns, and filesystem
//! discovery of image files.

pub mod clinical;
pub mod discovery;
pub mod tables;

// Re-export commonly used functions for convenience
pub use clinical::{
    load_clinical_tables, load_description, load_diagnosis, load_dod_score_table, load_dod_tables,
    load_exclusions, load_roster,
};
pub use discovery::{FsDiscovery, glob_relative, wildcard_match};
pub use tables::{ColumnSpec, ColumnType, read_csv, read_parquet, read_table};
