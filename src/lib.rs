//! Dataset assembly for longitudinal neuroimaging studies.
//!
//! The crate links image acquisitions and biomarker measurements to clinical
//! records: it maps subject identifiers to roster ids, resolves the diagnosis
//! in effect at each exam, aggregates neuropsychological scores, groups
//! acquisitions per subject for longitudinal analysis and produces
//! subject-level train/test splits.
//!
//! Clinical tables are loaded from CSV or Parquet with
//! [`load_clinical_tables`]; datasets are built with [`assemble`] against a
//! [`FileDiscovery`] implementation such as [`FsDiscovery`]. The DoD
//! sub-study has its own tables ([`load_dod_tables`]) and image datasets
//! ([`assemble_dod`]), keyed by screening number.

pub mod algorithm;
pub mod collections;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{DatasetConfig, DxSource, ImageLayout, LongitudinalConfig, SplitConfig};
pub use error::{DatasetError, Result};
pub use models::{
    Bunch, BunchRow, DodModality, DxLabel, Modality, RosterId, RosterLookup, ScreeningNumber,
};

// Clinical tables
pub use collections::{ClinicalTables, DodTables};

// Assembly and analysis
pub use algorithm::{
    AssembledDataset, DodScoreAggregator, DxGroup, ScoreAggregator, SubjectShuffleSplit,
    SubjectSplit, assemble, assemble_dod, binary_targets, closest_exam_code, closest_exam_date, extract_baseline,
    extract_unique, group,
};

// File discovery
pub use common::traits::FileDiscovery;
pub use utils::io::FsDiscovery;

// Table loading
pub use utils::io::{load_clinical_tables, load_dod_tables};
