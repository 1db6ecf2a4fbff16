//! Domain models for dataset assembly
//!
//! This module contains the typed records shared by the clinical tables,
//! the linkage algorithms and the assembled datasets.

pub mod acquisition;
pub mod bunch;
pub mod diagnosis;
pub mod score;
pub mod subject;
pub mod visit;

// Re-export commonly used types
pub use acquisition::{
    CsfBiomarkers, DOD_BATTERY_SIZE, DodModality, DodScan, FuncScan, HIPPOCAMPUS_COLUMNS,
    HippocampusVolumes, MmseScore, Modality, PetMrScan, PetScan,
};
pub use bunch::{Bunch, BunchRow};
pub use diagnosis::{DiagnosisRow, DxLabel, NO_DIAGNOSIS_CODE};
pub use score::{DodScoreKind, ScoreColumn, ScoreKind, ScoreSource, ScoreTableId, ValidityRule};
pub use subject::{IdentityColumn, RosterId, RosterLookup, ScreeningNumber};
pub use visit::{ExamKey, VisitScheme, visit_ordinal};
