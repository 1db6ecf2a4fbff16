//! Record linkage and dataset construction
//!
//! This module contains the temporal match engine, the diagnosis resolver and
//! score aggregator built on top of it, the per-modality assemblers, and the
//! longitudinal and split views over assembled datasets.

pub mod assembly;
pub mod diagnosis;
pub mod longitudinal;
pub mod scores;
pub mod split;
pub mod temporal;

pub use assembly::{
    AssembledDataset, SubjectPair, assemble, assemble_dod, difference_subjects, intersect_subjects,
};
pub use diagnosis::{DiagnosisMatch, DiagnosisResolver};
pub use longitudinal::{
    LongitudinalDataset, LongitudinalGroup, SubjectSequence, extract_baseline, extract_unique,
    group,
};
pub use scores::{
    DodScoreAggregator, ScoreAggregator, SubjectProfile, aggregate, nearest_rank_median, ptsd_status,
};
pub use split::{DxGroup, SubjectShuffleSplit, SubjectSplit, binary_targets};
pub use temporal::{TemporalMatch, closest_exam_code, closest_exam_date};
