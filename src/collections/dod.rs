//! Clinical tables of the DoD sub-study
//!
//! DoD tables carry no roster. Every score row is keyed by the screening
//! number (`SCRNO`), which is also the name of each subject directory.

use std::collections::BTreeMap;

use crate::collections::description::ImagingIndex;
use crate::collections::scores::DodScoreTable;
use crate::models::{DodModality, ScoreTableId};

/// Score tables and image exclusions of the DoD sub-study
#[derive(Debug, Clone, Default)]
pub struct DodTables {
    /// Score tables keyed by screening number
    pub scores: BTreeMap<ScoreTableId, DodScoreTable>,
    /// Exclusions per DoD image dataset
    pub imaging: BTreeMap<DodModality, ImagingIndex>,
}

impl DodTables {
    /// Create an empty bundle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a score table
    #[must_use]
    pub fn with_score_table(mut self, id: ScoreTableId, table: DodScoreTable) -> Self {
        self.scores.insert(id, table);
        self
    }

    /// Attach the exclusions of an image dataset
    #[must_use]
    pub fn with_imaging(mut self, modality: DodModality, index: ImagingIndex) -> Self {
        self.imaging.insert(modality, index);
        self
    }

    /// Score table by id
    #[must_use]
    pub fn score_table(&self, id: ScoreTableId) -> Option<&DodScoreTable> {
        self.scores.get(&id)
    }

    /// Whether a subject directory is excluded from a dataset
    #[must_use]
    pub fn is_excluded(&self, modality: DodModality, subject: &str) -> bool {
        self.imaging
            .get(&modality)
            .is_some_and(|index| index.is_excluded(subject))
    }
}
