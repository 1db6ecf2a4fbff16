//! Clinical table snapshots
//!
//! This module provides indexed, read-only views over the tabular clinical
//! data. Tables are loaded once per assembly call and shared by reference
//! with every resolver.

pub mod demographics;
pub mod description;
pub mod diagnosis;
pub mod dod;
pub mod measures;
pub mod roster;
pub mod scores;

use std::collections::BTreeMap;

pub use demographics::{DemographicRow, DemographicsTable};
pub use description::{DescriptionTable, ImageDescription, ImagingIndex};
pub use diagnosis::DiagnosisTable;
pub use dod::DodTables;
pub use measures::{CsfRow, HippocampusRow, MeasureTables, MmseVisitRow};
pub use roster::{RosterRow, RosterTable};
pub use scores::{DodScoreTable, KeyedScoreTable, ScoreTable};

use crate::models::{Modality, ScoreTableId};

/// All clinical tables needed to resolve identities, diagnoses and scores
#[derive(Debug, Clone, Default)]
pub struct ClinicalTables {
    /// Subject roster
    pub roster: RosterTable,
    /// Diagnosis summary
    pub diagnosis: DiagnosisTable,
    /// Demographics
    pub demographics: DemographicsTable,
    /// Score tables of the battery
    pub scores: BTreeMap<ScoreTableId, ScoreTable>,
    /// Measurement tables (CSF, hippocampus, MMSE visits)
    pub measures: MeasureTables,
    /// Description and exclusions per image dataset
    pub imaging: BTreeMap<Modality, ImagingIndex>,
}

impl ClinicalTables {
    /// Create a bundle from the identity and diagnosis tables
    #[must_use]
    pub fn new(roster: RosterTable, diagnosis: DiagnosisTable) -> Self {
        Self {
            roster,
            diagnosis,
            demographics: DemographicsTable::default(),
            scores: BTreeMap::new(),
            measures: MeasureTables::default(),
            imaging: BTreeMap::new(),
        }
    }

    /// Attach the demographics table
    #[must_use]
    pub fn with_demographics(mut self, demographics: DemographicsTable) -> Self {
        self.demographics = demographics;
        self
    }

    /// Attach a score table
    #[must_use]
    pub fn with_score_table(mut self, id: ScoreTableId, table: ScoreTable) -> Self {
        self.scores.insert(id, table);
        self
    }

    /// Attach the measurement tables
    #[must_use]
    pub fn with_measures(mut self, measures: MeasureTables) -> Self {
        self.measures = measures;
        self
    }

    /// Attach the description and exclusions of an image dataset
    #[must_use]
    pub fn with_imaging(mut self, modality: Modality, index: ImagingIndex) -> Self {
        self.imaging.insert(modality, index);
        self
    }

    /// Score table by id
    #[must_use]
    pub fn score_table(&self, id: ScoreTableId) -> Option<&ScoreTable> {
        self.scores.get(&id)
    }
}
