//! Per-visit measurement rows
//!
//! Biomarker, volumetric and MMSE tables are datasets in their own right:
//! each row becomes one acquisition of the assembled dataset.

use chrono::NaiveDate;

use crate::models::{HIPPOCAMPUS_COLUMNS, RosterId};

/// One CSF biomarker measurement
#[derive(Debug, Clone, PartialEq)]
pub struct CsfRow {
    /// Roster id
    pub rid: RosterId,
    /// Visit code of the draw
    pub viscode: Option<String>,
    /// Amyloid-beta
    pub abeta: Option<f64>,
    /// Phosphorylated tau
    pub ptau: Option<f64>,
    /// Total tau
    pub tau: Option<f64>,
}

impl CsfRow {
    /// All three measures, when none is missing
    #[must_use]
    pub fn measures(&self) -> Option<[f64; 3]> {
        Some([self.abeta?, self.ptau?, self.tau?])
    }
}

/// One FreeSurfer hippocampal volume measurement
#[derive(Debug, Clone, PartialEq)]
pub struct HippocampusRow {
    /// Roster id
    pub rid: RosterId,
    /// Exam date of the scan
    pub exam_date: Option<NaiveDate>,
    /// ADNI1 visit code
    pub viscode: Option<String>,
    /// ADNI-GO/2 visit code
    pub viscode2: Option<String>,
    /// Subfield volumes
    pub volumes: [Option<f64>; HIPPOCAMPUS_COLUMNS],
}

impl HippocampusRow {
    /// Whether at least one volume is present
    #[must_use]
    pub fn has_any_volume(&self) -> bool {
        self.volumes.iter().any(Option::is_some)
    }
}

/// One MMSE administration
#[derive(Debug, Clone, PartialEq)]
pub struct MmseVisitRow {
    /// Roster id
    pub rid: RosterId,
    /// ADNI1 visit code
    pub viscode: Option<String>,
    /// ADNI-GO/2 visit code
    pub viscode2: Option<String>,
    /// MMSE total
    pub score: Option<f64>,
}

/// Measurement tables that form datasets of their own
#[derive(Debug, Clone, Default)]
pub struct MeasureTables {
    /// CSF biomarker rows, all files of the series in order
    pub csf: Vec<CsfRow>,
    /// Hippocampal volume rows
    pub hippocampus: Vec<HippocampusRow>,
    /// MMSE administrations
    pub mmse: Vec<MmseVisitRow>,
}
