//! Dataset assembly
//!
//! Each assembler discovers acquisitions (image files or measurement rows),
//! resolves the subject's roster id, then its diagnosis and exam timing, and
//! packs everything into a typed [`Bunch`]. Per-record gaps degrade to
//! sentinels (unknown roster id, `None` diagnosis) instead of aborting the
//! batch.

pub mod dod;
pub mod images;
pub mod measures;
pub mod petmr;

use std::time::Instant;

use crate::algorithm::diagnosis::{DiagnosisMatch, DiagnosisResolver};
use crate::collections::ClinicalTables;
use crate::common::traits::FileDiscovery;
use crate::config::DatasetConfig;
use crate::error::Result;
use crate::models::{
    Bunch, BunchRow, CsfBiomarkers, DxLabel, FuncScan, HippocampusVolumes, MmseScore, Modality,
    PetMrScan, PetScan, RosterLookup,
};
use crate::utils::logging::log_operation_complete;

pub use dod::assemble_dod;
pub use images::{assemble_func, assemble_pet};
pub use measures::{assemble_csf, assemble_hippocampus, assemble_mmse};
pub use petmr::assemble_petmr;

/// Output of [`assemble`], one variant per payload type
#[derive(Debug, Clone, PartialEq)]
pub enum AssembledDataset {
    /// FDG-PET or AV45-PET images
    Pet(Bunch<PetScan>),
    /// rs-fMRI series
    Func(Bunch<FuncScan>),
    /// CSF biomarkers
    Csf(Bunch<CsfBiomarkers>),
    /// Hippocampal volumes
    Hippocampus(Bunch<HippocampusVolumes>),
    /// MMSE scores
    Mmse(Bunch<MmseScore>),
    /// Paired PET and fMRI images
    PetMr(Bunch<PetMrScan>),
}

impl AssembledDataset {
    /// Number of acquisitions
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Pet(b) => b.len(),
            Self::Func(b) => b.len(),
            Self::Csf(b) => b.len(),
            Self::Hippocampus(b) => b.len(),
            Self::Mmse(b) => b.len(),
            Self::PetMr(b) => b.len(),
        }
    }

    /// Whether the dataset is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subject ids, one per acquisition
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        match self {
            Self::Pet(b) => b.subjects(),
            Self::Func(b) => b.subjects(),
            Self::Csf(b) => b.subjects(),
            Self::Hippocampus(b) => b.subjects(),
            Self::Mmse(b) => b.subjects(),
            Self::PetMr(b) => b.subjects(),
        }
    }

    /// Diagnosis labels, one per acquisition
    #[must_use]
    pub fn dx_group(&self) -> &[DxLabel] {
        match self {
            Self::Pet(b) => b.dx_group(),
            Self::Func(b) => b.dx_group(),
            Self::Csf(b) => b.dx_group(),
            Self::Hippocampus(b) => b.dx_group(),
            Self::Mmse(b) => b.dx_group(),
            Self::PetMr(b) => b.dx_group(),
        }
    }
}

/// Assemble the dataset of a modality
///
/// # Arguments
/// * `modality` - Dataset to build
/// * `config` - Study layout
/// * `discovery` - File discovery collaborator, used by imaging modalities
/// * `tables` - Clinical table snapshot
pub fn assemble<D: FileDiscovery + ?Sized>(
    modality: Modality,
    config: &DatasetConfig,
    discovery: &D,
    tables: &ClinicalTables,
) -> Result<AssembledDataset> {
    let start = Instant::now();
    let dataset = match modality {
        Modality::FdgPet | Modality::Av45Pet => {
            AssembledDataset::Pet(assemble_pet(modality, config, discovery, tables)?)
        }
        Modality::RsFmri | Modality::RsFmriDartel => {
            AssembledDataset::Func(assemble_func(modality, config, discovery, tables)?)
        }
        Modality::Csf => AssembledDataset::Csf(assemble_csf(config, tables)?),
        Modality::Hippocampus => AssembledDataset::Hippocampus(assemble_hippocampus(config, tables)?),
        Modality::Mmse => AssembledDataset::Mmse(assemble_mmse(config, tables)?),
        Modality::PetMr => AssembledDataset::PetMr(assemble_petmr(config, discovery, tables)?),
    };
    log_operation_complete("assembled", &modality, dataset.len(), Some(start.elapsed()));
    Ok(dataset)
}

/// Build a row from a resolved diagnosis, taking the exam timing of the
/// matched diagnosis row
pub(crate) fn resolved_row<P>(
    subject: String,
    roster_id: RosterLookup,
    matched: &DiagnosisMatch<'_>,
    payload: P,
) -> BunchRow<P> {
    BunchRow {
        subject,
        roster_id,
        dx_group: matched.label,
        exam_date: matched.exam_date(),
        exam_code: matched.exam_code().map(str::to_string),
        exam_code2: matched.exam_code2().map(str::to_string),
        payload,
    }
}

/// Resolver over the snapshot's diagnosis table
pub(crate) const fn resolver(tables: &ClinicalTables) -> DiagnosisResolver<'_> {
    DiagnosisResolver::new(&tables.diagnosis)
}

/// A subject present in two datasets, with its first row in each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectPair<'a> {
    /// Subject id
    pub subject: &'a str,
    /// First row of the subject in the left dataset
    pub left: usize,
    /// First row of the subject in the right dataset
    pub right: usize,
}

/// Subjects present in both datasets, in ascending subject order
///
/// Row positions are looked up separately in each dataset; the two
/// datasets need not share any ordering. Subjects with an empty id (not on
/// the roster) never match.
#[must_use]
pub fn intersect_subjects<'a, P, Q>(left: &'a Bunch<P>, right: &Bunch<Q>) -> Vec<SubjectPair<'a>> {
    let right_rows = right.subject_rows();
    left.subject_rows()
        .into_iter()
        .filter(|(subject, _)| !subject.is_empty())
        .filter_map(|(subject, rows)| {
            let right_first = right_rows.get(subject)?.first().copied()?;
            Some(SubjectPair {
                subject,
                left: rows.first().copied()?,
                right: right_first,
            })
        })
        .collect()
}

/// Subjects of `left` absent from `right`, with their first row in `left`
#[must_use]
pub fn difference_subjects<'a, P, Q>(left: &'a Bunch<P>, right: &Bunch<Q>) -> Vec<(&'a str, usize)> {
    let right_rows = right.subject_rows();
    left.subject_rows()
        .into_iter()
        .filter(|(subject, _)| !right_rows.contains_key(subject))
        .filter_map(|(subject, rows)| rows.first().map(|&first| (subject, first)))
        .collect()
}
