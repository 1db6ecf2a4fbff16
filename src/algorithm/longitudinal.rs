//! Longitudinal grouping
//!
//! Groups an assembled dataset by subject and keeps the subjects whose
//! acquisition count falls inside a window. Subjects outside the window are
//! dropped whole, never truncated.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::{BaselinePolicy, LongitudinalConfig};
use crate::error::Result;
use crate::models::bunch::SubjectRows;
use crate::models::visit::{BASELINE_VISIT_CODES, is_baseline_code};
use crate::models::{Bunch, DxLabel};

/// All acquisitions of one retained subject
#[derive(Debug, Clone, PartialEq)]
pub struct LongitudinalGroup {
    /// Subject id
    pub subject: String,
    /// Row positions in the source dataset, ascending
    pub rows: SubjectRows,
    /// Position within `rows` of the baseline acquisition
    pub baseline: usize,
}

impl LongitudinalGroup {
    /// Number of acquisitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the group has no acquisitions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row position of the baseline acquisition in the source dataset
    #[must_use]
    pub fn baseline_row(&self) -> usize {
        self.rows[self.baseline]
    }
}

/// Per-subject view of one subject's acquisitions
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSequence<'a, P> {
    /// Subject id
    pub subject: &'a str,
    /// Payloads in acquisition order
    pub payloads: Vec<&'a P>,
    /// Diagnosis labels in acquisition order
    pub dx_group: Vec<DxLabel>,
    /// Exam dates in acquisition order
    pub exam_dates: Vec<Option<NaiveDate>>,
    /// ADNI1 visit codes in acquisition order
    pub exam_codes: Vec<Option<&'a str>>,
}

/// A dataset grouped by subject
#[derive(Debug, Clone, PartialEq)]
pub struct LongitudinalDataset<'a, P> {
    source: &'a Bunch<P>,
    groups: Vec<LongitudinalGroup>,
}

/// Group a dataset by subject within an acquisition-count window
///
/// Subjects come out in ascending id order. Within a subject, acquisitions
/// keep their order in the source dataset. Rows with an empty subject id
/// (roster misses) belong to no subject and are left out.
///
/// # Errors
/// `InvalidWindow` when the window's minimum exceeds its maximum
pub fn group<'a, P>(
    bunch: &'a Bunch<P>,
    config: &LongitudinalConfig,
) -> Result<LongitudinalDataset<'a, P>> {
    config.validate()?;

    let subject_rows = identified_subject_rows(bunch);
    let total = subject_rows.len();
    let groups: Vec<LongitudinalGroup> = subject_rows
        .into_iter()
        .filter(|(_, rows)| config.accepts(rows.len()))
        .map(|(subject, rows)| {
            let baseline = baseline_position(bunch, &rows, config.baseline_policy);
            LongitudinalGroup {
                subject: subject.to_string(),
                rows,
                baseline,
            }
        })
        .collect();

    log::info!(
        "Retained {} of {} subjects with [{}, {}] acquisitions",
        groups.len(),
        total,
        config.min_acquisitions,
        config.max_acquisitions
    );

    Ok(LongitudinalDataset {
        source: bunch,
        groups,
    })
}

/// Rows per subject, without the rows whose subject id is empty
fn identified_subject_rows<P>(bunch: &Bunch<P>) -> BTreeMap<&str, SubjectRows> {
    let mut rows = bunch.subject_rows();
    if let Some(unidentified) = rows.remove("") {
        log::debug!(
            "Ignoring {} acquisitions without a subject id",
            unidentified.len()
        );
    }
    rows
}

fn baseline_position<P>(bunch: &Bunch<P>, rows: &[usize], policy: BaselinePolicy) -> usize {
    match policy {
        BaselinePolicy::FirstAcquisition => 0,
        BaselinePolicy::BaselineVisitCode => rows
            .iter()
            .position(|&row| {
                bunch.exam_codes2()[row]
                    .as_deref()
                    .is_some_and(is_baseline_code)
            })
            .unwrap_or(0),
    }
}

impl<'a, P> LongitudinalDataset<'a, P> {
    /// Retained subject groups
    #[must_use]
    pub fn groups(&self) -> &[LongitudinalGroup] {
        &self.groups
    }

    /// Number of retained subjects
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no subject was retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Retained subject ids
    #[must_use]
    pub fn subjects(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.subject.as_str()).collect()
    }

    /// Source row of each subject's baseline acquisition
    #[must_use]
    pub fn baseline_rows(&self) -> Vec<usize> {
        self.groups.iter().map(LongitudinalGroup::baseline_row).collect()
    }

    /// Source rows of all retained acquisitions, subject by subject
    #[must_use]
    pub fn flat_rows(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|g| g.rows.iter().copied())
            .collect()
    }

    /// Acquisition sequences per subject
    #[must_use]
    pub fn sequences(&self) -> Vec<SubjectSequence<'a, P>> {
        let source = self.source;
        self.groups
            .iter()
            .filter_map(|g| {
                let subject = source.subjects().get(*g.rows.first()?)?.as_str();
                Some(SubjectSequence {
                    subject,
                    payloads: g.rows.iter().map(|&r| &source.payload()[r]).collect(),
                    dx_group: g.rows.iter().map(|&r| source.dx_group()[r]).collect(),
                    exam_dates: g.rows.iter().map(|&r| source.exam_dates()[r]).collect(),
                    exam_codes: g
                        .rows
                        .iter()
                        .map(|&r| source.exam_codes()[r].as_deref())
                        .collect(),
                })
            })
            .collect()
    }
}

impl<P: Clone> LongitudinalDataset<'_, P> {
    /// One row per retained subject: its baseline acquisition
    pub fn baseline(&self) -> Result<Bunch<P>> {
        self.source.select(&self.baseline_rows())
    }

    /// Every retained acquisition, grouped by subject
    pub fn flatten(&self) -> Result<Bunch<P>> {
        self.source.select(&self.flat_rows())
    }
}

/// Rows whose ADNI-GO/2 visit code is a baseline code
///
/// Rows are ordered by code (`sc` rows, then `bl`, then `scmri`) and by
/// position within each code.
#[must_use]
pub fn baseline_indices<P>(bunch: &Bunch<P>) -> Vec<usize> {
    BASELINE_VISIT_CODES
        .iter()
        .flat_map(|code| {
            bunch
                .exam_codes2()
                .iter()
                .enumerate()
                .filter(move |(_, c)| c.as_deref() == Some(*code))
                .map(|(idx, _)| idx)
        })
        .collect()
}

/// Dataset restricted to baseline visits (see [`baseline_indices`])
pub fn extract_baseline<P: Clone>(bunch: &Bunch<P>) -> Result<Bunch<P>> {
    bunch.select(&baseline_indices(bunch))
}

/// First row of each subject, subjects in ascending order
///
/// Rows with an empty subject id are not a subject and are skipped.
#[must_use]
pub fn unique_indices<P>(bunch: &Bunch<P>) -> Vec<usize> {
    identified_subject_rows(bunch)
        .into_values()
        .filter_map(|rows| rows.first().copied())
        .collect()
}

/// Dataset restricted to the first row of each subject
pub fn extract_unique<P: Clone>(bunch: &Bunch<P>) -> Result<Bunch<P>> {
    bunch.select(&unique_indices(bunch))
}
