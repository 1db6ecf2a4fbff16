//! Diagnosis resolution
//!
//! Collapses the change and current-state code columns of every diagnosis
//! row into one effective code, picks the row closest to the acquisition
//! with the temporal match engine and maps its code onto a label.

use chrono::NaiveDate;

use crate::algorithm::temporal::{self, TemporalMatch};
use crate::collections::DiagnosisTable;
use crate::common::traits::SubjectRowCollection;
use crate::error::{DatasetError, Result};
use crate::models::{
    DiagnosisRow, DxLabel, ExamKey, NO_DIAGNOSIS_CODE, RosterId, RosterLookup, VisitScheme,
};

/// Resolved diagnosis of one acquisition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosisMatch<'a> {
    /// Effective diagnosis code (`-4` when the subject has no usable rows)
    pub code: i64,
    /// Label of the code
    pub label: DxLabel,
    /// Matched diagnosis row
    pub row: Option<&'a DiagnosisRow>,
}

impl<'a> DiagnosisMatch<'a> {
    /// Sentinel for subjects without diagnosis rows
    #[must_use]
    pub const fn none() -> Self {
        Self {
            code: NO_DIAGNOSIS_CODE,
            label: DxLabel::None,
            row: None,
        }
    }

    /// Whether a row was matched
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.row.is_some()
    }

    /// Exam date of the matched row
    #[must_use]
    pub fn exam_date(&self) -> Option<NaiveDate> {
        self.row.and_then(|row| row.exam_date)
    }

    /// ADNI1 visit code of the matched row
    #[must_use]
    pub fn exam_code(&self) -> Option<&'a str> {
        self.row.and_then(|row| row.viscode.as_deref())
    }

    /// ADNI-GO/2 visit code of the matched row
    #[must_use]
    pub fn exam_code2(&self) -> Option<&'a str> {
        self.row.and_then(|row| row.viscode2.as_deref())
    }
}

/// Resolves diagnoses against a diagnosis table snapshot
#[derive(Debug, Clone, Copy)]
pub struct DiagnosisResolver<'a> {
    table: &'a DiagnosisTable,
}

impl<'a> DiagnosisResolver<'a> {
    /// Create a resolver over a table
    #[must_use]
    pub const fn new(table: &'a DiagnosisTable) -> Self {
        Self { table }
    }

    /// Resolve the diagnosis of a subject at an exam date or visit code
    ///
    /// Subjects without rows, or without any row carrying the requested key,
    /// resolve to the `-4` / `None` sentinel so that batch joins can carry
    /// on. Rows with both code columns null, effective codes outside the
    /// label table and malformed visit codes are errors.
    pub fn resolve(&self, rid: RosterId, key: &ExamKey) -> Result<DiagnosisMatch<'a>> {
        let rows = self.table.rows_for(rid);
        if rows.is_empty() {
            log::debug!("No diagnosis rows for roster id {rid}");
            return Ok(DiagnosisMatch::none());
        }

        let codes = effective_codes(rid, rows)?;

        let (candidates, matched) = match key {
            ExamKey::Date(target) => {
                let (positions, dates): (Vec<usize>, Vec<NaiveDate>) = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, row)| row.exam_date.map(|date| (pos, date)))
                    .unzip();
                let matched = temporal::closest_exam_date(rid, *target, &dates);
                (positions, matched)
            }
            ExamKey::Code(target) => {
                let scheme = VisitScheme::for_code(target);
                let (positions, visit_codes): (Vec<usize>, Vec<&str>) = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(pos, row)| row.visit_code(scheme).map(|code| (pos, code)))
                    .unzip();
                let matched = temporal::closest_exam_code(rid, target, &visit_codes);
                (positions, matched)
            }
        };

        let TemporalMatch { index, .. } = match matched {
            Ok(matched) => matched,
            Err(DatasetError::NoMatchCandidates { .. }) => {
                log::debug!("No diagnosis row of roster id {rid} carries a key for {key:?}");
                return Ok(DiagnosisMatch::none());
            }
            Err(e) => return Err(e),
        };

        let position = candidates[index];
        let code = codes[position];
        Ok(DiagnosisMatch {
            code,
            label: DxLabel::from_code(code)?,
            row: Some(&rows[position]),
        })
    }

    /// Resolve for a roster lookup, mapping unknown subjects to the sentinel
    pub fn resolve_lookup(
        &self,
        lookup: RosterLookup,
        key: &ExamKey,
    ) -> Result<DiagnosisMatch<'a>> {
        match lookup {
            RosterLookup::Known(rid) => self.resolve(rid, key),
            RosterLookup::Unknown => Ok(DiagnosisMatch::none()),
        }
    }
}

/// Effective code of every row, in row order
fn effective_codes(rid: RosterId, rows: &[DiagnosisRow]) -> Result<Vec<i64>> {
    rows.iter()
        .enumerate()
        .map(|(row, dx)| {
            dx.effective_code()
                .ok_or(DatasetError::MissingDiagnosisCode { rid, row })
        })
        .collect()
}
