//! Assembled datasets as aligned parallel columns
//!
//! A `Bunch` stores one column per field, every column holding exactly one
//! entry per acquisition. Rows are appended whole, and column sets handed in
//! from outside are length-checked, so the columns cannot drift apart.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use smallvec::SmallVec;

use crate::error::{DatasetError, Result};
use crate::models::diagnosis::DxLabel;
use crate::models::subject::RosterLookup;

/// Row positions of one subject within a bunch
pub type SubjectRows = SmallVec<[usize; 8]>;

/// One acquisition with its resolved clinical context
#[derive(Debug, Clone, PartialEq)]
pub struct BunchRow<P> {
    /// Public subject id (empty when the roster had no entry)
    pub subject: String,
    /// Roster id lookup result
    pub roster_id: RosterLookup,
    /// Diagnosis label at the acquisition
    pub dx_group: DxLabel,
    /// Exam date of the matched clinical visit
    pub exam_date: Option<NaiveDate>,
    /// ADNI1 visit code of the matched visit
    pub exam_code: Option<String>,
    /// ADNI-GO/2 visit code of the matched visit
    pub exam_code2: Option<String>,
    /// Modality-specific payload
    pub payload: P,
}

/// Dataset of acquisitions stored as equal-length columns
#[derive(Debug, Clone, PartialEq)]
pub struct Bunch<P> {
    subjects: Vec<String>,
    roster_ids: Vec<RosterLookup>,
    dx_group: Vec<DxLabel>,
    exam_dates: Vec<Option<NaiveDate>>,
    exam_codes: Vec<Option<String>>,
    exam_codes2: Vec<Option<String>>,
    payload: Vec<P>,
}

impl<P> Default for Bunch<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Bunch<P> {
    /// Create an empty bunch
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subjects: Vec::new(),
            roster_ids: Vec::new(),
            dx_group: Vec::new(),
            exam_dates: Vec::new(),
            exam_codes: Vec::new(),
            exam_codes2: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Create an empty bunch with room for `capacity` rows
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subjects: Vec::with_capacity(capacity),
            roster_ids: Vec::with_capacity(capacity),
            dx_group: Vec::with_capacity(capacity),
            exam_dates: Vec::with_capacity(capacity),
            exam_codes: Vec::with_capacity(capacity),
            exam_codes2: Vec::with_capacity(capacity),
            payload: Vec::with_capacity(capacity),
        }
    }

    /// Build a bunch from whole columns
    ///
    /// Fails with `LengthMismatch` naming the first column whose length
    /// differs from `subjects`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_columns(
        subjects: Vec<String>,
        roster_ids: Vec<RosterLookup>,
        dx_group: Vec<DxLabel>,
        exam_dates: Vec<Option<NaiveDate>>,
        exam_codes: Vec<Option<String>>,
        exam_codes2: Vec<Option<String>>,
        payload: Vec<P>,
    ) -> Result<Self> {
        let expected = subjects.len();
        let lengths = [
            ("roster_ids", roster_ids.len()),
            ("dx_group", dx_group.len()),
            ("exam_dates", exam_dates.len()),
            ("exam_codes", exam_codes.len()),
            ("exam_codes2", exam_codes2.len()),
            ("payload", payload.len()),
        ];
        if let Some((column, actual)) = lengths.into_iter().find(|(_, len)| *len != expected) {
            return Err(DatasetError::LengthMismatch {
                column,
                expected,
                actual,
            });
        }

        Ok(Self {
            subjects,
            roster_ids,
            dx_group,
            exam_dates,
            exam_codes,
            exam_codes2,
            payload,
        })
    }

    /// Append one row
    pub fn push(&mut self, row: BunchRow<P>) {
        self.subjects.push(row.subject);
        self.roster_ids.push(row.roster_id);
        self.dx_group.push(row.dx_group);
        self.exam_dates.push(row.exam_date);
        self.exam_codes.push(row.exam_code);
        self.exam_codes2.push(row.exam_code2);
        self.payload.push(row.payload);
    }

    /// Number of acquisitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether the bunch has no acquisitions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Subject ids
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Roster lookups
    #[must_use]
    pub fn roster_ids(&self) -> &[RosterLookup] {
        &self.roster_ids
    }

    /// Diagnosis labels
    #[must_use]
    pub fn dx_group(&self) -> &[DxLabel] {
        &self.dx_group
    }

    /// Matched exam dates
    #[must_use]
    pub fn exam_dates(&self) -> &[Option<NaiveDate>] {
        &self.exam_dates
    }

    /// Matched ADNI1 visit codes
    #[must_use]
    pub fn exam_codes(&self) -> &[Option<String>] {
        &self.exam_codes
    }

    /// Matched ADNI-GO/2 visit codes
    #[must_use]
    pub fn exam_codes2(&self) -> &[Option<String>] {
        &self.exam_codes2
    }

    /// Modality payloads
    #[must_use]
    pub fn payload(&self) -> &[P] {
        &self.payload
    }

    /// Row positions per subject, subjects in ascending order
    ///
    /// Positions within a subject keep their original (ascending) order.
    #[must_use]
    pub fn subject_rows(&self) -> BTreeMap<&str, SubjectRows> {
        let mut rows: BTreeMap<&str, SubjectRows> = BTreeMap::new();
        for (idx, subject) in self.subjects.iter().enumerate() {
            rows.entry(subject.as_str()).or_default().push(idx);
        }
        rows
    }

    /// Distinct subject ids in ascending order
    #[must_use]
    pub fn unique_subjects(&self) -> Vec<&str> {
        self.subject_rows().into_keys().collect()
    }

    /// First row position of a subject
    #[must_use]
    pub fn first_index_of(&self, subject: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s == subject)
    }

    /// Transform every payload, keeping the shared columns
    #[must_use]
    pub fn map_payload<Q, F>(self, f: F) -> Bunch<Q>
    where
        F: FnMut(P) -> Q,
    {
        Bunch {
            subjects: self.subjects,
            roster_ids: self.roster_ids,
            dx_group: self.dx_group,
            exam_dates: self.exam_dates,
            exam_codes: self.exam_codes,
            exam_codes2: self.exam_codes2,
            payload: self.payload.into_iter().map(f).collect(),
        }
    }

    /// Consume the bunch into rows
    #[must_use]
    pub fn into_rows(self) -> Vec<BunchRow<P>> {
        self.subjects
            .into_iter()
            .zip(self.roster_ids)
            .zip(self.dx_group)
            .zip(self.exam_dates)
            .zip(self.exam_codes)
            .zip(self.exam_codes2)
            .zip(self.payload)
            .map(
                |((((((subject, roster_id), dx_group), exam_date), exam_code), exam_code2), payload)| {
                    BunchRow {
                        subject,
                        roster_id,
                        dx_group,
                        exam_date,
                        exam_code,
                        exam_code2,
                        payload,
                    }
                },
            )
            .collect()
    }
}

impl<P: Clone> Bunch<P> {
    /// Copy of one row
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<BunchRow<P>> {
        (idx < self.len()).then(|| BunchRow {
            subject: self.subjects[idx].clone(),
            roster_id: self.roster_ids[idx],
            dx_group: self.dx_group[idx],
            exam_date: self.exam_dates[idx],
            exam_code: self.exam_codes[idx].clone(),
            exam_code2: self.exam_codes2[idx].clone(),
            payload: self.payload[idx].clone(),
        })
    }

    /// New bunch holding the given rows, in the given order
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        let mut selected = Self::with_capacity(indices.len());
        for &idx in indices {
            let row = self.row(idx).ok_or(DatasetError::IndexOutOfBounds {
                index: idx,
                len: self.len(),
            })?;
            selected.push(row);
        }
        Ok(selected)
    }
}

impl<P> FromIterator<BunchRow<P>> for Bunch<P> {
    fn from_iter<I: IntoIterator<Item = BunchRow<P>>>(iter: I) -> Self {
        let mut bunch = Self::new();
        bunch.extend(iter);
        bunch
    }
}

impl<P> Extend<BunchRow<P>> for Bunch<P> {
    fn extend<I: IntoIterator<Item = BunchRow<P>>>(&mut self, iter: I) {
        for row in iter {
            self.push(row);
        }
    }
}
