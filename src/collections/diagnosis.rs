//! Diagnosis summary collection
//!
//! Rows are grouped by roster id for lookup; within a subject they keep the
//! order in which the table stored them, which is not necessarily temporal.

use rustc_hash::FxHashMap;

use crate::common::traits::SubjectRowCollection;
use crate::models::{DiagnosisRow, RosterId};

/// Diagnosis rows indexed by subject
#[derive(Debug, Clone, Default)]
pub struct DiagnosisTable {
    rows_by_rid: FxHashMap<RosterId, Vec<DiagnosisRow>>,
    row_count: usize,
}

impl DiagnosisTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from rows in storage order
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = DiagnosisRow>,
    {
        let mut table = Self::new();
        for row in rows {
            table.add(row);
        }
        table
    }

    /// Append a row
    pub fn add(&mut self, row: DiagnosisRow) {
        self.row_count += 1;
        self.rows_by_rid.entry(row.rid).or_default().push(row);
    }

    /// Rows of a subject recorded at an exact exam date
    pub fn rows_on(
        &self,
        rid: RosterId,
        date: chrono::NaiveDate,
    ) -> impl Iterator<Item = &DiagnosisRow> {
        self.rows_for(rid)
            .iter()
            .filter(move |row| row.exam_date == Some(date))
    }
}

impl SubjectRowCollection for DiagnosisTable {
    type Row = DiagnosisRow;

    fn rows_for(&self, rid: RosterId) -> &[DiagnosisRow] {
        self.rows_by_rid.get(&rid).map(Vec::as_slice).unwrap_or_default()
    }

    fn subject_count(&self) -> usize {
        self.rows_by_rid.len()
    }

    fn row_count(&self) -> usize {
        self.row_count
    }
}

impl FromIterator<DiagnosisRow> for DiagnosisTable {
    fn from_iter<I: IntoIterator<Item = DiagnosisRow>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}
