//! Collection traits for subject-keyed clinical tables
//!
//! Clinical tables are immutable snapshots indexed by roster id. Each
//! subject owns zero or more rows, kept in storage order.

use crate::models::RosterId;

/// Table whose rows are grouped by subject
pub trait SubjectRowCollection {
    /// Row type of the table
    type Row;

    /// All rows of a subject in storage order (empty when the subject has none)
    fn rows_for(&self, rid: RosterId) -> &[Self::Row];

    /// Number of distinct subjects with at least one row
    fn subject_count(&self) -> usize;

    /// Total number of rows
    fn row_count(&self) -> usize;

    /// Whether the subject has at least one row
    fn contains_subject(&self, rid: RosterId) -> bool {
        !self.rows_for(rid).is_empty()
    }
}
