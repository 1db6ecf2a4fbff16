//! Roster table and identity resolution
//!
//! Maps public subject identifiers to roster ids and back. Misses are
//! sentinel values, never errors.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::models::{IdentityColumn, RosterId, RosterLookup};

/// One row of the roster
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterRow {
    /// Roster id
    #[serde(rename = "RID")]
    pub rid: RosterId,
    /// Public patient id
    #[serde(rename = "PTID", default)]
    pub ptid: Option<String>,
    /// Screening number (DoD sub-study)
    #[serde(rename = "SCRNO", default)]
    pub scrno: Option<String>,
}

impl RosterRow {
    /// Create a row with a patient id
    #[must_use]
    pub fn new(rid: i64, ptid: &str) -> Self {
        Self {
            rid: RosterId(rid),
            ptid: Some(ptid.to_string()),
            scrno: None,
        }
    }
}

/// Indexed roster snapshot
///
/// When an identifier appears on several rows the first row wins, in both
/// directions.
#[derive(Debug, Clone, Default)]
pub struct RosterTable {
    by_ptid: FxHashMap<String, RosterId>,
    by_scrno: FxHashMap<String, RosterId>,
    by_rid: FxHashMap<RosterId, String>,
    rows: usize,
}

impl RosterTable {
    /// Build the roster index from rows
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RosterRow>,
    {
        let mut table = Self::default();
        for row in rows {
            table.rows += 1;
            if let Some(ptid) = row.ptid {
                table.by_rid.entry(row.rid).or_insert_with(|| ptid.clone());
                table.by_ptid.entry(ptid).or_insert(row.rid);
            }
            if let Some(scrno) = row.scrno {
                table.by_scrno.entry(scrno).or_insert(row.rid);
            }
        }
        table
    }

    /// Roster id of a public patient id
    #[must_use]
    pub fn subject_to_roster(&self, subject: &str) -> RosterLookup {
        self.subject_to_roster_by(subject, IdentityColumn::Ptid)
    }

    /// Roster id of an identifier in the given roster column
    #[must_use]
    pub fn subject_to_roster_by(&self, subject: &str, column: IdentityColumn) -> RosterLookup {
        let index = match column {
            IdentityColumn::Ptid => &self.by_ptid,
            IdentityColumn::Scrno => &self.by_scrno,
        };
        let lookup = RosterLookup::from(index.get(subject).copied());
        if lookup.is_unknown() {
            log::debug!("Subject {subject} not found in roster column {}", column.column_name());
        }
        lookup
    }

    /// Public patient id of a roster id; empty when the roster has no entry
    #[must_use]
    pub fn roster_to_subject(&self, rid: RosterId) -> &str {
        self.by_rid.get(&rid).map_or("", String::as_str)
    }

    /// Number of roster rows
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows
    }

    /// Whether the roster is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

impl FromIterator<RosterRow> for RosterTable {
    fn from_iter<I: IntoIterator<Item = RosterRow>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}
