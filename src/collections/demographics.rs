//! Demographics collection

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::common::traits::SubjectRowCollection;
use crate::models::RosterId;

/// Date of birth used when the table has none for a subject
pub const DEFAULT_DATE_OF_BIRTH: (i32, u32, u32) = (1900, 1, 1);

/// Gender code used when the table has none for a subject
pub const UNKNOWN_GENDER: i64 = -1;

/// One row of the demographics table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemographicRow {
    /// Roster id
    #[serde(rename = "RID")]
    pub rid: RosterId,
    /// Year of birth
    #[serde(rename = "PTDOBYY", default)]
    pub dob_year: Option<i64>,
    /// Month of birth
    #[serde(rename = "PTDOBMM", default)]
    pub dob_month: Option<i64>,
    /// Gender code
    #[serde(rename = "PTGENDER", default)]
    pub gender: Option<i64>,
}

/// Demographic rows indexed by subject
#[derive(Debug, Clone, Default)]
pub struct DemographicsTable {
    rows_by_rid: FxHashMap<RosterId, Vec<DemographicRow>>,
    row_count: usize,
}

impl DemographicsTable {
    /// Build the table from rows in storage order
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = DemographicRow>,
    {
        let mut table = Self::default();
        for row in rows {
            table.row_count += 1;
            table.rows_by_rid.entry(row.rid).or_default().push(row);
        }
        table
    }

    /// Date of birth (first of the month), from the first non-null year and
    /// month; 1900-01-01 when either is missing or invalid
    #[must_use]
    pub fn date_of_birth(&self, rid: RosterId) -> NaiveDate {
        let rows = self.rows_for(rid);
        let year = rows.iter().find_map(|r| r.dob_year);
        let month = rows.iter().find_map(|r| r.dob_month);

        year.zip(month)
            .and_then(|(y, m)| {
                NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, u32::try_from(m).ok()?, 1)
            })
            .unwrap_or_else(default_date_of_birth)
    }

    /// First non-null gender code, or -1
    #[must_use]
    pub fn gender(&self, rid: RosterId) -> i64 {
        self.rows_for(rid)
            .iter()
            .find_map(|r| r.gender)
            .unwrap_or(UNKNOWN_GENDER)
    }
}

/// The default date of birth as a date
#[must_use]
pub fn default_date_of_birth() -> NaiveDate {
    let (y, m, d) = DEFAULT_DATE_OF_BIRTH;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

impl SubjectRowCollection for DemographicsTable {
    type Row = DemographicRow;

    fn rows_for(&self, rid: RosterId) -> &[DemographicRow] {
        self.rows_by_rid.get(&rid).map(Vec::as_slice).unwrap_or_default()
    }

    fn subject_count(&self) -> usize {
        self.rows_by_rid.len()
    }

    fn row_count(&self) -> usize {
        self.row_count
    }
}
