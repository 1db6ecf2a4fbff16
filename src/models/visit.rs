//! Visit keys: exam dates and visit codes
//!
//! Acquisitions are keyed either by a calendar date or by a visit code such
//! as `bl` or `m06`. The two keying modes never mix within one lookup.

use chrono::NaiveDate;

use crate::error::{DatasetError, Result};

/// Visit codes that all denote the start of a subject's schedule
pub const BASELINE_ORDINAL_CODES: [&str; 6] = ["bl", "sc", "uns1", "scmri", "nv", "f"];

/// Visit codes that mark a baseline acquisition, in extraction order
pub const BASELINE_VISIT_CODES: [&str; 3] = ["sc", "bl", "scmri"];

/// Key used to locate a clinical visit for an acquisition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExamKey {
    /// Calendar date of the exam
    Date(NaiveDate),
    /// Visit code of the exam
    Code(String),
}

impl ExamKey {
    /// Build a key from a date and a code, exactly one of which must be set
    pub fn from_parts(date: Option<NaiveDate>, code: Option<&str>) -> Result<Self> {
        match (date, code) {
            (Some(date), None) => Ok(Self::Date(date)),
            (None, Some(code)) => Ok(Self::Code(code.to_string())),
            (Some(date), Some(code)) => Err(DatasetError::AmbiguousExamKey(format!(
                "both date {date} and code {code:?} given"
            ))),
            (None, None) => Err(DatasetError::AmbiguousExamKey(
                "neither date nor code given".to_string(),
            )),
        }
    }
}

impl From<NaiveDate> for ExamKey {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<&str> for ExamKey {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

/// Visit code scheme of a sub-study
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitScheme {
    /// ADNI1 codes (`v01`, `v03`, ...) stored in `VISCODE`
    Adni1,
    /// ADNI-GO/2 codes (`bl`, `m06`, ...) stored in `VISCODE2`
    AdniGo2,
}

impl VisitScheme {
    /// Scheme a visit code belongs to
    #[must_use]
    pub fn for_code(code: &str) -> Self {
        if code.starts_with('v') {
            Self::Adni1
        } else {
            Self::AdniGo2
        }
    }
}

/// Numeric position of a visit code within a study schedule
///
/// Baseline-like codes map to 0. Every other code must be a single leading
/// letter followed by an integer (`m06` -> 6, `v03` -> 3); anything else is
/// `MalformedVisitCode`.
pub fn visit_ordinal(code: &str) -> Result<i64> {
    if BASELINE_ORDINAL_CODES.contains(&code) {
        return Ok(0);
    }

    let mut chars = code.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .as_str()
            .parse::<i64>()
            .map_err(|_| DatasetError::MalformedVisitCode(code.to_string())),
        _ => Err(DatasetError::MalformedVisitCode(code.to_string())),
    }
}

/// Whether a visit code marks a baseline acquisition
#[must_use]
pub fn is_baseline_code(code: &str) -> bool {
    BASELINE_VISIT_CODES.contains(&code)
}
