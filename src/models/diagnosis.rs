//! Diagnosis entity model
//!
//! This module contains the diagnosis rows of the clinical summary table and
//! the label vocabulary an effective diagnosis code maps onto.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{DatasetError, Result};
use crate::models::subject::RosterId;
use crate::models::visit::VisitScheme;

/// Internal code for a subject with no diagnosis rows
pub const NO_DIAGNOSIS_CODE: i64 = -4;

/// One row of the diagnosis summary table
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisRow {
    /// Roster id of the subject
    pub rid: RosterId,
    /// Exam date, when recorded
    pub exam_date: Option<NaiveDate>,
    /// ADNI1 visit code
    pub viscode: Option<String>,
    /// ADNI-GO/2 visit code
    pub viscode2: Option<String>,
    /// Overall diagnostic change code (`DXCHANGE`)
    pub dx_change: Option<i64>,
    /// Current diagnostic state code (`DXCURREN`)
    pub dx_current: Option<i64>,
}

impl DiagnosisRow {
    /// Create a row with no keys and no codes
    #[must_use]
    pub const fn new(rid: RosterId) -> Self {
        Self {
            rid,
            exam_date: None,
            viscode: None,
            viscode2: None,
            dx_change: None,
            dx_current: None,
        }
    }

    /// Set the exam date
    #[must_use]
    pub fn with_exam_date(mut self, date: NaiveDate) -> Self {
        self.exam_date = Some(date);
        self
    }

    /// Set both visit codes
    #[must_use]
    pub fn with_codes(mut self, viscode: Option<&str>, viscode2: Option<&str>) -> Self {
        self.viscode = viscode.map(str::to_string);
        self.viscode2 = viscode2.map(str::to_string);
        self
    }

    /// Set the change and current codes
    #[must_use]
    pub fn with_dx(mut self, dx_change: Option<i64>, dx_current: Option<i64>) -> Self {
        self.dx_change = dx_change;
        self.dx_current = dx_current;
        self
    }

    /// Larger of the two code columns, ignoring nulls
    ///
    /// `None` only when both columns are null.
    #[must_use]
    pub fn effective_code(&self) -> Option<i64> {
        match (self.dx_change, self.dx_current) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Visit code recorded under the given scheme
    #[must_use]
    pub fn visit_code(&self, scheme: VisitScheme) -> Option<&str> {
        match scheme {
            VisitScheme::Adni1 => self.viscode.as_deref(),
            VisitScheme::AdniGo2 => self.viscode2.as_deref(),
        }
    }
}

/// Clinical group label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DxLabel {
    /// No diagnosis available
    None,
    /// Cognitively normal
    Normal,
    /// Mild cognitive impairment
    Mci,
    /// Alzheimer's disease
    Ad,
    /// Conversion from normal to MCI
    NormalToMci,
    /// Conversion from MCI to AD
    MciToAd,
    /// Conversion from normal to AD
    NormalToAd,
    /// Reversion from MCI to normal
    MciToNormal,
    /// Reversion from AD to MCI
    AdToMci,
    /// Reversion from AD to normal
    AdToNormal,
    /// Early MCI (description files only)
    Emci,
    /// Late MCI (description files only)
    Lmci,
    /// Significant memory concern (description files only)
    Smc,
    /// MCI subject known to convert later (description files only)
    MciConverter,
}

impl DxLabel {
    /// Labels indexed by effective diagnosis code
    pub const CODED: [Self; 10] = [
        Self::None,
        Self::Normal,
        Self::Mci,
        Self::Ad,
        Self::NormalToMci,
        Self::MciToAd,
        Self::NormalToAd,
        Self::MciToNormal,
        Self::AdToMci,
        Self::AdToNormal,
    ];

    /// Map an effective diagnosis code onto its label
    ///
    /// The no-diagnosis sentinel maps to `None`; any other code outside
    /// `0..=9` is `InvalidDiagnosisCode`.
    pub fn from_code(code: i64) -> Result<Self> {
        if code == NO_DIAGNOSIS_CODE {
            return Ok(Self::None);
        }
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::CODED.get(idx).copied())
            .ok_or(DatasetError::InvalidDiagnosisCode(code))
    }

    /// Numeric code of a coded label
    #[must_use]
    pub fn code(self) -> Option<i64> {
        Self::CODED
            .iter()
            .position(|label| *label == self)
            .and_then(|idx| i64::try_from(idx).ok())
    }

    /// Label text as written in the study tables
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Normal => "Normal",
            Self::Mci => "MCI",
            Self::Ad => "AD",
            Self::NormalToMci => "Normal->MCI",
            Self::MciToAd => "MCI->AD",
            Self::NormalToAd => "Normal->AD",
            Self::MciToNormal => "MCI->Normal",
            Self::AdToMci => "AD->MCI",
            Self::AdToNormal => "AD->Normal",
            Self::Emci => "EMCI",
            Self::Lmci => "LMCI",
            Self::Smc => "SMC",
            Self::MciConverter => "MCI-Converter",
        }
    }
}

impl fmt::Display for DxLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DxLabel {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        let label = match s.trim() {
            "None" => Self::None,
            "Normal" | "CN" => Self::Normal,
            "MCI" => Self::Mci,
            "AD" => Self::Ad,
            "Normal->MCI" => Self::NormalToMci,
            "MCI->AD" => Self::MciToAd,
            "Normal->AD" => Self::NormalToAd,
            "MCI->Normal" => Self::MciToNormal,
            "AD->MCI" => Self::AdToMci,
            "AD->Normal" => Self::AdToNormal,
            "EMCI" => Self::Emci,
            "LMCI" => Self::Lmci,
            "SMC" => Self::Smc,
            "MCI-Converter" => Self::MciConverter,
            other => return Err(DatasetError::UnknownDiagnosisLabel(other.to_string())),
        };
        Ok(label)
    }
}
