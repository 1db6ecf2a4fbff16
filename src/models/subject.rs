//! Subject identity types
//!
//! A subject has a public identifier (e.g. `011_S_0002`) and an internal
//! roster id. The mapping is 1:1 but lookups may miss in either direction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Internal numeric roster key of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterId(pub i64);

impl fmt::Display for RosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RosterId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Screening number of a DoD sub-study subject
///
/// DoD subject directories are named by the zero-padded screening number
/// (`01500001`); the clinical tables store it as an integer (`1500001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreeningNumber(pub i64);

impl ScreeningNumber {
    /// Parse a DoD subject id, ignoring leading zeros
    ///
    /// # Errors
    /// `UnknownIdentity` when the id is not an integer
    pub fn parse(subject: &str) -> Result<Self> {
        subject
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| DatasetError::UnknownIdentity(subject.to_string()))
    }
}

impl fmt::Display for ScreeningNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ScreeningNumber {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Result of a public id to roster id lookup
///
/// `Unknown` is a regular value: a subject may be imaged without being on the
/// roster. Callers must check for it before using the id in further joins,
/// since an unknown id would only ever produce empty result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RosterLookup {
    /// Subject found on the roster
    Known(RosterId),
    /// Subject absent from the roster
    #[default]
    Unknown,
}

impl RosterLookup {
    /// The roster id, if known
    #[must_use]
    pub const fn known(self) -> Option<RosterId> {
        match self {
            Self::Known(rid) => Some(rid),
            Self::Unknown => None,
        }
    }

    /// Whether the lookup missed
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The roster id, or `UnknownIdentity` naming the subject
    pub fn require(self, subject: &str) -> Result<RosterId> {
        self.known()
            .ok_or_else(|| DatasetError::UnknownIdentity(subject.to_string()))
    }
}

impl From<Option<RosterId>> for RosterLookup {
    fn from(value: Option<RosterId>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for RosterLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(rid) => write!(f, "{rid}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Roster column holding the public identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityColumn {
    /// Patient id (`PTID`), used by the main study
    #[default]
    Ptid,
    /// Screening number (`SCRNO`), used by the DoD sub-study
    Scrno,
}

impl IdentityColumn {
    /// Column name in the roster table
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Ptid => "PTID",
            Self::Scrno => "SCRNO",
        }
    }
}
