//! Error handling for dataset assembly.
//!
//! Per-record gaps (unknown identities, subjects without diagnosis rows,
//! empty score sets) are represented by sentinel values elsewhere in the
//! crate and never reach this type. Everything here either aborts the
//! current record resolution or the whole call.

use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

use crate::models::RosterId;

/// Errors that can occur while linking and assembling datasets
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Identity lookup miss where a known identity was required
    #[error("Unknown identity: {0}")]
    UnknownIdentity(String),

    /// Temporal match invoked with no candidate rows
    #[error("No match candidates for roster id {rid}")]
    NoMatchCandidates {
        /// Subject whose candidate set was empty
        rid: RosterId,
    },

    /// Visit code that cannot be converted to an ordinal
    #[error("Malformed visit code: {0:?}")]
    MalformedVisitCode(String),

    /// Both or neither of exam date and visit code were supplied
    #[error("Exactly one of exam date or visit code must be given: {0}")]
    AmbiguousExamKey(String),

    /// Diagnosis row with both code columns null
    #[error("Diagnosis row {row} for roster id {rid} has neither a change code nor a current code")]
    MissingDiagnosisCode {
        /// Subject owning the row
        rid: RosterId,
        /// Position of the row within the subject's rows
        row: usize,
    },

    /// Effective diagnosis code outside the label table
    #[error("Diagnosis code {0} is outside the label table")]
    InvalidDiagnosisCode(i64),

    /// Modality name that is not supported
    #[error("Unknown modality: {0:?}")]
    UnknownModality(String),

    /// Diagnosis label text that is not part of the label vocabulary
    #[error("Unknown diagnosis label: {0:?}")]
    UnknownDiagnosisLabel(String),

    /// File discovery found no image where one was required
    #[error("No file matching {pattern:?} in {}", dir.display())]
    MissingRequiredFile {
        /// Directory that was searched
        dir: PathBuf,
        /// Pattern that found nothing
        pattern: String,
    },

    /// Parallel columns of a bunch disagree in length
    #[error("Column {column} has length {actual}, expected {expected}")]
    LengthMismatch {
        /// Offending column
        column: &'static str,
        /// Length of the first column
        expected: usize,
        /// Length of the offending column
        actual: usize,
    },

    /// Row index past the end of a bunch
    #[error("Row index {index} out of bounds for {len} rows")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of rows
        len: usize,
    },

    /// Acquisition count window with min greater than max
    #[error("Invalid acquisition window [{min}, {max}]")]
    InvalidWindow {
        /// Lower bound
        min: usize,
        /// Upper bound
        max: usize,
    },

    /// Split parameters that cannot produce a train/test partition
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Required column absent from a loaded table
    #[error("Column {column} not found in {table}")]
    MissingColumn {
        /// Table name
        table: String,
        /// Column name
        column: String,
    },

    /// Date string matching none of the configured formats
    #[error("Date parsing error: {0:?}")]
    DateParse(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Table loading failure with context
    #[error("Load error: {0:#}")]
    Load(#[from] anyhow::Error),
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
