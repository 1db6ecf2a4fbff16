//! Temporal match engine
//!
//! Finds the candidate visit closest to a target key. Date mode measures
//! absolute day differences. Code mode tries an exact code match first and
//! falls back to the smallest visit-ordinal distance, so an acquisition
//! recorded under a drifting visit scheme still lands on its neighbouring
//! visit instead of being dropped.
//!
//! Ties always go to the first candidate in the order given.

use chrono::NaiveDate;

use crate::error::{DatasetError, Result};
use crate::models::{RosterId, visit_ordinal};

/// Candidate selected by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalMatch {
    /// Position of the candidate in the slice searched
    pub index: usize,
    /// Distance to the target (days, or visit-ordinal units)
    pub distance: i64,
    /// Whether the candidate equals the target
    pub exact: bool,
}

/// Closest candidate date to `target`
///
/// # Arguments
/// * `rid` - Subject owning the candidates, reported on failure
/// * `target` - Acquisition date
/// * `candidates` - Exam dates in storage order
///
/// # Errors
/// `NoMatchCandidates` when `candidates` is empty
pub fn closest_exam_date(
    rid: RosterId,
    target: NaiveDate,
    candidates: &[NaiveDate],
) -> Result<TemporalMatch> {
    nearest(candidates.iter().map(|date| (target - *date).num_days().abs()))
        .ok_or(DatasetError::NoMatchCandidates { rid })
}

/// Closest candidate visit code to `target`
///
/// An exact string match wins immediately (first occurrence on duplicates).
/// Otherwise the target and every candidate are converted to visit ordinals
/// and the smallest absolute difference wins.
///
/// # Errors
/// `NoMatchCandidates` when `candidates` is empty, `MalformedVisitCode` when
/// the fallback meets a code that has no ordinal
pub fn closest_exam_code<S: AsRef<str>>(
    rid: RosterId,
    target: &str,
    candidates: &[S],
) -> Result<TemporalMatch> {
    if candidates.is_empty() {
        return Err(DatasetError::NoMatchCandidates { rid });
    }

    if let Some(index) = candidates.iter().position(|code| code.as_ref() == target) {
        return Ok(TemporalMatch {
            index,
            distance: 0,
            exact: true,
        });
    }

    let target_ordinal = visit_ordinal(target)?;
    let distances = candidates
        .iter()
        .map(|code| visit_ordinal(code.as_ref()).map(|ordinal| (target_ordinal - ordinal).abs()))
        .collect::<Result<Vec<_>>>()?;

    let mut matched = nearest(distances).ok_or(DatasetError::NoMatchCandidates { rid })?;
    // Distinct codes can share an ordinal (`bl` and `sc`); only string
    // equality counts as exact.
    matched.exact = false;
    Ok(matched)
}

/// Position of the smallest distance, first one on ties
fn nearest<I>(distances: I) -> Option<TemporalMatch>
where
    I: IntoIterator<Item = i64>,
{
    distances
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, i64)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, distance)| TemporalMatch {
            index,
            distance,
            exact: distance == 0,
        })
}
