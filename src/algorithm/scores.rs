//! Score aggregation and subject profiles
//!
//! Every score of the clinical battery reduces the same way: keep the
//! subject's non-null observations that pass the score's validity rule and
//! take their nearest-rank median. A subject without any valid observation
//! gets 0.0. That default cannot be told apart from a real zero score; the
//! tables carry no information that would resolve this.

use std::hash::Hash;

use chrono::NaiveDate;

use crate::collections::{ClinicalTables, DodScoreTable, DodTables, KeyedScoreTable, ScoreTable};
use crate::error::{DatasetError, Result};
use crate::models::{
    DOD_BATTERY_SIZE, DodScoreKind, RosterId, RosterLookup, ScoreColumn, ScoreKind, ScoreTableId,
    ScreeningNumber, ValidityRule,
};

/// Score reported for subjects without valid observations
pub const EMPTY_SCORE: f64 = 0.0;

/// CAPS total at or above which PTSD is considered present
pub const PTSD_THRESHOLD: f64 = 45.0;

/// Number of scores in a battery profile
pub const BATTERY_SIZE: usize = ScoreKind::ALL.len();

/// CAPS score column of the DoD sub-study tables
pub const CAPS_SCORE_COLUMN: &str = "CAPSSCORE";

/// Median that always returns an observed value
///
/// Sorts the values and picks rank `(n - 1) / 2`, rounding half ranks to
/// the even neighbour. `None` for an empty slice.
#[must_use]
pub fn nearest_rank_median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let rank = (0.5 * (values.len() - 1) as f64).round_ties_even() as usize;
    values.get(rank).copied()
}

/// Reduce one subject's observations in one score column
///
/// # Arguments
/// * `key` - Subject, by roster id or screening number
/// * `table` - Score table holding the column
/// * `column` - Value column
/// * `rule` - Validity rule applied to each non-null observation
///
/// # Returns
/// The nearest-rank median of the valid observations, or 0.0
pub fn aggregate<K: Copy + Eq + Hash>(
    key: K,
    table: &KeyedScoreTable<K>,
    column: &str,
    rule: ValidityRule,
) -> Result<f64> {
    let observations = table.values_for(key, column)?;
    Ok(reduce(observations, rule))
}

fn reduce(observations: Vec<f64>, rule: ValidityRule) -> f64 {
    let mut valid: Vec<f64> = observations
        .into_iter()
        .filter_map(|value| rule.apply(value))
        .collect();
    nearest_rank_median(&mut valid).unwrap_or(EMPTY_SCORE)
}

/// PTSD status from current and lifetime CAPS totals
///
/// 1 when both reach the threshold, 2 when only the lifetime score does
/// (past PTSD), 0 otherwise.
#[must_use]
pub fn ptsd_status(current: f64, lifetime: f64, threshold: f64) -> u8 {
    match (current >= threshold, lifetime >= threshold) {
        (true, true) => 1,
        (false, true) => 2,
        _ => 0,
    }
}

/// Demographics and battery scores of one subject
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectProfile {
    /// Public subject id
    pub subject: String,
    /// Roster lookup of the subject
    pub roster_id: RosterLookup,
    /// Date of birth (day fixed to 1), 1900-01-01 when unknown
    pub date_of_birth: NaiveDate,
    /// Gender code, -1 when unknown
    pub gender: i64,
    /// Age in years at the exam date, when one was given
    pub age: Option<f64>,
    /// Battery scores in [`ScoreKind::ALL`] order
    pub scores: [f64; BATTERY_SIZE],
}

impl SubjectProfile {
    /// Value of one score
    #[must_use]
    pub fn score(&self, kind: ScoreKind) -> f64 {
        ScoreKind::ALL
            .iter()
            .position(|k| *k == kind)
            .map_or(EMPTY_SCORE, |idx| self.scores[idx])
    }
}

/// Age in years between two dates, rounded to two decimals
#[must_use]
pub fn age_at(date_of_birth: NaiveDate, exam_date: NaiveDate) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let years = (exam_date - date_of_birth).num_days().abs() as f64 / 365.0;
    (years * 100.0).round() / 100.0
}

/// Score lookups over a clinical table snapshot
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator<'a> {
    tables: &'a ClinicalTables,
}

impl<'a> ScoreAggregator<'a> {
    /// Create an aggregator
    #[must_use]
    pub const fn new(tables: &'a ClinicalTables) -> Self {
        Self { tables }
    }

    fn table(&self, column: ScoreColumn) -> Result<&'a ScoreTable> {
        self.tables
            .score_table(column.table)
            .ok_or_else(|| DatasetError::MissingColumn {
                table: format!("{:?}", column.table),
                column: column.column.to_string(),
            })
    }

    /// Representative value of one battery score
    ///
    /// The fallback column is consulted when the primary column holds no
    /// non-null observation for the subject.
    pub fn score(&self, rid: RosterId, kind: ScoreKind) -> Result<f64> {
        let source = kind.source();
        let mut observations = self
            .table(source.primary)?
            .values_for(rid, source.primary.column)?;

        if observations.is_empty() {
            if let Some(fallback) = source.fallback {
                observations = self.table(fallback)?.values_for(rid, fallback.column)?;
            }
        }

        Ok(reduce(observations, kind.validity()))
    }

    /// Every battery score of a subject, in [`ScoreKind::ALL`] order
    pub fn battery(&self, rid: RosterId) -> Result<[f64; BATTERY_SIZE]> {
        let mut scores = [EMPTY_SCORE; BATTERY_SIZE];
        for (slot, kind) in scores.iter_mut().zip(ScoreKind::ALL) {
            *slot = self.score(rid, kind)?;
        }
        Ok(scores)
    }

    /// Profiles of subjects, aligned with the input
    ///
    /// Subjects missing from the roster get default demographics and empty
    /// scores. When `exam_dates` is given it must be as long as `subjects`.
    pub fn profiles<S: AsRef<str>>(
        &self,
        subjects: &[S],
        exam_dates: Option<&[NaiveDate]>,
    ) -> Result<Vec<SubjectProfile>> {
        if let Some(dates) = exam_dates {
            if dates.len() != subjects.len() {
                return Err(DatasetError::LengthMismatch {
                    column: "exam_dates",
                    expected: subjects.len(),
                    actual: dates.len(),
                });
            }
        }

        let demographics = &self.tables.demographics;
        subjects
            .iter()
            .enumerate()
            .map(|(idx, subject)| {
                let subject = subject.as_ref();
                let roster_id = self.tables.roster.subject_to_roster(subject);
                let (date_of_birth, gender, scores) = match roster_id {
                    RosterLookup::Known(rid) => (
                        demographics.date_of_birth(rid),
                        demographics.gender(rid),
                        self.battery(rid)?,
                    ),
                    RosterLookup::Unknown => {
                        log::debug!("Subject {subject} not on roster, using default profile");
                        (
                            crate::collections::demographics::default_date_of_birth(),
                            crate::collections::demographics::UNKNOWN_GENDER,
                            [EMPTY_SCORE; BATTERY_SIZE],
                        )
                    }
                };
                let age = exam_dates.map(|dates| age_at(date_of_birth, dates[idx]));

                Ok(SubjectProfile {
                    subject: subject.to_string(),
                    roster_id,
                    date_of_birth,
                    gender,
                    age,
                    scores,
                })
            })
            .collect()
    }
}

/// Score lookups over the DoD sub-study tables
///
/// Subjects are screening numbers. Every DoD score drops negative entries
/// to 0 before taking the median.
#[derive(Debug, Clone, Copy)]
pub struct DodScoreAggregator<'a> {
    tables: &'a DodTables,
}

impl<'a> DodScoreAggregator<'a> {
    /// Create an aggregator
    #[must_use]
    pub const fn new(tables: &'a DodTables) -> Self {
        Self { tables }
    }

    fn table(&self, id: ScoreTableId, column: &str) -> Result<&'a DodScoreTable> {
        self.tables
            .score_table(id)
            .ok_or_else(|| DatasetError::MissingColumn {
                table: format!("{id:?}"),
                column: column.to_string(),
            })
    }

    /// Representative value of one DoD battery score
    pub fn score(&self, subject: ScreeningNumber, kind: DodScoreKind) -> Result<f64> {
        let column = kind.column();
        aggregate(
            subject,
            self.table(column.table, column.column)?,
            column.column,
            kind.validity(),
        )
    }

    /// Every DoD battery score of a subject, in [`DodScoreKind::ALL`] order
    pub fn battery(&self, subject: ScreeningNumber) -> Result<[f64; DOD_BATTERY_SIZE]> {
        let mut scores = [EMPTY_SCORE; DOD_BATTERY_SIZE];
        for (slot, kind) in scores.iter_mut().zip(DodScoreKind::ALL) {
            *slot = self.score(subject, kind)?;
        }
        Ok(scores)
    }

    /// Median current and lifetime CAPS totals of a subject
    pub fn caps_scores(&self, subject: ScreeningNumber) -> Result<(f64, f64)> {
        let rule = ValidityRule::ClampNegative;
        let current = self.table(ScoreTableId::CapsCurrent, CAPS_SCORE_COLUMN)?;
        let lifetime = self.table(ScoreTableId::CapsLifetime, CAPS_SCORE_COLUMN)?;
        Ok((
            aggregate(subject, current, CAPS_SCORE_COLUMN, rule)?,
            aggregate(subject, lifetime, CAPS_SCORE_COLUMN, rule)?,
        ))
    }

    /// PTSD status of a subject (see [`ptsd_status`])
    pub fn ptsd(&self, subject: ScreeningNumber) -> Result<u8> {
        let (current, lifetime) = self.caps_scores(subject)?;
        Ok(ptsd_status(current, lifetime, PTSD_THRESHOLD))
    }
}
