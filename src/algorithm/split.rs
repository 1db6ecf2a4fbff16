//! Subject-aware train/test splitting
//!
//! Splits are drawn over distinct subjects and expanded back to acquisition
//! rows, so a subject's acquisitions always land on one side only. The
//! stratified variant balances the subject-level diagnosis labels.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use rand::prelude::*;
use rand::seq::SliceRandom;

use crate::config::SplitConfig;
use crate::error::{DatasetError, Result};
use crate::models::bunch::SubjectRows;
use crate::models::{Bunch, DxLabel};

/// Labels scored +1 by [`binary_targets`] unless told otherwise
pub const DEFAULT_POSITIVE_LABELS: [DxLabel; 2] = [DxLabel::Ad, DxLabel::MciToAd];

/// Diagnosis group used to restrict a dataset before splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DxGroup {
    /// AD
    Ad,
    /// MCI, EMCI and LMCI
    Mci,
    /// Early MCI
    Emci,
    /// Late MCI
    Lmci,
    /// Cognitively normal
    Normal,
    /// MCI converters
    MciConverter,
    /// Normal to MCI conversions
    NormalToMci,
    /// Everything MCI or normal
    AdRest,
    /// Everything AD or normal
    MciRest,
    /// Everything AD or MCI
    NormalRest,
}

impl DxGroup {
    /// Member groups, in stacking order
    const fn parts(self) -> &'static [Self] {
        match self {
            Self::AdRest => &[Self::Mci, Self::Normal],
            Self::MciRest => &[Self::Ad, Self::Normal],
            Self::NormalRest => &[Self::Ad, Self::Mci],
            Self::Ad => &[Self::Ad],
            Self::Mci => &[Self::Mci],
            Self::Emci => &[Self::Emci],
            Self::Lmci => &[Self::Lmci],
            Self::Normal => &[Self::Normal],
            Self::MciConverter => &[Self::MciConverter],
            Self::NormalToMci => &[Self::NormalToMci],
        }
    }

    /// Labels of a plain (non-composite) group, in stacking order
    const fn labels(self) -> &'static [DxLabel] {
        match self {
            Self::Ad => &[DxLabel::Ad],
            Self::Mci => &[DxLabel::Mci, DxLabel::Emci, DxLabel::Lmci],
            Self::Emci => &[DxLabel::Emci],
            Self::Lmci => &[DxLabel::Lmci],
            Self::Normal => &[DxLabel::Normal],
            Self::MciConverter => &[DxLabel::MciConverter],
            Self::NormalToMci => &[DxLabel::NormalToMci],
            Self::AdRest | Self::MciRest | Self::NormalRest => &[],
        }
    }

    /// Whether a label belongs to the group
    #[must_use]
    pub fn contains(self, label: DxLabel) -> bool {
        self.parts()
            .iter()
            .any(|part| part.labels().contains(&label))
    }

    /// Name of the group
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ad => "AD",
            Self::Mci => "MCI",
            Self::Emci => "EMCI",
            Self::Lmci => "LMCI",
            Self::Normal => "Normal",
            Self::MciConverter => "MCI-Converter",
            Self::NormalToMci => "Normal->MCI",
            Self::AdRest => "AD-rest",
            Self::MciRest => "MCI-rest",
            Self::NormalRest => "Normal-rest",
        }
    }

    /// Row positions of the group, stacked label by label
    ///
    /// `MCI` lists plain MCI rows first, then EMCI, then LMCI. Composite
    /// groups stack their parts in order.
    #[must_use]
    pub fn indices<P>(self, bunch: &Bunch<P>) -> Vec<usize> {
        self.parts()
            .iter()
            .flat_map(|part| part.labels())
            .flat_map(|label| {
                bunch
                    .dx_group()
                    .iter()
                    .enumerate()
                    .filter(move |(_, dx)| *dx == label)
                    .map(|(idx, _)| idx)
            })
            .collect()
    }
}

impl fmt::Display for DxGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DxGroup {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "AD" => Ok(Self::Ad),
            "MCI" => Ok(Self::Mci),
            "EMCI" => Ok(Self::Emci),
            "LMCI" => Ok(Self::Lmci),
            "Normal" => Ok(Self::Normal),
            "MCI-Converter" => Ok(Self::MciConverter),
            "Normal->MCI" => Ok(Self::NormalToMci),
            "AD-rest" => Ok(Self::AdRest),
            "MCI-rest" => Ok(Self::MciRest),
            "Normal-rest" => Ok(Self::NormalRest),
            other => Err(DatasetError::UnknownDiagnosisLabel(other.to_string())),
        }
    }
}

/// Row positions of several groups, stacked in the given order
#[must_use]
pub fn select_groups<P>(bunch: &Bunch<P>, groups: &[DxGroup]) -> Vec<usize> {
    groups.iter().flat_map(|g| g.indices(bunch)).collect()
}

/// +1 for labels in `positive`, -1 for all others
#[must_use]
pub fn binary_targets(labels: &[DxLabel], positive: &[DxLabel]) -> Vec<i8> {
    labels
        .iter()
        .map(|label| if positive.contains(label) { 1 } else { -1 })
        .collect()
}

/// Rows of a two-group classification problem with their targets
///
/// Rows of `positive` come first and are scored +1, rows of `negative`
/// follow and are scored -1.
#[must_use]
pub fn classification_rows<P>(
    bunch: &Bunch<P>,
    positive: DxGroup,
    negative: DxGroup,
) -> (Vec<usize>, Vec<i8>) {
    let pos = positive.indices(bunch);
    let neg = negative.indices(bunch);
    let targets = std::iter::repeat_n(1, pos.len())
        .chain(std::iter::repeat_n(-1, neg.len()))
        .collect();
    let mut rows = pos;
    rows.extend(neg);
    (rows, targets)
}

/// One train/test partition, as row positions of the input dataset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubjectSplit {
    /// Training rows, ascending
    pub train: Vec<usize>,
    /// Test rows, ascending
    pub test: Vec<usize>,
}

/// Repeated subject-level shuffle split
#[derive(Debug, Clone)]
pub struct SubjectShuffleSplit {
    config: SplitConfig,
    groups: Vec<DxGroup>,
    stratified: bool,
}

/// Distinct subjects of the selected rows with their representative label
struct SubjectTable<'a> {
    subjects: Vec<(&'a str, SubjectRows)>,
    labels: Vec<DxLabel>,
}

impl SubjectShuffleSplit {
    /// Plain subject split over the whole dataset
    #[must_use]
    pub const fn new(config: SplitConfig) -> Self {
        Self {
            config,
            groups: Vec::new(),
            stratified: false,
        }
    }

    /// Subject split stratified on each subject's diagnosis label
    #[must_use]
    pub const fn stratified(config: SplitConfig) -> Self {
        Self {
            config,
            groups: Vec::new(),
            stratified: true,
        }
    }

    /// Restrict the split to the rows of the given groups
    #[must_use]
    pub fn with_groups(mut self, groups: &[DxGroup]) -> Self {
        self.groups = groups.to_vec();
        self
    }

    /// Split configuration
    #[must_use]
    pub const fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Draw `n_iter` partitions of the dataset
    ///
    /// # Errors
    /// `InvalidSplit` when the test fraction leaves one side empty, or when
    /// a stratum has fewer than two subjects.
    pub fn split<P>(&self, bunch: &Bunch<P>) -> Result<Vec<SubjectSplit>> {
        let table = self.subject_table(bunch);
        let n_subjects = table.subjects.len();
        let n_test = self.config.test_count(n_subjects)?;

        let strata = if self.stratified {
            Some(allocate_strata(&table.labels, n_test)?)
        } else {
            None
        };

        let mut rng = match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(
            "Drawing {} {}splits over {} subjects ({} test)",
            self.config.n_iter,
            if self.stratified { "stratified " } else { "" },
            n_subjects,
            n_test
        );

        let mut splits = Vec::with_capacity(self.config.n_iter);
        for _ in 0..self.config.n_iter {
            let mut is_test = vec![false; n_subjects];
            match &strata {
                Some(strata) => {
                    for (members, count) in strata {
                        let mut members = members.clone();
                        members.shuffle(&mut rng);
                        for &member in &members[..*count] {
                            is_test[member] = true;
                        }
                    }
                }
                None => {
                    let mut order: Vec<usize> = (0..n_subjects).collect();
                    order.shuffle(&mut rng);
                    for &member in &order[..n_test] {
                        is_test[member] = true;
                    }
                }
            }
            splits.push(self.expand(&table, &is_test));
        }
        Ok(splits)
    }

    fn subject_table<'a, P>(&self, bunch: &'a Bunch<P>) -> SubjectTable<'a> {
        let mut rows: Vec<usize> = if self.groups.is_empty() {
            (0..bunch.len()).collect()
        } else {
            select_groups(bunch, &self.groups)
        };
        rows.sort_unstable();
        rows.dedup();

        let mut by_subject: BTreeMap<&str, SubjectRows> = BTreeMap::new();
        for idx in rows {
            let subject = bunch.subjects()[idx].as_str();
            if subject.is_empty() {
                debug!("Row {idx} has no subject id, left out of the split");
                continue;
            }
            by_subject.entry(subject).or_default().push(idx);
        }

        let subjects: Vec<(&str, SubjectRows)> = by_subject.into_iter().collect();
        let labels = subjects
            .iter()
            .map(|(_, rows)| bunch.dx_group()[rows[0]])
            .collect();
        SubjectTable { subjects, labels }
    }

    fn expand(&self, table: &SubjectTable<'_>, is_test: &[bool]) -> SubjectSplit {
        let mut split = SubjectSplit::default();
        for ((_, rows), &test) in table.subjects.iter().zip(is_test) {
            if !test {
                split.train.extend(rows.iter().copied());
            } else if self.config.single_test_acquisition {
                split.test.push(rows[0]);
            } else {
                split.test.extend(rows.iter().copied());
            }
        }
        split.train.sort_unstable();
        split.test.sort_unstable();
        split
    }
}

/// Subjects of each label with the number of them drawn for test
///
/// Shares follow the label proportions (largest remainder), then each
/// stratum is clamped so both sides keep at least one of its subjects.
fn allocate_strata(labels: &[DxLabel], n_test: usize) -> Result<Vec<(Vec<usize>, usize)>> {
    let mut members: BTreeMap<DxLabel, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        members.entry(*label).or_default().push(idx);
    }

    if let Some((label, _)) = members.iter().find(|(_, m)| m.len() < 2) {
        return Err(DatasetError::InvalidSplit(format!(
            "stratum {label} has a single subject"
        )));
    }

    let n_total = labels.len();
    let mut counts: Vec<usize> = Vec::with_capacity(members.len());
    let mut remainders: Vec<(usize, usize)> = Vec::with_capacity(members.len());
    for (pos, stratum) in members.values().enumerate() {
        let share = n_test * stratum.len();
        counts.push(share / n_total);
        remainders.push((share % n_total, pos));
    }

    let mut left = n_test.saturating_sub(counts.iter().sum());
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, pos) in &remainders {
        if left == 0 {
            break;
        }
        counts[pos] += 1;
        left -= 1;
    }

    Ok(members
        .into_values()
        .zip(counts)
        .map(|(stratum, count)| {
            let count = count.clamp(1, stratum.len() - 1);
            (stratum, count)
        })
        .collect())
}
