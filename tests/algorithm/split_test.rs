use std::collections::BTreeSet;

use proptest::prelude::*;

use adni_dataset::algorithm::split::DEFAULT_POSITIVE_LABELS;
use adni_dataset::config::SplitConfig;
use adni_dataset::error::DatasetError;
use adni_dataset::models::{Bunch, BunchRow, DxLabel, RosterLookup};
use adni_dataset::{DxGroup, SubjectShuffleSplit, binary_targets};

use crate::utils::synthetic_bunch;

fn subjects_of<'a>(data: &'a Bunch<usize>, rows: &[usize]) -> BTreeSet<&'a str> {
    rows.iter().map(|&r| data.subjects()[r].as_str()).collect()
}

/// `counts[i]` acquisitions for subject `i`, labels cycling through AD,
/// MCI and normal
fn dataset(counts: &[usize]) -> Bunch<usize> {
    let labels = [DxLabel::Ad, DxLabel::Mci, DxLabel::Normal];
    let mut bunch = Bunch::new();
    for (subject, &count) in counts.iter().enumerate() {
        for visit in 0..count {
            bunch.push(BunchRow {
                subject: format!("S{subject:03}"),
                roster_id: RosterLookup::Unknown,
                dx_group: labels[subject % labels.len()],
                exam_date: None,
                exam_code: None,
                exam_code2: Some(format!("m{:02}", visit * 6)),
                payload: bunch.len(),
            });
        }
    }
    bunch
}

proptest! {
    #[test]
    fn prop_split_partitions_subjects(
        counts in prop::collection::vec(1usize..5, 4..30),
        seed in any::<u64>(),
        test_size in 0.1f64..0.5,
    ) {
        let data = dataset(&counts);
        let config = SplitConfig::builder()
            .n_iter(5)
            .test_size(test_size)
            .random_seed(seed)
            .build();
        let splits = SubjectShuffleSplit::new(config).split(&data).unwrap();
        let all: BTreeSet<&str> = data.subjects().iter().map(String::as_str).collect();

        prop_assert_eq!(splits.len(), 5);
        for split in &splits {
            let train = subjects_of(&data, &split.train);
            let test = subjects_of(&data, &split.test);
            prop_assert!(train.is_disjoint(&test));
            let union: BTreeSet<&str> = train.union(&test).copied().collect();
            prop_assert_eq!(&union, &all);
            prop_assert_eq!(split.train.len() + split.test.len(), data.len());
        }
    }

    #[test]
    fn prop_stratified_split_keeps_every_class_on_both_sides(
        per_class in 2usize..8,
        seed in any::<u64>(),
    ) {
        let data = dataset(&vec![2; per_class * 3]);
        let config = SplitConfig::builder()
            .n_iter(3)
            .test_size(0.3)
            .random_seed(seed)
            .build();
        let splits = SubjectShuffleSplit::stratified(config).split(&data).unwrap();

        for split in &splits {
            for side in [&split.train, &split.test] {
                let labels: BTreeSet<DxLabel> = side.iter().map(|&r| data.dx_group()[r]).collect();
                prop_assert_eq!(labels.len(), 3);
            }
        }
    }
}

#[test]
fn test_seeded_split_is_reproducible() {
    let data = dataset(&[2, 3, 1, 4, 2, 2, 1, 3]);
    let config = SplitConfig::builder().n_iter(4).random_seed(7).build();
    let first = SubjectShuffleSplit::new(config.clone()).split(&data).unwrap();
    let second = SubjectShuffleSplit::new(config).split(&data).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_groups_restrict_rows() {
    let data = dataset(&[2, 2, 2, 2, 2, 2]);
    let config = SplitConfig::builder().n_iter(3).test_size(0.5).build();
    let splits = SubjectShuffleSplit::new(config)
        .with_groups(&[DxGroup::Ad, DxGroup::Normal])
        .split(&data)
        .unwrap();

    for split in splits {
        let labels: BTreeSet<DxLabel> = split
            .train
            .iter()
            .chain(&split.test)
            .map(|&r| data.dx_group()[r])
            .collect();
        assert!(!labels.contains(&DxLabel::Mci));
        assert_eq!(split.train.len() + split.test.len(), 8);
    }
}

#[test]
fn test_too_few_subjects() {
    let data = synthetic_bunch(&[("011_S_0002", "bl", DxLabel::Ad)]);
    assert!(matches!(
        SubjectShuffleSplit::new(SplitConfig::default()).split(&data),
        Err(DatasetError::InvalidSplit(_))
    ));
}

#[test]
fn test_group_names_and_targets() {
    assert_eq!("AD-rest".parse::<DxGroup>().unwrap(), DxGroup::AdRest);
    assert!(DxGroup::Mci.contains(DxLabel::Lmci));
    assert!(!DxGroup::Mci.contains(DxLabel::Ad));

    let labels = [DxLabel::Ad, DxLabel::Normal, DxLabel::MciToAd, DxLabel::Mci];
    assert_eq!(binary_targets(&labels, &DEFAULT_POSITIVE_LABELS), vec![1, -1, 1, -1]);
}
