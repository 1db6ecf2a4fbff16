use adni_dataset::config::{BaselinePolicy, LongitudinalConfig};
use adni_dataset::error::DatasetError;
use adni_dataset::models::DxLabel;
use adni_dataset::{extract_baseline, extract_unique, group};

use crate::utils::{init_logging, synthetic_bunch};

fn sample() -> adni_dataset::Bunch<usize> {
    synthetic_bunch(&[
        ("011_S_0002", "bl", DxLabel::Mci),
        ("011_S_0003", "sc", DxLabel::Normal),
        ("011_S_0002", "m06", DxLabel::Mci),
        ("011_S_0003", "bl", DxLabel::Normal),
        ("011_S_0002", "m12", DxLabel::Ad),
        ("011_S_0002", "m24", DxLabel::Ad),
    ])
}

#[test]
fn test_window_drops_subjects_entirely() {
    init_logging();
    let data = sample();
    let grouped = group(&data, &LongitudinalConfig::new(3, 5)).unwrap();

    assert_eq!(grouped.len(), 1);
    let retained = &grouped.groups()[0];
    assert_eq!(retained.subject, "011_S_0002");
    assert_eq!(retained.rows.as_slice(), &[0, 2, 4, 5]);
    assert_eq!(retained.baseline_row(), 0);
    assert!(!grouped.flat_rows().contains(&1));
}

#[test]
fn test_baseline_round_trip_count() {
    let data = sample();
    let grouped = group(&data, &LongitudinalConfig::new(1, 10)).unwrap();
    let baseline = grouped.baseline().unwrap();

    assert_eq!(baseline.len(), grouped.len());
    assert_eq!(baseline.unique_subjects().len(), baseline.len());
    assert_eq!(grouped.flatten().unwrap().len(), data.len());
}

#[test]
fn test_baseline_visit_code_policy() {
    let data = sample();
    let config = LongitudinalConfig::new(2, 2).with_baseline_policy(BaselinePolicy::BaselineVisitCode);
    let grouped = group(&data, &config).unwrap();

    // Subject 3 has an `sc` visit first, which is a baseline code
    let subject = &grouped.groups()[0];
    assert_eq!(subject.subject, "011_S_0003");
    assert_eq!(subject.baseline_row(), 1);
}

#[test]
fn test_sequences_follow_source_order() {
    let data = sample();
    let grouped = group(&data, &LongitudinalConfig::new(1, 10)).unwrap();
    let sequences = grouped.sequences();

    assert_eq!(sequences.len(), 2);
    assert_eq!(sequences[0].subject, "011_S_0002");
    assert_eq!(sequences[0].payloads, vec![&0, &2, &4, &5]);
    assert_eq!(
        sequences[0].dx_group,
        vec![DxLabel::Mci, DxLabel::Mci, DxLabel::Ad, DxLabel::Ad]
    );
}

#[test]
fn test_invalid_window() {
    let data = sample();
    assert!(matches!(
        group(&data, &LongitudinalConfig::new(4, 2)),
        Err(DatasetError::InvalidWindow { min: 4, max: 2 })
    ));
}

#[test]
fn test_extract_baseline_and_unique() {
    let data = sample();

    let baseline = extract_baseline(&data).unwrap();
    // `sc` rows first, then `bl` rows
    assert_eq!(baseline.payload(), &[1, 0, 3]);

    let unique = extract_unique(&data).unwrap();
    assert_eq!(unique.subjects(), &["011_S_0002", "011_S_0003"]);
    assert_eq!(unique.payload(), &[0, 1]);
}
