use adni_dataset::algorithm::scores::{EMPTY_SCORE, aggregate, nearest_rank_median, ptsd_status};
use adni_dataset::collections::{
    ClinicalTables, DemographicRow, DemographicsTable, DiagnosisTable, ScoreTable,
};
use adni_dataset::error::DatasetError;
use adni_dataset::models::{RosterId, ScoreKind, ScoreTableId, ValidityRule};
use adni_dataset::utils::io::clinical::battery_columns;
use adni_dataset::ScoreAggregator;

use crate::utils::{date, roster};

#[test]
fn test_aggregate_drops_invalid_and_takes_median() {
    let table = ScoreTable::from_rows(
        "CDR",
        &["CDGLOBAL"],
        vec![
            (1, vec![Some(-1.0)]),
            (1, vec![None]),
            (1, vec![Some(5.0)]),
            (1, vec![Some(7.0)]),
            (1, vec![Some(9.0)]),
            (2, vec![Some(-4.0)]),
            (2, vec![None]),
        ],
    )
    .unwrap();

    let median = aggregate(RosterId(1), &table, "CDGLOBAL", ValidityRule::NonNegative).unwrap();
    assert!((median - 7.0).abs() < f64::EPSILON);

    let empty = aggregate(RosterId(2), &table, "CDGLOBAL", ValidityRule::NonNegative).unwrap();
    assert!((empty - EMPTY_SCORE).abs() < f64::EPSILON);

    let absent = aggregate(RosterId(3), &table, "CDGLOBAL", ValidityRule::NonNegative).unwrap();
    assert!((absent - EMPTY_SCORE).abs() < f64::EPSILON);

    assert!(matches!(
        aggregate(RosterId(1), &table, "MMSCORE", ValidityRule::NonNegative),
        Err(DatasetError::MissingColumn { .. })
    ));
}

#[test]
fn test_nearest_rank_median_returns_observed_value() {
    let mut even = vec![4.0, 1.0, 3.0, 2.0];
    let median = nearest_rank_median(&mut even).unwrap();
    assert!(even.contains(&median));

    let mut odd = vec![9.0, 5.0, 7.0];
    assert_eq!(nearest_rank_median(&mut odd), Some(7.0));
    assert_eq!(nearest_rank_median(&mut []), None);
}

#[test]
fn test_ptsd_status() {
    assert_eq!(ptsd_status(50.0, 60.0, 45.0), 1);
    assert_eq!(ptsd_status(10.0, 60.0, 45.0), 2);
    assert_eq!(ptsd_status(10.0, 20.0, 45.0), 0);
}

/// Battery tables where every column of subject 2 holds one value, except
/// ADNI1 ADAS which only has subject 3
fn battery_tables() -> ClinicalTables {
    let mut tables = ClinicalTables::new(roster(), DiagnosisTable::new()).with_demographics(
        DemographicsTable::from_rows([DemographicRow {
            rid: RosterId(2),
            dob_year: Some(1940),
            dob_month: Some(6),
            gender: Some(2),
        }]),
    );

    for id in ScoreTableId::BATTERY {
        let columns = battery_columns(id);
        let rid = if id == ScoreTableId::Adas1 { 3 } else { 2 };
        let rows = vec![(rid, vec![Some(12.0); columns.len()])];
        let table = ScoreTable::from_rows(&format!("{id:?}"), &columns, rows).unwrap();
        tables = tables.with_score_table(id, table);
    }
    tables
}

#[test]
fn test_battery_uses_fallback_table() {
    let tables = battery_tables();
    let aggregator = ScoreAggregator::new(&tables);

    let battery = aggregator.battery(RosterId(2)).unwrap();
    assert!(battery.iter().all(|s| (s - 12.0).abs() < f64::EPSILON));

    // Subject 3 has ADNI1 ADAS only
    let adas = aggregator.score(RosterId(3), ScoreKind::Adas11).unwrap();
    assert!((adas - 12.0).abs() < f64::EPSILON);
    let mmse = aggregator.score(RosterId(3), ScoreKind::Mmse).unwrap();
    assert!((mmse - EMPTY_SCORE).abs() < f64::EPSILON);
}

#[test]
fn test_profiles_align_with_subjects() {
    let tables = battery_tables();
    let aggregator = ScoreAggregator::new(&tables);
    let subjects = ["011_S_0002", "999_S_9999"];
    let exam_dates = [date(2010, 6, 1), date(2010, 6, 1)];

    let profiles = aggregator.profiles(&subjects, Some(&exam_dates[..])).unwrap();
    assert_eq!(profiles.len(), 2);

    let known = &profiles[0];
    assert_eq!(known.date_of_birth, date(1940, 6, 1));
    assert_eq!(known.gender, 2);
    assert!(known.age.is_some_and(|age| (age - 70.05).abs() < 0.02));
    assert!((known.score(ScoreKind::Faq) - 12.0).abs() < f64::EPSILON);

    let unknown = &profiles[1];
    assert!(unknown.roster_id.is_unknown());
    assert_eq!(unknown.gender, -1);
    assert!(unknown.scores.iter().all(|s| s.abs() < f64::EPSILON));

    assert!(matches!(
        aggregator.profiles(&subjects, Some(&exam_dates[..1])),
        Err(DatasetError::LengthMismatch { .. })
    ));
}
