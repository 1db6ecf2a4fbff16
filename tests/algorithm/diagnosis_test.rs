use adni_dataset::algorithm::DiagnosisResolver;
use adni_dataset::collections::DiagnosisTable;
use adni_dataset::error::DatasetError;
use adni_dataset::models::{DiagnosisRow, DxLabel, ExamKey, RosterId};

use crate::utils::{clinical_tables, date, dx_row, init_logging};

#[test]
fn test_resolves_visit_in_effect() {
    init_logging();
    let table = DiagnosisTable::from_rows([
        dx_row(7, date(2010, 1, 1), "bl", 2),
        dx_row(7, date(2011, 1, 1), "m12", 3),
    ]);
    let resolver = DiagnosisResolver::new(&table);

    let early = resolver
        .resolve(RosterId(7), &ExamKey::Date(date(2010, 2, 1)))
        .unwrap();
    assert_eq!(early.code, 2);
    assert_eq!(early.label, DxLabel::Mci);
    assert_eq!(early.label.to_string(), "MCI");

    let late = resolver.resolve(RosterId(7), &"m12".into()).unwrap();
    assert_eq!(late.label, DxLabel::Ad);
    assert_eq!(late.exam_date(), Some(date(2011, 1, 1)));
}

#[test]
fn test_change_code_wins_when_larger() {
    let table = DiagnosisTable::from_rows([DiagnosisRow::new(RosterId(8))
        .with_exam_date(date(2012, 6, 1))
        .with_codes(Some("m24"), Some("m24"))
        .with_dx(Some(4), Some(1))]);
    let matched = DiagnosisResolver::new(&table)
        .resolve(RosterId(8), &ExamKey::Date(date(2012, 1, 1)))
        .unwrap();
    assert_eq!(matched.label, DxLabel::NormalToMci);
}

#[test]
fn test_exam_key_requires_exactly_one_part() {
    assert!(matches!(
        ExamKey::from_parts(Some(date(2010, 1, 1)), Some("bl")),
        Err(DatasetError::AmbiguousExamKey(_))
    ));
    assert!(matches!(
        ExamKey::from_parts(None, None),
        Err(DatasetError::AmbiguousExamKey(_))
    ));
    assert_eq!(
        ExamKey::from_parts(None, Some("m06")).unwrap(),
        ExamKey::Code("m06".to_string())
    );
}

#[test]
fn test_subject_without_rows_is_sentinel() {
    let tables = clinical_tables();
    let resolver = DiagnosisResolver::new(&tables.diagnosis);
    let rid = tables.roster.subject_to_roster("011_S_0005").known().unwrap();

    let matched = resolver.resolve(rid, &ExamKey::Date(date(2010, 1, 1))).unwrap();
    assert_eq!(matched.code, -4);
    assert_eq!(matched.label, DxLabel::None);
    assert!(matched.row.is_none());
}
