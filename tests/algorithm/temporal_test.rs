use adni_dataset::error::DatasetError;
use adni_dataset::models::RosterId;
use adni_dataset::{closest_exam_code, closest_exam_date};

use crate::utils::date;

const RID: RosterId = RosterId(2);

#[test]
fn test_date_mode_picks_closest_candidate() {
    let candidates = [date(2010, 1, 1), date(2010, 6, 1), date(2011, 1, 1)];
    let matched = closest_exam_date(RID, date(2010, 5, 1), &candidates).unwrap();

    assert_eq!(matched.index, 1);
    assert_eq!(matched.distance, 31);
    assert!(!matched.exact);
}

#[test]
fn test_date_mode_exact_and_tie() {
    let candidates = [date(2010, 1, 1), date(2010, 1, 21)];
    let exact = closest_exam_date(RID, date(2010, 1, 21), &candidates).unwrap();
    assert_eq!((exact.index, exact.distance), (1, 0));

    // Ten days either side: the first candidate wins
    let tie = closest_exam_date(RID, date(2010, 1, 11), &candidates).unwrap();
    assert_eq!((tie.index, tie.distance), (0, 10));
}

#[test]
fn test_code_mode_exact_then_ordinal() {
    let candidates = ["bl", "m06", "m12"];

    let exact = closest_exam_code(RID, "bl", &candidates).unwrap();
    assert_eq!(exact.index, 0);
    assert!(exact.exact);

    let nearest = closest_exam_code(RID, "m08", &candidates).unwrap();
    assert_eq!(nearest.index, 1);
    assert_eq!(nearest.distance, 2);
    assert!(!nearest.exact);
}

#[test]
fn test_code_mode_duplicate_codes_first_wins() {
    let candidates = ["m06", "m12", "m12"];
    let matched = closest_exam_code(RID, "m12", &candidates).unwrap();
    assert_eq!(matched.index, 1);
}

#[test]
fn test_empty_candidates() {
    let dates: [chrono::NaiveDate; 0] = [];
    assert!(matches!(
        closest_exam_date(RID, date(2010, 1, 1), &dates),
        Err(DatasetError::NoMatchCandidates { rid }) if rid == RID
    ));

    let codes: [&str; 0] = [];
    assert!(matches!(
        closest_exam_code(RID, "bl", &codes),
        Err(DatasetError::NoMatchCandidates { .. })
    ));
}

#[test]
fn test_malformed_code_is_fatal() {
    let candidates = ["bl", "m06"];
    assert!(matches!(
        closest_exam_code(RID, "month8", &candidates),
        Err(DatasetError::MalformedVisitCode(code)) if code == "month8"
    ));
    assert!(matches!(
        closest_exam_code(RID, "m08", &["bl", "??"]),
        Err(DatasetError::MalformedVisitCode(_))
    ));
}
