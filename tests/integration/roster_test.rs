use proptest::prelude::*;

use adni_dataset::collections::{RosterRow, RosterTable};
use adni_dataset::models::{IdentityColumn, RosterId, RosterLookup};

use crate::utils::roster;

#[test]
fn test_round_trip_for_roster_subjects() {
    let roster = roster();
    for subject in ["011_S_0002", "011_S_0003", "011_S_0005"] {
        let rid = roster.subject_to_roster(subject).known().unwrap();
        assert_eq!(roster.roster_to_subject(rid), subject);
    }
}

#[test]
fn test_misses_are_sentinels() {
    let roster = roster();
    assert_eq!(roster.subject_to_roster("999_S_9999"), RosterLookup::Unknown);
    assert_eq!(roster.roster_to_subject(RosterId(404)), "");
    assert!(roster.subject_to_roster("").is_unknown());
    assert!(RosterLookup::Unknown.require("999_S_9999").is_err());
}

#[test]
fn test_screening_number_lookup() {
    let roster = RosterTable::from_rows([RosterRow {
        rid: RosterId(61),
        ptid: None,
        scrno: Some("1500001".to_string()),
    }]);
    assert_eq!(
        roster.subject_to_roster_by("1500001", IdentityColumn::Scrno),
        RosterLookup::Known(RosterId(61))
    );
    assert!(roster.subject_to_roster("1500001").is_unknown());
}

proptest! {
    #[test]
    fn prop_roster_round_trip(ids in prop::collection::btree_set("[0-9]{3}_S_[0-9]{4}", 1..40)) {
        let table: RosterTable = ids
            .iter()
            .enumerate()
            .map(|(rid, ptid)| RosterRow::new(i64::try_from(rid).unwrap() + 1, ptid))
            .collect();

        for ptid in &ids {
            let lookup = table.subject_to_roster(ptid);
            let rid = lookup.known();
            prop_assert!(rid.is_some());
            prop_assert_eq!(table.roster_to_subject(rid.unwrap()), ptid.as_str());
        }
        prop_assert!(table.subject_to_roster("000_X_0000").is_unknown());
    }
}
