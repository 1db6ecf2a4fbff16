use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use adni_dataset::collections::{
    ClinicalTables, DescriptionTable, DiagnosisTable, ImageDescription, ImagingIndex, RosterRow,
    RosterTable, ScoreTable,
};
use adni_dataset::models::{
    Bunch, BunchRow, DiagnosisRow, DxLabel, Modality, RosterId, RosterLookup, ScoreTableId,
};

/// Initialize test logging once per process
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shorthand for a calendar date
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// A diagnosis row carrying a current-state code
#[must_use]
pub fn dx_row(rid: i64, exam_date: NaiveDate, viscode2: &str, code: i64) -> DiagnosisRow {
    DiagnosisRow::new(RosterId(rid))
        .with_exam_date(exam_date)
        .with_codes(Some(viscode2), Some(viscode2))
        .with_dx(None, Some(code))
}

/// Roster of three subjects
#[must_use]
pub fn roster() -> RosterTable {
    RosterTable::from_rows([
        RosterRow::new(2, "011_S_0002"),
        RosterRow::new(3, "011_S_0003"),
        RosterRow::new(5, "011_S_0005"),
    ])
}

/// Clinical snapshot shared by the assembly tests
///
/// Subject 2 is MCI at baseline and AD a year later, subject 3 is normal,
/// subject 5 has no diagnosis rows.
#[must_use]
pub fn clinical_tables() -> ClinicalTables {
    let diagnosis = DiagnosisTable::from_rows([
        dx_row(2, date(2010, 1, 1), "bl", 2),
        dx_row(2, date(2011, 1, 1), "m12", 3),
        dx_row(3, date(2010, 3, 1), "bl", 1),
    ]);
    let mmse = ScoreTable::from_rows(
        "MMSE",
        &["MMSCORE"],
        vec![
            (2, vec![Some(27.0)]),
            (2, vec![Some(24.0)]),
            (3, vec![Some(30.0)]),
        ],
    )
    .expect("valid score table");

    ClinicalTables::new(roster(), diagnosis).with_score_table(ScoreTableId::Mmse, mmse)
}

/// Attach an imaging index with the given descriptions; directory `099`
/// is excluded
#[must_use]
pub fn with_imaging_index(
    tables: ClinicalTables,
    modality: Modality,
    descriptions: Vec<ImageDescription>,
) -> ClinicalTables {
    let index = ImagingIndex::new(DescriptionTable::from_rows(descriptions)).with_excluded(["099"]);
    tables.with_imaging(modality, index)
}

/// Description of one image
#[must_use]
pub fn description(image_id: &str, subject_id: &str, exam_date: NaiveDate) -> ImageDescription {
    ImageDescription {
        image_id: image_id.to_string(),
        subject_id: subject_id.to_string(),
        exam_date: Some(exam_date),
        age: Some(72.5),
        dx_group: None,
        dx_conv: None,
    }
}

/// Write a file, creating parent directories
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, content).expect("write test file");
}

/// Create an empty file at `root/relative`
pub fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    write_file(&path, "");
    path
}

/// Synthetic dataset: one row per `(subject, exam_code2)` pair, payload is
/// the row index
#[must_use]
pub fn synthetic_bunch(rows: &[(&str, &str, DxLabel)]) -> Bunch<usize> {
    rows.iter()
        .enumerate()
        .map(|(idx, (subject, code, label))| BunchRow {
            subject: (*subject).to_string(),
            roster_id: RosterLookup::Unknown,
            dx_group: *label,
            exam_date: None,
            exam_code: Some((*code).to_string()),
            exam_code2: Some((*code).to_string()),
            payload: idx,
        })
        .collect()
}
