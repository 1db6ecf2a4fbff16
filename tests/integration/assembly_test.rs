use std::path::Path;

use adni_dataset::algorithm::assembly::{assemble_csf, assemble_func, assemble_mmse};
use adni_dataset::collections::{ClinicalTables, CsfRow, MeasureTables, MmseVisitRow};
use adni_dataset::config::{DatasetConfig, DxSource, LongitudinalConfig};
use adni_dataset::error::DatasetError;
use adni_dataset::models::{DxLabel, Modality, RosterId, RosterLookup};
use adni_dataset::{AssembledDataset, FsDiscovery, assemble, group};

use crate::utils::{clinical_tables, date, description, init_logging, touch, with_imaging_index};

const PET_ROOT: &str = "ADNI_longitudinal_fdg_pet";
const FMRI_ROOT: &str = "ADNI_longitudinal_rs_fmri";

/// PET tree: two images of subject 2, one of subject 3, one without a
/// description, one of a subject missing from the roster and one in an
/// excluded directory
fn pet_tree(root: &Path) {
    touch(root, &format!("{PET_ROOT}/002/pet/wrADNI_011_S_0002_PT_I100.nii"));
    touch(root, &format!("{PET_ROOT}/002/pet/wrADNI_011_S_0002_PT_I101.nii"));
    touch(root, &format!("{PET_ROOT}/002/pet/mean_I100.nii"));
    touch(root, &format!("{PET_ROOT}/003/pet/wrADNI_011_S_0003_PT_I200.nii"));
    touch(root, &format!("{PET_ROOT}/004/pet/wrADNI_011_S_0004_PT_I300.nii"));
    touch(root, &format!("{PET_ROOT}/005/pet/wrADNI_999_S_9999_PT_I400.nii"));
    touch(root, &format!("{PET_ROOT}/099/pet/wrADNI_011_S_0099_PT_I900.nii"));
    touch(root, &format!("{PET_ROOT}/description_file.csv"));
}

/// fMRI tree: one series each for subjects 2 and 5
fn fmri_tree(root: &Path) {
    for id in ["I500", "I600"] {
        touch(root, &format!("{FMRI_ROOT}/{id}/func/wr{id}.nii"));
        touch(root, &format!("{FMRI_ROOT}/{id}/func/rp_{id}.txt"));
    }
}

fn imaging_tables() -> ClinicalTables {
    let tables = with_imaging_index(
        clinical_tables(),
        Modality::FdgPet,
        vec![
            description("I100", "011_S_0002", date(2010, 2, 1)),
            description("I101", "011_S_0002", date(2010, 12, 1)),
            description("I200", "011_S_0003", date(2010, 3, 15)),
            description("I400", "999_S_9999", date(2010, 3, 15)),
            description("I900", "011_S_0099", date(2010, 3, 15)),
        ],
    );
    with_imaging_index(
        tables,
        Modality::RsFmri,
        vec![
            description("I500", "011_S_0002", date(2010, 1, 5)),
            description("I600", "011_S_0005", date(2010, 1, 5)),
        ],
    )
}

fn config(root: &Path) -> DatasetConfig {
    DatasetConfig::builder().base_dir(root).build()
}

#[test]
fn test_assemble_pet() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    pet_tree(dir.path());
    let tables = imaging_tables();

    let dataset = assemble(Modality::FdgPet, &config(dir.path()), &FsDiscovery, &tables).unwrap();
    let AssembledDataset::Pet(pet) = dataset else {
        panic!("expected a PET dataset");
    };

    assert_eq!(pet.len(), 4);
    assert_eq!(
        pet.subjects(),
        &["011_S_0002", "011_S_0002", "011_S_0003", "999_S_9999"]
    );
    assert_eq!(
        pet.dx_group(),
        &[DxLabel::Mci, DxLabel::Ad, DxLabel::Normal, DxLabel::None]
    );
    assert_eq!(pet.exam_dates()[1], Some(date(2011, 1, 1)));
    assert_eq!(pet.exam_codes2()[0].as_deref(), Some("bl"));
    assert_eq!(pet.roster_ids()[0], RosterLookup::Known(RosterId(2)));
    assert!(pet.roster_ids()[3].is_unknown());
    assert_eq!(pet.exam_dates()[3], None);

    let ids: Vec<&str> = pet.payload().iter().map(|scan| scan.image_id.as_str()).collect();
    assert_eq!(ids, ["I100", "I101", "I200", "I400"]);
    assert!(pet.payload().iter().all(|scan| scan.age == Some(72.5)));
}

#[test]
fn test_pet_longitudinal_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    pet_tree(dir.path());
    let tables = imaging_tables();
    let pet = adni_dataset::algorithm::assembly::assemble_pet(
        Modality::FdgPet,
        &config(dir.path()),
        &FsDiscovery,
        &tables,
    )
    .unwrap();

    let grouped = group(&pet, &LongitudinalConfig::new(1, 10)).unwrap();
    assert_eq!(grouped.len(), 3);
    assert_eq!(grouped.baseline().unwrap().len(), grouped.len());

    let longitudinal = group(&pet, &LongitudinalConfig::new(2, 10)).unwrap();
    assert_eq!(longitudinal.subjects(), vec!["011_S_0002"]);
}

#[test]
fn test_description_labels() {
    let dir = tempfile::tempdir().unwrap();
    pet_tree(dir.path());
    let mut tables = imaging_tables();
    if let Some(index) = tables.imaging.get_mut(&Modality::FdgPet) {
        let mut described = description("I200", "011_S_0003", date(2010, 3, 15));
        described.dx_group = Some(DxLabel::Smc);
        index.description = [described].into_iter().collect();
    }
    let config = DatasetConfig::builder()
        .base_dir(dir.path())
        .image_dx_source(DxSource::Description)
        .build();

    let dataset = assemble(Modality::FdgPet, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.dx_group(), &[DxLabel::Smc]);
}

#[test]
fn test_missing_pet_image_is_error() {
    let dir = tempfile::tempdir().unwrap();
    pet_tree(dir.path());
    std::fs::create_dir_all(dir.path().join(PET_ROOT).join("006/pet")).unwrap();

    let result = assemble(
        Modality::FdgPet,
        &config(dir.path()),
        &FsDiscovery,
        &imaging_tables(),
    );
    assert!(matches!(result, Err(DatasetError::MissingRequiredFile { .. })));
}

#[test]
fn test_assemble_func_and_petmr() {
    let dir = tempfile::tempdir().unwrap();
    pet_tree(dir.path());
    fmri_tree(dir.path());
    let tables = imaging_tables();
    let config = config(dir.path());

    let func = assemble_func(Modality::RsFmri, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(func.len(), 2);
    assert_eq!(func.subjects(), &["011_S_0002", "011_S_0005"]);
    assert_eq!(func.dx_group(), &[DxLabel::Mci, DxLabel::None]);
    assert!(func.payload()[0].motion.ends_with("func/rp_I500.txt"));

    let AssembledDataset::PetMr(petmr) =
        assemble(Modality::PetMr, &config, &FsDiscovery, &tables).unwrap()
    else {
        panic!("expected a PET/MR dataset");
    };
    assert_eq!(petmr.subjects(), &["011_S_0002"]);
    assert!(petmr.payload()[0].pet.ends_with("wrADNI_011_S_0002_PT_I100.nii"));
    assert!(petmr.payload()[0].func.ends_with("func/wrI500.nii"));
}

#[test]
fn test_func_requires_motion_file() {
    let dir = tempfile::tempdir().unwrap();
    fmri_tree(dir.path());
    std::fs::remove_file(dir.path().join(FMRI_ROOT).join("I600/func/rp_I600.txt")).unwrap();

    let result = assemble_func(
        Modality::RsFmri,
        &config(dir.path()),
        &FsDiscovery,
        &imaging_tables(),
    );
    assert!(matches!(
        result,
        Err(DatasetError::MissingRequiredFile { pattern, .. }) if pattern == "func/rp_*.txt"
    ));
}

#[test]
fn test_measure_datasets() {
    let tables = clinical_tables().with_measures(MeasureTables {
        csf: vec![
            CsfRow {
                rid: RosterId(2),
                viscode: Some("bl".to_string()),
                abeta: Some(140.0),
                ptau: Some(40.0),
                tau: Some(110.0),
            },
            CsfRow {
                rid: RosterId(3),
                viscode: Some("bl".to_string()),
                abeta: None,
                ptau: Some(20.0),
                tau: Some(60.0),
            },
            CsfRow {
                rid: RosterId(7),
                viscode: Some("m12".to_string()),
                abeta: Some(200.0),
                ptau: Some(20.0),
                tau: Some(60.0),
            },
        ],
        hippocampus: Vec::new(),
        mmse: vec![
            MmseVisitRow {
                rid: RosterId(2),
                viscode: Some("v06".to_string()),
                viscode2: Some("m12".to_string()),
                score: Some(24.0),
            },
            MmseVisitRow {
                rid: RosterId(3),
                viscode: None,
                viscode2: Some("bl".to_string()),
                score: None,
            },
        ],
    });
    let config = DatasetConfig::new();

    let csf = assemble_csf(&config, &tables).unwrap();
    assert_eq!(csf.len(), 2);
    assert_eq!(csf.dx_group(), &[DxLabel::Mci, DxLabel::None]);
    // Roster id 7 is not on the roster: the subject id stays empty
    assert_eq!(csf.subjects(), &["011_S_0002", ""]);
    assert!((csf.payload()[0].tau() - 110.0).abs() < f64::EPSILON);

    let mmse = assemble_mmse(&config, &tables).unwrap();
    assert_eq!(mmse.len(), 1);
    assert_eq!(mmse.dx_group(), &[DxLabel::Ad]);
    assert_eq!(mmse.exam_codes()[0].as_deref(), Some("v06"));
}
