use std::path::Path;

use adni_dataset::algorithm::DiagnosisResolver;
use adni_dataset::algorithm::scores::PTSD_THRESHOLD;
use adni_dataset::config::DatasetConfig;
use adni_dataset::error::DatasetError;
use adni_dataset::models::{
    DodModality, DodScoreKind, DxLabel, ExamKey, HippocampusVolumes, Modality, RosterId, ScoreKind,
    ScreeningNumber,
};
use adni_dataset::{
    AssembledDataset, DodScoreAggregator, FsDiscovery, ScoreAggregator, assemble, assemble_dod,
    load_clinical_tables, load_dod_tables,
};

use crate::utils::{date, init_logging, touch, write_file};

/// Write a minimal study: three subjects, every clinical table, and an
/// FDG-PET dataset with two images
fn write_study(root: &Path) {
    let csv = root.join("ADNI_csv");
    write_file(
        &csv.join("ROSTER.csv"),
        "RID,PTID,SITEID\n2,011_S_0002,11\n3,011_S_0003,11\n,011_S_0004,11\n5,011_S_0005,11\n",
    );
    write_file(
        &csv.join("DXSUM_PDXCONV_ADNIALL.csv"),
        "Phase,RID,VISCODE,VISCODE2,EXAMDATE,DXCHANGE,DXCURREN\n\
         ADNI1,2,bl,bl,2010-01-01,,2\n\
         ADNIGO,2,m12,m12,01/01/2011,3,\n\
         ADNI1,3,bl,bl,2010-03-01,1,1\n",
    );
    write_file(
        &csv.join("PTDEMOG.csv"),
        "RID,PTGENDER,PTDOBMM,PTDOBYY\n2,1,6,1940\n3,2,,1935\n",
    );
    write_file(
        &csv.join("MMSE.csv"),
        "RID,VISCODE,VISCODE2,MMSCORE\n2,bl,bl,28\n2,m12,m12,24\n3,bl,bl,30\n",
    );
    write_file(&csv.join("CDR.csv"), "RID,CDGLOBAL\n2,-1\n2,0.5\n2,1\n");
    write_file(&csv.join("GDSCALE.csv"), "RID,GDTOTAL\n2,3\n");
    write_file(&csv.join("FAQ.csv"), "RID,FAQTOTAL\n2,9\n");
    write_file(&csv.join("NPIQ.csv"), "RID,NPISCORE\n2,4\n");
    write_file(&csv.join("ADASSCORES.csv"), "RID,TOTAL11,TOTALMOD\n3,5,8\n");
    write_file(&csv.join("ADAS_ADNIGO2.csv"), "RID,TOTSCORE,TOTAL13\n2,12,19\n");
    write_file(
        &csv.join("UWNPSYCHSUM_01_12_16.csv"),
        "RID,ADNI_MEM,ADNI_EF\n2,-0.5,0.25\n",
    );
    write_file(&csv.join("NEUROBAT.csv"), "RID,LDELTOTAL,LIMMTOTAL\n2,4,7\n");

    let csf_files = [
        "UPENNBIOMK3.csv",
        "UPENNBIOMK4_09_06_12.csv",
        "UPENNBIOMK5_10_31_13.csv",
        "UPENNBIOMK6_07_02_13.csv",
        "UPENNBIOMK7.csv",
        "UPENNBIOMK8.csv",
    ];
    write_file(
        &csv.join(csf_files[0]),
        "RID,VISCODE,ABETA,PTAU,TAU\n2,bl,140.5,40,110\n3,bl,<80,20,60\n",
    );
    for file in &csf_files[1..] {
        write_file(&csv.join(file), "RID,VISCODE,ABETA,PTAU,TAU\n3,m12,180,21,62\n");
    }

    let volumes = HippocampusVolumes::column_names().join(",");
    let values = vec!["1000"; HippocampusVolumes::column_names().len()].join(",");
    write_file(
        &csv.join("UCSFFSX51_05_20_15.csv"),
        &format!("RID,VISCODE,VISCODE2,EXAMDATE,{volumes}\n2,v06,m12,2010-12-20,{values}\n"),
    );

    let pet = root.join("ADNI_longitudinal_fdg_pet");
    write_file(&pet.join("excluded_subjects.txt"), "099\n");
    write_file(
        &pet.join("description_file.csv"),
        "Image_ID,Subject_ID,Acq_Date,Age,DX_Group,DX_Conv\n\
         I100,011_S_0002,2/1/2010,70.7,MCI,MCI-Converter\n\
         I200,011_S_0003,3/15/2010,75.0,CN,\n\
         I900,011_S_0099,3/15/2010,80.1,AD,\n",
    );
    touch(&pet, "002/pet/wrADNI_011_S_0002_PT_I100.nii");
    touch(&pet, "003/pet/wrADNI_011_S_0003_PT_I200.nii");
    touch(&pet, "099/pet/wrADNI_011_S_0099_PT_I900.nii");
}

/// Write a DoD study keyed by screening number: the battery, both CAPS
/// tables and the two image datasets, with no roster
fn write_dod_study(root: &Path) {
    let dod = root.join("ADNIDOD_csv");
    write_file(&dod.join("PTDEMOG.csv"), "SCRNO,PTAGE\n1500001,68\n1500002,71\n");
    write_file(&dod.join("MMSE.csv"), "SCRNO,MMSCORE\n1500001,29\n1500001,-1\n1500001,27\n");
    write_file(&dod.join("CDR.csv"), "SCRNO,CDGLOBAL\n1500001,0.5\n");
    write_file(&dod.join("GDSCALE.csv"), "SCRNO,GDTOTAL\n1500002,4\n");
    write_file(&dod.join("FAQ.csv"), "SCRNO,FAQTOTAL\n1500001,-4\n");
    write_file(&dod.join("NPI.csv"), "SCRNO,NPITOTAL\n1500001,6\n");
    write_file(&dod.join("ADAS.csv"), "SCRNO,TOTSCORE,TOTAL13\n1500001,9,14\n");
    write_file(&dod.join("NEUROBAT.csv"), "SCRNO,LDELTOTAL,LIMMTOTAL\n1500001,11,13\n");
    write_file(
        &dod.join("CAPSCURR.csv"),
        "SCRNO,CAPSSCORE\n1500001,50\n1500001,-4\n1500001,55\n1500002,10\n",
    );
    write_file(&dod.join("CAPSLIFE.csv"), "SCRNO,CAPSSCORE\n1500001,70\n1500002,60\n");

    let fmri = root.join("ADNIDOD_rs_fmri");
    write_file(&fmri.join("excluded_subjects.txt"), "01500009\n");
    touch(&fmri, "01500001/func/wrA.nii");
    touch(&fmri, "01500001/func/wrB.nii");
    touch(&fmri, "01500002/func/wrC.nii");
    touch(&fmri, "01500009/func/wrD.nii");

    let pet = root.join("ADNIDOD_av45_pet");
    write_file(&pet.join("excluded_subjects.txt"), "");
    touch(&pet, "01500001/pet/wrP.nii");
}

#[test]
fn test_load_clinical_tables() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    write_study(dir.path());
    let config = DatasetConfig::builder().base_dir(dir.path()).build();

    let tables = load_clinical_tables(&config).unwrap();

    // The row without a roster id is dropped
    assert_eq!(tables.roster.len(), 3);
    assert!(tables.roster.subject_to_roster("011_S_0004").is_unknown());

    let resolver = DiagnosisResolver::new(&tables.diagnosis);
    let matched = resolver
        .resolve(RosterId(2), &ExamKey::Date(date(2010, 2, 1)))
        .unwrap();
    assert_eq!(matched.label, DxLabel::Mci);
    let later = resolver.resolve(RosterId(2), &"m12".into()).unwrap();
    assert_eq!(later.exam_date(), Some(date(2011, 1, 1)));
    assert_eq!(later.label, DxLabel::Ad);

    let aggregator = ScoreAggregator::new(&tables);
    let cdr = aggregator.score(RosterId(2), ScoreKind::Cdr).unwrap();
    assert!((cdr - 0.5).abs() < f64::EPSILON);
    let adas = aggregator.score(RosterId(2), ScoreKind::Adas13).unwrap();
    assert!((adas - 19.0).abs() < f64::EPSILON);
    let memory = aggregator.score(RosterId(2), ScoreKind::NssMem).unwrap();
    assert!((memory + 0.5).abs() < f64::EPSILON);
    assert_eq!(tables.demographics.gender(RosterId(3)), 2);

    // One row from the first file, one from each of the five others
    assert_eq!(tables.measures.csf.len(), 7);
    assert_eq!(tables.measures.csf[1].abeta, None);
    assert_eq!(tables.measures.mmse.len(), 3);
    assert_eq!(tables.measures.hippocampus.len(), 1);

    assert!(tables.imaging.contains_key(&Modality::FdgPet));
    assert!(!tables.imaging.contains_key(&Modality::RsFmri));
}

#[test]
fn test_assemble_from_loaded_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_study(dir.path());
    let config = DatasetConfig::builder().base_dir(dir.path()).build();
    let tables = load_clinical_tables(&config).unwrap();

    let AssembledDataset::Pet(pet) =
        assemble(Modality::FdgPet, &config, &FsDiscovery, &tables).unwrap()
    else {
        panic!("expected a PET dataset");
    };
    assert_eq!(pet.subjects(), &["011_S_0002", "011_S_0003"]);
    assert_eq!(pet.dx_group(), &[DxLabel::Mci, DxLabel::Normal]);
    assert_eq!(pet.payload()[0].age, Some(70.7));
    assert_eq!(pet.payload()[0].dx_conv, Some(DxLabel::MciConverter));
    assert_eq!(pet.payload()[1].dx_conv, None);

    let csf = assemble(Modality::Csf, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(csf.len(), 6);

    let hippo = assemble(Modality::Hippocampus, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(hippo.dx_group(), &[DxLabel::Ad]);

    let mmse = assemble(Modality::Mmse, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(mmse.len(), 3);
}

#[test]
fn test_missing_table_column() {
    let dir = tempfile::tempdir().unwrap();
    write_study(dir.path());
    write_file(
        &dir.path().join("ADNI_csv").join("FAQ.csv"),
        "RID,FAQSOURCE\n2,1\n",
    );
    let config = DatasetConfig::builder().base_dir(dir.path()).build();

    assert!(matches!(
        load_clinical_tables(&config),
        Err(DatasetError::MissingColumn { column, .. }) if column == "FAQTOTAL"
    ));
}

#[test]
fn test_missing_base_dir() {
    let config = DatasetConfig::builder()
        .candidate_dir("/nonexistent/adni/one")
        .candidate_dir("/nonexistent/adni/two")
        .build();
    assert!(load_clinical_tables(&config).is_err());
}

#[test]
fn test_dod_ptsd_status() {
    let dir = tempfile::tempdir().unwrap();
    write_dod_study(dir.path());
    let config = DatasetConfig::builder().base_dir(dir.path()).build();
    let tables = load_dod_tables(&config).unwrap();
    let aggregator = DodScoreAggregator::new(&tables);

    // Subject directories carry leading zeros, the tables do not
    let subject = ScreeningNumber::parse("01500001").unwrap();
    let (current, lifetime) = aggregator.caps_scores(subject).unwrap();
    assert!(current >= PTSD_THRESHOLD);
    assert!((current - 50.0).abs() < f64::EPSILON);
    assert!((lifetime - 70.0).abs() < f64::EPSILON);
    assert_eq!(aggregator.ptsd(subject).unwrap(), 1);
    assert_eq!(aggregator.ptsd(ScreeningNumber(1_500_002)).unwrap(), 2);
    assert_eq!(aggregator.ptsd(ScreeningNumber(1_500_099)).unwrap(), 0);

    assert_eq!(aggregator.score(subject, DodScoreKind::Mmse).unwrap(), 27.0);
    assert_eq!(aggregator.score(subject, DodScoreKind::Faq).unwrap(), 0.0);
    assert_eq!(aggregator.score(subject, DodScoreKind::Adas13).unwrap(), 14.0);
    assert_eq!(aggregator.score(subject, DodScoreKind::Age).unwrap(), 68.0);
}

#[test]
fn test_assemble_dod_datasets() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    write_dod_study(dir.path());
    let config = DatasetConfig::builder().base_dir(dir.path()).build();
    let tables = load_dod_tables(&config).unwrap();

    let fmri = assemble_dod(DodModality::RsFmri, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(fmri.subjects(), &["01500001", "01500002"]);
    assert!(fmri.payload()[0].path.ends_with("func/wrA.nii"));
    assert_eq!(fmri.payload()[0].ptsd, Some(1));
    assert_eq!(fmri.payload()[1].ptsd, Some(2));
    assert_eq!(fmri.payload()[0].score(DodScoreKind::Ldel), 11.0);
    assert_eq!(fmri.payload()[1].score(DodScoreKind::Gdscale), 4.0);
    assert_eq!(fmri.dx_group(), &[DxLabel::None, DxLabel::None]);

    let pet = assemble_dod(DodModality::Av45Pet, &config, &FsDiscovery, &tables).unwrap();
    assert_eq!(pet.subjects(), &["01500001"]);
    assert_eq!(pet.payload()[0].ptsd, None);
    assert_eq!(pet.payload()[0].score(DodScoreKind::Npi), 6.0);
}

#[test]
fn test_dod_requires_exclusion_file() {
    let dir = tempfile::tempdir().unwrap();
    write_dod_study(dir.path());
    std::fs::remove_file(dir.path().join("ADNIDOD_av45_pet/excluded_subjects.txt")).unwrap();
    let config = DatasetConfig::builder().base_dir(dir.path()).build();
    assert!(load_dod_tables(&config).is_err());
}
