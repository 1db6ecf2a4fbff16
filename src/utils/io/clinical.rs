//! Clinical table loaders
//!
//! Each loader reads one table, projects the columns the linkage needs and
//! builds the matching collection. Rows without a roster id are dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;

use crate::collections::{
    ClinicalTables, CsfRow, DemographicRow, DemographicsTable, DescriptionTable, DiagnosisTable,
    DodScoreTable, DodTables, HippocampusRow, ImageDescription, ImagingIndex, MeasureTables,
    MmseVisitRow, RosterRow, RosterTable, ScoreTable,
};
use crate::algorithm::scores::CAPS_SCORE_COLUMN;
use crate::config::{DatasetConfig, DateFormatConfig};
use crate::error::Result;
use crate::models::{
    DiagnosisRow, DodModality, DodScoreKind, DxLabel, HIPPOCAMPUS_COLUMNS, HippocampusVolumes,
    Modality, RosterId, ScoreKind, ScoreTableId,
};
use crate::utils::io::tables::{
    ColumnSpec, ColumnType, date_values, decode_rows, drop_null_rows, float_values, int_values,
    project, read_table, read_tables_parallel, text_values,
};
use crate::utils::logging::{log_operation_complete, log_warning};

const RID: &str = "RID";
const SCRNO: &str = "SCRNO";

/// Date columns tried, in order, in image description files
pub const DESCRIPTION_DATE_COLUMNS: [&str; 4] = ["Exam_Date", "EXAM_DATE", "Study_Date", "Acq_Date"];

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read a table and project it, dropping rows without a roster id
fn read_keyed(path: &Path, columns: &[ColumnSpec]) -> Result<RecordBatch> {
    project_keyed(&read_table(path)?, &table_name(path), columns)
}

fn project_keyed(batch: &RecordBatch, table: &str, columns: &[ColumnSpec]) -> Result<RecordBatch> {
    project_keyed_by(batch, table, RID, columns)
}

fn project_keyed_by(
    batch: &RecordBatch,
    table: &str,
    key: &str,
    columns: &[ColumnSpec],
) -> Result<RecordBatch> {
    let mut specs = Vec::with_capacity(columns.len() + 1);
    specs.push(ColumnSpec::required(key, ColumnType::Int));
    specs.extend(columns.iter().cloned());
    drop_null_rows(&project(batch, table, &specs)?, key)
}

fn key_values<K: From<i64>>(batch: &RecordBatch, key: &str) -> Result<Vec<K>> {
    Ok(int_values(batch, key)?
        .into_iter()
        .map(|value| K::from(value.unwrap_or_default()))
        .collect())
}

fn roster_ids(batch: &RecordBatch) -> Result<Vec<RosterId>> {
    key_values(batch, RID)
}

/// Load the subject roster
pub fn load_roster(path: &Path) -> Result<RosterTable> {
    let batch = read_keyed(
        path,
        &[
            ColumnSpec::optional("PTID", ColumnType::Text),
            ColumnSpec::optional("SCRNO", ColumnType::Text),
        ],
    )?;
    let rows: Vec<RosterRow> = decode_rows(&batch)?;
    Ok(RosterTable::from_rows(rows))
}

/// Load the demographics table
pub fn load_demographics(path: &Path) -> Result<DemographicsTable> {
    let batch = read_keyed(
        path,
        &[
            ColumnSpec::optional("PTDOBYY", ColumnType::Int),
            ColumnSpec::optional("PTDOBMM", ColumnType::Int),
            ColumnSpec::optional("PTGENDER", ColumnType::Int),
        ],
    )?;
    let rows: Vec<DemographicRow> = decode_rows(&batch)?;
    Ok(DemographicsTable::from_rows(rows))
}

/// Load the diagnosis summary
pub fn load_diagnosis(path: &Path, formats: &DateFormatConfig) -> Result<DiagnosisTable> {
    let batch = read_keyed(
        path,
        &[
            ColumnSpec::optional("EXAMDATE", ColumnType::Text),
            ColumnSpec::optional("VISCODE", ColumnType::Text),
            ColumnSpec::optional("VISCODE2", ColumnType::Text),
            ColumnSpec::optional("DXCHANGE", ColumnType::Int),
            ColumnSpec::optional("DXCURREN", ColumnType::Int),
        ],
    )?;

    let rids = roster_ids(&batch)?;
    let dates = date_values(&batch, "EXAMDATE", formats)?;
    let viscodes = text_values(&batch, "VISCODE")?;
    let viscodes2 = text_values(&batch, "VISCODE2")?;
    let changes = int_values(&batch, "DXCHANGE")?;
    let currents = int_values(&batch, "DXCURREN")?;

    let rows = rids
        .into_iter()
        .zip(dates)
        .zip(viscodes.into_iter().zip(viscodes2))
        .zip(changes.into_iter().zip(currents))
        .map(
            |(((rid, exam_date), (viscode, viscode2)), (dx_change, dx_current))| DiagnosisRow {
                rid,
                exam_date,
                viscode,
                viscode2,
                dx_change,
                dx_current,
            },
        );
    Ok(DiagnosisTable::from_rows(rows))
}

/// Value columns of a battery table: every primary or fallback column of a
/// score read from it
#[must_use]
pub fn battery_columns(id: ScoreTableId) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = ScoreKind::ALL
        .iter()
        .flat_map(|kind| {
            let source = kind.source();
            std::iter::once(source.primary).chain(source.fallback)
        })
        .filter(|column| column.table == id)
        .map(|column| column.column)
        .collect();
    columns.dedup();
    columns
}

/// Load a score table with the given value columns
pub fn load_score_table(path: &Path, columns: &[&str]) -> Result<ScoreTable> {
    let specs: Vec<ColumnSpec> = columns
        .iter()
        .map(|c| ColumnSpec::required(*c, ColumnType::Float))
        .collect();
    let batch = read_keyed(path, &specs)?;

    let values = columns
        .iter()
        .map(|c| Ok(((*c).to_string(), float_values(&batch, c)?)))
        .collect::<Result<Vec<_>>>()?;
    ScoreTable::from_columns(&table_name(path), roster_ids(&batch)?, values)
}

/// Load a DoD score table keyed by screening number
///
/// Rows without a `SCRNO` are dropped. No roster is involved.
pub fn load_dod_score_table(path: &Path, columns: &[&str]) -> Result<DodScoreTable> {
    let specs: Vec<ColumnSpec> = columns
        .iter()
        .map(|c| ColumnSpec::required(*c, ColumnType::Float))
        .collect();
    let batch = project_keyed_by(&read_table(path)?, &table_name(path), SCRNO, &specs)?;

    let values = columns
        .iter()
        .map(|c| Ok(((*c).to_string(), float_values(&batch, c)?)))
        .collect::<Result<Vec<_>>>()?;
    DodScoreTable::from_columns(&table_name(path), key_values(&batch, SCRNO)?, values)
}

fn dod_columns(id: ScoreTableId) -> Vec<&'static str> {
    match id {
        ScoreTableId::CapsCurrent | ScoreTableId::CapsLifetime => vec![CAPS_SCORE_COLUMN],
        other => DodScoreKind::columns_of(other),
    }
}

fn battery_file(config: &DatasetConfig, id: ScoreTableId) -> Option<&str> {
    let files = &config.files;
    let name = match id {
        ScoreTableId::Mmse => &files.mmse,
        ScoreTableId::Cdr => &files.cdr,
        ScoreTableId::Gdscale => &files.gdscale,
        ScoreTableId::Faq => &files.faq,
        ScoreTableId::Npiq => &files.npiq,
        ScoreTableId::Adas1 => &files.adas1,
        ScoreTableId::Adas2 => &files.adas2,
        ScoreTableId::Neurobat => &files.neurobat,
        ScoreTableId::Nss => &files.nss,
        ScoreTableId::Demographics | ScoreTableId::CapsCurrent | ScoreTableId::CapsLifetime => {
            return None;
        }
    };
    Some(name)
}

/// Load every table of the score battery, in parallel
pub fn load_battery(config: &DatasetConfig) -> Result<BTreeMap<ScoreTableId, ScoreTable>> {
    let csv_dir = config.csv_path()?;
    ScoreTableId::BATTERY
        .par_iter()
        .filter_map(|&id| battery_file(config, id).map(|file| (id, csv_dir.join(file))))
        .map(|(id, path)| -> Result<(ScoreTableId, ScoreTable)> {
            Ok((id, load_score_table(&path, &battery_columns(id))?))
        })
        .collect()
}

/// Load and concatenate the CSF biomarker series
///
/// The files are read in parallel and concatenated in the given order.
/// Unparseable measures (e.g. `<80`) become missing values.
pub fn load_csf(paths: &[PathBuf]) -> Result<Vec<CsfRow>> {
    let batches = read_tables_parallel(paths)?;
    let mut rows = Vec::new();
    for (batch, path) in batches.iter().zip(paths) {
        let batch = project_keyed(
            batch,
            &table_name(path),
            &[
                ColumnSpec::optional("VISCODE", ColumnType::Text),
                ColumnSpec::required("ABETA", ColumnType::Float),
                ColumnSpec::required("PTAU", ColumnType::Float),
                ColumnSpec::required("TAU", ColumnType::Float),
            ],
        )?;
        let rids = roster_ids(&batch)?;
        let viscodes = text_values(&batch, "VISCODE")?;
        let abeta = float_values(&batch, "ABETA")?;
        let ptau = float_values(&batch, "PTAU")?;
        let tau = float_values(&batch, "TAU")?;

        for (idx, (rid, viscode)) in rids.into_iter().zip(viscodes).enumerate() {
            rows.push(CsfRow {
                rid,
                viscode,
                abeta: abeta[idx],
                ptau: ptau[idx],
                tau: tau[idx],
            });
        }
    }
    Ok(rows)
}

/// Load the FreeSurfer hippocampal volume table
pub fn load_hippocampus(path: &Path, formats: &DateFormatConfig) -> Result<Vec<HippocampusRow>> {
    let volume_columns = HippocampusVolumes::column_names();
    let mut specs = vec![
        ColumnSpec::optional("EXAMDATE", ColumnType::Text),
        ColumnSpec::optional("VISCODE", ColumnType::Text),
        ColumnSpec::optional("VISCODE2", ColumnType::Text),
    ];
    specs.extend(
        volume_columns
            .iter()
            .map(|c| ColumnSpec::required(c.as_str(), ColumnType::Float)),
    );
    let batch = read_keyed(path, &specs)?;

    let rids = roster_ids(&batch)?;
    let dates = date_values(&batch, "EXAMDATE", formats)?;
    let viscodes = text_values(&batch, "VISCODE")?;
    let viscodes2 = text_values(&batch, "VISCODE2")?;
    let volumes = volume_columns
        .iter()
        .map(|c| float_values(&batch, c))
        .collect::<Result<Vec<_>>>()?;

    Ok(rids
        .into_iter()
        .zip(dates)
        .zip(viscodes.into_iter().zip(viscodes2))
        .enumerate()
        .map(|(idx, ((rid, exam_date), (viscode, viscode2)))| {
            let mut row_volumes = [None; HIPPOCAMPUS_COLUMNS];
            for (slot, column) in row_volumes.iter_mut().zip(&volumes) {
                *slot = column[idx];
            }
            HippocampusRow {
                rid,
                exam_date,
                viscode,
                viscode2,
                volumes: row_volumes,
            }
        })
        .collect())
}

/// Load the per-visit MMSE rows
pub fn load_mmse_visits(path: &Path) -> Result<Vec<MmseVisitRow>> {
    let batch = read_keyed(
        path,
        &[
            ColumnSpec::optional("VISCODE", ColumnType::Text),
            ColumnSpec::optional("VISCODE2", ColumnType::Text),
            ColumnSpec::required("MMSCORE", ColumnType::Float),
        ],
    )?;

    let rids = roster_ids(&batch)?;
    let viscodes = text_values(&batch, "VISCODE")?;
    let viscodes2 = text_values(&batch, "VISCODE2")?;
    let scores = float_values(&batch, "MMSCORE")?;

    Ok(rids
        .into_iter()
        .zip(viscodes)
        .zip(viscodes2)
        .zip(scores)
        .map(|(((rid, viscode), viscode2), score)| MmseVisitRow {
            rid,
            viscode,
            viscode2,
            score,
        })
        .collect())
}

/// Load the subject directory names listed in an exclusion file
///
/// Names are whitespace-separated; an empty file excludes nothing.
pub fn load_exclusions(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Exclusion file not found: {}", path.display()))?;
    Ok(content.split_whitespace().map(str::to_string).collect())
}

/// Load an image description file
pub fn load_description(path: &Path, formats: &DateFormatConfig) -> Result<DescriptionTable> {
    let batch = read_table(path)?;
    let date_column = DESCRIPTION_DATE_COLUMNS
        .iter()
        .find(|c| batch.schema().index_of(c).is_ok())
        .copied()
        .unwrap_or(DESCRIPTION_DATE_COLUMNS[0]);

    let batch = project(
        &batch,
        &table_name(path),
        &[
            ColumnSpec::required("Image_ID", ColumnType::Text),
            ColumnSpec::required("Subject_ID", ColumnType::Text),
            ColumnSpec::optional(date_column, ColumnType::Text),
            ColumnSpec::optional("Age", ColumnType::Float),
            ColumnSpec::optional("DX_Group", ColumnType::Text),
            ColumnSpec::optional("DX_Conv", ColumnType::Text),
        ],
    )?;
    let batch = drop_null_rows(&batch, "Image_ID")?;

    let image_ids = text_values(&batch, "Image_ID")?;
    let subject_ids = text_values(&batch, "Subject_ID")?;
    let dates = date_values(&batch, date_column, formats)?;
    let ages = float_values(&batch, "Age")?;
    let groups = text_values(&batch, "DX_Group")?;
    let conversions = text_values(&batch, "DX_Conv")?;

    let rows = image_ids
        .into_iter()
        .zip(subject_ids)
        .zip(dates.into_iter().zip(ages))
        .zip(groups.into_iter().zip(conversions))
        .filter_map(|(((image_id, subject_id), (exam_date, age)), (group, conversion))| {
            Some(ImageDescription {
                image_id: image_id?,
                subject_id: subject_id.unwrap_or_default(),
                exam_date,
                age,
                dx_group: group.and_then(|g| g.parse::<DxLabel>().ok()),
                dx_conv: conversion.and_then(|c| c.parse::<DxLabel>().ok()),
            })
        });
    Ok(DescriptionTable::from_rows(rows))
}

/// Load the description and exclusions of an image dataset root
pub fn load_imaging_index(root: &Path, config: &DatasetConfig) -> Result<ImagingIndex> {
    let (exclusion_path, description_path) = config.image_metadata_paths(root);
    let excluded = load_exclusions(&exclusion_path)?;
    let description = load_description(&description_path, &config.date_formats)?;
    Ok(ImagingIndex::new(description).with_excluded(excluded))
}

/// Load every clinical table of the main study
///
/// Image dataset indexes are loaded for the image roots that exist; a
/// missing root only means that modality cannot be assembled.
pub fn load_clinical_tables(config: &DatasetConfig) -> Result<ClinicalTables> {
    let start = Instant::now();
    let csv_dir = config.csv_path()?;
    let files = &config.files;
    let formats = &config.date_formats;

    let roster = load_roster(&csv_dir.join(&files.roster))?;
    let diagnosis = load_diagnosis(&csv_dir.join(&files.diagnosis), formats)?;
    let demographics = load_demographics(&csv_dir.join(&files.demographics))?;
    let scores = load_battery(config)?;

    let csf_paths: Vec<PathBuf> = files.csf.iter().map(|f| csv_dir.join(f)).collect();
    let measures = MeasureTables {
        csf: load_csf(&csf_paths)?,
        hippocampus: load_hippocampus(&csv_dir.join(&files.hippocampus), formats)?,
        mmse: load_mmse_visits(&csv_dir.join(&files.mmse))?,
    };

    let mut tables = ClinicalTables::new(roster, diagnosis)
        .with_demographics(demographics)
        .with_measures(measures);
    tables.scores = scores;

    for modality in [
        Modality::FdgPet,
        Modality::Av45Pet,
        Modality::RsFmri,
        Modality::RsFmriDartel,
    ] {
        let root = config.image_root(modality)?;
        if root.is_dir() {
            tables = tables.with_imaging(modality, load_imaging_index(&root, config)?);
        } else {
            log_warning(&format!("No {modality} image directory"), Some(&root));
        }
    }

    log_operation_complete(
        "loaded",
        &csv_dir.display(),
        tables.roster.len(),
        Some(start.elapsed()),
    );
    Ok(tables)
}

/// Load the DoD sub-study score tables and image exclusions
///
/// Score tables are read in parallel and keyed by screening number. Each DoD
/// image root that exists must carry an exclusion file.
pub fn load_dod_tables(config: &DatasetConfig) -> Result<DodTables> {
    let start = Instant::now();
    let dod_dir = config.dod_csv_path()?;
    let files = &config.dod_files;

    let ids: Vec<ScoreTableId> = DodScoreKind::TABLES
        .into_iter()
        .chain([ScoreTableId::CapsCurrent, ScoreTableId::CapsLifetime])
        .collect();
    let scores = ids
        .par_iter()
        .filter_map(|&id| files.score_file(id).map(|file| (id, dod_dir.join(file))))
        .map(|(id, path)| -> Result<(ScoreTableId, DodScoreTable)> {
            Ok((id, load_dod_score_table(&path, &dod_columns(id))?))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let mut tables = DodTables::new();
    tables.scores = scores;

    for modality in DodModality::ALL {
        let root = config.dod_image_root(modality)?;
        if root.is_dir() {
            let (exclusion_path, _) = config.image_metadata_paths(&root);
            let excluded = load_exclusions(&exclusion_path)?;
            tables = tables.with_imaging(
                modality,
                ImagingIndex::new(DescriptionTable::default()).with_excluded(excluded),
            );
        } else {
            log_warning(&format!("No {modality} image directory"), Some(&root));
        }
    }

    log_operation_complete(
        "loaded",
        &dod_dir.display(),
        tables.scores.len(),
        Some(start.elapsed()),
    );
    Ok(tables)
}
