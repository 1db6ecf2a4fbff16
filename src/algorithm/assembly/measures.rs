//! Datasets built from measurement tables (CSF, hippocampus, MMSE)
//!
//! Rows come straight from the tables; the subject id is recovered from the
//! roster and stays empty when the roster has no entry.

use crate::algorithm::assembly::{resolved_row, resolver};
use crate::algorithm::diagnosis::DiagnosisMatch;
use crate::collections::ClinicalTables;
use crate::config::DatasetConfig;
use crate::error::Result;
use crate::models::{
    Bunch, BunchRow, CsfBiomarkers, ExamKey, HippocampusVolumes, MmseScore, RosterId,
    RosterLookup,
};
use crate::utils::logging::{create_record_progress_bar, finish_progress_bar};

/// Diagnosis at a visit code, or the sentinel when the row has none
fn resolve_code<'a>(
    tables: &'a ClinicalTables,
    rid: RosterId,
    code: Option<&str>,
) -> Result<DiagnosisMatch<'a>> {
    code.map_or_else(
        || Ok(DiagnosisMatch::none()),
        |code| resolver(tables).resolve(rid, &ExamKey::from(code)),
    )
}

/// Assemble CSF biomarker measures
///
/// Only rows with all three biomarkers are kept. The diagnosis is resolved
/// by visit code; the row's own code fills both code columns.
pub fn assemble_csf(config: &DatasetConfig, tables: &ClinicalTables) -> Result<Bunch<CsfBiomarkers>> {
    let rows = &tables.measures.csf;
    let pb = create_record_progress_bar(rows.len() as u64, "Assembling csf", config.show_progress);

    let mut bunch = Bunch::with_capacity(rows.len());
    for row in rows {
        pb.inc(1);
        let Some(measures) = row.measures() else {
            continue;
        };
        let matched = resolve_code(tables, row.rid, row.viscode.as_deref())?;
        bunch.push(BunchRow {
            subject: tables.roster.roster_to_subject(row.rid).to_string(),
            roster_id: RosterLookup::Known(row.rid),
            dx_group: matched.label,
            exam_date: None,
            exam_code: row.viscode.clone(),
            exam_code2: row.viscode.clone(),
            payload: CsfBiomarkers(measures),
        });
    }

    finish_progress_bar(&pb, &format!("{} csf measures", bunch.len()));
    Ok(bunch)
}

/// Assemble hippocampal subfield volumes
///
/// Rows with every volume missing are dropped. The diagnosis is resolved at
/// the row's exam date; exam date and visit codes are the row's own.
pub fn assemble_hippocampus(
    config: &DatasetConfig,
    tables: &ClinicalTables,
) -> Result<Bunch<HippocampusVolumes>> {
    let rows = &tables.measures.hippocampus;
    let pb = create_record_progress_bar(rows.len() as u64, "Assembling hippo", config.show_progress);

    let mut bunch = Bunch::with_capacity(rows.len());
    for row in rows {
        pb.inc(1);
        if !row.has_any_volume() {
            continue;
        }
        let matched = match row.exam_date {
            Some(date) => resolver(tables).resolve(row.rid, &ExamKey::Date(date))?,
            None => DiagnosisMatch::none(),
        };
        bunch.push(BunchRow {
            subject: tables.roster.roster_to_subject(row.rid).to_string(),
            roster_id: RosterLookup::Known(row.rid),
            dx_group: matched.label,
            exam_date: row.exam_date,
            exam_code: row.viscode.clone(),
            exam_code2: row.viscode2.clone(),
            payload: HippocampusVolumes(row.volumes),
        });
    }

    finish_progress_bar(&pb, &format!("{} hippocampus measures", bunch.len()));
    Ok(bunch)
}

/// Assemble longitudinal MMSE scores
///
/// Rows without a score are dropped. The diagnosis is resolved by the
/// ADNI-GO/2 visit code, the only code reliably filled for GO/2 visits.
pub fn assemble_mmse(config: &DatasetConfig, tables: &ClinicalTables) -> Result<Bunch<MmseScore>> {
    let rows = &tables.measures.mmse;
    let pb = create_record_progress_bar(rows.len() as u64, "Assembling mmse", config.show_progress);

    let mut bunch = Bunch::with_capacity(rows.len());
    for row in rows {
        pb.inc(1);
        let Some(score) = row.score else {
            continue;
        };
        let matched = resolve_code(tables, row.rid, row.viscode2.as_deref())?;
        let mut resolved = resolved_row(
            tables.roster.roster_to_subject(row.rid).to_string(),
            RosterLookup::Known(row.rid),
            &matched,
            MmseScore(score),
        );
        resolved.exam_date = None;
        resolved.exam_code = row.viscode.clone();
        resolved.exam_code2 = row.viscode2.clone();
        bunch.push(resolved);
    }

    finish_progress_bar(&pb, &format!("{} mmse scores", bunch.len()));
    Ok(bunch)
}
