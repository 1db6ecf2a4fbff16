//! DoD sub-study image datasets (rs-fMRI, AV45-PET)
//!
//! Subject directories are named by screening number (`0*`). The first image
//! of each directory is kept and carries the subject's DoD battery; rs-fMRI
//! subjects also carry their PTSD status. The sub-study has no roster or
//! diagnosis table, so rows hold an unknown roster id and no exam timing.

use std::path::PathBuf;

use crate::algorithm::assembly::images::dir_name;
use crate::algorithm::scores::DodScoreAggregator;
use crate::collections::DodTables;
use crate::common::traits::FileDiscovery;
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::models::{Bunch, BunchRow, DodModality, DodScan, DxLabel, RosterLookup, ScreeningNumber};
use crate::utils::logging::{create_record_progress_bar, finish_progress_bar};

/// Assemble a DoD image dataset
///
/// Every non-excluded subject directory must hold an image matching the
/// layout's pattern, and its name must be a screening number.
pub fn assemble_dod<D: FileDiscovery + ?Sized>(
    modality: DodModality,
    config: &DatasetConfig,
    discovery: &D,
    tables: &DodTables,
) -> Result<Bunch<DodScan>> {
    let layout = config.dod_image_layout(modality);
    let root = config.dod_image_root(modality)?;
    if !tables.imaging.contains_key(&modality) {
        return Err(DatasetError::MissingRequiredFile {
            dir: root,
            pattern: config.exclusion_file.clone(),
        });
    }

    let dirs: Vec<PathBuf> = discovery
        .subject_dirs(&root, &layout.subject_pattern)?
        .into_iter()
        .filter(|dir| {
            let excluded = tables.is_excluded(modality, &dir_name(dir));
            if excluded {
                log::debug!("Skipping excluded directory {}", dir.display());
            }
            !excluded
        })
        .collect();

    let scores = DodScoreAggregator::new(tables);
    let pb = create_record_progress_bar(
        dirs.len() as u64,
        &format!("Assembling {modality}"),
        config.show_progress,
    );

    let mut bunch = Bunch::new();
    for dir in &dirs {
        pb.inc(1);
        let subject = dir_name(dir);
        let screening_number = ScreeningNumber::parse(&subject)?;
        let path = discovery.require_first(dir, &layout.image_pattern)?;
        let ptsd = if modality.has_ptsd_status() {
            Some(scores.ptsd(screening_number)?)
        } else {
            None
        };

        bunch.push(BunchRow {
            subject,
            roster_id: RosterLookup::Unknown,
            dx_group: DxLabel::None,
            exam_date: None,
            exam_code: None,
            exam_code2: None,
            payload: DodScan {
                path,
                screening_number,
                scores: scores.battery(screening_number)?,
                ptsd,
            },
        });
    }

    finish_progress_bar(&pb, &format!("{} {modality} subjects", bunch.len()));
    Ok(bunch)
}
