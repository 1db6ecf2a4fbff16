//! Longitudinal image datasets (FDG-PET, AV45-PET, rs-fMRI)
//!
//! Image files are found through the discovery collaborator. Each image id
//! is joined with the dataset's description file, which names the subject
//! and the acquisition date; the diagnosis and the exam timing come from
//! the diagnosis table row closest to that date.

use std::path::{Path, PathBuf};

use crate::algorithm::assembly::{resolved_row, resolver};
use crate::algorithm::diagnosis::DiagnosisMatch;
use crate::collections::{ClinicalTables, ImageDescription, ImagingIndex};
use crate::common::traits::FileDiscovery;
use crate::config::{DatasetConfig, DxSource, ImageLayout};
use crate::error::{DatasetError, Result};
use crate::models::{Bunch, BunchRow, ExamKey, FuncScan, Modality, PetScan};
use crate::utils::logging::{create_record_progress_bar, finish_progress_bar, log_warning};

/// Image id encoded in a file name: the last `_`-separated token of the stem
///
/// `wrADNI_011_S_0002_PT_I12345.nii` has image id `I12345`.
#[must_use]
pub fn image_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('_').next().map(str::to_string)
}

pub(crate) fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Imaging inputs shared by the image assemblers
struct ImageSource<'a> {
    layout: &'a ImageLayout,
    index: &'a ImagingIndex,
    dirs: Vec<PathBuf>,
}

fn image_source<'a, D: FileDiscovery + ?Sized>(
    modality: Modality,
    config: &'a DatasetConfig,
    discovery: &D,
    tables: &'a ClinicalTables,
) -> Result<ImageSource<'a>> {
    let layout = config.image_layout(modality)?;
    let root = config.image_root(modality)?;
    let index = tables
        .imaging
        .get(&modality)
        .ok_or_else(|| DatasetError::MissingRequiredFile {
            dir: root.clone(),
            pattern: config.description_file.clone(),
        })?;

    let dirs: Vec<PathBuf> = discovery
        .subject_dirs(&root, &layout.subject_pattern)?
        .into_iter()
        .filter(|dir| {
            let excluded = index.is_excluded(&dir_name(dir));
            if excluded {
                log::debug!("Skipping excluded directory {}", dir.display());
            }
            !excluded
        })
        .collect();

    Ok(ImageSource { layout, index, dirs })
}

/// Build the row of one image from its description
fn image_row<P>(
    config: &DatasetConfig,
    tables: &ClinicalTables,
    description: &ImageDescription,
    payload: P,
) -> Result<BunchRow<P>> {
    let subject = description.subject_id.clone();
    let roster_id = tables.roster.subject_to_roster(&subject);

    let matched = match description.exam_date {
        Some(date) => resolver(tables).resolve_lookup(roster_id, &ExamKey::Date(date))?,
        None => {
            log::debug!("Image {} has no acquisition date", description.image_id);
            DiagnosisMatch::none()
        }
    };

    let mut row = resolved_row(subject, roster_id, &matched, payload);
    if config.image_dx_source == DxSource::Description {
        if let Some(label) = description.dx_group {
            row.dx_group = label;
        }
    }
    Ok(row)
}

fn describe<'a>(index: &'a ImagingIndex, image_id: &str, path: &Path) -> Option<&'a ImageDescription> {
    let description = index.description.get(image_id);
    if description.is_none() {
        log_warning(&format!("No description for image {image_id}, skipping"), Some(path));
    }
    description
}

/// Assemble a longitudinal PET dataset (FDG or AV45)
///
/// Every subject directory must hold at least one image matching the
/// layout's pattern; all of them are kept.
pub fn assemble_pet<D: FileDiscovery + ?Sized>(
    modality: Modality,
    config: &DatasetConfig,
    discovery: &D,
    tables: &ClinicalTables,
) -> Result<Bunch<PetScan>> {
    let source = image_source(modality, config, discovery, tables)?;
    let pb = create_record_progress_bar(
        source.dirs.len() as u64,
        &format!("Assembling {modality}"),
        config.show_progress,
    );

    let mut bunch = Bunch::new();
    for dir in &source.dirs {
        for path in discovery.require_files(dir, &source.layout.image_pattern)? {
            let Some(image_id) = image_id_from_path(&path) else {
                log_warning("Cannot derive an image id", Some(&path));
                continue;
            };
            let Some(description) = describe(source.index, &image_id, &path) else {
                continue;
            };
            let payload = PetScan {
                age: description.age,
                dx_conv: description.dx_conv,
                image_id,
                path,
            };
            bunch.push(image_row(config, tables, description, payload)?);
        }
        pb.inc(1);
    }

    finish_progress_bar(&pb, &format!("{} {modality} images", bunch.len()));
    Ok(bunch)
}

/// Assemble a longitudinal rs-fMRI dataset (plain or DARTEL-processed)
///
/// Each discovered directory is one acquisition named by its image id and
/// must hold a functional image and a motion parameter file.
pub fn assemble_func<D: FileDiscovery + ?Sized>(
    modality: Modality,
    config: &DatasetConfig,
    discovery: &D,
    tables: &ClinicalTables,
) -> Result<Bunch<FuncScan>> {
    let source = image_source(modality, config, discovery, tables)?;
    let motion_pattern = source
        .layout
        .motion_pattern
        .as_deref()
        .ok_or_else(|| DatasetError::UnknownModality(format!("{modality} has no motion files")))?;
    let pb = create_record_progress_bar(
        source.dirs.len() as u64,
        &format!("Assembling {modality}"),
        config.show_progress,
    );

    let mut bunch = Bunch::new();
    for dir in &source.dirs {
        pb.inc(1);
        let image_id = dir_name(dir);
        let Some(description) = describe(source.index, &image_id, dir) else {
            continue;
        };
        let payload = FuncScan {
            path: discovery.require_first(dir, &source.layout.image_pattern)?,
            motion: discovery.require_first(dir, motion_pattern)?,
            image_id,
        };
        bunch.push(image_row(config, tables, description, payload)?);
    }

    finish_progress_bar(&pb, &format!("{} {modality} series", bunch.len()));
    Ok(bunch)
}
