//! Paired PET and MRI dataset
//!
//! Subjects imaged with both FDG-PET and rs-fMRI. Each subject contributes
//! its first PET acquisition and its first fMRI series; diagnosis and exam
//! timing come from the PET side.

use crate::algorithm::assembly::images::{assemble_func, assemble_pet};
use crate::algorithm::assembly::intersect_subjects;
use crate::collections::ClinicalTables;
use crate::common::traits::FileDiscovery;
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::models::{Bunch, BunchRow, FuncScan, Modality, PetMrScan, PetScan};

/// Pair two assembled datasets on subject identity
pub fn pair_pet_func(pet: &Bunch<PetScan>, func: &Bunch<FuncScan>) -> Result<Bunch<PetMrScan>> {
    let pairs = intersect_subjects(pet, func);
    let mut bunch = Bunch::with_capacity(pairs.len());
    for pair in pairs {
        let pet_row = pet.row(pair.left).ok_or(DatasetError::IndexOutOfBounds {
            index: pair.left,
            len: pet.len(),
        })?;
        let func_path = func
            .payload()
            .get(pair.right)
            .map(|scan| scan.path.clone())
            .ok_or(DatasetError::IndexOutOfBounds {
                index: pair.right,
                len: func.len(),
            })?;

        bunch.push(BunchRow {
            subject: pet_row.subject,
            roster_id: pet_row.roster_id,
            dx_group: pet_row.dx_group,
            exam_date: pet_row.exam_date,
            exam_code: pet_row.exam_code,
            exam_code2: pet_row.exam_code2,
            payload: PetMrScan {
                pet: pet_row.payload.path,
                func: func_path,
            },
        });
    }
    Ok(bunch)
}

/// Assemble the FDG-PET and rs-fMRI datasets and pair them
pub fn assemble_petmr<D: FileDiscovery + ?Sized>(
    config: &DatasetConfig,
    discovery: &D,
    tables: &ClinicalTables,
) -> Result<Bunch<PetMrScan>> {
    let pet = assemble_pet(Modality::FdgPet, config, discovery, tables)?;
    let func = assemble_func(Modality::RsFmri, config, discovery, tables)?;
    log::info!(
        "Pairing {} PET images with {} fMRI series",
        pet.len(),
        func.len()
    );
    pair_pet_func(&pet, &func)
}
