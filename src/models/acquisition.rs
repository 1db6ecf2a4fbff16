//! Acquisition payloads per modality
//!
//! Each assembled dataset carries one payload per acquisition next to the
//! shared identity, diagnosis and timing columns.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{DatasetError, Result};
use crate::models::{DodScoreKind, DxLabel, ScreeningNumber};

/// Number of hippocampal subfield volume columns
pub const HIPPOCAMPUS_COLUMNS: usize = 16;

/// Imaging or biomarker modality of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modality {
    /// FDG-PET images
    FdgPet,
    /// AV45 (amyloid) PET images
    Av45Pet,
    /// Resting-state fMRI
    RsFmri,
    /// Resting-state fMRI, DARTEL-normalized
    RsFmriDartel,
    /// CSF biomarker measures
    Csf,
    /// Hippocampal subfield volumes
    Hippocampus,
    /// MMSE scores
    Mmse,
    /// Subjects with both FDG-PET and rs-fMRI
    PetMr,
}

impl Modality {
    /// Short name of the modality
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FdgPet => "pet",
            Self::Av45Pet => "av45",
            Self::RsFmri => "fmri",
            Self::RsFmriDartel => "fmri_dartel",
            Self::Csf => "csf",
            Self::Hippocampus => "hippo",
            Self::Mmse => "mmse",
            Self::PetMr => "petmr",
        }
    }

    /// Whether the modality is discovered from image directories
    #[must_use]
    pub const fn is_imaging(self) -> bool {
        matches!(
            self,
            Self::FdgPet | Self::Av45Pet | Self::RsFmri | Self::RsFmriDartel
        )
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modality {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pet" | "fdg" => Ok(Self::FdgPet),
            "av45" => Ok(Self::Av45Pet),
            "fmri" => Ok(Self::RsFmri),
            "fmri_dartel" | "dartel" => Ok(Self::RsFmriDartel),
            "csf" => Ok(Self::Csf),
            "hippo" | "hippocampus" => Ok(Self::Hippocampus),
            "mmse" => Ok(Self::Mmse),
            "petmr" => Ok(Self::PetMr),
            other => Err(DatasetError::UnknownModality(other.to_string())),
        }
    }
}

/// Image dataset of the DoD sub-study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DodModality {
    /// Resting-state fMRI
    RsFmri,
    /// AV45 (amyloid) PET images
    Av45Pet,
}

impl DodModality {
    /// Every DoD image dataset
    pub const ALL: [Self; 2] = [Self::RsFmri, Self::Av45Pet];

    /// Short name of the dataset
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RsFmri => "dod_fmri",
            Self::Av45Pet => "dod_av45",
        }
    }

    /// Whether subjects of the dataset carry a PTSD status
    #[must_use]
    pub const fn has_ptsd_status(self) -> bool {
        matches!(self, Self::RsFmri)
    }
}

impl fmt::Display for DodModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A PET image
#[derive(Debug, Clone, PartialEq)]
pub struct PetScan {
    /// Image file
    pub path: PathBuf,
    /// Image id parsed from the file name
    pub image_id: String,
    /// Subject age at acquisition, from the image description
    pub age: Option<f64>,
    /// Conversion group, from the image description
    pub dx_conv: Option<DxLabel>,
}

/// A resting-state fMRI series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncScan {
    /// Functional image file
    pub path: PathBuf,
    /// Realignment (motion) parameter file
    pub motion: PathBuf,
    /// Image id (acquisition directory name)
    pub image_id: String,
}

/// CSF amyloid-beta, phosphorylated tau and total tau
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsfBiomarkers(pub [f64; 3]);

impl CsfBiomarkers {
    /// Amyloid-beta 1-42
    #[must_use]
    pub const fn abeta(&self) -> f64 {
        self.0[0]
    }

    /// Phosphorylated tau
    #[must_use]
    pub const fn ptau(&self) -> f64 {
        self.0[1]
    }

    /// Total tau
    #[must_use]
    pub const fn tau(&self) -> f64 {
        self.0[2]
    }
}

/// Hippocampal subfield volumes, missing columns as `None`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HippocampusVolumes(pub [Option<f64>; HIPPOCAMPUS_COLUMNS]);

impl HippocampusVolumes {
    /// Column names, in payload order
    #[must_use]
    pub fn column_names() -> Vec<String> {
        (131..131 + HIPPOCAMPUS_COLUMNS)
            .map(|c| format!("ST{c}HS"))
            .collect()
    }
}

/// One MMSE total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmseScore(pub f64);

/// Number of scores in the DoD battery
pub const DOD_BATTERY_SIZE: usize = DodScoreKind::ALL.len();

/// The first image of a DoD subject with its battery scores
#[derive(Debug, Clone, PartialEq)]
pub struct DodScan {
    /// Image file
    pub path: PathBuf,
    /// Screening number parsed from the subject directory
    pub screening_number: ScreeningNumber,
    /// Battery scores in [`DodScoreKind::ALL`] order
    pub scores: [f64; DOD_BATTERY_SIZE],
    /// PTSD status (0 none, 1 current, 2 past), for datasets that carry it
    pub ptsd: Option<u8>,
}

impl DodScan {
    /// Value of one battery score
    #[must_use]
    pub fn score(&self, kind: DodScoreKind) -> f64 {
        DodScoreKind::ALL
            .iter()
            .position(|k| *k == kind)
            .map_or(0.0, |idx| self.scores[idx])
    }
}

/// Paired PET and fMRI images of one subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetMrScan {
    /// PET image file
    pub pet: PathBuf,
    /// Functional image file
    pub func: PathBuf,
}
