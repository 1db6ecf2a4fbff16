//! Configuration for dataset assembly
//!
//! The on-disk layout of a study (base directory, clinical CSV names, image
//! directories and glob patterns) lives in [`DatasetConfig`]. Longitudinal
//! and split parameters live in [`study`].

pub mod dates;
pub mod study;

use std::fmt;
use std::path::{Path, PathBuf};

pub use dates::DateFormatConfig;
pub use study::{BaselinePolicy, LongitudinalConfig, SplitConfig, SplitConfigBuilder};

use crate::error::{DatasetError, Result};
use crate::models::{DodModality, Modality, ScoreTableId};

/// Environment variable overriding the data base directory
pub const DATA_DIR_ENV: &str = "ADNI_DATA_DIR";

/// Where image datasets take their diagnosis label from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DxSource {
    /// Resolve against the diagnosis table at the closest exam date
    #[default]
    Resolved,
    /// Use the label of the image description file, resolving only when the
    /// description has none
    Description,
}

/// Directory and file patterns of one image dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    /// Directory below the base directory
    pub dir_name: String,
    /// Pattern of subject (or acquisition) directories
    pub subject_pattern: String,
    /// Pattern of image files within a subject directory
    pub image_pattern: String,
    /// Pattern of motion parameter files, for functional series
    pub motion_pattern: Option<String>,
}

impl ImageLayout {
    /// Create a layout without motion files
    #[must_use]
    pub fn new(dir_name: &str, subject_pattern: &str, image_pattern: &str) -> Self {
        Self {
            dir_name: dir_name.to_string(),
            subject_pattern: subject_pattern.to_string(),
            image_pattern: image_pattern.to_string(),
            motion_pattern: None,
        }
    }

    /// Set the motion parameter pattern
    #[must_use]
    pub fn with_motion(mut self, motion_pattern: &str) -> Self {
        self.motion_pattern = Some(motion_pattern.to_string());
        self
    }
}

/// File names of the clinical tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalFiles {
    /// Subject roster
    pub roster: String,
    /// Diagnosis summary
    pub diagnosis: String,
    /// Demographics
    pub demographics: String,
    /// MMSE
    pub mmse: String,
    /// CDR
    pub cdr: String,
    /// Geriatric depression scale
    pub gdscale: String,
    /// Functional activities questionnaire
    pub faq: String,
    /// Neuropsychiatric inventory
    pub npiq: String,
    /// ADAS-Cog, ADNI1
    pub adas1: String,
    /// ADAS-Cog, ADNI-GO/2
    pub adas2: String,
    /// Composite neuropsychological scores
    pub nss: String,
    /// Neuropsychological battery
    pub neurobat: String,
    /// CSF biomarker series, concatenated in order
    pub csf: Vec<String>,
    /// FreeSurfer hippocampal volumes
    pub hippocampus: String,
}

impl Default for ClinicalFiles {
    fn default() -> Self {
        Self {
            roster: "ROSTER.csv".to_string(),
            diagnosis: "DXSUM_PDXCONV_ADNIALL.csv".to_string(),
            demographics: "PTDEMOG.csv".to_string(),
            mmse: "MMSE.csv".to_string(),
            cdr: "CDR.csv".to_string(),
            gdscale: "GDSCALE.csv".to_string(),
            faq: "FAQ.csv".to_string(),
            npiq: "NPIQ.csv".to_string(),
            adas1: "ADASSCORES.csv".to_string(),
            adas2: "ADAS_ADNIGO2.csv".to_string(),
            nss: "UWNPSYCHSUM_01_12_16.csv".to_string(),
            neurobat: "NEUROBAT.csv".to_string(),
            csf: [
                "UPENNBIOMK3.csv",
                "UPENNBIOMK4_09_06_12.csv",
                "UPENNBIOMK5_10_31_13.csv",
                "UPENNBIOMK6_07_02_13.csv",
                "UPENNBIOMK7.csv",
                "UPENNBIOMK8.csv",
            ]
            .map(str::to_string)
            .to_vec(),
            hippocampus: "UCSFFSX51_05_20_15.csv".to_string(),
        }
    }
}

/// File names of the DoD sub-study tables, all keyed by `SCRNO`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DodFiles {
    /// Demographics
    pub demographics: String,
    /// MMSE
    pub mmse: String,
    /// CDR
    pub cdr: String,
    /// Geriatric depression scale
    pub gdscale: String,
    /// Functional activities questionnaire
    pub faq: String,
    /// Neuropsychiatric inventory
    pub npi: String,
    /// ADAS-Cog
    pub adas: String,
    /// Neuropsychological battery
    pub neurobat: String,
    /// Current CAPS scores
    pub caps_current: String,
    /// Lifetime CAPS scores
    pub caps_lifetime: String,
}

impl Default for DodFiles {
    fn default() -> Self {
        Self {
            demographics: "PTDEMOG.csv".to_string(),
            mmse: "MMSE.csv".to_string(),
            cdr: "CDR.csv".to_string(),
            gdscale: "GDSCALE.csv".to_string(),
            faq: "FAQ.csv".to_string(),
            npi: "NPI.csv".to_string(),
            adas: "ADAS.csv".to_string(),
            neurobat: "NEUROBAT.csv".to_string(),
            caps_current: "CAPSCURR.csv".to_string(),
            caps_lifetime: "CAPSLIFE.csv".to_string(),
        }
    }
}

impl DodFiles {
    /// File name of a DoD score table, if the sub-study has one
    #[must_use]
    pub fn score_file(&self, id: ScoreTableId) -> Option<&str> {
        let name = match id {
            ScoreTableId::Demographics => &self.demographics,
            ScoreTableId::Mmse => &self.mmse,
            ScoreTableId::Cdr => &self.cdr,
            ScoreTableId::Gdscale => &self.gdscale,
            ScoreTableId::Faq => &self.faq,
            ScoreTableId::Npiq => &self.npi,
            ScoreTableId::Adas2 => &self.adas,
            ScoreTableId::Neurobat => &self.neurobat,
            ScoreTableId::CapsCurrent => &self.caps_current,
            ScoreTableId::CapsLifetime => &self.caps_lifetime,
            ScoreTableId::Adas1 | ScoreTableId::Nss => return None,
        };
        Some(name)
    }
}

/// Layout of a study on disk
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Explicit base directory; takes precedence over the candidates
    pub base_dir: Option<PathBuf>,
    /// Candidate base directories, first existing one wins
    pub candidate_dirs: Vec<PathBuf>,
    /// Clinical CSV directory below the base directory
    pub csv_dir: String,
    /// DoD sub-study CSV directory below the base directory
    pub dod_csv_dir: String,
    /// Clinical table file names
    pub files: ClinicalFiles,
    /// DoD sub-study table file names
    pub dod_files: DodFiles,
    /// Longitudinal FDG-PET images
    pub fdg_pet: ImageLayout,
    /// Longitudinal AV45-PET images
    pub av45_pet: ImageLayout,
    /// Longitudinal rs-fMRI series
    pub rs_fmri: ImageLayout,
    /// Longitudinal rs-fMRI series, DARTEL-processed
    pub rs_fmri_dartel: ImageLayout,
    /// DoD rs-fMRI series
    pub dod_rs_fmri: ImageLayout,
    /// DoD AV45-PET images
    pub dod_av45_pet: ImageLayout,
    /// Per-dataset file listing excluded subject directories
    pub exclusion_file: String,
    /// Per-dataset image description file
    pub description_file: String,
    /// Formats used to parse date strings
    pub date_formats: DateFormatConfig,
    /// Diagnosis label source of image datasets
    pub image_dx_source: DxSource,
    /// Show progress bars while assembling
    pub show_progress: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            candidate_dirs: Vec::new(),
            csv_dir: "ADNI_csv".to_string(),
            dod_csv_dir: "ADNIDOD_csv".to_string(),
            files: ClinicalFiles::default(),
            dod_files: DodFiles::default(),
            fdg_pet: ImageLayout::new("ADNI_longitudinal_fdg_pet", "[0-9]*", "pet/wr*.nii"),
            av45_pet: ImageLayout::new("ADNI_av45_pet", "I[0-9]*", "pet/wr*.nii"),
            rs_fmri: ImageLayout::new("ADNI_longitudinal_rs_fmri", "I[0-9]*", "func/wr*.nii")
                .with_motion("func/rp_*.txt"),
            rs_fmri_dartel: ImageLayout::new(
                "ADNI_longitudinal_rs_fmri_DARTEL",
                "I[0-9]*",
                "func/resampled*.nii",
            )
            .with_motion("func/rp_*.txt"),
            dod_rs_fmri: ImageLayout::new("ADNIDOD_rs_fmri", "0*", "func/wr*"),
            dod_av45_pet: ImageLayout::new("ADNIDOD_av45_pet", "0*", "pet/wr*.nii"),
            exclusion_file: "excluded_subjects.txt".to_string(),
            description_file: "description_file.csv".to_string(),
            date_formats: DateFormatConfig::default(),
            image_dx_source: DxSource::Resolved,
            show_progress: false,
        }
    }
}

impl DatasetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder
    #[must_use]
    pub fn builder() -> DatasetConfigBuilder {
        DatasetConfigBuilder::new()
    }

    /// Resolve the data base directory
    ///
    /// `ADNI_DATA_DIR` wins over the explicit base directory, which wins over
    /// the first existing candidate.
    pub fn resolve_base_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.base_dir {
            return Ok(dir.clone());
        }
        self.candidate_dirs
            .iter()
            .find(|dir| dir.is_dir())
            .cloned()
            .ok_or_else(|| {
                DatasetError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!(
                        "Data not found: none of {} candidate directories exists",
                        self.candidate_dirs.len()
                    ),
                ))
            })
    }

    /// Directory holding the clinical CSV tables
    pub fn csv_path(&self) -> Result<PathBuf> {
        Ok(self.resolve_base_dir()?.join(&self.csv_dir))
    }

    /// Path of one clinical table
    pub fn table_path(&self, file_name: &str) -> Result<PathBuf> {
        Ok(self.csv_path()?.join(file_name))
    }

    /// Directory holding the DoD sub-study tables
    pub fn dod_csv_path(&self) -> Result<PathBuf> {
        Ok(self.resolve_base_dir()?.join(&self.dod_csv_dir))
    }

    /// Image layout of an imaging modality
    pub fn image_layout(&self, modality: Modality) -> Result<&ImageLayout> {
        match modality {
            Modality::FdgPet => Ok(&self.fdg_pet),
            Modality::Av45Pet => Ok(&self.av45_pet),
            Modality::RsFmri => Ok(&self.rs_fmri),
            Modality::RsFmriDartel => Ok(&self.rs_fmri_dartel),
            other => Err(DatasetError::UnknownModality(format!(
                "{other} has no image directory"
            ))),
        }
    }

    /// Root directory of an imaging modality
    pub fn image_root(&self, modality: Modality) -> Result<PathBuf> {
        let layout = self.image_layout(modality)?;
        Ok(self.resolve_base_dir()?.join(&layout.dir_name))
    }

    /// Image layout of a DoD image dataset
    #[must_use]
    pub const fn dod_image_layout(&self, modality: DodModality) -> &ImageLayout {
        match modality {
            DodModality::RsFmri => &self.dod_rs_fmri,
            DodModality::Av45Pet => &self.dod_av45_pet,
        }
    }

    /// Root directory of a DoD image dataset
    pub fn dod_image_root(&self, modality: DodModality) -> Result<PathBuf> {
        let layout = self.dod_image_layout(modality);
        Ok(self.resolve_base_dir()?.join(&layout.dir_name))
    }

    /// Exclusion and description file paths of an image root
    #[must_use]
    pub fn image_metadata_paths(&self, root: &Path) -> (PathBuf, PathBuf) {
        (
            root.join(&self.exclusion_file),
            root.join(&self.description_file),
        )
    }
}

impl fmt::Display for DatasetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Configuration:")?;
        if let Some(dir) = &self.base_dir {
            writeln!(f, "  Base Directory: {}", dir.display())?;
        }
        if !self.candidate_dirs.is_empty() {
            writeln!(f, "  Candidate Directories: {}", self.candidate_dirs.len())?;
        }
        writeln!(f, "  Clinical Tables: {}", self.csv_dir)?;
        writeln!(f, "  DoD Tables: {}", self.dod_csv_dir)?;
        for layout in [
            &self.fdg_pet,
            &self.av45_pet,
            &self.rs_fmri,
            &self.rs_fmri_dartel,
            &self.dod_rs_fmri,
            &self.dod_av45_pet,
        ] {
            writeln!(
                f,
                "  Images: {}/{}/{}",
                layout.dir_name, layout.subject_pattern, layout.image_pattern
            )?;
        }
        writeln!(f, "  Diagnosis Source: {:?}", self.image_dx_source)?;
        writeln!(f, "  Show Progress: {}", self.show_progress)
    }
}

/// Builder for [`DatasetConfig`]
#[derive(Debug, Clone, Default)]
pub struct DatasetConfigBuilder {
    config: DatasetConfig,
}

impl DatasetConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DatasetConfig::default(),
        }
    }

    /// Set the base directory
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(dir.into());
        self
    }

    /// Add a candidate base directory
    #[must_use]
    pub fn candidate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.candidate_dirs.push(dir.into());
        self
    }

    /// Set the clinical table file names
    #[must_use]
    pub fn files(mut self, files: ClinicalFiles) -> Self {
        self.config.files = files;
        self
    }

    /// Set the DoD sub-study table file names
    #[must_use]
    pub fn dod_files(mut self, files: DodFiles) -> Self {
        self.config.dod_files = files;
        self
    }

    /// Set the layout of a DoD image dataset
    #[must_use]
    pub fn dod_image_layout(mut self, modality: DodModality, layout: ImageLayout) -> Self {
        match modality {
            DodModality::RsFmri => self.config.dod_rs_fmri = layout,
            DodModality::Av45Pet => self.config.dod_av45_pet = layout,
        }
        self
    }

    /// Set the date formats
    #[must_use]
    pub fn date_formats(mut self, formats: DateFormatConfig) -> Self {
        self.config.date_formats = formats;
        self
    }

    /// Set the layout of an imaging modality; other modalities are ignored
    #[must_use]
    pub fn image_layout(mut self, modality: Modality, layout: ImageLayout) -> Self {
        match modality {
            Modality::FdgPet => self.config.fdg_pet = layout,
            Modality::Av45Pet => self.config.av45_pet = layout,
            Modality::RsFmri => self.config.rs_fmri = layout,
            Modality::RsFmriDartel => self.config.rs_fmri_dartel = layout,
            other => log::warn!("Ignoring image layout for non-imaging modality {other}"),
        }
        self
    }

    /// Set the diagnosis label source of image datasets
    #[must_use]
    pub const fn image_dx_source(mut self, source: DxSource) -> Self {
        self.config.image_dx_source = source;
        self
    }

    /// Show or hide progress bars
    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> DatasetConfig {
        self.config
    }
}
