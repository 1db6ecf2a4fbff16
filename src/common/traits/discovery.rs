//! File discovery interface
//!
//! Image files are located by an external collaborator so that the
//! assemblers can run against a real directory tree or an in-memory layout.

use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};

/// Locates subject directories and image files
pub trait FileDiscovery {
    /// Subject directories under `root` whose names match `pattern`, sorted
    fn subject_dirs(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Files under `subject_dir` matching the relative `pattern`
    /// (e.g. `pet/wr*.nii`), sorted; may be empty
    fn find_files(&self, subject_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Like `find_files`, but zero matches is `MissingRequiredFile`
    fn require_files(&self, subject_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let files = self.find_files(subject_dir, pattern)?;
        if files.is_empty() {
            return Err(DatasetError::MissingRequiredFile {
                dir: subject_dir.to_path_buf(),
                pattern: pattern.to_string(),
            });
        }
        Ok(files)
    }

    /// First file matching `pattern`; zero matches is `MissingRequiredFile`
    fn require_first(&self, subject_dir: &Path, pattern: &str) -> Result<PathBuf> {
        let mut files = self.require_files(subject_dir, pattern)?;
        Ok(files.swap_remove(0))
    }
}
