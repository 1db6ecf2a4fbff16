//! Image description collection
//!
//! Each imaging dataset ships a description file that links image ids to
//! subjects, acquisition dates and ages.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::models::DxLabel;

/// Description of one image acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescription {
    /// Image id
    pub image_id: String,
    /// Public subject id
    pub subject_id: String,
    /// Acquisition date
    pub exam_date: Option<NaiveDate>,
    /// Subject age at acquisition
    pub age: Option<f64>,
    /// Diagnosis group recorded with the image
    pub dx_group: Option<DxLabel>,
    /// Conversion group recorded with the image (e.g. `MCI-Converter`)
    pub dx_conv: Option<DxLabel>,
}

/// Image descriptions indexed by image id (first row wins)
#[derive(Debug, Clone, Default)]
pub struct DescriptionTable {
    rows: Vec<ImageDescription>,
    by_image: FxHashMap<String, usize>,
}

impl DescriptionTable {
    /// Build the table from rows
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ImageDescription>,
    {
        let rows: Vec<ImageDescription> = rows.into_iter().collect();
        let mut by_image = FxHashMap::default();
        for (idx, row) in rows.iter().enumerate() {
            by_image.entry(row.image_id.clone()).or_insert(idx);
        }
        Self { rows, by_image }
    }

    /// Description of an image
    #[must_use]
    pub fn get(&self, image_id: &str) -> Option<&ImageDescription> {
        self.by_image.get(image_id).map(|&idx| &self.rows[idx])
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<ImageDescription> for DescriptionTable {
    fn from_iter<I: IntoIterator<Item = ImageDescription>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}

/// Description and quality-control exclusions of one image dataset
#[derive(Debug, Clone, Default)]
pub struct ImagingIndex {
    /// Image descriptions
    pub description: DescriptionTable,
    /// Subject directory names excluded from assembly
    pub excluded: BTreeSet<String>,
}

impl ImagingIndex {
    /// Create an index without exclusions
    #[must_use]
    pub fn new(description: DescriptionTable) -> Self {
        Self {
            description,
            excluded: BTreeSet::new(),
        }
    }

    /// Exclude subject directories by name
    #[must_use]
    pub fn with_excluded<I, S>(mut self, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(excluded.into_iter().map(Into::into));
        self
    }

    /// Whether a subject directory is excluded
    #[must_use]
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded.contains(dir_name)
    }
}
