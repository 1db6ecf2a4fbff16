//! Score table collection
//!
//! Score tables are stored column-wise: one subject key column and any number
//! of nullable numeric value columns of equal length. Main study tables are
//! keyed by roster id, DoD sub-study tables by screening number.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{DatasetError, Result};
use crate::models::bunch::SubjectRows;
use crate::models::{RosterId, ScreeningNumber};

/// Column-oriented score table keyed by `K`
#[derive(Debug, Clone)]
pub struct KeyedScoreTable<K> {
    name: String,
    keys: Vec<K>,
    columns: FxHashMap<String, Vec<Option<f64>>>,
    index: FxHashMap<K, SubjectRows>,
}

/// Score table of the main study, keyed by roster id
pub type ScoreTable = KeyedScoreTable<RosterId>;

/// Score table of the DoD sub-study, keyed by screening number
pub type DodScoreTable = KeyedScoreTable<ScreeningNumber>;

impl<K> Default for KeyedScoreTable<K> {
    fn default() -> Self {
        Self {
            name: String::new(),
            keys: Vec::new(),
            columns: FxHashMap::default(),
            index: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> KeyedScoreTable<K> {
    /// Build a table from its key column and value columns
    pub fn from_columns<I>(name: &str, keys: Vec<K>, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<Option<f64>>)>,
    {
        let mut value_columns = FxHashMap::default();
        for (column, values) in columns {
            if values.len() != keys.len() {
                return Err(DatasetError::LengthMismatch {
                    column: "score value",
                    expected: keys.len(),
                    actual: values.len(),
                });
            }
            value_columns.insert(column, values);
        }

        let mut index: FxHashMap<K, SubjectRows> = FxHashMap::default();
        for (row, key) in keys.iter().enumerate() {
            index.entry(*key).or_default().push(row);
        }

        Ok(Self {
            name: name.to_string(),
            keys,
            columns: value_columns,
            index,
        })
    }

    /// Build a table from rows of values ordered like `columns`
    pub fn from_rows(
        name: &str,
        columns: &[&str],
        rows: Vec<(i64, Vec<Option<f64>>)>,
    ) -> Result<Self>
    where
        K: From<i64>,
    {
        let mut keys = Vec::with_capacity(rows.len());
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (key, row) in rows {
            if row.len() != columns.len() {
                return Err(DatasetError::LengthMismatch {
                    column: "score row",
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            keys.push(K::from(key));
            for (column, value) in values.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Self::from_columns(
            name,
            keys,
            columns.iter().map(|c| (*c).to_string()).zip(values),
        )
    }

    /// Table name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the table has a value column
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Non-null values of `column` for a subject, in storage order
    pub fn values_for(&self, key: K, column: &str) -> Result<Vec<f64>> {
        let values = self
            .columns
            .get(column)
            .ok_or_else(|| DatasetError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?;

        Ok(self
            .index
            .get(&key)
            .map(|rows| rows.iter().filter_map(|&row| values[row]).collect())
            .unwrap_or_default())
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
