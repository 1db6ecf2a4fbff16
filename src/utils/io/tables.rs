//! Tabular file reading
//!
//! Clinical tables are read from CSV or Parquet into a single Arrow
//! `RecordBatch`. CSV columns are read as text and adapted afterwards, so a
//! stray non-numeric cell turns into a null instead of failing the file.

use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, new_null_array};
use arrow::compute::{cast, concat_batches, filter_record_batch, is_not_null};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use itertools::Itertools;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;
use serde::de::DeserializeOwned;

use crate::config::DateFormatConfig;
use crate::error::{DatasetError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Rows sampled to discover CSV column names
pub const SCHEMA_INFERENCE_ROWS: usize = 100;

/// Rows per batch when reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Target type of a projected column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// UTF-8 text (dates are kept as text and parsed later)
    Text,
}

impl ColumnType {
    const fn data_type(self) -> DataType {
        match self {
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Text => DataType::Utf8,
        }
    }
}

/// A column to keep when projecting a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Target type
    pub column_type: ColumnType,
    /// Whether a missing column is an error (otherwise filled with nulls)
    pub required: bool,
}

impl ColumnSpec {
    /// A column that must be present
    #[must_use]
    pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: true,
        }
    }

    /// A column filled with nulls when absent
    #[must_use]
    pub fn optional(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: false,
        }
    }
}

/// Read a CSV file with a header row, every column as text
pub fn read_csv(path: &Path) -> Result<RecordBatch> {
    let start = std::time::Instant::now();
    log_operation_start("Reading CSV file", path);

    let mut file =
        File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;

    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(&mut file, Some(SCHEMA_INFERENCE_ROWS))
        .with_context(|| format!("Failed to read CSV header of {}", path.display()))?;
    file.rewind()
        .with_context(|| format!("Failed to rewind {}", path.display()))?;

    let schema = Arc::new(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect_vec(),
    ));

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(file)
        .with_context(|| format!("Failed to build CSV reader for {}", path.display()))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read CSV file {}", path.display()))?;
    let batch = concat_batches(&schema, &batches)?;

    log_operation_complete("read", &path.display(), batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

/// Read a Parquet file
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let start = std::time::Instant::now();
    log_operation_start("Reading parquet file", path);

    let file =
        File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Failed to read parquet file {}", path.display()))?;
    let schema = Arc::clone(builder.schema());
    let reader = builder
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build()
        .context("Failed to build parquet reader")?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read record batch from {}", path.display()))?;
    let batch = concat_batches(&schema, &batches)?;

    log_operation_complete("read", &path.display(), batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

/// Read a table, choosing the reader from the file extension
///
/// `.parquet` files go through the Parquet reader, everything else is read
/// as CSV.
pub fn read_table(path: &Path) -> Result<RecordBatch> {
    if path.extension().is_some_and(|ext| ext == "parquet") {
        read_parquet(path)
    } else {
        read_csv(path)
    }
}

/// Read several tables in parallel, keeping the input order
pub fn read_tables_parallel(paths: &[PathBuf]) -> Result<Vec<RecordBatch>> {
    paths.par_iter().map(|path| read_table(path)).collect()
}

fn adapt_column(array: &ArrayRef, column_type: ColumnType) -> Result<ArrayRef> {
    let target = column_type.data_type();
    if array.data_type() == &target {
        return Ok(Arc::clone(array));
    }
    // Text holding "3.0" only casts to an integer through a float
    let adapted = match (array.data_type(), column_type) {
        (DataType::Utf8 | DataType::LargeUtf8, ColumnType::Int) => {
            cast(&cast(array, &DataType::Float64)?, &target)?
        }
        _ => cast(array, &target)?,
    };
    Ok(adapted)
}

/// Keep and adapt the listed columns, in the listed order
///
/// Values that cannot be converted become nulls. A missing required column
/// is `MissingColumn`; a missing optional column is filled with nulls.
pub fn project(batch: &RecordBatch, table: &str, columns: &[ColumnSpec]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());

    for spec in columns {
        let array = match schema.index_of(&spec.name) {
            Ok(idx) => adapt_column(batch.column(idx), spec.column_type)?,
            Err(_) if spec.required => {
                return Err(DatasetError::MissingColumn {
                    table: table.to_string(),
                    column: spec.name.clone(),
                });
            }
            Err(_) => {
                log::debug!("Column {} not in {table}, filling with nulls", spec.name);
                new_null_array(&spec.column_type.data_type(), batch.num_rows())
            }
        };
        fields.push(Field::new(&spec.name, spec.column_type.data_type(), true));
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Drop the rows where `column` is null
pub fn drop_null_rows(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let array = column_by_name(batch, column)?;
    if array.null_count() == 0 {
        return Ok(batch.clone());
    }
    let mask: BooleanArray = is_not_null(array.as_ref())?;
    let dropped = array.null_count();
    let filtered = filter_record_batch(batch, &mask)?;
    log::debug!("Dropped {dropped} rows without {column}");
    Ok(filtered)
}

/// Decode every row of a batch into a typed record
pub fn decode_rows<T: DeserializeOwned>(batch: &RecordBatch) -> Result<Vec<T>> {
    serde_arrow::from_record_batch::<Vec<T>>(batch)
        .map_err(|e| anyhow::anyhow!("Failed to deserialize: {e}").into())
}

fn column_by_name<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DatasetError::MissingColumn {
            table: "record batch".to_string(),
            column: name.to_string(),
        })
}

/// Integer values of a projected `Int` column
pub fn int_values(batch: &RecordBatch, name: &str) -> Result<Vec<Option<i64>>> {
    let array = column_by_name(batch, name)?;
    let values = array
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| anyhow::anyhow!("Column {name} is not an Int64 column"))?;
    Ok(values.iter().collect())
}

/// Float values of a projected `Float` column
pub fn float_values(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>> {
    let array = column_by_name(batch, name)?;
    let values = array
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| anyhow::anyhow!("Column {name} is not a Float64 column"))?;
    Ok(values.iter().map(|v| v.filter(|v| !v.is_nan())).collect())
}

/// Text values of a projected `Text` column; blank cells are `None`
pub fn text_values(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>> {
    let array = column_by_name(batch, name)?;
    let values = array
        .as_string_opt::<i32>()
        .ok_or_else(|| anyhow::anyhow!("Column {name} is not a Utf8 column"))?;
    Ok(values
        .iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect())
}

/// Dates of a projected `Text` column
///
/// Cells matching none of the configured formats become `None`.
pub fn date_values(
    batch: &RecordBatch,
    name: &str,
    formats: &DateFormatConfig,
) -> Result<Vec<Option<NaiveDate>>> {
    Ok(text_values(batch, name)?
        .into_iter()
        .map(|cell| {
            let cell = cell?;
            let date = formats.parse(&cell);
            if date.is_none() {
                log::debug!("Unparseable date {cell:?} in column {name}");
            }
            date
        })
        .collect())
}
