//! Local Parquet files, one per day table.

use arrow::array::RecordBatch;
use ng2parquet_core::parquet::{write_parquet_into, WriterOptions};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

/// A Parquet file written to local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub path: PathBuf,
    pub bytes: u64,
    pub rows: usize,
}

/// Write `batch` to a new Parquet file at `path`, replacing any existing file.
pub fn write_table(batch: &RecordBatch, path: &Path, options: &WriterOptions) -> Result<WrittenTable> {
    let file = File::create(path).map_err(|e| {
        StorageError::write_failure(format!("Failed to create '{}': {}", path.display(), e))
    })?;

    let mut sink = BufWriter::new(file);
    write_parquet_into(batch, &mut sink, options).map_err(|e| {
        StorageError::write_failure(format!(
            "Failed to encode Parquet to '{}': {}",
            path.display(),
            e
        ))
    })?;

    let file = sink.into_inner().map_err(|e| {
        StorageError::write_failure(format!("Failed to flush '{}': {}", path.display(), e))
    })?;
    file.sync_all().map_err(|e| {
        StorageError::write_failure(format!("Failed to sync '{}': {}", path.display(), e))
    })?;

    let bytes = file
        .metadata()
        .map_err(|e| {
            StorageError::write_failure(format!("Failed to stat '{}': {}", path.display(), e))
        })?
        .len();

    tracing::debug!(
        path = %path.display(),
        rows = batch.num_rows(),
        bytes,
        "Wrote Parquet file"
    );

    Ok(WrittenTable {
        path: path.to_path_buf(),
        bytes,
        rows: batch.num_rows(),
    })
}
