// One conversion run: download, transform, then write and upload each day.
//
// Runs sequentially. A failed partition is recorded in the report and the
// remaining partitions still run; only download, read and fail-fast coercion
// errors abort the whole run.

use anyhow::{Context, Result};
use ng2parquet_config::RuntimeConfig;
use ng2parquet_core::parquet::WriterOptions;
use ng2parquet_core::{
    day_partition_key, day_table_to_record_batch, transform_lines, DayKey, DayTable,
    InvalidRecordPolicy, LineError, NormalizeOptions,
};
use ng2parquet_storage::{write_table, ObjectStore};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::address::StorageAddress;

/// Options resolved from `RuntimeConfig` for a run
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub normalize: NormalizeOptions,
    pub policy: InvalidRecordPolicy,
    pub writer: WriterOptions,
    /// Keep local files here instead of a temporary directory
    pub work_dir: Option<PathBuf>,
}

impl RunSettings {
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            normalize: config.transform.normalize_options()?,
            policy: config.transform.invalid_record_policy(),
            writer: config.output.writer_options(),
            work_dir: config.output.work_dir.as_ref().map(PathBuf::from),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionOutcome {
    Uploaded { key: String, rows: usize, bytes: u64 },
    WriteFailed { error: String },
    UploadFailed { key: String, error: String },
}

#[derive(Debug, Clone)]
pub struct PartitionReport {
    pub day_key: DayKey,
    pub outcome: PartitionOutcome,
}

/// What happened to every line and every partition of a run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub total_lines: usize,
    pub unmatched_lines: usize,
    pub rejected: Vec<LineError>,
    pub partitions: Vec<PartitionReport>,
}

impl RunReport {
    pub fn uploaded(&self) -> usize {
        self.partitions
            .iter()
            .filter(|p| matches!(p.outcome, PartitionOutcome::Uploaded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.partitions.len() - self.uploaded()
    }

    /// True when every partition was uploaded and no record was rejected.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.rejected.is_empty()
    }
}

enum WorkDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl WorkDir {
    fn create(configured: Option<&Path>) -> Result<Self> {
        match configured {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create work directory {}", dir.display())
                })?;
                Ok(WorkDir::Kept(dir.to_path_buf()))
            }
            None => Ok(WorkDir::Temp(
                TempDir::new().context("Failed to create temporary work directory")?,
            )),
        }
    }

    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(dir) => dir.path(),
            WorkDir::Kept(dir) => dir,
        }
    }
}

/// Convert the object at `input` into day-partitioned Parquet objects under `output`.
pub async fn run<S>(
    store: &S,
    input: &StorageAddress,
    output: &StorageAddress,
    settings: &RunSettings,
) -> Result<RunReport>
where
    S: ObjectStore + ?Sized,
{
    let span = info_span!("run", input = %input, output = %output);
    run_inner(store, input, output, settings).instrument(span).await
}

async fn run_inner<S>(
    store: &S,
    input: &StorageAddress,
    output: &StorageAddress,
    settings: &RunSettings,
) -> Result<RunReport>
where
    S: ObjectStore + ?Sized,
{
    let object_name = input
        .object_name()
        .with_context(|| format!("Input key of {} has no object name", input))?;

    let work_dir = WorkDir::create(settings.work_dir.as_deref())?;
    let source_path = store
        .download(&input.bucket, &input.key, work_dir.path())
        .await
        .with_context(|| format!("Failed to download {}", input))?;

    let raw = tokio::fs::read(&source_path)
        .await
        .with_context(|| format!("Failed to read {}", source_path.display()))?;
    let content = String::from_utf8_lossy(&raw);
    if let Cow::Owned(_) = content {
        warn!("Source contains invalid UTF-8; affected bytes were replaced");
    }

    let transformed = transform_lines(content.lines(), &settings.normalize, settings.policy)
        .context("Failed to normalize records")?;

    if !transformed.unmatched_lines.is_empty() {
        warn!(
            count = transformed.unmatched_lines.len(),
            first_line = transformed.unmatched_lines[0],
            "Skipped lines that do not match the access log format"
        );
    }
    for rejected in &transformed.rejected {
        warn!(
            line_number = rejected.line_number,
            field = rejected.error.field(),
            error = %rejected.error,
            "Rejected record"
        );
    }
    if transformed.tables.is_empty() {
        warn!("No records to write");
    }

    let mut report = RunReport {
        total_lines: transformed.total_lines,
        unmatched_lines: transformed.unmatched_lines.len(),
        rejected: transformed.rejected,
        partitions: Vec::with_capacity(transformed.tables.len()),
    };

    for table in transformed.tables.iter() {
        let span = info_span!("partition", day_key = %table.day_key(), rows = table.len());
        let outcome = publish_partition(store, table, &source_path, output, object_name, settings)
            .instrument(span)
            .await;
        report.partitions.push(PartitionReport {
            day_key: table.day_key().clone(),
            outcome,
        });
    }

    info!(
        lines = report.total_lines,
        partitions = report.partitions.len(),
        uploaded = report.uploaded(),
        failed = report.failed(),
        rejected = report.rejected.len(),
        "Run finished"
    );

    Ok(report)
}

async fn publish_partition<S>(
    store: &S,
    table: &DayTable,
    source_path: &Path,
    output: &StorageAddress,
    object_name: &str,
    settings: &RunSettings,
) -> PartitionOutcome
where
    S: ObjectStore + ?Sized,
{
    let batch = match day_table_to_record_batch(table) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "Failed to build Arrow batch");
            return PartitionOutcome::WriteFailed {
                error: e.to_string(),
            };
        }
    };

    let mut local_path = source_path.as_os_str().to_owned();
    local_path.push(".");
    local_path.push(table.day_key().as_str());
    let local_path = PathBuf::from(local_path);
    let written = match write_table(&batch, &local_path, &settings.writer) {
        Ok(written) => written,
        Err(e) => {
            warn!(error = %e, "Failed to write Parquet file");
            return PartitionOutcome::WriteFailed {
                error: e.to_string(),
            };
        }
    };

    let key = day_partition_key(&output.key, object_name, table.day_key());
    debug!(path = %written.path.display(), key = %key, "Uploading partition");

    match store.upload(&written.path, &output.bucket, &key).await {
        Ok(()) => {
            info!(bucket = %output.bucket, key = %key, rows = written.rows, "Partition uploaded");
            PartitionOutcome::Uploaded {
                key,
                rows: written.rows,
                bytes: written.bytes,
            }
        }
        Err(e) => {
            warn!(error = %e, key = %key, "Failed to upload partition");
            PartitionOutcome::UploadFailed {
                key,
                error: e.to_string(),
            }
        }
    }
}
