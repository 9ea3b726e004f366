//! Object store access through OpenDAL.
//!
//! Buckets are named per call, so operators are built lazily and cached by
//! bucket name. The `fs` backend maps bucket `b` to the directory `{root}/b`,
//! which keeps the full download/upload path testable without a network.

use async_trait::async_trait;
use ng2parquet_config::{StorageBackend, StorageConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, StorageError};

/// Moves whole files between buckets and the local disk.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch `bucket/key` into a new file under `dest_dir` and return its path.
    async fn download(&self, bucket: &str, key: &str, dest_dir: &Path) -> Result<PathBuf>;

    /// Store the file at `local_path` as `bucket/key`.
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
enum Backend {
    Fs {
        root: PathBuf,
    },
    S3 {
        region: String,
        endpoint: Option<String>,
    },
}

pub struct OpendalStore {
    backend: Backend,
    operators: Mutex<HashMap<String, opendal::Operator>>,
}

impl OpendalStore {
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let backend = match config.backend {
            StorageBackend::Fs => {
                let fs = config.fs.as_ref().ok_or_else(|| {
                    StorageError::invalid_config(
                        "fs config required for filesystem backend".to_string(),
                    )
                })?;
                Backend::Fs {
                    root: absolute_root(Path::new(&fs.root))?,
                }
            }
            StorageBackend::S3 => {
                let s3 = config.s3.as_ref().ok_or_else(|| {
                    StorageError::invalid_config("s3 config required for S3 backend".to_string())
                })?;
                Backend::S3 {
                    region: s3.region.clone(),
                    endpoint: s3.endpoint.clone(),
                }
            }
        };

        Ok(Self::with_backend(backend))
    }

    /// Filesystem store rooted at `root`; each bucket is a subdirectory.
    pub fn fs(root: impl Into<PathBuf>) -> Self {
        Self::with_backend(Backend::Fs { root: root.into() })
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            operators: Mutex::new(HashMap::new()),
        }
    }

    fn operator(&self, bucket: &str) -> Result<opendal::Operator> {
        if let Some(op) = self.operators.lock().get(bucket) {
            return Ok(op.clone());
        }

        let op = self.build_operator(bucket)?;
        self.operators
            .lock()
            .insert(bucket.to_string(), op.clone());
        Ok(op)
    }

    fn build_operator(&self, bucket: &str) -> Result<opendal::Operator> {
        if bucket.is_empty() {
            return Err(StorageError::invalid_config(
                "bucket name must not be empty".to_string(),
            ));
        }

        let op = match &self.backend {
            Backend::Fs { root } => {
                if bucket.contains('/') || bucket == "." || bucket == ".." {
                    return Err(StorageError::invalid_config(format!(
                        "bucket '{}' is not a valid directory name",
                        bucket
                    )));
                }
                let bucket_root = root.join(bucket);
                let fs_builder =
                    opendal::services::Fs::default().root(&bucket_root.to_string_lossy());
                opendal::Operator::new(fs_builder)
                    .map_err(|e| {
                        StorageError::invalid_config(format!(
                            "Failed to create filesystem operator: {}",
                            e
                        ))
                    })?
                    .finish()
            }
            Backend::S3 { region, endpoint } => {
                let mut s3_builder = opendal::services::S3::default()
                    .bucket(bucket)
                    .region(region);

                if let Some(endpoint) = endpoint {
                    s3_builder = s3_builder.endpoint(endpoint);
                }

                opendal::Operator::new(s3_builder)
                    .map_err(|e| {
                        StorageError::invalid_config(format!("Failed to create S3 operator: {}", e))
                    })?
                    .finish()
            }
        };

        tracing::debug!(bucket, backend = ?self.backend, "Storage operator initialized");
        Ok(op)
    }
}

#[async_trait]
impl ObjectStore for OpendalStore {
    async fn download(&self, bucket: &str, key: &str, dest_dir: &Path) -> Result<PathBuf> {
        let op = self.operator(bucket)?;

        let buffer = op.read(key).await.map_err(|e| {
            if e.kind() == opendal::ErrorKind::NotFound {
                StorageError::not_found(bucket, key)
            } else {
                StorageError::transfer(bucket, key, e.to_string())
            }
        })?;

        let local_path = dest_dir.join(local_file_name(key));
        let data = buffer.to_vec();
        tokio::fs::write(&local_path, &data).await.map_err(|e| {
            StorageError::transfer(
                bucket,
                key,
                format!("Failed to save to '{}': {}", local_path.display(), e),
            )
        })?;

        tracing::info!(
            bucket,
            key,
            bytes = data.len(),
            path = %local_path.display(),
            "Downloaded source object"
        );
        Ok(local_path)
    }

    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<()> {
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::missing_local_file(local_path)
            } else {
                StorageError::transfer(
                    bucket,
                    key,
                    format!("Failed to read '{}': {}", local_path.display(), e),
                )
            }
        })?;
        let bytes = data.len();

        let op = self.operator(bucket)?;
        op.write(key, data)
            .await
            .map_err(|e| StorageError::transfer(bucket, key, e.to_string()))?;

        tracing::info!(bucket, key, bytes, "Uploaded object");
        Ok(())
    }
}

/// Last path segment of the key, so local files stay inside `dest_dir`.
fn local_file_name(key: &str) -> &str {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => "source",
    }
}

fn absolute_root(root: &Path) -> Result<PathBuf> {
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| {
        StorageError::invalid_config(format!("Failed to resolve fs root '{}': {}", root.display(), e))
    })?;
    Ok(cwd.join(root))
}
