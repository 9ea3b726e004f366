// ng2parquet-config - Runtime configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from --config or NG2PARQUET_CONFIG
// 3. Config file contents from NG2PARQUET_CONFIG_CONTENT
// 4. Default config file locations (./config.toml, ./.ng2parquet.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use ng2parquet_core::parquet::{ParquetCompression, WriterOptions, DEFAULT_ROW_GROUP_SIZE};
use ng2parquet_core::{parse_utc_offset, InvalidRecordPolicy, NormalizeOptions};
use serde::{Deserialize, Serialize};

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub transform: TransformConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            fs: None,
            s3: Some(S3Config::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Fs,
    S3,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fs" | "filesystem" => Ok(StorageBackend::Fs),
            "s3" | "aws" => Ok(StorageBackend::S3),
            _ => anyhow::bail!("Unsupported storage backend: {}. Supported: fs, s3", s),
        }
    }
}

/// Filesystem backend: bucket `b` maps to the directory `{root}/b`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsConfig {
    pub root: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: "./data".to_string(),
        }
    }
}

/// S3 backend; the bucket comes from each storage address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
        }
    }
}

/// Record handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Offset applied to every `time_local`, e.g. "+09:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default)]
    pub on_invalid_record: RecordPolicy,
}

fn default_utc_offset() -> String {
    "+09:00".to_string()
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
            on_invalid_record: RecordPolicy::default(),
        }
    }
}

impl TransformConfig {
    pub fn normalize_options(&self) -> Result<NormalizeOptions> {
        let offset = parse_utc_offset(&self.utc_offset)
            .with_context(|| "transform.utc_offset is not a valid offset")?;
        Ok(NormalizeOptions::with_utc_offset(offset))
    }

    pub fn invalid_record_policy(&self) -> InvalidRecordPolicy {
        match self.on_invalid_record {
            RecordPolicy::Fail => InvalidRecordPolicy::FailFast,
            RecordPolicy::Skip => InvalidRecordPolicy::Collect,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// Abort the run on the first record that fails coercion
    #[default]
    Fail,
    /// Drop such records, report them, publish the rest
    Skip,
}

impl std::str::FromStr for RecordPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(RecordPolicy::Fail),
            "skip" => Ok(RecordPolicy::Skip),
            _ => anyhow::bail!("Unsupported invalid-record policy: {}. Supported: fail, skip", s),
        }
    }
}

/// Parquet output and local scratch files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub compression: Compression,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
    /// Keep local files in this directory instead of a temporary one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
}

fn default_row_group_size() -> usize {
    DEFAULT_ROW_GROUP_SIZE
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: default_row_group_size(),
            work_dir: None,
        }
    }
}

impl OutputConfig {
    pub fn writer_options(&self) -> WriterOptions {
        let compression = match self.compression {
            Compression::Snappy => ParquetCompression::Snappy,
            Compression::Zstd => ParquetCompression::Zstd,
            Compression::None => ParquetCompression::Uncompressed,
        };
        WriterOptions {
            compression,
            max_row_group_size: self.row_group_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    None,
}

impl std::str::FromStr for Compression {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "snappy" => Ok(Compression::Snappy),
            "zstd" => Ok(Compression::Zstd),
            "none" | "uncompressed" => Ok(Compression::None),
            _ => anyhow::bail!("Unsupported compression: {}. Supported: snappy, zstd, none", s),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl RuntimeConfig {
    /// Load configuration from a specific file path (for the --config flag).
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Load configuration with graceful fallback to defaults.
    /// Does not fail if no config file exists.
    pub fn load_or_default() -> Result<Self> {
        sources::load_or_default()
    }

    /// Build a configuration from inline TOML plus overrides supplied by an
    /// `EnvSource`. Used by tests and embedders that do not read host env.
    pub fn load_with_env<E: EnvSource>(inline_config: Option<&str>, env: &E) -> Result<Self> {
        let mut config = match inline_config {
            Some(inline) => {
                toml::from_str(inline).context("Failed to parse inline config content")?
            }
            None => RuntimeConfig::default(),
        };

        config.apply_env_overrides_from(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("fs".parse::<StorageBackend>().unwrap(), StorageBackend::Fs);
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "filesystem".parse::<StorageBackend>().unwrap(),
            StorageBackend::Fs
        );
        assert_eq!("aws".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert!("r2".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_configs() {
        let config = RuntimeConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.transform.utc_offset, "+09:00");
        assert_eq!(config.transform.on_invalid_record, RecordPolicy::Fail);
        assert_eq!(config.output.compression, Compression::Snappy);
        assert_eq!(config.output.row_group_size, DEFAULT_ROW_GROUP_SIZE);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            [storage]
            backend = "fs"

            [storage.fs]
            root = "/srv/logs"

            [transform]
            utc_offset = "+00:00"
            on_invalid_record = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Fs);
        assert_eq!(config.storage.fs.as_ref().unwrap().root, "/srv/logs");
        assert_eq!(config.transform.on_invalid_record, RecordPolicy::Skip);
        assert_eq!(config.output.row_group_size, DEFAULT_ROW_GROUP_SIZE);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_sections_with_only_some_keys() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            [transform]
            on_invalid_record = "skip"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.transform.utc_offset, "+09:00");
        assert_eq!(config.transform.on_invalid_record, RecordPolicy::Skip);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());

        let config: RuntimeConfig = toml::from_str("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_resolves_core_options() {
        let mut config = RuntimeConfig::default();
        config.transform.utc_offset = "-0500".to_string();
        config.transform.on_invalid_record = RecordPolicy::Skip;
        config.output.compression = Compression::Zstd;

        let options = config.transform.normalize_options().unwrap();
        assert_eq!(options.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(
            config.transform.invalid_record_policy(),
            InvalidRecordPolicy::Collect
        );
        assert_eq!(
            config.output.writer_options().compression,
            ParquetCompression::Zstd
        );
    }
}
