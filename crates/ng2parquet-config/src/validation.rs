// Configuration validation
//
// Validates that required fields are present and values are sensible

use super::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_storage_config(&config.storage)?;
    validate_transform_config(&config.transform)?;
    validate_output_config(&config.output)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    match config.backend {
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("fs storage backend requires 'fs' configuration"))?;

            if fs.root.is_empty() {
                bail!(
                    "Filesystem root is required\n\n\
                    How to fix:\n\
                      • Environment: export {}FS_ROOT=/data/buckets\n\
                      • TOML: [storage.fs]\n              root = \"/data/buckets\"",
                    ENV_PREFIX
                );
            }
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("s3 storage backend requires 's3' configuration"))?;

            if s3.region.is_empty() {
                bail!(
                    "S3 region is required\n\n\
                    How to fix:\n\
                      • Environment: export {}S3_REGION=ap-northeast-1\n\
                      • TOML: [storage.s3]\n              region = \"ap-northeast-1\"",
                    ENV_PREFIX
                );
            }

            if let Some(ref endpoint) = s3.endpoint {
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    bail!(
                        "S3 endpoint must start with http:// or https://, got: {}",
                        endpoint
                    );
                }
            }
        }
    }

    Ok(())
}

fn validate_transform_config(config: &TransformConfig) -> Result<()> {
    if parse_utc_offset(&config.utc_offset).is_err() {
        bail!(
            "transform.utc_offset '{}' is not a UTC offset\n\n\
            How to fix:\n\
              • Environment: export {}UTC_OFFSET=+09:00\n\
              • TOML: [transform]\n              utc_offset = \"+09:00\"",
            config.utc_offset,
            ENV_PREFIX
        );
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<()> {
    if config.row_group_size == 0 {
        bail!("output.row_group_size must be greater than 0");
    }

    if config.row_group_size > 10_000_000 {
        warn!(
            row_group_size = config.row_group_size,
            "output.row_group_size is very large; may cause memory issues"
        );
    }

    if let Some(ref dir) = config.work_dir {
        if dir.trim().is_empty() {
            bail!("output.work_dir must not be blank; omit it to use a temporary directory");
        }
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.to_lowercase().as_str()) {
        bail!(
            "Invalid log level '{}'. Must be one of: {}",
            config.level,
            valid_levels.join(", ")
        );
    }
    Ok(())
}
