use super::{FsConfig, LogFormat, RuntimeConfig, S3Config, StorageBackend};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "NG2PARQUET_";

/// Abstraction over environment-variable lookups so tests and embedders can
/// supply overrides without touching the process environment.
pub trait EnvSource {
    /// Look up `key` with the NG2PARQUET_ prefix applied.
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Storage backend
    if let Some(backend) = get_env_string(env, "STORAGE_BACKEND")? {
        config.storage.backend = backend
            .parse::<StorageBackend>()
            .context("Invalid NG2PARQUET_STORAGE_BACKEND value")?;
    }
    if let Some(root) = get_env_string(env, "FS_ROOT")? {
        ensure_fs(config).root = root;
    }
    if let Some(region) = get_env_string(env, "S3_REGION")? {
        ensure_s3(config).region = region;
    }
    if let Some(endpoint) = get_env_string(env, "S3_ENDPOINT")? {
        ensure_s3(config).endpoint = Some(endpoint);
    }

    // Transform
    if let Some(offset) = get_env_string(env, "UTC_OFFSET")? {
        config.transform.utc_offset = offset;
    }
    if let Some(policy) = get_env_string(env, "ON_INVALID_RECORD")? {
        config.transform.on_invalid_record = policy
            .parse()
            .context("Invalid NG2PARQUET_ON_INVALID_RECORD value")?;
    }

    // Output
    if let Some(compression) = get_env_string(env, "COMPRESSION")? {
        config.output.compression = compression
            .parse()
            .context("Invalid NG2PARQUET_COMPRESSION value")?;
    }
    if let Some(val) = get_env_usize(env, "ROW_GROUP_SIZE")? {
        config.output.row_group_size = val;
    }
    if let Some(dir) = get_env_string(env, "WORK_DIR")? {
        config.output.work_dir = if dir.is_empty() { None } else { Some(dir) };
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL")? {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT")? {
        config.logging.format = match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
    }

    Ok(())
}

fn ensure_fs(config: &mut RuntimeConfig) -> &mut FsConfig {
    config.storage.fs.get_or_insert_with(FsConfig::default)
}

fn ensure_s3(config: &mut RuntimeConfig) -> &mut S3Config {
    config.storage.s3.get_or_insert_with(S3Config::default)
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Result<Option<String>> {
    Ok(env.get(key))
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key)? {
        Some(val) => {
            let parsed = val
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
