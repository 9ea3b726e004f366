// Initialization utilities
//
// Storage backend and logging/tracing setup

use anyhow::{Context, Result};
use ng2parquet_config::{LogFormat, LoggingConfig, RuntimeConfig, StorageBackend};
use ng2parquet_storage::OpendalStore;
use tracing::info;

/// Build the object store described by the storage section
pub fn init_store(config: &RuntimeConfig) -> Result<OpendalStore> {
    info!(
        "Initializing object store with backend: {}",
        config.storage.backend
    );

    match config.storage.backend {
        StorageBackend::Fs => {
            if let Some(fs) = config.storage.fs.as_ref() {
                info!("Using filesystem buckets under: {}", fs.root);
            }
        }
        StorageBackend::S3 => {
            if let Some(s3) = config.storage.s3.as_ref() {
                info!(
                    region = %s3.region,
                    endpoint = s3.endpoint.as_deref().unwrap_or("default"),
                    "Using S3 storage"
                );
            }
        }
    }

    OpendalStore::from_config(&config.storage).context("Failed to initialize object store")
}

/// Initialize tracing/logging from the logging section
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Ignore the error if a subscriber is already set (idempotent)
    let _ = match config.format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
        }
        LogFormat::Text => tracing::subscriber::set_global_default(registry.with(fmt::layer())),
    };
}
