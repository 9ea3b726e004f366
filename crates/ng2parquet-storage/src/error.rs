//! Error types for storage and local file operations.

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Source object does not exist
    E001NotFound,
    /// E002: Download or upload failed in transit
    E002Transfer,
    /// E003: Local file to upload does not exist
    E003MissingLocalFile,
    /// E004: Configuration missing or invalid
    E004InvalidConfig,
    /// E005: Local Parquet write failed
    E005WriteFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001NotFound => "E001",
            Self::E002Transfer => "E002",
            Self::E003MissingLocalFile => "E003",
            Self::E004InvalidConfig => "E004",
            Self::E005WriteFailure => "E005",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while moving or writing files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("[{code}] Object not found: {bucket}/{key}")]
    NotFound {
        code: ErrorCode,
        bucket: String,
        key: String,
    },

    #[error("[{code}] Transfer failed for {bucket}/{key}: {message}")]
    Transfer {
        code: ErrorCode,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("[{code}] Local file does not exist: {path}")]
    MissingLocalFile { code: ErrorCode, path: String },

    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: ErrorCode, message: String },

    #[error("[{code}] Write operation failed: {message}")]
    WriteFailure { code: ErrorCode, message: String },
}

impl StorageError {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::E001NotFound,
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn transfer(bucket: &str, key: &str, message: String) -> Self {
        Self::Transfer {
            code: ErrorCode::E002Transfer,
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        }
    }

    pub fn missing_local_file(path: &std::path::Path) -> Self {
        Self::MissingLocalFile {
            code: ErrorCode::E003MissingLocalFile,
            path: path.display().to_string(),
        }
    }

    pub fn invalid_config(message: String) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E004InvalidConfig,
            message,
        }
    }

    pub fn write_failure(message: String) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E005WriteFailure,
            message,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { code, .. }
            | Self::Transfer { code, .. }
            | Self::MissingLocalFile { code, .. }
            | Self::InvalidConfig { code, .. }
            | Self::WriteFailure { code, .. } => *code,
        }
    }
}

/// Result type alias for StorageError
pub type Result<T> = std::result::Result<T, StorageError>;
