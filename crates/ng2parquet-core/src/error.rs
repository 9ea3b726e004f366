//! Error types for record normalization

use thiserror::Error;

/// A matched line whose fields cannot be converted to their semantic types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// `time_local` does not follow `%d/%b/%Y:%H:%M:%S` (plus optional zone)
    #[error("invalid time_local '{value}': {reason}")]
    TimeLocal { value: String, reason: String },

    /// An integer column held something other than an in-range digit string
    #[error("invalid {field} '{value}': {reason}")]
    Integer {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl CoercionError {
    /// Name of the column that failed to coerce
    pub fn field(&self) -> &'static str {
        match self {
            Self::TimeLocal { .. } => crate::field_names::TIME_LOCAL,
            Self::Integer { field, .. } => field,
        }
    }
}

/// Errors raised while configuring the transform itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("invalid UTC offset '{0}': expected +HH:MM or +HHMM")]
    InvalidUtcOffset(String),
}
