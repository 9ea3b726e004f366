// Storage addresses of the form s3://bucket/key
//
// The first path segment after the scheme is the bucket, everything after the
// following '/' is the key, kept verbatim.

use std::fmt;
use thiserror::Error;

pub const SCHEME: &str = "s3://";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address '{0}' must start with s3://")]
    MissingScheme(String),
    #[error("address '{0}' has an empty bucket name")]
    EmptyBucket(String),
    #[error("address '{0}' must name an object key")]
    EmptyKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAddress {
    pub bucket: String,
    pub key: String,
}

impl StorageAddress {
    /// Parse an address whose key may be empty (an output base location).
    pub fn parse(value: &str) -> Result<Self, AddressError> {
        let rest = value
            .strip_prefix(SCHEME)
            .ok_or_else(|| AddressError::MissingScheme(value.to_string()))?;

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(AddressError::EmptyBucket(value.to_string()));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Parse an address that must point at a single object.
    pub fn parse_object(value: &str) -> Result<Self, AddressError> {
        let address = Self::parse(value)?;
        if address.key.is_empty() {
            return Err(AddressError::EmptyKey(value.to_string()));
        }
        Ok(address)
    }

    /// Name used for every output object: the last whitespace-delimited
    /// token of the key. Slashes are not split on, so a nested key keeps its
    /// directories.
    pub fn object_name(&self) -> Option<&str> {
        self.key.split_whitespace().last()
    }
}

impl fmt::Display for StorageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", SCHEME, self.bucket, self.key)
    }
}
