//! Field name constants shared by the line grammar and the Arrow schema.
//!
//! The regex capture group names and the Parquet column names are the same
//! strings, so a column can always be traced back to the capture it came from.

pub const REMOTE_ADDR: &str = "remote_addr";
pub const REMOTE_USER: &str = "remote_user";
pub const TIME_LOCAL: &str = "time_local";
pub const REQUEST_METHOD: &str = "request_method";
pub const REQUEST_URL: &str = "request_url";
pub const REQUEST_PROTOCOL: &str = "request_protocol";
pub const RESPONSE_STATUS: &str = "response_status";
pub const BYTES_SENT: &str = "bytes_sent";
pub const HTTP_REFERRER: &str = "http_referrer";
pub const HTTP_USER_AGENT: &str = "http_user_agent";

/// Derived ISO-8601 rendering of `time_local` (not a capture group)
pub const DATETIME: &str = "datetime";
