// Arrow schema for one day of access-log records
//
// Column order follows the log line, with the derived `datetime` last. The
// day key is partitioning metadata and never becomes a column.

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::collections::HashMap;
use std::sync::Arc;

use crate::field_names as field;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Rendering of `time_local` in the output column, wall-clock time without offset
pub const TIME_LOCAL_COLUMN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the access-log schema
pub fn access_log_schema() -> SchemaRef {
    let fields = vec![
        Field::new(field::REMOTE_ADDR, DataType::Utf8, false),
        Field::new(field::REMOTE_USER, DataType::Utf8, false),
        Field::new(field::TIME_LOCAL, DataType::Utf8, false),
        Field::new(field::REQUEST_METHOD, DataType::Utf8, false),
        Field::new(field::REQUEST_URL, DataType::Utf8, false),
        Field::new(field::REQUEST_PROTOCOL, DataType::Utf8, false),
        Field::new(field::RESPONSE_STATUS, DataType::Int64, false),
        Field::new(field::BYTES_SENT, DataType::Int64, false),
        Field::new(field::HTTP_REFERRER, DataType::Utf8, false),
        Field::new(field::HTTP_USER_AGENT, DataType::Utf8, false),
        Field::new(field::DATETIME, DataType::Utf8, false),
    ];

    let metadata = HashMap::from([(
        "ng2parquet.schema_version".to_string(),
        SCHEMA_VERSION.to_string(),
    )]);

    Arc::new(Schema::new_with_metadata(fields, metadata))
}
