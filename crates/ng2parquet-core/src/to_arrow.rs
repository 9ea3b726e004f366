// Convert day tables to Arrow RecordBatches
//
// One builder per column, filled row by row and finished together so every
// column has the same length as the table.

use arrow::array::{ArrayRef, Int64Builder, RecordBatch, StringBuilder};
use arrow::error::ArrowError;
use std::sync::Arc;

use crate::partition::DayTable;
use crate::schema::{access_log_schema, TIME_LOCAL_COLUMN_FORMAT};
use crate::types::Record;

/// Builds the access-log columns for a run of records
pub struct ArrowConverter {
    remote_addr_builder: StringBuilder,
    remote_user_builder: StringBuilder,
    time_local_builder: StringBuilder,
    request_method_builder: StringBuilder,
    request_url_builder: StringBuilder,
    request_protocol_builder: StringBuilder,
    response_status_builder: Int64Builder,
    bytes_sent_builder: Int64Builder,
    http_referrer_builder: StringBuilder,
    http_user_agent_builder: StringBuilder,
    datetime_builder: StringBuilder,
}

impl ArrowConverter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            remote_addr_builder: StringBuilder::with_capacity(capacity, capacity * 16),
            remote_user_builder: StringBuilder::with_capacity(capacity, capacity * 4),
            time_local_builder: StringBuilder::with_capacity(capacity, capacity * 19),
            request_method_builder: StringBuilder::with_capacity(capacity, capacity * 4),
            request_url_builder: StringBuilder::with_capacity(capacity, capacity * 64),
            request_protocol_builder: StringBuilder::with_capacity(capacity, capacity * 8),
            response_status_builder: Int64Builder::with_capacity(capacity),
            bytes_sent_builder: Int64Builder::with_capacity(capacity),
            http_referrer_builder: StringBuilder::with_capacity(capacity, capacity * 32),
            http_user_agent_builder: StringBuilder::with_capacity(capacity, capacity * 128),
            datetime_builder: StringBuilder::with_capacity(capacity, capacity * 25),
        }
    }

    pub fn append(&mut self, record: &Record) {
        self.remote_addr_builder.append_value(&record.remote_addr);
        self.remote_user_builder.append_value(&record.remote_user);
        self.time_local_builder.append_value(
            record
                .time_local
                .format(TIME_LOCAL_COLUMN_FORMAT)
                .to_string(),
        );
        self.request_method_builder
            .append_value(&record.request_method);
        self.request_url_builder.append_value(&record.request_url);
        self.request_protocol_builder
            .append_value(&record.request_protocol);
        self.response_status_builder
            .append_value(record.response_status);
        self.bytes_sent_builder.append_value(record.bytes_sent);
        self.http_referrer_builder
            .append_value(&record.http_referrer);
        self.http_user_agent_builder
            .append_value(&record.http_user_agent);
        self.datetime_builder.append_value(&record.datetime);
    }

    pub fn finish(mut self) -> Result<RecordBatch, ArrowError> {
        let schema = access_log_schema();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.remote_addr_builder.finish()),
            Arc::new(self.remote_user_builder.finish()),
            Arc::new(self.time_local_builder.finish()),
            Arc::new(self.request_method_builder.finish()),
            Arc::new(self.request_url_builder.finish()),
            Arc::new(self.request_protocol_builder.finish()),
            Arc::new(self.response_status_builder.finish()),
            Arc::new(self.bytes_sent_builder.finish()),
            Arc::new(self.http_referrer_builder.finish()),
            Arc::new(self.http_user_agent_builder.finish()),
            Arc::new(self.datetime_builder.finish()),
        ];

        RecordBatch::try_new(schema, columns)
    }
}

/// Convert one day table into a RecordBatch.
pub fn day_table_to_record_batch(table: &DayTable) -> Result<RecordBatch, ArrowError> {
    let mut converter = ArrowConverter::with_capacity(table.len());
    for record in table.records() {
        converter.append(record);
    }
    converter.finish()
}
