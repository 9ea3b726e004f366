// ng2parquet-core - Platform-agnostic transform logic
//
// This crate contains the PURE processing logic for turning access-log
// lines into day-partitioned Arrow tables and Parquet bytes.
// No I/O, no async, no storage.
//
// Stages: parse (line → RawFields) → normalize (RawFields → Record)
//         → partition (Records → DayTables) → to_arrow → parquet

pub mod error;
pub mod field_names;
pub mod normalize;
pub mod parquet;
pub mod parse;
pub mod partition;
pub mod partition_key;
pub mod schema;
pub mod to_arrow;
pub mod types;

pub use error::{CoercionError, OptionsError};
pub use normalize::{
    normalize, normalize_record, parse_utc_offset, InvalidRecordPolicy, NormalizeOptions,
    Normalized, RecordError,
};
pub use parse::{parse_line, ParseOutcome, RawFields};
pub use partition::{partition, DayTable, DayTables};
pub use partition_key::{build_partition_key, day_partition_key};
pub use schema::{access_log_schema, TIME_LOCAL_COLUMN_FORMAT};
pub use to_arrow::day_table_to_record_batch;
pub use types::{DayKey, Record};

/// A coercion failure tied to its 1-based source line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line_number}: {error}")]
pub struct LineError {
    pub line_number: usize,
    #[source]
    pub error: CoercionError,
}

/// Result of transforming a whole file's lines
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub tables: DayTables,
    pub total_lines: usize,
    /// 1-based numbers of lines that did not match the grammar
    pub unmatched_lines: Vec<usize>,
    /// Lines that matched but failed coercion (only under `Collect`)
    pub rejected: Vec<LineError>,
}

/// Run parse → normalize → partition over every line of a file.
///
/// Unmatched lines are dropped before normalization and listed in
/// `unmatched_lines`. Under `InvalidRecordPolicy::FailFast` the first
/// coercion failure is returned as the error.
pub fn transform_lines<'a, I>(
    lines: I,
    options: &NormalizeOptions,
    policy: InvalidRecordPolicy,
) -> Result<TransformOutput, LineError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut total_lines = 0;
    let mut unmatched_lines = Vec::new();
    let mut matched = Vec::new();
    let mut line_numbers = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        total_lines += 1;
        let line_number = idx + 1;
        match parse_line(line) {
            ParseOutcome::Matched(fields) => {
                matched.push(fields);
                line_numbers.push(line_number);
            }
            ParseOutcome::NoMatch => {
                tracing::debug!(line_number, "Line does not match access log grammar");
                unmatched_lines.push(line_number);
            }
        }
    }

    let to_line_error = |err: RecordError| LineError {
        line_number: line_numbers[err.index],
        error: err.error,
    };

    let normalized = normalize(matched, options, policy).map_err(to_line_error)?;
    let rejected = normalized.rejected.into_iter().map(to_line_error).collect();

    Ok(TransformOutput {
        tables: partition(normalized.records),
        total_lines,
        unmatched_lines,
        rejected,
    })
}
