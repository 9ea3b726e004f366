// Parquet encoding for access-log batches

pub mod writer;

pub use writer::{
    write_parquet, write_parquet_into, writer_properties, ParquetCompression, WriterOptions,
    DEFAULT_ROW_GROUP_SIZE,
};
