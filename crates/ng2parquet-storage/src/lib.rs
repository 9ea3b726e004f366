// ng2parquet-storage - Object store transfers and local Parquet files
//
// The only crate that touches storage. The core crate produces RecordBatches;
// this crate writes them to local Parquet files and moves files between the
// local disk and buckets through OpenDAL.

pub mod error;
pub mod store;
pub mod table_writer;

pub use error::{ErrorCode, Result, StorageError};
pub use store::{ObjectStore, OpendalStore};
pub use table_writer::{write_table, WrittenTable};
