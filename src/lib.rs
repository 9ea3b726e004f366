// ng2parquet - nginx access logs in object storage to day-partitioned Parquet
//
// The binary in main.rs is a thin CLI over this library:
// address parsing, tracing/store initialization and the conversion run.

pub mod address;
mod init;
pub mod pipeline;

pub use address::{AddressError, StorageAddress};
pub use init::{init_store, init_tracing};
pub use pipeline::{run, PartitionOutcome, PartitionReport, RunReport, RunSettings};
