//! Core domain logic for BatchLedger.
//! Owns the batch lifecycle rules, the SQLite batch store and closed-batch reporting.

pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, EchoMode};
pub use model::batch::{ActiveBatch, Batch, BatchId, BatchValidationError, NewBatch};
pub use model::report::{BatchReport, ChicksInventoryEntry, FlatJoinRow, TransactionEntry};
pub use report::assembler::assemble_reports;
pub use repo::batch_repo::{BatchRepository, RepoError, RepoResult, SqliteBatchRepository};
pub use service::batch_service::{
    BatchService, Clock, ServiceError, ServiceResult, StorageKind, SystemClock,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
