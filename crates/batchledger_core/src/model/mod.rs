//! Domain model for production batches and their closing reports.
//!
//! # Responsibility
//! - Define the persisted batch record and its creation input.
//! - Define the flat join row and the nested report derived from it.
//!
//! # Invariants
//! - A batch is identified by a store-assigned `BatchId`.
//! - Reports are derived in memory and never persisted.

pub mod batch;
pub mod report;
