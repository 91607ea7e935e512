//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow batch store contract used by services.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Missing tables/columns are reported as distinct error variants so
//!   callers can classify schema mismatches without parsing messages.

pub mod batch_repo;
