//! Closed-batch reporting.
//!
//! # Responsibility
//! - Fold flat LEFT JOIN rows into nested per-batch reports.
//!
//! # Invariants
//! - Assembly is pure: no I/O, no shared state.

pub mod assembler;
