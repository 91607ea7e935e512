//! Batch domain model.
//!
//! # Responsibility
//! - Define the canonical batch record and the lightweight active projection.
//! - Validate user-supplied input before it reaches the store.
//!
//! # Invariants
//! - `batch_name` is never empty or whitespace-only once persisted.
//! - `is_active == true` implies `end_date == None` for batches created here.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned batch identity.
pub type BatchId = i64;

/// Persisted production cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub batch_id: BatchId,
    pub batch_name: String,
    pub start_date: DateTime<Utc>,
    /// Set when the batch is closed.
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Input for creating a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBatch {
    pub batch_name: String,
    pub start_date: DateTime<Utc>,
}

impl NewBatch {
    pub fn new(batch_name: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            batch_name: batch_name.into(),
            start_date,
        }
    }

    /// Checks that the batch can be persisted.
    ///
    /// # Errors
    /// - `BatchValidationError::EmptyName` when the name is empty after trimming.
    pub fn validate(&self) -> Result<(), BatchValidationError> {
        validate_batch_name(&self.batch_name)
    }
}

/// Projection returned by the "last active batch" lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBatch {
    pub batch_id: BatchId,
    pub batch_name: String,
}

/// Input validation failure for batch writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchValidationError {
    EmptyName,
}

impl Display for BatchValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "batch name is required"),
        }
    }
}

impl Error for BatchValidationError {}

/// Validates a user-supplied batch name.
pub fn validate_batch_name(name: &str) -> Result<(), BatchValidationError> {
    if name.trim().is_empty() {
        return Err(BatchValidationError::EmptyName);
    }
    Ok(())
}
