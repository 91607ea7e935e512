//! Batch lifecycle and reporting use-cases.
//!
//! # Responsibility
//! - Validate input before the store is contacted.
//! - Stamp start/end dates from an injected clock.
//! - Translate repository outcomes into the validation / not-found / storage taxonomy.
//!
//! # Invariants
//! - `create_batch` with a blank name never reaches the repository.
//! - `close_batch` succeeds even when no row was affected.
//! - Service layer remains storage-agnostic.

use crate::model::batch::{validate_batch_name, ActiveBatch, BatchId, BatchValidationError, NewBatch};
use crate::model::report::BatchReport;
use crate::report::assembler::assemble_reports;
use crate::repo::batch_repo::{BatchRepository, RepoError};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Source of "now" for lifecycle timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Coarse storage failure class exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    MissingTable,
    MissingColumn,
    Other,
}

/// Use-case error taxonomy.
#[derive(Debug)]
pub enum ServiceError {
    Validation(BatchValidationError),
    NotFound(&'static str),
    Storage(RepoError),
}

impl ServiceError {
    /// Classifies a storage failure; `None` for non-storage errors.
    pub fn storage_kind(&self) -> Option<StorageKind> {
        match self {
            Self::Storage(RepoError::MissingTable(_)) => Some(StorageKind::MissingTable),
            Self::Storage(RepoError::MissingColumn(_)) => Some(StorageKind::MissingColumn),
            Self::Storage(_) => Some(StorageKind::Other),
            Self::Validation(_) | Self::NotFound(_) => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

impl From<BatchValidationError> for ServiceError {
    fn from(value: BatchValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Use-case service over an injected batch repository.
pub struct BatchService<R: BatchRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: BatchRepository> BatchService<R> {
    /// Creates a service stamping dates with the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: BatchRepository, C: Clock> BatchService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Starts a new active batch.
    ///
    /// # Contract
    /// - Blank names fail with `ServiceError::Validation` before any store access.
    /// - `start_date` is the current clock time.
    /// - Returns the store-assigned batch id.
    pub fn create_batch(&self, batch_name: &str) -> ServiceResult<BatchId> {
        if let Err(err) = validate_batch_name(batch_name) {
            warn!("event=batch_create module=service status=rejected reason=empty_name");
            return Err(err.into());
        }

        let batch = NewBatch::new(batch_name, self.clock.now());
        match self.repo.insert_batch(&batch) {
            Ok(batch_id) => {
                info!("event=batch_create module=service status=ok batch_id={batch_id}");
                Ok(batch_id)
            }
            Err(err) => {
                error!("event=batch_create module=service status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Closes a batch by id.
    ///
    /// Closing an unknown or already-closed batch is not an error; the
    /// zero-row outcome is only logged.
    pub fn close_batch(&self, batch_id: BatchId) -> ServiceResult<()> {
        match self.repo.close_batch(batch_id, self.clock.now()) {
            Ok(0) => {
                warn!(
                    "event=batch_close module=service status=ok batch_id={batch_id} affected=0"
                );
                Ok(())
            }
            Ok(affected) => {
                info!(
                    "event=batch_close module=service status=ok batch_id={batch_id} affected={affected}"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=batch_close module=service status=error batch_id={batch_id} error={err}"
                );
                Err(err.into())
            }
        }
    }

    /// Returns the active batch with the latest start date.
    ///
    /// # Errors
    /// - `ServiceError::NotFound` when no batch is active.
    pub fn last_active_batch(&self) -> ServiceResult<ActiveBatch> {
        match self.repo.last_active_batch() {
            Ok(Some(batch)) => Ok(batch),
            Ok(None) => {
                info!("event=batch_last_active module=service status=not_found");
                Err(ServiceError::NotFound("active batch"))
            }
            Err(err) => {
                error!("event=batch_last_active module=service status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Builds nested reports for every closed batch.
    ///
    /// Always returns a list; no closed batches yields an empty one.
    pub fn inactive_batch_reports(&self) -> ServiceResult<Vec<BatchReport>> {
        let started_at = Instant::now();
        let rows = match self.repo.inactive_report_rows() {
            Ok(rows) => rows,
            Err(err) => {
                error!("event=batch_report module=service status=error error={err}");
                return Err(err.into());
            }
        };

        let row_count = rows.len();
        let reports = assemble_reports(rows);
        info!(
            "event=batch_report module=service status=ok rows={} batches={} duration_ms={}",
            row_count,
            reports.len(),
            started_at.elapsed().as_millis()
        );
        Ok(reports)
    }
}
