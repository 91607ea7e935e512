//! Batch repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert, close and look up batches in the `batch` table.
//! - Run the closed-batch report join and map its rows.
//!
//! # Invariants
//! - `insert_batch` calls `NewBatch::validate()` before touching SQL.
//! - `close_batch` reports affected rows and never fails on zero.
//! - Report rows are ordered by batch, transaction and inventory id.

use crate::db::DbError;
use crate::model::batch::{ActiveBatch, Batch, BatchId, BatchValidationError, NewBatch};
use crate::model::report::FlatJoinRow;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const INACTIVE_REPORT_SQL: &str = "SELECT
    b.batch_id,
    b.batch_name,
    b.start_date,
    b.end_date,
    t.transaction_id,
    t.transaction_date,
    t.transaction_type,
    t.contact_name,
    t.item_type,
    t.item_name,
    t.quantity,
    t.price_per_unit,
    t.total_cost,
    ci.id AS chicks_inv_id,
    ci.mortality
FROM batch b
LEFT JOIN transactions t ON b.batch_id = t.batch_id
LEFT JOIN chicks_inv ci ON b.batch_id = ci.batch_id
WHERE b.is_active = 0
ORDER BY b.batch_id ASC, t.transaction_id ASC, ci.id ASC;";

const NO_SUCH_TABLE: &str = "no such table: ";
const NO_SUCH_COLUMN: &str = "no such column: ";
const NO_COLUMN_NAMED: &str = "has no column named ";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for batch persistence and report queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(BatchValidationError),
    Db(DbError),
    MissingTable(String),
    MissingColumn(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingColumn(column) => write!(f, "required column `{column}` is missing"),
            Self::InvalidData(message) => write!(f, "invalid persisted batch data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingTable(_) | Self::MissingColumn(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<BatchValidationError> for RepoError {
    fn from(value: BatchValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        classify_sqlite_error(value)
    }
}

/// Narrow batch store interface consumed by `BatchService`.
pub trait BatchRepository {
    /// Persists a new active batch and returns its store-assigned id.
    fn insert_batch(&self, batch: &NewBatch) -> RepoResult<BatchId>;
    /// Marks a batch inactive with the given end date; returns affected rows.
    fn close_batch(&self, batch_id: BatchId, end_date: DateTime<Utc>) -> RepoResult<usize>;
    /// Returns the active batch with the most recent start date.
    fn last_active_batch(&self) -> RepoResult<Option<ActiveBatch>>;
    /// Returns the flat batch x transactions x chicks_inv join for closed batches.
    fn inactive_report_rows(&self) -> RepoResult<Vec<FlatJoinRow>>;
    fn get_batch(&self, batch_id: BatchId) -> RepoResult<Option<Batch>>;
}

impl<R: BatchRepository + ?Sized> BatchRepository for &R {
    fn insert_batch(&self, batch: &NewBatch) -> RepoResult<BatchId> {
        (**self).insert_batch(batch)
    }

    fn close_batch(&self, batch_id: BatchId, end_date: DateTime<Utc>) -> RepoResult<usize> {
        (**self).close_batch(batch_id, end_date)
    }

    fn last_active_batch(&self) -> RepoResult<Option<ActiveBatch>> {
        (**self).last_active_batch()
    }

    fn inactive_report_rows(&self) -> RepoResult<Vec<FlatJoinRow>> {
        (**self).inactive_report_rows()
    }

    fn get_batch(&self, batch_id: BatchId) -> RepoResult<Option<Batch>> {
        (**self).get_batch(batch_id)
    }
}

/// SQLite-backed batch repository.
pub struct SqliteBatchRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBatchRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BatchRepository for SqliteBatchRepository<'_> {
    fn insert_batch(&self, batch: &NewBatch) -> RepoResult<BatchId> {
        batch.validate()?;

        self.conn.execute(
            "INSERT INTO batch (batch_name, start_date, is_active) VALUES (?1, ?2, 1);",
            params![batch.batch_name.as_str(), batch.start_date],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn close_batch(&self, batch_id: BatchId, end_date: DateTime<Utc>) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE batch SET is_active = 0, end_date = ?1 WHERE batch_id = ?2;",
            params![end_date, batch_id],
        )?;
        Ok(changed)
    }

    fn last_active_batch(&self) -> RepoResult<Option<ActiveBatch>> {
        let batch = self
            .conn
            .query_row(
                "SELECT batch_id, batch_name
                 FROM batch
                 WHERE is_active = 1
                 ORDER BY start_date DESC, batch_id DESC
                 LIMIT 1;",
                [],
                |row| {
                    Ok(ActiveBatch {
                        batch_id: row.get("batch_id")?,
                        batch_name: row.get("batch_name")?,
                    })
                },
            )
            .optional()?;
        Ok(batch)
    }

    fn inactive_report_rows(&self) -> RepoResult<Vec<FlatJoinRow>> {
        let mut stmt = self.conn.prepare(INACTIVE_REPORT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut flat_rows = Vec::new();

        while let Some(row) = rows.next()? {
            flat_rows.push(parse_join_row(row)?);
        }

        Ok(flat_rows)
    }

    fn get_batch(&self, batch_id: BatchId) -> RepoResult<Option<Batch>> {
        let mut stmt = self.conn.prepare(
            "SELECT batch_id, batch_name, start_date, end_date, is_active
             FROM batch
             WHERE batch_id = ?1;",
        )?;

        let mut rows = stmt.query([batch_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_batch_row(row)?));
        }

        Ok(None)
    }
}

fn parse_batch_row(row: &Row<'_>) -> RepoResult<Batch> {
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in batch.is_active"
            )));
        }
    };

    Ok(Batch {
        batch_id: row.get("batch_id")?,
        batch_name: row.get("batch_name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_active,
    })
}

fn parse_join_row(row: &Row<'_>) -> RepoResult<FlatJoinRow> {
    Ok(FlatJoinRow {
        batch_id: row.get("batch_id")?,
        batch_name: row.get("batch_name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        transaction_id: row.get("transaction_id")?,
        transaction_date: row.get("transaction_date")?,
        transaction_type: row.get("transaction_type")?,
        contact_name: row.get("contact_name")?,
        item_type: row.get("item_type")?,
        item_name: row.get("item_name")?,
        quantity: row.get("quantity")?,
        price_per_unit: row.get("price_per_unit")?,
        total_cost: row.get("total_cost")?,
        chicks_inv_id: row.get("chicks_inv_id")?,
        mortality: row.get("mortality")?,
    })
}

/// Maps SQLite "object not found" failures onto dedicated variants.
///
/// SQLite reports both cases with the generic `SQLITE_ERROR` code, so the
/// engine message is the only discriminator.
fn classify_sqlite_error(err: rusqlite::Error) -> RepoError {
    let message = err.to_string();
    if let Some(name) = object_name_after(&message, NO_SUCH_TABLE) {
        return RepoError::MissingTable(name);
    }
    if let Some(name) = object_name_after(&message, NO_SUCH_COLUMN)
        .or_else(|| object_name_after(&message, NO_COLUMN_NAMED))
    {
        return RepoError::MissingColumn(name);
    }
    RepoError::Db(DbError::Sqlite(err))
}

fn object_name_after(message: &str, marker: &str) -> Option<String> {
    let start = message.find(marker)? + marker.len();
    let name = message[start..]
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default();
    Some(name.to_string())
}
