//! SQLite store bootstrap and schema migration entry points.
//!
//! Connections handed out by this module have `foreign_keys=ON` and the
//! schema at `migrations::latest_version()`; the applied version lives in
//! `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the batch store.
#[derive(Debug)]
pub enum DbError {
    /// Connection, pragma or query failure outside a migration script.
    Sqlite(rusqlite::Error),
    /// The store was written by a binary with newer migrations.
    SchemaTooNew { found: u32, supported: u32 },
    /// A migration script failed; the whole migration run was rolled back.
    Migration { version: u32, source: rusqlite::Error },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "store schema v{found} is ahead of this build (supports up to v{supported})"
            ),
            Self::Migration { version, source } => {
                write!(f, "migration v{version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
