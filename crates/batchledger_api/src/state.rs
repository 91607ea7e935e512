//! Shared application state handed to every handler.
//!
//! # Responsibility
//! - Own the batch store connection for the lifetime of the server.
//! - Run blocking store work off the async executor.
//!
//! # Invariants
//! - The connection is only touched while its mutex is held.
//! - Each call builds a fresh repository/service; no per-request state leaks.

use batchledger_core::{BatchService, ServiceError, ServiceResult, SqliteBatchRepository};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::task::JoinError;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// Failure of a store call made through `AppState::run`.
#[derive(Debug)]
pub enum StoreCallError {
    Service(ServiceError),
    Worker(JoinError),
}

impl Display for StoreCallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Worker(err) => write!(f, "store worker failed: {err}"),
        }
    }
}

impl Error for StoreCallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Worker(err) => Some(err),
        }
    }
}

impl From<ServiceError> for StoreCallError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl AppState {
    /// Wraps an opened, migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one batch use-case on the blocking pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, StoreCallError>
    where
        T: Send + 'static,
        F: FnOnce(&BatchService<SqliteBatchRepository<'_>>) -> ServiceResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let outcome = tokio::task::spawn_blocking(move || {
            let conn = db.lock();
            let service = BatchService::new(SqliteBatchRepository::new(&conn));
            op(&service)
        })
        .await
        .map_err(StoreCallError::Worker)?;

        outcome.map_err(StoreCallError::Service)
    }

    /// Releases the connection once every clone of the state is gone.
    ///
    /// Returns `None` while handlers or the router still hold a clone.
    pub fn into_connection(self) -> Option<Connection> {
        Arc::try_unwrap(self.db).ok().map(Mutex::into_inner)
    }
}
