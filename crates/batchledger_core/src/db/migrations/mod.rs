//! Ordered schema scripts for the batch store.
//!
//! Scripts are numbered from 1 and never edited once released; a schema
//! change ships as a new numbered script.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

type Script = (u32, &'static str);

const SCRIPTS: &[Script] = &[(1, include_str!("0001_init.sql"))];

/// Returns the newest schema version this build can migrate to.
pub fn latest_version() -> u32 {
    newest(SCRIPTS)
}

/// Brings the store up to `latest_version()`.
///
/// All pending scripts run inside one transaction, so a failing script
/// leaves the store at its previous version.
///
/// # Errors
/// - `DbError::SchemaTooNew` when the store is ahead of this build.
/// - `DbError::Migration` naming the script that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    run_scripts(conn, SCRIPTS)
}

fn newest(scripts: &[Script]) -> u32 {
    scripts.iter().map(|(version, _)| *version).max().unwrap_or(0)
}

fn run_scripts(conn: &mut Connection, scripts: &[Script]) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let target = newest(scripts);

    if found > target {
        return Err(DbError::SchemaTooNew {
            found,
            supported: target,
        });
    }
    let pending: Vec<&Script> = scripts.iter().filter(|(version, _)| *version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        let step = tx
            .execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version));
        if let Err(source) = step {
            error!(
                "event=db_migrate module=db status=error version={} error={}",
                version, source
            );
            return Err(DbError::Migration {
                version: *version,
                source,
            });
        }
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found, target
    );
    Ok(())
}
