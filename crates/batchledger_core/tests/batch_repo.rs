use batchledger_core::db::open_db_in_memory;
use batchledger_core::{BatchRepository, NewBatch, RepoError, SqliteBatchRepository};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection};
use std::collections::HashSet;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

fn insert_transaction(conn: &Connection, batch_id: i64, item_name: &str, total_cost: f64) -> i64 {
    conn.execute(
        "INSERT INTO transactions (
            batch_id, transaction_date, transaction_type, contact_name,
            item_type, item_name, quantity, price_per_unit, total_cost
        ) VALUES (?1, '2024-03-02', 'purchase', 'Feed Co', 'feed', ?2, 2.0, ?3 / 2.0, ?3);",
        params![batch_id, item_name, total_cost],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn insert_inventory(conn: &Connection, batch_id: i64, mortality: i64) -> i64 {
    conn.execute(
        "INSERT INTO chicks_inv (batch_id, item_type, item_name, date, amount_left, mortality)
         VALUES (?1, 'chicks', 'broiler', '2024-03-03', 100, ?2);",
        params![batch_id, mortality],
    )
    .unwrap();
    conn.last_insert_rowid()
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let id = repo.insert_batch(&NewBatch::new("Broilers A", at(8))).unwrap();

    let loaded = repo.get_batch(id).unwrap().unwrap();
    assert_eq!(loaded.batch_id, id);
    assert_eq!(loaded.batch_name, "Broilers A");
    assert_eq!(loaded.start_date, at(8));
    assert_eq!(loaded.end_date, None);
    assert!(loaded.is_active);
}

#[test]
fn inserted_ids_are_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let ids: HashSet<i64> = (0..5)
        .map(|n| {
            repo.insert_batch(&NewBatch::new(format!("batch {n}"), at(n)))
                .unwrap()
        })
        .collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn blank_name_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let err = repo.insert_batch(&NewBatch::new("   ", at(8))).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM batch;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn close_sets_end_date_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);
    let id = repo.insert_batch(&NewBatch::new("Layers", at(6))).unwrap();

    assert_eq!(repo.close_batch(id, at(18)).unwrap(), 1);
    assert_eq!(repo.close_batch(id, at(19)).unwrap(), 1);

    let closed = repo.get_batch(id).unwrap().unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.end_date, Some(at(19)));
}

#[test]
fn close_unknown_batch_affects_no_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    assert_eq!(repo.close_batch(404, at(10)).unwrap(), 0);
}

#[test]
fn last_active_batch_picks_latest_start_among_active() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    assert_eq!(repo.last_active_batch().unwrap(), None);

    let early = repo.insert_batch(&NewBatch::new("early", at(1))).unwrap();
    let late = repo.insert_batch(&NewBatch::new("late", at(9))).unwrap();
    let _middle = repo.insert_batch(&NewBatch::new("middle", at(5))).unwrap();

    assert_eq!(repo.last_active_batch().unwrap().unwrap().batch_id, late);

    repo.close_batch(late, at(10)).unwrap();
    let current = repo.last_active_batch().unwrap().unwrap();
    assert_eq!(current.batch_name, "middle");

    repo.close_batch(current.batch_id, at(11)).unwrap();
    assert_eq!(repo.last_active_batch().unwrap().unwrap().batch_id, early);
}

#[test]
fn report_rows_cover_only_closed_batches() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let open = repo.insert_batch(&NewBatch::new("open", at(1))).unwrap();
    let closed = repo.insert_batch(&NewBatch::new("closed", at(2))).unwrap();
    insert_transaction(&conn, open, "feed", 40.0);
    repo.close_batch(closed, at(3)).unwrap();

    let rows = repo.inactive_report_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].batch_id, closed);
    assert_eq!(rows[0].end_date, Some(at(3)));
    assert_eq!(rows[0].transaction_id, None);
    assert_eq!(rows[0].chicks_inv_id, None);
}

#[test]
fn report_rows_form_cross_product_of_children() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let id = repo.insert_batch(&NewBatch::new("cycle", at(1))).unwrap();
    insert_transaction(&conn, id, "feed", 40.0);
    insert_transaction(&conn, id, "vaccine", 12.5);
    insert_inventory(&conn, id, 2);
    insert_inventory(&conn, id, 0);
    insert_inventory(&conn, id, 7);
    repo.close_batch(id, at(20)).unwrap();

    let rows = repo.inactive_report_rows().unwrap();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|row| row.batch_name == "cycle"));
    assert_eq!(rows[0].item_name.as_deref(), Some("feed"));
    assert_eq!(rows[0].transaction_type.as_deref(), Some("purchase"));
    assert_eq!(rows[0].total_cost, Some(40.0));
    assert_eq!(rows[0].transaction_date.as_deref(), Some("2024-03-02"));
}

#[test]
fn report_rows_keep_transaction_datetime_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let id = repo.insert_batch(&NewBatch::new("timed", at(1))).unwrap();
    conn.execute(
        "INSERT INTO transactions (batch_id, transaction_date, item_name)
         VALUES (?1, '2024-01-02 10:30:00', 'feed');",
        params![id],
    )
    .unwrap();
    repo.close_batch(id, at(5)).unwrap();

    let rows = repo.inactive_report_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].transaction_date.as_deref(),
        Some("2024-01-02 10:30:00")
    );
}

#[test]
fn missing_table_is_classified() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE chicks_inv;").unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let err = repo.inactive_report_rows().unwrap_err();
    assert!(matches!(err, RepoError::MissingTable(ref name) if name == "chicks_inv"));
}

#[test]
fn invalid_active_flag_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO batch (batch_name, start_date, is_active)
         VALUES ('broken', '2024-03-01 00:00:00+00:00', 7);",
    )
    .unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let err = repo.get_batch(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
