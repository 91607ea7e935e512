use batchledger_core::{assemble_reports, FlatJoinRow};
use chrono::{TimeZone, Utc};

fn batch_row(batch_id: i64) -> FlatJoinRow {
    FlatJoinRow {
        batch_id,
        batch_name: format!("cycle {batch_id}"),
        start_date: Utc.with_ymd_and_hms(2024, 1, batch_id as u32, 6, 0, 0).unwrap(),
        end_date: Some(Utc.with_ymd_and_hms(2024, 2, batch_id as u32, 6, 0, 0).unwrap()),
        ..FlatJoinRow::default()
    }
}

fn joined(batch_id: i64, transaction_id: Option<i64>, chicks_inv_id: Option<i64>) -> FlatJoinRow {
    let mut row = batch_row(batch_id);
    if let Some(id) = transaction_id {
        row.transaction_id = Some(id);
        row.item_name = Some(format!("item {id}"));
        row.quantity = Some(id as f64);
        row.total_cost = Some(id as f64 * 2.5);
    }
    if let Some(id) = chicks_inv_id {
        row.chicks_inv_id = Some(id);
        row.mortality = Some(id % 4);
    }
    row
}

fn transaction_ids(rows: &[FlatJoinRow]) -> Vec<Vec<i64>> {
    assemble_reports(rows.to_vec())
        .iter()
        .map(|report| {
            report
                .transactions
                .iter()
                .map(|t| t.transaction_id)
                .collect()
        })
        .collect()
}

#[test]
fn cross_product_collapses_to_distinct_children() {
    let mut rows = Vec::new();
    for transaction_id in [11, 12] {
        for inventory_id in [21, 22, 23] {
            rows.push(joined(1, Some(transaction_id), Some(inventory_id)));
        }
    }

    let reports = assemble_reports(rows);

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.batch_id, 1);
    assert_eq!(report.batch_name, "cycle 1");
    let transactions: Vec<_> = report.transactions.iter().map(|t| t.transaction_id).collect();
    assert_eq!(transactions, vec![11, 12]);
    let inventory: Vec<_> = report.chicks_inv.iter().map(|c| c.id).collect();
    assert_eq!(inventory, vec![21, 22, 23]);
    assert_eq!(report.transactions[1].item_name.as_deref(), Some("item 12"));
    assert_eq!(report.transactions[1].total_cost, Some(30.0));
}

#[test]
fn child_order_follows_first_appearance_not_id() {
    let rows = vec![
        joined(1, Some(9), Some(30)),
        joined(1, Some(3), Some(30)),
        joined(1, Some(9), Some(10)),
        joined(1, Some(3), Some(10)),
    ];

    let reports = assemble_reports(rows);

    let transactions: Vec<_> = reports[0].transactions.iter().map(|t| t.transaction_id).collect();
    assert_eq!(transactions, vec![9, 3]);
    let inventory: Vec<_> = reports[0].chicks_inv.iter().map(|c| c.id).collect();
    assert_eq!(inventory, vec![30, 10]);
}

#[test]
fn missing_side_of_join_yields_empty_collection() {
    let rows = vec![joined(5, Some(1), None), joined(5, Some(2), None)];

    let reports = assemble_reports(rows);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].transactions.len(), 2);
    assert!(reports[0].chicks_inv.is_empty());

    let inventory_only = assemble_reports(vec![joined(6, None, Some(1)), joined(6, None, Some(2))]);
    assert!(inventory_only[0].transactions.is_empty());
    assert_eq!(inventory_only[0].chicks_inv.len(), 2);
}

#[test]
fn batches_keep_first_seen_order_when_interleaved() {
    let rows = vec![
        joined(7, Some(1), None),
        joined(2, Some(2), None),
        joined(7, Some(3), None),
        joined(4, None, None),
        joined(2, Some(4), None),
    ];

    let reports = assemble_reports(rows.clone());

    let order: Vec<_> = reports.iter().map(|r| r.batch_id).collect();
    assert_eq!(order, vec![7, 2, 4]);
    assert_eq!(transaction_ids(&rows), vec![vec![1, 3], vec![2, 4], vec![]]);
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(assemble_reports(Vec::<FlatJoinRow>::new()).is_empty());
}

#[test]
fn report_serializes_in_nested_snake_case_shape() {
    let reports = assemble_reports(vec![joined(3, Some(8), Some(2))]);

    let json = serde_json::to_value(&reports).unwrap();
    let report = &json[0];
    assert_eq!(report["batch_id"], 3);
    assert_eq!(report["batch_name"], "cycle 3");
    assert_eq!(report["start_date"], "2024-01-03T06:00:00Z");
    assert_eq!(report["transactions"][0]["transaction_id"], 8);
    assert_eq!(report["transactions"][0]["item_name"], "item 8");
    assert_eq!(report["chicks_inv"][0], serde_json::json!({ "id": 2, "mortality": 2 }));
}
