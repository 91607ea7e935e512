//! Report assembler for the closed-batch view.
//!
//! # Responsibility
//! - Group flat join rows by `batch_id` into `BatchReport`s.
//! - Collapse the transaction x inventory cross product back to distinct children.
//!
//! # Invariants
//! - Reports come out in the order their batch was first seen in the input.
//! - Children keep first-appearance order and appear once per primary key.
//! - Batches absent from the input never appear in the output.

use crate::model::batch::BatchId;
use crate::model::report::{BatchReport, FlatJoinRow};
use std::collections::{HashMap, HashSet};

/// Insertion-ordered map from batch id to its report under construction.
#[derive(Debug, Default)]
struct ReportTable {
    reports: Vec<PendingReport>,
    index: HashMap<BatchId, usize>,
}

#[derive(Debug)]
struct PendingReport {
    report: BatchReport,
    seen_transactions: HashSet<i64>,
    seen_inventory: HashSet<i64>,
}

impl ReportTable {
    fn entry(&mut self, row: &FlatJoinRow) -> &mut PendingReport {
        let next_slot = self.reports.len();
        let slot = *self.index.entry(row.batch_id).or_insert(next_slot);
        if slot == next_slot {
            self.reports.push(PendingReport {
                report: row.empty_report(),
                seen_transactions: HashSet::new(),
                seen_inventory: HashSet::new(),
            });
        }
        &mut self.reports[slot]
    }

    fn into_reports(self) -> Vec<BatchReport> {
        self.reports
            .into_iter()
            .map(|pending| pending.report)
            .collect()
    }
}

impl PendingReport {
    fn absorb(&mut self, row: &FlatJoinRow) {
        if let Some(transaction) = row.transaction() {
            if self.seen_transactions.insert(transaction.transaction_id) {
                self.report.transactions.push(transaction);
            }
        }

        if let Some(inventory) = row.chicks_inventory() {
            if self.seen_inventory.insert(inventory.id) {
                self.report.chicks_inv.push(inventory);
            }
        }
    }
}

/// Folds flat join rows into one report per batch.
///
/// Batch-level fields are taken from the first row seen for each batch.
/// Rows without a transaction or inventory id contribute only the batch itself,
/// so a batch with no children still yields a report with empty collections.
pub fn assemble_reports<I>(rows: I) -> Vec<BatchReport>
where
    I: IntoIterator<Item = FlatJoinRow>,
{
    let mut table = ReportTable::default();
    for row in rows {
        table.entry(&row).absorb(&row);
    }
    table.into_reports()
}
