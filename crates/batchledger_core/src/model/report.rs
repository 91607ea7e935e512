//! Flat join rows and the nested batch report built from them.
//!
//! # Responsibility
//! - Mirror one row of the batch x transactions x chicks_inv LEFT JOIN.
//! - Define the nested per-batch view returned to report callers.
//!
//! # Invariants
//! - `FlatJoinRow::batch_id` is always present; child columns are `None`
//!   when the LEFT JOIN found no matching child.
//! - A report lists each child id at most once.

use crate::model::batch::BatchId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the closed-batch report query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatJoinRow {
    pub batch_id: BatchId,
    pub batch_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub transaction_id: Option<i64>,
    /// Stored text as written (`YYYY-MM-DD` or a date-time); never reparsed.
    pub transaction_date: Option<String>,
    pub transaction_type: Option<String>,
    pub contact_name: Option<String>,
    pub item_type: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub total_cost: Option<f64>,
    /// `chicks_inv.id`, aliased in the query to avoid clashing with batch columns.
    pub chicks_inv_id: Option<i64>,
    pub mortality: Option<i64>,
}

/// Transaction attached to a batch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionEntry {
    pub transaction_id: i64,
    pub transaction_date: Option<String>,
    pub transaction_type: Option<String>,
    pub contact_name: Option<String>,
    pub item_type: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub total_cost: Option<f64>,
}

/// Inventory snapshot attached to a batch report.
///
/// Only identity and mortality are projected; the stock counters stay in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChicksInventoryEntry {
    pub id: i64,
    pub mortality: Option<i64>,
}

/// Nested view of one closed batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub batch_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub transactions: Vec<TransactionEntry>,
    pub chicks_inv: Vec<ChicksInventoryEntry>,
}

impl FlatJoinRow {
    /// Builds the transaction entry carried by this row, if any.
    pub fn transaction(&self) -> Option<TransactionEntry> {
        let transaction_id = self.transaction_id?;
        Some(TransactionEntry {
            transaction_id,
            transaction_date: self.transaction_date.clone(),
            transaction_type: self.transaction_type.clone(),
            contact_name: self.contact_name.clone(),
            item_type: self.item_type.clone(),
            item_name: self.item_name.clone(),
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            total_cost: self.total_cost,
        })
    }

    /// Builds the inventory entry carried by this row, if any.
    pub fn chicks_inventory(&self) -> Option<ChicksInventoryEntry> {
        Some(ChicksInventoryEntry {
            id: self.chicks_inv_id?,
            mortality: self.mortality,
        })
    }

    pub(crate) fn empty_report(&self) -> BatchReport {
        BatchReport {
            batch_id: self.batch_id,
            batch_name: self.batch_name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            transactions: Vec::new(),
            chicks_inv: Vec::new(),
        }
    }
}
