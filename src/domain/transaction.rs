//! Transaction record: one row per brokerage event.

use crate::domain::{AccountId, Action, Decimal, Symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single brokerage transaction as stored in the ledger.
///
/// Semantic fields are append-only from the ingest side. The engine mutates
/// only (a) quantity/amount signs and split prices during normalization and
/// (b) the symbol of reverse-split and pre-forward-split rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: AccountId,
    /// Calendar day; no intraday ordering. Ties break by `id` ascending.
    pub date: NaiveDate,
    pub action: Action,
    pub symbol: Symbol,
    pub description: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fees: Decimal,
    pub amount: Decimal,
    /// Set once the normalizer has enforced sign/price invariants.
    pub processed: bool,
}

/// A transaction about to be inserted (no id yet, never processed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub action: Action,
    pub symbol: Symbol,
    pub description: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fees: Decimal,
    pub amount: Decimal,
}
