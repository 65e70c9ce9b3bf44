//! Position record: one lot of a single symbol within one account.

use crate::domain::{AccountId, Decimal, Symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A derived position lot, fully regenerated from the transaction log on
/// every recompute. One row per lot cycle: a later opener on the same symbol
/// after closure produces a fresh row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub account_id: AccountId,
    pub symbol: Symbol,
    /// First space-separated token of `symbol` (the equity ticker for an
    /// option contract).
    pub underlying_symbol: String,
    /// Date of the first contributing transaction.
    pub open_date: NaiveDate,
    /// Net sum of constituent transaction quantities.
    pub quantity: Decimal,
    /// Weighted average cost per unit while open; zero once closed.
    pub cost_basis: Decimal,
    /// True while net quantity is nonzero.
    pub opened: bool,
    /// True if the first contributing quantity was negative.
    pub short: bool,
    /// Realized P&L: zero while open, net cash flow of the lot once closed.
    pub gain_loss: Decimal,
}
