//! Stock split reference data.

use crate::domain::Decimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the curated split table: `(symbol, effective date) -> ratio`.
///
/// Consulted only by the options forward split resolver, because the
/// brokerage report elides the ratio. The table ships with the binary and
/// can be extended via `STOCK_SPLITS_FILE` without code changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSplit {
    pub symbol: String,
    pub split_date: NaiveDate,
    /// Multiplicative share-count factor, e.g. 3 for a 3-for-1 split.
    pub ratio: Decimal,
}

/// Find the ratio of the most recent split for `underlying` effective on or
/// before `date`. None if the table has no such row.
pub fn latest_ratio_on_or_before(
    splits: &[StockSplit],
    underlying: &str,
    date: NaiveDate,
) -> Option<Decimal> {
    splits
        .iter()
        .filter(|s| s.symbol == underlying && s.split_date <= date)
        .max_by_key(|s| s.split_date)
        .map(|s| s.ratio)
}
