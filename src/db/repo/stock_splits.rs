//! Curated stock split reference table.

use crate::domain::{Decimal, StockSplit};
use chrono::NaiveDate;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

use super::Repository;

/// The split table shipped with the binary.
///
/// # Panics
/// Panics if the embedded JSON is malformed, which is a build defect.
pub fn builtin_stock_splits() -> Vec<StockSplit> {
    serde_json::from_str(include_str!("../stock_splits.json"))
        .expect("embedded stock_splits.json is malformed")
}

impl Repository {
    /// Seed the split table, ignoring rows already present. Called at
    /// startup with the builtin table plus any operator-provided extension.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn seed_stock_splits(&self, splits: &[StockSplit]) -> Result<(), sqlx::Error> {
        if splits.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for split in splits {
            sqlx::query(
                r#"
                INSERT INTO stock_splits (symbol, split_date, ratio)
                VALUES (?, ?, ?)
                ON CONFLICT(symbol, split_date) DO NOTHING
                "#,
            )
            .bind(&split.symbol)
            .bind(split.split_date.to_string())
            .bind(split.ratio.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load the whole split table. It is small by construction, and the
    /// resolver wants it in memory.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn load_stock_splits(&self) -> Result<Vec<StockSplit>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT symbol, split_date, ratio FROM stock_splits ORDER BY symbol ASC, split_date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let symbol: String = row.get("symbol");
                let date_str: String = row.get("split_date");
                let ratio_str: String = row.get("ratio");

                let split_date = match date_str.parse::<NaiveDate>() {
                    Ok(d) => d,
                    Err(e) => {
                        warn!(symbol = %symbol, date = %date_str, error = %e, "skipping malformed stock split row");
                        return None;
                    }
                };
                let ratio = match Decimal::from_str(&ratio_str) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(symbol = %symbol, ratio = %ratio_str, error = %e, "skipping malformed stock split row");
                        return None;
                    }
                };

                Some(StockSplit {
                    symbol,
                    split_date,
                    ratio,
                })
            })
            .collect())
    }
}
