//! Derived position operations for the repository.

use crate::domain::{AccountId, Decimal, Position, Symbol};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

use super::Repository;

impl Repository {
    /// Replace an account's positions with a freshly built set.
    ///
    /// Delete and insert share one SQLite transaction: concurrent readers
    /// observe either the previous set or the new one, never a torn mix,
    /// and a failed insert rolls the delete back.
    ///
    /// # Errors
    /// Returns an error if any statement fails; nothing commits.
    pub async fn replace_positions(
        &self,
        account_id: AccountId,
        positions: &[Position],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM positions WHERE account_id = ?")
            .bind(account_id.as_i64())
            .execute(&mut *tx)
            .await?;

        for p in positions {
            sqlx::query(
                r#"
                INSERT INTO positions
                (account_id, symbol, underlying_symbol, open_date, quantity,
                 cost_basis, opened, short, gain_loss)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(p.account_id.as_i64())
            .bind(p.symbol.as_str())
            .bind(&p.underlying_symbol)
            .bind(p.open_date.to_string())
            .bind(p.quantity.to_canonical_string())
            .bind(p.cost_basis.to_canonical_string())
            .bind(if p.opened { 1 } else { 0 })
            .bind(if p.short { 1 } else { 0 })
            .bind(p.gain_loss.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List an account's positions in lot-open order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_positions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Position>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, symbol, underlying_symbol, open_date, quantity,
                   cost_basis, opened, short, gain_loss
            FROM positions
            WHERE account_id = ?
            ORDER BY open_date ASC, id ASC
            "#,
        )
        .bind(account_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(decode_position).collect())
    }
}

fn decode_position(row: &SqliteRow) -> Option<Position> {
    let symbol: String = row.get("symbol");

    let open_date_str: String = row.get("open_date");
    let open_date = match open_date_str.parse::<NaiveDate>() {
        Ok(d) => d,
        Err(e) => {
            warn!(symbol = %symbol, date = %open_date_str, error = %e, "skipping position with malformed open_date");
            return None;
        }
    };

    let numeric = |column: &str| -> Option<Decimal> {
        let raw: String = row.get(column);
        match Decimal::from_str(&raw) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(symbol = %symbol, column, value = %raw, error = %e, "skipping position with malformed numeric field");
                None
            }
        }
    };

    let quantity = numeric("quantity")?;
    let cost_basis = numeric("cost_basis")?;
    let gain_loss = numeric("gain_loss")?;

    Some(Position {
        account_id: AccountId::new(row.get::<i64, _>("account_id")),
        symbol: Symbol::new(symbol),
        underlying_symbol: row.get::<String, _>("underlying_symbol"),
        open_date,
        quantity,
        cost_basis,
        opened: row.get::<i64, _>("opened") != 0,
        short: row.get::<i64, _>("short") != 0,
        gain_loss,
    })
}
