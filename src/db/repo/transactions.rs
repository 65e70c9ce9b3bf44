//! Transaction log operations for the repository.

use crate::domain::{AccountId, Action, Decimal, NewTransaction, Symbol, Transaction};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

use super::Repository;

const TRANSACTION_COLUMNS: &str =
    "id, account_id, date, action, symbol, description, quantity, price, fees, amount, processed";

impl Repository {
    /// Insert a transaction and return its assigned id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_transaction(&self, t: &NewTransaction) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions
            (account_id, date, action, symbol, description, quantity, price, fees, amount, processed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(t.account_id.as_i64())
        .bind(t.date.to_string())
        .bind(t.action.as_str())
        .bind(t.symbol.as_str())
        .bind(&t.description)
        .bind(t.quantity.to_canonical_string())
        .bind(t.price.to_canonical_string())
        .bind(t.fees.to_canonical_string())
        .bind(t.amount.to_canonical_string())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert multiple transactions in a single database transaction.
    ///
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; no partial batch commits.
    pub async fn insert_transactions_batch(
        &self,
        batch: &[NewTransaction],
    ) -> Result<usize, sqlx::Error> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for t in batch {
            sqlx::query(
                r#"
                INSERT INTO transactions
                (account_id, date, action, symbol, description, quantity, price, fees, amount, processed)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
                "#,
            )
            .bind(t.account_id.as_i64())
            .bind(t.date.to_string())
            .bind(t.action.as_str())
            .bind(t.symbol.as_str())
            .bind(&t.description)
            .bind(t.quantity.to_canonical_string())
            .bind(t.price.to_canonical_string())
            .bind(t.fees.to_canonical_string())
            .bind(t.amount.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(batch.len())
    }

    /// Fetch a single transaction by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_transaction(&self, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
        let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.and_then(|r| decode_transaction(&r)))
    }

    /// Delete a transaction by id. Returns false if no such row existed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete_transaction(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Page through an account's transactions, newest first, optionally
    /// filtered by symbol. Pages are 1-based.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_transactions(
        &self,
        account_id: AccountId,
        symbol: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let offset = (page.max(1) - 1) as i64 * limit as i64;

        let rows = if let Some(symbol) = symbol {
            let sql = format!(
                "SELECT {} FROM transactions WHERE account_id = ? AND symbol = ? \
                 ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                TRANSACTION_COLUMNS
            );
            sqlx::query(&sql)
                .bind(account_id.as_i64())
                .bind(symbol)
                .bind(limit as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
        } else {
            let sql = format!(
                "SELECT {} FROM transactions WHERE account_id = ? \
                 ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                TRANSACTION_COLUMNS
            );
            sqlx::query(&sql)
                .bind(account_id.as_i64())
                .bind(limit as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
        };

        Ok(rows.iter().filter_map(decode_transaction).collect())
    }

    /// Count an account's transactions, optionally filtered by symbol.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_transactions(
        &self,
        account_id: AccountId,
        symbol: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let row = if let Some(symbol) = symbol {
            sqlx::query("SELECT COUNT(*) as n FROM transactions WHERE account_id = ? AND symbol = ?")
                .bind(account_id.as_i64())
                .bind(symbol)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query("SELECT COUNT(*) as n FROM transactions WHERE account_id = ?")
                .bind(account_id.as_i64())
                .fetch_one(&self.pool)
                .await?
        };
        Ok(row.get::<i64, _>("n"))
    }

    /// Date of the newest transaction for the account, or None if the log is
    /// empty. The importer uses this to skip already-ingested rows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn last_transaction_date(
        &self,
        account_id: AccountId,
    ) -> Result<Option<NaiveDate>, sqlx::Error> {
        let row = sqlx::query("SELECT MAX(date) as max_date FROM transactions WHERE account_id = ?")
            .bind(account_id.as_i64())
            .fetch_one(&self.pool)
            .await?;

        let max_date: Option<String> = row.get("max_date");
        Ok(max_date.and_then(|s| match s.parse::<NaiveDate>() {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(date = %s, error = %e, "unparseable max transaction date");
                None
            }
        }))
    }

    /// Load the full log for an account in `(date asc, id asc)` order, the
    /// ordering the recompute contract requires.
    ///
    /// Rows with malformed stored fields are fatal for that row only: they
    /// are skipped with a warning and the recompute proceeds.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn load_account_log(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE account_id = ? ORDER BY date ASC, id ASC",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(account_id.as_i64())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().filter_map(decode_transaction).collect())
    }

    /// Write back rows the normalizer or split resolver changed. Only the
    /// fields those passes may touch are updated.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; no partial writeback.
    pub async fn update_normalized_rows(
        &self,
        changed: &[&Transaction],
    ) -> Result<(), sqlx::Error> {
        if changed.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for t in changed {
            sqlx::query(
                r#"
                UPDATE transactions
                SET symbol = ?, quantity = ?, price = ?, amount = ?, processed = ?
                WHERE id = ?
                "#,
            )
            .bind(t.symbol.as_str())
            .bind(t.quantity.to_canonical_string())
            .bind(t.price.to_canonical_string())
            .bind(t.amount.to_canonical_string())
            .bind(if t.processed { 1 } else { 0 })
            .bind(t.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Decode one stored row. Any malformed field voids the row (logged, None).
fn decode_transaction(row: &SqliteRow) -> Option<Transaction> {
    let id: i64 = row.get("id");

    let date_str: String = row.get("date");
    let date = match date_str.parse::<NaiveDate>() {
        Ok(d) => d,
        Err(e) => {
            warn!(transaction_id = id, date = %date_str, error = %e, "skipping row with malformed date");
            return None;
        }
    };

    let action_str: String = row.get("action");
    let action = match Action::from_str(&action_str) {
        Ok(a) => a,
        Err(e) => {
            warn!(transaction_id = id, error = %e, "skipping row with unknown action");
            return None;
        }
    };

    let numeric = |column: &str| -> Option<Decimal> {
        let raw: String = row.get(column);
        match Decimal::from_str(&raw) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(
                    transaction_id = id,
                    column, value = %raw, error = %e,
                    "skipping row with malformed numeric field"
                );
                None
            }
        }
    };

    let quantity = numeric("quantity")?;
    let price = numeric("price")?;
    let fees = numeric("fees")?;
    let amount = numeric("amount")?;

    Some(Transaction {
        id,
        account_id: AccountId::new(row.get::<i64, _>("account_id")),
        date,
        action,
        symbol: Symbol::new(row.get::<String, _>("symbol")),
        description: row.get::<String, _>("description"),
        quantity,
        price,
        fees,
        amount,
        processed: row.get::<i64, _>("processed") != 0,
    })
}
