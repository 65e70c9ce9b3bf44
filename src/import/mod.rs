//! Brokerage export ingestion.
//!
//! Uploaded files are staged to a directory by the HTTP layer and drained
//! here by a background task. Each file is a JSON export with a
//! `BrokerageTransactions` array; rows are filtered, normalized into
//! [`NewTransaction`] values, and batch-inserted. Re-importing the same
//! export is a no-op because rows dated at or before the account's newest
//! stored transaction are skipped.

use crate::db::Repository;
use crate::domain::{AccountId, Action, Decimal, NewTransaction, Symbol};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Wire shape of one exported file.
#[derive(Debug, Deserialize)]
struct BrokerageExport {
    #[serde(rename = "BrokerageTransactions")]
    transactions: Vec<BrokerageRow>,
}

/// Wire shape of one exported row. Fields default to empty because some
/// actions (Expired, for one) carry blank numerics.
#[derive(Debug, Deserialize)]
struct BrokerageRow {
    #[serde(rename = "Date", default)]
    date: String,
    #[serde(rename = "Action", default)]
    action: String,
    #[serde(rename = "Symbol", default)]
    symbol: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Quantity", default)]
    quantity: String,
    #[serde(rename = "Price", default)]
    price: String,
    #[serde(rename = "Fees & Comm", default)]
    fees: String,
    #[serde(rename = "Amount", default)]
    amount: String,
}

/// Parse a money-ish export field. `$` and `,` are stripped; blank values
/// become zero, matching how the exports leave fields empty for non-trade
/// rows. Anything else unparseable is None, which voids the row.
fn parse_money(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(Decimal::zero());
    }
    Decimal::from_str(cleaned).ok()
}

/// Resolve the effective date of a row. Corrected rows read
/// `"<orig> as of <MM/DD/YYYY>"`; the substring after the last marker is
/// the date that counts.
fn effective_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let date_part = match raw.rfind(" as of ") {
        Some(idx) => &raw[idx + " as of ".len()..],
        None => raw,
    };
    NaiveDate::parse_from_str(date_part.trim(), "%m/%d/%Y")
}

/// Convert one export row. Unknown actions are dropped without a log line;
/// exports are full of cash-movement rows the engine does not track.
/// A row with an unparseable date or a malformed (non-blank) numeric is
/// dropped with a warning.
fn convert_row(account_id: AccountId, row: &BrokerageRow) -> Option<NewTransaction> {
    let action = Action::from_str(&row.action).ok()?;

    let date = match effective_date(&row.date) {
        Ok(d) => d,
        Err(e) => {
            warn!(date = %row.date, action = %row.action, error = %e, "dropping row with unparseable date");
            return None;
        }
    };

    let numeric = |field: &str, raw: &str| -> Option<Decimal> {
        match parse_money(raw) {
            Some(d) => Some(d),
            None => {
                warn!(field, value = raw, action = %row.action, "dropping row with malformed numeric field");
                None
            }
        }
    };

    Some(NewTransaction {
        account_id,
        date,
        action,
        symbol: Symbol::new(row.symbol.trim().to_string()),
        description: row.description.trim().to_string(),
        quantity: numeric("quantity", &row.quantity)?,
        price: numeric("price", &row.price)?,
        fees: numeric("fees", &row.fees)?,
        amount: numeric("amount", &row.amount)?,
    })
}

/// Ingest every staged `.json` file in `dir` for the account. Files are
/// removed once consumed, whether or not they contained usable rows.
///
/// Returns the number of transactions inserted.
///
/// # Errors
/// Returns an error on store or filesystem failure; malformed rows and
/// files are logged and skipped.
pub async fn drain_uploads(
    repo: &Repository,
    account_id: AccountId,
    dir: &Path,
) -> anyhow::Result<usize> {
    let mut watermark = repo.last_transaction_date(account_id).await?;
    let mut inserted = 0;

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("reading upload directory {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        match ingest_file(repo, account_id, &path, watermark).await {
            Ok((count, max_date)) => {
                inserted += count;
                if max_date > watermark {
                    watermark = max_date;
                }
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable upload");
            }
        }

        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("removing staged file {}", path.display()))?;
    }

    info!(
        account_id = account_id.as_i64(),
        inserted, "drained staged uploads"
    );
    Ok(inserted)
}

/// Ingest one staged file. Returns the insert count and the newest date
/// among the inserted rows.
async fn ingest_file(
    repo: &Repository,
    account_id: AccountId,
    path: &Path,
    watermark: Option<NaiveDate>,
) -> anyhow::Result<(usize, Option<NaiveDate>)> {
    let bytes = tokio::fs::read(path).await?;
    let export: BrokerageExport = serde_json::from_slice(&bytes)?;

    let mut rows: Vec<NewTransaction> = export
        .transactions
        .iter()
        .filter_map(|row| convert_row(account_id, row))
        .filter(|t| match watermark {
            Some(last) => t.date > last,
            None => true,
        })
        .collect();

    // Export files arrive newest-first; the log wants chronological order.
    rows.sort_by_key(|t| t.date);

    let max_date = rows.iter().map(|t| t.date).max();
    let count = repo.insert_transactions_batch(&rows).await?;

    debug!(
        file = %path.display(),
        parsed = export.transactions.len(),
        inserted = count,
        "ingested export file"
    );
    Ok((count, max_date))
}
