//! Full recompute of an account's positions from its transaction log.
//!
//! Every mutation of the log funnels through here: load the whole log in
//! `(date, id)` order, run the normalization and split passes in memory,
//! write back only the rows those passes changed, rebuild the position set
//! from scratch, and swap it in atomically. Regenerating from the full log
//! keeps the derived table correct under out-of-order edits without any
//! incremental bookkeeping.

use crate::db::Repository;
use crate::domain::{AccountId, Transaction};
use crate::engine::{build_positions, normalize, SplitResolver};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Errors from a recompute run. Per-row data problems never surface here,
/// only storage failures do.
#[derive(Debug, Error)]
pub enum RecomputeError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Drives the recompute pipeline for one database.
///
/// Cheap to clone and share across handlers. Runs for the same account are
/// serialized by a per-account lock so two concurrent mutations cannot
/// interleave their read-modify-write cycles; distinct accounts recompute
/// in parallel.
#[derive(Clone)]
pub struct Recomputer {
    repo: Arc<Repository>,
    gates: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl Recomputer {
    pub fn new(repo: Arc<Repository>) -> Self {
        Recomputer {
            repo,
            gates: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The serialization gate for one account. The map lock is held only
    /// long enough to clone the entry out.
    async fn account_gate(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        gates.entry(account_id.as_i64()).or_default().clone()
    }

    /// Rebuild the position set for one account.
    ///
    /// # Errors
    /// Returns an error only when the store fails. Rows the engine cannot
    /// interpret are logged and skipped.
    pub async fn recompute_account(&self, account_id: AccountId) -> Result<(), RecomputeError> {
        let gate = self.account_gate(account_id).await;
        let _guard = gate.lock().await;

        let mut log = self.repo.load_account_log(account_id).await?;
        let splits = self.repo.load_stock_splits().await?;

        let before: HashMap<i64, Transaction> =
            log.iter().map(|t| (t.id, t.clone())).collect();

        normalize(&mut log);
        SplitResolver::new(&splits).resolve(&mut log);

        let changed: Vec<&Transaction> = log
            .iter()
            .filter(|t| before.get(&t.id) != Some(t))
            .collect();
        if !changed.is_empty() {
            debug!(
                account_id = account_id.as_i64(),
                rows = changed.len(),
                "persisting normalized transaction rows"
            );
            self.repo.update_normalized_rows(&changed).await?;
        }

        let positions = build_positions(account_id, &log);
        self.repo.replace_positions(account_id, &positions).await?;

        info!(
            account_id = account_id.as_i64(),
            transactions = log.len(),
            positions = positions.len(),
            "recomputed positions"
        );
        Ok(())
    }
}
