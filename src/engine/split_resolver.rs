//! Options forward split resolution.
//!
//! An `Options Frwd Split` row names the post-split contract and the new
//! contract delta; the brokerage report elides the ratio. The resolver pulls
//! the ratio from the curated split table, recovers the pre-split strike,
//! and rewrites matching prior option rows to the post-split symbol so the
//! position builder sees one lot with a correct unified basis.

use crate::domain::{
    latest_ratio_on_or_before, Action, OptionSymbol, StockSplit, Transaction,
};
use tracing::{debug, warn};

pub struct SplitResolver<'a> {
    splits: &'a [StockSplit],
}

impl<'a> SplitResolver<'a> {
    pub fn new(splits: &'a [StockSplit]) -> Self {
        Self { splits }
    }

    /// Rewrite pre-split option rows for every forward split event in the
    /// log. Per-row failures (malformed symbol, missing split reference) are
    /// logged and skipped; the builder then sees two parallel positions on
    /// the underlying, which is a diagnosable anomaly rather than a crash.
    ///
    /// Idempotent: once rewritten, a prior row's strike equals the new
    /// strike, which never matches the recovered pre-split strike again.
    pub fn resolve(&self, log: &mut [Transaction]) {
        for i in 0..log.len() {
            if log[i].action != Action::OptionsFrwdSplit {
                continue;
            }

            let event_symbol = log[i].symbol.clone();
            let event_date = log[i].date;
            let event_id = log[i].id;

            let new_contract = match OptionSymbol::parse(event_symbol.as_str()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(transaction_id = event_id, error = %e, "skipping forward split row");
                    continue;
                }
            };

            let Some(ratio) =
                latest_ratio_on_or_before(self.splits, &new_contract.underlying, event_date)
            else {
                warn!(
                    transaction_id = event_id,
                    underlying = %new_contract.underlying,
                    date = %event_date,
                    "no stock split reference for forward split row, skipping"
                );
                continue;
            };

            let old_strike = (new_contract.strike * ratio).round_half_away();

            for t in log.iter_mut() {
                if t.date >= event_date || t.symbol == event_symbol {
                    continue;
                }
                let Ok(old_contract) = OptionSymbol::parse(t.symbol.as_str()) else {
                    continue;
                };
                if old_contract.same_series(&new_contract) && old_contract.strike == old_strike {
                    debug!(
                        transaction_id = t.id,
                        from = %t.symbol,
                        to = %event_symbol,
                        "unifying pre-split option lot under post-split symbol"
                    );
                    t.symbol = event_symbol.clone();
                }
            }
        }
    }
}
