//! Position accumulation.
//!
//! Walks a normalized, `(date asc, id asc)`-ordered log and folds
//! transactions into position lots. A lot runs from its opening transaction
//! to the transaction that returns its net quantity to zero; a later opener
//! on the same symbol starts a fresh lot.

use crate::domain::{AccountId, Decimal, Position, Transaction};
use std::collections::HashMap;
use tracing::debug;

/// A lot being accumulated during the walk.
struct LotAccumulator {
    position: Position,
    /// Running sum of `price * quantity` over contributors; numerator of the
    /// weighted average cost basis.
    cost_sum: Decimal,
    /// Running sum of `amount` over contributors; becomes gain_loss at close.
    amount_sum: Decimal,
}

impl LotAccumulator {
    fn open(account_id: AccountId, t: &Transaction) -> Self {
        LotAccumulator {
            position: Position {
                account_id,
                symbol: t.symbol.clone(),
                underlying_symbol: t.symbol.underlying().to_string(),
                open_date: t.date,
                quantity: Decimal::zero(),
                cost_basis: Decimal::zero(),
                opened: false,
                short: t.quantity.is_negative(),
                gain_loss: Decimal::zero(),
            },
            cost_sum: Decimal::zero(),
            amount_sum: Decimal::zero(),
        }
    }

    fn apply(&mut self, t: &Transaction) {
        self.position.quantity += t.quantity;
        self.cost_sum += t.price * t.quantity;
        self.amount_sum += t.amount;
    }

    fn finish(mut self) -> Position {
        self.position.opened = !self.position.quantity.is_zero();
        if self.position.opened {
            self.position.cost_basis = self.cost_sum / self.position.quantity;
            self.position.gain_loss = Decimal::zero();
        } else {
            self.position.cost_basis = Decimal::zero();
            self.position.gain_loss = self.amount_sum;
        }
        self.position
    }
}

/// Fold a single account's normalized log into position lots.
///
/// Deterministic: output order is lot-open order, which the input ordering
/// fixes. Closing actions on a symbol with no live lot are retained in the
/// log but produce nothing here.
pub fn build_positions(account_id: AccountId, log: &[Transaction]) -> Vec<Position> {
    let mut lots: Vec<LotAccumulator> = Vec::new();
    let mut live: HashMap<String, usize> = HashMap::new();

    for t in log {
        let idx = match live.get(t.symbol.as_str()) {
            Some(&idx) => idx,
            None => {
                if !t.action.opens_position() {
                    debug!(
                        transaction_id = t.id,
                        symbol = %t.symbol,
                        action = %t.action,
                        "closing action with no open lot, skipping"
                    );
                    continue;
                }
                lots.push(LotAccumulator::open(account_id, t));
                let idx = lots.len() - 1;
                live.insert(t.symbol.as_str().to_string(), idx);
                idx
            }
        };

        lots[idx].apply(t);

        // Net quantity back to zero closes the lot; a later opener on this
        // symbol starts a new one.
        if lots[idx].position.quantity.is_zero() {
            live.remove(t.symbol.as_str());
        }
    }

    lots.into_iter().map(LotAccumulator::finish).collect()
}
