//! Transaction normalization.
//!
//! Canonicalizes raw rows before position accumulation: sign conventions for
//! quantity/amount, zeroed split prices, and the reverse-split symbol
//! rewrite that unifies both legs of the brokerage's two-leg representation.
//!
//! Every rule is state-converging, so a second run over the same log is a
//! no-op. Rows already marked processed are skipped.

use crate::domain::{Action, Decimal, Transaction};
use tracing::debug;

/// Marker the brokerage plants in the description of a reverse-split leg:
/// `"<COMPANY> XXXREVERSE SPLIT EFF: <date>"`.
const REVERSE_SPLIT_MARKER: &str = "XXXREVERSE SPLIT EFF:";

/// Normalize a single account's log in place, in `(date, id)` order.
///
/// Rules, applied per row:
/// 1. buy* with amount > 0: negate amount (buys are cash outflows);
/// 2. sell* with quantity > 0: negate quantity (sells shed units);
/// 3. Stock Split / Options Frwd Split: price = 0 (the added units carry no
///    cost; a nonzero price would corrupt the lot's basis);
/// 4. Reverse Split rows carrying the marker take the symbol of the earliest
///    same-account row whose description equals the company name, so both
///    legs feed the pre-split ticker's position.
pub fn normalize(log: &mut [Transaction]) {
    for i in 0..log.len() {
        if log[i].processed {
            continue;
        }

        if log[i].action.is_buy() && log[i].amount.is_positive() {
            log[i].amount = -log[i].amount;
        }
        if log[i].action.is_sell() && log[i].quantity.is_positive() {
            log[i].quantity = -log[i].quantity;
        }
        if matches!(
            log[i].action,
            Action::StockSplit | Action::OptionsFrwdSplit
        ) {
            log[i].price = Decimal::zero();
        }
        if log[i].action == Action::ReverseSplit {
            rewrite_reverse_split_symbol(log, i);
        }

        log[i].processed = true;
    }
}

/// Rule 4: collapse the brokerage's reverse-split leg onto the pre-split
/// ticker. The row's description carries `"<COMPANY> XXXREVERSE SPLIT EFF:"`;
/// prior rows on the original ticker carry plain `"<COMPANY>"`.
fn rewrite_reverse_split_symbol(log: &mut [Transaction], i: usize) {
    let Some(company) = log[i]
        .description
        .split_once(REVERSE_SPLIT_MARKER)
        .map(|(head, _)| head.trim().to_string())
    else {
        return;
    };

    let donor_id = log[i].id;
    let donor = log
        .iter()
        .find(|t| t.id != donor_id && t.description.trim() == company)
        .map(|t| t.symbol.clone());

    match donor {
        Some(symbol) => {
            debug!(
                transaction_id = log[i].id,
                from = %log[i].symbol,
                to = %symbol,
                "reverse split leg rewritten to pre-split ticker"
            );
            log[i].symbol = symbol;
        }
        None => {
            debug!(
                transaction_id = log[i].id,
                company = %company,
                "reverse split leg has no matching prior transaction"
            );
        }
    }
}
