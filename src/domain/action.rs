//! The closed set of brokerage transaction actions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Action verbs as they appear on a brokerage statement. Parsing is
/// case-insensitive; anything outside this set is rejected (the importer
/// silently drops such rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    SellShort,
    BuyToOpen,
    BuyToClose,
    SellToOpen,
    SellToClose,
    Assigned,
    Expired,
    ExchangeOrExercise,
    StockSplit,
    ReverseSplit,
    OptionsFrwdSplit,
}

#[derive(Debug, Error)]
#[error("unknown transaction action: {0}")]
pub struct ActionParseError(pub String);

impl Action {
    /// The canonical statement spelling of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
            Action::SellShort => "Sell Short",
            Action::BuyToOpen => "Buy to Open",
            Action::BuyToClose => "Buy to Close",
            Action::SellToOpen => "Sell to Open",
            Action::SellToClose => "Sell to Close",
            Action::Assigned => "Assigned",
            Action::Expired => "Expired",
            Action::ExchangeOrExercise => "Exchange or Exercise",
            Action::StockSplit => "Stock Split",
            Action::ReverseSplit => "Reverse Split",
            Action::OptionsFrwdSplit => "Options Frwd Split",
        }
    }

    /// True for actions whose verb is "buy": these carry a cash outflow, so
    /// the normalizer forces their amount negative.
    pub fn is_buy(&self) -> bool {
        matches!(self, Action::Buy | Action::BuyToOpen | Action::BuyToClose)
    }

    /// True for actions whose verb is "sell": these shed shares, so the
    /// normalizer forces their quantity negative.
    pub fn is_sell(&self) -> bool {
        matches!(
            self,
            Action::Sell | Action::SellShort | Action::SellToOpen | Action::SellToClose
        )
    }

    /// True if this action may start a new position lot. Closing actions
    /// with no prior opener never create a position.
    ///
    /// Reverse Split is in the set because the rewritten second leg of a
    /// reverse split opens the post-split ticker's lot.
    pub fn opens_position(&self) -> bool {
        matches!(
            self,
            Action::Buy
                | Action::BuyToOpen
                | Action::SellShort
                | Action::SellToOpen
                | Action::ReverseSplit
        )
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            "sell short" => Ok(Action::SellShort),
            "buy to open" => Ok(Action::BuyToOpen),
            "buy to close" => Ok(Action::BuyToClose),
            "sell to open" => Ok(Action::SellToOpen),
            "sell to close" => Ok(Action::SellToClose),
            "assigned" => Ok(Action::Assigned),
            "expired" => Ok(Action::Expired),
            "exchange or exercise" => Ok(Action::ExchangeOrExercise),
            "stock split" => Ok(Action::StockSplit),
            "reverse split" => Ok(Action::ReverseSplit),
            "options frwd split" => Ok(Action::OptionsFrwdSplit),
            other => Err(ActionParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
