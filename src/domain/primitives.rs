//! Domain primitives: AccountId, Symbol.

use serde::{Deserialize, Serialize};

/// Owning brokerage account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        AccountId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument symbol: either a stock ticker ("AAPL") or an option contract
/// string ("TSLA 01/20/2023 333.33 C").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Symbol(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The underlying ticker: the first whitespace-delimited token.
    /// For a plain stock symbol this is the symbol itself.
    pub fn underlying(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or("")
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
