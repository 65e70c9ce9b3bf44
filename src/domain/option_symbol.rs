//! Option contract symbol parsing.
//!
//! Brokerage statements spell option contracts as
//! `"<UNDERLYING> <MM/DD/YYYY> <STRIKE> <C|P>"`, e.g.
//! `"TSLA 01/20/2023 333.33 C"`. The split resolver needs the parts to match
//! pre-split lots against the post-split contract.

use crate::domain::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    Call,
    Put,
}

/// A parsed option contract symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSymbol {
    pub underlying: String,
    /// Expiration as spelled on the statement (MM/DD/YYYY). Kept verbatim;
    /// series matching is string equality.
    pub expiration: String,
    pub strike: Decimal,
    pub option_type: OptionType,
}

#[derive(Debug, Error)]
pub enum OptionSymbolError {
    #[error("invalid option symbol format: {0}")]
    Format(String),
    #[error("invalid strike price in option symbol: {0}")]
    Strike(String),
}

impl OptionSymbol {
    /// Parse an option contract symbol. Rejects anything with fewer than
    /// four whitespace-separated tokens or a non-numeric strike.
    pub fn parse(symbol: &str) -> Result<Self, OptionSymbolError> {
        let tokens: Vec<&str> = symbol.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(OptionSymbolError::Format(symbol.to_string()));
        }

        let strike = Decimal::from_str_canonical(tokens[2])
            .map_err(|_| OptionSymbolError::Strike(tokens[2].to_string()))?;

        let option_type = match tokens[3] {
            "C" | "c" => OptionType::Call,
            "P" | "p" => OptionType::Put,
            _ => return Err(OptionSymbolError::Format(symbol.to_string())),
        };

        Ok(OptionSymbol {
            underlying: tokens[0].to_string(),
            expiration: tokens[1].to_string(),
            strike,
            option_type,
        })
    }

    /// True if `other` is the same option series: same underlying, same
    /// expiration, same type. Strike is deliberately not compared.
    pub fn same_series(&self, other: &OptionSymbol) -> bool {
        self.underlying == other.underlying
            && self.expiration == other.expiration
            && self.option_type == other.option_type
    }
}
