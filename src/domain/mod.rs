//! Domain types for the portfolio position engine.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: AccountId, Symbol
//! - The closed Action set and the opener subset
//! - Transaction and Position records
//! - Option contract symbol parsing and the split reference table

pub mod action;
pub mod decimal;
pub mod option_symbol;
pub mod position;
pub mod primitives;
pub mod stock_split;
pub mod transaction;

pub use action::{Action, ActionParseError};
pub use decimal::Decimal;
pub use option_symbol::{OptionSymbol, OptionSymbolError, OptionType};
pub use position::Position;
pub use primitives::{AccountId, Symbol};
pub use stock_split::{latest_ratio_on_or_before, StockSplit};
pub use transaction::{NewTransaction, Transaction};
