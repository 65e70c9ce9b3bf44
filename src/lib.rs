pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod import;
pub mod orchestration;

pub use config::Config;
pub use db::{builtin_stock_splits, init_db, Repository};
pub use domain::{
    AccountId, Action, Decimal, NewTransaction, OptionSymbol, OptionType, Position, StockSplit,
    Symbol, Transaction,
};
pub use error::AppError;
pub use orchestration::Recomputer;
