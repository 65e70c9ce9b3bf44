//! Repository layer for database operations.
//!
//! Methods are organized across submodules by domain:
//! - `transactions.rs` - transaction log reads/writes
//! - `positions.rs` - derived position replacement and reads
//! - `stock_splits.rs` - curated split reference table

mod positions;
mod stock_splits;
mod transactions;

use sqlx::sqlite::SqlitePool;

pub use stock_splits::builtin_stock_splits;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}
