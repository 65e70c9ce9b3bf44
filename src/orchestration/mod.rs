//! Pipeline orchestration over the pure engine and the repository.

pub mod recompute;

pub use recompute::{RecomputeError, Recomputer};
