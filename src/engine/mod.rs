//! Pure recompute passes over an account's in-memory transaction log.
//!
//! Dependency order, leaves first: normalizer -> split resolver -> position
//! builder. All three are deterministic and free of store I/O; the
//! orchestration layer loads the log, runs the passes, and persists.

pub mod builder;
pub mod normalizer;
pub mod split_resolver;

pub use builder::build_positions;
pub use normalizer::normalize;
pub use split_resolver::SplitResolver;
