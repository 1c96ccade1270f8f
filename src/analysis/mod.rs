//! Analysis modules.
//!
//! Classification, before/after matching and run-level aggregation of
//! linter findings. Everything here is pure: no I/O, no logging beyond
//! debug statistics.

pub mod aggregator;
pub mod classifier;
pub mod matcher;

pub use aggregator::aggregate;
