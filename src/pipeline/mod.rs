//! Structured output for downstream pipeline ingestion.

pub mod emitter;

pub use emitter::{records_for_file, PipeLog};
