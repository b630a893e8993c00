//! Error types for the classification engine.
//!
//! Application layers (CLI, config, providers) use `anyhow`; the engine
//! reports its contract violations through [`EngineError`] so callers can
//! tell them apart.

use thiserror::Error;

/// Errors raised by the classifier, aggregators and ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The scorer produced a value outside [-1, 1] (or NaN).
    #[error("sentiment score {score} for item #{index} is outside [-1, 1]")]
    InvalidScore { index: usize, score: f64 },

    /// `record` was called on an aggregator that has already been finalized.
    #[error("{component} is finalized and no longer accepts records")]
    IllegalState { component: &'static str },

    /// An item reached the daily aggregator without a creation timestamp.
    #[error("item #{index} has no creation timestamp")]
    InvalidTimestamp { index: usize },

    /// A threshold table whose cut points overlap or are not finite.
    #[error("invalid threshold table: {0}")]
    InvalidThresholds(String),
}
