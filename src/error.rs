//! Error types for fog geometry operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while validating, combining or caching fog geometry.
///
/// None of these cross the public calculation API: the calculator records
/// them in the result metrics and falls back to a cheaper tier instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FogError {
    /// Malformed geometry rejected before any operation ran.
    #[error("invalid geometry: {0}")]
    Validation(String),

    /// The boolean-geometry routine failed or produced an unusable result.
    #[error("geometry operation failed: {0}")]
    Operation(String),

    /// Caller-supplied parameters are unusable (inverted viewport, zero capacity, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fast-fail because the circuit breaker is open.
    #[error("circuit open, next trial in {retry_in:?}")]
    CircuitOpen {
        /// Time remaining until the breaker admits a trial call.
        retry_in: Duration,
    },

    /// The revealed-area store could not be read.
    #[error("revealed-area store error: {0}")]
    Store(String),
}

impl FogError {
    /// Short name of the failure class, used to de-duplicate log lines.
    pub fn class(&self) -> &'static str {
        match self {
            FogError::Validation(_) => "validation",
            FogError::Operation(_) => "operation",
            FogError::Configuration(_) => "configuration",
            FogError::CircuitOpen { .. } => "circuit_open",
            FogError::Store(_) => "store",
        }
    }
}

/// Result type for fog operations.
pub type Result<T> = std::result::Result<T, FogError>;
