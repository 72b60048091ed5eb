//! # Generation Error Types
//!
//! Errors surfaced by the acceptance loops.

use thiserror::Error;
use voxelsmith_core::CoreError;

/// Errors that can occur while orchestrating a generation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// No attempt produced a usable prediction.
    #[error("generation failed after {attempts} attempt(s): {}", reasons.join("; "))]
    GenerationFailure {
        /// Attempts made.
        attempts: usize,
        /// One entry per failure, prefixed with its attempt number.
        reasons: Vec<String>,
    },

    /// Best score stayed below the target in strict mode.
    #[error("quality below target: best {best:.3} < target {target:.3}")]
    QualityBelowTarget {
        /// Best score reached.
        best: f32,
        /// Required score.
        target: f32,
    },

    /// The request itself is unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A report or payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The blocking runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Grid or safety error from the core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
