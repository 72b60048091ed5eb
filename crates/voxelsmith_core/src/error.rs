//! # Core Error Types
//!
//! Errors raised while constructing or validating grids.

use thiserror::Error;

/// Errors that can occur in the core grid layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Raw data length does not match the declared dimensions.
    #[error("dimension mismatch: expected {expected} cells ({dims}), got {actual}")]
    DimensionMismatch {
        /// Declared dimensions, formatted `WxHxD`.
        dims: String,
        /// Product of the declared dimensions.
        expected: usize,
        /// Length of the supplied data.
        actual: usize,
    },

    /// A requested volume exceeds the configured ceiling.
    #[error("safety limit exceeded: requested {requested} cells, limit is {limit} (set allow_oversize to override)")]
    SafetyLimitExceeded {
        /// Requested cell count.
        requested: u64,
        /// Configured ceiling.
        limit: u64,
    },

    /// A parameter is outside its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
