//! Prediction failure classification by message pattern.

use serde::Serialize;

/// How a failed prediction affects the current attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FailureClass {
    /// The model does not exist or is not served; try the next candidate.
    ModelUnavailable,
    /// Transient or malformed output; try the next candidate.
    Retryable,
    /// Stop trying models for this attempt.
    Fatal,
}

impl FailureClass {
    /// True when the next candidate model should be tried.
    #[must_use]
    pub const fn tries_next_candidate(self) -> bool {
        matches!(self, Self::ModelUnavailable | Self::Retryable)
    }
}

const UNAVAILABLE_PATTERNS: &[&str] = &[
    "model not found",
    "not found",
    "does not exist",
    "not available",
    "unknown model",
    "unsupported model",
    "404",
    "decommissioned",
    "deprecated",
];

const RETRYABLE_PATTERNS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "429",
    "timeout",
    "timed out",
    "overloaded",
    "502",
    "503",
    "json",
    "parse",
    "unexpected token",
    "temporarily",
];

/// Classifies a failure message.
#[must_use]
pub fn classify_failure(message: &str) -> FailureClass {
    let lower = message.to_lowercase();
    if UNAVAILABLE_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureClass::ModelUnavailable
    } else if RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureClass::Retryable
    } else {
        FailureClass::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(classify_failure("Model gpt-9 does not exist"), FailureClass::ModelUnavailable);
        assert_eq!(classify_failure("HTTP 404"), FailureClass::ModelUnavailable);
        assert_eq!(classify_failure("Rate limit reached"), FailureClass::Retryable);
        assert_eq!(classify_failure("Unexpected token < in JSON"), FailureClass::Retryable);
        assert_eq!(classify_failure("request timed out"), FailureClass::Retryable);
        assert_eq!(classify_failure("invalid api key"), FailureClass::Fatal);
        assert_eq!(classify_failure("content policy violation"), FailureClass::Fatal);
    }

    #[test]
    fn test_next_candidate_rules() {
        assert!(FailureClass::ModelUnavailable.tries_next_candidate());
        assert!(FailureClass::Retryable.tries_next_candidate());
        assert!(!FailureClass::Fatal.tries_next_candidate());
    }
}
