//! # Predictor Capability
//!
//! The external prediction service is injected by the caller. It owns all
//! transport, auth and timeout logic; the loops only await it, one call at a
//! time.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;

/// One prediction call.
#[derive(Clone, Copy, Debug)]
pub struct PredictionRequest<'a> {
    /// Full prompt text.
    pub prompt: &'a str,
    /// Model to use.
    pub model: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// 1-based attempt number.
    pub attempt: usize,
}

/// What the predictor returned.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PredictionOutcome {
    /// True when `data` holds a prediction.
    pub success: bool,
    /// Predicted blueprint, layout or texture parameters.
    pub data: Option<Value>,
    /// Failure message.
    pub error: Option<String>,
    /// Model that actually answered, if it differs from the request.
    pub model_used: Option<String>,
}

impl PredictionOutcome {
    /// A successful prediction.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            model_used: None,
        }
    }

    /// A failed prediction.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            model_used: None,
        }
    }

    /// Records which model answered.
    #[must_use]
    pub fn with_model_used(mut self, model: impl Into<String>) -> Self {
        self.model_used = Some(model.into());
        self
    }
}

/// An external natural-language prediction service.
pub trait Predictor {
    /// Runs one prediction.
    fn predict(&mut self, request: PredictionRequest<'_>) -> impl Future<Output = PredictionOutcome>;
}
