//! # Attempt Records and Quality Reports
//!
//! Records are appended once per attempt and never edited; the report is
//! assembled once when a run ends.

use serde::Serialize;
use serde_json::Value;

use crate::error::GenerationResult;

/// One named score deduction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Penalty {
    /// Defect name.
    pub name: String,
    /// Amount deducted.
    pub amount: f32,
}

/// One attempt of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: usize,
    /// Primary model from the plan.
    pub planned_model: String,
    /// Model that answered, if any did.
    pub used_model: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Prompt sent.
    pub prompt: String,
    /// True when a candidate was evaluated.
    pub success: bool,
    /// Candidate score.
    pub score: Option<f32>,
    /// Deductions applied to the score.
    pub penalties: Vec<Penalty>,
    /// Measurements of the candidate.
    pub metrics: Option<Value>,
    /// Every failure seen during the attempt, per candidate model.
    pub failure_reasons: Vec<String>,
}

/// Summary of a whole run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QualityReport {
    /// Attempt records in order.
    pub attempts: Vec<AttemptRecord>,
    /// Attempts in the plan.
    pub attempts_planned: usize,
    /// Attempt that produced the returned candidate.
    pub selected_attempt: Option<usize>,
    /// Model of the returned candidate.
    pub selected_model: Option<String>,
    /// Temperature of the returned candidate.
    pub selected_temperature: Option<f32>,
    /// Best score seen.
    pub best_score: f32,
    /// Profile target.
    pub target: f32,
    /// True when the run stopped at the target.
    pub target_reached: bool,
    /// True when a deterministic fallback replaced every prediction.
    pub fallback_used: bool,
    /// Object bounds before clamping.
    pub requested_bounds: Option<[usize; 3]>,
    /// Object bounds after clamping.
    pub effective_bounds: Option<[usize; 3]>,
    /// Applied clamp factor.
    pub clamp_factor: Option<f32>,
}

impl QualityReport {
    /// Attempts actually made.
    #[must_use]
    pub fn attempts_made(&self) -> usize {
        self.attempts.len()
    }

    /// Failure reasons of every attempt, prefixed with the attempt number.
    #[must_use]
    pub fn failure_reasons(&self) -> Vec<String> {
        self.attempts
            .iter()
            .flat_map(|record| {
                record
                    .failure_reasons
                    .iter()
                    .map(move |reason| format!("attempt {}: {reason}", record.attempt))
            })
            .collect()
    }

    /// Pretty JSON.
    ///
    /// # Errors
    ///
    /// `GenerationError::Serialization` if a value cannot be encoded.
    pub fn to_json_pretty(&self) -> GenerationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
