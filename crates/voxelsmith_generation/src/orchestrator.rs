//! # Attempt Orchestrator
//!
//! The acceptance loop shared by objects, scenarios and textures:
//!
//! ```text
//! PlanAttempt → TryModel → Evaluate → AcceptBest ──→ TargetReached
//!      ↑           ↑   │       │          │
//!      │     TryNextModel ←────┤          │
//!      └──── NextAttempt ←─────┴──────────┘ → Exhausted
//! ```
//!
//! Attempts and candidate models run strictly one after another. The only
//! value that crosses an attempt boundary is the previous candidate's score
//! and feedback, which rewrites the next prompt.

use std::future::Future;

use serde_json::Value;
use voxelsmith_core::MaterialTable;

use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::failure::classify_failure;
use crate::feedback::rewrite_prompt;
use crate::plan::{AttemptPlan, PlannedAttempt};
use crate::predictor::{PredictionRequest, Predictor};
use crate::report::{AttemptRecord, Penalty, QualityReport};

/// A scored candidate.
#[derive(Clone, Debug)]
pub struct Evaluation<T> {
    /// The built candidate.
    pub candidate: T,
    /// Score in `[0, 1]`.
    pub score: f32,
    /// Deductions included in the score.
    pub penalties: Vec<Penalty>,
    /// Measurements for the attempt record.
    pub metrics: Option<Value>,
    /// Feedback lines for the next prompt.
    pub feedback: Vec<String>,
}

/// Why a prediction could not be turned into a candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluationError {
    /// Try the next candidate model.
    Retryable(String),
    /// Give up on this attempt.
    Fatal(String),
}

/// Turns predictor output into scored candidates.
pub trait CandidateEvaluator {
    /// Candidate type.
    type Candidate;

    /// Builds and scores one prediction.
    ///
    /// # Errors
    ///
    /// `EvaluationError` when the data cannot be built into a candidate.
    fn evaluate(&mut self, data: &Value, attempt: &PlannedAttempt) -> Result<Evaluation<Self::Candidate>, EvaluationError>;
}

/// The retained candidate of a run.
#[derive(Clone, Debug)]
pub struct Selected<T> {
    /// Its evaluation.
    pub evaluation: Evaluation<T>,
    /// Attempt that produced it.
    pub attempt: usize,
    /// Model that produced it.
    pub model: String,
    /// Temperature it was sampled at.
    pub temperature: f32,
}

/// Result of one acceptance loop.
#[derive(Clone, Debug)]
pub struct LoopOutcome<T> {
    /// Best candidate, if any attempt succeeded.
    pub best: Option<Selected<T>>,
    /// Attempt records and selection.
    pub report: QualityReport,
}

impl<T> LoopOutcome<T> {
    /// Applies the termination policy.
    ///
    /// # Errors
    ///
    /// - `GenerationFailure` when no attempt produced a candidate, listing
    ///   every attempt's reasons
    /// - `QualityBelowTarget` when `strict` and the best score is short
    pub fn conclude(self, strict: bool) -> GenerationResult<(Selected<T>, QualityReport)> {
        let Self { best, report } = self;
        let Some(best) = best else {
            return Err(GenerationError::GenerationFailure {
                attempts: report.attempts_made(),
                reasons: report.failure_reasons(),
            });
        };
        if !report.target_reached {
            if strict {
                return Err(GenerationError::QualityBelowTarget {
                    best: report.best_score,
                    target: report.target,
                });
            }
            tracing::warn!(
                "quality target not reached: best {:.3} < target {:.3}, returning best effort",
                report.best_score,
                report.target
            );
        }
        Ok((best, report))
    }
}

/// Per-attempt working state, moved from phase to phase.
struct AttemptState<'p> {
    planned: &'p PlannedAttempt,
    candidates: Vec<String>,
    next: usize,
    prompt: String,
    reasons: Vec<String>,
}

impl AttemptState<'_> {
    fn failed_record(self) -> AttemptRecord {
        AttemptRecord {
            attempt: self.planned.index,
            planned_model: self.planned.model.clone(),
            used_model: None,
            temperature: self.planned.temperature,
            prompt: self.prompt,
            success: false,
            score: None,
            penalties: Vec::new(),
            metrics: None,
            failure_reasons: self.reasons,
        }
    }
}

enum Phase<'p, T> {
    PlanAttempt,
    TryModel(AttemptState<'p>),
    Evaluate {
        state: AttemptState<'p>,
        data: Value,
        model: String,
    },
    AcceptBest {
        state: AttemptState<'p>,
        evaluation: Evaluation<T>,
        model: String,
    },
    TryNextModel(AttemptState<'p>),
    NextAttempt(AttemptState<'p>),
    Exhausted,
    TargetReached,
}

/// Runs an attempt plan against a predictor.
pub async fn run_attempts<P, E>(
    predictor: &mut P,
    plan: &AttemptPlan,
    base_prompt: &str,
    evaluator: &mut E,
) -> LoopOutcome<E::Candidate>
where
    P: Predictor,
    E: CandidateEvaluator,
{
    let mut index = 0usize;
    let mut records: Vec<AttemptRecord> = Vec::with_capacity(plan.len());
    let mut best: Option<Selected<E::Candidate>> = None;
    let mut previous: Option<(f32, Vec<String>)> = None;

    let mut phase: Phase<'_, E::Candidate> = Phase::PlanAttempt;
    let target_reached = loop {
        phase = match phase {
            Phase::PlanAttempt => match plan.attempts.get(index) {
                None => Phase::Exhausted,
                Some(planned) => {
                    let prompt = match &previous {
                        Some((score, feedback)) => rewrite_prompt(base_prompt, Some(*score), feedback),
                        None => base_prompt.to_string(),
                    };
                    tracing::info!(
                        "attempt {}/{}: model {} at temperature {:.2}{}",
                        planned.index,
                        plan.len(),
                        planned.model,
                        planned.temperature,
                        if planned.escalated { " (escalated)" } else { "" }
                    );
                    Phase::TryModel(AttemptState {
                        planned,
                        candidates: plan.candidates(planned),
                        next: 0,
                        prompt,
                        reasons: Vec::new(),
                    })
                }
            },

            Phase::TryModel(mut state) => match state.candidates.get(state.next).cloned() {
                None => Phase::NextAttempt(state),
                Some(model) => {
                    let outcome = predictor
                        .predict(PredictionRequest {
                            prompt: &state.prompt,
                            model: &model,
                            temperature: state.planned.temperature,
                            attempt: state.planned.index,
                        })
                        .await;
                    match outcome.data.filter(|_| outcome.success) {
                        Some(data) => Phase::Evaluate {
                            state,
                            data,
                            model: outcome.model_used.unwrap_or(model),
                        },
                        None => {
                            let message = outcome.error.unwrap_or_else(|| "empty prediction".to_string());
                            let class = classify_failure(&message);
                            tracing::debug!("model {} failed ({:?}): {}", model, class, message);
                            state.reasons.push(format!("{model}: {message}"));
                            if class.tries_next_candidate() {
                                Phase::TryNextModel(state)
                            } else {
                                Phase::NextAttempt(state)
                            }
                        }
                    }
                }
            },

            Phase::Evaluate { mut state, data, model } => match evaluator.evaluate(&data, state.planned) {
                Ok(evaluation) => Phase::AcceptBest { state, evaluation, model },
                Err(EvaluationError::Retryable(message)) => {
                    state.reasons.push(format!("{model}: {message}"));
                    Phase::TryNextModel(state)
                }
                Err(EvaluationError::Fatal(message)) => {
                    state.reasons.push(format!("{model}: {message}"));
                    Phase::NextAttempt(state)
                }
            },

            Phase::AcceptBest { state, evaluation, model } => {
                let planned = state.planned;
                tracing::info!("attempt {} scored {:.3} with {}", planned.index, evaluation.score, model);
                records.push(AttemptRecord {
                    attempt: planned.index,
                    planned_model: planned.model.clone(),
                    used_model: Some(model.clone()),
                    temperature: planned.temperature,
                    prompt: state.prompt,
                    success: true,
                    score: Some(evaluation.score),
                    penalties: evaluation.penalties.clone(),
                    metrics: evaluation.metrics.clone(),
                    failure_reasons: state.reasons,
                });
                previous = Some((evaluation.score, evaluation.feedback.clone()));

                if best.as_ref().map_or(true, |b| evaluation.score > b.evaluation.score) {
                    best = Some(Selected {
                        evaluation,
                        attempt: planned.index,
                        model,
                        temperature: planned.temperature,
                    });
                }
                index += 1;

                if best.as_ref().is_some_and(|b| b.evaluation.score >= plan.target) {
                    Phase::TargetReached
                } else {
                    Phase::PlanAttempt
                }
            }

            Phase::TryNextModel(mut state) => {
                state.next += 1;
                Phase::TryModel(state)
            }

            Phase::NextAttempt(state) => {
                tracing::warn!(
                    "attempt {} failed: {}",
                    state.planned.index,
                    state.reasons.join("; ")
                );
                records.push(state.failed_record());
                index += 1;
                Phase::PlanAttempt
            }

            Phase::Exhausted => break false,
            Phase::TargetReached => break true,
        };
    };

    if target_reached {
        tracing::info!("quality target {:.2} reached after {} attempt(s)", plan.target, records.len());
    }

    let report = QualityReport {
        attempts: records,
        attempts_planned: plan.len(),
        selected_attempt: best.as_ref().map(|b| b.attempt),
        selected_model: best.as_ref().map(|b| b.model.clone()),
        selected_temperature: best.as_ref().map(|b| b.temperature),
        best_score: best.as_ref().map_or(0.0, |b| b.evaluation.score),
        target: plan.target,
        target_reached,
        ..QualityReport::default()
    };
    LoopOutcome { best, report }
}

/// Drives a future to completion on a current-thread runtime.
///
/// # Errors
///
/// `GenerationError::Runtime` when the runtime cannot be built.
pub fn block_on<F: Future>(future: F) -> GenerationResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| GenerationError::Runtime(e.to_string()))?;
    Ok(runtime.block_on(future))
}

/// Owns the predictor, configuration and material table for generation runs.
pub struct Orchestrator<P> {
    pub(crate) predictor: P,
    pub(crate) config: GenerationConfig,
    pub(crate) table: MaterialTable,
}

impl<P: Predictor> Orchestrator<P> {
    /// Creates an orchestrator with default configuration and materials.
    #[must_use]
    pub fn new(predictor: P) -> Self {
        Self {
            predictor,
            config: GenerationConfig::default(),
            table: MaterialTable::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the material table.
    #[must_use]
    pub fn with_materials(mut self, table: MaterialTable) -> Self {
        self.table = table;
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Material table in use.
    #[must_use]
    pub const fn materials(&self) -> &MaterialTable {
        &self.table
    }

    /// The predictor.
    #[must_use]
    pub const fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Consumes the orchestrator, returning the predictor.
    #[must_use]
    pub fn into_predictor(self) -> P {
        self.predictor
    }
}
