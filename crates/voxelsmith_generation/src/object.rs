//! # Object Generation
//!
//! Predict a blueprint, rasterize it, score it, keep the best.

use serde_json::Value;
use voxelsmith_core::{CoreError, MaterialTable};
use voxelsmith_objects::{rasterize, Blueprint, RasterizedObject, ScaleOptions};

use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::feedback::compose_object_prompt;
use crate::orchestrator::{block_on, run_attempts, CandidateEvaluator, Evaluation, EvaluationError, Orchestrator};
use crate::plan::{AttemptPlan, PlanRequest, PlannedAttempt};
use crate::predictor::Predictor;
use crate::profile::{DetailLevel, Provider, QualityProfile};
use crate::report::{Penalty, QualityReport};
use crate::scoring::{analyze_object, QualityAnalysis};

/// Request for one object.
#[derive(Clone, Debug)]
pub struct ObjectRequest {
    /// Free-text description.
    pub description: String,
    /// Quality profile.
    pub profile: QualityProfile,
    /// Detail level.
    pub detail: DetailLevel,
    /// Provider family.
    pub provider: Provider,
    /// Attempt count override.
    pub attempts: Option<usize>,
    /// Requested model.
    pub model: Option<String>,
    /// Never escalate away from `model`.
    pub pin_model: bool,
    /// Fail instead of returning a below-target result.
    pub strict: bool,
    /// Scale multiplier.
    pub scale: f32,
    /// Bypass the hard safety ceiling.
    pub allow_oversize: bool,
    /// Target bounds; overrides predicted bounds.
    pub bounds: Option<[usize; 3]>,
}

impl ObjectRequest {
    /// A balanced, medium-detail request.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            profile: QualityProfile::default(),
            detail: DetailLevel::default(),
            provider: Provider::default(),
            attempts: None,
            model: None,
            pin_model: false,
            strict: false,
            scale: 1.0,
            allow_oversize: false,
            bounds: None,
        }
    }

    /// Sets the profile.
    #[must_use]
    pub fn with_profile(mut self, profile: QualityProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the detail level.
    #[must_use]
    pub fn with_detail(mut self, detail: DetailLevel) -> Self {
        self.detail = detail;
        self
    }

    /// Sets the provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Overrides the attempt count.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Requests a model; `pin` disables escalation.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, pin: bool) -> Self {
        self.model = Some(model.into());
        self.pin_model = pin;
        self
    }

    /// Enables strict quality mode.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Sets the scale multiplier.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Allows requests above the hard ceiling.
    #[must_use]
    pub fn with_allow_oversize(mut self, allow: bool) -> Self {
        self.allow_oversize = allow;
        self
    }

    /// Sets target bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: [usize; 3]) -> Self {
        self.bounds = Some(bounds);
        self
    }

    fn plan_request(&self) -> PlanRequest {
        PlanRequest {
            profile: self.profile,
            detail: self.detail,
            provider: self.provider,
            attempts: self.attempts,
            model: self.model.clone(),
            pin_model: self.pin_model,
        }
    }
}

/// A built candidate.
#[derive(Clone, Debug)]
pub struct ObjectCandidate {
    /// Parsed blueprint.
    pub blueprint: Blueprint,
    /// Rasterized grid.
    pub object: RasterizedObject,
    /// Score and defects.
    pub analysis: QualityAnalysis,
}

/// Result of a successful object run.
#[derive(Clone, Debug)]
pub struct ObjectGeneration {
    /// Selected blueprint.
    pub blueprint: Blueprint,
    /// Selected rasterized object.
    pub object: RasterizedObject,
    /// Its analysis.
    pub analysis: QualityAnalysis,
    /// Run report.
    pub report: QualityReport,
}

struct ObjectEvaluator<'a> {
    description: &'a str,
    detail: DetailLevel,
    bounds: Option<[usize; 3]>,
    scale: ScaleOptions,
    config: &'a GenerationConfig,
    table: &'a MaterialTable,
}

impl CandidateEvaluator for ObjectEvaluator<'_> {
    type Candidate = ObjectCandidate;

    fn evaluate(&mut self, data: &Value, attempt: &PlannedAttempt) -> Result<Evaluation<ObjectCandidate>, EvaluationError> {
        let parsed = Blueprint::from_json(data, self.description);
        for warning in &parsed.warnings {
            tracing::debug!("attempt {}: {}", attempt.index, warning);
        }
        let mut blueprint = parsed.blueprint;
        if blueprint.additive_count() == 0 {
            return Err(EvaluationError::Retryable(format!(
                "blueprint parse produced no usable primitives ({} warning(s))",
                parsed.warnings.len()
            )));
        }
        if let Some(bounds) = self.bounds {
            blueprint.bounds = Some(bounds);
        }

        let object = rasterize(&blueprint, &self.scale, self.table).map_err(|e| match e {
            CoreError::SafetyLimitExceeded { .. } => EvaluationError::Fatal(e.to_string()),
            other => EvaluationError::Retryable(other.to_string()),
        })?;
        let analysis = analyze_object(self.description, self.detail, &object, self.config);

        Ok(Evaluation {
            score: analysis.score,
            penalties: analysis
                .defects
                .iter()
                .map(|d| Penalty {
                    name: d.name.clone(),
                    amount: d.penalty,
                })
                .collect(),
            metrics: serde_json::to_value(&analysis.metrics).ok(),
            feedback: analysis.feedback(),
            candidate: ObjectCandidate {
                blueprint,
                object,
                analysis,
            },
        })
    }
}

impl<P: Predictor> Orchestrator<P> {
    /// Generates an object.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for an empty description
    /// - `GenerationFailure` when every attempt failed
    /// - `QualityBelowTarget` in strict mode
    pub async fn generate_object(&mut self, request: &ObjectRequest) -> GenerationResult<ObjectGeneration> {
        if request.description.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("object description is empty".to_string()));
        }
        let plan = AttemptPlan::build(&request.plan_request(), &self.config);
        let base_prompt = compose_object_prompt(&request.description, request.detail, request.bounds);
        tracing::info!(
            "generating object '{}' ({} profile, {} attempt(s), target {:.2})",
            request.description,
            request.profile.name(),
            plan.len(),
            plan.target
        );

        let mut evaluator = ObjectEvaluator {
            description: &request.description,
            detail: request.detail,
            bounds: request.bounds,
            scale: self.config.objects.scale_options(request.scale, request.allow_oversize),
            config: &self.config,
            table: &self.table,
        };
        let outcome = run_attempts(&mut self.predictor, &plan, &base_prompt, &mut evaluator).await;
        let (selected, mut report) = outcome.conclude(request.strict)?;

        let ObjectCandidate {
            blueprint,
            object,
            analysis,
        } = selected.evaluation.candidate;
        report.requested_bounds = Some(object.requested_bounds);
        report.effective_bounds = Some(object.effective_bounds);
        report.clamp_factor = Some(object.clamp_factor);

        Ok(ObjectGeneration {
            blueprint,
            object,
            analysis,
            report,
        })
    }

    /// Blocking form of [`Orchestrator::generate_object`].
    ///
    /// # Errors
    ///
    /// As `generate_object`, plus `Runtime` if no runtime can be started.
    pub fn generate_object_blocking(&mut self, request: &ObjectRequest) -> GenerationResult<ObjectGeneration> {
        block_on(self.generate_object(request))?
    }
}
