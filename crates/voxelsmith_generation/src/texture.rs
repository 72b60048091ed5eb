//! Texture acceptance: predicted parameters, synthesized and scored by
//! luminance statistics.

use serde_json::Value;
use voxelsmith_procedural::{texture_metrics, Texture, TextureKind, TextureMetrics, TextureParams, TextureSynthesizer};

use crate::error::{GenerationError, GenerationResult};
use crate::orchestrator::{block_on, run_attempts, CandidateEvaluator, Evaluation, EvaluationError, Orchestrator};
use crate::plan::{AttemptPlan, PlanRequest, PlannedAttempt};
use crate::predictor::Predictor;
use crate::profile::{DetailLevel, Provider, QualityProfile};
use crate::report::{Penalty, QualityReport};
use crate::scoring::band_score;

const CONTRAST_BAND: (f32, f32) = (0.04, 0.3);
const LUMINANCE_BAND: (f32, f32) = (0.15, 0.85);
const EDGE_BAND: (f32, f32) = (0.01, 0.25);

/// Request for one texture.
#[derive(Clone, Debug)]
pub struct TextureRequest {
    /// Free-text description.
    pub description: String,
    /// Quality profile.
    pub profile: QualityProfile,
    /// Provider family.
    pub provider: Provider,
    /// Attempt count override.
    pub attempts: Option<usize>,
    /// Requested model.
    pub model: Option<String>,
    /// Synthesis seed.
    pub seed: u64,
    /// Square size override.
    pub size: Option<usize>,
}

impl TextureRequest {
    /// A balanced request.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            profile: QualityProfile::default(),
            provider: Provider::default(),
            attempts: None,
            model: None,
            seed: 0,
            size: None,
        }
    }

    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets a square size.
    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Overrides the attempt count.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
        self
    }
}

/// A synthesized texture with its parameters and statistics.
#[derive(Clone, Debug)]
pub struct TextureCandidate {
    /// Parameters used.
    pub params: TextureParams,
    /// RGB pixels.
    pub texture: Texture,
    /// Luminance statistics.
    pub metrics: TextureMetrics,
}

/// Result of a texture run.
#[derive(Clone, Debug)]
pub struct TextureGeneration {
    /// Selected texture.
    pub candidate: TextureCandidate,
    /// Its score.
    pub score: f32,
    /// Run report.
    pub report: QualityReport,
}

/// Scores luminance statistics; returns score, penalties and feedback.
#[must_use]
pub fn score_texture(metrics: &TextureMetrics) -> (f32, Vec<Penalty>, Vec<String>) {
    let mut penalties = Vec::new();
    let mut feedback = Vec::new();
    let contrast = band_score(metrics.contrast, CONTRAST_BAND);
    let luminance = band_score(metrics.mean_luminance, LUMINANCE_BAND);
    let edges = band_score(metrics.edge_energy, EDGE_BAND);

    if metrics.contrast < 0.01 {
        penalties.push(Penalty {
            name: "flat_texture".into(),
            amount: 0.2,
        });
        feedback.push("texture is nearly uniform; raise contrast or pick contrasting colors".to_string());
    }
    if luminance < 1.0 {
        feedback.push(format!(
            "mean brightness {:.2} is extreme; keep it between {} and {}",
            metrics.mean_luminance, LUMINANCE_BAND.0, LUMINANCE_BAND.1
        ));
    }
    if metrics.edge_energy > EDGE_BAND.1 {
        feedback.push("texture is noisy; lower the scale".to_string());
    }

    let weighted = 0.4 * contrast + 0.3 * luminance + 0.3 * edges;
    let total: f32 = penalties.iter().map(|p| p.amount).sum();
    ((weighted - total).clamp(0.0, 1.0), penalties, feedback)
}

fn synthesize(params: TextureParams) -> TextureCandidate {
    let texture = TextureSynthesizer::new(params.clone()).synthesize();
    let metrics = texture_metrics(&texture);
    TextureCandidate {
        params,
        texture,
        metrics,
    }
}

fn compose_texture_prompt(description: &str) -> String {
    let kinds: Vec<&str> = TextureKind::ALL.iter().map(|k| k.name()).collect();
    format!(
        "Design a tileable texture: {}\n\
         Return JSON {{\"kind\" ({}), \"scale\", \"contrast\", \"base_color\", \"accent_color\"}} \
         with colors as \"#rrggbb\" or [r, g, b].",
        description.trim(),
        kinds.join(", ")
    )
}

struct TextureEvaluator<'a> {
    request: &'a TextureRequest,
}

impl CandidateEvaluator for TextureEvaluator<'_> {
    type Candidate = TextureCandidate;

    fn evaluate(&mut self, data: &Value, attempt: &PlannedAttempt) -> Result<Evaluation<TextureCandidate>, EvaluationError> {
        if !data.is_object() {
            return Err(EvaluationError::Retryable("texture parameters are not a json object".to_string()));
        }
        let (mut params, warnings) = TextureParams::from_json(data, self.request.seed);
        if !warnings.is_empty() {
            tracing::debug!("attempt {}: {} texture warning(s)", attempt.index, warnings.len());
        }
        if let Some(size) = self.request.size {
            params = params.with_size(size, size);
        }
        let candidate = synthesize(params);
        let (score, penalties, feedback) = score_texture(&candidate.metrics);
        Ok(Evaluation {
            score,
            penalties,
            metrics: serde_json::to_value(candidate.metrics).ok(),
            feedback,
            candidate,
        })
    }
}

impl<P: Predictor> Orchestrator<P> {
    /// Generates a texture; falls back to keyword parameters when every
    /// prediction fails.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for an empty description.
    pub async fn generate_texture(&mut self, request: &TextureRequest) -> GenerationResult<TextureGeneration> {
        if request.description.trim().is_empty() {
            return Err(GenerationError::InvalidRequest("texture description is empty".to_string()));
        }
        let plan = AttemptPlan::build(
            &PlanRequest {
                profile: request.profile,
                detail: DetailLevel::Medium,
                provider: request.provider,
                attempts: request.attempts,
                model: request.model.clone(),
                pin_model: false,
            },
            &self.config,
        );
        let prompt = compose_texture_prompt(&request.description);
        let mut evaluator = TextureEvaluator { request };
        let outcome = run_attempts(&mut self.predictor, &plan, &prompt, &mut evaluator).await;
        let mut report = outcome.report;

        if let Some(selected) = outcome.best {
            return Ok(TextureGeneration {
                score: selected.evaluation.score,
                candidate: selected.evaluation.candidate,
                report,
            });
        }

        tracing::warn!("no texture prediction succeeded, using keyword fallback");
        let mut params = TextureParams::fallback(&request.description, request.seed);
        if let Some(size) = request.size {
            params = params.with_size(size, size);
        }
        let candidate = synthesize(params);
        let (score, _, _) = score_texture(&candidate.metrics);
        report.fallback_used = true;
        report.best_score = score;
        report.target_reached = score >= report.target;
        Ok(TextureGeneration {
            candidate,
            score,
            report,
        })
    }

    /// Blocking form of [`Orchestrator::generate_texture`].
    ///
    /// # Errors
    ///
    /// As `generate_texture`, plus `Runtime` if no runtime can be started.
    pub fn generate_texture_blocking(&mut self, request: &TextureRequest) -> GenerationResult<TextureGeneration> {
        block_on(self.generate_texture(request))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_texture_penalized() {
        let flat = TextureMetrics {
            mean_luminance: 0.5,
            contrast: 0.0,
            edge_energy: 0.0,
        };
        let (score, penalties, feedback) = score_texture(&flat);
        assert_eq!(penalties.len(), 1);
        assert!(!feedback.is_empty());
        assert!(score < 0.2);
    }

    #[test]
    fn test_reasonable_texture_scores_high() {
        let good = TextureMetrics {
            mean_luminance: 0.45,
            contrast: 0.12,
            edge_energy: 0.05,
        };
        let (score, penalties, _) = score_texture(&good);
        assert!(penalties.is_empty());
        assert!((score - 1.0).abs() < 1e-6);
    }
}
