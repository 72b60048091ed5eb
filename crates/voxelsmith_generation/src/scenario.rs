//! # Scenario Acceptance
//!
//! Predict a layout, run it through enrichment, the biome field and the
//! terrain builder, then score the relief for realism. When every
//! prediction fails a keyword-driven layout is built instead.

use serde_json::Value;
use voxelsmith_core::{MaterialTable, ReliefMetrics};
use voxelsmith_procedural::{generate_scenario as build_scenario, BiomeKind, ScenarioBuild, ScenarioLayout};

use crate::error::{GenerationError, GenerationResult};
use crate::orchestrator::{block_on, run_attempts, CandidateEvaluator, Evaluation, EvaluationError, Orchestrator};
use crate::plan::{AttemptPlan, PlanRequest, PlannedAttempt};
use crate::predictor::Predictor;
use crate::profile::{DetailLevel, Provider, QualityProfile};
use crate::report::{Penalty, QualityReport};
use crate::scoring::band_score;

/// Scenario cell ceiling.
pub const MAX_SCENARIO_CELLS: u64 = 16_000_000;

const SLOPE_BAND: (f32, f32) = (0.004, 0.12);
const WET_BAND: (f32, f32) = (0.05, 0.55);
const DRY_BAND: (f32, f32) = (0.0, 0.35);

/// Request for one scenario.
#[derive(Clone, Debug)]
pub struct ScenarioRequest {
    /// Free-text description.
    pub description: String,
    /// Quality profile.
    pub profile: QualityProfile,
    /// Detail level; sets the sampling temperature.
    pub detail: DetailLevel,
    /// Provider family.
    pub provider: Provider,
    /// Attempt count override.
    pub attempts: Option<usize>,
    /// Requested model.
    pub model: Option<String>,
    /// Never escalate away from `model`.
    pub pin_model: bool,
    /// Grid size `(width, height, depth)`; z is up.
    pub dims: (usize, usize, usize),
    /// Seed for layouts that do not carry one.
    pub seed: u64,
}

impl ScenarioRequest {
    /// A balanced request.
    #[must_use]
    pub fn new(description: impl Into<String>, dims: (usize, usize, usize)) -> Self {
        Self {
            description: description.into(),
            profile: QualityProfile::default(),
            detail: DetailLevel::default(),
            provider: Provider::default(),
            attempts: None,
            model: None,
            pin_model: false,
            dims,
            seed: 0,
        }
    }

    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the profile.
    #[must_use]
    pub fn with_profile(mut self, profile: QualityProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Overrides the attempt count.
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = Some(attempts);
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

    fn validate(&self) -> GenerationResult<()> {
        let (w, h, d) = self.dims;
        if w == 0 || h == 0 || d == 0 {
            return Err(GenerationError::InvalidRequest(format!("scenario dims {w}x{h}x{d} must be positive")));
        }
        let cells = w as u64 * h as u64 * d as u64;
        if cells > MAX_SCENARIO_CELLS {
            return Err(GenerationError::Core(voxelsmith_core::CoreError::SafetyLimitExceeded {
                requested: cells,
                limit: MAX_SCENARIO_CELLS,
            }));
        }
        Ok(())
    }
}

/// Realism score of a built scenario.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RealismScore {
    /// Final score in `[0, 1]`.
    pub score: f32,
    /// Deductions.
    pub penalties: Vec<Penalty>,
    /// Feedback lines.
    pub feedback: Vec<String>,
}

/// Scores relief, water, land regions and biome diversity.
#[must_use]
pub fn score_scenario(build: &ScenarioBuild) -> RealismScore {
    let relief: &ReliefMetrics = &build.relief;
    let wants_water = build.layout.has_water();
    let mut feedback = Vec::new();
    let mut penalties = Vec::new();

    let slope = band_score(relief.mean_slope, SLOPE_BAND);
    let water = band_score(relief.water_coverage, if wants_water { WET_BAND } else { DRY_BAND });
    let land = match relief.land_regions {
        0 => 0.0,
        1..=4 => 1.0,
        n => 4.0 / n as f32,
    };
    let distinct = build.field.coverage().iter().filter(|c| **c >= 0.05).count();
    let diversity = (distinct as f32 / 3.0).min(1.0);

    if relief.mean_slope < 0.002 {
        penalties.push(Penalty { name: "flat_terrain".into(), amount: 0.15 });
        feedback.push("terrain is almost flat; vary region elevations".to_string());
    }
    if relief.water_coverage > 0.8 {
        penalties.push(Penalty { name: "flooded".into(), amount: 0.2 });
        feedback.push("most of the map is under water; raise land regions".to_string());
    }
    if wants_water && build.terrain.water_cells == 0 {
        penalties.push(Penalty { name: "missing_water".into(), amount: 0.15 });
        feedback.push(format!("water regions produced no water; lower their elevation (try {})", BiomeKind::Lake.name()));
    }
    if distinct < 2 {
        feedback.push("only one biome is visible; add contrasting regions".to_string());
    }

    let weighted = 0.3 * slope + 0.3 * water + 0.2 * land + 0.2 * diversity;
    let total: f32 = penalties.iter().map(|p| p.amount).sum();
    RealismScore {
        score: (weighted - total).clamp(0.0, 1.0),
        penalties,
        feedback,
    }
}

fn compose_scenario_prompt(request: &ScenarioRequest) -> String {
    let kinds: Vec<&str> = BiomeKind::ALL.iter().map(|k| k.name()).collect();
    let (w, h, d) = request.dims;
    format!(
        "Design a terrain layout: {}\n\
         Return JSON {{\"mode\": \"voronoi\" | \"height_threshold\", \"regions\": [...]}} where each region has \
         \"type\" ({}), \"rect\" [x, y, w, h], optional \"elevation\", \"elevationVariation\", \"moisture\" \
         and \"heightRange\" [min, max). The map is {w} x {h} cells with {d} voxel levels.",
        request.description.trim(),
        kinds.join(", ")
    )
}

/// Result of a scenario run.
#[derive(Clone, Debug)]
pub struct ScenarioGeneration {
    /// Built scenario.
    pub build: ScenarioBuild,
    /// Its realism score.
    pub realism: RealismScore,
    /// Run report.
    pub report: QualityReport,
}

struct ScenarioEvaluator<'a> {
    request: &'a ScenarioRequest,
    table: &'a MaterialTable,
}

impl CandidateEvaluator for ScenarioEvaluator<'_> {
    type Candidate = (ScenarioBuild, RealismScore);

    fn evaluate(&mut self, data: &Value, attempt: &PlannedAttempt) -> Result<Evaluation<Self::Candidate>, EvaluationError> {
        let parsed = ScenarioLayout::from_json(data, &self.request.description, self.request.dims);
        let mut layout = parsed.layout;
        if layout.regions.is_empty() {
            return Err(EvaluationError::Retryable(format!(
                "layout parse produced no regions ({} warning(s))",
                parsed.warnings.len()
            )));
        }
        let (w, h, d) = self.request.dims;
        if (layout.width, layout.height, layout.depth) != (w, h, d) {
            tracing::debug!(
                "attempt {}: predicted size {}x{}x{} replaced by {w}x{h}x{d}",
                attempt.index,
                layout.width,
                layout.height,
                layout.depth
            );
            layout.width = w;
            layout.height = h;
            layout.depth = d;
        }
        if layout.seed == 0 {
            layout.seed = self.request.seed;
        }

        let build = build_scenario(layout, self.table);
        let realism = score_scenario(&build);
        Ok(Evaluation {
            score: realism.score,
            penalties: realism.penalties.clone(),
            metrics: serde_json::to_value(build.summary()).ok(),
            feedback: realism.feedback.clone(),
            candidate: (build, realism),
        })
    }
}

impl<P: Predictor> Orchestrator<P> {
    /// Generates a scenario; falls back to a keyword layout when every
    /// prediction fails.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for zero dims, `Core` for oversized dims.
    pub async fn generate_scenario(&mut self, request: &ScenarioRequest) -> GenerationResult<ScenarioGeneration> {
        request.validate()?;
        let plan = AttemptPlan::build(&request.plan_request(), &self.config);
        let prompt = compose_scenario_prompt(request);
        tracing::info!("generating scenario '{}' ({} attempt(s))", request.description, plan.len());

        let mut evaluator = ScenarioEvaluator {
            request,
            table: &self.table,
        };
        let outcome = run_attempts(&mut self.predictor, &plan, &prompt, &mut evaluator).await;
        let mut report = outcome.report;

        match outcome.best {
            Some(selected) => {
                if !report.target_reached {
                    tracing::warn!(
                        "scenario realism {:.3} below target {:.3}, returning best effort",
                        report.best_score,
                        report.target
                    );
                }
                let (build, realism) = selected.evaluation.candidate;
                Ok(ScenarioGeneration { build, realism, report })
            }
            None => {
                tracing::warn!(
                    "no scenario prediction succeeded ({}), using keyword fallback",
                    report.failure_reasons().join("; ")
                );
                let layout = ScenarioLayout::fallback(&request.description, request.dims, request.seed);
                let build = build_scenario(layout, &self.table);
                let realism = score_scenario(&build);
                report.fallback_used = true;
                report.best_score = realism.score;
                report.target_reached = realism.score >= report.target;
                Ok(ScenarioGeneration { build, realism, report })
            }
        }
    }

    /// Blocking form of [`Orchestrator::generate_scenario`].
    ///
    /// # Errors
    ///
    /// As `generate_scenario`, plus `Runtime` if no runtime can be started.
    pub fn generate_scenario_blocking(&mut self, request: &ScenarioRequest) -> GenerationResult<ScenarioGeneration> {
        block_on(self.generate_scenario(request))?
    }
}
