//! # VOXELSMITH Generation
//!
//! Quality-driven acceptance loops around an injected prediction service.
//!
//! ## Design Principles
//!
//! 1. **Explicit state machine**: One `Phase` loop drives every attempt
//! 2. **Sequential**: Attempts and candidate models never overlap
//! 3. **Best wins**: Every candidate is scored, only a strictly better one
//!    replaces the retained result
//! 4. **Tunable**: Weights, penalties, profiles and ladders load from TOML
//!
//! ## Core Components
//!
//! - `Predictor`: The injected async capability
//! - `AttemptPlan`: Attempts, temperatures and model escalation
//! - `classify_failure`: Unavailable / retryable / fatal
//! - `analyze_object` / `detect_defects`: Object scoring
//! - `Orchestrator`: Object, scenario and texture runs
//! - `QualityReport`: Append-only attempt records
//!
//! ## Example
//!
//! ```rust
//! use voxelsmith_generation::{ObjectRequest, Orchestrator, PredictionOutcome, PredictionRequest, Predictor};
//!
//! struct Canned;
//!
//! impl Predictor for Canned {
//!     async fn predict(&mut self, _request: PredictionRequest<'_>) -> PredictionOutcome {
//!         PredictionOutcome::ok(serde_json::json!({
//!             "name": "stool",
//!             "primitives": [
//!                 { "type": "cylinder", "position": [0, 4, 0], "size": [6, 1, 6], "material": "wood" },
//!                 { "type": "cylinder", "position": [2, 0, 2], "size": [2, 4, 2], "material": "metal" }
//!             ]
//!         }))
//!     }
//! }
//!
//! let mut orchestrator = Orchestrator::new(Canned);
//! let result = orchestrator.generate_object_blocking(&ObjectRequest::new("a stool"))?;
//! assert_eq!(result.report.selected_attempt, Some(1));
//! # Ok::<(), voxelsmith_generation::GenerationError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod defects;
pub mod error;
pub mod failure;
pub mod feedback;
pub mod object;
pub mod orchestrator;
pub mod plan;
pub mod predictor;
pub mod profile;
pub mod report;
pub mod scenario;
pub mod scoring;
pub mod texture;

pub use config::{
    GenerationConfig, ObjectLimits, PenaltyConfig, PlanningConfig, ProfileSettings, ProfileTable, ProviderSettings,
    ProviderTable, ScoringWeights,
};
pub use defects::{detect_defects, prompt_words, Defect, SemanticRule, SEMANTIC_RULES};
pub use error::{GenerationError, GenerationResult};
pub use failure::{classify_failure, FailureClass};
pub use feedback::{compose_object_prompt, rewrite_prompt};
pub use object::{ObjectCandidate, ObjectGeneration, ObjectRequest};
pub use orchestrator::{
    block_on, run_attempts, CandidateEvaluator, Evaluation, EvaluationError, LoopOutcome, Orchestrator, Selected,
};
pub use plan::{AttemptPlan, PlanRequest, PlannedAttempt};
pub use predictor::{PredictionOutcome, PredictionRequest, Predictor};
pub use profile::{DetailLevel, Provider, QualityProfile};
pub use report::{AttemptRecord, Penalty, QualityReport};
pub use scenario::{score_scenario, RealismScore, ScenarioGeneration, ScenarioRequest, MAX_SCENARIO_CELLS};
pub use scoring::{analyze_object, band_score, CandidateMetrics, QualityAnalysis, ScoreBreakdown};
pub use texture::{score_texture, TextureCandidate, TextureGeneration, TextureRequest};
