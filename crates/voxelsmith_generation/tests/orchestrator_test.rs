//! Orchestrator behaviour against scripted predictors.
//!
//! Run with: cargo test --package voxelsmith_generation --test orchestrator_test

use serde_json::{json, Value};
use voxelsmith_generation::{
    GenerationError, ObjectRequest, Orchestrator, PredictionOutcome, PredictionRequest, Predictor, QualityProfile,
    ScenarioRequest, TextureRequest,
};
use voxelsmith_procedural::TextureKind;

fn stool() -> Value {
    json!({
        "name": "stool",
        "bounds": [8, 9, 8],
        "primitives": [
            { "type": "cylinder", "position": [1, 7, 1], "size": [6, 2, 6], "material": "wood" },
            { "type": "cylinder", "position": [1, 0, 1], "size": [2, 7, 2], "material": "metal" },
            { "type": "cylinder", "position": [5, 0, 1], "size": [2, 7, 2], "material": "metal" },
            { "type": "cylinder", "position": [1, 0, 5], "size": [2, 7, 2], "material": "metal" },
            { "type": "cylinder", "position": [5, 0, 5], "size": [2, 7, 2], "material": "metal" },
            { "type": "torus", "position": [1, 3, 1], "size": [6, 1, 6], "material": "rubber" },
            { "type": "sphere", "position": [3, 8, 3], "size": [2, 1, 2], "material": "cloth" }
        ]
    })
}

fn single_box() -> Value {
    json!([{ "type": "box", "position": [0, 0, 0], "size": [6, 6, 6], "material": "stone" }])
}

/// Returns the same payload forever and logs every request.
struct Constant {
    payload: Value,
    calls: Vec<(String, f32, String)>,
}

impl Constant {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            calls: Vec::new(),
        }
    }
}

impl Predictor for Constant {
    async fn predict(&mut self, request: PredictionRequest<'_>) -> PredictionOutcome {
        self.calls
            .push((request.model.to_string(), request.temperature, request.prompt.to_string()));
        PredictionOutcome::ok(self.payload.clone())
    }
}

/// Fails every call with the same message.
struct Failing {
    message: &'static str,
    calls: usize,
}

impl Predictor for Failing {
    async fn predict(&mut self, request: PredictionRequest<'_>) -> PredictionOutcome {
        self.calls += 1;
        PredictionOutcome::failed(format!("{} (attempt {})", self.message, request.attempt))
    }
}

/// Rejects one model as unavailable and answers for every other.
struct Gate {
    missing: &'static str,
    payload: Value,
}

impl Predictor for Gate {
    async fn predict(&mut self, request: PredictionRequest<'_>) -> PredictionOutcome {
        if request.model == self.missing {
            PredictionOutcome::failed(format!("The model `{}` does not exist", request.model))
        } else {
            PredictionOutcome::ok(self.payload.clone()).with_model_used(format!("{}-live", request.model))
        }
    }
}

#[tokio::test]
async fn test_same_blueprint_selects_first_attempt() {
    let request = ObjectRequest::new("a bar stool");
    let mut scores = Vec::new();
    for _ in 0..2 {
        let mut orchestrator = Orchestrator::new(Constant::new(stool()));
        let result = orchestrator.generate_object(&request).await.unwrap();
        println!(
            "score {:.4}, attempts {}, defects {:?}",
            result.report.best_score,
            result.report.attempts_made(),
            result.analysis.defects.iter().map(|d| &d.name).collect::<Vec<_>>()
        );
        assert_eq!(result.report.selected_attempt, Some(1));
        assert_eq!(result.object.effective_bounds, [8, 9, 8]);
        scores.push(result.report.best_score);
    }
    assert_eq!(scores[0].to_bits(), scores[1].to_bits());
}

#[tokio::test]
async fn test_fatal_failures_stop_after_planned_attempts() {
    let mut orchestrator = Orchestrator::new(Failing {
        message: "invalid api key",
        calls: 0,
    });
    let request = ObjectRequest::new("a lamp").with_profile(QualityProfile::High);
    let err = orchestrator.generate_object(&request).await.unwrap_err();
    let text = err.to_string();
    println!("{text}");

    match &err {
        GenerationError::GenerationFailure { attempts, reasons } => {
            assert_eq!(*attempts, 5);
            assert_eq!(reasons.len(), 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    for attempt in 1..=5 {
        assert!(text.contains(&format!("attempt {attempt}: ")));
        assert!(text.contains(&format!("invalid api key (attempt {attempt})")));
    }
    assert_eq!(orchestrator.into_predictor().calls, 5);
}

#[tokio::test]
async fn test_retryable_failures_walk_every_candidate() {
    let mut orchestrator = Orchestrator::new(Failing {
        message: "429 rate limit",
        calls: 0,
    });
    let request = ObjectRequest::new("a lamp").with_profile(QualityProfile::Fast);
    let err = orchestrator.generate_object(&request).await.unwrap_err();
    assert!(matches!(err, GenerationError::GenerationFailure { attempts: 2, .. }));
    // Three ladder models per attempt.
    assert_eq!(orchestrator.predictor().calls, 6);
}

#[tokio::test]
async fn test_unavailable_model_falls_through() {
    let mut orchestrator = Orchestrator::new(Gate {
        missing: "gpt-4o-mini",
        payload: stool(),
    });
    let request = ObjectRequest::new("a bar stool").with_attempts(1);
    let result = orchestrator.generate_object(&request).await.unwrap();
    let record = &result.report.attempts[0];
    assert!(record.success);
    assert_eq!(record.planned_model, "gpt-4o-mini");
    assert_eq!(record.used_model.as_deref(), Some("gpt-4o-live"));
    assert_eq!(record.failure_reasons.len(), 1);
    assert!(record.failure_reasons[0].contains("does not exist"));
    assert_eq!(result.report.selected_model.as_deref(), Some("gpt-4o-live"));
}

#[tokio::test]
async fn test_escalation_and_feedback() {
    let mut orchestrator = Orchestrator::new(Constant::new(single_box()));
    let request = ObjectRequest::new("a fox").with_profile(QualityProfile::High);
    let result = orchestrator.generate_object(&request).await.unwrap();
    assert!(!result.report.target_reached);
    assert_eq!(result.report.attempts_made(), 5);

    let calls = &orchestrator.predictor().calls;
    let models: Vec<&str> = calls.iter().map(|(m, _, _)| m.as_str()).collect();
    println!("models: {models:?}");
    assert_eq!(models, vec!["gpt-4o-mini", "gpt-4o-mini", "gpt-4o-mini", "gpt-4o", "gpt-4o"]);
    assert!(calls.windows(2).all(|w| w[1].1 >= w[0].1));

    assert!(!calls[0].2.contains("Previous attempt feedback"));
    assert!(calls[1].2.contains("Previous attempt feedback"));
}

#[tokio::test]
async fn test_strict_mode_rejects_below_target() {
    let mut orchestrator = Orchestrator::new(Constant::new(single_box()));
    let request = ObjectRequest::new("a fox")
        .with_profile(QualityProfile::Ultra)
        .with_attempts(2)
        .strict();
    let err = orchestrator.generate_object(&request).await.unwrap_err();
    match err {
        GenerationError::QualityBelowTarget { best, target } => {
            println!("best {best:.3} target {target:.3}");
            assert!(best < target);
            assert!((target - 0.82).abs() < 1e-6);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_oversize_request_fails_each_attempt() {
    let huge = json!([{ "type": "box", "position": [0, 0, 0], "size": [500, 500, 500], "material": "stone" }]);
    let mut orchestrator = Orchestrator::new(Constant::new(huge));
    let err = orchestrator
        .generate_object(&ObjectRequest::new("a mountain").with_attempts(2))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("safety limit"), "{err}");
    assert_eq!(orchestrator.predictor().calls.len(), 2);
}

#[tokio::test]
async fn test_scenario_enriches_predicted_layout() {
    let layout = json!({
        "mode": "voronoi",
        "regions": [{ "type": "desert", "rect": [0, 0, 32, 32] }]
    });
    let mut orchestrator = Orchestrator::new(Constant::new(layout));
    let request = ScenarioRequest::new("a desert oasis", (32, 32, 24)).with_seed(11).with_attempts(1);
    let result = orchestrator.generate_scenario(&request).await.unwrap();
    println!("realism {:.3} penalties {:?}", result.realism.score, result.realism.penalties);
    assert!(!result.report.fallback_used);
    assert!(result.build.enrichment.fired("oasis"));
    assert!(result.build.layout.has_water());
    assert_eq!(result.build.terrain.grid.data().len(), 32 * 32 * 24);
}

#[tokio::test]
async fn test_scenario_falls_back_when_everything_fails() {
    let mut orchestrator = Orchestrator::new(Failing {
        message: "service down",
        calls: 0,
    });
    let request = ScenarioRequest::new("snowy mountains", (24, 24, 16)).with_seed(5).with_attempts(2);
    let result = orchestrator.generate_scenario(&request).await.unwrap();
    assert!(result.report.fallback_used);
    assert_eq!(result.report.selected_attempt, None);
    assert_eq!(result.report.attempts_made(), 2);
    assert_eq!(result.build.terrain.grid.width(), 24);
    assert!(result.build.terrain.grid.filled_count() > 0);
}

#[tokio::test]
async fn test_texture_from_prediction_and_fallback() {
    let params = json!({ "kind": "marble", "scale": 2.0, "base_color": "#e0ddd5", "accent_color": [90, 90, 100] });
    let mut orchestrator = Orchestrator::new(Constant::new(params));
    let request = TextureRequest::new("polished marble").with_seed(3).with_size(32).with_attempts(1);
    let result = orchestrator.generate_texture(&request).await.unwrap();
    assert_eq!(result.candidate.params.kind, TextureKind::Marble);
    assert_eq!(result.candidate.texture.rgb.len(), 32 * 32 * 3);
    assert!((0.0..=1.0).contains(&result.score));

    let mut failing = Orchestrator::new(Failing {
        message: "service down",
        calls: 0,
    });
    let fallback = failing
        .generate_texture(&TextureRequest::new("old wood planks").with_attempts(1))
        .await
        .unwrap();
    assert!(fallback.report.fallback_used);
    assert_eq!(fallback.candidate.params.kind, TextureKind::Wood);
}

#[test]
fn test_blocking_driver() {
    let mut orchestrator = Orchestrator::new(Constant::new(stool()));
    let result = orchestrator
        .generate_object_blocking(&ObjectRequest::new("a bar stool").with_attempts(1))
        .unwrap();
    assert_eq!(result.report.attempts_planned, 1);
    assert!(result.object.grid.filled_count() > 0);
}
