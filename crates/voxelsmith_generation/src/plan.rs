//! # Attempt Planning
//!
//! Turns a profile, detail level and provider into a fixed list of attempts,
//! each with its primary model and temperature. Planning is pure; the loop
//! only reads the plan.

use serde::Serialize;

use crate::config::GenerationConfig;
use crate::profile::{DetailLevel, Provider, QualityProfile};

/// Inputs that shape an attempt plan.
#[derive(Clone, Debug, Default)]
pub struct PlanRequest {
    /// Quality profile.
    pub profile: QualityProfile,
    /// Detail level.
    pub detail: DetailLevel,
    /// Provider family.
    pub provider: Provider,
    /// Attempt count override.
    pub attempts: Option<usize>,
    /// Caller-requested model.
    pub model: Option<String>,
    /// Never escalate away from `model`.
    pub pin_model: bool,
}

/// One planned attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlannedAttempt {
    /// 1-based attempt number.
    pub index: usize,
    /// First model to try.
    pub model: String,
    /// Model to try right after the primary when escalated.
    pub escalation_fallback: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// True once the ladder moved to rung 2.
    pub escalated: bool,
}

/// The full attempt plan of one run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttemptPlan {
    /// Attempts in order.
    pub attempts: Vec<PlannedAttempt>,
    /// Score at which the run stops early.
    pub target: f32,
    /// Caller-requested model.
    pub requested_model: Option<String>,
    /// Provider ladder.
    pub ladder: Vec<String>,
}

impl AttemptPlan {
    /// Builds the plan.
    #[must_use]
    pub fn build(request: &PlanRequest, config: &GenerationConfig) -> Self {
        let profile = config.profiles.get(request.profile);
        let provider = config.providers.get(request.provider);
        let count = request.attempts.unwrap_or(profile.attempts).max(1);

        let base = request.detail.base_temperature();
        let ramp = config.planning.temperature_ramp;
        let cap = provider.temperature_cap;
        let escalate_from = escalation_start(count, config.planning.escalation_fraction);

        let requested = request.model.clone().filter(|m| !m.trim().is_empty());
        let pinned = request.pin_model && requested.is_some();
        let default_model = requested
            .clone()
            .or_else(|| provider.ladder.first().cloned())
            .unwrap_or_default();

        let attempts = (0..count)
            .map(|i| {
                let progress = if count > 1 { i as f32 / (count - 1) as f32 } else { 0.0 };
                let temperature = (base + progress * ramp).min(cap);
                let escalated = !pinned && i >= escalate_from && provider.ladder.len() > 1;
                let (model, escalation_fallback) = if escalated {
                    (provider.ladder[1].clone(), provider.ladder.first().cloned())
                } else {
                    (default_model.clone(), None)
                };
                PlannedAttempt {
                    index: i + 1,
                    model,
                    escalation_fallback,
                    temperature,
                    escalated,
                }
            })
            .collect();

        Self {
            attempts,
            target: profile.target,
            requested_model: requested,
            ladder: provider.ladder.clone(),
        }
    }

    /// Planned attempt count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// True when nothing is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Candidate models for an attempt: primary, escalation fallback,
    /// requested model, then the ladder; deduplicated in order.
    #[must_use]
    pub fn candidates(&self, attempt: &PlannedAttempt) -> Vec<String> {
        let ordered = std::iter::once(attempt.model.clone())
            .chain(attempt.escalation_fallback.clone())
            .chain(self.requested_model.clone())
            .chain(self.ladder.iter().cloned());

        let mut out: Vec<String> = Vec::new();
        for model in ordered {
            if !model.is_empty() && !out.contains(&model) {
                out.push(model);
            }
        }
        out
    }
}

/// 0-based index of the first escalated attempt: every attempt after the
/// first `fraction` of the plan. The first attempt never escalates.
fn escalation_start(count: usize, fraction: f32) -> usize {
    let start = (count as f32 * fraction.clamp(0.0, 1.0)).floor() as usize;
    start.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(request: &PlanRequest) -> AttemptPlan {
        AttemptPlan::build(request, &GenerationConfig::default())
    }

    #[test]
    fn test_profile_attempt_counts() {
        for (profile, expected) in [
            (QualityProfile::Fast, 2),
            (QualityProfile::Balanced, 3),
            (QualityProfile::High, 5),
            (QualityProfile::Ultra, 7),
        ] {
            let p = plan(&PlanRequest { profile, ..PlanRequest::default() });
            assert_eq!(p.len(), expected);
            assert_eq!(p.attempts[0].index, 1);
        }
    }

    #[test]
    fn test_temperature_ramps_and_caps() {
        let p = plan(&PlanRequest {
            profile: QualityProfile::Ultra,
            detail: DetailLevel::High,
            provider: Provider::Gemini,
            ..PlanRequest::default()
        });
        let temps: Vec<f32> = p.attempts.iter().map(|a| a.temperature).collect();
        println!("temperatures: {temps:?}");
        assert!((temps[0] - 0.65).abs() < 1e-6);
        assert!(temps.windows(2).all(|w| w[1] >= w[0]));
        assert!(temps.iter().all(|t| *t <= 1.0));
    }

    #[test]
    fn test_escalation_after_two_thirds() {
        let p = plan(&PlanRequest { profile: QualityProfile::High, ..PlanRequest::default() });
        let escalated: Vec<bool> = p.attempts.iter().map(|a| a.escalated).collect();
        assert_eq!(escalated, vec![false, false, false, true, true]);
        assert_eq!(p.attempts[4].model, "gpt-4o");
        assert_eq!(p.attempts[4].escalation_fallback.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(p.attempts[0].model, "gpt-4o-mini");
    }

    #[test]
    fn test_pinned_model_never_escalates() {
        let p = plan(&PlanRequest {
            profile: QualityProfile::Ultra,
            model: Some("my-model".into()),
            pin_model: true,
            ..PlanRequest::default()
        });
        assert!(p.attempts.iter().all(|a| a.model == "my-model" && !a.escalated));
    }

    #[test]
    fn test_candidates_are_deduplicated_in_order() {
        let p = plan(&PlanRequest {
            profile: QualityProfile::High,
            model: Some("gpt-4o".into()),
            ..PlanRequest::default()
        });
        let first = p.candidates(&p.attempts[0]);
        assert_eq!(first, vec!["gpt-4o", "gpt-4o-mini", "gpt-4.1"]);
        let last = p.candidates(&p.attempts[4]);
        assert_eq!(last, vec!["gpt-4o", "gpt-4o-mini", "gpt-4.1"]);
    }
}
