//! # Generation Configuration
//!
//! Every tunable constant of the acceptance loops, loadable from TOML.
//! Missing keys take the built-in defaults, so a file only needs the values
//! it changes. `config/generation.toml` mirrors the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use voxelsmith_objects::ScaleOptions;

use crate::error::{GenerationError, GenerationResult};
use crate::profile::{Provider, QualityProfile};

/// Weights of the positive score terms; they sum to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Primitive-count adequacy.
    pub count: f32,
    /// Shape diversity.
    pub type_diversity: f32,
    /// Material diversity.
    pub material_diversity: f32,
    /// Fill ratio inside the detail band.
    pub fill_band: f32,
    /// Inverse largest-primitive dominance.
    pub dominance: f32,
    /// Connectivity cohesion.
    pub cohesion: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            count: 0.20,
            type_diversity: 0.15,
            material_diversity: 0.15,
            fill_band: 0.20,
            dominance: 0.10,
            cohesion: 0.20,
        }
    }
}

impl ScoringWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.count + self.type_diversity + self.material_diversity + self.fill_band + self.dominance + self.cohesion
    }
}

/// Penalty magnitudes per detected defect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Stacked thin slabs.
    pub layered_slabs: f32,
    /// One box enclosing most of the object.
    pub oversized_box: f32,
    /// A plane spanning the whole bounds.
    pub thin_plane: f32,
    /// A flat base the prompt did not ask for.
    pub baseplate: f32,
    /// Only boxes.
    pub box_only: f32,
    /// One material covers almost everything.
    pub single_material: f32,
    /// Ceiling of the fragmentation penalty.
    pub fragmentation_max: f32,
    /// Each missing semantic part.
    pub semantic: f32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            layered_slabs: 0.12,
            oversized_box: 0.15,
            thin_plane: 0.10,
            baseplate: 0.10,
            box_only: 0.10,
            single_material: 0.08,
            fragmentation_max: 0.20,
            semantic: 0.12,
        }
    }
}

/// Attempts and target of one profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettings {
    /// Planned attempts.
    pub attempts: usize,
    /// Quality target.
    pub target: f32,
}

/// Settings for every profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTable {
    /// `fast`.
    pub fast: ProfileSettings,
    /// `balanced`.
    pub balanced: ProfileSettings,
    /// `high`.
    pub high: ProfileSettings,
    /// `ultra`.
    pub ultra: ProfileSettings,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            fast: ProfileSettings { attempts: 2, target: 0.55 },
            balanced: ProfileSettings { attempts: 3, target: 0.65 },
            high: ProfileSettings { attempts: 5, target: 0.75 },
            ultra: ProfileSettings { attempts: 7, target: 0.82 },
        }
    }
}

impl ProfileTable {
    /// Settings for a profile.
    #[must_use]
    pub const fn get(&self, profile: QualityProfile) -> ProfileSettings {
        match profile {
            QualityProfile::Fast => self.fast,
            QualityProfile::Balanced => self.balanced,
            QualityProfile::High => self.high,
            QualityProfile::Ultra => self.ultra,
        }
    }
}

/// Model ladder and temperature cap of one provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Models from cheapest to strongest; rung 2 is the escalation target.
    pub ladder: Vec<String>,
    /// Highest temperature sent to this provider.
    pub temperature_cap: f32,
}

impl ProviderSettings {
    fn new(ladder: &[&str], temperature_cap: f32) -> Self {
        Self {
            ladder: ladder.iter().map(|m| (*m).to_string()).collect(),
            temperature_cap,
        }
    }
}

/// Settings for every provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderTable {
    /// `openai`.
    pub openai: ProviderSettings,
    /// `gemini`.
    pub gemini: ProviderSettings,
    /// `ollama`.
    pub ollama: ProviderSettings,
    /// `custom`.
    pub custom: ProviderSettings,
}

impl Default for ProviderTable {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::new(&["gpt-4o-mini", "gpt-4o", "gpt-4.1"], 1.2),
            gemini: ProviderSettings::new(&["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash"], 1.0),
            ollama: ProviderSettings::new(&["llama3.1", "qwen2.5", "mistral"], 1.0),
            custom: ProviderSettings::new(&["default"], 1.0),
        }
    }
}

impl ProviderTable {
    /// Settings for a provider.
    #[must_use]
    pub const fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Gemini => &self.gemini,
            Provider::Ollama => &self.ollama,
            Provider::Custom => &self.custom,
        }
    }
}

/// Temperature ramp and escalation point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Temperature added between the first and last attempt.
    pub temperature_ramp: f32,
    /// Fraction of attempts after which the ladder escalates.
    pub escalation_fraction: f32,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            temperature_ramp: 0.35,
            escalation_fraction: 0.66,
        }
    }
}

/// Object safety ceilings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectLimits {
    /// Per-axis ceiling.
    pub max_dimension: usize,
    /// Volume ceiling; larger requests shrink.
    pub max_cells: u64,
    /// Hard ceiling; larger requests fail without the override.
    pub hard_limit_cells: u64,
}

impl Default for ObjectLimits {
    fn default() -> Self {
        let scale = ScaleOptions::default();
        Self {
            max_dimension: scale.max_dimension,
            max_cells: scale.max_cells,
            hard_limit_cells: scale.hard_limit_cells,
        }
    }
}

impl ObjectLimits {
    /// Scale options with these ceilings.
    #[must_use]
    pub fn scale_options(&self, multiplier: f32, allow_oversize: bool) -> ScaleOptions {
        ScaleOptions::default()
            .with_multiplier(multiplier)
            .with_max_dimension(self.max_dimension)
            .with_max_cells(self.max_cells)
            .with_hard_limit(self.hard_limit_cells)
            .with_allow_oversize(allow_oversize)
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Attempt planning.
    pub planning: PlanningConfig,
    /// Positive score weights.
    pub scoring: ScoringWeights,
    /// Defect penalties.
    pub penalties: PenaltyConfig,
    /// Per-profile attempts and targets.
    pub profiles: ProfileTable,
    /// Per-provider ladders and caps.
    pub providers: ProviderTable,
    /// Object ceilings.
    pub objects: ObjectLimits,
}

impl GenerationConfig {
    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// `GenerationError::Config` on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> GenerationResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GenerationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// `GenerationError::Config` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> GenerationResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GenerationError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("loaded generation config from {}", path.display());
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// `GenerationError::Config` if serialization fails.
    pub fn to_toml_string(&self) -> GenerationResult<String> {
        toml::to_string(self).map_err(|e| GenerationError::Config(e.to_string()))
    }

    /// Checks value domains.
    ///
    /// # Errors
    ///
    /// `GenerationError::Config` naming the first invalid value.
    pub fn validate(&self) -> GenerationResult<()> {
        for profile in QualityProfile::ALL {
            let settings = self.profiles.get(profile);
            if settings.attempts == 0 {
                return Err(GenerationError::Config(format!("profile {} has zero attempts", profile.name())));
            }
            if !(0.0..=1.0).contains(&settings.target) {
                return Err(GenerationError::Config(format!("profile {} target outside [0, 1]", profile.name())));
            }
        }
        for provider in [Provider::OpenAi, Provider::Gemini, Provider::Ollama, Provider::Custom] {
            if self.providers.get(provider).ladder.is_empty() {
                return Err(GenerationError::Config(format!("provider {} has an empty ladder", provider.name())));
            }
        }
        if self.scoring.total() <= 0.0 {
            return Err(GenerationError::Config("scoring weights sum to zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let config = GenerationConfig::default();
        let text = config.to_toml_string().unwrap();
        let back = GenerationConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GenerationConfig::from_toml_str("[scoring]\ncount = 0.5\n\n[profiles.fast]\nattempts = 4\ntarget = 0.5\n").unwrap();
        assert_eq!(config.scoring.count, 0.5);
        assert_eq!(config.scoring.cohesion, 0.20);
        assert_eq!(config.profiles.fast.attempts, 4);
        assert_eq!(config.profiles.ultra.attempts, 7);
    }

    #[test]
    fn test_reference_file_matches_defaults() {
        let config = GenerationConfig::from_toml_str(include_str!("../config/generation.toml")).unwrap();
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GenerationConfig::from_toml_str("[profiles.high]\nattempts = 0\ntarget = 0.7\n").unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
        assert!(GenerationConfig::from_toml_str("scoring = 3").is_err());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-6);
    }
}
