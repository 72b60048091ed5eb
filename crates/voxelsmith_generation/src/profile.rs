//! # Profiles, Detail Levels and Providers
//!
//! Named knobs a caller picks per request. Numeric values live in
//! `GenerationConfig` so they can be tuned from TOML; the enums only select
//! which entry applies.

use serde::{Deserialize, Serialize};

/// Quality profile: how many attempts and how high the bar is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityProfile {
    /// 2 attempts, target 0.55.
    Fast,
    /// 3 attempts, target 0.65.
    #[default]
    Balanced,
    /// 5 attempts, target 0.75.
    High,
    /// 7 attempts, target 0.82.
    Ultra,
}

impl QualityProfile {
    /// Every profile.
    pub const ALL: [Self; 4] = [Self::Fast, Self::Balanced, Self::High, Self::Ultra];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }

    /// Parses a name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        Self::ALL.iter().copied().find(|p| p.name() == key)
    }
}

/// Requested amount of detail; drives temperatures and fill expectations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Few primitives, chunky shapes.
    Low,
    /// Default.
    #[default]
    Medium,
    /// Many primitives, fine structure.
    High,
}

impl DetailLevel {
    /// Base sampling temperature for the first attempt.
    #[must_use]
    pub const fn base_temperature(self) -> f32 {
        match self {
            Self::Low => 0.4,
            Self::Medium => 0.55,
            Self::High => 0.65,
        }
    }

    /// Expected fill ratio band `(min, max)` of the bounding grid.
    #[must_use]
    pub const fn fill_band(self) -> (f32, f32) {
        match self {
            Self::Low => (0.15, 0.7),
            Self::Medium => (0.1, 0.6),
            Self::High => (0.06, 0.5),
        }
    }

    /// Primitive count at which count adequacy saturates.
    #[must_use]
    pub const fn min_primitives(self) -> usize {
        match self {
            Self::Low => 3,
            Self::Medium => 6,
            Self::High => 12,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Prediction provider family; selects a model ladder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Hosted OpenAI models.
    #[default]
    OpenAi,
    /// Hosted Gemini models.
    Gemini,
    /// Local Ollama models.
    Ollama,
    /// Caller-defined ladder.
    Custom,
}

impl Provider {
    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::Custom => "custom",
        }
    }

    /// Parses a name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "gpt" => Some(Self::OpenAi),
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" | "local" => Some(Self::Ollama),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}
