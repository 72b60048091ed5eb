//! # Texture Synthesis
//!
//! Procedural RGB textures built from the same noise primitives as terrain.
//! A `TextureParams` set is small enough for a predictor to emit as JSON;
//! unknown or malformed fields fall back to per-kind defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::noise::{lerp, smoothstep, GradientNoise, WorldSeed};

/// Smallest texture edge.
pub const MIN_TEXTURE_SIZE: usize = 8;
/// Largest texture edge.
pub const MAX_TEXTURE_SIZE: usize = 1024;

/// Texture pattern families.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    /// Mottled rock.
    #[default]
    Stone,
    /// Rock broken by cell-edge cracks.
    Cracked,
    /// Warped growth rings.
    Wood,
    /// Wind ripples with grain.
    Sand,
    /// Dense blades over mottled soil.
    Grass,
    /// Warped sinusoidal veins.
    Marble,
    /// Bright ridged channels on dark crust.
    Lava,
}

impl TextureKind {
    /// Every kind.
    pub const ALL: [Self; 7] = [
        Self::Stone,
        Self::Cracked,
        Self::Wood,
        Self::Sand,
        Self::Grass,
        Self::Marble,
        Self::Lava,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stone => "stone",
            Self::Cracked => "cracked",
            Self::Wood => "wood",
            Self::Sand => "sand",
            Self::Grass => "grass",
            Self::Marble => "marble",
            Self::Lava => "lava",
        }
    }

    /// Parses a name or alias.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        if let Some(kind) = Self::ALL.iter().find(|k| k.name() == key) {
            return Some(*kind);
        }
        match key.as_str() {
            "rock" | "cobble" | "granite" => Some(Self::Stone),
            "cracks" | "cracked_stone" | "broken" => Some(Self::Cracked),
            "bark" | "planks" | "timber" => Some(Self::Wood),
            "dune" | "desert" => Some(Self::Sand),
            "moss" | "lawn" | "meadow" => Some(Self::Grass),
            "magma" | "molten" => Some(Self::Lava),
            _ => None,
        }
    }

    /// Default `(base, accent)` colours.
    #[must_use]
    pub const fn palette(self) -> ([u8; 3], [u8; 3]) {
        match self {
            Self::Stone => ([96, 96, 100], [150, 148, 145]),
            Self::Cracked => ([120, 116, 110], [40, 38, 36]),
            Self::Wood => ([110, 72, 40], [168, 120, 72]),
            Self::Sand => ([194, 170, 120], [226, 206, 160]),
            Self::Grass => ([58, 96, 40], [110, 160, 70]),
            Self::Marble => ([230, 228, 222], [120, 118, 125]),
            Self::Lava => ([40, 18, 12], [255, 140, 30]),
        }
    }
}

/// Parameters for one texture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureParams {
    /// Pattern family.
    pub kind: TextureKind,
    /// Pixels along X.
    pub width: usize,
    /// Pixels along Y.
    pub height: usize,
    /// Seed.
    pub seed: u64,
    /// Feature scale; larger values give finer detail.
    pub scale: f32,
    /// Colour at pattern value 0.
    pub base_color: [u8; 3],
    /// Colour at pattern value 1.
    pub accent_color: [u8; 3],
    /// Contrast multiplier around the midpoint.
    pub contrast: f32,
}

impl TextureParams {
    /// Defaults for a kind.
    #[must_use]
    pub fn new(kind: TextureKind) -> Self {
        let (base_color, accent_color) = kind.palette();
        Self {
            kind,
            width: 64,
            height: 64,
            seed: 0,
            scale: 1.0,
            base_color,
            accent_color,
            contrast: 1.0,
        }
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the size, clamped to the supported range.
    #[must_use]
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.clamp(MIN_TEXTURE_SIZE, MAX_TEXTURE_SIZE);
        self.height = height.clamp(MIN_TEXTURE_SIZE, MAX_TEXTURE_SIZE);
        self
    }

    /// Lenient parse of predictor output.
    ///
    /// Returns the parameters plus warnings for every field that was
    /// ignored or clamped.
    #[must_use]
    pub fn from_json(value: &Value, seed: u64) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let kind = match value.get("kind").or_else(|| value.get("type")).and_then(Value::as_str) {
            Some(name) => TextureKind::parse(name).unwrap_or_else(|| {
                warnings.push(format!("unknown texture kind '{name}', using stone"));
                TextureKind::Stone
            }),
            None => {
                warnings.push("texture kind missing, using stone".to_string());
                TextureKind::Stone
            }
        };

        let mut params = Self::new(kind).with_seed(seed);
        let size = |key: &str| value.get(key).and_then(Value::as_u64).map(|v| v as usize);
        if let Some(s) = size("size") {
            params = params.with_size(s, s);
        }
        if let (Some(w), Some(h)) = (size("width"), size("height")) {
            params = params.with_size(w, h);
        }
        if let Some(scale) = value.get("scale").and_then(Value::as_f64) {
            let clamped = (scale as f32).clamp(0.1, 8.0);
            if (clamped - scale as f32).abs() > f32::EPSILON {
                warnings.push(format!("texture scale {scale} clamped to {clamped}"));
            }
            params.scale = clamped;
        }
        if let Some(contrast) = value.get("contrast").and_then(Value::as_f64) {
            params.contrast = (contrast as f32).clamp(0.0, 3.0);
        }
        for (key, slot) in [("base_color", &mut params.base_color), ("accent_color", &mut params.accent_color)] {
            match value.get(key) {
                None => {}
                Some(raw) => match parse_color(raw) {
                    Some(color) => *slot = color,
                    None => warnings.push(format!("ignored malformed {key}")),
                },
            }
        }
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        (params, warnings)
    }

    /// Keyword-driven parameters for when no prediction is usable.
    #[must_use]
    pub fn fallback(description: &str, seed: u64) -> Self {
        let text = description.to_lowercase();
        let kind = TextureKind::ALL
            .iter()
            .copied()
            .find(|k| text.contains(k.name()))
            .or_else(|| text.split_whitespace().find_map(TextureKind::parse))
            .unwrap_or_default();
        Self::new(kind).with_seed(seed)
    }
}

fn parse_color(raw: &Value) -> Option<[u8; 3]> {
    match raw {
        Value::Array(items) if items.len() == 3 => {
            let mut color = [0u8; 3];
            for (slot, item) in color.iter_mut().zip(items) {
                *slot = item.as_u64()?.min(255) as u8;
            }
            Some(color)
        }
        Value::String(hex) => {
            let hex = hex.trim_start_matches('#');
            if hex.len() != 6 {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        _ => None,
    }
}

/// Flat RGB texture, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    /// Pixels along X.
    pub width: usize,
    /// Pixels along Y.
    pub height: usize,
    /// `3 * width * height` bytes.
    pub rgb: Vec<u8>,
}

impl Texture {
    /// Pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (x + y * self.width) * 3;
        [self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]]
    }

    fn luminance(&self) -> Vec<f32> {
        self.rgb
            .chunks_exact(3)
            .map(|p| (0.2126 * f32::from(p[0]) + 0.7152 * f32::from(p[1]) + 0.0722 * f32::from(p[2])) / 255.0)
            .collect()
    }
}

/// Generates textures from parameters.
pub struct TextureSynthesizer {
    params: TextureParams,
    noise: GradientNoise,
    detail: GradientNoise,
}

impl TextureSynthesizer {
    /// Creates a synthesizer; sizes are clamped.
    #[must_use]
    pub fn new(params: TextureParams) -> Self {
        let (w, h) = (params.width, params.height);
        let params = params.with_size(w, h);
        let seed = WorldSeed::new(params.seed).derive(crate::noise::purpose::TEXTURE);
        Self {
            noise: GradientNoise::new(seed),
            detail: GradientNoise::new(seed.derive(1)),
            params,
        }
    }

    /// Parameters in use.
    #[must_use]
    pub const fn params(&self) -> &TextureParams {
        &self.params
    }

    /// Renders the texture.
    #[must_use]
    pub fn synthesize(&self) -> Texture {
        let p = &self.params;
        let mut rgb = Vec::with_capacity(p.width * p.height * 3);
        for y in 0..p.height {
            for x in 0..p.width {
                let t = self.pattern(x as f32, y as f32);
                let t = ((t - 0.5) * p.contrast + 0.5).clamp(0.0, 1.0);
                for c in 0..3 {
                    let v = lerp(f32::from(p.base_color[c]), f32::from(p.accent_color[c]), t);
                    rgb.push(v.round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        tracing::debug!("texture {} {}x{} synthesized", p.kind.name(), p.width, p.height);
        Texture {
            width: p.width,
            height: p.height,
            rgb,
        }
    }

    /// Pattern value in [0, 1] at a pixel.
    fn pattern(&self, x: f32, y: f32) -> f32 {
        let p = &self.params;
        let s = 0.06 * p.scale;
        let (nx, ny) = (x * s, y * s);
        let value = match p.kind {
            TextureKind::Stone => {
                let grain = self.detail.hash01(x as i32, y as i32);
                self.noise.fbm(nx, ny, 5, 0.55) * 0.85 + grain * 0.15
            }
            TextureKind::Cracked => {
                let body = self.noise.fbm(nx, ny, 4, 0.5);
                let edge = self.detail.cellular(x, y, 14.0 / p.scale);
                // Cell borders sit far from the nearest feature point.
                let crack = smoothstep(((edge - 0.55) / 0.25).clamp(0.0, 1.0));
                body * 0.4 + crack * 0.6
            }
            TextureKind::Wood => {
                let cx = p.width as f32 * 0.5;
                let r = ((x - cx) * (x - cx) * 0.04 + (y * 0.02) * (y * 0.02)).sqrt();
                let warp = self.noise.fbm(nx, ny * 0.3, 3, 0.5);
                0.5 + 0.5 * ((r * 3.0 * p.scale + warp * 6.0).sin())
            }
            TextureKind::Sand => {
                let drift = self.noise.fbm(nx, ny, 3, 0.5);
                let ripple = 0.5 + 0.5 * ((nx * 6.0 + ny * 1.5 + drift * 4.0).sin());
                ripple * 0.7 + self.detail.hash01(x as i32, y as i32) * 0.3
            }
            TextureKind::Grass => {
                let soil = self.noise.fbm(nx, ny, 4, 0.5);
                let blade = self.detail.hash01(x as i32, (y * 0.5) as i32);
                soil * 0.45 + blade * 0.55
            }
            TextureKind::Marble => {
                let warp = self.noise.warped(nx, ny, 1.5, 4);
                let vein = 0.5 + 0.5 * ((nx * 4.0 + warp * 8.0).sin());
                1.0 - vein.powi(6)
            }
            TextureKind::Lava => {
                let channels = self.noise.ridged(nx, ny, 4);
                let heat = self.detail.fbm(nx * 2.0, ny * 2.0, 3, 0.5);
                (channels.powi(3) * 0.8 + heat * 0.2).min(1.0)
            }
        };
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Summary statistics used to accept or reject a texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureMetrics {
    /// Mean luminance in [0, 1].
    pub mean_luminance: f32,
    /// Standard deviation of luminance.
    pub contrast: f32,
    /// Mean absolute luminance difference to right/down neighbours.
    pub edge_energy: f32,
}

/// Computes luminance statistics for a texture.
#[must_use]
pub fn texture_metrics(texture: &Texture) -> TextureMetrics {
    let lum = texture.luminance();
    if lum.is_empty() {
        return TextureMetrics::default();
    }
    let n = lum.len() as f32;
    let mean = lum.iter().sum::<f32>() / n;
    let variance = lum.iter().map(|l| (l - mean) * (l - mean)).sum::<f32>() / n;

    let (w, h) = (texture.width, texture.height);
    let mut edges = 0.0;
    let mut pairs = 0usize;
    for y in 0..h {
        for x in 0..w {
            let here = lum[x + y * w];
            if x + 1 < w {
                edges += (lum[x + 1 + y * w] - here).abs();
                pairs += 1;
            }
            if y + 1 < h {
                edges += (lum[x + (y + 1) * w] - here).abs();
                pairs += 1;
            }
        }
    }

    TextureMetrics {
        mean_luminance: mean,
        contrast: variance.sqrt(),
        edge_energy: if pairs == 0 { 0.0 } else { edges / pairs as f32 },
    }
}
