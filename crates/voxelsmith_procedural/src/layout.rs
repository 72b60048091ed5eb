//! # Scenario Layouts
//!
//! A layout is the compact description a scenario is synthesized from:
//! map size, blend mode, biome regions and tunables.
//!
//! Layouts usually arrive as JSON from an external predictor. Parsing is
//! lenient: malformed regions are dropped with a warning and unknown biome
//! names become plains, so one bad entry never aborts a generation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::biome::BiomeKind;

/// An axis-aligned biome region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeRegion {
    /// Biome kind.
    pub kind: BiomeKind,
    /// Optional label (reported in slots and diagnostics).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// `[x, y, w, h]` in grid cells.
    pub rect: [u32; 4],
    /// Elevation override in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f32>,
    /// Elevation variation override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_variation: Option<f32>,
    /// Moisture override in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<f32>,
    /// Surface material name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_material: Option<String>,
    /// Underground material name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underground_material: Option<String>,
    /// Height-threshold bracket `[min, max)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_range: Option<[f32; 2]>,
}

impl BiomeRegion {
    /// Creates a region with default overrides.
    #[must_use]
    pub fn new(kind: BiomeKind, rect: [u32; 4]) -> Self {
        Self {
            kind,
            label: None,
            rect,
            elevation: None,
            elevation_variation: None,
            moisture: None,
            surface_material: None,
            underground_material: None,
            height_range: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the height-threshold bracket.
    #[must_use]
    pub fn with_height_range(mut self, min: f32, max: f32) -> Self {
        self.height_range = Some([min, max]);
        self
    }

    /// Sets the elevation override.
    #[must_use]
    pub fn with_elevation(mut self, elevation: f32) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Returns true if the cell lies inside the rect.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        let [rx, ry, rw, rh] = self.rect.map(|v| v as usize);
        x >= rx && x < rx + rw && y >= ry && y < ry + rh
    }

    /// Elevation after applying the kind default.
    #[must_use]
    pub fn effective_elevation(&self) -> f32 {
        self.elevation.unwrap_or(self.kind.defaults().elevation).clamp(0.0, 1.0)
    }

    /// Variation after applying the kind default.
    #[must_use]
    pub fn effective_variation(&self) -> f32 {
        self.elevation_variation
            .unwrap_or(self.kind.defaults().variation)
            .clamp(0.0, 1.0)
    }

    /// Label, or the kind name.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.kind.name())
    }
}

/// How regions are turned into per-cell weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// One global heightmap; regions claim height brackets.
    HeightThreshold,
    /// Scattered sites with soft, noise-perturbed boundaries.
    #[default]
    Voronoi,
}

/// Voronoi-blend tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiSettings {
    /// Explicit site count; derived from map area when `None`.
    pub site_count: Option<usize>,
    /// Minimum site spacing in cells; derived when `None`.
    pub min_spacing: Option<f32>,
    /// Distance over which neighbouring sites fade, in cells.
    pub blend_radius: f32,
    /// Sites considered per cell.
    pub k_nearest: usize,
    /// Boundary perturbation as a fraction of the blend radius.
    pub boundary_noise: f32,
    /// Pick free-site biomes by climate fitness instead of uniformly.
    pub climate_selection: bool,
}

impl Default for VoronoiSettings {
    fn default() -> Self {
        Self {
            site_count: None,
            min_spacing: None,
            blend_radius: 10.0,
            k_nearest: 4,
            boundary_noise: 0.6,
            climate_selection: true,
        }
    }
}

/// Temperature source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureMode {
    /// Warm equator along the map's middle row.
    #[default]
    Latitude,
    /// Warm center, cold rim.
    Radial,
    /// Pure noise.
    Noise,
}

/// Climate tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateSettings {
    /// Temperature source.
    pub temperature_mode: TemperatureMode,
    /// Added to every temperature sample.
    pub temperature_bias: f32,
    /// Temperature lost per unit of elevation above 0.5.
    pub elevation_cooling: f32,
    /// Added to every moisture sample.
    pub moisture_bias: f32,
    /// Maximum moisture gained next to water.
    pub coastal_boost: f32,
    /// Distance in cells over which the coastal boost fades.
    pub coastal_range: f32,
    /// Moisture attenuation per unit of upwind elevation excess.
    pub rain_shadow: f32,
    /// Noise frequency in cycles per cell.
    pub noise_scale: f32,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            temperature_mode: TemperatureMode::Latitude,
            temperature_bias: 0.0,
            elevation_cooling: 0.6,
            moisture_bias: 0.0,
            coastal_boost: 0.3,
            coastal_range: 12.0,
            rain_shadow: 1.2,
            noise_scale: 0.02,
        }
    }
}

/// River tracing tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverSettings {
    /// Number of rivers to trace.
    pub count: usize,
    /// Minimum seed elevation.
    pub source_min_elevation: f32,
    /// Walks stop once they drop below this elevation.
    pub stop_elevation: f32,
    /// Meander bias strength.
    pub meander: f32,
    /// Proximity radius in cells.
    pub width: f32,
    /// Height removed at the river centerline.
    pub carve_depth: f32,
    /// Hard cap on path length.
    pub max_steps: usize,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            count: 0,
            source_min_elevation: 0.6,
            stop_elevation: 0.3,
            meander: 0.04,
            width: 1.5,
            carve_depth: 0.06,
            max_steps: 4096,
        }
    }
}

/// Vegetation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationSettings {
    /// Run the vegetation pass.
    pub enabled: bool,
    /// Multiplier on each biome's default density.
    pub density: f32,
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            density: 1.0,
        }
    }
}

/// A complete scenario description.
///
/// Deserialized layouts pass through the same size clamps as
/// [`ScenarioLayout::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayoutFields")]
pub struct ScenarioLayout {
    /// Free-text description (drives enrichment).
    pub description: String,
    /// Cells along X.
    pub width: usize,
    /// Cells along Y.
    pub height: usize,
    /// Vertical cells.
    pub depth: usize,
    /// Generation seed.
    pub seed: u64,
    /// Blend mode.
    pub mode: BlendMode,
    /// Regions in scan order (later wins on overlap).
    pub regions: Vec<BiomeRegion>,
    /// Base terrain noise frequency in cycles per cell.
    pub terrain_scale: f32,
    /// Voronoi tunables.
    pub voronoi: VoronoiSettings,
    /// Climate tunables.
    pub climate: ClimateSettings,
    /// River tunables.
    pub rivers: RiverSettings,
    /// Vegetation tunables.
    pub vegetation: VegetationSettings,
}

/// Wire shape of a layout, before clamping.
#[derive(Deserialize)]
struct LayoutFields {
    #[serde(default)]
    description: String,
    width: usize,
    height: usize,
    depth: usize,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    mode: BlendMode,
    #[serde(default)]
    regions: Vec<BiomeRegion>,
    #[serde(default = "default_terrain_scale")]
    terrain_scale: f32,
    #[serde(default)]
    voronoi: VoronoiSettings,
    #[serde(default)]
    climate: ClimateSettings,
    #[serde(default)]
    rivers: RiverSettings,
    #[serde(default)]
    vegetation: VegetationSettings,
}

impl From<LayoutFields> for ScenarioLayout {
    fn from(fields: LayoutFields) -> Self {
        let mut layout = Self::new(fields.width, fields.height, fields.depth)
            .with_description(fields.description)
            .with_seed(fields.seed)
            .with_mode(fields.mode);
        layout.regions = fields
            .regions
            .into_iter()
            .map(|mut region| {
                region.elevation = region.elevation.map(|v| v.clamp(0.0, 1.0));
                region.moisture = region.moisture.map(|v| v.clamp(0.0, 1.0));
                region
            })
            .collect();
        if fields.terrain_scale.is_finite() && fields.terrain_scale > 0.0 {
            layout.terrain_scale = fields.terrain_scale;
        }
        layout.voronoi = fields.voronoi;
        layout.climate = fields.climate;
        layout.rivers = fields.rivers;
        layout.vegetation = fields.vegetation;
        layout
    }
}

fn default_terrain_scale() -> f32 {
    0.03
}

/// A layout plus the warnings produced while parsing it.
#[derive(Clone, Debug)]
pub struct ParsedLayout {
    /// The layout.
    pub layout: ScenarioLayout,
    /// Entries dropped or defaulted.
    pub warnings: Vec<String>,
}

impl ScenarioLayout {
    /// Largest accepted horizontal size.
    pub const MAX_HORIZONTAL: usize = 1024;
    /// Largest accepted vertical size.
    pub const MAX_VERTICAL: usize = 256;

    /// Creates an empty Voronoi layout.
    #[must_use]
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            description: String::new(),
            width: width.clamp(1, Self::MAX_HORIZONTAL),
            height: height.clamp(1, Self::MAX_HORIZONTAL),
            depth: depth.clamp(2, Self::MAX_VERTICAL),
            seed: 0,
            mode: BlendMode::Voronoi,
            regions: Vec::new(),
            terrain_scale: default_terrain_scale(),
            voronoi: VoronoiSettings::default(),
            climate: ClimateSettings::default(),
            rivers: RiverSettings::default(),
            vegetation: VegetationSettings::default(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BlendMode) -> Self {
        self.mode = mode;
        self
    }

    /// Appends a region.
    #[must_use]
    pub fn with_region(mut self, region: BiomeRegion) -> Self {
        self.regions.push(region);
        self
    }

    /// Whole-map rect.
    #[must_use]
    pub fn full_rect(&self) -> [u32; 4] {
        [0, 0, self.width as u32, self.height as u32]
    }

    /// Returns true if any region has the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: BiomeKind) -> bool {
        self.regions.iter().any(|r| r.kind == kind)
    }

    /// Returns true if any region floods with water.
    #[must_use]
    pub fn has_water(&self) -> bool {
        self.regions.iter().any(|r| r.kind.is_water())
    }

    /// Parses a predictor payload leniently.
    ///
    /// Missing sizes use `fallback_dims`. Regions missing a kind or with a
    /// rect of the wrong length are dropped; a missing rect covers the map.
    #[must_use]
    pub fn from_json(value: &Value, description: &str, fallback_dims: (usize, usize, usize)) -> ParsedLayout {
        let mut warnings = Vec::new();
        let dim = |keys: &[&str], fallback: usize| {
            keys.iter()
                .find_map(|k| value.get(*k).and_then(Value::as_u64))
                .map_or(fallback, |v| v as usize)
        };
        let width = dim(&["width", "w"], fallback_dims.0);
        let height = dim(&["height", "h", "length"], fallback_dims.1);
        let depth = dim(&["depth", "d", "maxHeight", "max_height"], fallback_dims.2);

        let mut layout = Self::new(width, height, depth)
            .with_description(
                value
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or(description),
            )
            .with_seed(value.get("seed").and_then(Value::as_u64).unwrap_or(0));

        if let Some(mode) = value.get("mode").and_then(Value::as_str) {
            layout.mode = match mode.to_lowercase().as_str() {
                "height_threshold" | "heightthreshold" | "threshold" | "height" => BlendMode::HeightThreshold,
                "voronoi" | "blend" | "voronoi_blend" => BlendMode::Voronoi,
                other => {
                    warnings.push(format!("unknown blend mode '{other}', using voronoi"));
                    BlendMode::Voronoi
                }
            };
        }

        if let Some(scale) = number(value, &["terrainScale", "terrain_scale", "scale"]) {
            if scale > 0.0 {
                layout.terrain_scale = scale;
            }
        }

        match value.get("rivers") {
            Some(Value::Number(n)) => layout.rivers.count = n.as_u64().unwrap_or(0) as usize,
            Some(obj @ Value::Object(_)) => {
                if let Ok(settings) = serde_json::from_value::<RiverSettings>(obj.clone()) {
                    layout.rivers = settings;
                } else {
                    warnings.push("malformed river settings ignored".to_string());
                }
            }
            Some(Value::Bool(true)) => layout.rivers.count = 1,
            _ => {}
        }

        if let Some(density) = number(value, &["vegetationDensity", "vegetation_density"]) {
            layout.vegetation.density = density.clamp(0.0, 4.0);
        }
        if let Some(sites) = value
            .get("siteCount")
            .or_else(|| value.get("site_count"))
            .and_then(Value::as_u64)
        {
            layout.voronoi.site_count = Some(sites as usize);
        }

        let entries = value
            .get("regions")
            .or_else(|| value.get("biomes"))
            .and_then(Value::as_array);
        if let Some(entries) = entries {
            for (index, entry) in entries.iter().enumerate() {
                match parse_region(entry, layout.full_rect()) {
                    Ok((region, note)) => {
                        if let Some(note) = note {
                            warnings.push(format!("region {index}: {note}"));
                        }
                        layout.regions.push(region);
                    }
                    Err(reason) => warnings.push(format!("region {index} dropped: {reason}")),
                }
            }
        }

        for warning in &warnings {
            tracing::warn!("layout: {}", warning);
        }
        ParsedLayout { layout, warnings }
    }

    /// Deterministic keyword-driven layout used when no prediction succeeds.
    #[must_use]
    pub fn fallback(description: &str, dims: (usize, usize, usize), seed: u64) -> Self {
        let mut layout = Self::new(dims.0, dims.1, dims.2)
            .with_description(description)
            .with_seed(seed);
        let (w, h) = (layout.width as u32, layout.height as u32);

        const KEYWORDS: &[(&[&str], BiomeKind)] = &[
            (&["desert", "dune", "sahara", "sandy"], BiomeKind::Desert),
            (&["snow", "snowy", "arctic", "glacier", "frozen", "winter", "icy"], BiomeKind::Snow),
            (&["jungle", "rainforest", "tropical"], BiomeKind::Jungle),
            (&["forest", "forested", "woods", "woodland", "wooded"], BiomeKind::Forest),
            (&["mountain", "mountainous", "peak", "alpine", "cliff"], BiomeKind::Mountains),
            (&["hill", "hilly", "highland"], BiomeKind::Hills),
            (&["volcano", "volcanoes", "volcanic", "lava"], BiomeKind::Volcanic),
            (&["canyon", "mesa", "badlands"], BiomeKind::Canyon),
            (&["savanna", "steppe"], BiomeKind::Savanna),
            (&["tundra"], BiomeKind::Tundra),
            (&["swamp", "swampy", "marsh", "marshy", "bog", "boggy"], BiomeKind::Swamp),
            (&["ocean", "sea"], BiomeKind::Ocean),
        ];

        let words = description_words(description);
        let kinds: Vec<BiomeKind> = KEYWORDS
            .iter()
            .filter(|(keys, _)| keys.iter().any(|k| words.contains(*k)))
            .map(|&(_, kind)| kind)
            .collect();

        if kinds.is_empty() {
            layout.regions.push(BiomeRegion::new(BiomeKind::Plains, [0, 0, w, h]));
            layout.regions.push(BiomeRegion::new(BiomeKind::Hills, [w / 2, 0, w - w / 2, h]));
        } else {
            // Vertical strips, one per matched kind.
            let n = kinds.len() as u32;
            let strip = (w / n).max(1);
            for (i, kind) in kinds.into_iter().enumerate() {
                let x = (i as u32 * strip).min(w.saturating_sub(1));
                let width = if i as u32 == n - 1 { w - x } else { strip };
                layout.regions.push(BiomeRegion::new(kind, [x, 0, width.max(1), h]));
            }
        }
        layout
    }
}

/// Lowercased words of a description, plus a singular stem for words ending
/// in `s`. Keywords match whole words only.
pub(crate) fn description_words(text: &str) -> BTreeSet<String> {
    let mut words = BTreeSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
    {
        if let Some(stem) = word.strip_suffix('s') {
            if stem.len() >= 3 {
                words.insert(stem.to_string());
            }
        }
        words.insert(word);
    }
    words
}

fn number(value: &Value, keys: &[&str]) -> Option<f32> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_f64))
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
}

fn string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Parses one region entry. Returns an optional note for defaulted fields.
fn parse_region(entry: &Value, full: [u32; 4]) -> Result<(BiomeRegion, Option<String>), String> {
    if !entry.is_object() {
        return Err("not an object".to_string());
    }
    let name = string(entry, &["type", "kind", "biome", "name"]).ok_or("missing biome type")?;
    let mut note = None;
    let kind = BiomeKind::parse(&name).unwrap_or_else(|| {
        note = Some(format!("unknown biome '{name}', using plains"));
        BiomeKind::Plains
    });

    let rect = match entry.get("rect").or_else(|| entry.get("bounds")) {
        Some(Value::Array(items)) => {
            if items.len() != 4 {
                return Err(format!("rect has {} entries, expected 4", items.len()));
            }
            let mut rect = [0u32; 4];
            for (slot, item) in rect.iter_mut().zip(items) {
                let v = item.as_f64().ok_or("rect entry is not a number")?;
                *slot = v.max(0.0) as u32;
            }
            rect
        }
        Some(_) => return Err("rect is not an array".to_string()),
        None => {
            let field = |k: &str| entry.get(k).and_then(Value::as_f64).map(|v| v.max(0.0) as u32);
            match (field("x"), field("y"), field("w").or_else(|| field("width")), field("h").or_else(|| field("height"))) {
                (Some(x), Some(y), Some(w), Some(h)) => [x, y, w, h],
                _ => full,
            }
        }
    };
    if rect[2] == 0 || rect[3] == 0 {
        return Err("rect has zero area".to_string());
    }

    let height_range = match entry.get("heightRange").or_else(|| entry.get("height_range")) {
        Some(Value::Array(items)) if items.len() == 2 => {
            match (items[0].as_f64(), items[1].as_f64()) {
                (Some(a), Some(b)) if a < b => Some([a as f32, b as f32]),
                _ => return Err("invalid height range".to_string()),
            }
        }
        Some(Value::Null) | None => None,
        Some(_) => return Err("height range must have 2 entries".to_string()),
    };

    let region = BiomeRegion {
        kind,
        label: string(entry, &["label", "id"]),
        rect,
        elevation: number(entry, &["elevation"]).map(|v| v.clamp(0.0, 1.0)),
        elevation_variation: number(entry, &["elevationVariation", "elevation_variation", "variation"]),
        moisture: number(entry, &["moisture"]).map(|v| v.clamp(0.0, 1.0)),
        surface_material: string(entry, &["surfaceMaterial", "surface_material", "surface"]),
        underground_material: string(entry, &["undergroundMaterial", "underground_material", "underground"]),
        height_range,
    };
    Ok((region, note))
}
