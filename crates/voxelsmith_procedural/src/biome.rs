//! # Biome Kinds
//!
//! Static per-biome defaults: materials, elevation, water level, climate
//! windows and vegetation profile.
//!
//! Defaults are immutable tables; layouts override individual fields per
//! region.

use serde::{Deserialize, Serialize};

use crate::vegetation::VegetationKind;

/// Terrain kinds a layout may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeKind {
    /// Grassland.
    Plains,
    /// Temperate forest.
    Forest,
    /// Dense jungle.
    Jungle,
    /// Arid sand desert.
    Desert,
    /// Dry grassland with scattered trees.
    Savanna,
    /// Rolling hills.
    Hills,
    /// High mountains.
    Mountains,
    /// Cold, sparse tundra.
    Tundra,
    /// Snowfields and glaciers.
    Snow,
    /// Sandy coastline.
    Beach,
    /// Open water.
    Ocean,
    /// Inland still water.
    Lake,
    /// Flowing water carved by river tracing.
    River,
    /// Wetland.
    Swamp,
    /// Basalt and lava fields.
    Volcanic,
    /// Eroded sandstone cuts.
    Canyon,
    /// Low sheltered ground between heights.
    Valley,
}

/// Static defaults for one biome kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeDefaults {
    /// Surface material name.
    pub surface: &'static str,
    /// Underground material name.
    pub underground: &'static str,
    /// Base elevation in [0, 1].
    pub elevation: f32,
    /// Elevation variation amplitude.
    pub variation: f32,
    /// Normalized water level for water kinds.
    pub water_level: Option<f32>,
    /// Minimum water cells above the bed for water kinds.
    pub min_water_depth: usize,
    /// Preferred temperature window.
    pub temperature: (f32, f32),
    /// Preferred moisture window.
    pub moisture: (f32, f32),
    /// Preferred elevation window.
    pub elevation_window: (f32, f32),
    /// Plant density in [0, 1].
    pub vegetation_density: f32,
    /// Weighted vegetation kinds.
    pub vegetation: &'static [(VegetationKind, f32)],
}

use VegetationKind as V;

const PLAINS: BiomeDefaults = BiomeDefaults {
    surface: "grass",
    underground: "dirt",
    elevation: 0.45,
    variation: 0.06,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.35, 0.75),
    moisture: (0.3, 0.7),
    elevation_window: (0.35, 0.6),
    vegetation_density: 0.04,
    vegetation: &[(V::Flower, 0.5), (V::Bush, 0.3), (V::Tree, 0.2)],
};

const FOREST: BiomeDefaults = BiomeDefaults {
    surface: "grass",
    underground: "dirt",
    elevation: 0.5,
    variation: 0.08,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.3, 0.7),
    moisture: (0.5, 0.9),
    elevation_window: (0.4, 0.7),
    vegetation_density: 0.12,
    vegetation: &[(V::Tree, 0.7), (V::Bush, 0.2), (V::Mushroom, 0.1)],
};

const JUNGLE: BiomeDefaults = BiomeDefaults {
    surface: "moss",
    underground: "mud",
    elevation: 0.48,
    variation: 0.08,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.7, 1.0),
    moisture: (0.7, 1.0),
    elevation_window: (0.35, 0.65),
    vegetation_density: 0.18,
    vegetation: &[(V::Tree, 0.5), (V::Palm, 0.2), (V::Bush, 0.3)],
};

const DESERT: BiomeDefaults = BiomeDefaults {
    surface: "sand",
    underground: "sandstone",
    elevation: 0.45,
    variation: 0.07,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.7, 1.0),
    moisture: (0.0, 0.25),
    elevation_window: (0.35, 0.6),
    vegetation_density: 0.015,
    vegetation: &[(V::Cactus, 0.7), (V::Rock, 0.3)],
};

const SAVANNA: BiomeDefaults = BiomeDefaults {
    surface: "dry_grass",
    underground: "dirt",
    elevation: 0.46,
    variation: 0.05,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.6, 0.9),
    moisture: (0.2, 0.45),
    elevation_window: (0.38, 0.6),
    vegetation_density: 0.03,
    vegetation: &[(V::Tree, 0.4), (V::Bush, 0.4), (V::Rock, 0.2)],
};

const HILLS: BiomeDefaults = BiomeDefaults {
    surface: "grass",
    underground: "stone",
    elevation: 0.58,
    variation: 0.12,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.25, 0.7),
    moisture: (0.3, 0.7),
    elevation_window: (0.5, 0.75),
    vegetation_density: 0.05,
    vegetation: &[(V::Tree, 0.4), (V::Rock, 0.4), (V::Flower, 0.2)],
};

const MOUNTAINS: BiomeDefaults = BiomeDefaults {
    surface: "stone",
    underground: "stone",
    elevation: 0.75,
    variation: 0.2,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.0, 0.5),
    moisture: (0.2, 0.7),
    elevation_window: (0.65, 1.0),
    vegetation_density: 0.02,
    vegetation: &[(V::Rock, 0.8), (V::Bush, 0.2)],
};

const TUNDRA: BiomeDefaults = BiomeDefaults {
    surface: "gravel",
    underground: "dirt",
    elevation: 0.48,
    variation: 0.05,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.05, 0.3),
    moisture: (0.2, 0.5),
    elevation_window: (0.35, 0.65),
    vegetation_density: 0.02,
    vegetation: &[(V::Rock, 0.6), (V::Bush, 0.4)],
};

const SNOW: BiomeDefaults = BiomeDefaults {
    surface: "snow",
    underground: "ice",
    elevation: 0.62,
    variation: 0.1,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.0, 0.2),
    moisture: (0.3, 0.8),
    elevation_window: (0.5, 1.0),
    vegetation_density: 0.005,
    vegetation: &[(V::Rock, 1.0)],
};

const BEACH: BiomeDefaults = BiomeDefaults {
    surface: "sand",
    underground: "sand",
    elevation: 0.37,
    variation: 0.02,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.4, 0.9),
    moisture: (0.4, 0.8),
    elevation_window: (0.33, 0.42),
    vegetation_density: 0.02,
    vegetation: &[(V::Palm, 0.7), (V::Rock, 0.3)],
};

const OCEAN: BiomeDefaults = BiomeDefaults {
    surface: "sand",
    underground: "gravel",
    elevation: 0.15,
    variation: 0.06,
    water_level: Some(0.36),
    min_water_depth: 1,
    temperature: (0.2, 0.9),
    moisture: (0.8, 1.0),
    elevation_window: (0.0, 0.3),
    vegetation_density: 0.03,
    vegetation: &[(V::Coral, 1.0)],
};

const LAKE: BiomeDefaults = BiomeDefaults {
    surface: "clay",
    underground: "dirt",
    elevation: 0.25,
    variation: 0.04,
    water_level: Some(0.38),
    min_water_depth: 1,
    temperature: (0.2, 0.9),
    moisture: (0.6, 1.0),
    elevation_window: (0.1, 0.4),
    vegetation_density: 0.04,
    vegetation: &[(V::Reed, 0.8), (V::Coral, 0.2)],
};

const RIVER: BiomeDefaults = BiomeDefaults {
    surface: "gravel",
    underground: "clay",
    elevation: 0.32,
    variation: 0.02,
    water_level: Some(0.0),
    min_water_depth: 1,
    temperature: (0.2, 0.9),
    moisture: (0.6, 1.0),
    elevation_window: (0.2, 0.6),
    vegetation_density: 0.02,
    vegetation: &[(V::Reed, 1.0)],
};

const SWAMP: BiomeDefaults = BiomeDefaults {
    surface: "mud",
    underground: "peat",
    elevation: 0.38,
    variation: 0.03,
    water_level: Some(0.4),
    min_water_depth: 1,
    temperature: (0.5, 0.9),
    moisture: (0.75, 1.0),
    elevation_window: (0.3, 0.45),
    vegetation_density: 0.1,
    vegetation: &[(V::Reed, 0.5), (V::Mushroom, 0.2), (V::Tree, 0.3)],
};

const VOLCANIC: BiomeDefaults = BiomeDefaults {
    surface: "basalt",
    underground: "obsidian",
    elevation: 0.65,
    variation: 0.18,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.8, 1.0),
    moisture: (0.0, 0.3),
    elevation_window: (0.5, 1.0),
    vegetation_density: 0.01,
    vegetation: &[(V::Rock, 1.0)],
};

const CANYON: BiomeDefaults = BiomeDefaults {
    surface: "red_sand",
    underground: "sandstone",
    elevation: 0.55,
    variation: 0.22,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.6, 1.0),
    moisture: (0.0, 0.3),
    elevation_window: (0.4, 0.8),
    vegetation_density: 0.01,
    vegetation: &[(V::Cactus, 0.4), (V::Rock, 0.6)],
};

const VALLEY: BiomeDefaults = BiomeDefaults {
    surface: "grass",
    underground: "dirt",
    elevation: 0.38,
    variation: 0.04,
    water_level: None,
    min_water_depth: 0,
    temperature: (0.3, 0.8),
    moisture: (0.45, 0.85),
    elevation_window: (0.3, 0.5),
    vegetation_density: 0.08,
    vegetation: &[(V::Flower, 0.4), (V::Tree, 0.4), (V::Bush, 0.2)],
};

impl BiomeKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Plains,
        Self::Forest,
        Self::Jungle,
        Self::Desert,
        Self::Savanna,
        Self::Hills,
        Self::Mountains,
        Self::Tundra,
        Self::Snow,
        Self::Beach,
        Self::Ocean,
        Self::Lake,
        Self::River,
        Self::Swamp,
        Self::Volcanic,
        Self::Canyon,
        Self::Valley,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Jungle => "jungle",
            Self::Desert => "desert",
            Self::Savanna => "savanna",
            Self::Hills => "hills",
            Self::Mountains => "mountains",
            Self::Tundra => "tundra",
            Self::Snow => "snow",
            Self::Beach => "beach",
            Self::Ocean => "ocean",
            Self::Lake => "lake",
            Self::River => "river",
            Self::Swamp => "swamp",
            Self::Volcanic => "volcanic",
            Self::Canyon => "canyon",
            Self::Valley => "valley",
        }
    }

    /// Parses a name or common alias, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase().replace([' ', '-'], "_");
        if let Some(kind) = Self::ALL.iter().find(|k| k.name() == key) {
            return Some(*kind);
        }
        let kind = match key.as_str() {
            "grassland" | "meadow" | "field" | "fields" | "prairie" => Self::Plains,
            "woods" | "woodland" | "taiga" | "temperate_forest" => Self::Forest,
            "rainforest" | "tropical" => Self::Jungle,
            "dunes" | "dune" | "sand_dunes" => Self::Desert,
            "steppe" => Self::Savanna,
            "hill" | "highlands" | "plateau" => Self::Hills,
            "mountain" | "alpine" | "peaks" | "cliffs" => Self::Mountains,
            "glacier" | "arctic" | "ice" | "snowfield" | "frozen" => Self::Snow,
            "coast" | "shore" | "coastline" => Self::Beach,
            "sea" | "water" | "deep_water" => Self::Ocean,
            "pond" | "oasis" | "lagoon" => Self::Lake,
            "stream" | "creek" => Self::River,
            "marsh" | "wetland" | "bog" | "wetlands" => Self::Swamp,
            "volcano" | "lava" | "badlands_volcanic" => Self::Volcanic,
            "badlands" | "mesa" | "gorge" => Self::Canyon,
            "vale" | "basin" => Self::Valley,
            _ => return None,
        };
        Some(kind)
    }

    /// Parses a name, falling back to plains with a warning.
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!("unknown biome '{}', using plains", name);
            Self::Plains
        })
    }

    /// Returns true for kinds whose columns flood with water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Ocean | Self::Lake | Self::River | Self::Swamp)
    }

    /// Returns true for kinds whose detail layer uses ridged noise.
    #[must_use]
    pub const fn is_rugged(self) -> bool {
        matches!(self, Self::Mountains | Self::Hills | Self::Canyon | Self::Volcanic)
    }

    /// Static defaults for this kind.
    #[must_use]
    pub const fn defaults(self) -> &'static BiomeDefaults {
        match self {
            Self::Plains => &PLAINS,
            Self::Forest => &FOREST,
            Self::Jungle => &JUNGLE,
            Self::Desert => &DESERT,
            Self::Savanna => &SAVANNA,
            Self::Hills => &HILLS,
            Self::Mountains => &MOUNTAINS,
            Self::Tundra => &TUNDRA,
            Self::Snow => &SNOW,
            Self::Beach => &BEACH,
            Self::Ocean => &OCEAN,
            Self::Lake => &LAKE,
            Self::River => &RIVER,
            Self::Swamp => &SWAMP,
            Self::Volcanic => &VOLCANIC,
            Self::Canyon => &CANYON,
            Self::Valley => &VALLEY,
        }
    }

    /// Climate fitness in [0, 1] for a temperature/moisture/elevation triple.
    ///
    /// Each axis scores 1 inside the preferred window and falls off linearly
    /// over 0.25 outside it; the three scores are multiplied.
    #[must_use]
    pub fn climate_fitness(self, temperature: f32, moisture: f32, elevation: f32) -> f32 {
        let d = self.defaults();
        window_score(temperature, d.temperature)
            * window_score(moisture, d.moisture)
            * window_score(elevation, d.elevation_window)
    }
}

impl std::fmt::Display for BiomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn window_score(value: f32, (lo, hi): (f32, f32)) -> f32 {
    const FALLOFF: f32 = 0.25;
    let outside = if value < lo {
        lo - value
    } else if value > hi {
        value - hi
    } else {
        0.0
    };
    (1.0 - outside / FALLOFF).clamp(0.0, 1.0)
}
