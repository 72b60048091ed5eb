//! # VOXELSMITH Procedural Generation
//!
//! Deterministic terrain, vegetation and texture synthesis.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same layout and seed always produce the same grid
//! 2. **Lenient in, strict out**: Malformed layouts degrade to defaults,
//!    outputs always honour their invariants
//! 3. **Enrich first**: Description keywords are applied before any heights
//! 4. **Additive vegetation**: Plants only ever fill air (or water)
//!
//! ## Core Components
//!
//! - `GradientNoise`: fBm, ridged, warped and cellular noise
//! - `ScenarioLayout`: Regions plus Voronoi/climate/river/vegetation settings
//! - `synthesize_field`: Per-cell biome weights and heights
//! - `enrich_layout`: Keyword rules injecting missing regions
//! - `build_terrain` / `generate_scenario`: Voxel columns, water and plants
//! - `TextureSynthesizer`: Procedural RGB textures
//!
//! ## Example
//!
//! ```rust
//! use voxelsmith_core::MaterialTable;
//! use voxelsmith_procedural::{generate_scenario, BiomeKind, BiomeRegion, ScenarioLayout};
//!
//! let layout = ScenarioLayout::new(32, 32, 24)
//!     .with_seed(7)
//!     .with_description("A desert oasis")
//!     .with_region(BiomeRegion::new(BiomeKind::Desert, [0, 0, 32, 32]));
//!
//! let build = generate_scenario(layout, &MaterialTable::default());
//! assert!(build.enrichment.fired("oasis"));
//! assert_eq!(build.terrain.grid.width(), 32);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod climate;
pub mod enrichment;
pub mod field;
pub mod layout;
pub mod noise;
pub mod preview;
pub mod river;
pub mod terrain;
pub mod texture;
pub mod vegetation;

pub use biome::{BiomeDefaults, BiomeKind};
pub use climate::{apply_region_moisture, compute_climate, ClimateMaps};
pub use enrichment::{enrich_layout, EnrichmentReport};
pub use field::{synthesize_field, BiomeField, BiomeSite, BiomeSlot};
pub use layout::{
    BiomeRegion, BlendMode, ClimateSettings, ParsedLayout, RiverSettings, ScenarioLayout, TemperatureMode,
    VegetationSettings, VoronoiSettings,
};
pub use noise::{GradientNoise, WorldSeed};
pub use preview::render_top_down_preview;
pub use river::{trace_rivers, RiverNetwork};
pub use terrain::{build_terrain, generate_scenario, ScenarioBuild, ScenarioSummary, TerrainBuild};
pub use texture::{texture_metrics, Texture, TextureKind, TextureMetrics, TextureParams, TextureSynthesizer};
pub use vegetation::{VegetationKind, VegetationMaterials};
