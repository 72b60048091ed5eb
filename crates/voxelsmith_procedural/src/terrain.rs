//! # Terrain Builder
//!
//! Turns a `BiomeField` into a dense z-up voxel grid.
//!
//! ## Passes
//!
//! 1. Columns: underground below the surface height, surface material at it,
//!    air above; water kinds flood up to their water level
//! 2. Vegetation: density/noise gated and scaled by moisture, seeded per
//!    layout
//!
//! `generate_scenario` runs the whole pipeline: enrichment, field synthesis,
//! terrain, relief metrics.

use std::collections::BTreeMap;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use voxelsmith_core::analysis::{compute_scenario_relief_metrics, ReliefMetrics};
use voxelsmith_core::{MaterialId, MaterialTable, VoxelGrid};

use crate::enrichment::{enrich_layout, EnrichmentReport};
use crate::field::{synthesize_field, BiomeField};
use crate::layout::ScenarioLayout;
use crate::noise::{purpose, GradientNoise, WorldSeed};
use crate::vegetation::{grow, VegetationKind, VegetationMaterials};

/// A built terrain grid plus per-pass statistics.
#[derive(Clone, Debug)]
pub struct TerrainBuild {
    /// z-up grid: width × height columns, depth vertical cells.
    pub grid: VoxelGrid,
    /// Surface cell index per column, `idx = x + y*width`.
    pub surface_heights: Vec<usize>,
    /// Cells flooded with water.
    pub water_cells: usize,
    /// Placements per vegetation kind.
    pub vegetation: BTreeMap<VegetationKind, usize>,
}

impl TerrainBuild {
    /// Total vegetation placements.
    #[must_use]
    pub fn vegetation_count(&self) -> usize {
        self.vegetation.values().sum()
    }
}

/// Everything one scenario run produced.
#[derive(Clone, Debug)]
pub struct ScenarioBuild {
    /// Layout after enrichment.
    pub layout: ScenarioLayout,
    /// Enrichment rules that fired.
    pub enrichment: EnrichmentReport,
    /// Biome field.
    pub field: BiomeField,
    /// Voxel terrain.
    pub terrain: TerrainBuild,
    /// Relief metrics of the final heightmap.
    pub relief: ReliefMetrics,
}

/// Summary suitable for reports.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioSummary {
    /// `WxHxD`.
    pub dims: String,
    /// Enrichment rules that fired.
    pub enrichment: Vec<&'static str>,
    /// Slot labels.
    pub slots: Vec<String>,
    /// Dominant coverage per slot.
    pub coverage: Vec<f32>,
    /// Relief metrics.
    pub relief: ReliefMetrics,
    /// Flooded cells.
    pub water_cells: usize,
    /// Vegetation placements.
    pub vegetation: usize,
}

impl ScenarioBuild {
    /// Builds a serializable summary.
    #[must_use]
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            dims: self.terrain.grid.dims().to_string(),
            enrichment: self.enrichment.applied.clone(),
            slots: self.field.slots.iter().map(|s| s.label.clone()).collect(),
            coverage: self.field.coverage(),
            relief: self.relief.clone(),
            water_cells: self.terrain.water_cells,
            vegetation: self.terrain.vegetation_count(),
        }
    }
}

/// Runs enrichment, field synthesis and terrain building.
#[must_use]
pub fn generate_scenario(mut layout: ScenarioLayout, table: &MaterialTable) -> ScenarioBuild {
    let enrichment = enrich_layout(&mut layout);
    let field = synthesize_field(&layout);
    let terrain = build_terrain(&field, &layout, table);
    let relief = compute_scenario_relief_metrics(&field.heightmap);
    tracing::info!(
        "scenario {}x{}x{}: {} slots, {} water cells, {} plants",
        layout.width,
        layout.height,
        layout.depth,
        field.slot_count(),
        terrain.water_cells,
        terrain.vegetation_count()
    );
    ScenarioBuild {
        layout,
        enrichment,
        field,
        terrain,
        relief,
    }
}

/// Builds the voxel terrain for a field.
#[must_use]
pub fn build_terrain(field: &BiomeField, layout: &ScenarioLayout, table: &MaterialTable) -> TerrainBuild {
    let (w, h) = (field.width, field.height);
    let depth = layout.depth.max(2);
    let mut grid = VoxelGrid::new(w, h, depth);
    let water = table.resolve("water");

    let slot_materials: Vec<(MaterialId, MaterialId)> = field
        .slots
        .iter()
        .map(|slot| (table.resolve(&slot.surface), table.resolve(&slot.underground)))
        .collect();

    let mut surface_heights = Vec::with_capacity(w * h);
    let mut water_cells = 0;

    for y in 0..h {
        for x in 0..w {
            let normalized = field.heightmap.get(x, y);
            let terrain_height = ((normalized * depth as f32).floor() as usize).min(depth - 1);
            let slot_index = field.dominant_at(x, y);
            let slot = &field.slots[slot_index];
            let (surface, underground) = slot_materials[slot_index];

            for z in 0..terrain_height {
                grid.set(x, y, z, underground);
            }
            grid.set(x, y, terrain_height, surface);

            if slot.kind.is_water() {
                if let Some(level) = slot.water_level {
                    let fixed = (level * depth as f32).floor() as usize;
                    let water_level = fixed.max(terrain_height + slot.min_water_depth).min(depth - 1);
                    for z in terrain_height + 1..=water_level {
                        grid.set(x, y, z, water);
                        water_cells += 1;
                    }
                }
            }
            surface_heights.push(terrain_height);
        }
    }

    let vegetation = if layout.vegetation.enabled {
        plant_vegetation(field, layout, table, &mut grid, &surface_heights)
    } else {
        BTreeMap::new()
    };

    TerrainBuild {
        grid,
        surface_heights,
        water_cells,
        vegetation,
    }
}

fn plant_vegetation(
    field: &BiomeField,
    layout: &ScenarioLayout,
    table: &MaterialTable,
    grid: &mut VoxelGrid,
    surface_heights: &[usize],
) -> BTreeMap<VegetationKind, usize> {
    let seed = WorldSeed::new(layout.seed).derive(purpose::VEGETATION);
    let gate = GradientNoise::new(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
    let materials = VegetationMaterials::resolve(table);
    let scale = layout.vegetation.density.max(0.0);
    let mut placed = BTreeMap::new();

    for y in 0..field.height {
        for x in 0..field.width {
            // Draw every column so placement stays stable under density edits.
            let roll = rng.gen::<f32>();
            let pick = rng.gen::<f32>();

            let defaults = field.dominant_slot(x, y).kind.defaults();
            let wetness = 0.5 + field.climate.moisture_at(x, y);
            let density = defaults.vegetation_density * scale * wetness;
            if density <= 0.0 || defaults.vegetation.is_empty() {
                continue;
            }
            let n = gate.sample(x as f32 * 0.3, y as f32 * 0.3);
            if roll >= density * (0.5 + n) {
                continue;
            }

            let kind = weighted_kind(defaults.vegetation, pick);
            let root = surface_heights[x + y * field.width] as i64 + 1;
            let above = grid.get_signed(x as i64, y as i64, root);
            let submerged = above == materials.water();
            let rooted = if kind.is_submerged() {
                submerged
            } else {
                kind.is_aquatic() || !submerged
            };
            if !rooted {
                continue;
            }

            if grow(kind, grid, &materials, &mut rng, x as i64, y as i64, root) > 0 {
                *placed.entry(kind).or_insert(0) += 1;
            }
        }
    }
    tracing::debug!("vegetation: {:?}", placed);
    placed
}

fn weighted_kind(profile: &[(VegetationKind, f32)], roll: f32) -> VegetationKind {
    let total: f32 = profile.iter().map(|p| p.1).sum();
    let mut remaining = roll * total;
    for &(kind, weight) in profile {
        if remaining < weight {
            return kind;
        }
        remaining -= weight;
    }
    profile[profile.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeKind;
    use crate::layout::{BiomeRegion, BlendMode};
    use voxelsmith_core::AIR;

    #[test]
    fn test_column_layers() {
        let mut layout = ScenarioLayout::new(16, 16, 20)
            .with_mode(BlendMode::HeightThreshold)
            .with_region(BiomeRegion::new(BiomeKind::Desert, [0, 0, 16, 16]));
        layout.vegetation.enabled = false;
        let table = MaterialTable::default();
        let build = generate_scenario(layout, &table);
        let grid = &build.terrain.grid;

        for y in 0..16 {
            for x in 0..16 {
                let th = build.terrain.surface_heights[x + y * 16];
                assert_eq!(grid.get(x, y, th), table.resolve("sand"));
                if th > 0 {
                    assert_eq!(grid.get(x, y, th - 1), table.resolve("sandstone"));
                }
                for z in th + 1..20 {
                    assert_eq!(grid.get(x, y, z), AIR);
                }
            }
        }
        assert_eq!(build.terrain.water_cells, 0);
    }

    #[test]
    fn test_water_floods_to_level() {
        let mut layout = ScenarioLayout::new(12, 12, 32)
            .with_mode(BlendMode::HeightThreshold)
            .with_region(BiomeRegion::new(BiomeKind::Ocean, [0, 0, 12, 12]).with_elevation(0.1));
        layout.vegetation.enabled = false;
        let table = MaterialTable::default();
        let build = generate_scenario(layout, &table);
        let water = table.resolve("water");
        let level = (0.36f32 * 32.0).floor() as usize;

        assert!(build.terrain.water_cells > 0);
        for y in 0..12 {
            for x in 0..12 {
                let th = build.terrain.surface_heights[x + y * 12];
                let top = level.max(th + 1).min(31);
                for z in th + 1..=top {
                    assert_eq!(build.terrain.grid.get(x, y, z), water);
                }
            }
        }
    }

    #[test]
    fn test_wet_region_grows_more_vegetation() {
        let table = MaterialTable::default();
        let build = |moisture: f32| {
            let mut region = BiomeRegion::new(BiomeKind::Forest, [0, 0, 64, 64]);
            region.moisture = Some(moisture);
            let layout = ScenarioLayout::new(64, 64, 24)
                .with_seed(17)
                .with_mode(BlendMode::HeightThreshold)
                .with_region(region);
            let field = synthesize_field(&layout);
            let terrain = build_terrain(&field, &layout, &table);
            (field, terrain)
        };
        let (wet_field, wet) = build(1.0);
        let (dry_field, dry) = build(0.0);

        for (x, y) in [(0, 0), (31, 40), (63, 63)] {
            assert!(wet_field.climate.moisture_at(x, y) > dry_field.climate.moisture_at(x, y));
        }
        println!("vegetation: wet {} dry {}", wet.vegetation_count(), dry.vegetation_count());
        assert!(wet.vegetation_count() > dry.vegetation_count());
    }

    #[test]
    fn test_weighted_kind_bounds() {
        let profile = [(VegetationKind::Tree, 1.0), (VegetationKind::Rock, 1.0)];
        assert_eq!(weighted_kind(&profile, 0.0), VegetationKind::Tree);
        assert_eq!(weighted_kind(&profile, 0.99), VegetationKind::Rock);
        assert_eq!(weighted_kind(&profile, 1.0), VegetationKind::Rock);
    }
}
