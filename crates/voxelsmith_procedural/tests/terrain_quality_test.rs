//! # Terrain Quality Tests
//!
//! End-to-end checks on the scenario pipeline: determinism, weight
//! normalization, enrichment and grid validity.

use serde_json::json;
use voxelsmith_core::analysis::material_histogram;
use voxelsmith_core::{MaterialTable, AIR};
use voxelsmith_procedural::{
    generate_scenario, render_top_down_preview, synthesize_field, BiomeKind, BiomeRegion, BlendMode,
    GradientNoise, ScenarioLayout, WorldSeed,
};

fn mixed_layout(mode: BlendMode) -> ScenarioLayout {
    ScenarioLayout::new(64, 48, 32)
        .with_seed(1234)
        .with_mode(mode)
        .with_region(BiomeRegion::new(BiomeKind::Plains, [0, 0, 64, 48]))
        .with_region(BiomeRegion::new(BiomeKind::Forest, [0, 0, 24, 48]))
        .with_region(BiomeRegion::new(BiomeKind::Mountains, [40, 0, 24, 24]))
        .with_region(BiomeRegion::new(BiomeKind::Lake, [28, 28, 10, 10]))
}

/// Test: fBm is bit-identical for identical seeds.
#[test]
fn test_fbm_bit_identical() {
    let a = GradientNoise::new(WorldSeed::new(42));
    let b = GradientNoise::new(WorldSeed::new(42));
    for i in 0..500 {
        let (x, y) = (i as f32 * 0.731, i as f32 * -0.377);
        assert_eq!(a.fbm(x, y, 6, 0.5).to_bits(), b.fbm(x, y, 6, 0.5).to_bits());
    }
}

/// Test: per-cell weights sum to 1 in both blend modes.
#[test]
fn test_weights_normalized_in_both_modes() {
    for mode in [BlendMode::HeightThreshold, BlendMode::Voronoi] {
        let mut layout = mixed_layout(mode);
        layout.rivers.count = 1;
        let field = synthesize_field(&layout);
        let mut worst = 0.0f32;
        for y in 0..field.height {
            for x in 0..field.width {
                let sum: f32 = field.weights_at(x, y).iter().sum();
                worst = worst.max((sum - 1.0).abs());
            }
        }
        println!("{mode:?}: {} slots, worst weight error {worst:e}", field.slot_count());
        assert!(worst <= 1e-6, "{mode:?} weights drift by {worst}");
    }
}

/// Test: the same layout always yields the same grid.
#[test]
fn test_scenario_deterministic() {
    let table = MaterialTable::default();
    let a = generate_scenario(mixed_layout(BlendMode::Voronoi), &table);
    let b = generate_scenario(mixed_layout(BlendMode::Voronoi), &table);
    assert_eq!(a.terrain.grid, b.terrain.grid);
    assert_eq!(a.terrain.vegetation, b.terrain.vegetation);
}

/// Test: an oasis description gains a lake even when only desert was given.
#[test]
fn test_oasis_enrichment_adds_water() {
    let table = MaterialTable::default();
    let parsed = ScenarioLayout::from_json(
        &json!({
            "width": 48, "height": 48, "depth": 24,
            "regions": [{"kind": "desert"}]
        }),
        "Desert oasis with palm trees",
        (32, 32, 16),
    );
    assert_eq!(parsed.layout.regions.len(), 1);

    let build = generate_scenario(parsed.layout, &table);
    assert!(build.enrichment.fired("oasis"));
    assert!(build.layout.has_kind(BiomeKind::Lake));
    assert!(build.terrain.water_cells > 0);
    println!("oasis summary: {}", serde_json::to_string(&build.summary()).unwrap_or_default());
}

/// Test: every voxel is air or a material the table knows.
#[test]
fn test_grid_only_contains_table_materials() {
    let table = MaterialTable::default();
    let mut layout = mixed_layout(BlendMode::Voronoi).with_description("tropical island with a river");
    layout.vegetation.density = 3.0;
    let build = generate_scenario(layout, &table);

    let histogram = material_histogram(&build.terrain.grid);
    for (&id, &count) in &histogram {
        assert!(table.contains_id(id), "unknown material {id} x{count}");
    }
    assert!(!histogram.contains_key(&AIR));
    println!("materials: {histogram:?}, plants: {:?}", build.terrain.vegetation);
}

/// Test: vegetation only adds cells above the bare terrain.
#[test]
fn test_vegetation_never_replaces_terrain() {
    let table = MaterialTable::default();
    let mut bare = mixed_layout(BlendMode::Voronoi);
    bare.vegetation.enabled = false;
    let mut planted = mixed_layout(BlendMode::Voronoi);
    planted.vegetation.density = 4.0;

    let bare = generate_scenario(bare, &table);
    let planted = generate_scenario(planted, &table);
    assert!(planted.terrain.vegetation_count() > 0);

    let water = table.resolve("water");
    for (before, after) in bare.terrain.grid.data().iter().zip(planted.terrain.grid.data()) {
        if *before != AIR && *before != water {
            assert_eq!(before, after);
        }
    }
}

/// Test: relief metrics and preview size line up with the grid.
#[test]
fn test_relief_and_preview() {
    let table = MaterialTable::default();
    let build = generate_scenario(mixed_layout(BlendMode::HeightThreshold), &table);
    let relief = &build.relief;
    println!("relief: {relief:?}");
    assert!(relief.mean_slope >= 0.0);
    assert!((0.0..=1.0).contains(&relief.water_coverage));

    let rgb = render_top_down_preview(&build.terrain, &table);
    assert_eq!(rgb.len(), 64 * 48 * 3);
}
