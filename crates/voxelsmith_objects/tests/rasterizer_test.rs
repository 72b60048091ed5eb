//! # Rasterizer Tests
//!
//! Exact cell counts, ordering and subtract behaviour through the public
//! `rasterize` entry point.

use serde_json::json;
use voxelsmith_core::analysis::{compute_voxel_connectivity, material_histogram};
use voxelsmith_core::{CoreError, MaterialTable, AIR};
use voxelsmith_objects::{rasterize, Blueprint, Primitive, PrimitiveShape, ScaleOptions};

/// Test: a 4x4x4 box of material 7 fills exactly 64 cells.
#[test]
fn test_unit_box_exact_cells() {
    let table = MaterialTable::default();
    let blueprint = Blueprint::new("box")
        .with_bounds([8, 8, 8])
        .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [4, 4, 4], 7u16));
    let object = rasterize(&blueprint, &ScaleOptions::default(), &table).unwrap();

    let histogram = material_histogram(&object.grid);
    assert_eq!(histogram.len(), 1);
    assert_eq!(histogram.get(&7), Some(&64));
    assert_eq!(object.grid.data().len(), 8 * 8 * 8);
    assert_eq!(object.grid.data().iter().filter(|&&v| v == AIR).count(), 512 - 64);
    assert_eq!(object.usage.get(&7), Some(&64));
}

/// Test: subtract never increases the filled count.
#[test]
fn test_subtract_never_adds() {
    let table = MaterialTable::default();
    let base = Blueprint::new("block").with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [10, 10, 10], "stone"));
    let before = rasterize(&base, &ScaleOptions::default(), &table).unwrap().grid.filled_count();

    for shape in PrimitiveShape::ALL {
        let carved = base
            .clone()
            .with_primitive(Primitive::new(shape, [2, 2, 2], [6, 6, 6], "gold").subtracting())
            .with_primitive(Primitive::new(shape, [-3, 8, 8], [6, 6, 6], "stone").subtracting());
        let object = rasterize(&carved, &ScaleOptions::default(), &table).unwrap();
        let after = object.grid.filled_count();
        println!("{shape}: {before} -> {after}");
        assert!(after <= before, "{shape} subtract added cells");
        assert_eq!(object.usage.values().sum::<usize>(), 1000);
    }
}

/// Test: later primitives overwrite earlier ones.
#[test]
fn test_input_order_is_honoured() {
    let table = MaterialTable::default();
    let stone = table.resolve("stone");
    let wood = table.resolve("wood");
    let blueprint = Blueprint::new("layered")
        .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [4, 4, 4], "stone"))
        .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [4, 2, 4], "wood"));
    let object = rasterize(&blueprint, &ScaleOptions::default(), &table).unwrap();
    assert_eq!(object.grid.get(0, 0, 0), wood);
    assert_eq!(object.grid.get(0, 3, 0), stone);

    let reversed = Blueprint {
        primitives: blueprint.primitives.iter().rev().cloned().collect(),
        ..blueprint
    };
    let object = rasterize(&reversed, &ScaleOptions::default(), &table).unwrap();
    assert_eq!(object.grid.get(0, 0, 0), stone);
}

/// Test: a parsed chair stays one connected piece.
#[test]
fn test_parsed_chair_is_connected() {
    let table = MaterialTable::default();
    let parsed = Blueprint::from_json(
        &json!({
            "name": "chair",
            "primitives": [
                {"type": "box", "position": [0, 3, 0], "size": [5, 1, 5], "material": "wood"},
                {"type": "box", "position": [0, 0, 0], "size": [1, 3, 1], "material": "wood"},
                {"type": "box", "position": [4, 0, 0], "size": [1, 3, 1], "material": "wood"},
                {"type": "box", "position": [0, 0, 4], "size": [1, 3, 1], "material": "wood"},
                {"type": "box", "position": [4, 0, 4], "size": [1, 3, 1], "material": "wood"},
                {"type": "box", "position": [0, 4, 4], "size": [5, 5, 1], "material": "wood"}
            ]
        }),
        "object",
    );
    assert!(parsed.warnings.is_empty());
    let object = rasterize(&parsed.blueprint, &ScaleOptions::default(), &table).unwrap();
    let connectivity = compute_voxel_connectivity(&object.grid);
    assert_eq!(object.effective_bounds, [5, 9, 5]);
    assert_eq!(connectivity.component_count, 1);
}

/// Test: scale doubles every axis; the hard ceiling rejects huge requests.
#[test]
fn test_scale_and_safety() {
    let table = MaterialTable::default();
    let blueprint = Blueprint::new("box").with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [4, 4, 4], "stone"));
    let object = rasterize(&blueprint, &ScaleOptions::default().with_multiplier(2.0), &table).unwrap();
    assert_eq!(object.grid.filled_count(), 512);

    let huge = Blueprint::new("huge").with_bounds([1000, 1000, 1000]);
    let err = rasterize(&huge, &ScaleOptions::default(), &table).unwrap_err();
    assert!(matches!(err, CoreError::SafetyLimitExceeded { .. }));
    println!("{err}");

    let clamped = rasterize(&huge, &ScaleOptions::default().with_allow_oversize(true), &table).unwrap();
    assert!(clamped.grid.data().len() as u64 <= 8_000_000);
    assert!(clamped.clamp_factor < 1.0);
    assert!(!clamped.warnings.is_empty());
}

/// Test: a primitive far larger than the bounds fills the grid and returns
/// promptly.
#[test]
fn test_primitive_larger_than_bounds() {
    let table = MaterialTable::default();
    let blueprint = Blueprint::new("slab")
        .with_bounds([8, 8, 8])
        .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [3000, 3000, 3000], 7u16));
    let started = std::time::Instant::now();
    let object = rasterize(&blueprint, &ScaleOptions::default(), &table).unwrap();
    println!("oversized primitive rasterized in {:?}", started.elapsed());
    assert_eq!(object.effective_bounds, [8, 8, 8]);
    assert_eq!(object.grid.filled_count(), 512);
    assert_eq!(object.usage.get(&7), Some(&512));
    assert!(object.warnings.iter().any(|w| w.contains("trimmed")));
}

/// Test: a primitive entirely outside the grid writes nothing.
#[test]
fn test_primitive_outside_grid() {
    let table = MaterialTable::default();
    let blueprint = Blueprint::new("stray")
        .with_bounds([8, 8, 8])
        .with_primitive(Primitive::new(PrimitiveShape::Sphere, [50, 0, 0], [4, 4, 4], "stone"))
        .with_primitive(Primitive::new(PrimitiveShape::Box, [-9, -9, -9], [4, 4, 4], "stone"));
    let object = rasterize(&blueprint, &ScaleOptions::default(), &table).unwrap();
    assert_eq!(object.grid.filled_count(), 0);
    assert!(object.usage.is_empty());
}

/// Test: absurd positions and bounds from predictor output end in a clamp or
/// a safety error, never an overflow.
#[test]
fn test_huge_positions_and_bounds() {
    let table = MaterialTable::default();

    let far = Blueprint::from_json(
        &json!({
            "bounds": [8, 8, 8],
            "primitives": [
                {"type": "box", "position": [1e30, 0, 0], "size": [4, 4, 4], "material": "stone"},
                {"type": "box", "position": [0, 0, 0], "size": [2, 2, 2], "material": "stone"}
            ]
        }),
        "far",
    );
    let object = rasterize(&far.blueprint, &ScaleOptions::default(), &table).unwrap();
    assert_eq!(object.grid.filled_count(), 8);

    let wide = Blueprint::from_json(
        &json!({
            "bounds": [1e7, 1e7, 1e7],
            "primitives": [{"type": "box", "position": [0, 0, 0], "size": [4, 4, 4]}]
        }),
        "wide",
    );
    let err = rasterize(&wide.blueprint, &ScaleOptions::default(), &table).unwrap_err();
    println!("{err}");
    assert!(matches!(err, CoreError::SafetyLimitExceeded { .. }));

    let raw = Blueprint::new("raw")
        .with_bounds([usize::MAX, usize::MAX, usize::MAX])
        .with_primitive(Primitive::new(PrimitiveShape::Box, [i64::MAX, i64::MIN, 0], [u32::MAX; 3], "stone"));
    let err = rasterize(&raw, &ScaleOptions::default(), &table).unwrap_err();
    assert!(matches!(err, CoreError::SafetyLimitExceeded { requested: u64::MAX, .. }));
}

/// Test: a volume above the soft ceiling but under the hard one is shrunk
/// with a warning.
#[test]
fn test_safety_clamp_path() {
    let table = MaterialTable::default();
    let blueprint = Blueprint::new("tower")
        .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [300, 300, 300], "stone"));
    let object = rasterize(&blueprint, &ScaleOptions::default(), &table).unwrap();
    println!(
        "requested {:?} -> effective {:?} (factor {:.3})",
        object.requested_bounds, object.effective_bounds, object.clamp_factor
    );
    assert_eq!(object.requested_bounds, [300, 300, 300]);
    assert!(object.clamp_factor < 1.0);
    assert!(object.grid.data().len() as u64 <= 8_000_000);
    assert!(object.warnings.iter().any(|w| w.contains("clamped")));
    assert!(object.grid.filled_count() > 0);
}
