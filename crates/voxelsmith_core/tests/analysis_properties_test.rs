//! # Grid Analysis Properties
//!
//! Verifies the analyzer against hand-built grids.

use voxelsmith_core::analysis::{
    compute_voxel_connectivity, compute_voxel_fill_metrics,
};
use voxelsmith_core::VoxelGrid;

/// Test: A single unit voxel has ratio 1/(w*h*d) and unit extent.
#[test]
fn test_single_voxel_fill() {
    let (w, h, d) = (7, 5, 3);
    let mut grid = VoxelGrid::new(w, h, d);
    grid.set(3, 2, 1, 9);

    let fill = compute_voxel_fill_metrics(&grid);
    println!("Single voxel fill: {:?}", fill);

    assert_eq!(fill.filled, 1);
    assert!((fill.fill_ratio - 1.0 / (w * h * d) as f32).abs() < 1e-9);
    assert_eq!(fill.extent, [1, 1, 1]);
    assert_eq!(fill.min, Some([3, 2, 1]));
    assert_eq!(fill.max, Some([3, 2, 1]));
}

/// Test: A solid box is one fully cohesive component.
#[test]
fn test_solid_box_single_component() {
    let mut grid = VoxelGrid::new(10, 10, 10);
    for z in 2..6 {
        for y in 1..4 {
            for x in 3..8 {
                grid.set(x, y, z, 2);
            }
        }
    }

    let conn = compute_voxel_connectivity(&grid);
    assert_eq!(conn.component_count, 1);
    assert_eq!(conn.largest_component, 5 * 3 * 4);
    assert!((conn.largest_component_ratio - 1.0).abs() < 1e-9);
}

/// Test: Diagonal neighbours are not face-adjacent.
#[test]
fn test_diagonal_voxels_are_separate() {
    let mut grid = VoxelGrid::new(4, 4, 4);
    grid.set(1, 1, 1, 1);
    grid.set(2, 2, 1, 1);

    let conn = compute_voxel_connectivity(&grid);
    assert_eq!(conn.component_count, 2);
    assert_eq!(conn.largest_component, 1);
    assert!((conn.largest_component_ratio - 0.5).abs() < 1e-9);

    grid.set(2, 2, 2, 1);
    grid.set(1, 2, 2, 1);
    grid.set(1, 1, 2, 1);
    let conn = compute_voxel_connectivity(&grid);
    assert_eq!(conn.component_count, 1);
}

/// Test: Large grids do not overflow the stack.
#[test]
fn test_large_grid_iterative() {
    let mut grid = VoxelGrid::new(128, 64, 128);
    for z in 0..128 {
        for x in 0..128 {
            grid.set(x, 0, z, 1);
        }
    }
    let conn = compute_voxel_connectivity(&grid);
    assert_eq!(conn.component_count, 1);
    assert_eq!(conn.largest_component, 128 * 128);
}
