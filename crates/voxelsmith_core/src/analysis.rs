//! # Grid Analysis
//!
//! Pure, read-only metrics over dense grids. Every function is O(N) in grid
//! size and never mutates its input.
//!
//! ## Metrics
//!
//! - `compute_voxel_fill_metrics`: filled count, tight bounds, shape ratio
//! - `compute_voxel_connectivity`: 6-connected components (iterative BFS)
//! - `compute_scenario_relief_metrics`: slope, water coverage, land regions
//! - `material_histogram`: per-material cell counts

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::grid::{HeightMap, VoxelGrid};
use crate::material::{MaterialId, AIR};

/// Normalized height below which a relief cell counts as water.
pub const WATER_THRESHOLD: f32 = 0.35;

/// Occupancy metrics for a voxel grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoxelFillMetrics {
    /// Non-air cells.
    pub filled: usize,
    /// Total cells.
    pub total: usize,
    /// `filled / total` (0 for an empty grid).
    pub fill_ratio: f32,
    /// Inclusive minimum corner of the non-air cells.
    pub min: Option<[usize; 3]>,
    /// Inclusive maximum corner of the non-air cells.
    pub max: Option<[usize; 3]>,
    /// Extent of the tight bounding box (`[0, 0, 0]` when nothing is filled).
    pub extent: [usize; 3],
    /// `max(extent_x, extent_z) / max(1, extent_y)`.
    pub horizontal_vertical_ratio: f32,
}

/// Connected-component summary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoxelConnectivity {
    /// Number of 6-connected components.
    pub component_count: usize,
    /// Size of the largest component.
    pub largest_component: usize,
    /// `largest_component / filled` (0 when nothing is filled).
    pub largest_component_ratio: f32,
}

/// Relief metrics for a heightmap.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliefMetrics {
    /// Mean absolute 4-neighbour difference of the normalized heights.
    pub mean_slope: f32,
    /// Fraction of cells below `WATER_THRESHOLD`.
    pub water_coverage: f32,
    /// 4-connected regions of land cells.
    pub land_regions: usize,
    /// Raw minimum before normalization.
    pub min_height: f32,
    /// Raw maximum before normalization.
    pub max_height: f32,
}

/// Computes fill ratio, tight bounds and shape ratio.
#[must_use]
pub fn compute_voxel_fill_metrics(grid: &VoxelGrid) -> VoxelFillMetrics {
    let (w, h, d) = (grid.width(), grid.height(), grid.depth());
    let total = grid.data().len();

    let mut filled = 0usize;
    let mut lo = [usize::MAX; 3];
    let mut hi = [0usize; 3];

    for z in 0..d {
        for y in 0..h {
            let row = grid.index(0, y, z);
            for x in 0..w {
                if grid.data()[row + x] == AIR {
                    continue;
                }
                filled += 1;
                lo = [lo[0].min(x), lo[1].min(y), lo[2].min(z)];
                hi = [hi[0].max(x), hi[1].max(y), hi[2].max(z)];
            }
        }
    }

    if filled == 0 {
        return VoxelFillMetrics {
            total,
            ..VoxelFillMetrics::default()
        };
    }

    let extent = [hi[0] - lo[0] + 1, hi[1] - lo[1] + 1, hi[2] - lo[2] + 1];
    VoxelFillMetrics {
        filled,
        total,
        fill_ratio: filled as f32 / total as f32,
        min: Some(lo),
        max: Some(hi),
        extent,
        horizontal_vertical_ratio: extent[0].max(extent[2]) as f32 / extent[1].max(1) as f32,
    }
}

/// Counts 6-connected components of non-air cells.
///
/// Uses an explicit queue; never recurses.
#[must_use]
pub fn compute_voxel_connectivity(grid: &VoxelGrid) -> VoxelConnectivity {
    let (w, h, d) = (grid.width(), grid.height(), grid.depth());
    let data = grid.data();
    let mut visited = vec![false; data.len()];
    let mut queue = VecDeque::new();

    let mut component_count = 0usize;
    let mut largest = 0usize;
    let mut filled = 0usize;

    for start in 0..data.len() {
        if data[start] == AIR || visited[start] {
            continue;
        }
        component_count += 1;
        visited[start] = true;
        queue.push_back(start);
        let mut size = 0usize;

        while let Some(idx) = queue.pop_front() {
            size += 1;
            let x = idx % w;
            let y = (idx / w) % h;
            let z = idx / (w * h);

            let mut visit = |n: usize| {
                if data[n] != AIR && !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < w {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - w);
            }
            if y + 1 < h {
                visit(idx + w);
            }
            if z > 0 {
                visit(idx - w * h);
            }
            if z + 1 < d {
                visit(idx + w * h);
            }
        }

        filled += size;
        largest = largest.max(size);
    }

    VoxelConnectivity {
        component_count,
        largest_component: largest,
        largest_component_ratio: if filled == 0 { 0.0 } else { largest as f32 / filled as f32 },
    }
}

/// Computes slope, water coverage and land-region count.
///
/// Heights are normalized by their own min/max first; a perfectly flat map
/// normalizes to 0.5 everywhere.
#[must_use]
pub fn compute_scenario_relief_metrics(heightmap: &HeightMap) -> ReliefMetrics {
    let (w, h) = (heightmap.width(), heightmap.height());
    if heightmap.is_empty() {
        return ReliefMetrics::default();
    }

    let (min_height, max_height) = heightmap.min_max();
    let range = max_height - min_height;
    let normalized: Vec<f32> = heightmap
        .data()
        .iter()
        .map(|&v| if range > f32::EPSILON { (v - min_height) / range } else { 0.5 })
        .collect();

    let mut slope_sum = 0.0f64;
    let mut slope_samples = 0usize;
    for y in 0..h {
        for x in 0..w {
            let here = normalized[x + y * w];
            if x + 1 < w {
                slope_sum += f64::from((normalized[x + 1 + y * w] - here).abs());
                slope_samples += 1;
            }
            if y + 1 < h {
                slope_sum += f64::from((normalized[x + (y + 1) * w] - here).abs());
                slope_samples += 1;
            }
        }
    }

    let water_cells = normalized.iter().filter(|&&v| v < WATER_THRESHOLD).count();

    ReliefMetrics {
        mean_slope: if slope_samples == 0 { 0.0 } else { (slope_sum / slope_samples as f64) as f32 },
        water_coverage: water_cells as f32 / normalized.len() as f32,
        land_regions: count_land_regions(&normalized, w, h),
        min_height,
        max_height,
    }
}

/// 4-connected flood fill over cells at or above the water threshold.
fn count_land_regions(normalized: &[f32], w: usize, h: usize) -> usize {
    let mut visited = vec![false; normalized.len()];
    let mut queue = VecDeque::new();
    let mut regions = 0;

    for start in 0..normalized.len() {
        if visited[start] || normalized[start] < WATER_THRESHOLD {
            continue;
        }
        regions += 1;
        visited[start] = true;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            let x = idx % w;
            let y = idx / w;
            let neighbours = [
                (x > 0).then(|| idx - 1),
                (x + 1 < w).then(|| idx + 1),
                (y > 0).then(|| idx - w),
                (y + 1 < h).then(|| idx + w),
            ];
            for n in neighbours.into_iter().flatten() {
                if !visited[n] && normalized[n] >= WATER_THRESHOLD {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }
    }
    regions
}

/// Non-air cell counts per material id, ordered by id.
#[must_use]
pub fn material_histogram(grid: &VoxelGrid) -> BTreeMap<MaterialId, usize> {
    let mut histogram = BTreeMap::new();
    for &id in grid.data() {
        if id != AIR {
            *histogram.entry(id).or_insert(0) += 1;
        }
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_metrics() {
        let grid = VoxelGrid::new(5, 5, 5);
        let fill = compute_voxel_fill_metrics(&grid);
        assert_eq!(fill.filled, 0);
        assert_eq!(fill.total, 125);
        assert_eq!(fill.fill_ratio, 0.0);
        assert_eq!(fill.extent, [0, 0, 0]);
        assert!(fill.min.is_none());

        let conn = compute_voxel_connectivity(&grid);
        assert_eq!(conn.component_count, 0);
        assert_eq!(conn.largest_component_ratio, 0.0);
    }

    #[test]
    fn test_shape_ratio() {
        let mut grid = VoxelGrid::new(8, 8, 8);
        for x in 0..6 {
            for z in 0..2 {
                grid.set(x, 0, z, 1);
                grid.set(x, 1, z, 1);
            }
        }
        let fill = compute_voxel_fill_metrics(&grid);
        assert_eq!(fill.extent, [6, 2, 2]);
        assert!((fill.horizontal_vertical_ratio - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_heightmap() {
        let map = HeightMap::filled(16, 16, 0.2);
        let relief = compute_scenario_relief_metrics(&map);
        assert_eq!(relief.mean_slope, 0.0);
        assert_eq!(relief.water_coverage, 0.0);
        assert_eq!(relief.land_regions, 1);
    }

    #[test]
    fn test_two_islands() {
        let mut map = HeightMap::filled(10, 4, 0.0);
        for y in 0..4 {
            map.set(1, y, 1.0);
            map.set(8, y, 1.0);
        }
        let relief = compute_scenario_relief_metrics(&map);
        assert_eq!(relief.land_regions, 2);
        assert!((relief.water_coverage - 0.8).abs() < 1e-6);
        assert!(relief.mean_slope > 0.0);
    }

    #[test]
    fn test_histogram_skips_air() {
        let mut grid = VoxelGrid::new(3, 1, 1);
        grid.set(0, 0, 0, 4);
        grid.set(2, 0, 0, 4);
        let histogram = material_histogram(&grid);
        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram[&4], 2);
    }
}
