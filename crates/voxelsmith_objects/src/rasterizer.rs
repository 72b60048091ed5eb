//! # Primitive Voxel Rasterizer
//!
//! Fills a dense y-up grid from an ordered primitive list.
//!
//! ## Contract
//!
//! - Primitives apply strictly in order; later ones overwrite earlier ones
//! - Loops are clipped to the canvas, so cost is bounded by the grid size
//!   no matter how large or far away a primitive is
//! - Every write goes through `ObjectCanvas::set_voxel`, which drops
//!   out-of-range cells
//! - Subtract writes air and is never counted as added usage
//!
//! ## Shape predicates
//!
//! Each shape is tested per cell of its rotated bounding box, using cell
//! centers. Horizontal extents use the rotated footprint, so odd quarter
//! turns swap x and z.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;
use voxelsmith_core::{CoreResult, MaterialId, MaterialTable, VoxelGrid, AIR};

use crate::blueprint::Blueprint;
use crate::primitive::{Primitive, PrimitiveShape};
use crate::scale::{plan_scale, ScaleOptions};

/// A grid being written plus added-material usage.
#[derive(Clone, Debug)]
pub struct ObjectCanvas {
    grid: VoxelGrid,
    usage: BTreeMap<MaterialId, usize>,
}

impl ObjectCanvas {
    /// Creates an all-air canvas.
    #[must_use]
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            grid: VoxelGrid::new(width, height, depth),
            usage: BTreeMap::new(),
        }
    }

    /// Writes one cell. Returns false when the cell is out of range.
    pub fn set_voxel(&mut self, x: i64, y: i64, z: i64, material: MaterialId, subtract: bool) -> bool {
        if subtract {
            return self.grid.set_signed(x, y, z, AIR);
        }
        if material == AIR {
            return self.grid.set_signed(x, y, z, AIR);
        }
        let written = self.grid.set_signed(x, y, z, material);
        if written {
            *self.usage.entry(material).or_insert(0) += 1;
        }
        written
    }

    /// The grid.
    #[must_use]
    pub const fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Consumes the canvas.
    #[must_use]
    pub fn into_parts(self) -> (VoxelGrid, BTreeMap<MaterialId, usize>) {
        (self.grid, self.usage)
    }
}

/// Result of rasterizing a blueprint.
#[derive(Clone, Debug)]
pub struct RasterizedObject {
    /// The filled grid (y-up).
    pub grid: VoxelGrid,
    /// Cells written per material by additive primitives.
    pub usage: BTreeMap<MaterialId, usize>,
    /// Scale, size and parse notes.
    pub warnings: Vec<String>,
    /// Primitives as rasterized, after scaling.
    pub primitives: Vec<Primitive>,
    /// Bounds requested after the multiplier.
    pub requested_bounds: [usize; 3],
    /// Bounds of the grid.
    pub effective_bounds: [usize; 3],
    /// Shrink applied by the ceilings.
    pub clamp_factor: f32,
}

/// Serializable sizing summary.
#[derive(Clone, Debug, Serialize)]
pub struct RasterSummary {
    /// Bounds requested after the multiplier.
    pub requested_bounds: [usize; 3],
    /// Bounds of the grid.
    pub effective_bounds: [usize; 3],
    /// Shrink applied by the ceilings.
    pub clamp_factor: f32,
    /// Non-air cells.
    pub filled: usize,
}

impl RasterizedObject {
    /// Sizing summary.
    #[must_use]
    pub fn summary(&self) -> RasterSummary {
        RasterSummary {
            requested_bounds: self.requested_bounds,
            effective_bounds: self.effective_bounds,
            clamp_factor: self.clamp_factor,
            filled: self.grid.filled_count(),
        }
    }
}

/// Scales and rasterizes a blueprint.
///
/// # Errors
///
/// `CoreError::SafetyLimitExceeded` when the scaled request is above the
/// hard ceiling and oversize requests are not allowed.
pub fn rasterize(blueprint: &Blueprint, options: &ScaleOptions, table: &MaterialTable) -> CoreResult<RasterizedObject> {
    let plan = plan_scale(blueprint, options)?;
    let [w, h, d] = plan.effective;
    let mut canvas = ObjectCanvas::new(w, h, d);
    for primitive in &plan.primitives {
        let material = if primitive.subtract {
            AIR
        } else {
            table.resolve_ref(&primitive.material)
        };
        rasterize_primitive(&mut canvas, primitive, material);
    }
    let (grid, usage) = canvas.into_parts();
    tracing::debug!(
        "rasterized '{}': {} primitives, {} cells filled in {}",
        blueprint.name,
        plan.primitives.len(),
        grid.filled_count(),
        grid.dims()
    );
    Ok(RasterizedObject {
        grid,
        usage,
        warnings: plan.warnings,
        primitives: plan.primitives,
        requested_bounds: plan.requested,
        effective_bounds: plan.effective,
        clamp_factor: plan.clamp_factor,
    })
}

/// Writes one primitive into a canvas.
///
/// Only the part of the footprint that overlaps the canvas is visited; shape
/// tests still use the full local size.
pub fn rasterize_primitive(canvas: &mut ObjectCanvas, primitive: &Primitive, material: MaterialId) {
    let size = primitive.footprint();
    let [px, py, pz] = primitive.position;
    let dims = canvas.grid.dims();
    let xs = clip_span(px, size[0], dims.width);
    let ys = clip_span(py, size[1], dims.height);
    let zs = clip_span(pz, size[2], dims.depth);
    for ly in ys {
        for lz in zs.clone() {
            for lx in xs.clone() {
                if inside(primitive.shape, primitive.rotation, size, [lx, ly, lz]) {
                    canvas.set_voxel(
                        px.saturating_add(i64::from(lx)),
                        py.saturating_add(i64::from(ly)),
                        pz.saturating_add(i64::from(lz)),
                        material,
                        primitive.subtract,
                    );
                }
            }
        }
    }
}

/// Local offsets along one axis whose world cell lies in `[0, dim)`.
fn clip_span(position: i64, size: u32, dim: usize) -> Range<u32> {
    let size = i64::from(size);
    let dim = i64::try_from(dim).unwrap_or(i64::MAX);
    let start = position.saturating_neg().clamp(0, size);
    let end = dim.saturating_sub(position).clamp(0, size);
    // Both bounds lie in [0, size], which fits in u32.
    start as u32..end.max(start) as u32
}

/// Cell-center membership test in local coordinates.
#[must_use]
pub fn inside(shape: PrimitiveShape, rotation: u8, size: [u32; 3], cell: [u32; 3]) -> bool {
    let [sx, sy, sz] = size.map(|s| s.max(1) as f32);
    let [lx, ly, lz] = cell.map(|c| c as f32 + 0.5);
    // Offsets from the center, normalized to [-1, 1].
    let nx = lx / sx * 2.0 - 1.0;
    let ny = ly / sy * 2.0 - 1.0;
    let nz = lz / sz * 2.0 - 1.0;

    match shape {
        PrimitiveShape::Box => true,
        PrimitiveShape::Cylinder => nx * nx + nz * nz <= 1.0,
        PrimitiveShape::Sphere => nx * nx + ny * ny + nz * nz <= 1.0,
        PrimitiveShape::Cone => {
            let radius = 1.0 - (ly - 0.5) / sy;
            nx * nx + nz * nz <= radius * radius
        }
        PrimitiveShape::Slope => {
            let t = match rotation % 4 {
                0 => lx / sx,
                1 => lz / sz,
                2 => 1.0 - (lx - 0.5) / sx,
                _ => 1.0 - (lz - 0.5) / sz,
            };
            let column = (t * sy).ceil().max(1.0);
            ly <= column
        }
        PrimitiveShape::Arch => {
            // The opening spans the long axis of the unrotated shape.
            let (span, along) = if rotation % 2 == 1 { (sz, lz) } else { (sx, lx) };
            let leg = (span / 5.0).max(1.0);
            let crown = (sy / 4.0).max(1.0);
            let rx = span * 0.5 - leg;
            let ry = sy - crown;
            if rx <= 0.0 || ry <= 0.0 {
                return true;
            }
            let dx = (along - span * 0.5) / rx;
            let dy = (ly - 0.5) / ry;
            dx * dx + dy * dy > 1.0
        }
        PrimitiveShape::Pyramid => {
            let shrink = 1.0 - (ly - 0.5) / sy;
            let hx = (sx * 0.5 * shrink).max(0.5);
            let hz = (sz * 0.5 * shrink).max(0.5);
            (lx - sx * 0.5).abs() <= hx && (lz - sz * 0.5).abs() <= hz
        }
        PrimitiveShape::Torus => {
            let horizontal = sx.min(sz) * 0.5;
            let minor = (sy * 0.5).min(horizontal * 0.5).max(0.5);
            let major = (horizontal - minor).max(minor);
            let dx = lx - sx * 0.5;
            let dz = lz - sz * 0.5;
            let dy = ly - sy * 0.5;
            let ring = (dx * dx + dz * dz).sqrt() - major;
            ring * ring + dy * dy <= minor * minor
        }
    }
}
