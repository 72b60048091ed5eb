//! # Scale and Safety Clamping
//!
//! Applies the caller's scale multiplier to every primitive and fits the
//! result inside the configured ceilings.
//!
//! - Multiplier clamps to [0.1, 8]
//! - Each axis clamps to `max_dimension`, the volume to `max_cells`; when
//!   either clamps, primitives shrink by the same factor and a warning is
//!   recorded
//! - A requested volume above `hard_limit_cells` is an error unless
//!   `allow_oversize` is set; volumes saturate instead of overflowing
//! - No primitive is larger than the grid it is rasterized into

use serde::{Deserialize, Serialize};
use voxelsmith_core::{CoreError, CoreResult};

use crate::blueprint::Blueprint;
use crate::primitive::Primitive;

/// Smallest accepted multiplier.
pub const MIN_SCALE: f32 = 0.1;
/// Largest accepted multiplier.
pub const MAX_SCALE: f32 = 8.0;
/// Default per-axis ceiling.
pub const DEFAULT_MAX_DIMENSION: usize = 512;
/// Default volume ceiling.
pub const DEFAULT_MAX_CELLS: u64 = 8_000_000;
/// Default hard ceiling.
pub const DEFAULT_HARD_LIMIT_CELLS: u64 = 64_000_000;
/// Fraction of `max_cells` above which a size warning is logged.
pub const SIZE_WARNING_FRACTION: f64 = 0.75;

/// Scaling and safety options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleOptions {
    /// Scale multiplier.
    pub multiplier: f32,
    /// Per-axis ceiling.
    pub max_dimension: usize,
    /// Volume ceiling; larger requests are shrunk.
    pub max_cells: u64,
    /// Hard volume ceiling; larger requests fail.
    pub hard_limit_cells: u64,
    /// Accept requests above the hard ceiling (they are still shrunk).
    pub allow_oversize: bool,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_cells: DEFAULT_MAX_CELLS,
            hard_limit_cells: DEFAULT_HARD_LIMIT_CELLS,
            allow_oversize: false,
        }
    }
}

impl ScaleOptions {
    /// Sets the multiplier.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the per-axis ceiling.
    #[must_use]
    pub const fn with_max_dimension(mut self, max_dimension: usize) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Sets the volume ceiling.
    #[must_use]
    pub const fn with_max_cells(mut self, max_cells: u64) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Sets the hard ceiling.
    #[must_use]
    pub const fn with_hard_limit(mut self, hard_limit_cells: u64) -> Self {
        self.hard_limit_cells = hard_limit_cells;
        self
    }

    /// Allows requests above the hard ceiling.
    #[must_use]
    pub const fn with_allow_oversize(mut self, allow: bool) -> Self {
        self.allow_oversize = allow;
        self
    }

    /// Clamped multiplier; non-finite values become 1.
    #[must_use]
    pub fn effective_multiplier(&self) -> f32 {
        if self.multiplier.is_finite() {
            self.multiplier.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        }
    }
}

/// Primitives and bounds after scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalePlan {
    /// Scaled primitives, same order as the blueprint.
    pub primitives: Vec<Primitive>,
    /// Bounds after the multiplier, before clamping.
    pub requested: [usize; 3],
    /// Bounds of the grid to allocate.
    pub effective: [usize; 3],
    /// Multiplier actually applied.
    pub multiplier: f32,
    /// Extra shrink applied by the ceilings (1 when nothing clamped).
    pub clamp_factor: f32,
    /// Non-fatal notes.
    pub warnings: Vec<String>,
}

fn volume(dims: [usize; 3]) -> u64 {
    dims.iter().fold(1u64, |acc, &d| acc.saturating_mul(d as u64))
}

fn scale_primitive(p: &Primitive, factor: f32) -> Primitive {
    let mut scaled = p.clone();
    scaled.position = p.position.map(|v| (v as f32 * factor).round() as i64);
    scaled.size = p.size.map(|v| ((v as f32 * factor).round() as u32).max(1));
    scaled
}

/// Bounds implied by primitive extents (at least 1 per axis).
fn derived_bounds(primitives: &[Primitive]) -> [usize; 3] {
    let mut bounds = [1usize; 3];
    for p in primitives {
        for (axis, &max) in p.max_corner().iter().enumerate() {
            bounds[axis] = bounds[axis].max(max.max(1) as usize);
        }
    }
    bounds
}

/// Scales a blueprint and fits it inside the ceilings.
///
/// # Errors
///
/// `CoreError::SafetyLimitExceeded` when the requested volume is above the
/// hard ceiling and `allow_oversize` is not set.
pub fn plan_scale(blueprint: &Blueprint, options: &ScaleOptions) -> CoreResult<ScalePlan> {
    let mut warnings = Vec::new();
    let multiplier = options.effective_multiplier();
    if (multiplier - options.multiplier).abs() > f32::EPSILON {
        warnings.push(format!(
            "scale multiplier {} clamped to {multiplier}",
            options.multiplier
        ));
    }

    let mut primitives: Vec<Primitive> = blueprint
        .primitives
        .iter()
        .map(|p| scale_primitive(p, multiplier))
        .collect();

    let requested = match blueprint.bounds {
        Some(b) => b.map(|v| ((v as f32 * multiplier).round() as usize).max(1)),
        None => derived_bounds(&primitives),
    };
    let requested_cells = volume(requested);

    if requested_cells > options.hard_limit_cells && !options.allow_oversize {
        return Err(CoreError::SafetyLimitExceeded {
            requested: requested_cells,
            limit: options.hard_limit_cells,
        });
    }
    if requested_cells as f64 > options.max_cells as f64 * SIZE_WARNING_FRACTION {
        tracing::warn!(
            "large object request: {} cells ({:.0}% of the {} cell ceiling)",
            requested_cells,
            requested_cells as f64 / options.max_cells.max(1) as f64 * 100.0,
            options.max_cells
        );
    }

    let max_dim = options.max_dimension.max(1) as f32;
    let longest = requested.iter().copied().max().unwrap_or(1) as f32;
    let mut factor = (max_dim / longest).min(1.0);
    if requested_cells > options.max_cells {
        let by_volume = (options.max_cells.max(1) as f64 / requested_cells as f64).cbrt() as f32;
        factor = factor.min(by_volume);
    }

    let effective = if factor < 1.0 {
        let effective = requested.map(|v| ((v as f32 * factor).floor() as usize).clamp(1, options.max_dimension.max(1)));
        primitives = primitives.iter().map(|p| scale_primitive(p, factor)).collect();
        let note = format!(
            "bounds {:?} clamped to {:?} (factor {factor:.3})",
            requested, effective
        );
        tracing::warn!("{}", note);
        warnings.push(note);
        effective
    } else {
        requested
    };

    let fitted = primitives.iter_mut().map(|p| p.fit_within(effective)).filter(|&changed| changed).count();
    if fitted > 0 {
        let note = format!("{fitted} primitive(s) larger than bounds {effective:?} were trimmed to fit");
        tracing::warn!("{}", note);
        warnings.push(note);
    }

    Ok(ScalePlan {
        primitives,
        requested,
        effective,
        multiplier,
        clamp_factor: factor,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveShape;

    fn cube(size: u32) -> Blueprint {
        Blueprint::new("cube").with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [size; 3], "stone"))
    }

    #[test]
    fn test_identity_scale() {
        let plan = plan_scale(&cube(4), &ScaleOptions::default()).unwrap();
        assert_eq!(plan.requested, [4, 4, 4]);
        assert_eq!(plan.effective, [4, 4, 4]);
        assert_eq!(plan.clamp_factor, 1.0);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_multiplier_clamped() {
        let plan = plan_scale(&cube(2), &ScaleOptions::default().with_multiplier(20.0)).unwrap();
        assert_eq!(plan.multiplier, MAX_SCALE);
        assert_eq!(plan.primitives[0].size, [16, 16, 16]);
        assert_eq!(plan.warnings.len(), 1);

        let plan = plan_scale(&cube(10), &ScaleOptions::default().with_multiplier(0.01)).unwrap();
        assert_eq!(plan.primitives[0].size, [1, 1, 1]);
    }

    #[test]
    fn test_ceiling_shrinks_with_warning() {
        let options = ScaleOptions::default().with_max_dimension(64).with_max_cells(100_000);
        let plan = plan_scale(&cube(100), &options).unwrap();
        assert!(plan.effective.iter().all(|&d| d <= 64));
        assert!(volume(plan.effective) <= 100_000);
        assert!(plan.clamp_factor < 1.0);
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.primitives[0].size[0] <= 64);
    }

    #[test]
    fn test_oversized_primitive_trimmed_to_bounds() {
        let blueprint = cube(3000).with_bounds([8, 8, 8]);
        let plan = plan_scale(&blueprint, &ScaleOptions::default()).unwrap();
        assert_eq!(plan.effective, [8, 8, 8]);
        assert_eq!(plan.primitives[0].size, [8, 8, 8]);
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_overflowing_bounds_hit_the_hard_limit() {
        let blueprint = cube(4).with_bounds([usize::MAX, usize::MAX, 10_000_000]);
        let err = plan_scale(&blueprint, &ScaleOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::SafetyLimitExceeded { requested: u64::MAX, .. }));

        let plan = plan_scale(&blueprint, &ScaleOptions::default().with_allow_oversize(true)).unwrap();
        assert!(plan.effective.iter().all(|&d| (1..=DEFAULT_MAX_DIMENSION).contains(&d)));
        assert!(volume(plan.effective) <= DEFAULT_MAX_CELLS);
    }

    #[test]
    fn test_hard_limit_and_override() {
        let options = ScaleOptions::default().with_hard_limit(1_000);
        let err = plan_scale(&cube(20), &options).unwrap_err();
        assert!(matches!(err, CoreError::SafetyLimitExceeded { requested: 8_000, limit: 1_000 }));

        let plan = plan_scale(&cube(20), &options.with_allow_oversize(true)).unwrap();
        assert_eq!(plan.effective, [20, 20, 20]);
    }
}
