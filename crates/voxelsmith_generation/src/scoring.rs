//! # Object Quality Scoring
//!
//! Weighted sum of six shape terms minus defect penalties, clamped to
//! `[0, 1]`. Every term is in `[0, 1]` before weighting.

use std::collections::BTreeSet;

use serde::Serialize;
use voxelsmith_core::analysis::{compute_voxel_connectivity, compute_voxel_fill_metrics};
use voxelsmith_objects::{PrimitiveShape, RasterizedObject};

use crate::config::GenerationConfig;
use crate::defects::{detect_defects, Defect};
use crate::profile::DetailLevel;

/// Measurements of one rasterized candidate.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CandidateMetrics {
    /// Additive primitives.
    pub primitive_count: usize,
    /// Distinct shapes among additive primitives.
    pub shape_count: usize,
    /// Distinct materials written.
    pub material_count: usize,
    /// Non-air cells.
    pub filled: usize,
    /// Filled fraction of the grid.
    pub fill_ratio: f32,
    /// Largest additive primitive volume over the sum of additive volumes.
    pub largest_share: f32,
    /// 6-connected components.
    pub component_count: usize,
    /// Largest component over filled cells.
    pub cohesion: f32,
    /// Largest material write count over all material writes.
    pub dominant_material_share: f32,
    /// Grid size.
    pub bounds: [usize; 3],
    /// Tight extent of the filled cells.
    pub extent: [usize; 3],
}

impl CandidateMetrics {
    /// Measures a rasterized object.
    #[must_use]
    pub fn measure(object: &RasterizedObject) -> Self {
        let fill = compute_voxel_fill_metrics(&object.grid);
        let connectivity = compute_voxel_connectivity(&object.grid);

        let additive: Vec<_> = object.primitives.iter().filter(|p| !p.subtract).collect();
        let shapes: BTreeSet<PrimitiveShape> = additive.iter().map(|p| p.shape).collect();
        let volumes: Vec<u64> = additive.iter().map(|p| p.volume()).collect();
        let total_volume = volumes.iter().fold(0u64, |acc, &v| acc.saturating_add(v));
        let largest_share = if total_volume == 0 {
            0.0
        } else {
            volumes.iter().copied().max().unwrap_or(0) as f32 / total_volume as f32
        };

        let writes: usize = object.usage.values().sum();
        let dominant_material_share = if writes == 0 {
            0.0
        } else {
            object.usage.values().copied().max().unwrap_or(0) as f32 / writes as f32
        };

        Self {
            primitive_count: additive.len(),
            shape_count: shapes.len(),
            material_count: object.usage.len(),
            filled: fill.filled,
            fill_ratio: fill.fill_ratio,
            largest_share,
            component_count: connectivity.component_count,
            cohesion: connectivity.largest_component_ratio,
            dominant_material_share,
            bounds: object.effective_bounds,
            extent: fill.extent,
        }
    }
}

/// Unweighted score terms.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Primitive-count adequacy.
    pub count: f32,
    /// Shape diversity.
    pub type_diversity: f32,
    /// Material diversity.
    pub material_diversity: f32,
    /// Fill ratio inside the expected band.
    pub fill_band: f32,
    /// `1 - largest_share`; 0 for a single primitive.
    pub dominance: f32,
    /// Connectivity cohesion.
    pub cohesion: f32,
    /// Weighted sum before penalties.
    pub weighted: f32,
    /// Sum of defect penalties.
    pub penalty_total: f32,
}

/// Score, breakdown and defects of one candidate.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QualityAnalysis {
    /// Final score in `[0, 1]`.
    pub score: f32,
    /// Term breakdown.
    pub breakdown: ScoreBreakdown,
    /// Detected defects.
    pub defects: Vec<Defect>,
    /// Advice for weak score terms.
    pub hints: Vec<String>,
    /// Raw measurements.
    pub metrics: CandidateMetrics,
}

impl QualityAnalysis {
    /// Feedback lines for the next prompt: defects first, then hints.
    #[must_use]
    pub fn feedback(&self) -> Vec<String> {
        self.defects
            .iter()
            .map(|d| d.feedback.clone())
            .chain(self.hints.iter().cloned())
            .collect()
    }
}

/// Score of a fill ratio against a band, falling off linearly outside it.
#[must_use]
pub fn band_score(value: f32, (lo, hi): (f32, f32)) -> f32 {
    if value < lo {
        (value / lo.max(f32::EPSILON)).clamp(0.0, 1.0)
    } else if value > hi {
        (1.0 - (value - hi) / (1.0 - hi).max(f32::EPSILON)).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Scores a rasterized object against its prompt.
#[must_use]
pub fn analyze_object(
    prompt: &str,
    detail: DetailLevel,
    object: &RasterizedObject,
    config: &GenerationConfig,
) -> QualityAnalysis {
    let metrics = CandidateMetrics::measure(object);
    let weights = &config.scoring;

    let count = (metrics.primitive_count as f32 / detail.min_primitives().max(1) as f32).min(1.0);
    let type_diversity = (metrics.shape_count as f32 / 3.0).min(1.0);
    let material_diversity = (metrics.material_count as f32 / 3.0).min(1.0);
    let fill_band = if metrics.filled == 0 {
        0.0
    } else {
        band_score(metrics.fill_ratio, detail.fill_band())
    };
    let dominance = if metrics.primitive_count > 1 {
        1.0 - metrics.largest_share
    } else {
        0.0
    };
    let cohesion = metrics.cohesion;

    let weighted = weights.count * count
        + weights.type_diversity * type_diversity
        + weights.material_diversity * material_diversity
        + weights.fill_band * fill_band
        + weights.dominance * dominance
        + weights.cohesion * cohesion;

    let mut hints = Vec::new();
    if count < 1.0 {
        hints.push(format!(
            "use at least {} primitives for {} detail",
            detail.min_primitives(),
            detail.name()
        ));
    }
    if type_diversity < 1.0 {
        hints.push("combine at least three different primitive types".to_string());
    }
    if material_diversity < 1.0 {
        hints.push("use at least three materials".to_string());
    }
    if fill_band < 1.0 && metrics.filled > 0 {
        let (lo, hi) = detail.fill_band();
        hints.push(format!(
            "the object fills {:.0}% of its bounds; aim for {:.0}-{:.0}%",
            metrics.fill_ratio * 100.0,
            lo * 100.0,
            hi * 100.0
        ));
    }

    let defects = detect_defects(prompt, object, &metrics, &config.penalties);
    let penalty_total: f32 = defects.iter().map(|d| d.penalty).sum();
    let score = (weighted - penalty_total).clamp(0.0, 1.0);

    QualityAnalysis {
        score,
        breakdown: ScoreBreakdown {
            count,
            type_diversity,
            material_diversity,
            fill_band,
            dominance,
            cohesion,
            weighted,
            penalty_total,
        },
        defects,
        hints,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxelsmith_core::MaterialTable;
    use voxelsmith_objects::{rasterize, Blueprint, Primitive, ScaleOptions};

    fn analyze(prompt: &str, blueprint: &Blueprint) -> QualityAnalysis {
        let object = rasterize(blueprint, &ScaleOptions::default(), &MaterialTable::default()).unwrap();
        analyze_object(prompt, DetailLevel::Medium, &object, &GenerationConfig::default())
    }

    fn lamp() -> Blueprint {
        Blueprint::new("lamp")
            .with_primitive(Primitive::new(PrimitiveShape::Cylinder, [3, 0, 3], [4, 1, 4], "stone"))
            .with_primitive(Primitive::new(PrimitiveShape::Cylinder, [4, 1, 4], [2, 8, 2], "metal"))
            .with_primitive(Primitive::new(PrimitiveShape::Cone, [1, 9, 1], [8, 4, 8], "cloth"))
            .with_primitive(Primitive::new(PrimitiveShape::Sphere, [4, 8, 4], [2, 2, 2], "glass"))
    }

    #[test]
    fn test_band_score() {
        assert_eq!(band_score(0.2, (0.1, 0.6)), 1.0);
        assert!((band_score(0.05, (0.1, 0.6)) - 0.5).abs() < 1e-6);
        assert!(band_score(0.8, (0.1, 0.6)) < 1.0);
        assert_eq!(band_score(1.0, (0.1, 0.6)), 0.0);
    }

    #[test]
    fn test_score_is_clamped_and_deterministic() {
        let a = analyze("a desk lamp", &lamp());
        let b = analyze("a desk lamp", &lamp());
        println!("lamp score {:.3} breakdown {:?}", a.score, a.breakdown);
        assert_eq!(a.score, b.score);
        assert!((0.0..=1.0).contains(&a.score));
        assert_eq!(a.metrics.primitive_count, 4);
        assert_eq!(a.metrics.shape_count, 3);
    }

    #[test]
    fn test_varied_object_beats_single_box() {
        let single = Blueprint::new("slab")
            .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [10, 10, 10], "stone"));
        let varied = analyze("a desk lamp", &lamp());
        let boxed = analyze("a desk lamp", &single);
        println!("varied {:.3} vs single box {:.3}", varied.score, boxed.score);
        assert!(varied.score > boxed.score);
        assert_eq!(boxed.breakdown.dominance, 0.0);
    }

    #[test]
    fn test_empty_object_scores_low() {
        let empty = Blueprint::new("nothing")
            .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [2, 2, 2], "stone").subtracting());
        let analysis = analyze("nothing", &empty);
        assert_eq!(analysis.metrics.filled, 0);
        assert!(analysis.score < 0.1);
    }
}
