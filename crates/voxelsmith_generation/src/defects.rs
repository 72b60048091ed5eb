//! # Defect Detectors
//!
//! Heuristics that recognize common failure shapes in predicted blueprints.
//! Each detector yields a penalty and one line of feedback that the next
//! prompt carries forward.

use std::collections::BTreeSet;

use serde::Serialize;
use voxelsmith_objects::{Primitive, PrimitiveShape, RasterizedObject};

use crate::config::PenaltyConfig;
use crate::scoring::CandidateMetrics;

/// One detected defect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Defect {
    /// Stable identifier.
    pub name: String,
    /// Score deduction.
    pub penalty: f32,
    /// Instruction for the next attempt.
    pub feedback: String,
}

impl Defect {
    fn new(name: impl Into<String>, penalty: f32, feedback: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            penalty,
            feedback: feedback.into(),
        }
    }
}

/// A prompt-intent rule: objects of this kind need a recognizable part.
#[derive(Clone, Copy)]
pub struct SemanticRule {
    /// Rule identifier.
    pub name: &'static str,
    /// Prompt words that trigger the rule.
    pub keywords: &'static [&'static str],
    /// Required part; a primitive labelled with it also counts.
    pub part: &'static str,
    /// Geometric test for the part.
    pub present: fn(&[&Primitive]) -> bool,
}

fn has_tail(parts: &[&Primitive]) -> bool {
    parts.iter().any(|p| p.elongation() >= 3.0)
}

fn has_wings(parts: &[&Primitive]) -> bool {
    parts
        .iter()
        .filter(|p| {
            let [x, y, z] = p.size;
            y.saturating_mul(3) <= x.max(z)
        })
        .count()
        >= 2
}

fn has_trunk(parts: &[&Primitive]) -> bool {
    parts.iter().any(|p| {
        let [x, y, z] = p.size;
        matches!(p.shape, PrimitiveShape::Cylinder | PrimitiveShape::Box) && y >= x.max(z).saturating_mul(2)
    })
}

fn has_wheels(parts: &[&Primitive]) -> bool {
    parts
        .iter()
        .filter(|p| matches!(p.shape, PrimitiveShape::Cylinder | PrimitiveShape::Torus))
        .count()
        >= 3
}

/// Built-in semantic rules.
pub const SEMANTIC_RULES: &[SemanticRule] = &[
    SemanticRule {
        name: "rodent_without_tail",
        keywords: &["mouse", "mice", "rat", "rodent", "hamster", "squirrel", "beaver", "gerbil"],
        part: "tail",
        present: has_tail,
    },
    SemanticRule {
        name: "bird_without_wings",
        keywords: &["bird", "eagle", "owl", "parrot", "pigeon", "duck", "crow", "hawk", "sparrow"],
        part: "wing",
        present: has_wings,
    },
    SemanticRule {
        name: "tree_without_trunk",
        keywords: &["tree", "oak", "pine", "palm", "birch", "willow"],
        part: "trunk",
        present: has_trunk,
    },
    SemanticRule {
        name: "vehicle_without_wheels",
        keywords: &["car", "truck", "vehicle", "wagon", "cart", "bus", "tractor", "jeep"],
        part: "wheel",
        present: has_wheels,
    },
];

const BASE_WORDS: &[&str] = &["base", "platform", "pedestal", "stand", "floor", "plinth", "foundation"];
const BOX_WORDS: &[&str] = &["box", "crate", "cube", "block", "chest", "cabinet", "container"];

/// Lowercase words of a prompt, with a trailing plural `s` also indexed.
#[must_use]
pub fn prompt_words(prompt: &str) -> BTreeSet<String> {
    let mut words = BTreeSet::new();
    for word in prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
    {
        if let Some(stem) = word.strip_suffix('s') {
            if stem.len() >= 3 {
                words.insert(stem.to_string());
            }
        }
        words.insert(word);
    }
    words
}

fn mentions(words: &BTreeSet<String>, vocabulary: &[&str]) -> bool {
    vocabulary.iter().any(|w| words.contains(*w))
}

fn is_thin_slab(p: &Primitive) -> bool {
    let [x, y, z] = p.footprint();
    p.shape == PrimitiveShape::Box && y <= 2 && x >= y.saturating_mul(4) && z >= y.saturating_mul(4)
}

/// Runs every detector.
#[must_use]
pub fn detect_defects(
    prompt: &str,
    object: &RasterizedObject,
    metrics: &CandidateMetrics,
    penalties: &PenaltyConfig,
) -> Vec<Defect> {
    let words = prompt_words(prompt);
    let parts: Vec<&Primitive> = object.primitives.iter().filter(|p| !p.subtract).collect();
    let [gw, gh, gd] = object.effective_bounds;
    let grid_volume = (gw * gh * gd).max(1) as f32;
    let mut defects = Vec::new();

    let slabs = parts.iter().filter(|p| is_thin_slab(p)).count();
    if slabs >= 3 {
        defects.push(Defect::new(
            "layered_slabs",
            penalties.layered_slabs,
            format!("{slabs} stacked thin slabs; use varied shapes instead of layering flat boxes"),
        ));
    }

    if parts.len() > 1
        && parts
            .iter()
            .any(|p| p.shape == PrimitiveShape::Box && p.volume() as f32 >= 0.6 * grid_volume)
    {
        defects.push(Defect::new(
            "oversized_box",
            penalties.oversized_box,
            "one box encloses most of the object; build the form from smaller parts",
        ));
    }

    let plane = parts.iter().any(|p| {
        let f = p.footprint();
        let thin_axis = (0..3).find(|&a| f[a] <= 1);
        thin_axis.is_some_and(|axis| {
            let bounds = [gw, gh, gd];
            (0..3)
                .filter(|&a| a != axis)
                .all(|a| f[a] as f32 >= 0.9 * bounds[a] as f32 && bounds[a] >= 4)
        })
    });
    if plane {
        defects.push(Defect::new(
            "thin_plane",
            penalties.thin_plane,
            "a one-voxel plane spans the whole bounds; remove it or give it thickness",
        ));
    }

    if parts.len() > 1 && !mentions(&words, BASE_WORDS) {
        let min_y = parts.iter().map(|p| p.position[1]).min().unwrap_or(0);
        let footprint = (gw * gd).max(1) as f32;
        let baseplate = parts.iter().any(|p| {
            let [x, y, z] = p.footprint();
            p.position[1] == min_y && y <= 2 && (u64::from(x) * u64::from(z)) as f32 >= 0.7 * footprint
        });
        if baseplate {
            defects.push(Defect::new(
                "baseplate",
                penalties.baseplate,
                "remove the flat baseplate; the object should stand on its own parts",
            ));
        }
    }

    if parts.len() >= 3 && parts.iter().all(|p| p.shape.is_boxy()) && !mentions(&words, BOX_WORDS) {
        defects.push(Defect::new(
            "box_only",
            penalties.box_only,
            "only boxes were used; add cylinders, spheres, cones or slopes where the form is round or tapered",
        ));
    }

    if parts.len() >= 4 && metrics.dominant_material_share >= 0.9 {
        defects.push(Defect::new(
            "single_material",
            penalties.single_material,
            "one material covers almost everything; give distinct parts distinct materials",
        ));
    }

    if metrics.component_count > 1 {
        let amount = penalties.fragmentation_max * (1.0 - metrics.cohesion).clamp(0.0, 1.0);
        defects.push(Defect::new(
            "fragmentation",
            amount,
            format!(
                "{} disconnected pieces; make parts touch or overlap",
                metrics.component_count
            ),
        ));
    }

    for rule in SEMANTIC_RULES {
        if !mentions(&words, rule.keywords) {
            continue;
        }
        let labelled = parts
            .iter()
            .any(|p| p.label.as_deref().is_some_and(|l| l.to_lowercase().contains(rule.part)));
        if !labelled && !(rule.present)(&parts) {
            defects.push(Defect::new(
                rule.name,
                penalties.semantic,
                format!("the object is missing a recognizable {}", rule.part),
            ));
        }
    }

    if !defects.is_empty() {
        tracing::debug!(
            "defects: {}",
            defects.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
        );
    }
    defects
}
