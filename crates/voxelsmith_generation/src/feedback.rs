//! Prompt composition and feedback rewriting.

use std::fmt::Write as _;

use voxelsmith_objects::PrimitiveShape;

use crate::profile::DetailLevel;

/// Composes the base object prompt.
#[must_use]
pub fn compose_object_prompt(description: &str, detail: DetailLevel, bounds: Option<[usize; 3]>) -> String {
    let shapes: Vec<&str> = PrimitiveShape::ALL.iter().map(|s| s.name()).collect();
    let mut prompt = format!(
        "Design a voxel object: {}\n\
         Return JSON {{\"name\", \"bounds\": [x, y, z], \"primitives\": [...]}} where each primitive has \
         \"type\" ({}), \"position\" [x, y, z], \"size\" [x, y, z], \"material\", optional \"rotation\" \
         in quarter turns and optional \"subtract\". The y axis points up.\n\
         Detail level: {} (aim for at least {} primitives).",
        description.trim(),
        shapes.join(", "),
        detail.name(),
        detail.min_primitives()
    );
    if let Some([x, y, z]) = bounds {
        let _ = write!(prompt, "\nFit the object inside {x} x {y} x {z} voxels.");
    }
    prompt
}

/// Appends feedback from the previous candidate to a base prompt.
#[must_use]
pub fn rewrite_prompt(base: &str, previous_score: Option<f32>, feedback: &[String]) -> String {
    if feedback.is_empty() {
        return base.to_string();
    }
    let mut prompt = String::from(base);
    prompt.push_str("\n\nPrevious attempt feedback");
    if let Some(score) = previous_score {
        let _ = write!(prompt, " (score {score:.2})");
    }
    prompt.push(':');
    for line in feedback {
        let _ = write!(prompt, "\n- {line}");
    }
    prompt
}
