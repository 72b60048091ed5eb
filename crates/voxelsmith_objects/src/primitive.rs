//! # Primitives
//!
//! The closed set of shapes a blueprint is built from.
//!
//! Object grids are y-up: `size[1]` is the height, `(x, z)` the footprint.

use serde::{Deserialize, Serialize};
use voxelsmith_core::MaterialRef;

/// Shape of a primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveShape {
    /// Solid box.
    Box,
    /// Vertical cylinder with an elliptic cross-section.
    Cylinder,
    /// Ellipsoid.
    Sphere,
    /// Ramp rising along one horizontal axis.
    Slope,
    /// Box with a semicircular opening at the base.
    Arch,
    /// Vertical cone, widest at the base.
    Cone,
    /// Square-based pyramid.
    Pyramid,
    /// Horizontal ring.
    Torus,
}

impl PrimitiveShape {
    /// Every shape.
    pub const ALL: [Self; 8] = [
        Self::Box,
        Self::Cylinder,
        Self::Sphere,
        Self::Slope,
        Self::Arch,
        Self::Cone,
        Self::Pyramid,
        Self::Torus,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
            Self::Slope => "slope",
            Self::Arch => "arch",
            Self::Cone => "cone",
            Self::Pyramid => "pyramid",
            Self::Torus => "torus",
        }
    }

    /// Parses a name or common alias.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        if let Some(shape) = Self::ALL.iter().find(|s| s.name() == key) {
            return Some(*shape);
        }
        match key.as_str() {
            "cube" | "cuboid" | "block" | "rect" | "rectangle" => Some(Self::Box),
            "cyl" | "tube" | "pillar" | "column" => Some(Self::Cylinder),
            "ball" | "ellipsoid" | "sphere_like" => Some(Self::Sphere),
            "ramp" | "wedge" | "stairs" => Some(Self::Slope),
            "ring" | "donut" => Some(Self::Torus),
            _ => None,
        }
    }

    /// Parses a name, falling back to `Box` for unknown shapes.
    ///
    /// The second value is true when the fallback was used.
    #[must_use]
    pub fn parse_or_box(name: &str) -> (Self, bool) {
        match Self::parse(name) {
            Some(shape) => (shape, false),
            None => {
                tracing::warn!("unknown primitive shape '{}', treating as box", name);
                (Self::Box, true)
            }
        }
    }

    /// Returns true for shapes that fill their whole bounding box.
    #[must_use]
    pub const fn is_boxy(self) -> bool {
        matches!(self, Self::Box)
    }
}

impl std::fmt::Display for PrimitiveShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest accepted coordinate magnitude and primitive size per axis.
pub const COORD_LIMIT: i64 = 1 << 20;

/// One shape placed in object space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Shape.
    pub shape: PrimitiveShape,
    /// Minimum corner `[x, y, z]`.
    pub position: [i64; 3],
    /// Size `[x, y, z]` before rotation; always at least 1 per axis.
    pub size: [u32; 3],
    /// Material reference.
    #[serde(default)]
    pub material: MaterialRef,
    /// Quarter turns about the vertical axis.
    #[serde(default)]
    pub rotation: u8,
    /// Clears cells to air instead of filling them.
    #[serde(default)]
    pub subtract: bool,
    /// Optional label from the blueprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Primitive {
    /// Creates an unrotated, additive primitive; zero sizes become 1.
    #[must_use]
    pub fn new(shape: PrimitiveShape, position: [i64; 3], size: [u32; 3], material: impl Into<MaterialRef>) -> Self {
        Self {
            shape,
            position,
            size: size.map(|s| s.max(1)),
            material: material.into(),
            rotation: 0,
            subtract: false,
            label: None,
        }
    }

    /// Sets the rotation in quarter turns.
    #[must_use]
    pub fn with_rotation(mut self, quarter_turns: u8) -> Self {
        self.rotation = quarter_turns % 4;
        self
    }

    /// Marks the primitive as subtractive.
    #[must_use]
    pub fn subtracting(mut self) -> Self {
        self.subtract = true;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Occupied size after rotation; odd turns swap x and z.
    #[must_use]
    pub const fn footprint(&self) -> [u32; 3] {
        let [x, y, z] = self.size;
        if self.rotation % 2 == 1 {
            [z, y, x]
        } else {
            [x, y, z]
        }
    }

    /// Exclusive maximum corner after rotation.
    #[must_use]
    pub fn max_corner(&self) -> [i64; 3] {
        let f = self.footprint();
        [0, 1, 2].map(|axis| self.position[axis].saturating_add(i64::from(f[axis])))
    }

    /// Bounding box volume, saturating at `u64::MAX`.
    #[must_use]
    pub fn volume(&self) -> u64 {
        self.size
            .iter()
            .fold(1u64, |acc, &s| acc.saturating_mul(u64::from(s)))
    }

    /// Shrinks the rotated footprint so no axis exceeds `bounds`.
    ///
    /// Returns true when any axis was clamped.
    pub fn fit_within(&mut self, bounds: [usize; 3]) -> bool {
        let limit = bounds.map(|b| u32::try_from(b.max(1)).unwrap_or(u32::MAX));
        // Size axes in footprint order; odd turns swap x and z.
        let (ix, iz) = if self.rotation % 2 == 1 { (2, 0) } else { (0, 2) };
        let before = self.size;
        self.size[ix] = self.size[ix].min(limit[0]);
        self.size[1] = self.size[1].min(limit[1]);
        self.size[iz] = self.size[iz].min(limit[2]);
        before != self.size
    }

    /// Longest axis divided by shortest axis.
    #[must_use]
    pub fn elongation(&self) -> f32 {
        let max = self.size.iter().copied().max().unwrap_or(1) as f32;
        let min = self.size.iter().copied().min().unwrap_or(1).max(1) as f32;
        max / min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(PrimitiveShape::parse("Cube"), Some(PrimitiveShape::Box));
        assert_eq!(PrimitiveShape::parse(" torus "), Some(PrimitiveShape::Torus));
        assert_eq!(PrimitiveShape::parse("blob"), None);
        assert_eq!(PrimitiveShape::parse_or_box("blob"), (PrimitiveShape::Box, true));
    }

    #[test]
    fn test_odd_rotation_swaps_footprint() {
        let p = Primitive::new(PrimitiveShape::Slope, [0, 0, 0], [6, 2, 3], "wood");
        assert_eq!(p.footprint(), [6, 2, 3]);
        assert_eq!(p.clone().with_rotation(1).footprint(), [3, 2, 6]);
        assert_eq!(p.clone().with_rotation(2).footprint(), [6, 2, 3]);
        assert_eq!(p.with_rotation(7).rotation, 3);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let p = Primitive::new(PrimitiveShape::Box, [i64::MAX, 0, i64::MIN], [u32::MAX; 3], "stone");
        assert_eq!(p.max_corner(), [i64::MAX, i64::from(u32::MAX), i64::MIN + i64::from(u32::MAX)]);
        assert_eq!(p.volume(), u64::MAX);
    }

    #[test]
    fn test_fit_within_respects_rotation() {
        let mut p = Primitive::new(PrimitiveShape::Box, [0, 0, 0], [40, 3, 2], "wood").with_rotation(1);
        assert!(p.fit_within([8, 8, 8]));
        assert_eq!(p.footprint(), [2, 3, 8]);
        assert!(!p.fit_within([8, 8, 8]));
    }

    #[test]
    fn test_zero_size_becomes_one() {
        let p = Primitive::new(PrimitiveShape::Box, [0, 0, 0], [0, 3, 0], 7u16);
        assert_eq!(p.size, [1, 3, 1]);
        assert_eq!(p.volume(), 3);
    }
}
