//! # Vegetation Generators
//!
//! Small parametric plants and rocks written straight into a terrain grid.
//!
//! Writes go through `Planter::place`, which only fills air (and water for
//! aquatic kinds). Solid cells are never overwritten.
//!
//! Terrain grids are z-up: `(x, y)` is the column, `z` is vertical.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use voxelsmith_core::{MaterialId, MaterialTable, VoxelGrid, AIR};

/// Generator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VegetationKind {
    /// Trunk column with a jittered spherical canopy.
    Tree,
    /// Curved trunk with a radial frond ring.
    Palm,
    /// Stem with up to two symmetric arms.
    Cactus,
    /// Layered, shrinking blob.
    Rock,
    /// Small leafy clump.
    Bush,
    /// Single bloom or small cluster.
    Flower,
    /// Stem and flat cap.
    Mushroom,
    /// Thin stalks rising from shallow water.
    Reed,
    /// Branching underwater growth.
    Coral,
}

impl VegetationKind {
    /// Returns true for kinds that may grow into water.
    #[must_use]
    pub const fn is_aquatic(self) -> bool {
        matches!(self, Self::Reed | Self::Coral)
    }

    /// Returns true for kinds that must be rooted below the water surface.
    #[must_use]
    pub const fn is_submerged(self) -> bool {
        matches!(self, Self::Coral)
    }
}

/// Materials used by the generators, resolved once per build.
#[derive(Clone, Copy, Debug)]
pub struct VegetationMaterials {
    wood: MaterialId,
    leaves: MaterialId,
    palm_leaves: MaterialId,
    cactus: MaterialId,
    stone: MaterialId,
    flower: MaterialId,
    mushroom: MaterialId,
    reed: MaterialId,
    coral: MaterialId,
    water: MaterialId,
}

impl VegetationMaterials {
    /// Resolves generator materials through a table.
    #[must_use]
    pub fn resolve(table: &MaterialTable) -> Self {
        Self {
            wood: table.resolve("wood"),
            leaves: table.resolve("leaves"),
            palm_leaves: table.resolve("palm_leaves"),
            cactus: table.resolve("cactus"),
            stone: table.resolve("stone"),
            flower: table.resolve("flower"),
            mushroom: table.resolve("mushroom"),
            reed: table.resolve("reed"),
            coral: table.resolve("coral"),
            water: table.resolve("water"),
        }
    }

    /// Water id.
    #[must_use]
    pub const fn water(&self) -> MaterialId {
        self.water
    }
}

/// Grid writer that refuses to overwrite solid cells.
pub struct Planter<'a> {
    grid: &'a mut VoxelGrid,
    water: MaterialId,
    aquatic: bool,
    written: usize,
}

impl<'a> Planter<'a> {
    /// Creates a planter for one placement.
    pub fn new(grid: &'a mut VoxelGrid, water: MaterialId, aquatic: bool) -> Self {
        Self {
            grid,
            water,
            aquatic,
            written: 0,
        }
    }

    /// Writes a cell if it is air (or water, for aquatic kinds).
    pub fn place(&mut self, x: i64, y: i64, z: i64, material: MaterialId) -> bool {
        let current = self.grid.get_signed(x, y, z);
        if !self.grid.contains(x, y, z) {
            return false;
        }
        let open = current == AIR || (self.aquatic && current == self.water);
        if open && self.grid.set_signed(x, y, z, material) {
            self.written += 1;
            true
        } else {
            false
        }
    }

    /// Cell at a coordinate.
    #[must_use]
    pub fn get(&self, x: i64, y: i64, z: i64) -> MaterialId {
        self.grid.get_signed(x, y, z)
    }

    /// Cells written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }
}

/// Grows one plant rooted at `(x, y, z)` (the first cell above the surface).
///
/// Returns the number of cells written.
pub fn grow(
    kind: VegetationKind,
    grid: &mut VoxelGrid,
    materials: &VegetationMaterials,
    rng: &mut ChaCha8Rng,
    x: i64,
    y: i64,
    z: i64,
) -> usize {
    let mut planter = Planter::new(grid, materials.water, kind.is_aquatic());
    match kind {
        VegetationKind::Tree => tree(&mut planter, materials, rng, x, y, z),
        VegetationKind::Palm => palm(&mut planter, materials, rng, x, y, z),
        VegetationKind::Cactus => cactus(&mut planter, materials, rng, x, y, z),
        VegetationKind::Rock => rock(&mut planter, materials, rng, x, y, z),
        VegetationKind::Bush => bush(&mut planter, materials, rng, x, y, z),
        VegetationKind::Flower => flower(&mut planter, materials, rng, x, y, z),
        VegetationKind::Mushroom => mushroom(&mut planter, materials, rng, x, y, z),
        VegetationKind::Reed => reed(&mut planter, materials, rng, x, y, z),
        VegetationKind::Coral => coral(&mut planter, materials, rng, x, y, z),
    }
    planter.written()
}

fn tree(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let trunk = rng.gen_range(4..=6);
    // Needs a clear trunk column.
    if (z..z + trunk).any(|tz| p.get(x, y, tz) != AIR) {
        return;
    }
    for tz in z..z + trunk {
        p.place(x, y, tz, m.wood);
    }
    let radius = 2i64;
    let cz = z + trunk - 1;
    for dz in -1..=2 {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy + dz * dz;
                let jitter = rng.gen_range(0..=1);
                if d2 <= radius * radius + jitter {
                    p.place(x + dx, y + dy, cz + dz, m.leaves);
                }
            }
        }
    }
}

fn palm(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let trunk = rng.gen_range(5..=8);
    let (lx, ly) = match rng.gen_range(0..4) {
        0 => (1, 0),
        1 => (-1, 0),
        2 => (0, 1),
        _ => (0, -1),
    };
    let mut top = (x, y, z);
    for i in 0..trunk {
        // Lean grows quadratically toward the crown.
        let t = i as f32 / trunk as f32;
        let offset = (t * t * 2.5) as i64;
        top = (x + lx * offset, y + ly * offset, z + i);
        p.place(top.0, top.1, top.2, m.wood);
    }
    let (tx, ty, tz) = top;
    p.place(tx, ty, tz + 1, m.palm_leaves);
    const FRONDS: [(i64, i64); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (-1, -1), (1, -1), (-1, 1)];
    for (dx, dy) in FRONDS {
        let length = rng.gen_range(2..=3);
        for step in 1..=length {
            // Fronds droop one cell at their tips.
            let droop = i64::from(step == length);
            p.place(tx + dx * step, ty + dy * step, tz + 1 - droop, m.palm_leaves);
        }
    }
}

fn cactus(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let stem = rng.gen_range(3..=5);
    for tz in z..z + stem {
        p.place(x, y, tz, m.cactus);
    }
    let arms = rng.gen_range(0..=2);
    if arms == 0 {
        return;
    }
    let arm_z = z + stem / 2;
    let rise = rng.gen_range(1..=2);
    let sides: &[i64] = if arms == 2 { &[1, -1] } else { &[1] };
    let along_x = rng.gen_bool(0.5);
    for &side in sides {
        let (ax, ay) = if along_x { (x + side, y) } else { (x, y + side) };
        p.place(ax, ay, arm_z, m.cactus);
        for r in 1..=rise {
            p.place(ax, ay, arm_z + r, m.cactus);
        }
    }
}

fn rock(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let mut radius: i64 = rng.gen_range(1..=2);
    let mut layer = 0;
    while radius >= 0 {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius + 1 {
                    p.place(x + dx, y + dy, z + layer, m.stone);
                }
            }
        }
        layer += 1;
        radius -= 1;
    }
}

fn bush(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    for dz in 0..=1 {
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let corner = dx != 0 && dy != 0;
                if corner && (dz == 1 || rng.gen_bool(0.5)) {
                    continue;
                }
                p.place(x + dx, y + dy, z + dz, m.leaves);
            }
        }
    }
}

fn flower(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    p.place(x, y, z, m.flower);
    for _ in 0..rng.gen_range(0..=2) {
        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        // Cluster blooms sit on solid ground only.
        if p.get(x + dx, y + dy, z - 1) != AIR {
            p.place(x + dx, y + dy, z, m.flower);
        }
    }
}

fn mushroom(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let stem = rng.gen_range(1..=2);
    for tz in z..z + stem {
        p.place(x, y, tz, m.mushroom);
    }
    let cap = z + stem;
    for dy in -1..=1 {
        for dx in -1..=1 {
            p.place(x + dx, y + dy, cap, m.mushroom);
        }
    }
}

fn reed(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let stalks = rng.gen_range(1..=3);
    for i in 0..stalks {
        let (sx, sy) = if i == 0 { (x, y) } else { (x + rng.gen_range(-1..=1), y + rng.gen_range(-1..=1)) };
        let tall = rng.gen_range(2..=3);
        for tz in z..z + tall {
            p.place(sx, sy, tz, m.reed);
        }
    }
}

fn coral(p: &mut Planter<'_>, m: &VegetationMaterials, rng: &mut ChaCha8Rng, x: i64, y: i64, z: i64) {
    let tall = rng.gen_range(2..=4);
    for tz in z..z + tall {
        // Coral stays below the water surface.
        if p.get(x, y, tz) != m.water {
            break;
        }
        p.place(x, y, tz, m.coral);
        if rng.gen_bool(0.35) {
            let (dx, dy) = if rng.gen_bool(0.5) { (rng.gen_range(0..=1) * 2 - 1, 0) } else { (0, rng.gen_range(0..=1) * 2 - 1) };
            if p.get(x + dx, y + dy, tz) == m.water {
                p.place(x + dx, y + dy, tz, m.coral);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ground(w: usize, d: usize, surface: usize) -> VoxelGrid {
        let mut grid = VoxelGrid::new(w, w, d);
        for y in 0..w {
            for x in 0..w {
                for z in 0..=surface {
                    grid.set(x, y, z, 1);
                }
            }
        }
        grid
    }

    #[test]
    fn test_generators_never_replace_solid() {
        let table = MaterialTable::default();
        let materials = VegetationMaterials::resolve(&table);
        let kinds = [
            VegetationKind::Tree,
            VegetationKind::Palm,
            VegetationKind::Cactus,
            VegetationKind::Rock,
            VegetationKind::Bush,
            VegetationKind::Flower,
            VegetationKind::Mushroom,
            VegetationKind::Reed,
        ];
        for (i, kind) in kinds.into_iter().enumerate() {
            let mut grid = ground(16, 20, 4);
            // A pillar of stone next to the root.
            for z in 5..12 {
                grid.set(9, 8, z, 1);
            }
            let before = grid.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(i as u64);
            let written = grow(kind, &mut grid, &materials, &mut rng, 8, 8, 5);
            assert!(written > 0, "{kind:?} wrote nothing");
            for (a, b) in before.data().iter().zip(grid.data()) {
                if *a != AIR {
                    assert_eq!(a, b, "{kind:?} overwrote a solid cell");
                }
            }
        }
    }

    #[test]
    fn test_coral_only_in_water() {
        let table = MaterialTable::default();
        let materials = VegetationMaterials::resolve(&table);
        let mut grid = ground(8, 12, 2);
        for y in 0..8 {
            for x in 0..8 {
                for z in 3..6 {
                    grid.set(x, y, z, materials.water());
                }
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let written = grow(VegetationKind::Coral, &mut grid, &materials, &mut rng, 4, 4, 3);
        assert!(written >= 1);
        for z in 6..12 {
            assert_eq!(grid.get(4, 4, z), AIR);
        }

        let mut dry = ground(8, 12, 2);
        let written = grow(VegetationKind::Coral, &mut dry, &materials, &mut rng, 4, 4, 3);
        assert_eq!(written, 0);
    }
}
