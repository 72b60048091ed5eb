//! # Gradient & Cellular Noise
//!
//! Deterministic 2D noise for heightmaps, climate and textures.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, every function here produces **exactly** the
//! same values on any platform, any time. Only construction allocates; every
//! sample is pure.
//!
//! ## Output Ranges
//!
//! All public samplers return values in [0, 1]. Out-of-domain parameters
//! (zero octaves, persistence ≥ 1, non-finite inputs) are clamped, never
//! propagated as NaN/Infinity.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Low 32 bits, used to drive the permutation shuffle.
    #[inline]
    #[must_use]
    pub const fn low32(self) -> u32 {
        self.0 as u32
    }

    /// Derives a sub-seed for a specific purpose (e.g., vegetation).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x5EED_0F_C0FFEE)
    }
}

/// Sub-seed purposes. Keep stable: changing one changes every world.
pub mod purpose {
    /// Base terrain height.
    pub const HEIGHT: u64 = 1;
    /// Ridge layer.
    pub const RIDGE: u64 = 2;
    /// Temperature noise.
    pub const TEMPERATURE: u64 = 3;
    /// Moisture noise.
    pub const MOISTURE: u64 = 4;
    /// Voronoi site scattering.
    pub const SITES: u64 = 5;
    /// Boundary perturbation.
    pub const BOUNDARY: u64 = 6;
    /// River seeds and meander.
    pub const RIVER: u64 = 7;
    /// Vegetation placement.
    pub const VEGETATION: u64 = 8;
    /// Per-biome detail.
    pub const DETAIL: u64 = 9;
    /// Texture synthesis.
    pub const TEXTURE: u64 = 10;
}

/// Advances the 32-bit LCG stream (Numerical Recipes constants).
#[inline]
const fn lcg_next(state: u32) -> u32 {
    state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// 8 unit-ish gradient directions.
    const GRADIENTS: [[f32; 2]; 8] = [
        [1.0, 0.0],
        [-1.0, 0.0],
        [0.0, 1.0],
        [0.0, -1.0],
        [0.707_106_77, 0.707_106_77],
        [-0.707_106_77, 0.707_106_77],
        [0.707_106_77, -0.707_106_77],
        [-0.707_106_77, -0.707_106_77],
    ];

    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle driven by a 32-bit LCG
        let mut state = seed.low32();
        for i in (1..256).rev() {
            state = lcg_next(state);
            let j = (state as usize) % (i + 1);
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        self.perm[index & 511] as usize
    }

    /// Corner hash for an integer lattice point.
    #[inline]
    fn hash(&self, ix: i32, iy: i32) -> usize {
        self.get(self.get((ix & 255) as usize) + (iy & 255) as usize)
    }

    /// Dot product of a corner gradient with the offset vector.
    #[inline]
    fn gradient_dot(&self, ix: i32, iy: i32, dx: f32, dy: f32) -> f32 {
        let g = Self::GRADIENTS[self.hash(ix, iy) & 7];
        g[0] * dx + g[1] * dy
    }
}

/// 2D gradient noise generator.
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
///
/// # Example
///
/// ```rust
/// use voxelsmith_procedural::noise::{GradientNoise, WorldSeed};
///
/// let noise = GradientNoise::new(WorldSeed::new(42));
/// let value = noise.fbm(10.5, 3.25, 4, 0.5);
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Clone)]
pub struct GradientNoise {
    perm_table: PermutationTable,
    seed: WorldSeed,
}

impl GradientNoise {
    /// Largest magnitude a single signed sample can reach (|g|·|d| ≤ √2/2).
    const SIGNED_RANGE: f32 = 0.7072;

    /// Creates a new noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
            seed,
        }
    }

    /// The seed this generator was built from.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Signed gradient noise, roughly [-0.7072, 0.7072].
    fn sample_signed(&self, x: f32, y: f32) -> f32 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let ix = x0 as i32;
        let iy = y0 as i32;
        let fx = x - x0;
        let fy = y - y0;

        let n00 = self.perm_table.gradient_dot(ix, iy, fx, fy);
        let n10 = self.perm_table.gradient_dot(ix.wrapping_add(1), iy, fx - 1.0, fy);
        let n01 = self.perm_table.gradient_dot(ix, iy.wrapping_add(1), fx, fy - 1.0);
        let n11 = self.perm_table.gradient_dot(ix.wrapping_add(1), iy.wrapping_add(1), fx - 1.0, fy - 1.0);

        let u = smoothstep(fx);
        let v = smoothstep(fy);
        lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
    }

    /// Samples gradient noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [0, 1].
    #[must_use]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        ((self.sample_signed(x, y) / Self::SIGNED_RANGE + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Fractal Brownian motion.
    ///
    /// Sums `persistence^i * sample(x * 2^i, y * 2^i)` and divides by the
    /// total amplitude.
    ///
    /// # Arguments
    ///
    /// * `octaves` - Noise layers; 0 is treated as 1
    /// * `persistence` - Amplitude decay, clamped to [0, 0.95]; NaN becomes 0.5
    #[must_use]
    pub fn fbm(&self, x: f32, y: f32, octaves: u32, persistence: f32) -> f32 {
        let octaves = clamp_octaves(octaves);
        let persistence = clamp_persistence(persistence);

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        (total / max_amplitude).clamp(0.0, 1.0)
    }

    /// Ridged multifractal (good for mountains).
    ///
    /// Each octave contributes `(1 - |signed|)^2` with halving amplitude.
    #[must_use]
    pub fn ridged(&self, x: f32, y: f32, octaves: u32) -> f32 {
        let octaves = clamp_octaves(octaves);

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            // Ridge formula: 1 - |noise|
            let signed = self.sample(x * frequency, y * frequency) * 2.0 - 1.0;
            let ridge = 1.0 - signed.abs();
            total += ridge * ridge * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        (total / max_amplitude).clamp(0.0, 1.0)
    }

    /// Domain-warped fBm.
    ///
    /// The sampling coordinate is displaced by two offset fBm fields scaled
    /// by `strength`, then resampled.
    #[must_use]
    pub fn warped(&self, x: f32, y: f32, strength: f32, octaves: u32) -> f32 {
        let strength = if strength.is_finite() { strength } else { 0.0 };
        let qx = self.fbm(x + 5.2, y + 1.3, octaves, 0.5) * 2.0 - 1.0;
        let qy = self.fbm(x + 1.7, y + 9.2, octaves, 0.5) * 2.0 - 1.0;
        self.fbm(x + strength * qx, y + strength * qy, octaves, 0.5)
    }

    /// Worley F1: distance to the nearest jittered feature point.
    ///
    /// One feature point per cell of side `cell_size`. Distance is measured
    /// in cell units and clamped to [0, 1].
    #[must_use]
    pub fn cellular(&self, x: f32, y: f32, cell_size: f32) -> f32 {
        let cell_size = if cell_size.is_finite() && cell_size > f32::EPSILON { cell_size } else { 1.0 };
        let px = x / cell_size;
        let py = y / cell_size;
        if !px.is_finite() || !py.is_finite() {
            return 1.0;
        }
        let cx = px.floor() as i32;
        let cy = py.floor() as i32;

        let mut best = f32::MAX;
        for oy in -1..=1 {
            for ox in -1..=1 {
                let gx = cx.wrapping_add(ox);
                let gy = cy.wrapping_add(oy);
                let h = self.perm_table.hash(gx, gy);
                let jx = self.perm_table.get(h + 17) as f32 / 255.0;
                let jy = self.perm_table.get(h + 91) as f32 / 255.0;
                let dx = gx as f32 + jx - px;
                let dy = gy as f32 + jy - py;
                best = best.min(dx * dx + dy * dy);
            }
        }
        best.sqrt().clamp(0.0, 1.0)
    }

    /// Deterministic hash of a lattice cell mapped to [0, 1).
    ///
    /// Useful for per-cell jitter without an RNG.
    #[must_use]
    pub fn hash01(&self, x: i32, y: i32) -> f32 {
        self.perm_table.hash(x, y) as f32 / 256.0
    }
}

/// Cubic Hermite smoothstep on [0, 1].
#[inline]
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn clamp_octaves(octaves: u32) -> u32 {
    octaves.clamp(1, 16)
}

#[inline]
fn clamp_persistence(persistence: f32) -> f32 {
    if persistence.is_nan() {
        0.5
    } else {
        persistence.clamp(0.0, 0.95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let noise1 = GradientNoise::new(seed);
        let noise2 = GradientNoise::new(seed);

        for i in 0..100 {
            let x = i as f32 * 0.1;
            let y = i as f32 * 0.17;
            assert_eq!(noise1.sample(x, y).to_bits(), noise2.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = GradientNoise::new(WorldSeed::new(1));
        let noise2 = GradientNoise::new(WorldSeed::new(2));

        let differs = (0..32).any(|i| {
            let x = i as f32 * 0.37 + 0.13;
            noise1.sample(x, x * 0.5) != noise2.sample(x, x * 0.5)
        });
        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        let noise = GradientNoise::new(WorldSeed::new(42));

        for i in 0..10000 {
            let x = (i as f32 * 0.1) - 500.0;
            let y = (i as f32 * 0.13) - 650.0;
            for value in [
                noise.sample(x, y),
                noise.fbm(x, y, 5, 0.5),
                noise.ridged(x, y, 4),
                noise.cellular(x, y, 8.0),
            ] {
                assert!((0.0..=1.0).contains(&value), "Value {value} out of range at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_continuity() {
        let noise = GradientNoise::new(WorldSeed::new(42));
        let v1 = noise.sample(10.3, 10.3);
        let v2 = noise.sample(10.301, 10.3);
        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_degenerate_parameters() {
        let noise = GradientNoise::new(WorldSeed::new(7));
        assert_eq!(noise.fbm(1.5, 2.5, 0, 0.5), noise.fbm(1.5, 2.5, 1, 0.5));
        for p in [1.0, 4.0, f32::NAN, f32::INFINITY, -3.0] {
            let value = noise.fbm(1.5, 2.5, 6, p);
            assert!(value.is_finite() && (0.0..=1.0).contains(&value));
        }
        assert!(noise.sample(f32::NAN, 1.0).is_finite());
        assert!(noise.warped(3.0, 4.0, f32::INFINITY, 3).is_finite());
        assert!(noise.cellular(3.0, 4.0, 0.0).is_finite());
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        assert_ne!(base.derive(1), base.derive(2));
        assert_eq!(base.derive(1), base.derive(1));
        assert_ne!(base.derive(1), base);
    }

    #[test]
    fn test_cellular_zero_near_feature() {
        let noise = GradientNoise::new(WorldSeed::new(3));
        // Feature points are never farther than sqrt(2) cells, so the field
        // must dip well below 1 somewhere in a 4x4 cell window.
        let mut min = 1.0f32;
        for y in 0..64 {
            for x in 0..64 {
                min = min.min(noise.cellular(x as f32 * 0.5, y as f32 * 0.5, 8.0));
            }
        }
        assert!(min < 0.2, "min distance {min}");
    }
}
