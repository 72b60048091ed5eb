//! # Biome Field Synthesis
//!
//! Turns a `ScenarioLayout` into per-cell biome weights and a heightmap.
//!
//! ## Pipeline
//!
//! 1. Base elevation (fBm + ridged) and climate maps, computed once, with
//!    region moisture overrides blended in
//! 2. Per-cell weights:
//!    - Height-threshold: one-hot, first region whose bracket holds the height
//!    - Voronoi: K nearest sites, noise-warped distance, smoothstep falloff
//! 3. Rivers traced on the blended heights, blended in as an extra slot
//! 4. Dominant slot per cell
//!
//! Weights always sum to 1 (±1e-6) per cell.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use voxelsmith_core::analysis::WATER_THRESHOLD;
use voxelsmith_core::HeightMap;

use crate::biome::BiomeKind;
use crate::climate::{apply_region_moisture, compute_climate, ClimateMaps};
use crate::layout::{BiomeRegion, BlendMode, ScenarioLayout};
use crate::noise::{purpose, smoothstep, GradientNoise, WorldSeed};
use crate::river::{trace_rivers, RiverNetwork};

/// One biome participating in a field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BiomeSlot {
    /// Biome kind.
    pub kind: BiomeKind,
    /// Display label.
    pub label: String,
    /// Surface material name.
    pub surface: String,
    /// Underground material name.
    pub underground: String,
    /// Base elevation.
    pub elevation: f32,
    /// Elevation variation.
    pub variation: f32,
    /// Normalized water level for water kinds.
    pub water_level: Option<f32>,
    /// Minimum water cells above the bed.
    pub min_water_depth: usize,
    /// Source region index, if any.
    pub region: Option<usize>,
}

impl BiomeSlot {
    /// A slot using only the kind's defaults.
    #[must_use]
    pub fn from_kind(kind: BiomeKind) -> Self {
        let d = kind.defaults();
        Self {
            kind,
            label: kind.name().to_string(),
            surface: d.surface.to_string(),
            underground: d.underground.to_string(),
            elevation: d.elevation,
            variation: d.variation,
            water_level: d.water_level,
            min_water_depth: d.min_water_depth,
            region: None,
        }
    }

    /// A slot for a region, applying its overrides.
    #[must_use]
    pub fn from_region(index: usize, region: &BiomeRegion) -> Self {
        let mut slot = Self::from_kind(region.kind);
        slot.label = region.display_label().to_string();
        if let Some(surface) = &region.surface_material {
            slot.surface.clone_from(surface);
        }
        if let Some(underground) = &region.underground_material {
            slot.underground.clone_from(underground);
        }
        slot.elevation = region.effective_elevation();
        slot.variation = region.effective_variation();
        slot.region = Some(index);
        slot
    }
}

/// A scattered Voronoi site.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BiomeSite {
    /// X in cells.
    pub x: f32,
    /// Y in cells.
    pub y: f32,
    /// Slot index.
    pub slot: usize,
}

/// Per-cell biome weights, heights and diagnostics.
#[derive(Clone, Debug, Serialize)]
pub struct BiomeField {
    /// Cells along X.
    pub width: usize,
    /// Cells along Y.
    pub height: usize,
    /// Mode the field was built with.
    pub mode: BlendMode,
    /// Participating biomes.
    pub slots: Vec<BiomeSlot>,
    /// `weights[cell * slots.len() + slot]`.
    pub weights: Vec<f32>,
    /// Dominant slot per cell.
    pub dominant: Vec<u16>,
    /// Final heights.
    #[serde(skip)]
    pub heightmap: HeightMap,
    /// Climate maps.
    pub climate: ClimateMaps,
    /// Traced rivers.
    pub rivers: RiverNetwork,
    /// Voronoi sites (empty in threshold mode).
    pub sites: Vec<BiomeSite>,
}

impl BiomeField {
    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Weight vector of a cell.
    #[must_use]
    pub fn weights_at(&self, x: usize, y: usize) -> &[f32] {
        let s = self.slots.len();
        let cell = x + y * self.width;
        &self.weights[cell * s..(cell + 1) * s]
    }

    /// Dominant slot index of a cell.
    #[inline]
    #[must_use]
    pub fn dominant_at(&self, x: usize, y: usize) -> usize {
        self.dominant[x + y * self.width] as usize
    }

    /// Dominant slot of a cell.
    #[must_use]
    pub fn dominant_slot(&self, x: usize, y: usize) -> &BiomeSlot {
        &self.slots[self.dominant_at(x, y)]
    }

    /// Fraction of cells each slot dominates.
    #[must_use]
    pub fn coverage(&self) -> Vec<f32> {
        let mut counts = vec![0usize; self.slots.len()];
        for &d in &self.dominant {
            counts[d as usize] += 1;
        }
        let total = self.dominant.len().max(1) as f32;
        counts.into_iter().map(|c| c as f32 / total).collect()
    }
}

/// Noise sources shared by the synthesis steps.
struct FieldNoise {
    height: GradientNoise,
    ridge: GradientNoise,
    detail: GradientNoise,
    boundary: GradientNoise,
    scale: f32,
}

impl FieldNoise {
    fn new(seed: WorldSeed, scale: f32) -> Self {
        Self {
            height: GradientNoise::new(seed.derive(purpose::HEIGHT)),
            ridge: GradientNoise::new(seed.derive(purpose::RIDGE)),
            detail: GradientNoise::new(seed.derive(purpose::DETAIL)),
            boundary: GradientNoise::new(seed.derive(purpose::BOUNDARY)),
            scale: if scale.is_finite() && scale > 0.0 { scale } else { 0.03 },
        }
    }

    /// Global base elevation.
    fn base(&self, x: f32, y: f32) -> f32 {
        let s = self.scale;
        let smooth = self.height.fbm(x * s, y * s, 5, 0.5);
        let ridges = self.ridge.ridged(x * s * 1.5, y * s * 1.5, 3);
        (smooth * 0.75 + ridges * 0.25).clamp(0.0, 1.0)
    }

    /// Height of one slot's surface at a cell.
    fn slot_height(&self, slot: &BiomeSlot, x: f32, y: f32) -> f32 {
        let s = self.scale * 2.0;
        let detail = if slot.kind.is_rugged() {
            self.ridge.ridged(x * s, y * s, 4)
        } else {
            self.detail.fbm(x * s, y * s, 4, 0.5)
        };
        (slot.elevation + slot.variation * (detail * 2.0 - 1.0)).clamp(0.0, 1.0)
    }
}

/// Synthesizes a biome field from a layout.
#[must_use]
pub fn synthesize_field(layout: &ScenarioLayout) -> BiomeField {
    let (w, h) = (layout.width.max(1), layout.height.max(1));
    let cells = w * h;
    let seed = WorldSeed::new(layout.seed);
    let noise = FieldNoise::new(seed, layout.terrain_scale);

    let mut base = Vec::with_capacity(cells);
    for y in 0..h {
        for x in 0..w {
            base.push(noise.base(x as f32, y as f32));
        }
    }

    let water: Vec<bool> = (0..cells)
        .map(|i| {
            let (x, y) = (i % w, i / w);
            match covering_region(&layout.regions, x, y) {
                Some(region) => region.kind.is_water(),
                None => base[i] < WATER_THRESHOLD,
            }
        })
        .collect();
    let mut climate = compute_climate(&layout.climate, seed, w, h, &base, &water);
    apply_region_moisture(&mut climate, &layout.regions);

    let mut slots: Vec<BiomeSlot> = layout
        .regions
        .iter()
        .enumerate()
        .map(|(i, r)| BiomeSlot::from_region(i, r))
        .collect();

    let (mut weights, mut heights, sites) = match layout.mode {
        BlendMode::HeightThreshold => {
            let (weights, heights) = threshold_weights(layout, &base, &mut slots);
            (weights, heights, Vec::new())
        }
        BlendMode::Voronoi => voronoi_weights(layout, seed, &noise, &base, &climate, &mut slots),
    };

    let rivers = trace_rivers(&layout.rivers, seed, w, h, &heights);
    if !rivers.is_empty() {
        let before = slots.len();
        slots.push(BiomeSlot::from_kind(BiomeKind::River));
        weights = blend_river_slot(&weights, before, &rivers.mask);
        let carve = layout.rivers.carve_depth.max(0.0);
        for (height, &p) in heights.iter_mut().zip(&rivers.mask) {
            *height = (*height - carve * p).clamp(0.0, 1.0);
        }
        tracing::info!("{} river(s) blended, {} cells", rivers.paths.len(), rivers.total_length());
    }

    let s = slots.len();
    let dominant = (0..cells)
        .map(|cell| argmax(&weights[cell * s..(cell + 1) * s]) as u16)
        .collect();

    let mut heightmap = HeightMap::filled(w, h, 0.0);
    for (i, &value) in heights.iter().enumerate() {
        heightmap.set(i % w, i / w, value);
    }

    BiomeField {
        width: w,
        height: h,
        mode: layout.mode,
        slots,
        weights,
        dominant,
        heightmap,
        climate,
        rivers,
        sites,
    }
}

/// Last region (scan order) containing the cell.
fn covering_region(regions: &[BiomeRegion], x: usize, y: usize) -> Option<&BiomeRegion> {
    regions.iter().rev().find(|r| r.contains(x, y))
}

/// Brackets per region: explicit ranges kept, the rest split evenly by
/// ascending elevation. The topmost bracket is open-ended.
fn height_brackets(regions: &[BiomeRegion]) -> Vec<[f32; 2]> {
    let mut brackets: Vec<[f32; 2]> = regions
        .iter()
        .map(|r| r.height_range.unwrap_or([f32::NAN, f32::NAN]))
        .collect();

    let mut unranged: Vec<usize> = (0..regions.len())
        .filter(|&i| regions[i].height_range.is_none())
        .collect();
    unranged.sort_by(|&a, &b| {
        regions[a]
            .effective_elevation()
            .total_cmp(&regions[b].effective_elevation())
    });

    let n = unranged.len() as f32;
    for (rank, &i) in unranged.iter().enumerate() {
        let lo = rank as f32 / n;
        let hi = if rank + 1 == unranged.len() { f32::INFINITY } else { (rank + 1) as f32 / n };
        brackets[i] = [lo, hi];
    }
    brackets
}

fn threshold_weights(
    layout: &ScenarioLayout,
    base: &[f32],
    slots: &mut Vec<BiomeSlot>,
) -> (Vec<f32>, Vec<f32>) {
    let w = layout.width.max(1);
    let regions: Vec<BiomeRegion> = if layout.regions.is_empty() {
        slots.push(BiomeSlot::from_kind(BiomeKind::Plains));
        vec![BiomeRegion::new(BiomeKind::Plains, layout.full_rect())]
    } else {
        layout.regions.clone()
    };
    let brackets = height_brackets(&regions);
    let s = slots.len();

    let mut weights = vec![0.0; base.len() * s];
    let mut heights = Vec::with_capacity(base.len());
    for (cell, &h0) in base.iter().enumerate() {
        let (x, y) = (cell % w, cell / w);
        let mut h = h0;
        if let Some(region) = covering_region(&regions, x, y) {
            if let Some(elevation) = region.elevation {
                let biased = elevation + region.effective_variation() * (h0 * 2.0 - 1.0);
                h = (h0 * 0.5 + biased * 0.5).clamp(0.0, 1.0);
            }
        }

        let chosen = brackets
            .iter()
            .position(|&[lo, hi]| h >= lo && h < hi)
            .unwrap_or(regions.len() - 1);
        weights[cell * s + chosen] = 1.0;
        heights.push(h);
    }
    (weights, heights)
}

fn voronoi_weights(
    layout: &ScenarioLayout,
    seed: WorldSeed,
    noise: &FieldNoise,
    base: &[f32],
    climate: &ClimateMaps,
    slots: &mut Vec<BiomeSlot>,
) -> (Vec<f32>, Vec<f32>, Vec<BiomeSite>) {
    let (w, h) = (layout.width.max(1), layout.height.max(1));
    let settings = &layout.voronoi;
    let mut rng = ChaCha8Rng::seed_from_u64(seed.derive(purpose::SITES).value());

    let derived = ((w * h) as f32 / 400.0).round() as usize;
    let count = settings
        .site_count
        .unwrap_or(derived)
        .clamp(1, 128)
        .max(layout.regions.len().min(128));
    let spacing = settings
        .min_spacing
        .unwrap_or_else(|| 0.5 * ((w * h) as f32 / count as f32).sqrt())
        .max(0.0);

    // One site at each region center first so small regions are represented.
    let mut points: Vec<(f32, f32)> = layout
        .regions
        .iter()
        .take(count)
        .map(|r| {
            let [rx, ry, rw, rh] = r.rect.map(|v| v as f32);
            ((rx + rw * 0.5).min(w as f32 - 0.5), (ry + rh * 0.5).min(h as f32 - 0.5))
        })
        .collect();
    while points.len() < count {
        let mut candidate = (0.0, 0.0);
        for _ in 0..30 {
            candidate = (rng.gen::<f32>() * w as f32, rng.gen::<f32>() * h as f32);
            let clear = points.iter().all(|&(px, py)| {
                let (dx, dy) = (px - candidate.0, py - candidate.1);
                dx * dx + dy * dy >= spacing * spacing
            });
            if clear {
                break;
            }
        }
        points.push(candidate);
    }

    let mut free_slots: Vec<Option<usize>> = vec![None; BiomeKind::ALL.len()];
    let mut sites = Vec::with_capacity(points.len());
    for &(px, py) in &points {
        let (cx, cy) = ((px as usize).min(w - 1), (py as usize).min(h - 1));
        let slot = if let Some(index) = layout.regions.iter().rposition(|r| r.contains(cx, cy)) {
            index
        } else {
            pick_free_slot(layout, &mut rng, climate, base[cx + cy * w], cx, cy, slots, &mut free_slots)
        };
        sites.push(BiomeSite { x: px, y: py, slot });
    }

    let s = slots.len();
    let k = settings.k_nearest.clamp(1, sites.len());
    let radius = settings.blend_radius.max(0.5);
    let warp = settings.boundary_noise.max(0.0) * radius;
    let bscale = 0.08;

    let mut weights = vec![0.0f32; w * h * s];
    let mut heights = Vec::with_capacity(w * h);
    let mut nearest: Vec<(f32, usize)> = Vec::with_capacity(sites.len());

    for y in 0..h {
        for x in 0..w {
            let cell = x + y * w;
            let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
            let wx = fx + warp * (noise.boundary.fbm(fx * bscale, fy * bscale, 3, 0.5) * 2.0 - 1.0);
            let wy = fy + warp * (noise.boundary.fbm(fx * bscale + 19.3, fy * bscale + 7.1, 3, 0.5) * 2.0 - 1.0);

            nearest.clear();
            nearest.extend(sites.iter().enumerate().map(|(i, site)| {
                let (dx, dy) = (site.x - wx, site.y - wy);
                ((dx * dx + dy * dy).sqrt(), i)
            }));
            nearest.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0));
            let top = &mut nearest[..k];
            top.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            let dmin = top[0].0;

            let row = &mut weights[cell * s..(cell + 1) * s];
            let mut sum = 0.0;
            for &(d, i) in top.iter() {
                let t = (1.0 - (d - dmin) / radius).clamp(0.0, 1.0);
                let weight = smoothstep(t);
                row[sites[i].slot] += weight;
                sum += weight;
            }
            // The nearest site always contributes 1, so `sum >= 1`.
            for v in row.iter_mut() {
                *v /= sum;
            }

            let mut blended = 0.0;
            for (slot, &weight) in slots.iter().zip(row.iter()) {
                if weight > 0.0 {
                    blended += weight * noise.slot_height(slot, x as f32, y as f32);
                }
            }
            heights.push(blended.clamp(0.0, 1.0));
        }
    }

    tracing::debug!("voronoi: {} sites, {} slots, k={}", sites.len(), s, k);
    (weights, heights, sites)
}

/// Chooses a biome for a site outside every region.
#[allow(clippy::too_many_arguments)]
fn pick_free_slot(
    layout: &ScenarioLayout,
    rng: &mut ChaCha8Rng,
    climate: &ClimateMaps,
    elevation: f32,
    x: usize,
    y: usize,
    slots: &mut Vec<BiomeSlot>,
    free_slots: &mut [Option<usize>],
) -> usize {
    // Candidates: the layout's regions, or every non-river kind.
    let candidates: Vec<Candidate> = if layout.regions.is_empty() {
        BiomeKind::ALL
            .iter()
            .filter(|&&k| k != BiomeKind::River)
            .map(|&k| Candidate::Kind(k))
            .collect()
    } else {
        (0..layout.regions.len()).map(Candidate::Region).collect()
    };

    let kind_of = |c: &Candidate| match *c {
        Candidate::Kind(k) => k,
        Candidate::Region(i) => layout.regions[i].kind,
    };

    let chosen = if layout.voronoi.climate_selection {
        let t = climate.temperature_at(x, y);
        let m = climate.moisture_at(x, y);
        let mut ranked: Vec<(f32, Candidate)> = candidates
            .iter()
            .map(|c| (kind_of(c).climate_fitness(t, m, elevation), *c))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.truncate(3);
        let total: f32 = ranked.iter().map(|r| r.0).sum();
        if total > f32::EPSILON {
            let mut roll = rng.gen::<f32>() * total;
            let mut pick = ranked[ranked.len() - 1].1;
            for &(fitness, candidate) in &ranked {
                if roll < fitness {
                    pick = candidate;
                    break;
                }
                roll -= fitness;
            }
            pick
        } else {
            ranked[rng.gen_range(0..ranked.len())].1
        }
    } else {
        candidates[rng.gen_range(0..candidates.len())]
    };

    match chosen {
        Candidate::Region(i) => i,
        Candidate::Kind(kind) => {
            let key = BiomeKind::ALL.iter().position(|&k| k == kind).unwrap_or(0);
            *free_slots[key].get_or_insert_with(|| {
                slots.push(BiomeSlot::from_kind(kind));
                slots.len() - 1
            })
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Candidate {
    Kind(BiomeKind),
    Region(usize),
}

/// Adds a river slot: `(1 - p) * w + p * onehot(river)`.
fn blend_river_slot(weights: &[f32], slot_count: usize, mask: &[f32]) -> Vec<f32> {
    let s = slot_count + 1;
    let mut out = vec![0.0; mask.len() * s];
    for (cell, &p) in mask.iter().enumerate() {
        let src = &weights[cell * slot_count..(cell + 1) * slot_count];
        let dst = &mut out[cell * s..(cell + 1) * s];
        for (d, &v) in dst.iter_mut().zip(src) {
            *d = (1.0 - p) * v;
        }
        dst[slot_count] = p;
    }
    out
}

/// Index of the first maximum.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(field: &BiomeField) {
        for y in 0..field.height {
            for x in 0..field.width {
                let sum: f32 = field.weights_at(x, y).iter().sum();
                assert!((sum - 1.0).abs() < 1e-5, "weights at ({x},{y}) sum to {sum}");
            }
        }
    }

    #[test]
    fn test_threshold_brackets_split_by_elevation() {
        let regions = vec![
            BiomeRegion::new(BiomeKind::Mountains, [0, 0, 1, 1]),
            BiomeRegion::new(BiomeKind::Ocean, [0, 0, 1, 1]),
            BiomeRegion::new(BiomeKind::Plains, [0, 0, 1, 1]).with_height_range(0.2, 0.4),
        ];
        let brackets = height_brackets(&regions);
        assert_eq!(brackets[1], [0.0, 0.5]);
        assert_eq!(brackets[0][0], 0.5);
        assert!(brackets[0][1].is_infinite());
        assert_eq!(brackets[2], [0.2, 0.4]);
    }

    #[test]
    fn test_threshold_mode_one_hot() {
        let layout = ScenarioLayout::new(24, 24, 16)
            .with_mode(BlendMode::HeightThreshold)
            .with_region(BiomeRegion::new(BiomeKind::Lake, [0, 0, 24, 24]))
            .with_region(BiomeRegion::new(BiomeKind::Mountains, [0, 0, 24, 24]));
        let field = synthesize_field(&layout);
        assert_normalized(&field);
        assert!(field.weights.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_voronoi_without_regions() {
        let mut layout = ScenarioLayout::new(40, 30, 16).with_seed(4);
        layout.voronoi.site_count = Some(6);
        let field = synthesize_field(&layout);
        assert_eq!(field.sites.len(), 6);
        assert!(!field.slots.is_empty());
        assert_normalized(&field);
    }

    #[test]
    fn test_region_sites_take_region_slot() {
        let mut layout = ScenarioLayout::new(32, 32, 16)
            .with_region(BiomeRegion::new(BiomeKind::Desert, [0, 0, 32, 32]))
            .with_region(BiomeRegion::new(BiomeKind::Lake, [12, 12, 8, 8]));
        layout.voronoi.boundary_noise = 0.0;
        let field = synthesize_field(&layout);
        assert_eq!(field.sites[1].slot, 1);
        assert_eq!(field.dominant_slot(16, 16).kind, BiomeKind::Lake);
        assert!(field.sites.iter().all(|s| s.slot < 2));
    }

    fn uniform_climate(temperature: f32, moisture: f32) -> ClimateMaps {
        ClimateMaps {
            width: 4,
            height: 4,
            temperature: vec![temperature; 16],
            moisture: vec![moisture; 16],
        }
    }

    fn draw_kinds(layout: &ScenarioLayout, climate: &ClimateMaps, elevation: f32, draws: usize) -> Vec<BiomeKind> {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut slots = Vec::new();
        let mut free_slots = vec![None::<usize>; BiomeKind::ALL.len()];
        (0..draws)
            .map(|_| {
                let slot = pick_free_slot(layout, &mut rng, climate, elevation, 1, 1, &mut slots, &mut free_slots);
                slots[slot].kind
            })
            .collect()
    }

    #[test]
    fn test_climate_selection_favors_fitting_biomes() {
        let climate = uniform_climate(0.9, 0.1);
        let elevation = 0.45;
        let mut layout = ScenarioLayout::new(4, 4, 4);
        let mut stats = Vec::new();
        for selection in [true, false] {
            layout.voronoi.climate_selection = selection;
            let kinds = draw_kinds(&layout, &climate, elevation, 400);
            let mean_fitness =
                kinds.iter().map(|k| k.climate_fitness(0.9, 0.1, elevation)).sum::<f32>() / kinds.len() as f32;
            let deserts = kinds.iter().filter(|&&k| k == BiomeKind::Desert).count();
            assert!(kinds.iter().all(|&k| k != BiomeKind::River));
            println!("climate_selection={selection}: mean fitness {mean_fitness:.3}, deserts {deserts}");
            stats.push((mean_fitness, deserts));
        }
        let (fit_on, deserts_on) = stats[0];
        let (fit_off, deserts_off) = stats[1];
        assert!(fit_on > fit_off + 0.2);
        assert!(deserts_on > 2 * deserts_off);
    }

    #[test]
    fn test_climate_selection_falls_back_when_nothing_fits() {
        // Temperature far outside every window scores zero for all kinds.
        let climate = uniform_climate(5.0, 0.5);
        let layout = ScenarioLayout::new(4, 4, 4);
        assert!(layout.voronoi.climate_selection);
        let kinds = draw_kinds(&layout, &climate, 0.45, 300);
        let first_three: Vec<BiomeKind> =
            BiomeKind::ALL.iter().copied().filter(|&k| k != BiomeKind::River).take(3).collect();
        assert!(kinds.iter().all(|k| first_three.contains(k)));
        for kind in &first_three {
            assert!(kinds.contains(kind), "{kind} never drawn");
        }
    }

    #[test]
    fn test_river_slot_keeps_sum() {
        let mut layout = ScenarioLayout::new(48, 48, 24)
            .with_seed(21)
            .with_region(BiomeRegion::new(BiomeKind::Mountains, [0, 0, 48, 48]));
        layout.rivers.count = 1;
        layout.rivers.source_min_elevation = 0.0;
        let field = synthesize_field(&layout);
        assert_eq!(field.slots.last().map(|s| s.kind), Some(BiomeKind::River));
        assert_normalized(&field);
        let (x, y) = field.rivers.paths[0][0];
        assert_eq!(field.dominant_slot(x, y).kind, BiomeKind::River);
    }
}
