//! # Climate Maps
//!
//! Temperature and moisture, computed once per generation from the base
//! elevation field and reused for biome selection and diagnostics.
//!
//! - Temperature: latitude, radial or noise source, minus elevation cooling
//! - Moisture: domain-warped noise, boosted near water, attenuated in the
//!   rain shadow of upwind high ground (wind blows along +x)
//! - Region overrides: a region's `moisture` is blended over its rect,
//!   later regions on top

use std::collections::VecDeque;

use serde::Serialize;

use crate::layout::{BiomeRegion, ClimateSettings, TemperatureMode};
use crate::noise::{purpose, GradientNoise, WorldSeed};

/// Per-cell temperature and moisture in [0, 1].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClimateMaps {
    /// Cells along X.
    pub width: usize,
    /// Cells along Y.
    pub height: usize,
    /// Temperature, `idx = x + y*width`.
    pub temperature: Vec<f32>,
    /// Moisture, `idx = x + y*width`.
    pub moisture: Vec<f32>,
}

impl ClimateMaps {
    /// Temperature at a cell (0 when out of range).
    #[must_use]
    pub fn temperature_at(&self, x: usize, y: usize) -> f32 {
        self.sample(&self.temperature, x, y)
    }

    /// Moisture at a cell (0 when out of range).
    #[must_use]
    pub fn moisture_at(&self, x: usize, y: usize) -> f32 {
        self.sample(&self.moisture, x, y)
    }

    fn sample(&self, data: &[f32], x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            data[x + y * self.width]
        } else {
            0.0
        }
    }

    /// Mean temperature and moisture.
    #[must_use]
    pub fn means(&self) -> (f32, f32) {
        let n = self.temperature.len().max(1) as f32;
        (
            self.temperature.iter().sum::<f32>() / n,
            self.moisture.iter().sum::<f32>() / n,
        )
    }
}

/// Share of a region's moisture override in the blended value.
pub const REGION_MOISTURE_WEIGHT: f32 = 0.8;

/// Blends each region's moisture override into the moisture map over the
/// region's rect. Returns the number of cells touched.
pub fn apply_region_moisture(maps: &mut ClimateMaps, regions: &[BiomeRegion]) -> usize {
    let mut touched = 0;
    for region in regions {
        let Some(target) = region.moisture else {
            continue;
        };
        if !target.is_finite() {
            continue;
        }
        let target = target.clamp(0.0, 1.0);
        let [rx, ry, rw, rh] = region.rect.map(|v| v as usize);
        let xs = rx.min(maps.width)..rx.saturating_add(rw).min(maps.width);
        let ys = ry.min(maps.height)..ry.saturating_add(rh).min(maps.height);
        for y in ys {
            for x in xs.clone() {
                let m = &mut maps.moisture[x + y * maps.width];
                *m = (*m + (target - *m) * REGION_MOISTURE_WEIGHT).clamp(0.0, 1.0);
                touched += 1;
            }
        }
    }
    touched
}

/// Computes climate maps.
///
/// `elevation` is the base elevation field; `water` marks cells that count as
/// open water for the coastal boost.
#[must_use]
pub fn compute_climate(
    settings: &ClimateSettings,
    seed: WorldSeed,
    width: usize,
    height: usize,
    elevation: &[f32],
    water: &[bool],
) -> ClimateMaps {
    let temperature_noise = GradientNoise::new(seed.derive(purpose::TEMPERATURE));
    let moisture_noise = GradientNoise::new(seed.derive(purpose::MOISTURE));
    let scale = if settings.noise_scale > 0.0 { settings.noise_scale } else { 0.02 };

    let cells = width * height;
    let mut temperature = Vec::with_capacity(cells);
    let mut moisture = Vec::with_capacity(cells);
    let coast = distance_to_water(width, height, water);

    let cx = width as f32 * 0.5;
    let cy = height as f32 * 0.5;
    let max_radius = (cx * cx + cy * cy).sqrt().max(1.0);

    for y in 0..height {
        // Highest elevation seen upwind in this row.
        let mut upwind_max = 0.0f32;
        for x in 0..width {
            let idx = x + y * width;
            let elev = elevation.get(idx).copied().unwrap_or(0.0);
            let (fx, fy) = (x as f32 * scale, y as f32 * scale);

            let base = match settings.temperature_mode {
                TemperatureMode::Latitude => {
                    let lat = if height > 1 { y as f32 / (height - 1) as f32 } else { 0.5 };
                    1.0 - (lat * 2.0 - 1.0).abs()
                }
                TemperatureMode::Radial => {
                    let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                    1.0 - (dx * dx + dy * dy).sqrt() / max_radius
                }
                TemperatureMode::Noise => temperature_noise.fbm(fx, fy, 3, 0.5),
            };
            let jitter = (temperature_noise.fbm(fx + 31.7, fy + 11.3, 3, 0.5) - 0.5) * 0.2;
            let cooling = settings.elevation_cooling * (elev - 0.5).max(0.0);
            temperature.push((base + jitter + settings.temperature_bias - cooling).clamp(0.0, 1.0));

            let mut wet = moisture_noise.warped(fx, fy, 1.5, 3) + settings.moisture_bias;
            if let Some(&d) = coast.get(idx) {
                let range = settings.coastal_range.max(1.0);
                wet += settings.coastal_boost * (1.0 - d as f32 / range).max(0.0);
            }
            let excess = upwind_max - elev - 0.1;
            if excess > 0.0 {
                wet *= (1.0 - settings.rain_shadow * excess).clamp(0.2, 1.0);
            }
            moisture.push(wet.clamp(0.0, 1.0));

            // Shadows decay with distance from the barrier.
            upwind_max = (upwind_max * 0.97).max(elev);
        }
    }

    ClimateMaps {
        width,
        height,
        temperature,
        moisture,
    }
}

/// Multi-source BFS distance (in 4-connected steps) to the nearest water cell.
///
/// Cells unreachable from any water get `u32::MAX`.
fn distance_to_water(width: usize, height: usize, water: &[bool]) -> Vec<u32> {
    let cells = width * height;
    let mut distance = vec![u32::MAX; cells];
    let mut queue = VecDeque::new();
    for idx in 0..cells {
        if water.get(idx).copied().unwrap_or(false) {
            distance[idx] = 0;
            queue.push_back(idx);
        }
    }
    while let Some(idx) = queue.pop_front() {
        let (x, y) = (idx % width, idx / width);
        let next = distance[idx] + 1;
        let neighbours = [
            (x > 0).then(|| idx - 1),
            (x + 1 < width).then(|| idx + 1),
            (y > 0).then(|| idx - width),
            (y + 1 < height).then(|| idx + width),
        ];
        for n in neighbours.into_iter().flatten() {
            if distance[n] > next {
                distance[n] = next;
                queue.push_back(n);
            }
        }
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeKind;

    #[test]
    fn test_latitude_warm_equator() {
        let settings = ClimateSettings {
            elevation_cooling: 0.0,
            ..ClimateSettings::default()
        };
        let (w, h) = (8, 33);
        let elevation = vec![0.4; w * h];
        let water = vec![false; w * h];
        let maps = compute_climate(&settings, WorldSeed::new(1), w, h, &elevation, &water);
        assert!(maps.temperature_at(4, 16) > maps.temperature_at(4, 0));
        assert!(maps.temperature_at(4, 16) > maps.temperature_at(4, 32));
    }

    #[test]
    fn test_coastal_boost() {
        let settings = ClimateSettings::default();
        let (w, h) = (40, 4);
        let elevation = vec![0.4; w * h];
        let mut water = vec![false; w * h];
        for y in 0..h {
            water[y * w] = true;
        }
        let boosted = compute_climate(&settings, WorldSeed::new(5), w, h, &elevation, &water);
        let dry = compute_climate(&settings, WorldSeed::new(5), w, h, &elevation, &vec![false; w * h]);
        assert!(boosted.moisture_at(1, 1) >= dry.moisture_at(1, 1));
        assert_eq!(boosted.moisture_at(30, 1), dry.moisture_at(30, 1));
    }

    #[test]
    fn test_rain_shadow_dries_lee_side() {
        let settings = ClimateSettings {
            coastal_boost: 0.0,
            ..ClimateSettings::default()
        };
        let (w, h) = (32, 2);
        let flat = vec![0.3; w * h];
        let mut ridge = flat.clone();
        for y in 0..h {
            ridge[10 + y * w] = 1.0;
        }
        let water = vec![false; w * h];
        let open = compute_climate(&settings, WorldSeed::new(8), w, h, &flat, &water);
        let shadowed = compute_climate(&settings, WorldSeed::new(8), w, h, &ridge, &water);
        assert!(shadowed.moisture_at(12, 0) <= open.moisture_at(12, 0));
        assert_eq!(shadowed.moisture_at(5, 0), open.moisture_at(5, 0));
    }

    #[test]
    fn test_region_moisture_blends_inside_rect() {
        let (w, h) = (16, 16);
        let elevation = vec![0.4; w * h];
        let water = vec![false; w * h];
        let mut maps = compute_climate(&ClimateSettings::default(), WorldSeed::new(3), w, h, &elevation, &water);
        let before = maps.clone();
        let mut wet = BiomeRegion::new(BiomeKind::Swamp, [4, 4, 4, 4]);
        wet.moisture = Some(1.0);
        let mut edge = BiomeRegion::new(BiomeKind::Desert, [14, 14, 100, 100]);
        edge.moisture = Some(f32::NAN);
        let touched = apply_region_moisture(&mut maps, &[wet, edge, BiomeRegion::new(BiomeKind::Plains, [0, 0, 16, 16])]);
        assert_eq!(touched, 16);
        for (x, y) in [(4, 4), (7, 7), (5, 6)] {
            assert!(maps.moisture_at(x, y) >= before.moisture_at(x, y));
            assert!(maps.moisture_at(x, y) >= REGION_MOISTURE_WEIGHT);
        }
        assert_eq!(maps.moisture_at(8, 8), before.moisture_at(8, 8));
        assert_eq!(maps.moisture_at(15, 15), before.moisture_at(15, 15));
        println!("mean moisture {:.3} -> {:.3}", before.means().1, maps.means().1);
    }

    #[test]
    fn test_distance_to_water() {
        let water = [true, false, false, false];
        let distance = distance_to_water(4, 1, &water);
        assert_eq!(distance, vec![0, 1, 2, 3]);
        assert!(distance_to_water(2, 1, &[false, false]).iter().all(|&d| d == u32::MAX));
    }
}
