//! # River Tracing
//!
//! Greedy steepest descent from high-elevation seeds.
//!
//! Each step moves to the unvisited 8-neighbour with the lowest
//! meander-biased height, among neighbours strictly lower than the current
//! cell. A walk stops below the stop elevation, when no such neighbour
//! exists, or at the step cap. Heights along a path are therefore strictly
//! decreasing.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::layout::RiverSettings;
use crate::noise::{purpose, GradientNoise, WorldSeed};

/// Traced rivers and their proximity mask.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RiverNetwork {
    /// One cell path per river, source first.
    pub paths: Vec<Vec<(usize, usize)>>,
    /// Proximity in [0, 1] (1 on a centerline), `idx = x + y*width`.
    pub mask: Vec<f32>,
}

impl RiverNetwork {
    /// Returns true if no river was traced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Vec::is_empty)
    }

    /// Total path cells.
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.paths.iter().map(Vec::len).sum()
    }
}

const NEIGHBOURS: [(i32, i32); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// Traces `settings.count` rivers over a heightfield.
#[must_use]
pub fn trace_rivers(
    settings: &RiverSettings,
    seed: WorldSeed,
    width: usize,
    height: usize,
    heights: &[f32],
) -> RiverNetwork {
    let cells = width * height;
    let mut network = RiverNetwork {
        paths: Vec::new(),
        mask: vec![0.0; cells],
    };
    if settings.count == 0 || cells == 0 || heights.len() != cells {
        return network;
    }

    let river_seed = seed.derive(purpose::RIVER);
    let meander = GradientNoise::new(river_seed);
    let mut rng = ChaCha8Rng::seed_from_u64(river_seed.value());

    let mut sources: Vec<usize> = (0..cells)
        .filter(|&i| heights[i] >= settings.source_min_elevation)
        .collect();
    if sources.is_empty() {
        // Fall back to the highest cell so a requested river always exists.
        let highest = (0..cells).max_by(|&a, &b| heights[a].total_cmp(&heights[b]));
        sources.extend(highest);
    }

    let mut visited = vec![false; cells];
    for river in 0..settings.count {
        if sources.is_empty() {
            break;
        }
        let pick = rng.gen_range(0..sources.len());
        let source = sources.swap_remove(pick);
        let path = descend(settings, &meander, river as f32 * 17.0, width, height, heights, source, &mut visited);
        tracing::debug!("river {} traced: {} cells from {:?}", river, path.len(), path.first());
        network.paths.push(path);
    }

    let radius = settings.width.max(0.5);
    for path in &network.paths {
        stamp_path(&mut network.mask, width, height, path, radius);
    }
    network
}

#[allow(clippy::too_many_arguments)]
fn descend(
    settings: &RiverSettings,
    meander: &GradientNoise,
    offset: f32,
    width: usize,
    height: usize,
    heights: &[f32],
    source: usize,
    visited: &mut [bool],
) -> Vec<(usize, usize)> {
    let mut path = Vec::new();
    let mut current = source;
    visited[current] = true;

    for _ in 0..settings.max_steps.max(1) {
        let (x, y) = (current % width, current / width);
        path.push((x, y));
        let here = heights[current];
        if here < settings.stop_elevation {
            break;
        }

        let mut best: Option<(usize, f32)> = None;
        for (dx, dy) in NEIGHBOURS {
            let nx = x as i64 + i64::from(dx);
            let ny = y as i64 + i64::from(dy);
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let n = nx as usize + ny as usize * width;
            if visited[n] || heights[n] >= here {
                continue;
            }
            let bias = (meander.sample(nx as f32 * 0.15 + offset, ny as f32 * 0.15) - 0.5) * settings.meander;
            let cost = heights[n] + bias;
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((n, cost));
            }
        }

        match best {
            Some((next, _)) => {
                visited[next] = true;
                current = next;
            }
            None => break,
        }
    }
    path
}

/// Stamps a linear-falloff disk around every path cell.
fn stamp_path(mask: &mut [f32], width: usize, height: usize, path: &[(usize, usize)], radius: f32) {
    let reach = radius.ceil() as i64 + 1;
    for &(px, py) in path {
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let x = px as i64 + dx;
                let y = py as i64 + dy;
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    continue;
                }
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                let p = (1.0 - d / (radius + 1.0)).clamp(0.0, 1.0);
                let idx = x as usize + y as usize * width;
                if p > mask[idx] {
                    mask[idx] = p;
                }
            }
        }
    }
}
