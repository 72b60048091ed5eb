//! Top-down terrain previews.

use voxelsmith_core::{MaterialTable, AIR};

use crate::terrain::TerrainBuild;

/// Renders a flat RGB top-down view, one pixel per column.
///
/// Each pixel takes the colour of the highest non-air cell in its column,
/// shaded by that cell's height. Rows run along Y, pixels within a row
/// along X.
#[must_use]
pub fn render_top_down_preview(terrain: &TerrainBuild, table: &MaterialTable) -> Vec<u8> {
    let grid = &terrain.grid;
    let (w, h, d) = (grid.width(), grid.height(), grid.depth());
    let mut rgb = Vec::with_capacity(w * h * 3);
    let top = d.saturating_sub(1).max(1) as f32;

    for y in 0..h {
        for x in 0..w {
            let hit = (0..d).rev().find_map(|z| {
                let id = grid.get(x, y, z);
                (id != AIR).then_some((z, id))
            });
            match hit {
                Some((z, id)) => {
                    let shade = 0.55 + 0.45 * (z as f32 / top);
                    for channel in table.color(id) {
                        rgb.push((f32::from(channel) * shade).round().min(255.0) as u8);
                    }
                }
                None => rgb.extend_from_slice(&[0, 0, 0]),
            }
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use voxelsmith_core::VoxelGrid;

    #[test]
    fn test_higher_columns_are_brighter() {
        let table = MaterialTable::default();
        let stone = table.resolve("stone");
        let mut grid = VoxelGrid::new(2, 1, 8);
        grid.set(0, 0, 1, stone);
        for z in 0..7 {
            grid.set(1, 0, z, stone);
        }
        let build = TerrainBuild {
            grid,
            surface_heights: vec![1, 6],
            water_cells: 0,
            vegetation: BTreeMap::new(),
        };
        let rgb = render_top_down_preview(&build, &table);
        assert_eq!(rgb.len(), 6);
        let low: u32 = rgb[0..3].iter().map(|&c| u32::from(c)).sum();
        let high: u32 = rgb[3..6].iter().map(|&c| u32::from(c)).sum();
        assert!(high > low);
    }
}
