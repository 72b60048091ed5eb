//! # Dense Grids
//!
//! Two storage types, both flat and row-major:
//!
//! - `VoxelGrid`: `u16` material ids, `idx = x + y*width + z*width*height`
//! - `HeightMap`: `f32` elevations in [0, 1], `idx = x + y*width`
//!
//! ## Ownership
//!
//! A grid is owned by whichever builder produced it. Analyzers borrow it
//! immutably.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::material::{MaterialId, AIR};

/// Grid dimensions in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    /// Cells along X.
    pub width: usize,
    /// Cells along Y.
    pub height: usize,
    /// Cells along Z.
    pub depth: usize,
}

impl GridDims {
    /// Creates new dimensions.
    #[inline]
    #[must_use]
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self { width, height, depth }
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub const fn volume(self) -> usize {
        self.width * self.height * self.depth
    }

    /// Total number of cells for safety checks on requests; saturates at
    /// `u64::MAX` instead of overflowing.
    #[inline]
    #[must_use]
    pub fn volume_u64(self) -> u64 {
        (self.width as u64)
            .saturating_mul(self.height as u64)
            .saturating_mul(self.depth as u64)
    }

    /// Returns true if any axis is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }
}

impl std::fmt::Display for GridDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// A dense 3D grid of material ids.
///
/// `0` is reserved for air.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    dims: GridDims,
    data: Vec<MaterialId>,
}

impl VoxelGrid {
    /// Creates an all-air grid.
    #[must_use]
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self::with_dims(GridDims::new(width, height, depth))
    }

    /// Creates an all-air grid from dimensions.
    #[must_use]
    pub fn with_dims(dims: GridDims) -> Self {
        Self {
            dims,
            data: vec![AIR; dims.volume()],
        }
    }

    /// Wraps raw data, validating its length.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `data.len()` differs from the
    /// dimension product. Data is never truncated or padded.
    pub fn from_raw(dims: GridDims, data: Vec<MaterialId>) -> CoreResult<Self> {
        if data.len() != dims.volume() {
            return Err(CoreError::DimensionMismatch {
                dims: dims.to_string(),
                expected: dims.volume(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Grid dimensions.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Cells along X.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.dims.width
    }

    /// Cells along Y.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.dims.height
    }

    /// Cells along Z.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.dims.depth
    }

    /// Flat index of a cell. Caller guarantees the coordinate is in range.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dims.width + z * self.dims.width * self.dims.height
    }

    /// Returns true if the signed coordinate lies inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.dims.width
            && (y as usize) < self.dims.height
            && (z as usize) < self.dims.depth
    }

    /// Gets a cell, returning air when out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> MaterialId {
        if x < self.dims.width && y < self.dims.height && z < self.dims.depth {
            self.data[self.index(x, y, z)]
        } else {
            AIR
        }
    }

    /// Gets a cell by signed coordinate, returning air when out of range.
    #[inline]
    #[must_use]
    pub fn get_signed(&self, x: i64, y: i64, z: i64) -> MaterialId {
        if self.contains(x, y, z) {
            self.get(x as usize, y as usize, z as usize)
        } else {
            AIR
        }
    }

    /// Sets a cell. Out-of-range writes are dropped.
    ///
    /// Returns true if the write landed.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, material: MaterialId) -> bool {
        if x < self.dims.width && y < self.dims.height && z < self.dims.depth {
            let idx = self.index(x, y, z);
            self.data[idx] = material;
            true
        } else {
            false
        }
    }

    /// Sets a cell by signed coordinate. Out-of-range writes are dropped.
    #[inline]
    pub fn set_signed(&mut self, x: i64, y: i64, z: i64, material: MaterialId) -> bool {
        if self.contains(x, y, z) {
            self.set(x as usize, y as usize, z as usize, material)
        } else {
            false
        }
    }

    /// Raw cell data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[MaterialId] {
        &self.data
    }

    /// Consumes the grid, returning dimensions and raw data.
    #[must_use]
    pub fn into_raw(self) -> (GridDims, Vec<MaterialId>) {
        (self.dims, self.data)
    }

    /// Number of non-air cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.data.iter().filter(|&&id| id != AIR).count()
    }

    /// Native-endian byte view of the cell data.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Little-endian copy of the cell data (`u16` per cell).
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        if cfg!(target_endian = "little") {
            self.as_bytes().to_vec()
        } else {
            self.data.iter().flat_map(|id| id.to_le_bytes()).collect()
        }
    }
}

/// A dense 2D elevation map with values in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl HeightMap {
    /// Creates a flat heightmap filled with `value` (clamped).
    #[must_use]
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![clamp_unit(value); width * height],
        }
    }

    /// Wraps raw data, validating length and clamping every value to [0, 1].
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `data.len() != width * height`.
    pub fn from_raw(width: usize, height: usize, mut data: Vec<f32>) -> CoreResult<Self> {
        if data.len() != width * height {
            return Err(CoreError::DimensionMismatch {
                dims: format!("{width}x{height}"),
                expected: width * height,
                actual: data.len(),
            });
        }
        for value in &mut data {
            *value = clamp_unit(*value);
        }
        Ok(Self { width, height, data })
    }

    /// Cells along X.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Cells along Y.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the map has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of a cell.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Gets an elevation, returning 0 when out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.data[self.index(x, y)]
        } else {
            0.0
        }
    }

    /// Sets an elevation (clamped to [0, 1]). Out-of-range writes are dropped.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx] = clamp_unit(value);
        }
    }

    /// Raw elevation data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Minimum and maximum elevation. `(0, 0)` for an empty map.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Native-endian byte view (`f32` per cell).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Little-endian copy of the elevation data.
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        if cfg!(target_endian = "little") {
            self.as_bytes().to_vec()
        } else {
            self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
        }
    }
}

/// Clamps to [0, 1], mapping NaN to 0.
#[inline]
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_u64_saturates() {
        assert_eq!(GridDims::new(4, 3, 2).volume_u64(), 24);
        assert_eq!(GridDims::new(usize::MAX, usize::MAX, 2).volume_u64(), u64::MAX);
    }

    #[test]
    fn test_index_layout() {
        let grid = VoxelGrid::new(4, 3, 2);
        assert_eq!(grid.index(0, 0, 0), 0);
        assert_eq!(grid.index(1, 0, 0), 1);
        assert_eq!(grid.index(0, 1, 0), 4);
        assert_eq!(grid.index(0, 0, 1), 12);
        assert_eq!(grid.data().len(), 24);
    }

    #[test]
    fn test_out_of_range_writes_dropped() {
        let mut grid = VoxelGrid::new(2, 2, 2);
        assert!(!grid.set(2, 0, 0, 5));
        assert!(!grid.set_signed(-1, 0, 0, 5));
        assert_eq!(grid.filled_count(), 0);
        assert!(grid.set(1, 1, 1, 5));
        assert_eq!(grid.get(1, 1, 1), 5);
    }

    #[test]
    fn test_from_raw_rejects_mismatch() {
        let err = VoxelGrid::from_raw(GridDims::new(2, 2, 2), vec![0; 7]).unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { expected: 8, actual: 7, .. }));

        let err = HeightMap::from_raw(3, 3, vec![0.5; 10]).unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { expected: 9, actual: 10, .. }));
    }

    #[test]
    fn test_heightmap_clamps() {
        let map = HeightMap::from_raw(2, 1, vec![-0.5, 1.7]).unwrap();
        assert_eq!(map.get(0, 0), 0.0);
        assert_eq!(map.get(1, 0), 1.0);

        let mut map = HeightMap::filled(2, 2, 0.5);
        map.set(0, 0, f32::NAN);
        assert_eq!(map.get(0, 0), 0.0);
    }

    #[test]
    fn test_le_bytes_length() {
        let mut grid = VoxelGrid::new(3, 3, 3);
        grid.set(0, 0, 0, 0x0102);
        let bytes = grid.to_le_bytes();
        assert_eq!(bytes.len(), 27 * 2);
        assert_eq!(&bytes[0..2], &[0x02, 0x01]);

        let map = HeightMap::filled(4, 4, 0.25);
        assert_eq!(map.to_le_bytes().len(), 16 * 4);
    }
}
