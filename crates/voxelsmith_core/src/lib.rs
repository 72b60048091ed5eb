//! # VOXELSMITH Core
//!
//! Dense grid storage, material resolution and grid analysis shared by every
//! generator in the workspace.
//!
//! ## Design Principles
//!
//! 1. **Dense**: Grids are flat arrays, `idx = x + y*width + z*width*height`
//! 2. **Honest sizes**: A grid's length always equals its dimension product
//! 3. **Read-only analysis**: Analyzers never mutate what they measure
//! 4. **Static defaults**: Material tables are immutable once built
//!
//! ## Core Components
//!
//! - `VoxelGrid` / `HeightMap`: Dense storage
//! - `MaterialTable`: Name → id resolution with a fallback id
//! - `BehaviorRegistry`: Per-material behavior annotations
//! - `analysis`: Fill, connectivity and relief metrics
//!
//! ## Example
//!
//! ```rust
//! use voxelsmith_core::{analysis, VoxelGrid};
//!
//! let mut grid = VoxelGrid::new(4, 4, 4);
//! grid.set(1, 1, 1, 3);
//!
//! let fill = analysis::compute_voxel_fill_metrics(&grid);
//! assert_eq!(fill.filled, 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod analysis;
pub mod behavior;
pub mod error;
pub mod grid;
pub mod material;

pub use analysis::{ReliefMetrics, VoxelConnectivity, VoxelFillMetrics};
pub use behavior::{BehaviorContext, BehaviorHandle, BehaviorRegistry, MaterialBehavior, MaterialPatch};
pub use error::{CoreError, CoreResult};
pub use grid::{GridDims, HeightMap, VoxelGrid};
pub use material::{MaterialId, MaterialRef, MaterialTable, AIR};
