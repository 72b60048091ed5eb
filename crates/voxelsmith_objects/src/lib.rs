//! # VOXELSMITH Objects
//!
//! Turns blueprints (ordered lists of geometric primitives) into dense voxel
//! grids.
//!
//! ## Design Principles
//!
//! 1. **Ordered**: Primitives apply in input order, later ones win
//! 2. **Never panic on input**: Malformed primitives are filtered, unknown
//!    shapes become boxes, out-of-range cells are dropped
//! 3. **Bounded**: Scale and volume are clamped before anything allocates
//!
//! ## Core Components
//!
//! - `Primitive` / `PrimitiveShape`: The shape vocabulary
//! - `Blueprint`: Lenient JSON parsing
//! - `ScaleOptions` / `plan_scale`: Multiplier and safety ceilings
//! - `rasterize`: Blueprint → `RasterizedObject`
//!
//! ## Example
//!
//! ```rust
//! use voxelsmith_core::MaterialTable;
//! use voxelsmith_objects::{rasterize, Blueprint, Primitive, PrimitiveShape, ScaleOptions};
//!
//! let blueprint = Blueprint::new("crate")
//!     .with_primitive(Primitive::new(PrimitiveShape::Box, [0, 0, 0], [4, 4, 4], "wood"));
//!
//! let object = rasterize(&blueprint, &ScaleOptions::default(), &MaterialTable::default())?;
//! assert_eq!(object.grid.filled_count(), 64);
//! # Ok::<(), voxelsmith_core::CoreError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod blueprint;
pub mod primitive;
pub mod rasterizer;
pub mod scale;

pub use blueprint::{Blueprint, ParsedBlueprint};
pub use primitive::{Primitive, PrimitiveShape};
pub use rasterizer::{inside, rasterize, rasterize_primitive, ObjectCanvas, RasterSummary, RasterizedObject};
pub use scale::{plan_scale, ScaleOptions, ScalePlan};
