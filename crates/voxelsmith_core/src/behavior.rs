//! # Material Behaviors
//!
//! Behaviors are annotations, not simulation. Each behavior turns a material
//! and an environment context into a partial `MaterialPatch`.
//!
//! ## Storage
//!
//! Behaviors live in an arena (`Vec<MaterialBehavior>`) and are referenced by
//! `BehaviorHandle`. Each material id holds an ordered list of handles;
//! patches are merged in attachment order, later fields win.

use std::collections::HashMap;

use serde::Serialize;

use crate::material::{MaterialId, MaterialTable};

/// Index into the behavior arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BehaviorHandle(u32);

impl BehaviorHandle {
    /// Raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Environment a behavior is evaluated in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BehaviorContext {
    /// Local temperature in [0, 1].
    pub temperature: f32,
    /// Local moisture in [0, 1].
    pub moisture: f32,
    /// Depth below the surface in cells.
    pub depth: u32,
}

/// Partial material properties produced by behaviors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MaterialPatch {
    /// Material can burn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flammable: Option<bool>,
    /// Material flows; value is flow rate in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f32>,
    /// Light emission in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission: Option<f32>,
    /// Surface friction in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    /// Structural hardness in [0, 1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardness: Option<f32>,
    /// Material may melt in warm contexts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melts: Option<bool>,
}

impl MaterialPatch {
    /// Overlays `other` onto `self`; set fields in `other` win.
    pub fn merge(&mut self, other: &Self) {
        if other.flammable.is_some() {
            self.flammable = other.flammable;
        }
        if other.flow_rate.is_some() {
            self.flow_rate = other.flow_rate;
        }
        if other.emission.is_some() {
            self.emission = other.emission;
        }
        if other.friction.is_some() {
            self.friction = other.friction;
        }
        if other.hardness.is_some() {
            self.hardness = other.hardness;
        }
        if other.melts.is_some() {
            self.melts = other.melts;
        }
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A behavior with its tuning parameters stored inline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaterialBehavior {
    /// Burns; ignition gets easier as moisture drops.
    Flammable {
        /// Moisture above which the material will not ignite.
        max_moisture: f32,
    },
    /// Flows like a liquid.
    Liquid {
        /// 0 = free flowing, 1 = barely moves.
        viscosity: f32,
    },
    /// Emits light.
    Emissive {
        /// Emission strength in [0, 1].
        intensity: f32,
    },
    /// Low surface friction.
    Slippery {
        /// Friction in [0, 1].
        friction: f32,
    },
    /// Loose material whose hardness grows with depth.
    Granular {
        /// Hardness at the surface.
        surface_hardness: f32,
    },
    /// Melts above a temperature.
    Meltable {
        /// Temperature in [0, 1] above which it melts.
        melt_temperature: f32,
    },
}

impl MaterialBehavior {
    /// Evaluates the behavior in a context.
    #[must_use]
    pub fn apply(&self, _material: MaterialId, context: &BehaviorContext) -> MaterialPatch {
        match *self {
            Self::Flammable { max_moisture } => MaterialPatch {
                flammable: Some(context.moisture < max_moisture),
                ..MaterialPatch::default()
            },
            Self::Liquid { viscosity } => MaterialPatch {
                flow_rate: Some((1.0 - viscosity).clamp(0.0, 1.0)),
                hardness: Some(0.0),
                ..MaterialPatch::default()
            },
            Self::Emissive { intensity } => MaterialPatch {
                emission: Some(intensity.clamp(0.0, 1.0)),
                ..MaterialPatch::default()
            },
            Self::Slippery { friction } => MaterialPatch {
                friction: Some(friction.clamp(0.0, 1.0)),
                ..MaterialPatch::default()
            },
            Self::Granular { surface_hardness } => {
                let compaction = (context.depth as f32 * 0.1).min(1.0);
                MaterialPatch {
                    hardness: Some((surface_hardness + (1.0 - surface_hardness) * compaction).clamp(0.0, 1.0)),
                    ..MaterialPatch::default()
                }
            }
            Self::Meltable { melt_temperature } => MaterialPatch {
                melts: Some(context.temperature > melt_temperature),
                ..MaterialPatch::default()
            },
        }
    }
}

/// Material id → ordered behavior handles.
#[derive(Clone, Debug, Default)]
pub struct BehaviorRegistry {
    arena: Vec<MaterialBehavior>,
    attached: HashMap<MaterialId, Vec<BehaviorHandle>>,
}

impl BehaviorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the default annotations for the materials a table knows.
    #[must_use]
    pub fn with_defaults(table: &MaterialTable) -> Self {
        let mut registry = Self::new();
        let liquid = registry.register(MaterialBehavior::Liquid { viscosity: 0.1 });
        let lava_flow = registry.register(MaterialBehavior::Liquid { viscosity: 0.8 });
        let glow = registry.register(MaterialBehavior::Emissive { intensity: 0.9 });
        let slippery = registry.register(MaterialBehavior::Slippery { friction: 0.05 });
        let melts = registry.register(MaterialBehavior::Meltable { melt_temperature: 0.6 });
        let burns = registry.register(MaterialBehavior::Flammable { max_moisture: 0.7 });
        let granular = registry.register(MaterialBehavior::Granular { surface_hardness: 0.2 });

        let mut attach_named = |name: &str, handles: &[BehaviorHandle]| {
            if let Some(id) = table.lookup(name) {
                for &handle in handles {
                    registry.attach(id, handle);
                }
            }
        };
        attach_named("water", &[liquid]);
        attach_named("lava", &[lava_flow, glow]);
        attach_named("ice", &[slippery, melts]);
        attach_named("snow", &[melts]);
        attach_named("wood", &[burns]);
        attach_named("leaves", &[burns]);
        attach_named("dry_grass", &[burns]);
        attach_named("sand", &[granular]);
        attach_named("gravel", &[granular]);
        registry
    }

    /// Adds a behavior to the arena.
    pub fn register(&mut self, behavior: MaterialBehavior) -> BehaviorHandle {
        let handle = BehaviorHandle(self.arena.len() as u32);
        self.arena.push(behavior);
        handle
    }

    /// Appends a behavior to a material's list. Unknown handles are ignored.
    pub fn attach(&mut self, material: MaterialId, handle: BehaviorHandle) {
        if handle.index() < self.arena.len() {
            self.attached.entry(material).or_default().push(handle);
        }
    }

    /// Behavior stored at a handle.
    #[must_use]
    pub fn get(&self, handle: BehaviorHandle) -> Option<&MaterialBehavior> {
        self.arena.get(handle.index())
    }

    /// Handles attached to a material, in order.
    #[must_use]
    pub fn behaviors_of(&self, material: MaterialId) -> &[BehaviorHandle] {
        self.attached.get(&material).map_or(&[], Vec::as_slice)
    }

    /// Applies every attached behavior in order and merges the patches.
    #[must_use]
    pub fn apply(&self, material: MaterialId, context: &BehaviorContext) -> MaterialPatch {
        let mut patch = MaterialPatch::default();
        for &handle in self.behaviors_of(material) {
            if let Some(behavior) = self.get(handle) {
                patch.merge(&behavior.apply(material, context));
            }
        }
        patch
    }
}
