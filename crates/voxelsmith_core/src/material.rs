//! # Material Resolution
//!
//! Biome and primitive materials are referenced by name (or raw id) and
//! resolved through a `MaterialTable`.
//!
//! ## Resolution Order
//!
//! 1. Case-insensitive lookup (lowercased name)
//! 2. Exact-case lookup (for caller mappings with case-sensitive keys)
//! 3. The table's fallback id
//!
//! The default table is static data built once; tables never change after
//! construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Material identifier stored in voxel grids.
pub type MaterialId = u16;

/// Air (empty cell). Never a valid material.
pub const AIR: MaterialId = 0;

/// A static material definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialDef {
    /// Canonical lowercase name.
    pub name: &'static str,
    /// Grid id.
    pub id: MaterialId,
    /// Preview colour (RGB).
    pub color: [u8; 3],
}

impl MaterialDef {
    const fn new(name: &'static str, id: MaterialId, color: [u8; 3]) -> Self {
        Self { name, id, color }
    }
}

/// The documented default material mapping.
pub const DEFAULT_MATERIALS: &[MaterialDef] = &[
    MaterialDef::new("stone", 1, [128, 128, 128]),
    MaterialDef::new("dirt", 2, [121, 85, 58]),
    MaterialDef::new("grass", 3, [86, 152, 62]),
    MaterialDef::new("sand", 4, [219, 202, 142]),
    MaterialDef::new("water", 5, [52, 110, 196]),
    MaterialDef::new("snow", 6, [240, 244, 250]),
    MaterialDef::new("ice", 7, [170, 210, 240]),
    MaterialDef::new("wood", 8, [112, 78, 44]),
    MaterialDef::new("leaves", 9, [52, 118, 44]),
    MaterialDef::new("gravel", 10, [140, 134, 126]),
    MaterialDef::new("clay", 11, [164, 120, 96]),
    MaterialDef::new("mud", 12, [84, 66, 46]),
    MaterialDef::new("sandstone", 13, [205, 170, 110]),
    MaterialDef::new("red_sand", 14, [190, 104, 58]),
    MaterialDef::new("lava", 15, [240, 90, 20]),
    MaterialDef::new("basalt", 16, [54, 54, 60]),
    MaterialDef::new("obsidian", 17, [28, 20, 38]),
    MaterialDef::new("moss", 18, [92, 130, 60]),
    MaterialDef::new("cactus", 19, [70, 140, 70]),
    MaterialDef::new("flower", 20, [226, 84, 140]),
    MaterialDef::new("mushroom", 21, [196, 60, 50]),
    MaterialDef::new("reed", 22, [150, 160, 80]),
    MaterialDef::new("coral", 23, [240, 120, 110]),
    MaterialDef::new("metal", 24, [170, 174, 180]),
    MaterialDef::new("brick", 25, [160, 70, 52]),
    MaterialDef::new("glass", 26, [200, 230, 240]),
    MaterialDef::new("plastic", 27, [230, 230, 220]),
    MaterialDef::new("cloth", 28, [180, 60, 70]),
    MaterialDef::new("fur", 29, [150, 120, 96]),
    MaterialDef::new("skin", 30, [224, 172, 140]),
    MaterialDef::new("bone", 31, [232, 226, 208]),
    MaterialDef::new("gold", 32, [230, 190, 60]),
    MaterialDef::new("marble", 33, [236, 234, 228]),
    MaterialDef::new("concrete", 34, [160, 160, 156]),
    MaterialDef::new("rubber", 35, [36, 36, 36]),
    MaterialDef::new("palm_leaves", 36, [84, 150, 60]),
    MaterialDef::new("dry_grass", 37, [180, 168, 92]),
    MaterialDef::new("peat", 38, [60, 48, 36]),
];

/// Aliases accepted by the default table.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("rock", "stone"),
    ("soil", "dirt"),
    ("earth", "dirt"),
    ("log", "wood"),
    ("trunk", "wood"),
    ("bark", "wood"),
    ("foliage", "leaves"),
    ("leaf", "leaves"),
    ("steel", "metal"),
    ("iron", "metal"),
    ("fabric", "cloth"),
    ("hair", "fur"),
    ("savanna_grass", "dry_grass"),
];

/// The default fallback material (stone).
pub const DEFAULT_FALLBACK: MaterialId = 1;

/// A material reference as it appears in predicted blueprints and layouts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialRef {
    /// Raw material id.
    Id(MaterialId),
    /// Material name.
    Name(String),
}

impl Default for MaterialRef {
    fn default() -> Self {
        Self::Name("stone".to_string())
    }
}

impl From<&str> for MaterialRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<MaterialId> for MaterialRef {
    fn from(id: MaterialId) -> Self {
        Self::Id(id)
    }
}

impl std::fmt::Display for MaterialRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Name → id resolution table.
#[derive(Clone, Debug)]
pub struct MaterialTable {
    /// Lowercased names.
    lower: HashMap<String, MaterialId>,
    /// Names exactly as supplied.
    exact: HashMap<String, MaterialId>,
    /// Preview colours by id.
    colors: HashMap<MaterialId, [u8; 3]>,
    /// Id used for unmapped names and unknown ids.
    fallback: MaterialId,
}

impl Default for MaterialTable {
    fn default() -> Self {
        let mut table = Self::empty(DEFAULT_FALLBACK);
        for def in DEFAULT_MATERIALS {
            table.insert_with_color(def.name, def.id, def.color);
        }
        for (alias, target) in DEFAULT_ALIASES {
            if let Some(id) = table.lookup(target) {
                table.insert(alias, id);
            }
        }
        table
    }
}

impl MaterialTable {
    /// Creates an empty table with the given fallback id.
    #[must_use]
    pub fn empty(fallback: MaterialId) -> Self {
        Self {
            lower: HashMap::new(),
            exact: HashMap::new(),
            colors: HashMap::new(),
            fallback,
        }
    }

    /// Builds the default table extended (and overridden) by caller mappings.
    #[must_use]
    pub fn with_mapping<'a, I>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, MaterialId)>,
    {
        let mut table = Self::default();
        for (name, id) in mapping {
            table.insert(name, id);
        }
        table
    }

    /// Sets the fallback id.
    #[must_use]
    pub fn with_fallback(mut self, fallback: MaterialId) -> Self {
        self.fallback = fallback;
        self
    }

    /// Registers a name. Air (0) is never registered.
    pub fn insert(&mut self, name: &str, id: MaterialId) {
        if id == AIR {
            return;
        }
        self.lower.insert(name.to_lowercase(), id);
        self.exact.insert(name.to_string(), id);
        self.colors.entry(id).or_insert([160, 160, 160]);
    }

    /// Registers a name with a preview colour.
    pub fn insert_with_color(&mut self, name: &str, id: MaterialId, color: [u8; 3]) {
        self.insert(name, id);
        if id != AIR {
            self.colors.insert(id, color);
        }
    }

    /// Looks up a name without falling back.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<MaterialId> {
        let trimmed = name.trim();
        self.lower
            .get(&trimmed.to_lowercase())
            .or_else(|| self.exact.get(trimmed))
            .copied()
    }

    /// Resolves a name, falling back to the table's fallback id.
    #[must_use]
    pub fn resolve(&self, name: &str) -> MaterialId {
        self.lookup(name).unwrap_or_else(|| {
            tracing::debug!("unmapped material '{}', using fallback #{}", name, self.fallback);
            self.fallback
        })
    }

    /// Resolves a name or id reference.
    ///
    /// Numeric ids not present in the table resolve to the fallback.
    #[must_use]
    pub fn resolve_ref(&self, material: &MaterialRef) -> MaterialId {
        match material {
            MaterialRef::Name(name) => self.resolve(name),
            MaterialRef::Id(id) if self.contains_id(*id) => *id,
            MaterialRef::Id(id) => {
                tracing::debug!("unknown material id #{}, using fallback #{}", id, self.fallback);
                self.fallback
            }
        }
    }

    /// Returns true if `id` is a registered material.
    #[must_use]
    pub fn contains_id(&self, id: MaterialId) -> bool {
        self.colors.contains_key(&id)
    }

    /// The fallback id.
    #[must_use]
    pub const fn fallback(&self) -> MaterialId {
        self.fallback
    }

    /// Preview colour for an id (magenta when unknown, black for air).
    #[must_use]
    pub fn color(&self, id: MaterialId) -> [u8; 3] {
        if id == AIR {
            return [0, 0, 0];
        }
        self.colors.get(&id).copied().unwrap_or([255, 0, 255])
    }

    /// Canonical (lowercase) name for an id, if any.
    #[must_use]
    pub fn name_of(&self, id: MaterialId) -> Option<&str> {
        DEFAULT_MATERIALS
            .iter()
            .find(|def| def.id == id)
            .map(|def| def.name)
            .or_else(|| {
                self.lower
                    .iter()
                    .filter(|(_, &v)| v == id)
                    .map(|(k, _)| k.as_str())
                    .min()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let table = MaterialTable::default();
        assert_eq!(table.resolve("Stone"), 1);
        assert_eq!(table.resolve("WATER"), 5);
        assert_eq!(table.resolve("  sand "), 4);
    }

    #[test]
    fn test_exact_case_fallback() {
        let mut table = MaterialTable::empty(9);
        table.insert("Chrome", 40);
        table.lower.remove("chrome");
        assert_eq!(table.resolve("Chrome"), 40);
        assert_eq!(table.resolve("chrome"), 9);
    }

    #[test]
    fn test_unmapped_uses_fallback() {
        let table = MaterialTable::default().with_fallback(2);
        assert_eq!(table.resolve("unobtainium"), 2);
        assert_eq!(table.resolve_ref(&MaterialRef::Id(999)), 2);
        assert_eq!(table.resolve_ref(&MaterialRef::Id(7)), 7);
    }

    #[test]
    fn test_aliases_and_custom_mapping() {
        let table = MaterialTable::with_mapping([("crystal", 60), ("stone", 61)]);
        assert_eq!(table.resolve("rock"), 1);
        assert_eq!(table.resolve("crystal"), 60);
        assert_eq!(table.resolve("stone"), 61);
        assert!(table.contains_id(60));
    }

    #[test]
    fn test_air_never_registered() {
        let mut table = MaterialTable::default();
        table.insert("void", AIR);
        assert!(table.lookup("void").is_none());
        assert!(!table.contains_id(AIR));
    }
}
