//! # Blueprints
//!
//! An ordered primitive list plus optional requested bounds.
//!
//! `Blueprint::from_json` accepts predictor output leniently: malformed
//! primitives are dropped with a warning, unknown shapes become boxes, and
//! materials may be names or numeric ids. Coordinates, sizes and bounds
//! are clamped to `COORD_LIMIT` so later arithmetic cannot overflow.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use voxelsmith_core::MaterialRef;

use crate::primitive::{Primitive, PrimitiveShape, COORD_LIMIT};

/// A named object description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Object name.
    pub name: String,
    /// Requested bounds `[x, y, z]`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[usize; 3]>,
    /// Primitives in application order.
    pub primitives: Vec<Primitive>,
}

/// A blueprint plus the warnings produced while parsing it.
#[derive(Clone, Debug, Default)]
pub struct ParsedBlueprint {
    /// The blueprint.
    pub blueprint: Blueprint,
    /// Entries dropped or defaulted.
    pub warnings: Vec<String>,
}

impl Blueprint {
    /// Creates an empty blueprint.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: None,
            primitives: Vec::new(),
        }
    }

    /// Sets the requested bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: [usize; 3]) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Appends a primitive.
    #[must_use]
    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    /// Distinct shapes used by additive primitives.
    #[must_use]
    pub fn shape_set(&self) -> BTreeSet<PrimitiveShape> {
        self.primitives
            .iter()
            .filter(|p| !p.subtract)
            .map(|p| p.shape)
            .collect()
    }

    /// Distinct material references used by additive primitives.
    #[must_use]
    pub fn material_count(&self) -> usize {
        let mut seen: Vec<&MaterialRef> = Vec::new();
        for p in self.primitives.iter().filter(|p| !p.subtract) {
            if !seen.contains(&&p.material) {
                seen.push(&p.material);
            }
        }
        seen.len()
    }

    /// Additive primitive count.
    #[must_use]
    pub fn additive_count(&self) -> usize {
        self.primitives.iter().filter(|p| !p.subtract).count()
    }

    /// Lenient parse of predictor output.
    ///
    /// Accepts an object with `primitives`/`parts`/`components`, or a bare
    /// primitive array.
    #[must_use]
    pub fn from_json(value: &Value, fallback_name: &str) -> ParsedBlueprint {
        let mut warnings = Vec::new();
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(fallback_name)
            .to_string();

        let bounds = value
            .get("bounds")
            .or_else(|| value.get("size"))
            .or_else(|| value.get("dimensions"))
            .and_then(|b| match triple(b) {
                Some(t) if t.iter().all(|&v| v >= 1.0) => {
                    if t.iter().any(|&v| v > COORD_LIMIT as f64) {
                        warnings.push(format!("bounds clamped to {COORD_LIMIT} per axis"));
                    }
                    Some(t.map(|v| v.round().min(COORD_LIMIT as f64) as usize))
                }
                _ => {
                    warnings.push("ignored malformed bounds".to_string());
                    None
                }
            });

        let entries = if let Value::Array(items) = value {
            Some(items)
        } else {
            ["primitives", "parts", "components", "shapes"]
                .iter()
                .find_map(|k| value.get(*k).and_then(Value::as_array))
        };

        let mut primitives = Vec::new();
        match entries {
            Some(items) => {
                for (index, entry) in items.iter().enumerate() {
                    match parse_primitive(entry) {
                        Ok((primitive, note)) => {
                            if let Some(note) = note {
                                warnings.push(format!("primitive {index}: {note}"));
                            }
                            primitives.push(primitive);
                        }
                        Err(reason) => warnings.push(format!("primitive {index} dropped: {reason}")),
                    }
                }
            }
            None => warnings.push("no primitive list found".to_string()),
        }

        for warning in &warnings {
            tracing::warn!("blueprint '{}': {}", name, warning);
        }
        ParsedBlueprint {
            blueprint: Self {
                name,
                bounds,
                primitives,
            },
            warnings,
        }
    }
}

/// Reads a 3-number array or an `{x, y, z}` object.
fn triple(value: &Value) -> Option<[f64; 3]> {
    match value {
        Value::Array(items) if items.len() == 3 => {
            let mut out = [0.0; 3];
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = item.as_f64().filter(|v| v.is_finite())?;
            }
            Some(out)
        }
        Value::Object(_) => {
            let axis = |k: &str| value.get(k).and_then(Value::as_f64).filter(|v| v.is_finite());
            Some([axis("x")?, axis("y")?, axis("z")?])
        }
        _ => None,
    }
}

fn parse_material(value: Option<&Value>) -> Result<MaterialRef, String> {
    match value {
        None | Some(Value::Null) => Ok(MaterialRef::default()),
        Some(Value::String(name)) => match name.trim().parse::<u16>() {
            Ok(id) => Ok(MaterialRef::Id(id)),
            Err(_) => Ok(MaterialRef::Name(name.clone())),
        },
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|id| u16::try_from(id).ok())
            .map(MaterialRef::Id)
            .ok_or_else(|| format!("material id {n} out of range")),
        Some(other) => Err(format!("material must be a name or id, got {other}")),
    }
}

/// Quarter turns from a turn count, degrees, or a `[x, y, z]` degree triple
/// (only the vertical component is used).
fn parse_rotation(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Array(items)) if items.len() == 3 => items[1].as_f64(),
        Some(v) => v.as_f64(),
        None => None,
    };
    let Some(raw) = raw.filter(|v| v.is_finite()) else {
        return 0;
    };
    let turns = if raw.abs() >= 4.0 { raw / 90.0 } else { raw };
    (turns.round() as i64).rem_euclid(4) as u8
}

fn parse_primitive(entry: &Value) -> Result<(Primitive, Option<String>), String> {
    if !entry.is_object() {
        return Err("not an object".to_string());
    }
    let mut note = None;
    let shape = match entry
        .get("type")
        .or_else(|| entry.get("shape"))
        .or_else(|| entry.get("kind"))
        .and_then(Value::as_str)
    {
        Some(name) => {
            let (shape, fell_back) = PrimitiveShape::parse_or_box(name);
            if fell_back {
                note = Some(format!("unknown shape '{name}', using box"));
            }
            shape
        }
        None => {
            note = Some("missing shape, using box".to_string());
            PrimitiveShape::Box
        }
    };

    let position = triple(entry.get("position").or_else(|| entry.get("pos")).ok_or("missing position")?)
        .ok_or("position must have 3 numbers")?;
    let size = triple(entry.get("size").or_else(|| entry.get("dimensions")).ok_or("missing size")?)
        .ok_or("size must have 3 numbers")?;
    if size.iter().any(|&s| s <= 0.0) {
        return Err("size must be positive".to_string());
    }

    let subtract = entry.get("subtract").and_then(Value::as_bool).unwrap_or(false)
        || entry
            .get("operation")
            .and_then(Value::as_str)
            .is_some_and(|op| op.eq_ignore_ascii_case("subtract"));

    let limit = COORD_LIMIT as f64;
    if position.iter().chain(&size).any(|v| v.abs() > limit) {
        let clamped = format!("position/size clamped to +/-{COORD_LIMIT}");
        note = Some(note.map_or(clamped.clone(), |n| format!("{n}; {clamped}")));
    }

    let mut primitive = Primitive::new(
        shape,
        position.map(|v| v.round().clamp(-limit, limit) as i64),
        size.map(|v| v.round().clamp(1.0, limit) as u32),
        parse_material(entry.get("material"))?,
    )
    .with_rotation(parse_rotation(entry.get("rotation")));
    primitive.subtract = subtract;
    primitive.label = entry
        .get("label")
        .or_else(|| entry.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok((primitive, note))
}
