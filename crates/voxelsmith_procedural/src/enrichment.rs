//! # Scenario Enrichment
//!
//! Sparse predicted layouts often name a feature in their description
//! ("a desert oasis") without a region for it. Enrichment matches the
//! description's words against an ordered keyword rule table and injects
//! the missing complementary regions.
//!
//! Must run before any height generation. Rules are evaluated in table
//! order; several may fire for one description, and each rule checks the
//! layout as left by the rules before it.

use serde::Serialize;

use crate::biome::BiomeKind;
use crate::layout::{description_words, BiomeRegion, ScenarioLayout};

/// Names of rules that fired, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    /// Rule names.
    pub applied: Vec<&'static str>,
}

impl EnrichmentReport {
    /// Returns true if a rule with this name fired.
    #[must_use]
    pub fn fired(&self, name: &str) -> bool {
        self.applied.iter().any(|&n| n == name)
    }
}

/// One keyword rule.
struct Rule {
    name: &'static str,
    keywords: &'static [&'static str],
    apply: fn(&mut ScenarioLayout) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        name: "oasis",
        keywords: &["oasis"],
        apply: oasis,
    },
    Rule {
        name: "valley",
        keywords: &["valley", "vale"],
        apply: valley,
    },
    Rule {
        name: "river",
        keywords: &["river", "stream", "creek"],
        apply: river,
    },
    Rule {
        name: "coast",
        keywords: &["beach", "coast", "shore"],
        apply: coast,
    },
    Rule {
        name: "island",
        keywords: &["island", "archipelago"],
        apply: island,
    },
    Rule {
        name: "lake",
        keywords: &["lake", "pond"],
        apply: lake,
    },
    Rule {
        name: "swamp",
        keywords: &["swamp", "swampy", "marsh", "marshy", "bog", "wetland"],
        apply: swamp,
    },
];

/// Applies every matching rule to the layout's own description.
pub fn enrich_layout(layout: &mut ScenarioLayout) -> EnrichmentReport {
    let words = description_words(&layout.description);
    let mut report = EnrichmentReport::default();
    for rule in RULES {
        if !rule.keywords.iter().any(|k| words.contains(*k)) {
            continue;
        }
        if (rule.apply)(layout) {
            tracing::info!("enrichment rule '{}' applied ({} regions)", rule.name, layout.regions.len());
            report.applied.push(rule.name);
        }
    }
    report
}

/// Rect of `fraction` of the map, centered.
fn centered(layout: &ScenarioLayout, fraction: f32) -> [u32; 4] {
    let (w, h) = (layout.width as f32, layout.height as f32);
    let rw = (w * fraction).round().max(1.0);
    let rh = (h * fraction).round().max(1.0);
    [((w - rw) * 0.5) as u32, ((h - rh) * 0.5) as u32, rw as u32, rh as u32]
}

/// Desert oasis: a plains transition ring with a central lake.
fn oasis(layout: &mut ScenarioLayout) -> bool {
    if layout.has_water() {
        return false;
    }
    let ring = centered(layout, 0.45);
    let pool = centered(layout, 0.2);
    layout.regions.push(BiomeRegion::new(BiomeKind::Plains, ring).with_label("oasis_ring"));
    layout.regions.push(BiomeRegion::new(BiomeKind::Lake, pool).with_label("oasis"));
    true
}

/// Valley: a low central band flanked by high ground.
fn valley(layout: &mut ScenarioLayout) -> bool {
    if layout.has_kind(BiomeKind::Valley) {
        return false;
    }
    let (w, h) = (layout.width as u32, layout.height as u32);
    let band = (w / 3).max(1);
    if !layout.has_kind(BiomeKind::Mountains) && !layout.has_kind(BiomeKind::Hills) {
        layout.regions.push(BiomeRegion::new(BiomeKind::Hills, [0, 0, band, h]));
        layout
            .regions
            .push(BiomeRegion::new(BiomeKind::Hills, [w - band, 0, band, h]));
    }
    layout
        .regions
        .push(BiomeRegion::new(BiomeKind::Valley, [band, 0, w.saturating_sub(2 * band).max(1), h]));
    true
}

/// River: make sure at least one river is traced.
fn river(layout: &mut ScenarioLayout) -> bool {
    if layout.rivers.count > 0 || layout.has_kind(BiomeKind::River) {
        return false;
    }
    layout.rivers.count = 1;
    true
}

/// Coast: open water along the west edge with a beach strip beside it.
fn coast(layout: &mut ScenarioLayout) -> bool {
    if layout.has_kind(BiomeKind::Ocean) {
        return false;
    }
    let (w, h) = (layout.width as u32, layout.height as u32);
    let sea = (w / 4).max(1);
    let sand = (w / 10).max(1);
    if !layout.has_kind(BiomeKind::Beach) {
        layout.regions.push(BiomeRegion::new(BiomeKind::Beach, [sea, 0, sand, h]));
    }
    layout.regions.push(BiomeRegion::new(BiomeKind::Ocean, [0, 0, sea, h]));
    true
}

/// Island: ocean underneath everything, a beach ring and land in the middle.
fn island(layout: &mut ScenarioLayout) -> bool {
    if layout.has_kind(BiomeKind::Ocean) {
        return false;
    }
    let full = layout.full_rect();
    let land_present = layout.regions.iter().any(|r| !r.kind.is_water());
    // Ocean first so every existing region stays on top of it.
    layout.regions.insert(0, BiomeRegion::new(BiomeKind::Ocean, full));
    let beach = centered(layout, 0.7);
    layout.regions.insert(1, BiomeRegion::new(BiomeKind::Beach, beach));
    if !land_present {
        let core = centered(layout, 0.5);
        layout.regions.push(BiomeRegion::new(BiomeKind::Plains, core));
    } else {
        // Pull existing land inside the island footprint.
        let [bx, by, bw, bh] = centered(layout, 0.6);
        for region in layout.regions.iter_mut().skip(2) {
            if region.kind.is_water() {
                continue;
            }
            let [x, y, rw, rh] = region.rect;
            let nx = x.clamp(bx, bx + bw - 1);
            let ny = y.clamp(by, by + bh - 1);
            region.rect = [nx, ny, rw.min(bx + bw - nx).max(1), rh.min(by + bh - ny).max(1)];
        }
    }
    true
}

/// Lake: a central lake.
fn lake(layout: &mut ScenarioLayout) -> bool {
    if layout.has_kind(BiomeKind::Lake) {
        return false;
    }
    let pool = centered(layout, 0.3);
    layout.regions.push(BiomeRegion::new(BiomeKind::Lake, pool));
    true
}

/// Swamp: wetland over the southern half.
fn swamp(layout: &mut ScenarioLayout) -> bool {
    if layout.has_kind(BiomeKind::Swamp) {
        return false;
    }
    let (w, h) = (layout.width as u32, layout.height as u32);
    layout
        .regions
        .push(BiomeRegion::new(BiomeKind::Swamp, [0, h / 2, w, (h - h / 2).max(1)]));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oasis_adds_lake_and_ring() {
        let mut layout = ScenarioLayout::new(64, 64, 32)
            .with_description("A desert oasis at dusk")
            .with_region(BiomeRegion::new(BiomeKind::Desert, [0, 0, 64, 64]));
        let report = enrich_layout(&mut layout);
        assert_eq!(report.applied, vec!["oasis"]);
        assert!(layout.has_kind(BiomeKind::Lake));
        assert!(layout.has_kind(BiomeKind::Plains));
        let lake = layout.regions.last().unwrap();
        assert!(lake.contains(32, 32));
    }

    #[test]
    fn test_rules_do_not_repeat() {
        let mut layout = ScenarioLayout::new(32, 32, 16)
            .with_description("lake")
            .with_region(BiomeRegion::new(BiomeKind::Lake, [0, 0, 8, 8]));
        assert!(enrich_layout(&mut layout).applied.is_empty());
        assert_eq!(layout.regions.len(), 1);
    }

    #[test]
    fn test_overlapping_triggers_in_order() {
        let mut layout = ScenarioLayout::new(60, 40, 24).with_description("A river valley with a small lake");
        let report = enrich_layout(&mut layout);
        assert_eq!(report.applied, vec!["valley", "river", "lake"]);
        assert_eq!(layout.rivers.count, 1);
        assert!(layout.has_kind(BiomeKind::Valley));
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let mut layout = ScenarioLayout::new(32, 32, 16)
            .with_description("A prevalent, bogus response from the coastguard")
            .with_region(BiomeRegion::new(BiomeKind::Desert, [0, 0, 32, 32]));
        assert!(enrich_layout(&mut layout).applied.is_empty());
        assert_eq!(layout.regions.len(), 1);

        let mut layout = ScenarioLayout::new(32, 32, 16).with_description("Marshy creeks and ponds");
        let report = enrich_layout(&mut layout);
        assert_eq!(report.applied, vec!["river", "lake", "swamp"]);
    }

    #[test]
    fn test_island_keeps_land_on_top() {
        let mut layout = ScenarioLayout::new(40, 40, 16)
            .with_description("tropical island")
            .with_region(BiomeRegion::new(BiomeKind::Jungle, [0, 0, 40, 40]));
        let report = enrich_layout(&mut layout);
        assert!(report.fired("island"));
        assert_eq!(layout.regions[0].kind, BiomeKind::Ocean);
        let jungle = layout.regions.iter().find(|r| r.kind == BiomeKind::Jungle).unwrap();
        assert!(!jungle.contains(0, 0));
        assert!(jungle.contains(20, 20));
    }
}
