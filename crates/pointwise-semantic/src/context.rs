//! Context inference from substring patterns in a normalized name.
//!
//! Used to bias quantity, substance, equipment and location tagging when
//! units and other metadata are weak or absent. Triggers are independent: a
//! name can match both `temp` and `return`.

use pointwise_core::{Quantity, Substance};
use serde::Serialize;

/// Confidence reported when no trigger matches.
pub const NO_MATCH_CONFIDENCE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Quantity(Quantity),
    Substance(Substance),
    Equipment,
    Location,
    Marker,
}

struct Trigger {
    needles: &'static [&'static str],
    pattern: &'static str,
    weight: f32,
    kind: PatternKind,
}

const fn trigger(
    needles: &'static [&'static str],
    pattern: &'static str,
    weight: f32,
    kind: PatternKind,
) -> Trigger {
    Trigger { needles, pattern, weight, kind }
}

const TRIGGERS: &[Trigger] = &[
    trigger(&["temp"], "temp", 0.20, PatternKind::Quantity(Quantity::Temp)),
    trigger(&["humid"], "humidity", 0.20, PatternKind::Quantity(Quantity::Humidity)),
    trigger(&["pressure"], "pressure", 0.20, PatternKind::Quantity(Quantity::Pressure)),
    trigger(&["flow"], "flow", 0.20, PatternKind::Quantity(Quantity::Flow)),
    trigger(&["co2"], "co2", 0.20, PatternKind::Quantity(Quantity::Co2)),
    trigger(&["speed"], "speed", 0.15, PatternKind::Quantity(Quantity::Speed)),
    trigger(&["power", "demand"], "power", 0.15, PatternKind::Quantity(Quantity::Power)),
    trigger(&["energy"], "energy", 0.15, PatternKind::Quantity(Quantity::Energy)),
    trigger(&["current"], "current", 0.15, PatternKind::Quantity(Quantity::Current)),
    trigger(&["voltage"], "volt", 0.15, PatternKind::Quantity(Quantity::Volt)),
    trigger(&["frequency"], "freq", 0.15, PatternKind::Quantity(Quantity::Freq)),
    trigger(&["air"], "air", 0.10, PatternKind::Substance(Substance::Air)),
    trigger(&["water"], "water", 0.10, PatternKind::Substance(Substance::Water)),
    trigger(&["steam"], "steam", 0.10, PatternKind::Substance(Substance::Steam)),
    trigger(&["supply", "discharge"], "discharge", 0.15, PatternKind::Location),
    trigger(&["return"], "return", 0.15, PatternKind::Location),
    trigger(&["outside", "outdoor"], "outside", 0.15, PatternKind::Location),
    trigger(&["mixed"], "mixed", 0.15, PatternKind::Location),
    trigger(&["exhaust"], "exhaust", 0.15, PatternKind::Location),
    trigger(&["zone", "room", "space"], "zone", 0.15, PatternKind::Location),
    trigger(&["fan"], "fan", 0.15, PatternKind::Equipment),
    trigger(&["damper"], "damper", 0.15, PatternKind::Equipment),
    trigger(&["valve"], "valve", 0.15, PatternKind::Equipment),
    trigger(&["coil"], "coil", 0.10, PatternKind::Equipment),
    trigger(&["filter"], "filter", 0.10, PatternKind::Equipment),
    trigger(&["occup"], "occ", 0.15, PatternKind::Marker),
    trigger(&["alarm", "fault"], "alarm", 0.10, PatternKind::Marker),
    trigger(&["enable"], "enable", 0.10, PatternKind::Marker),
    trigger(&["heating", "reheat"], "heating", 0.10, PatternKind::Marker),
    trigger(&["cooling"], "cooling", 0.10, PatternKind::Marker),
    trigger(&["economizer"], "economizer", 0.10, PatternKind::Marker),
    trigger(&["level"], "level", 0.10, PatternKind::Marker),
];

/// One trigger that fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextMatch {
    pub pattern: &'static str,
    pub kind: PatternKind,
    pub weight: f32,
}

/// What the name alone suggests about a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredContext {
    /// First quantity trigger that fired.
    pub quantity: Option<Quantity>,
    pub substance: Option<Substance>,
    pub equipment_hint: Option<&'static str>,
    pub location_hint: Option<&'static str>,
    /// Every trigger that fired, in trigger order.
    pub matches: Vec<ContextMatch>,
    pub confidence: f32,
}

impl InferredContext {
    /// Pattern tags in trigger order.
    pub fn patterns(&self) -> Vec<&'static str> {
        self.matches.iter().map(|m| m.pattern).collect()
    }

    pub fn of_kind(&self, pred: impl Fn(&PatternKind) -> bool) -> impl Iterator<Item = &ContextMatch> {
        self.matches.iter().filter(move |m| pred(&m.kind))
    }
}

/// Scan a normalized name for context triggers.
pub fn infer_context(normalized_name: &str) -> InferredContext {
    let lower = normalized_name.to_lowercase();

    let matches: Vec<ContextMatch> = TRIGGERS
        .iter()
        .filter(|t| t.needles.iter().any(|n| lower.contains(n)))
        .map(|t| ContextMatch {
            pattern: t.pattern,
            kind: t.kind,
            weight: t.weight,
        })
        .collect();

    let quantity = matches.iter().find_map(|m| match m.kind {
        PatternKind::Quantity(q) => Some(q),
        _ => None,
    });
    let substance = matches.iter().find_map(|m| match m.kind {
        PatternKind::Substance(s) => Some(s),
        _ => None,
    });
    let equipment_hint = matches
        .iter()
        .find(|m| m.kind == PatternKind::Equipment)
        .map(|m| m.pattern);
    let location_hint = matches
        .iter()
        .find(|m| m.kind == PatternKind::Location)
        .map(|m| m.pattern);

    let confidence = if matches.is_empty() {
        NO_MATCH_CONFIDENCE
    } else {
        matches.iter().map(|m| m.weight).sum::<f32>().min(1.0)
    };

    InferredContext {
        quantity,
        substance,
        equipment_hint,
        location_hint,
        matches,
        confidence,
    }
}
