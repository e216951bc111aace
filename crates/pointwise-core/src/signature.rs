//! Point signatures and template match results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::point::{NormalizedPoint, ObjectType, PointFunction};
use crate::units::Quantity;

/// Running usage statistics for a template signature.
///
/// Only updated at the template-library level, from an owned accumulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureStats {
    pub match_count: u64,
    pub successful_matches: u64,
    pub avg_confidence: f32,
}

/// Compact, pattern-matchable description of a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSignature {
    /// Stable identifier: the template author's id, or the observed point's
    /// original name.
    pub id: String,
    /// Case-insensitive wildcard pattern, e.g. `*ROOM*TEMP*`.
    pub pattern: String,
    /// Keywords joined with `_`, e.g. `room_temp`.
    pub normalized_pattern: String,
    #[serde(default)]
    pub point_function: Option<PointFunction>,
    /// Carried for authoring and export; confidence does not use it.
    #[serde(default)]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub units: Option<String>,
    pub keywords: BTreeSet<String>,
    /// Template authoring flag; meaningless on the observed side.
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub stats: SignatureStats,
}

impl PointSignature {
    /// Literal (non-wildcard) characters in the pattern. Higher is more specific.
    pub fn specificity(&self) -> usize {
        self.pattern.chars().filter(|c| *c != '*').count()
    }
}

/// One template signature paired with one observed point.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateMatch<'a> {
    pub exact_match: bool,
    /// Never true together with `exact_match`.
    pub partial_match: bool,
    pub confidence: f32,
    pub template: &'a PointSignature,
    pub observed: &'a NormalizedPoint,
}
