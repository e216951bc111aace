//! Signature generation for observed points and authored templates.

use std::collections::BTreeSet;

use pointwise_core::units::lookup_unit;
use pointwise_core::{NormalizedPoint, PointSignature, Quantity, SignatureError, SignatureStats};
use pointwise_semantic::infer_context;

use crate::pattern::WildcardPattern;

/// Words that carry no information for matching.
const CONNECTORS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "from", "in", "of", "on", "or", "the", "to", "with",
];

/// Significant keywords of a name, lower-cased, in first-seen order.
///
/// Numeric tokens, single characters and connector words are dropped.
pub fn keywords_of(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_lowercase)
        .filter(|w| !CONNECTORS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Physical quantity of an observed point: unit table first, then the name.
pub fn observed_quantity(point: &NormalizedPoint) -> Option<Quantity> {
    point
        .units
        .as_deref()
        .and_then(lookup_unit)
        .map(|u| u.quantity)
        .or_else(|| infer_context(&point.normalized_name).quantity)
}

/// Build the signature of a normalized point.
///
/// `is_required` only means something when the signature is used on the
/// template side of a match.
pub fn to_signature(
    point: &NormalizedPoint,
    is_required: bool,
) -> Result<PointSignature, SignatureError> {
    let keywords = keywords_of(&point.normalized_name);
    if keywords.is_empty() {
        return Err(SignatureError::Empty(point.original_name.clone()));
    }

    let pattern = format!("*{}*", keywords.join("*").to_uppercase());

    Ok(PointSignature {
        id: point.original_name.clone(),
        pattern,
        normalized_pattern: keywords.join("_"),
        point_function: Some(point.point_function),
        object_type: Some(point.object_type),
        quantity: observed_quantity(point),
        units: point.units.clone(),
        keywords: keywords.into_iter().collect(),
        is_required,
        stats: SignatureStats::default(),
    })
}

/// Build a template signature from an authored wildcard pattern.
///
/// Role, object type, quantity and units start unset; callers fill in what
/// the template states.
pub fn author_signature(
    id: &str,
    pattern: &str,
    is_required: bool,
) -> Result<PointSignature, SignatureError> {
    let compiled = WildcardPattern::compile(pattern)?;
    let keywords = keywords_of(&compiled.literals().collect::<Vec<_>>().join(" "));

    Ok(PointSignature {
        id: id.to_string(),
        pattern: compiled.as_str().to_string(),
        normalized_pattern: keywords.join("_"),
        point_function: None,
        object_type: None,
        quantity: None,
        units: None,
        keywords: keywords.into_iter().collect(),
        is_required,
        stats: SignatureStats::default(),
    })
}
