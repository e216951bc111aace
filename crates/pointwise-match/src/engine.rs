//! Template matching engine.
//!
//! Every (template signature, observed point) pair is scored independently,
//! then pairs are assigned one-to-one in a fixed total order. Nothing about
//! the result depends on the order of either input list.

use std::cmp::Ordering;

use pointwise_core::units::units_agree;
use pointwise_core::{
    MatchingConfig, NormalizedPoint, PipelineConfig, PointSignature, Quantity, SignatureError,
    TemplateMatch,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::pattern::WildcardPattern;
use crate::recommend::Recommendation;
use crate::signature::{keywords_of, observed_quantity};
use crate::stats::MatchStatistics;

/// Share of a pair's confidence that comes from the pattern itself; the
/// rest comes from role, quantity and unit agreement.
const PATTERN_WEIGHT: f32 = 0.6;

/// Stems shorter than this only match whole keywords.
const MIN_STEM_LEN: usize = 3;

/// Result of matching one template against one equipment's points.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport<'a> {
    /// One-to-one pairings, sorted by template id then observed identifier.
    pub matches: Vec<TemplateMatch<'a>>,
    pub aggregate_confidence: f32,
    /// Required signatures matched above the threshold, over all required.
    pub required_match_rate: f32,
    /// Signatures matched above the threshold, over all signatures.
    pub total_match_rate: f32,
    pub unmatched_templates: Vec<&'a PointSignature>,
    pub unmatched_points: Vec<&'a NormalizedPoint>,
    pub recommendations: Vec<Recommendation>,
}

impl MatchReport<'_> {
    /// Match for a template signature id, if one was assigned.
    pub fn match_for(&self, signature_id: &str) -> Option<&TemplateMatch<'_>> {
        self.matches.iter().find(|m| m.template.id == signature_id)
    }

    /// (template id, observed identifier, confidence) triples.
    pub fn pairings(&self) -> Vec<(&str, &str, f32)> {
        self.matches
            .iter()
            .map(|m| (m.template.id.as_str(), m.observed.original_name.as_str(), m.confidence))
            .collect()
    }
}

/// Observed-side values derived once per point.
struct Observed<'a> {
    point: &'a NormalizedPoint,
    keywords: Vec<String>,
    keyword_join: String,
    quantity: Option<Quantity>,
}

impl<'a> Observed<'a> {
    fn new(point: &'a NormalizedPoint) -> Self {
        let keywords = keywords_of(&point.normalized_name);
        let keyword_join = keywords.join(" ");
        Self {
            point,
            keywords,
            keyword_join,
            quantity: observed_quantity(point),
        }
    }
}

/// A scored pair, by index into the caller's slices.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    template: usize,
    observed: usize,
    exact: bool,
    confidence: f32,
}

#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchingConfig,
}

impl MatchEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.matching.clone())
    }

    /// Override the success threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.config.confidence_threshold
    }

    /// Match template signatures against observed points.
    ///
    /// Fails only when a template pattern does not compile.
    pub fn match_template<'a>(
        &self,
        templates: &'a [PointSignature],
        observed: &'a [NormalizedPoint],
    ) -> Result<MatchReport<'a>, SignatureError> {
        let patterns = templates
            .iter()
            .map(|t| WildcardPattern::compile(&t.pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let views: Vec<Observed<'a>> = observed.iter().map(Observed::new).collect();

        let mut candidates: Vec<Candidate> = templates
            .par_iter()
            .enumerate()
            .flat_map_iter(|(ti, template)| {
                let pattern = &patterns[ti];
                views.iter().enumerate().filter_map(move |(oi, view)| {
                    self.score(template, pattern, view).map(|(exact, confidence)| Candidate {
                        template: ti,
                        observed: oi,
                        exact,
                        confidence,
                    })
                })
            })
            .collect();
        candidates.sort_by(|a, b| rank(a, b, templates, observed));

        let mut template_taken = vec![false; templates.len()];
        let mut point_taken = vec![false; observed.len()];
        let mut matches = Vec::new();
        for c in candidates {
            if template_taken[c.template] || point_taken[c.observed] {
                continue;
            }
            template_taken[c.template] = true;
            point_taken[c.observed] = true;
            matches.push(TemplateMatch {
                exact_match: c.exact,
                partial_match: !c.exact,
                confidence: c.confidence,
                template: &templates[c.template],
                observed: &observed[c.observed],
            });
        }
        matches.sort_by(|a, b| {
            a.template
                .id
                .cmp(&b.template.id)
                .then_with(|| a.observed.original_name.cmp(&b.observed.original_name))
        });

        let mut unmatched_templates: Vec<&PointSignature> = templates
            .iter()
            .zip(&template_taken)
            .filter(|(_, taken)| !**taken)
            .map(|(t, _)| t)
            .collect();
        unmatched_templates.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.pattern.cmp(&b.pattern)));

        let mut unmatched_points: Vec<&NormalizedPoint> = observed
            .iter()
            .zip(&point_taken)
            .filter(|(_, taken)| !**taken)
            .map(|(p, _)| p)
            .collect();
        unmatched_points.sort_by(|a, b| {
            a.original_name
                .cmp(&b.original_name)
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
                .then_with(|| a.object_type.cmp(&b.object_type))
                .then_with(|| a.units.cmp(&b.units))
        });

        let report = self.report(templates, matches, unmatched_templates, unmatched_points);
        info!(
            templates = templates.len(),
            observed = observed.len(),
            matched = report.matches.len(),
            aggregate = report.aggregate_confidence,
            "template matched"
        );
        Ok(report)
    }

    /// Match and record every template signature into `stats`. Unmatched
    /// signatures count as an unsuccessful attempt at zero confidence.
    pub fn match_with_stats<'a>(
        &self,
        templates: &'a [PointSignature],
        observed: &'a [NormalizedPoint],
        stats: &mut MatchStatistics,
    ) -> Result<MatchReport<'a>, SignatureError> {
        let report = self.match_template(templates, observed)?;
        for m in &report.matches {
            stats.record(&m.template.id, m.confidence, m.confidence > self.threshold());
        }
        for t in &report.unmatched_templates {
            stats.record(&t.id, 0.0, false);
        }
        Ok(report)
    }

    fn score(
        &self,
        template: &PointSignature,
        pattern: &WildcardPattern,
        view: &Observed<'_>,
    ) -> Option<(bool, f32)> {
        let exact = pattern.is_match(&view.point.normalized_name)
            || pattern.is_match(&view.point.original_name)
            || pattern.is_match(&view.keyword_join);

        let strength = if exact {
            1.0
        } else {
            let similarity = keyword_similarity(&template.keywords, &view.keywords);
            if similarity < self.config.partial_similarity || similarity == 0.0 {
                return None;
            }
            similarity
        };

        let confidence =
            (PATTERN_WEIGHT * strength + (1.0 - PATTERN_WEIGHT) * agreement(template, view)).clamp(0.0, 1.0);
        debug!(
            template = %template.id,
            observed = %view.point.original_name,
            exact,
            confidence,
            "candidate pair"
        );
        Some((exact, confidence))
    }

    fn report<'a>(
        &self,
        templates: &'a [PointSignature],
        matches: Vec<TemplateMatch<'a>>,
        unmatched_templates: Vec<&'a PointSignature>,
        unmatched_points: Vec<&'a NormalizedPoint>,
    ) -> MatchReport<'a> {
        let threshold = self.threshold();
        let successful = |m: &&TemplateMatch<'_>| m.confidence > threshold;

        let required_total = templates.iter().filter(|t| t.is_required).count();
        let required_hit = matches
            .iter()
            .filter(|m| m.template.is_required)
            .filter(successful)
            .count();
        let required_match_rate = rate(required_hit, required_total);
        let total_match_rate = rate(matches.iter().filter(successful).count(), templates.len());

        let aggregate_confidence = if matches.is_empty() {
            if required_total == 0 { 1.0 } else { 0.0 }
        } else {
            let mean = matches.iter().map(|m| m.confidence).sum::<f32>() / matches.len() as f32;
            let w = self.config.required_weight;
            (w * required_match_rate + (1.0 - w) * mean).clamp(0.0, 1.0)
        };

        let mut recommendations: Vec<Recommendation> = Vec::new();
        for t in &unmatched_templates {
            let signature = t.id.clone();
            let pattern = t.pattern.clone();
            recommendations.push(if t.is_required {
                Recommendation::MissingRequired { signature, pattern }
            } else {
                Recommendation::MissingOptional { signature, pattern }
            });
        }
        for m in matches.iter().filter(|m| m.confidence <= threshold) {
            recommendations.push(Recommendation::LowConfidence {
                signature: m.template.id.clone(),
                observed: m.observed.original_name.clone(),
                confidence: m.confidence,
            });
        }
        for p in &unmatched_points {
            recommendations.push(Recommendation::UnmappedPoint {
                observed: p.original_name.clone(),
                name: p.normalized_name.clone(),
            });
        }
        recommendations.sort_by_key(Recommendation::severity);

        MatchReport {
            matches,
            aggregate_confidence,
            required_match_rate,
            total_match_rate,
            unmatched_templates,
            unmatched_points,
            recommendations,
        }
    }
}

/// Assignment order: exact before partial, required before optional, then
/// confidence, then the more specific pattern, then ids and the remaining
/// point attributes, so equal scores resolve the same way regardless of
/// input order.
fn rank(
    a: &Candidate,
    b: &Candidate,
    templates: &[PointSignature],
    observed: &[NormalizedPoint],
) -> Ordering {
    let (ta, tb) = (&templates[a.template], &templates[b.template]);
    let (oa, ob) = (&observed[a.observed], &observed[b.observed]);
    b.exact
        .cmp(&a.exact)
        .then_with(|| tb.is_required.cmp(&ta.is_required))
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| tb.specificity().cmp(&ta.specificity()))
        .then_with(|| ta.id.cmp(&tb.id))
        .then_with(|| oa.original_name.cmp(&ob.original_name))
        .then_with(|| ta.pattern.cmp(&tb.pattern))
        .then_with(|| oa.normalized_name.cmp(&ob.normalized_name))
        .then_with(|| oa.object_type.cmp(&ob.object_type))
        .then_with(|| oa.units.cmp(&ob.units))
        .then_with(|| oa.writable.cmp(&ob.writable))
}

fn rate(hit: usize, total: usize) -> f32 {
    if total == 0 { 1.0 } else { hit as f32 / total as f32 }
}

/// Keywords match when equal or when one is a prefix of the other and both
/// are at least `MIN_STEM_LEN` long (`temp` / `temperature`).
fn keywords_related(a: &str, b: &str) -> bool {
    a == b
        || (a.len() >= MIN_STEM_LEN
            && b.len() >= MIN_STEM_LEN
            && (a.starts_with(b) || b.starts_with(a)))
}

/// Template keywords found among the observed keywords, over the size of the
/// larger set.
fn keyword_similarity<'k>(
    template: impl IntoIterator<Item = &'k String>,
    observed: &[String],
) -> f32 {
    let template: Vec<&String> = template.into_iter().collect();
    let longer = template.len().max(observed.len());
    if longer == 0 {
        return 0.0;
    }
    let common = template
        .iter()
        .filter(|t| observed.iter().any(|o| keywords_related(t, o)))
        .count();
    common as f32 / longer as f32
}

/// Mean agreement over whatever the template states; 1.0 when it states
/// nothing.
fn agreement(template: &PointSignature, view: &Observed<'_>) -> f32 {
    let mut checks: Vec<bool> = Vec::with_capacity(3);
    if let Some(f) = template.point_function {
        checks.push(f == view.point.point_function);
    }
    if let Some(q) = template.quantity {
        checks.push(view.quantity == Some(q));
    }
    if let Some(u) = &template.units {
        checks.push(view.point.units.as_deref().is_some_and(|o| units_agree(u, o)));
    }
    if checks.is_empty() {
        return 1.0;
    }
    checks.iter().filter(|ok| **ok).count() as f32 / checks.len() as f32
}
