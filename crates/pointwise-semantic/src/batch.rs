//! Parallel batch drivers.
//!
//! Each point is independent, so batches fan out over rayon's pool. Results
//! come back in input order and a failed point never aborts the batch.

use pointwise_core::{HaystackTagSet, NormalizeError, NormalizedPoint, RawPoint};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::normalizer::Normalizer;
use crate::tagger::TagGenerator;

/// Outcome for one input, keyed by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem<T, E> {
    pub identifier: String,
    pub outcome: Result<T, E>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of<T, E>(items: &[BatchItem<T, E>]) -> Self {
        let failed = items.iter().filter(|i| i.outcome.is_err()).count();
        Self {
            total: items.len(),
            succeeded: items.len() - failed,
            failed,
        }
    }
}

/// Normalize every point in parallel.
pub fn normalize_batch(
    normalizer: &Normalizer,
    points: &[RawPoint],
    equipment_hint: Option<&str>,
) -> Vec<BatchItem<NormalizedPoint, NormalizeError>> {
    let items: Vec<_> = points
        .par_iter()
        .map(|raw| {
            let outcome = normalizer.normalize(raw, equipment_hint);
            if let Err(e) = &outcome {
                warn!(identifier = %raw.identifier, error = %e, "point skipped");
            }
            BatchItem {
                identifier: raw.identifier.clone(),
                outcome,
            }
        })
        .collect();

    let summary = BatchSummary::of(&items);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "normalized batch"
    );
    items
}

/// Tag every point in parallel. Tagging never fails, so the output lines up
/// one-to-one with the input.
pub fn tag_batch(generator: &TagGenerator, points: &[NormalizedPoint]) -> Vec<HaystackTagSet> {
    let sets: Vec<HaystackTagSet> = points.par_iter().map(|p| generator.generate(p)).collect();
    let flagged = sets.iter().filter(|s| !s.warnings.is_empty()).count();
    info!(total = sets.len(), flagged, "tagged batch");
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointwise_core::ObjectType;

    fn raw_points() -> Vec<RawPoint> {
        vec![
            RawPoint::new("SA_TS", ObjectType::AnalogInput).with_units("°F"),
            RawPoint::new("", ObjectType::AnalogInput),
            RawPoint::new("SF_STS", ObjectType::BinaryInput),
            RawPoint::new("ZN_TEMP_SP", ObjectType::AnalogValue).writable(true),
        ]
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let items = normalize_batch(&Normalizer::default(), &raw_points(), Some("AHU-1"));
        assert_eq!(items.len(), 4);
        assert_eq!(items[1].outcome, Err(NormalizeError::EmptyIdentifier));
        assert_eq!(
            BatchSummary::of(&items),
            BatchSummary { total: 4, succeeded: 3, failed: 1 }
        );
    }

    #[test]
    fn results_keep_input_order() {
        let items = normalize_batch(&Normalizer::default(), &raw_points(), Some("AHU-1"));
        let ids: Vec<_> = items.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["SA_TS", "", "SF_STS", "ZN_TEMP_SP"]);
        assert_eq!(
            items[0].outcome.as_ref().unwrap().normalized_name,
            "Supply Air Temperature"
        );
    }

    #[test]
    fn batch_matches_single_point_results() {
        let normalizer = Normalizer::default();
        let generator = TagGenerator::default();
        let points: Vec<NormalizedPoint> = normalize_batch(&normalizer, &raw_points(), Some("AHU"))
            .into_iter()
            .filter_map(|i| i.outcome.ok())
            .collect();
        let sets = tag_batch(&generator, &points);
        assert_eq!(sets.len(), points.len());
        for (point, set) in points.iter().zip(&sets) {
            assert_eq!(set.names(), generator.generate(point).names());
        }
    }

    #[test]
    fn empty_batch() {
        let items = normalize_batch(&Normalizer::default(), &[], None);
        assert!(items.is_empty());
        assert_eq!(BatchSummary::of(&items), BatchSummary::default());
        assert!(tag_batch(&TagGenerator::default(), &[]).is_empty());
    }
}
