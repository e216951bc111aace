//! Owned match-statistics accumulator.
//!
//! Matching never mutates a template. Each run records into its own
//! `MatchStatistics`; accumulators from concurrent runs are merged and then
//! applied to the library in one step.

use std::collections::BTreeMap;

use pointwise_core::{PointSignature, SignatureStats};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignatureTally {
    pub attempts: u64,
    pub successful: u64,
    pub confidence_sum: f64,
}

impl SignatureTally {
    fn add(&mut self, other: &SignatureTally) {
        self.attempts += other.attempts;
        self.successful += other.successful;
        self.confidence_sum += other.confidence_sum;
    }
}

/// Per-signature tallies keyed by signature id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStatistics {
    tallies: BTreeMap<String, SignatureTally>,
}

impl MatchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one match attempt for a signature.
    pub fn record(&mut self, signature_id: &str, confidence: f32, successful: bool) {
        let tally = self.tallies.entry(signature_id.to_string()).or_default();
        tally.attempts += 1;
        if successful {
            tally.successful += 1;
        }
        tally.confidence_sum += f64::from(confidence);
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &MatchStatistics) {
        for (id, tally) in &other.tallies {
            self.tallies.entry(id.clone()).or_default().add(tally);
        }
    }

    pub fn get(&self, signature_id: &str) -> Option<&SignatureTally> {
        self.tallies.get(signature_id)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignatureTally)> {
        self.tallies.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply this signature's tally to its running statistics. Returns
    /// whether anything was recorded for it.
    pub fn apply_to(&self, signature: &mut PointSignature) -> bool {
        let Some(tally) = self.tallies.get(&signature.id) else {
            return false;
        };
        if tally.attempts == 0 {
            return false;
        }
        let SignatureStats {
            match_count,
            successful_matches,
            avg_confidence,
        } = signature.stats;

        let total = match_count + tally.attempts;
        let sum = f64::from(avg_confidence) * match_count as f64 + tally.confidence_sum;
        signature.stats = SignatureStats {
            match_count: total,
            successful_matches: successful_matches + tally.successful,
            avg_confidence: (sum / total as f64) as f32,
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::author_signature;

    #[test]
    fn record_and_merge() {
        let mut a = MatchStatistics::new();
        a.record("zone_temp", 1.0, true);
        a.record("zone_temp", 0.6, false);

        let mut b = MatchStatistics::new();
        b.record("zone_temp", 0.8, true);
        b.record("damper", 0.9, true);

        a.merge(&b);
        let zt = a.get("zone_temp").unwrap();
        assert_eq!(zt.attempts, 3);
        assert_eq!(zt.successful, 2);
        assert!((zt.confidence_sum - 2.4).abs() < 1e-6);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn merge_is_order_independent() {
        let mut a = MatchStatistics::new();
        a.record("x", 0.5, false);
        let mut b = MatchStatistics::new();
        b.record("y", 0.75, true);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn apply_keeps_a_running_average() {
        let mut sig = author_signature("zone_temp", "*ROOM*TEMP*", true).unwrap();
        sig.stats = SignatureStats {
            match_count: 2,
            successful_matches: 2,
            avg_confidence: 0.9,
        };

        let mut stats = MatchStatistics::new();
        stats.record("zone_temp", 0.6, false);
        assert!(stats.apply_to(&mut sig));

        assert_eq!(sig.stats.match_count, 3);
        assert_eq!(sig.stats.successful_matches, 2);
        assert!((sig.stats.avg_confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn apply_ignores_unknown_signatures() {
        let mut sig = author_signature("damper", "*DAMPER*", false).unwrap();
        let stats = MatchStatistics::new();
        assert!(!stats.apply_to(&mut sig));
        assert_eq!(sig.stats, SignatureStats::default());
    }
}
