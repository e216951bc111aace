//! Recommendations derived from a match's gap analysis.

use std::fmt;

use serde::Serialize;

/// One follow-up action for a technician reviewing a template application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// A required template signature found no observed point.
    MissingRequired { signature: String, pattern: String },
    /// An optional template signature found no observed point.
    MissingOptional { signature: String, pattern: String },
    /// A pairing was made but at or below the confidence threshold.
    LowConfidence {
        signature: String,
        observed: String,
        confidence: f32,
    },
    /// An observed point no template signature claimed.
    UnmappedPoint { observed: String, name: String },
}

impl Recommendation {
    /// Required gaps first, then weak matches, then optional gaps, then surplus.
    pub fn severity(&self) -> u8 {
        match self {
            Self::MissingRequired { .. } => 0,
            Self::LowConfidence { .. } => 1,
            Self::MissingOptional { .. } => 2,
            Self::UnmappedPoint { .. } => 3,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingRequired { .. } => "missing_required",
            Self::MissingOptional { .. } => "missing_optional",
            Self::LowConfidence { .. } => "low_confidence",
            Self::UnmappedPoint { .. } => "unmapped_point",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired { signature, pattern } => {
                write!(f, "add a point for required signature `{signature}` ({pattern})")
            }
            Self::MissingOptional { signature, pattern } => {
                write!(f, "optional signature `{signature}` ({pattern}) has no point")
            }
            Self::LowConfidence {
                signature,
                observed,
                confidence,
            } => write!(
                f,
                "review `{observed}` for `{signature}`: confidence {confidence:.2}"
            ),
            Self::UnmappedPoint { observed, name } => {
                write!(f, "point `{observed}` ({name}) is not covered by the template")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_kind() {
        let r = Recommendation::LowConfidence {
            signature: "zone_temp".into(),
            observed: "ZN_T".into(),
            confidence: 0.634,
        };
        assert_eq!(r.to_string(), "review `ZN_T` for `zone_temp`: confidence 0.63");
        assert_eq!(r.kind(), "low_confidence");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let r = Recommendation::MissingRequired {
            signature: "zone_temp".into(),
            pattern: "*ROOM*TEMP*".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["kind"], "missing_required");
        assert_eq!(json["signature"], "zone_temp");
    }

    #[test]
    fn severity_order() {
        let missing = Recommendation::MissingRequired {
            signature: "a".into(),
            pattern: "*A*".into(),
        };
        let unmapped = Recommendation::UnmappedPoint {
            observed: "X".into(),
            name: "X".into(),
        };
        assert!(missing.severity() < unmapped.severity());
    }
}
