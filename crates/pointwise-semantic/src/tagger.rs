//! Haystack tag generation.
//!
//! Stages run in a fixed order and only ever add tags and confidence:
//! base marker, role, quantity and substance, equipment, location, semantic
//! merge, value tags, explicit tags. The set is then sorted by category and
//! checked by the consistency validator.

use pointwise_core::units::lookup_unit;
use pointwise_core::{
    ExplicitTag, HaystackTagSet, NormalizedPoint, PipelineConfig, Quantity, Substance, TagCategory,
    TagError, TagSource, TagValue, TaggingConfig,
};
use tracing::{debug, warn};

use crate::context::{InferredContext, PatternKind, infer_context};
use crate::validator::validate_tags;

// ── Per-stage confidence contributions ──

const BASE_WEIGHT: f32 = 0.10;
const ROLE_WEIGHT: f32 = 0.30;
const UNIT_QUANTITY_WEIGHT: f32 = 0.25;
const CONTEXT_QUANTITY_WEIGHT: f32 = 0.15;
const SUBSTANCE_WEIGHT: f32 = 0.10;
const EQUIPMENT_WEIGHT: f32 = 0.15;
const COMPONENT_WEIGHT: f32 = 0.05;
const FIRST_LOCATION_WEIGHT: f32 = 0.10;
const LOCATION_WEIGHT: f32 = 0.05;
const SEMANTIC_WEIGHT: f32 = 0.05;
const EXPLICIT_CONFIDENCE: f32 = 1.0;

/// Confidence-weighted additions, summed across stages.
struct Builder {
    set: HaystackTagSet,
    confidence: f32,
}

impl Builder {
    fn marker(&mut self, name: &str, category: TagCategory, weight: f32) -> Result<(), TagError> {
        if self.set.insert_marker(name, category, weight)? {
            self.confidence += weight;
        }
        Ok(())
    }

    fn value(&mut self, name: &str, value: TagValue) -> Result<(), TagError> {
        self.set
            .insert(name, value, TagCategory::Custom, BASE_WEIGHT, TagSource::Inferred)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct TagGenerator {
    config: TaggingConfig,
}

impl TagGenerator {
    pub fn new(config: TaggingConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.tagging.clone())
    }

    /// Generate the tag set for a normalized point. Never fails.
    pub fn generate(&self, point: &NormalizedPoint) -> HaystackTagSet {
        self.generate_with_explicit(point, &[])
    }

    /// Generate tags and merge caller-supplied explicit tags.
    ///
    /// Inferred tags are inserted first, so an explicit tag with the same name
    /// is ignored. An explicit tag that conflicts (a second role, a second
    /// substance) is kept and reported in `warnings`.
    pub fn generate_with_explicit(
        &self,
        point: &NormalizedPoint,
        explicit: &[ExplicitTag],
    ) -> HaystackTagSet {
        match self.try_generate(point, explicit) {
            Ok(set) => set,
            Err(e) => {
                warn!(
                    point = %point.original_name,
                    error = %e,
                    "tag generation failed, using minimal tag set"
                );
                HaystackTagSet::degraded(e.to_string())
            }
        }
    }

    fn try_generate(
        &self,
        point: &NormalizedPoint,
        explicit: &[ExplicitTag],
    ) -> Result<HaystackTagSet, TagError> {
        let context = infer_context(&point.normalized_name);
        let mut b = Builder {
            set: HaystackTagSet::new(),
            confidence: 0.0,
        };

        // 1. Base marker.
        b.marker("point", TagCategory::Custom, BASE_WEIGHT)?;

        // 2. Role.
        if let Some(role) = point.point_function.role_tag() {
            b.marker(role, TagCategory::Role, ROLE_WEIGHT)?;
        }
        if point.writable {
            b.set.insert_marker("writable", TagCategory::Custom, BASE_WEIGHT)?;
        }

        // 3. Quantity and substance.
        let unit = point.units.as_deref().and_then(lookup_unit);
        let quantity = match (unit, context.quantity) {
            (Some(info), _) => {
                b.marker(info.quantity.tag(), TagCategory::Quantity, UNIT_QUANTITY_WEIGHT)?;
                Some(info.quantity)
            }
            (None, Some(q)) => {
                b.marker(q.tag(), TagCategory::Quantity, CONTEXT_QUANTITY_WEIGHT)?;
                Some(q)
            }
            (None, None) => None,
        };
        let substance = unit
            .and_then(|u| u.substance)
            .or(context.substance)
            .or_else(|| default_substance(point, quantity));
        if let Some(s) = substance {
            b.marker(s.tag(), TagCategory::Quantity, SUBSTANCE_WEIGHT)?;
        }

        // 4. Equipment type and components.
        if let Some(eq) = point.equipment_type {
            b.marker(eq.haystack_tag(), TagCategory::Equipment, EQUIPMENT_WEIGHT)?;
        }
        for m in context.of_kind(|k| *k == PatternKind::Equipment) {
            b.marker(m.pattern, TagCategory::Equipment, COMPONENT_WEIGHT)?;
        }

        // 5. Location.
        for (i, m) in context.of_kind(|k| *k == PatternKind::Location).enumerate() {
            let weight = if i == 0 { FIRST_LOCATION_WEIGHT } else { LOCATION_WEIGHT };
            b.marker(m.pattern, TagCategory::Location, weight)?;
        }

        // 6. Semantic merge.
        if self.config.semantic_inference {
            self.merge_semantic(&mut b, &context)?;
        }

        // Value tags.
        b.value("kind", TagValue::Str(point.data_type.haystack_kind().to_string()))?;
        if let Some(units) = &point.units {
            b.value("unit", TagValue::Str(units.clone()))?;
        }

        for tag in explicit {
            b.set.insert(
                &tag.name,
                tag.value.clone(),
                tag.category,
                EXPLICIT_CONFIDENCE,
                TagSource::Explicit,
            )?;
        }

        // 7. Deterministic order.
        b.set.sort_by_priority();

        // 8. Consistency.
        let warnings = validate_tags(&b.set);
        let mut confidence = b.confidence.min(1.0);
        if !warnings.is_empty() {
            debug!(point = %point.original_name, ?warnings, "tag set inconsistent");
            if self.config.strict_validation {
                confidence *= 1.0 - self.config.validation_penalty;
            }
        }

        if !confidence.is_finite() {
            return Err(TagError::Internal(format!("non-finite confidence {confidence}")));
        }

        let mut set = b.set;
        set.confidence = confidence.clamp(0.0, 1.0);
        set.warnings = warnings;
        Ok(set)
    }

    /// Context markers (occupancy, alarm, enable, …) not already covered.
    fn merge_semantic(&self, b: &mut Builder, context: &InferredContext) -> Result<(), TagError> {
        for m in context.of_kind(|k| *k == PatternKind::Marker) {
            b.marker(m.pattern, TagCategory::Custom, SEMANTIC_WEIGHT)?;
        }
        Ok(())
    }
}

/// Substance implied by the equipment when nothing else names one.
fn default_substance(point: &NormalizedPoint, quantity: Option<Quantity>) -> Option<Substance> {
    let q = quantity?;
    if matches!(q, Quantity::Power | Quantity::Energy | Quantity::Current | Quantity::Volt) {
        return Some(Substance::Elec);
    }
    if !matches!(
        q,
        Quantity::Temp | Quantity::Flow | Quantity::Pressure | Quantity::Humidity
    ) {
        return None;
    }
    let eq = point.equipment_type?;
    if eq.is_air_side() {
        Some(Substance::Air)
    } else if eq.is_water_side() {
        Some(Substance::Water)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Normalizer;
    use pointwise_core::{ObjectType, RawPoint};

    fn point(raw: RawPoint, hint: Option<&str>) -> NormalizedPoint {
        Normalizer::default().normalize(&raw, hint).unwrap()
    }

    fn tags_for(raw: RawPoint, hint: Option<&str>) -> HaystackTagSet {
        TagGenerator::default().generate(&point(raw, hint))
    }

    #[test]
    fn room_temp_sensor_on_vav() {
        let set = tags_for(
            RawPoint::new("ROOM TEMP_4", ObjectType::AnalogInput).with_units("°F"),
            Some("VAV"),
        );
        assert!(set.contains("sensor"));
        assert!(set.contains("temp"));
        assert!(set.contains("air"));
        assert!(set.contains("vav"));
        assert!(set.contains("zone"));
        assert!(!set.contains("cmd"));
        assert!(!set.contains("sp"));
        assert!(set.warnings.is_empty(), "{:?}", set.warnings);
        assert_eq!(
            set.names(),
            vec!["sensor", "temp", "air", "vav", "zone", "point", "kind", "unit"]
        );
    }

    #[test]
    fn damper_command() {
        let set = tags_for(
            RawPoint::new("DAMPER POS_5", ObjectType::AnalogOutput).with_units("%"),
            None,
        );
        assert!(set.contains("cmd"));
        assert!(set.contains("damper"));
        assert_eq!(set.role_tags(), vec!["cmd"]);
    }

    #[test]
    fn setpoint_role_and_writable() {
        let set = tags_for(
            RawPoint::new("ZN_TEMP_SP", ObjectType::AnalogValue)
                .writable(true)
                .with_units("°F"),
            Some("VAV"),
        );
        assert_eq!(set.role_tags(), vec!["sp"]);
        assert!(set.contains("writable"));
    }

    #[test]
    fn parameter_has_no_role() {
        let set = tags_for(RawPoint::new("OCC_SP", ObjectType::AnalogValue), None);
        assert!(set.role_tags().is_empty());
        assert!(set.contains("occ"));
    }

    #[test]
    fn unit_table_beats_context() {
        // Name says temperature but the unit says flow.
        let set = tags_for(
            RawPoint::new("TEMP_X", ObjectType::AnalogInput).with_units("cfm"),
            None,
        );
        assert!(set.contains("flow"));
        assert!(!set.contains("temp"));
        assert!(set.contains("air"));
    }

    #[test]
    fn water_side_default_substance() {
        let set = tags_for(
            RawPoint::new("LCHWT", ObjectType::AnalogInput).with_units("°F"),
            Some("Chiller-1"),
        );
        assert!(set.contains("temp"));
        assert!(set.contains("water"));
        assert!(set.warnings.is_empty(), "{:?}", set.warnings);
    }

    #[test]
    fn temp_without_substance_warns() {
        let set = tags_for(
            RawPoint::new("XQ_TEMP", ObjectType::AnalogInput).with_units("°C"),
            None,
        );
        assert!(set.contains("temp"));
        assert_eq!(set.warnings.len(), 1);
        assert!(set.warnings[0].contains("`temp`"));
    }

    #[test]
    fn strict_validation_penalizes_warnings() {
        let p = point(
            RawPoint::new("XQ_TEMP", ObjectType::AnalogInput).with_units("°C"),
            None,
        );
        let lenient = TagGenerator::default().generate(&p);
        let strict = TagGenerator::new(TaggingConfig {
            strict_validation: true,
            ..TaggingConfig::default()
        })
        .generate(&p);
        assert!((strict.confidence - lenient.confidence * 0.8).abs() < 1e-6);
    }

    #[test]
    fn explicit_conflicting_role_is_reported() {
        let p = point(
            RawPoint::new("ROOM TEMP_4", ObjectType::AnalogInput).with_units("°F"),
            Some("VAV"),
        );
        let explicit = [ExplicitTag {
            name: "cmd".into(),
            value: TagValue::Marker,
            category: TagCategory::Role,
        }];
        let set = TagGenerator::default().generate_with_explicit(&p, &explicit);
        assert_eq!(set.role_tags(), vec!["sensor", "cmd"]);
        assert_eq!(set.get("cmd").unwrap().source, TagSource::Explicit);
        assert!(set.warnings.iter().any(|w| w.contains("conflicting role tags")));
    }

    #[test]
    fn invalid_explicit_tag_degrades() {
        let p = point(RawPoint::new("SA_TS", ObjectType::AnalogInput), Some("AHU"));
        let explicit = [ExplicitTag {
            name: "Bad Tag".into(),
            value: TagValue::Marker,
            category: TagCategory::Custom,
        }];
        let set = TagGenerator::default().generate_with_explicit(&p, &explicit);
        assert_eq!(set.names(), vec!["point", "error"]);
        assert_eq!(set.confidence, 0.1);
        assert_eq!(set.warnings.len(), 1);
    }

    #[test]
    fn non_finite_confidence_degrades() {
        let p = point(
            RawPoint::new("XQ_TEMP", ObjectType::AnalogInput).with_units("°C"),
            None,
        );
        let generator = TagGenerator::new(TaggingConfig {
            strict_validation: true,
            validation_penalty: f32::NAN,
            ..TaggingConfig::default()
        });
        let set = generator.generate(&p);
        assert_eq!(set.names(), vec!["point", "error"]);
        assert!(set.warnings[0].contains("non-finite"));
    }

    #[test]
    fn semantic_merge_can_be_disabled() {
        let p = point(RawPoint::new("ZN_OCC_ALM", ObjectType::BinaryInput), None);
        let with = TagGenerator::default().generate(&p);
        let without = TagGenerator::new(TaggingConfig {
            semantic_inference: false,
            ..TaggingConfig::default()
        })
        .generate(&p);
        assert!(with.contains("occ"));
        assert!(with.contains("alarm"));
        assert!(!without.contains("occ"));
        assert!(with.confidence > without.confidence);
    }

    #[test]
    fn confidence_is_capped() {
        let set = tags_for(
            RawPoint::new("SA_RA_OA_MA_EA_ZN_FAN_DMPR_VLV_COIL_FLTR_OCC_ALM_TEMP", ObjectType::AnalogInput)
                .with_units("°F"),
            Some("AHU"),
        );
        assert!(set.confidence <= 1.0);
    }

    #[test]
    fn at_most_one_role_without_explicit_tags() {
        for ot in ObjectType::ALL {
            for writable in [false, true] {
                let set = tags_for(RawPoint::new("ZN_TEMP", ot).writable(writable), Some("VAV"));
                assert!(set.role_tags().len() <= 1, "{ot} writable={writable}");
            }
        }
    }

    #[test]
    fn tag_order_is_deterministic() {
        let p = point(
            RawPoint::new("SA_FLOW", ObjectType::AnalogInput).with_units("cfm"),
            Some("AHU"),
        );
        let a = TagGenerator::default().generate(&p);
        let b = TagGenerator::default().generate(&p);
        assert_eq!(a.names(), b.names());
        assert_eq!(a.confidence, b.confidence);
    }
}
