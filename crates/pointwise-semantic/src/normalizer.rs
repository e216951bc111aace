//! Name normalization: tokenize, expand through the resolver chain, and
//! build the display name and expanded description.

use pointwise_core::point::strip_function_words;
use pointwise_core::units::lookup_unit;
use pointwise_core::{
    DataType, DictionaryStore, EquipmentType, NormalizeError, NormalizedPoint, NormalizerConfig,
    PipelineConfig, PointCategory, RawPoint,
};
use tracing::debug;

use crate::classifier::classify;
use crate::context::infer_context;
use crate::tokenizer::{Layer, ResolverChain, is_numeric, tokenize};

/// Display name used when nothing but function words remain.
const FALLBACK_NAME: &str = "Point";

/// Names whose presence marks a position-type point.
const POSITION_WORDS: &[&str] = &["damper", "valve", "position"];

pub struct Normalizer {
    store: DictionaryStore,
    config: NormalizerConfig,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DictionaryStore::builtin(), NormalizerConfig::default())
    }
}

/// Ordered, de-duplicated record of the rules a normalization applied.
#[derive(Default)]
struct RuleLog(Vec<String>);

impl RuleLog {
    fn push(&mut self, rule: &str) {
        if !self.0.iter().any(|r| r == rule) {
            self.0.push(rule.to_string());
        }
    }
}

/// Per-token expansion tallies used for confidence scoring.
#[derive(Default)]
struct Tally {
    alphabetic: usize,
    equipment_hits: usize,
    generic_hits: usize,
    unexpanded: usize,
}

impl Normalizer {
    pub fn new(store: DictionaryStore, config: NormalizerConfig) -> Self {
        Self { store, config }
    }

    /// Built-in dictionaries plus configured overrides.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let store = DictionaryStore::builtin().with_overrides(&config.dictionary);
        Self::new(store, config.normalizer.clone())
    }

    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    /// Normalize one raw point.
    ///
    /// `equipment_hint` is a free-form equipment label ("AHU-1", "VAV") that
    /// selects the equipment dictionary. Only an empty identifier fails;
    /// anything else yields a best-effort result whose confidence reflects
    /// how much of the identifier was understood.
    pub fn normalize(
        &self,
        raw: &RawPoint,
        equipment_hint: Option<&str>,
    ) -> Result<NormalizedPoint, NormalizeError> {
        let identifier = raw.identifier.trim();
        if identifier.is_empty() {
            return Err(NormalizeError::EmptyIdentifier);
        }

        let equipment = equipment_hint.and_then(EquipmentType::from_hint);
        let chain = ResolverChain::for_equipment(equipment);
        let tokens = tokenize(identifier);

        let mut rules = RuleLog::default();
        rules.push("tokenize");
        let mut tally = Tally::default();
        let mut parts: Vec<String> = Vec::with_capacity(tokens.len());

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();

            if is_numeric(token) {
                parts.push(token.to_string());
                i += 1;
                continue;
            }

            tally.alphabetic += 1;

            if token.chars().count() > self.config.max_token_len {
                debug!(token, "opaque token");
                rules.push("opaque_token");
                tally.unexpanded += 1;
                parts.push(token.to_string());
                i += 1;
                continue;
            }

            // Abbreviations such as CO2 are split by the tokenizer; rejoin
            // with the following digits when the joined form is known.
            let mut consumed = 1;
            let mut resolution = None;
            if let Some(next) = tokens.get(i + 1)
                && is_numeric(next)
            {
                let joined = format!("{token}{next}");
                if let Some(hit) = chain.resolve(&self.store, &joined) {
                    resolution = Some(hit);
                    consumed = 2;
                }
            }
            let resolution = resolution.or_else(|| chain.resolve(&self.store, token));

            match resolution {
                Some(hit) => {
                    match hit.layer {
                        Layer::Equipment(_) => {
                            tally.equipment_hits += 1;
                            rules.push("equipment_expansion");
                        }
                        Layer::Generic => {
                            tally.generic_hits += 1;
                            rules.push("generic_expansion");
                        }
                    }
                    parts.push(hit.expansion.to_string());
                }
                None => {
                    debug!(token, equipment = ?equipment, "dictionary miss");
                    tally.unexpanded += 1;
                    rules.push("passthrough");
                    parts.push(token.to_string());
                }
            }
            i += consumed;
        }

        let expanded = parts
            .iter()
            .flat_map(|p| p.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");
        let stripped = strip_function_words(&expanded);
        if stripped != expanded {
            rules.push("function_word_stripped");
        }
        let normalized_name = if stripped.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            stripped
        };

        let point_function = classify(raw.object_type, raw.writable);
        let expanded_description = self.describe(raw, &normalized_name, point_function.suffix());
        if point_function.suffix().is_some() {
            rules.push("function_suffix");
        }

        let data_type = raw.object_type.data_type();
        let category = categorize(raw.units.as_deref(), &normalized_name, data_type);
        let confidence = self.score(&tally);

        debug!(
            identifier,
            name = %normalized_name,
            function = %point_function,
            confidence,
            "normalized point"
        );

        Ok(NormalizedPoint {
            original_name: raw.identifier.clone(),
            normalized_name,
            expanded_description,
            point_function,
            category,
            data_type,
            object_type: raw.object_type,
            writable: raw.writable,
            units: raw.units.clone(),
            equipment_type: equipment,
            confidence,
            applied_rules: rules.0,
        })
    }

    /// Longer of the free-text description and the expanded name, stripped of
    /// function words, with the classifier's suffix appended.
    fn describe(&self, raw: &RawPoint, name: &str, suffix: Option<&str>) -> String {
        let source = match raw.description.as_deref().map(str::trim) {
            Some(desc) if desc.chars().count() > name.chars().count() => desc,
            _ => name,
        };
        let base = strip_function_words(source);

        match suffix {
            Some(s) if base.is_empty() => s.to_string(),
            Some(s) => format!("{base} {s}"),
            None if base.is_empty() => name.to_string(),
            None => base,
        }
    }

    fn score(&self, tally: &Tally) -> f32 {
        let mut confidence = self.config.base_confidence
            + tally.equipment_hits as f32 * self.config.equipment_bonus
            + tally.generic_hits as f32 * self.config.generic_bonus;
        if tally.alphabetic > 0 && tally.unexpanded * 2 > tally.alphabetic {
            confidence -= self.config.unexpanded_penalty;
        }
        confidence.clamp(0.0, 1.0)
    }
}

fn categorize(units: Option<&str>, name: &str, data_type: DataType) -> PointCategory {
    if let Some(info) = units.and_then(lookup_unit) {
        return PointCategory::from_quantity(info.quantity);
    }
    if data_type != DataType::Analog {
        return PointCategory::State;
    }
    if let Some(q) = infer_context(name).quantity {
        return PointCategory::from_quantity(q);
    }
    let lower = name.to_lowercase();
    if POSITION_WORDS.iter().any(|w| lower.contains(w)) {
        return PointCategory::Position;
    }
    PointCategory::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointwise_core::ObjectType;
    use pointwise_core::point::{FUNCTION_WORDS, contains_word};

    fn normalize(raw: RawPoint, hint: Option<&str>) -> NormalizedPoint {
        Normalizer::default().normalize(&raw, hint).unwrap()
    }

    fn assert_name_clean(point: &NormalizedPoint) {
        for word in FUNCTION_WORDS {
            assert!(
                !contains_word(&point.normalized_name, word),
                "name {:?} contains {word}",
                point.normalized_name
            );
        }
    }

    fn suffix_count(description: &str) -> usize {
        FUNCTION_WORDS
            .iter()
            .map(|w| {
                description
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| t.eq_ignore_ascii_case(w))
                    .count()
            })
            .sum()
    }

    #[test]
    fn room_temp_on_vav() {
        let raw = RawPoint::new("ROOM TEMP_4", ObjectType::AnalogInput).with_units("°F");
        let point = normalize(raw, Some("VAV"));

        assert!(point.normalized_name.contains("Room"));
        assert!(point.normalized_name.contains("Temperature"));
        assert_eq!(point.normalized_name, "Room Temperature 4");
        assert!(point.expanded_description.ends_with(" Sensor"));
        assert_eq!(point.category, PointCategory::Temperature);
        assert_eq!(point.equipment_type, Some(EquipmentType::Vav));
        assert_name_clean(&point);
    }

    #[test]
    fn damper_position_command() {
        let raw = RawPoint::new("DAMPER POS_5", ObjectType::AnalogOutput).with_units("%");
        let point = normalize(raw, None);

        assert_eq!(point.normalized_name, "Damper Position 5");
        assert_eq!(point.expanded_description, "Damper Position 5 Command");
        assert_eq!(point.category, PointCategory::Position);
    }

    #[test]
    fn role_tokens_never_reach_the_name() {
        let raw = RawPoint::new("DMPR_CMD", ObjectType::AnalogOutput);
        let point = normalize(raw, None);
        assert_eq!(point.normalized_name, "Damper");
        assert_eq!(point.expanded_description, "Damper Command");
        assert!(point.applied_rules.contains(&"function_word_stripped".to_string()));
    }

    #[test]
    fn expansion_containing_function_word_is_stripped() {
        let raw = RawPoint::new("SA_TS", ObjectType::AnalogInput);
        let point = normalize(raw, Some("AHU-1"));
        assert_eq!(point.normalized_name, "Supply Air Temperature");
        assert_eq!(point.expanded_description, "Supply Air Temperature Sensor");
    }

    #[test]
    fn classifier_owns_the_suffix() {
        // The name says "status" but a writable analog value is a setpoint.
        let raw = RawPoint::new("FAN_STS", ObjectType::AnalogValue).writable(true);
        let point = normalize(raw, None);
        assert_eq!(point.normalized_name, "Fan");
        assert_eq!(point.expanded_description, "Fan Setpoint");
        assert_eq!(suffix_count(&point.expanded_description), 1);
    }

    #[test]
    fn read_only_value_gets_no_suffix() {
        let raw = RawPoint::new("OCC_SP", ObjectType::AnalogValue);
        let point = normalize(raw, None);
        assert_eq!(point.normalized_name, "Occupied");
        assert_eq!(point.expanded_description, "Occupied");
        assert_eq!(suffix_count(&point.expanded_description), 0);
        assert!(!point.applied_rules.contains(&"function_suffix".to_string()));
    }

    #[test]
    fn longer_free_text_description_wins() {
        let raw = RawPoint::new("ZNT", ObjectType::AnalogInput)
            .with_description("Zone temperature sensor at north wall");
        let point = normalize(raw, None);
        assert_eq!(point.normalized_name, "Zone Temperature");
        assert_eq!(point.expanded_description, "Zone temperature at north wall Sensor");
        assert_eq!(suffix_count(&point.expanded_description), 1);
    }

    #[test]
    fn shorter_description_loses() {
        let raw = RawPoint::new("SA_TS", ObjectType::AnalogInput).with_description("SAT");
        let point = normalize(raw, None);
        assert_eq!(point.expanded_description, "Supply Air Temperature Sensor");
    }

    #[test]
    fn only_function_words_falls_back() {
        let raw = RawPoint::new("CMD", ObjectType::BinaryOutput);
        let point = normalize(raw, None);
        assert_eq!(point.normalized_name, "Point");
        assert_eq!(point.expanded_description, "Point Command");
        assert_name_clean(&point);
    }

    #[test]
    fn empty_identifier_fails() {
        let normalizer = Normalizer::default();
        for id in ["", "   ", "\t"] {
            let raw = RawPoint::new(id, ObjectType::AnalogInput);
            assert_eq!(normalizer.normalize(&raw, None), Err(NormalizeError::EmptyIdentifier));
        }
    }

    #[test]
    fn equipment_dictionary_changes_meaning() {
        let raw = RawPoint::new("RH_VLV", ObjectType::AnalogOutput);
        assert_eq!(normalize(raw.clone(), Some("VAV-2")).normalized_name, "Reheat Valve");
        assert_eq!(normalize(raw, None).normalized_name, "Relative Humidity Valve");
    }

    #[test]
    fn unknown_tokens_pass_through_with_lower_confidence() {
        let known = normalize(RawPoint::new("ZN_TEMP", ObjectType::AnalogInput), None);
        let unknown = normalize(RawPoint::new("XQ_ZZW", ObjectType::AnalogInput), None);
        assert_eq!(unknown.normalized_name, "XQ ZZW");
        assert!(unknown.confidence < known.confidence);
        assert!(unknown.applied_rules.contains(&"passthrough".to_string()));
    }

    #[test]
    fn long_tokens_are_opaque() {
        let config = NormalizerConfig {
            max_token_len: 6,
            ..NormalizerConfig::default()
        };
        let normalizer = Normalizer::new(DictionaryStore::builtin(), config);
        let raw = RawPoint::new("TEMPERATURE_ZN", ObjectType::AnalogInput);
        let point = normalizer.normalize(&raw, None).unwrap();
        assert_eq!(point.normalized_name, "TEMPERATURE Zone");
        assert!(point.applied_rules.contains(&"opaque_token".to_string()));
    }

    #[test]
    fn joins_split_abbreviations() {
        let raw = RawPoint::new("ZN_CO2", ObjectType::AnalogInput).with_units("ppm");
        let point = normalize(raw, None);
        assert_eq!(point.normalized_name, "Zone CO2");
        assert_eq!(point.category, PointCategory::AirQuality);
    }

    #[test]
    fn confidence_monotonic_in_expanded_tokens() {
        let bases = ["XQ", "XQ_ZZW", "ROOM", "XQ_ZZW_QQ", "SA"];
        let additions = ["TEMP", "ZN", "DMPR", "FLOW"];
        for base in bases {
            let before = normalize(RawPoint::new(base, ObjectType::AnalogInput), None).confidence;
            for add in additions {
                let id = format!("{base}_{add}");
                let after = normalize(RawPoint::new(id.as_str(), ObjectType::AnalogInput), None).confidence;
                assert!(after >= before, "{id}: {after} < {before}");
            }
        }
    }

    #[test]
    fn confidence_is_clamped() {
        let raw = RawPoint::new("SA_RA_OA_MA_DA_EA_TEMP_PRES_FLOW", ObjectType::AnalogInput);
        let point = normalize(raw, None);
        assert!(point.confidence <= 1.0);
        assert!(point.confidence >= 0.0);
    }

    #[test]
    fn binary_points_are_state() {
        let raw = RawPoint::new("SF_STS", ObjectType::BinaryInput);
        let point = normalize(raw, Some("AHU"));
        assert_eq!(point.normalized_name, "Supply Fan");
        assert_eq!(point.category, PointCategory::State);
        assert_eq!(point.data_type, DataType::Binary);
    }

    #[test]
    fn name_and_description_invariants_hold_across_object_types() {
        let ids = ["SA_TS", "DMPR_CMD", "FAN_STS", "SP", "ZN_TEMP_SP", "SENSOR STATUS"];
        for id in ids {
            for ot in ObjectType::ALL {
                for writable in [false, true] {
                    let raw = RawPoint::new(id, ot).writable(writable);
                    let point = normalize(raw, None);
                    assert_name_clean(&point);
                    let count = suffix_count(&point.expanded_description);
                    let expected = classify(ot, writable).suffix();
                    match expected {
                        Some(s) => {
                            assert_eq!(count, 1, "{id} {ot}");
                            assert!(point.expanded_description.ends_with(s));
                        }
                        None => assert_eq!(count, 0, "{id} {ot}"),
                    }
                }
            }
        }
    }
}
