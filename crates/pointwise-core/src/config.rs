//! Pipeline configuration. Every field has a default, so an empty JSON
//! object (or no file at all) gives the standard pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dictionary::DictionaryOverrides;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub normalizer: NormalizerConfig,
    pub tagging: TaggingConfig,
    pub matching: MatchingConfig,
    pub dictionary: DictionaryOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub base_confidence: f32,
    /// Added per token expanded from an equipment table.
    pub equipment_bonus: f32,
    /// Added per token expanded from the generic table.
    pub generic_bonus: f32,
    /// Subtracted when unexpanded alphabetic tokens are a strict majority.
    pub unexpanded_penalty: f32,
    /// Tokens longer than this are treated as opaque.
    pub max_token_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            base_confidence: 0.5,
            equipment_bonus: 0.15,
            generic_bonus: 0.10,
            unexpanded_penalty: 0.20,
            max_token_len: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Apply `validation_penalty` when the consistency validator warns.
    pub strict_validation: bool,
    pub validation_penalty: f32,
    /// Merge remaining context-inference patterns as custom tags.
    pub semantic_inference: bool,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            strict_validation: false,
            validation_penalty: 0.2,
            semantic_inference: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// A match counts as successful above this confidence.
    pub confidence_threshold: f32,
    /// Minimum keyword overlap ratio for a partial match.
    pub partial_similarity: f32,
    /// Weight of the required-signature hit rate in the aggregate.
    pub required_weight: f32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            partial_similarity: 0.5,
            required_weight: 0.7,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentType;

    #[test]
    fn empty_object_is_default() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.matching.confidence_threshold, 0.7);
        assert_eq!(config.normalizer.max_token_len, 24);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{"tagging": {"strict_validation": true}, "normalizer": {"max_token_len": 12}}"#,
        )
        .unwrap();
        assert!(config.tagging.strict_validation);
        assert_eq!(config.tagging.validation_penalty, 0.2);
        assert_eq!(config.normalizer.max_token_len, 12);
        assert_eq!(config.normalizer.base_confidence, 0.5);
    }

    #[test]
    fn dictionary_overrides_parse() {
        let config = PipelineConfig::from_json_str(
            r#"{"dictionary": {"generic": {"LBY": "Lobby"}, "equipment": {"vav": {"RH": "Reheat Valve"}}}}"#,
        )
        .unwrap();
        assert_eq!(config.dictionary.generic["LBY"], "Lobby");
        assert_eq!(config.dictionary.equipment[&EquipmentType::Vav]["RH"], "Reheat Valve");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = PipelineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = PipelineConfig::from_json_file(Path::new("/nonexistent/pointwise.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
