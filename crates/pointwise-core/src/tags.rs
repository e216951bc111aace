//! Haystack tag sets.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TagError;
use crate::units::Substance;

/// Role markers. A well-formed set carries at most one.
pub const ROLE_TAGS: [&str; 3] = ["sensor", "cmd", "sp"];

/// Ordering bucket for deterministic output: role, quantity, equipment,
/// location, then everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    Role,
    Quantity,
    Equipment,
    Location,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    Inferred,
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "val", rename_all = "snake_case")]
pub enum TagValue {
    Marker,
    Str(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaystackTag {
    pub name: String,
    pub value: TagValue,
    pub category: TagCategory,
    pub confidence: f32,
    pub source: TagSource,
    pub timestamp: DateTime<Utc>,
}

/// A tag supplied by the caller rather than inferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitTag {
    pub name: String,
    #[serde(default = "marker")]
    pub value: TagValue,
    pub category: TagCategory,
}

fn marker() -> TagValue {
    TagValue::Marker
}

/// Haystack tag names: a lower-case ASCII letter followed by ASCII
/// alphanumerics or underscores.
pub fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ordered, de-duplicated tags with a set-level confidence and consistency warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaystackTagSet {
    tags: IndexMap<String, HaystackTag>,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Default for HaystackTagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl HaystackTagSet {
    pub fn new() -> Self {
        Self {
            tags: IndexMap::new(),
            confidence: 0.0,
            warnings: Vec::new(),
        }
    }

    /// The minimal `{point, error}` set used when tag generation fails.
    pub fn degraded(reason: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut tags = IndexMap::new();
        for (name, category) in [("point", TagCategory::Custom), ("error", TagCategory::Custom)] {
            tags.insert(
                name.to_string(),
                HaystackTag {
                    name: name.to_string(),
                    value: TagValue::Marker,
                    category,
                    confidence: 0.1,
                    source: TagSource::Inferred,
                    timestamp: now,
                },
            );
        }
        Self {
            tags,
            confidence: 0.1,
            warnings: vec![reason.into()],
        }
    }

    /// Insert a tag. The first insertion of a name wins; later duplicates are
    /// ignored and `Ok(false)` is returned.
    pub fn insert(
        &mut self,
        name: &str,
        value: TagValue,
        category: TagCategory,
        confidence: f32,
        source: TagSource,
    ) -> Result<bool, TagError> {
        if !is_valid_tag_name(name) {
            return Err(TagError::InvalidName(name.to_string()));
        }
        if self.tags.contains_key(name) {
            return Ok(false);
        }
        self.tags.insert(
            name.to_string(),
            HaystackTag {
                name: name.to_string(),
                value,
                category,
                confidence: confidence.clamp(0.0, 1.0),
                source,
                timestamp: Utc::now(),
            },
        );
        Ok(true)
    }

    pub fn insert_marker(
        &mut self,
        name: &str,
        category: TagCategory,
        confidence: f32,
    ) -> Result<bool, TagError> {
        self.insert(name, TagValue::Marker, category, confidence, TagSource::Inferred)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&HaystackTag> {
        self.tags.get(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HaystackTag> {
        self.tags.values()
    }

    /// Tag names in set order.
    pub fn names(&self) -> Vec<&str> {
        self.tags.keys().map(String::as_str).collect()
    }

    /// Role markers present, in set order.
    pub fn role_tags(&self) -> Vec<&str> {
        self.names()
            .into_iter()
            .filter(|n| ROLE_TAGS.contains(n))
            .collect()
    }

    /// Substance markers present, in set order.
    pub fn substance_tags(&self) -> Vec<&str> {
        self.names()
            .into_iter()
            .filter(|n| Substance::TAGS.contains(n))
            .collect()
    }

    /// Stable sort by category; insertion order is kept within a category.
    pub fn sort_by_priority(&mut self) {
        self.tags.sort_by(|_, a, _, b| a.category.cmp(&b.category));
    }

    /// Haystack-style dict: markers map to `"m:"`, values to their JSON value.
    pub fn to_haystack_json(&self) -> serde_json::Value {
        let map = self
            .tags
            .iter()
            .map(|(name, tag)| {
                let v = match &tag.value {
                    TagValue::Marker => serde_json::Value::String("m:".into()),
                    TagValue::Str(s) => serde_json::Value::String(s.clone()),
                    TagValue::Number(n) => serde_json::json!(n),
                };
                (name.clone(), v)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
