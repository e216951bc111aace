//! Core types for Pointwise: control points, Haystack tag sets, signatures,
//! acronym dictionaries, unit tables, configuration, and Arrow record schemas.

pub mod config;
pub mod dictionary;
pub mod equipment;
pub mod error;
pub mod point;
pub mod schema;
pub mod signature;
pub mod tags;
pub mod units;

pub use config::{MatchingConfig, NormalizerConfig, PipelineConfig, TaggingConfig};
pub use dictionary::{DictionaryOverrides, DictionaryStore};
pub use equipment::EquipmentType;
pub use error::{ConfigError, NormalizeError, SignatureError, TagError};
pub use point::{
    DataType, NormalizedPoint, ObjectType, PointCategory, PointFunction, RawPoint,
};
pub use signature::{PointSignature, SignatureStats, TemplateMatch};
pub use tags::{ExplicitTag, HaystackTag, HaystackTagSet, TagCategory, TagSource, TagValue};
pub use units::{Quantity, Substance, UnitInfo};
