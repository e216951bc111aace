use thiserror::Error;

/// Failure to normalize a single raw point. Fatal to that point only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("point identifier is empty")]
    EmptyIdentifier,

    #[error("unknown object type code: {0:?}")]
    UnknownObjectType(String),
}

/// Internal tag generation failure.
///
/// Never surfaced to callers of the tag generator: it degrades to the
/// minimal `{point, error}` tag set instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("invalid haystack tag name: {0:?}")]
    InvalidName(String),

    #[error("tag generation failed: {0}")]
    Internal(String),
}

/// Signature construction failure. An invalid authored pattern is a
/// configuration defect and is reported synchronously.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("invalid signature pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("point {0:?} has no significant keywords")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
