//! Case-insensitive wildcard patterns such as `*ROOM*TEMP*`.
//!
//! `*` matches any run of characters, including none. Everything else is
//! literal. Patterns compile to an anchored regex once and are then matched
//! against names, identifiers and keyword joins.

use pointwise_core::SignatureError;
use regex::Regex;

/// Characters allowed in a pattern besides letters and digits.
const PATTERN_PUNCTUATION: &[char] = &['*', '_', '-', ' ', '.'];

#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Validate and compile a pattern.
    pub fn compile(pattern: &str) -> Result<Self, SignatureError> {
        let invalid = |reason: &str| SignatureError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !c.is_alphanumeric() && !PATTERN_PUNCTUATION.contains(c))
        {
            return Err(invalid(&format!("unsupported character {c:?}")));
        }
        if !trimmed.chars().any(char::is_alphanumeric) {
            return Err(invalid("pattern has no literal characters"));
        }

        let body = trimmed
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("(?i)^{body}$"))
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: trimmed.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Literal segments between wildcards, in pattern order.
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.source.split('*').map(str::trim).filter(|s| !s.is_empty())
    }
}
