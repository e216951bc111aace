//! Template matching: point signatures, wildcard patterns, template
//! libraries, the matching engine, and usage statistics.

pub mod engine;
pub mod error;
pub mod library;
pub mod pattern;
pub mod recommend;
pub mod signature;
pub mod stats;

pub use engine::{MatchEngine, MatchReport};
pub use error::LibraryError;
pub use library::{RankedTemplate, SignatureDefinition, Template, TemplateDefinition, TemplateLibrary};
pub use pattern::WildcardPattern;
pub use recommend::Recommendation;
pub use signature::{author_signature, keywords_of, to_signature};
pub use stats::{MatchStatistics, SignatureTally};
