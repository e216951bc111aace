//! Semantic layer: tokenization and acronym expansion, function
//! classification, context inference, and Haystack tag generation.

pub mod batch;
pub mod classifier;
pub mod context;
pub mod normalizer;
pub mod tagger;
pub mod tokenizer;
pub mod validator;

pub use batch::{BatchItem, BatchSummary, normalize_batch, tag_batch};
pub use classifier::classify;
pub use context::{InferredContext, infer_context};
pub use normalizer::Normalizer;
pub use tagger::TagGenerator;
pub use validator::validate_tags;
