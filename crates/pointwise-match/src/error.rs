use pointwise_core::SignatureError;
use thiserror::Error;

/// Failure to load or build a template library.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("template library not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("template library JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template {template:?}: {source}")]
    Signature {
        template: String,
        #[source]
        source: SignatureError,
    },

    #[error("template {template:?} defines signature {id:?} more than once")]
    DuplicateSignature { template: String, id: String },

    #[error("template {0:?} is defined more than once")]
    DuplicateTemplate(String),
}
