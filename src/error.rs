//! Error taxonomy for the question-answering core.
//!
//! Transient transport failures live in [`crate::llm::TransportError`]; they are
//! retried by the transport layer and surface here as [`QaError::ModelCall`]
//! once the retry budget is spent.

use thiserror::Error;

/// Maximum characters of a raw model response kept in diagnostics.
pub const RAW_RESPONSE_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum QaError {
    /// No API key is available for the completion service.
    #[error("no API key available: set OPENROUTER_API_KEY, add api_key to the config file, or pass --api-key")]
    MissingCredential,

    /// Non-retryable HTTP failure, or retries exhausted.
    #[error("model call failed: {reason}")]
    ModelCall { reason: String },

    /// The service answered successfully but not in the expected shape.
    #[error("unexpected model response: {reason}. Response: {raw}")]
    ResponseShape { reason: String, raw: String },

    #[error("document content is empty after extraction/structuring")]
    EmptyDocument,

    /// The PDF extractor produced no text.
    #[error("failed to extract text from PDF; the file may be scanned (image-only) or corrupted")]
    ExtractionFailed,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("configuration error: {0}")]
    Config(String),
}

impl QaError {
    pub fn response_shape(reason: impl Into<String>, raw: &str) -> Self {
        Self::ResponseShape {
            reason: reason.into(),
            raw: truncate_chars(raw, RAW_RESPONSE_LIMIT),
        }
    }

    /// Whether the user can fix this by changing their input (file, question, key).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::EmptyDocument | Self::ExtractionFailed | Self::EmptyQuestion
        )
    }
}

/// Keep at most `limit` characters of `text`, respecting char boundaries.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
