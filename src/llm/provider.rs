//! The Provider Abstraction.
//!
//! Anything that can turn a conversation into assistant text. The pipeline
//! and follow-up generator only depend on this trait.

use async_trait::async_trait;

use super::types::Message;
use crate::error::QaError;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Send a conversation and return the assistant's text.
    async fn complete(&self, messages: &[Message]) -> Result<String, QaError>;
}
