//! Chat-completions client.
//!
//! Works against any OpenAI-compatible endpoint (OpenRouter by default).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::provider::CompletionProvider;
use super::transport::{HttpTransport, RetryPolicy, RetryingTransport, Transport};
use super::types::{ChatBody, ChatRequest, Message};
use crate::config::Config;
use crate::error::{truncate_chars, QaError};

/// Client for a chat-completions endpoint.
#[derive(Clone)]
pub struct ModelClient {
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl ModelClient {
    /// Build a client with the reqwest transport and the configured retry policy.
    pub fn from_config(config: &Config) -> Result<Self, QaError> {
        let http = HttpTransport::new(config.timeout())?;
        let transport = RetryingTransport::new(http, RetryPolicy::from_config(config));
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    fn credential(&self) -> Result<&str, QaError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(QaError::MissingCredential)
    }
}

#[async_trait]
impl CompletionProvider for ModelClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, QaError> {
        let api_key = self.credential()?;

        let request = ChatRequest {
            endpoint: self.endpoint.clone(),
            api_key: api_key.to_string(),
            body: ChatBody {
                model: self.model.clone(),
                messages: messages.to_vec(),
            },
        };

        debug!(model = %self.model, messages = messages.len(), "sending completion request");

        let reply = self.transport.send(&request).await.map_err(|e| QaError::ModelCall {
            reason: e.to_string(),
        })?;

        if !reply.is_success() {
            return Err(QaError::ModelCall {
                reason: format!("HTTP {}: {}", reply.status, truncate_chars(reply.body.trim(), 300)),
            });
        }

        let value: Value = serde_json::from_str(&reply.body)
            .map_err(|_| QaError::response_shape("response is not valid JSON", &reply.body))?;

        if let Some(total) = value.pointer("/usage/total_tokens").and_then(Value::as_u64) {
            info!(model = %self.model, total_tokens = total, "completion finished");
        }

        extract_content(&value)
    }
}

/// Pull the assistant text out of a chat-completions response.
///
/// Reads `choices[0].message.content`; choices without a `message` object
/// fall back to `choices[0].text`, then `choices[0].content`.
pub fn extract_content(response: &Value) -> Result<String, QaError> {
    let first = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| QaError::response_shape("no choices returned by model", &response.to_string()))?;

    let content = match first.get("message") {
        Some(Value::Object(message)) => message.get("content"),
        _ => first
            .get("text")
            .filter(|text| text.as_str().is_some_and(|t| !t.is_empty()))
            .or_else(|| first.get("content")),
    };

    match content {
        Some(Value::String(text)) => Ok(text.clone()),
        _ => Err(QaError::response_shape("choice content missing", &first.to_string())),
    }
}
