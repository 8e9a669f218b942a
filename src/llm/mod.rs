//! LLM Layer
//!
//! This module handles all interactions with the completion service:
//! - Wire types for role-tagged messages
//! - A transport abstraction with a retrying decorator
//! - The chat-completions client and the provider trait it implements

pub mod client;
pub mod provider;
pub mod transport;
pub mod types;

// Re-export key types
pub use client::{extract_content, ModelClient};
pub use provider::CompletionProvider;
pub use transport::{HttpTransport, RetryPolicy, RetryingTransport, Transport, TransportError};
pub use types::{ChatBody, ChatRequest, HttpReply, Message, Role};
