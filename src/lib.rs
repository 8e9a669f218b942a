//! pdfqa - ask questions about PDF documents
//!
//! Pipeline: PDF bytes → extracted text → sections → chunks → model calls →
//! answer → follow-up questions.

pub mod chunking;
pub mod config;
pub mod error;
pub mod extract;
pub mod followup;
pub mod llm;
pub mod pipeline;
pub mod repl;
pub mod sections;
pub mod server;
pub mod session;

pub use chunking::{chunk_text, TextChunker, DEFAULT_MAX_CHARS};
pub use config::Config;
pub use error::QaError;
pub use extract::{extract_text, preview};
pub use followup::{parse_questions, FollowupGenerator, NO_FOLLOWUPS};
pub use llm::{
    CompletionProvider, HttpReply, HttpTransport, Message, ModelClient, RetryPolicy, RetryingTransport, Role,
    Transport, TransportError,
};
pub use pipeline::QueryPipeline;
pub use sections::{Sections, DEFAULT_HEADING};
pub use server::run_server;
pub use session::{Assistant, Document, Interaction, HEADING_DISPLAY_LIMIT, MAX_FOLLOWUPS};
