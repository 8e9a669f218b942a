//! Interaction layer: one uploaded document, one question at a time.
//!
//! A failed follow-up generation never hides a successful answer; it is
//! reported alongside it instead.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::QaError;
use crate::extract::{self, PREVIEW_CHARS};
use crate::followup::FollowupGenerator;
use crate::llm::{CompletionProvider, ModelClient};
use crate::pipeline::QueryPipeline;
use crate::sections::{self, Sections};

/// Headings shown to the user
pub const HEADING_DISPLAY_LIMIT: usize = 30;

/// Follow-up questions shown to the user
pub const MAX_FOLLOWUPS: usize = 3;

/// Extracted text and its sections.
#[derive(Debug, Clone)]
pub struct Document {
    raw_text: String,
    sections: Sections,
}

impl Document {
    pub fn from_text(raw_text: impl Into<String>) -> Result<Self, QaError> {
        let raw_text = raw_text.into();
        if raw_text.trim().is_empty() {
            return Err(QaError::EmptyDocument);
        }
        let sections = sections::split(&raw_text);
        Ok(Self { raw_text, sections })
    }

    pub fn from_pdf_bytes(bytes: &[u8]) -> Result<Self, QaError> {
        let raw_text = extract::extract_text(bytes);
        if raw_text.is_empty() {
            return Err(QaError::ExtractionFailed);
        }
        Self::from_text(raw_text)
    }

    /// Load an uploaded file: `.txt`/`.md` as UTF-8 text, anything else as PDF.
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> Result<Self, QaError> {
        if extract::is_plain_text(file_name) {
            Self::from_text(String::from_utf8_lossy(bytes).into_owned())
        } else {
            Self::from_pdf_bytes(bytes)
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn headings(&self, limit: usize) -> Vec<&str> {
        self.sections.keys().take(limit).map(String::as_str).collect()
    }

    pub fn preview(&self) -> String {
        extract::preview(&self.raw_text, PREVIEW_CHARS)
    }
}

/// Outcome of one question.
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub question: String,
    pub answer: String,
    /// Follow-up questions, or why they could not be generated
    pub followups: Result<Vec<String>, String>,
}

/// Answers questions and suggests follow-ups.
pub struct Assistant {
    pipeline: QueryPipeline,
    followups: FollowupGenerator,
}

impl Assistant {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            pipeline: QueryPipeline::new(Arc::clone(&provider), config),
            followups: FollowupGenerator::new(provider),
        }
    }

    /// Build an assistant backed by the HTTP model client.
    pub fn from_config(config: &Config) -> Result<Self, QaError> {
        let client = ModelClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub async fn ask(&self, document: &Document, question: &str) -> Result<Interaction, QaError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::EmptyQuestion);
        }

        let answer = self.pipeline.answer(document.sections(), question).await?;
        info!(answer_chars = answer.chars().count(), "answer ready");

        let followups = match self.followups.generate(&answer).await {
            Ok(mut questions) => {
                questions.truncate(MAX_FOLLOWUPS);
                Ok(questions)
            }
            Err(e) => {
                warn!(error = %e, "follow-up generation failed");
                Err(e.to_string())
            }
        };

        Ok(Interaction {
            question: question.to_string(),
            answer,
            followups,
        })
    }
}
