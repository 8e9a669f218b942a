//! Follow-up question generation.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::QaError;
use crate::llm::{CompletionProvider, Message};

/// Returned when the model produced no usable lines.
pub const NO_FOLLOWUPS: &str = "No follow-up questions available.";

const SYSTEM_PROMPT: &str = "You are a concise question generator.";

/// Leading "1.", "2)", "3 -", or a "-"/"*"/"•" bullet.
fn enumeration_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(?:\d+[).\s-]*|[-*•]\s*)").expect("enumeration pattern is valid"))
}

pub struct FollowupGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl FollowupGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Ask for three follow-up questions about `answer_text`.
    ///
    /// Always returns at least one item; errors from the model call propagate.
    pub async fn generate(&self, answer_text: &str) -> Result<Vec<String>, QaError> {
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!(
                "Based on the following answer, generate 3 brief, clear follow-up questions (one per line, no numbering):\n\n{}",
                answer_text
            )),
        ];

        let text = self.provider.complete(&messages).await?;
        let questions = parse_questions(&text);
        debug!(count = questions.len(), "parsed follow-up questions");
        Ok(questions)
    }
}

/// Split model output into clean questions, falling back to [`NO_FOLLOWUPS`].
pub fn parse_questions(text: &str) -> Vec<String> {
    let questions: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| enumeration_prefix().replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if questions.is_empty() {
        vec![NO_FOLLOWUPS.to_string()]
    } else {
        questions
    }
}
