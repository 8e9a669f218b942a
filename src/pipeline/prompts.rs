//! Prompt text for the answering pipeline.

use crate::llm::Message;

pub const ANSWER_SYSTEM: &str =
    "You are a helpful assistant. Answer concisely and, where appropriate, mention the section heading you used.";

pub const SUMMARY_SYSTEM: &str = "You are a concise summarizer. Summarize the following chunk in 2-3 short sentences, focusing on facts that would help answer the user's question.";

/// Single-pass conversation: the whole document fits in one chunk.
pub fn direct_messages(document: &str, question: &str) -> Vec<Message> {
    vec![
        Message::system(ANSWER_SYSTEM),
        Message::user(format!(
            "Document content:\n\n{}\n\nQuestion: {}\nAnswer concisely and cite section headings if relevant.",
            document, question
        )),
    ]
}

/// Summary request for chunk `index` (1-based) of `total`.
pub fn summary_messages(index: usize, total: usize, chunk: &str, question: &str) -> Vec<Message> {
    vec![
        Message::system(SUMMARY_SYSTEM),
        Message::user(format!(
            "Chunk {} of {}:\n\n{}\n\nQuestion to keep in mind: {}",
            index, total, chunk, question
        )),
    ]
}

/// Number summaries in chunk order: `"Summary 1: ..."`, separated by blank lines.
pub fn combine_summaries(summaries: &[String]) -> String {
    summaries
        .iter()
        .enumerate()
        .map(|(i, summary)| format!("Summary {}: {}", i + 1, summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Final conversation over the combined summaries.
pub fn final_messages(combined: &str, question: &str) -> Vec<Message> {
    vec![
        Message::system(ANSWER_SYSTEM),
        Message::user(format!(
            "Based on the combined summaries below, answer the question concisely and indicate which summary/section(s) support the answer.\n\n{}\n\nQuestion: {}",
            combined, question
        )),
    ]
}
