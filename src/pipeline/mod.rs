//! Query Pipeline
//!
//! Answers a question about a sectioned document:
//!
//! 1. Render sections into one text and chunk it
//! 2. One chunk: ask the question directly
//! 3. Several chunks: summarize each chunk, then ask over the numbered summaries
//!
//! Every model call therefore stays within one chunk's budget regardless of
//! document length. Summarization is lossy for very large documents.

pub mod prompts;

use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::chunking::TextChunker;
use crate::config::Config;
use crate::error::QaError;
use crate::llm::{CompletionProvider, Message};
use crate::sections::{self, Sections};

/// Orchestrates chunking and model calls for one question.
pub struct QueryPipeline {
    provider: Arc<dyn CompletionProvider>,
    chunker: TextChunker,
    summary_concurrency: usize,
}

impl QueryPipeline {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            provider,
            chunker: TextChunker::new(config.max_chunk_chars),
            summary_concurrency: config.summary_concurrency.max(1),
        }
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_summary_concurrency(mut self, concurrency: usize) -> Self {
        self.summary_concurrency = concurrency.max(1);
        self
    }

    /// Answer `question` from `sections`.
    ///
    /// Issues one model call for a single-chunk document, N + 1 calls for N
    /// chunks. Any failing call aborts the whole answer.
    pub async fn answer(&self, sections: &Sections, question: &str) -> Result<String, QaError> {
        let content = sections::render(sections);
        if content.trim().is_empty() {
            return Err(QaError::EmptyDocument);
        }
        let chunks = self.chunker.chunk(&content);

        match chunks.as_slice() {
            [] => Err(QaError::EmptyDocument),
            [document] => {
                debug!(chars = document.chars().count(), "answering from a single chunk");
                self.provider
                    .complete(&prompts::direct_messages(document, question))
                    .await
            }
            _ => {
                info!(
                    chunks = chunks.len(),
                    concurrency = self.summary_concurrency,
                    model = self.provider.model(),
                    "document exceeds one chunk, summarizing first"
                );
                let summaries = self.summarize(&chunks, question).await?;
                let combined = prompts::combine_summaries(&summaries);
                self.provider
                    .complete(&prompts::final_messages(&combined, question))
                    .await
            }
        }
    }

    /// Summaries in chunk order, whatever order the calls complete in.
    async fn summarize(&self, chunks: &[String], question: &str) -> Result<Vec<String>, QaError> {
        let total = chunks.len();
        let requests: Vec<(usize, Vec<Message>)> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (i + 1, prompts::summary_messages(i + 1, total, chunk, question)))
            .collect();

        // Summary futures own their provider handle and messages
        let provider = Arc::clone(&self.provider);
        stream::iter(requests)
            .map(move |(index, messages)| {
                let provider = Arc::clone(&provider);
                async move {
                    let summary = provider.complete(&messages).await?;
                    debug!(chunk = index, total, "chunk summarized");
                    Ok::<_, QaError>(summary.trim().to_string())
                }
            })
            .buffered(self.summary_concurrency)
            .try_collect()
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Provider that replays scripted replies and records every conversation.
    pub struct RecordingProvider {
        replies: Mutex<VecDeque<Result<String, QaError>>>,
        pub calls: Mutex<Vec<Vec<Message>>>,
        /// Optional per-call delays, to shuffle completion order
        delays: Mutex<VecDeque<Duration>>,
    }

    impl RecordingProvider {
        pub fn new(replies: Vec<Result<String, QaError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
                delays: Mutex::new(VecDeque::new()),
            })
        }

        pub fn with_delays(replies: Vec<Result<String, QaError>>, delays: Vec<Duration>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
                delays: Mutex::new(delays.into()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_user_prompt(&self) -> String {
            let calls = self.calls.lock().unwrap();
            calls.last().and_then(|m| m.last()).map(|m| m.content.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        fn model(&self) -> &str {
            "recording"
        }

        async fn complete(&self, messages: &[Message]) -> Result<String, QaError> {
            let (reply, delay) = {
                self.calls.lock().unwrap().push(messages.to_vec());
                let reply = self
                    .replies
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Ok("default reply".to_string()));
                (reply, self.delays.lock().unwrap().pop_front())
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        }
    }

    fn sections_of(pairs: &[(&str, &str)]) -> Sections {
        pairs.iter().map(|(h, b)| (h.to_string(), b.to_string())).collect()
    }

    fn pipeline(provider: Arc<RecordingProvider>, max_chars: usize) -> QueryPipeline {
        QueryPipeline::new(provider, &Config::default()).with_chunker(TextChunker::new(max_chars))
    }

    #[tokio::test]
    async fn test_single_chunk_makes_one_call() {
        let provider = RecordingProvider::new(vec![Ok("It greets the world.".to_string())]);
        let sections = sections_of(&[("INTRODUCTION", "Hello world."), ("SECTION ONE", "Foo bar.")]);

        let answer = pipeline(provider.clone(), 1000)
            .answer(&sections, "What is this about?")
            .await
            .unwrap();

        assert_eq!(answer, "It greets the world.");
        assert_eq!(provider.call_count(), 1);
        let prompt = provider.last_user_prompt();
        assert!(prompt.contains("INTRODUCTION:\nHello world.\n\nSECTION ONE:\nFoo bar."));
        assert!(prompt.contains("Question: What is this about?"));
    }

    #[tokio::test]
    async fn test_multi_chunk_summarizes_then_answers() {
        let body = "word ".repeat(100);
        let sections = sections_of(&[("PART A", body.as_str()), ("PART B", body.as_str()), ("PART C", body.as_str())]);
        let chunk_count = TextChunker::new(200).chunk(&sections::render(&sections)).len();
        assert!(chunk_count > 2);

        let mut replies: Vec<Result<String, QaError>> =
            (1..=chunk_count).map(|i| Ok(format!("  summary text {}  ", i))).collect();
        replies.push(Ok("final answer".to_string()));
        let provider = RecordingProvider::new(replies);

        let answer = pipeline(provider.clone(), 200).answer(&sections, "Which part?").await.unwrap();

        assert_eq!(answer, "final answer");
        assert_eq!(provider.call_count(), chunk_count + 1);

        let final_prompt = provider.last_user_prompt();
        let mut last_pos = 0;
        for i in 1..=chunk_count {
            let label = format!("Summary {}: summary text {}", i, i);
            let pos = final_prompt.find(&label).expect("summary label missing");
            assert!(pos >= last_pos, "summaries out of order");
            last_pos = pos;
        }
        assert!(final_prompt.ends_with("Question: Which part?"));

        let calls = provider.calls.lock().unwrap();
        assert!(calls[0][1].content.starts_with(&format!("Chunk 1 of {}:", chunk_count)));
    }

    #[tokio::test]
    async fn test_summary_failure_aborts() {
        let body = "lorem ipsum ".repeat(100);
        let sections = sections_of(&[("BIG", body.as_str())]);
        let provider = RecordingProvider::new(vec![
            Ok("first".to_string()),
            Err(QaError::ModelCall { reason: "HTTP 503".to_string() }),
        ]);

        let err = pipeline(provider.clone(), 300).answer(&sections, "q").await.unwrap_err();

        assert!(matches!(err, QaError::ModelCall { .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_parallel_summaries_keep_chunk_order() {
        let body = "alpha beta gamma ".repeat(40);
        let sections = sections_of(&[("BIG", body.as_str())]);
        let chunk_count = TextChunker::new(150).chunk(&sections::render(&sections)).len();
        assert!(chunk_count >= 3);

        let mut replies: Vec<Result<String, QaError>> = (1..=chunk_count).map(|i| Ok(format!("s{}", i))).collect();
        replies.push(Ok("done".to_string()));
        // Earlier chunks finish last
        let delays = (0..chunk_count)
            .map(|i| Duration::from_millis(((chunk_count - i) * 15) as u64))
            .collect();
        let provider = RecordingProvider::with_delays(replies, delays);

        let answer = pipeline(provider.clone(), 150)
            .with_summary_concurrency(4)
            .answer(&sections, "q")
            .await
            .unwrap();

        assert_eq!(answer, "done");
        let expected = (1..=chunk_count)
            .map(|i| format!("Summary {}: s{}", i, i))
            .collect::<Vec<_>>()
            .join("\n\n");
        assert!(provider.last_user_prompt().contains(&expected));
    }

    #[tokio::test]
    async fn test_empty_document() {
        let provider = RecordingProvider::new(vec![]);

        let err = pipeline(provider.clone(), 1000).answer(&Sections::new(), "q").await.unwrap_err();

        assert!(matches!(err, QaError::EmptyDocument));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_heading_only_document_is_answered() {
        let provider = RecordingProvider::new(vec![Ok("Revenue grew.".to_string())]);
        let sections = crate::sections::split("ANNUAL REPORT 2023\nREVENUE GREW TEN PERCENT\nCOSTS FELL\n");
        assert!(sections.values().all(|body| body.is_empty()));

        let answer = pipeline(provider.clone(), 1000).answer(&sections, "How did revenue do?").await.unwrap();

        assert_eq!(answer, "Revenue grew.");
        assert_eq!(provider.call_count(), 1);
        assert!(provider.last_user_prompt().contains("REVENUE GREW TEN PERCENT:"));
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn test_answer_future_is_send() {
        let provider = RecordingProvider::new(vec![]);
        let pipeline = pipeline(provider, 10);
        let sections = sections_of(&[("PART A", "some words that span several chunks")]);
        assert_send(pipeline.answer(&sections, "q"));
    }
}
