//! Document Chunking
//!
//! Splits long text into bounded pieces so each completion call stays within
//! a fixed size budget. Split points prefer line breaks, then spaces, and only
//! cut mid-word when a window has neither.

mod window;

pub use window::chunk_text;

/// Default maximum characters per chunk
pub const DEFAULT_MAX_CHARS: usize = 3500;

/// Character-window chunker with a fixed limit
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into trimmed, non-empty chunks of at most `max_chars` characters
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.max_chars)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}
