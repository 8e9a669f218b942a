//! Window Chunker
//!
//! Walks the text in windows of `max_chars` characters and cuts each window at
//! its last newline, else its last space, else at the window end.
//! Positions are counted in chars, not bytes, so multi-byte text is never
//! split inside a code point.

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Blank input yields no chunks. Input that already fits yields one trimmed
/// chunk. Whitespace-only spans between split points are dropped.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every char, plus the end of the text
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = offsets.len() - 1;

    if len <= max_chars {
        return vec![text.trim().to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        let end = start + max_chars;
        if end >= len {
            push_trimmed(&mut chunks, &text[offsets[start]..]);
            break;
        }

        let split_at = find_split(text, &offsets, start, end);
        push_trimmed(&mut chunks, &text[offsets[start]..offsets[split_at]]);
        start = split_at;
    }

    chunks
}

/// Char position to split the window `[start, end)` at; always `> start`.
fn find_split(text: &str, offsets: &[usize], start: usize, end: usize) -> usize {
    let window = &text[offsets[start]..offsets[end]];

    for separator in ['\n', ' '] {
        if let Some(byte_idx) = window.rfind(separator) {
            let absolute = offsets[start] + byte_idx;
            let pos = offsets.binary_search(&absolute).unwrap_or_else(|i| i);
            if pos > start {
                return pos;
            }
        }
    }

    end
}

fn push_trimmed(chunks: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
