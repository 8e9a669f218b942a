//! PDF text extraction.
//!
//! Extraction never fails loudly: corrupt or image-only PDFs yield an empty
//! string, which callers treat as "extraction failed" rather than "empty
//! document".

use std::cell::Cell;
use std::panic;
use std::sync::Once;
use tracing::{debug, warn};

/// Characters shown in a document preview
pub const PREVIEW_CHARS: usize = 4000;

thread_local! {
    /// Set while this thread runs the extractor, so its panics stay off stderr.
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

/// Wrap the process panic hook once; panics on other threads still print.
fn install_quiet_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Extract plain text from PDF bytes. Returns an empty string on any failure.
///
/// pdf-extract panics on some malformed inputs. Those panics are caught and
/// reported through `tracing` instead of the default panic message.
pub fn extract_text(bytes: &[u8]) -> String {
    install_quiet_hook();
    QUIET_PANICS.with(|quiet| quiet.set(true));
    let result = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    QUIET_PANICS.with(|quiet| quiet.set(false));

    match result {
        Ok(Ok(text)) => {
            // Page breaks come through as form feeds
            let text = text.replace('\x0C', "\n").trim().to_string();
            debug!(bytes = bytes.len(), chars = text.chars().count(), "extracted PDF text");
            text
        }
        Ok(Err(e)) => {
            warn!(error = %e, "PDF text extraction failed");
            String::new()
        }
        Err(_) => {
            warn!("PDF text extraction panicked");
            String::new()
        }
    }
}

/// Whether the file name looks like plain text rather than a PDF.
pub fn is_plain_text(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".txt") || lower.ends_with(".md")
}

/// First `limit` characters of `raw`, trimmed, with "..." when truncated.
pub fn preview(raw: &str, limit: usize) -> String {
    match raw.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", raw[..idx].trim()),
        None => raw.trim().to_string(),
    }
}
