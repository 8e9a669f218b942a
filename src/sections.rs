//! Heading detection for extracted document text.
//!
//! PDF extraction loses structure, so headings are recovered heuristically:
//! a line is a heading if it is entirely upper-case or starts with one of a
//! few structural keywords.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Heading used for text that appears before any detected heading.
pub const DEFAULT_HEADING: &str = "Introduction";

/// Ordered heading → body mapping, in order of first appearance.
pub type Sections = IndexMap<String, String>;

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:CHAPTER|SECTION|PART|INTRODUCTION|CONCLUSION|SUMMARY|APPENDIX)\b")
            .expect("heading pattern is valid")
    })
}

/// At least one cased character and no lower-case ones.
fn is_all_upper(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Whether a trimmed, non-empty line looks like a heading.
pub fn is_heading(line: &str) -> bool {
    is_all_upper(line) || keyword_pattern().is_match(line)
}

/// Split raw text into sections keyed by heading.
///
/// Text before the first heading belongs to [`DEFAULT_HEADING`]. That section
/// is dropped only when it is empty and other headings were found, so the
/// result always has at least one entry. A heading that recurs shares one
/// accumulator, so its bodies are concatenated.
pub fn split(raw_text: &str) -> Sections {
    let mut bodies: IndexMap<String, Vec<&str>> = IndexMap::new();
    bodies.insert(DEFAULT_HEADING.to_string(), Vec::new());
    let mut current = DEFAULT_HEADING.to_string();

    for line in raw_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_heading(line) {
            current = line.to_string();
            bodies.entry(current.clone()).or_default();
        } else {
            bodies.entry(current.clone()).or_default().push(line);
        }
    }

    if bodies.len() > 1 && bodies[DEFAULT_HEADING].is_empty() {
        bodies.shift_remove(DEFAULT_HEADING);
    }

    bodies
        .into_iter()
        .map(|(heading, lines)| (heading, lines.join(" ")))
        .collect()
}

/// Render sections as `"<heading>:\n<body>"` blocks separated by blank lines.
pub fn render(sections: &Sections) -> String {
    sections
        .iter()
        .map(|(heading, body)| format!("{}:\n{}", heading, body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_headings_single_section() {
        let text = "first line here\n\n   second line   \nthird";
        let sections = split(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[DEFAULT_HEADING], "first line here second line third");
    }

    #[test]
    fn test_empty_text_keeps_default_section() {
        let sections = split("");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[DEFAULT_HEADING], "");
    }

    #[test]
    fn test_upper_case_and_keyword_headings() {
        let text = "INTRODUCTION\nThis is an intro.\nSECTION ONE\nContent A\nMore content.\nConclusion\nFinal notes.";
        let sections = split(text);

        let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["INTRODUCTION", "SECTION ONE", "Conclusion"]);
        assert_eq!(sections["INTRODUCTION"], "This is an intro.");
        assert_eq!(sections["SECTION ONE"], "Content A More content.");
        assert_eq!(sections["Conclusion"], "Final notes.");
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert!(is_heading("Chapter 3: Results"));
        assert!(is_heading("appendix"));
        assert!(!is_heading("Partial results were inconclusive."));
        assert!(!is_heading("Summarizing the above"));
    }

    #[test]
    fn test_upper_case_detection() {
        assert!(is_heading("RESULTS AND DISCUSSION"));
        assert!(is_heading("1. METHODS"));
        assert!(!is_heading("12345"));
        assert!(!is_heading("Mostly Title Case"));
    }

    #[test]
    fn test_repeated_heading_merges_bodies() {
        let text = "NOTES\nalpha\nMETHODS\nbeta\nNOTES\ngamma";
        let sections = split(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["NOTES"], "alpha gamma");
        let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["NOTES", "METHODS"]);
    }

    #[test]
    fn test_text_before_first_heading_goes_to_default() {
        let sections = split("Preamble text\nCHAPTER 1\nBody");
        assert_eq!(sections[DEFAULT_HEADING], "Preamble text");
        assert_eq!(sections["CHAPTER 1"], "Body");
    }

    #[test]
    fn test_heading_only_document_keeps_heading() {
        let sections = split("APPENDIX");
        let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["APPENDIX"]);
        assert_eq!(sections["APPENDIX"], "");
    }

    #[test]
    fn test_lower_case_introduction_merges_into_default() {
        let sections = split("Introduction\nSome words");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[DEFAULT_HEADING], "Some words");
    }

    #[test]
    fn test_render() {
        let sections = split("INTRODUCTION\nHello world.\nSECTION ONE\nFoo bar.\n");
        assert_eq!(
            render(&sections),
            "INTRODUCTION:\nHello world.\n\nSECTION ONE:\nFoo bar."
        );
    }
}
