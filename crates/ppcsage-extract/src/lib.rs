//! PPCSage Extract: rule-based text analysis over pasted phase responses.
//!
//! Everything here is a pure function of its inputs (the sentence memo is the
//! one piece of interior state). Regexes are compiled once into `Lazy` statics.

pub mod classify;
pub mod clean;
pub mod entities;
pub mod keywords;
pub mod metrics;
pub mod relevance;
pub mod sections;
pub mod sentences;

pub use classify::classify_insight;
pub use clean::clean_text;
pub use entities::extract_entities;
pub use keywords::extract_keywords;
pub use metrics::{extract_competitors, extract_metrics, extract_risks};
pub use relevance::{keyword_matches, length_score, score_relevance};
pub use sections::extract_sections;
pub use sentences::SentenceSegmenter;

/// Byte range of `text` widened by up to `radius` characters on each side,
/// landing on char boundaries.
pub(crate) fn char_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_window_clips_to_bounds() {
        let text = "abcdefghij";
        assert_eq!(char_window(text, 4, 5, 2), "cdefg");
        assert_eq!(char_window(text, 0, 1, 3), "abcd");
        assert_eq!(char_window(text, 9, 10, 3), "ghij");
    }

    #[test]
    fn test_char_window_respects_multibyte() {
        let text = "ééé$5ééé";
        let start = text.find('$').unwrap();
        assert_eq!(char_window(text, start, start + 2, 2), "éé$5éé");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
