//! Stop-word filtered keyword extraction.

use std::collections::HashSet;

use once_cell::sync::Lazy;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "this", "that", "with", "have", "will", "from", "they", "been", "were", "said",
        "their", "there", "these", "those", "which", "would", "could", "should", "about",
        "into", "than", "then", "them", "what", "when", "where", "while", "also", "more",
        "most", "some", "such", "only", "over", "very", "your", "each", "other", "being",
    ]
    .into_iter()
    .collect()
});

/// Distinct lowercase words longer than three characters, minus stop words,
/// in order of first appearance, at most `max`.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for raw in text.split_whitespace() {
        if keywords.len() >= max {
            break;
        }
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .flat_map(char::to_lowercase)
            .collect();
        if word.chars().count() <= 3 || STOP_WORDS.contains(word.as_str()) {
            continue;
        }
        if seen.insert(word.clone()) {
            keywords.push(word);
        }
    }
    keywords
}
